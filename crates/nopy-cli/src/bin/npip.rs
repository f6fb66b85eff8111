use nopy::commands;
use nopy::common;

fn main() {
    let settings = common::init();
    let args = common::forwarded_args();
    common::exit_with(commands::npip::run(&args, common::process_env(), &settings));
}
