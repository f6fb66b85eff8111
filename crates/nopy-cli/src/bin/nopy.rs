use nopy::commands;
use nopy::common;

fn main() {
    common::init();
    let args = common::forwarded_args();
    common::exit_with(commands::nopy::run(&args, common::process_env()));
}
