use clap::Parser;
use nopy::commands::nopenv::{self, NopenvArgs};
use nopy::common;

fn main() {
    let cli = NopenvArgs::parse();
    common::init();
    common::exit_with(nopenv::run(&cli, common::process_env()));
}
