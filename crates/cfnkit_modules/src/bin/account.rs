//! `account` module entry point.

use std::process::ExitCode;

use clap::Parser;

use cfnkit_aws::AwsCli;
use cfnkit_modules::account::{self, AccountArgs};
use cfnkit_modules::runtime::{self, ModuleCli};

fn main() -> ExitCode {
    runtime::init_logging();

    let cli = ModuleCli::parse();
    let result = runtime::load_args::<AccountArgs>(&cli).and_then(|args| {
        let api = AwsCli::new(args.settings());
        account::run(&args, &api)
    });

    runtime::respond(result)
}
