//! `template` module entry point.

use std::process::ExitCode;

use clap::Parser;

use cfnkit_aws::AwsCli;
use cfnkit_modules::runtime::{self, ModuleCli};
use cfnkit_modules::template::{self, TemplateArgs};

fn main() -> ExitCode {
    runtime::init_logging();

    let cli = ModuleCli::parse();
    let result = runtime::load_args::<TemplateArgs>(&cli).and_then(|args| {
        let api = AwsCli::new(args.settings());
        template::run(&args, &api)
    });

    runtime::respond(result)
}
