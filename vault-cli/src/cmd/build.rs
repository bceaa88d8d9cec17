use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use vault_core::log;

use crate::cmd::add_config_arg;
use crate::config::{VaultConfig, run_build};

pub fn add_build_args(command: Command) -> Command {
    add_config_arg(command)
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Directory containing the markdown articles [default: ./articles]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for article pages [default: ./public/t]"),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("FILE")
                .help("Replacement page template"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build the article pages from markdown")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = VaultConfig::load(args)?;
    let report = run_build(&config)?;

    log!("build"; "Site built successfully in {}", report.output_dir.display());

    Ok(())
}
