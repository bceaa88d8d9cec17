use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use vault_core::sitemap::write_sitemap;

use crate::cmd::add_config_arg;
use crate::config::VaultConfig;

pub fn make_subcommand() -> Command {
    add_config_arg(Command::new("sitemap"))
        .about("Write sitemap.xml for the site routes and generated articles")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory holding the generated article pages [default: ./public/t]"),
        )
        .arg(
            Arg::new("dist")
                .short('d')
                .long("dist")
                .value_name("DIR")
                .help("Directory the sitemap is written to [default: ./dist]"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = VaultConfig::load(args)?;
    let build = config.build_config();

    let dest = PathBuf::from(&build.dist).join("sitemap.xml");
    write_sitemap(config.site_config(), &build.output_dir(), &dest)?;

    Ok(())
}
