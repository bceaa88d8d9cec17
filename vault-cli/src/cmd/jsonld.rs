use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};
use vault_core::jsonld::{self, Listing};

use crate::cmd::add_config_arg;
use crate::config::VaultConfig;

pub fn make_subcommand() -> Command {
    add_config_arg(Command::new("jsonld"))
        .about("Generate schema.org JSON-LD for the user and video collections")
        .arg(
            Arg::new("public")
                .short('p')
                .long("public")
                .value_name("DIR")
                .help("Directory holding users.json and videos.json [default: ./public]"),
        )
        .arg(
            Arg::new("inject")
                .long("inject")
                .value_name("FILE")
                .help("Also inject the JSON-LD scripts into this HTML file's <head>"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = VaultConfig::load(args)?;
    let data_dir = Path::new(&config.build_config().public);

    let site_url = &config.site_config().url;

    let standalone = jsonld::load_collections(site_url, data_dir, Listing::Standalone)?;
    jsonld::write_collection_files(&standalone, data_dir)?;

    if let Some(html) = args.get_one::<String>("inject") {
        let head = jsonld::load_collections(site_url, data_dir, Listing::Head)?;
        jsonld::inject_into_file(&head, &PathBuf::from(html))?;
    }

    Ok(())
}
