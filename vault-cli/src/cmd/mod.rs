pub mod build;
pub mod jsonld;
pub mod serve;
pub mod sitemap;

use clap::{Arg, Command};

/// Flags shared by every command that reads the site configuration.
pub fn add_config_arg(command: Command) -> Command {
    command.arg(
        Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("Configuration file [default: ./tubevault.toml]"),
    )
}
