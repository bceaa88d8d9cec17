mod cmd;
mod config;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use vault_core::log;

fn cli() -> Command {
    Command::new("tubevault")
        .about("Build tooling for the TubeVault archive")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print debug output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
        .subcommand(cmd::sitemap::make_subcommand())
        .subcommand(cmd::jsonld::make_subcommand())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let matches = cli().get_matches();
    vault_core::logger::set_verbose(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        Some(("sitemap", args)) => cmd::sitemap::execute(args),
        Some(("jsonld", args)) => cmd::jsonld::execute(args),
        _ => unreachable!("subcommand_required is set"),
    }
}
