use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use vault_core::log;
use vault_dev_server::{LiveServer, LiveServerConfig};

use crate::cmd::build::add_build_args;
use crate::config::{VaultConfig, run_build};

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("serve"))
        .about("Build, serve the site locally and rebuild on changes")
        .arg(
            Arg::new("public")
                .long("public")
                .value_name("DIR")
                .help("Site root to serve [default: ./public]"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = VaultConfig::load(args)?;
    let build_config = config.build_config();

    run_build(&config)?;

    // The dev server watches the site root itself and reloads browsers
    let server_config = LiveServerConfig {
        host: build_config.host.clone(),
        port: build_config.port,
        root: PathBuf::from(&build_config.public),
        open: build_config.open,
        ignore: vec![".git".to_string()],
    };

    let server = LiveServer::new(server_config);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            log!("error"; "dev server: {}", e);
        }
    });

    let watcher_config = config.clone();
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watch_source_files(watcher_config).await {
            log!("error"; "source watcher: {}", e);
        }
    });

    let _ = tokio::try_join!(server_handle, watcher_handle)?;

    Ok(())
}

/// Inputs whose change should trigger a rebuild.
fn watched_inputs(config: &VaultConfig) -> Vec<PathBuf> {
    let build = config.build_config();

    let mut inputs = vec![build.source_dir(), PathBuf::from(&build.config)];
    inputs.extend(build.asset_paths());
    inputs.extend(build.template_path());
    inputs
}

fn is_watched(path: &Path, inputs: &[PathBuf]) -> bool {
    let abs_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    inputs.iter().any(|input| {
        let abs_input = input.canonicalize().unwrap_or_else(|_| input.clone());
        abs_path.starts_with(&abs_input)
    })
}

async fn watch_source_files(config: VaultConfig) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    let inputs = watched_inputs(&config);
    for input in &inputs {
        if !input.exists() {
            continue;
        }

        let mode = if input.is_dir() {
            notify::RecursiveMode::Recursive
        } else {
            notify::RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(input, mode)?;
        log!("watch"; "watching {}", input.display());
    }

    while let Some(path) = rx.recv().await {
        if !is_watched(&path, &inputs) {
            continue;
        }

        log!("watch"; "changed: {}", path.display());

        // Every rebuild starts from scratch; a failing build keeps the old pages
        match run_build(&config) {
            Ok(report) => log!("watch"; "rebuilt {} articles", report.articles.len()),
            Err(e) => log!("error"; "build failed: {}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watched_inputs_cover_sources_and_assets() {
        let config = VaultConfig::default();
        let inputs = watched_inputs(&config);

        assert!(inputs.contains(&PathBuf::from("./articles")));
        assert!(inputs.contains(&PathBuf::from("./tubevault.toml")));
        assert!(inputs.contains(&PathBuf::from("./src/styles/tubevault.css")));
        assert_eq!(inputs.len(), 5);
    }

    #[test]
    fn test_is_watched() {
        let dir = tempfile::TempDir::new().unwrap();
        let articles = dir.path().join("articles");
        std::fs::create_dir_all(&articles).unwrap();
        std::fs::write(articles.join("a.md"), "# A").unwrap();

        let inputs = vec![articles.clone()];
        assert!(is_watched(&articles.join("a.md"), &inputs));
        assert!(!is_watched(&dir.path().join("public/t/a.html"), &inputs));
    }
}
