use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vault_core::builder::DEFAULT_ASSETS;

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct VaultConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Site configuration (from vault-core)
    #[serde(flatten)]
    pub site: vault_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Directory containing the markdown articles
    pub source: String,
    /// Output directory for generated article pages
    pub output: String,
    /// Static files copied next to the article pages
    pub assets: Vec<String>,
    /// Replacement page template
    pub template: Option<String>,
    /// Configuration file path
    pub config: String,
    /// Site root: record collections live here and the dev server serves it
    pub public: String,
    /// Bundled site output (sitemap destination)
    pub dist: String,
    /// Host for dev server
    pub host: String,
    /// Port for dev server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "./articles".to_string(),
            output: "./public/t".to_string(),
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
            template: None,
            config: "./tubevault.toml".to_string(),
            public: "./public".to_string(),
            dist: "./dist".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

impl VaultConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (TUBEVAULT_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = string_arg(args, "config").unwrap_or_else(|| BuildConfig::default().config);

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(ConfigBuilder::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        // 3. Environment variables, e.g. TUBEVAULT_BUILD__SOURCE
        builder = builder.add_source(
            Environment::with_prefix("TUBEVAULT")
                .prefix_separator("_")
                .separator("__"),
        );

        // 4. Only flags that exist on the current command and were given
        for key in ["source", "output", "template", "public", "dist", "host"] {
            if let Some(value) = string_arg(args, key) {
                builder = builder.set_override(format!("build.{key}"), value)?;
            }
        }
        builder = builder.set_override("build.config", config_file)?;

        if let Some(port) = string_arg(args, "port") {
            let port: u16 = port.parse()?;
            builder = builder.set_override("build.port", i64::from(port))?;
        }
        if args.try_get_one::<bool>("open").ok().flatten() == Some(&true) {
            builder = builder.set_override("build.open", true)?;
        }

        let config = builder.build()?;
        let vault_config: VaultConfig = config.try_deserialize()?;

        Ok(vault_config)
    }

    pub fn site_config(&self) -> &vault_core::config::SiteConfig {
        &self.site.site
    }

    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

impl BuildConfig {
    pub fn source_dir(&self) -> PathBuf {
        PathBuf::from(&self.source)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output)
    }

    pub fn asset_paths(&self) -> Vec<PathBuf> {
        self.assets.iter().map(PathBuf::from).collect()
    }

    pub fn template_path(&self) -> Option<PathBuf> {
        self.template.as_ref().map(PathBuf::from)
    }
}

/// A string flag, if this command defines it and it was given.
fn string_arg(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

/// Build the site from a loaded configuration.
pub fn run_build(config: &VaultConfig) -> Result<vault_core::BuildReport> {
    let build = config.build_config();
    let template = build.template_path();

    let report = vault_core::build_site(
        config.site_config(),
        &build.source_dir(),
        &build.output_dir(),
        &build.asset_paths(),
        template.as_deref(),
    )?;

    Ok(report)
}
