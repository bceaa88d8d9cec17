use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

/// Site identity used by the page template, sitemap and structured data.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub keywords: String,
    pub logo: String,
    /// Public origin, without a trailing slash
    pub url: String,
    /// URL prefix the generated articles are served under
    pub article_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "TubeVault".to_string(),
            tagline: "Preserving YouTube's early history".to_string(),
            description: "Preserving YouTube's early history".to_string(),
            keywords: "video, sharing, camera phone, video phone, free, upload".to_string(),
            logo: "/tubevault.png".to_string(),
            url: "https://tubevault.org".to_string(),
            article_path: "/t".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_site_table_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [site]
            name = "Archive"
            url = "https://example.org"
            "#,
        )
        .unwrap();

        assert_eq!(config.site.name, "Archive");
        assert_eq!(config.site.url, "https://example.org");
        assert_eq!(config.site.article_path, "/t");
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site, SiteConfig::default());
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            Config::read("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
