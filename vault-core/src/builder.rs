use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::navigation::render_navigation;
use crate::scanner::{ScanError, SiteScanner};
use crate::site::{Article, collect_articles};
use crate::template::{PageTemplate, TemplateError};
use crate::{debug, log};

/// Static files copied next to the generated pages.
pub const DEFAULT_ASSETS: &[&str] = &[
    "./src/styles/tubevault.css",
    "./src/styles/youtube-minimal.css",
    "./src/components/interactive-components.js",
];

#[derive(Debug)]
pub enum BuildError {
    MissingSourceDir,
    InvalidPath(PathBuf),
    Asset(PathBuf, std::io::Error),
    Write(PathBuf, std::io::Error),
    TemplateError(TemplateError),
    ScanError(ScanError),
    IoError(std::io::Error),
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        BuildError::TemplateError(err)
    }
}

impl From<ScanError> for BuildError {
    fn from(err: ScanError) -> Self {
        BuildError::ScanError(err)
    }
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> Self {
        BuildError::IoError(err)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingSourceDir => write!(f, "Source directory not specified"),
            BuildError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
            BuildError::Asset(p, e) => write!(f, "Failed to copy asset {}: {}", p.display(), e),
            BuildError::Write(p, e) => write!(f, "Failed to write {}: {}", p.display(), e),
            BuildError::TemplateError(e) => write!(f, "Template error: {}", e),
            BuildError::ScanError(e) => write!(f, "Scan error: {}", e),
            BuildError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

/// Outcome of a finished build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// Slugs of the written articles, in build order.
    pub articles: Vec<String>,
}

pub struct SiteBuilder {
    source_dir: Option<PathBuf>,
    output_dir: PathBuf,
    assets: Vec<PathBuf>,
    template_file: Option<PathBuf>,
    site: SiteConfig,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            source_dir: None,
            output_dir: PathBuf::from("./public/t"),
            assets: DEFAULT_ASSETS.iter().map(PathBuf::from).collect(),
            template_file: None,
            site: SiteConfig::default(),
        }
    }

    // Required configuration
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Replace the asset list.
    pub fn assets<I, P>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.assets = assets.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
        self
    }

    pub fn template_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.template_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.site = config;
        self
    }

    pub fn build(self) -> Result<Site, BuildError> {
        let source_dir = self.source_dir.ok_or(BuildError::MissingSourceDir)?;

        let template = match &self.template_file {
            Some(path) => PageTemplate::from_file(path)?,
            None => PageTemplate::new()?,
        };

        Ok(Site {
            source_dir,
            output_dir: self.output_dir,
            assets: self.assets,
            template,
            site: self.site,
        })
    }
}

pub struct Site {
    source_dir: PathBuf,
    output_dir: PathBuf,
    assets: Vec<PathBuf>,
    template: PageTemplate,
    site: SiteConfig,
}

impl Site {
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the whole pipeline: assets, scan, convert, assemble, write.
    /// Every input is re-read; nothing carries over between runs.
    pub fn render_all(&self) -> Result<BuildReport, BuildError> {
        std::fs::create_dir_all(&self.output_dir)?;

        // Assets first: a missing one aborts before any page is written
        self.copy_assets()?;

        let tree = SiteScanner::new(&self.source_dir).scan()?;
        let articles = collect_articles(&tree);

        let mut seen = HashSet::new();
        let mut written = Vec::with_capacity(articles.len());

        for document in &articles {
            if !seen.insert(document.slug()) {
                log!("warn"; "duplicate slug {}, {} overwrites the earlier page", document.slug(), document.path.display());
            }

            let navigation = render_navigation(
                &tree,
                document.slug(),
                &articles,
                &self.site.article_path,
            );
            let article = Article::render(document.clone());
            let html = self.template.assemble(
                &self.site,
                &article.document.title,
                &article.html,
                &navigation,
            )?;

            let file_name = article.document.out_file_name();
            let output_path = self.output_dir.join(&file_name);
            std::fs::write(&output_path, html).map_err(|e| BuildError::Write(output_path, e))?;

            log!("build"; "Generated {}", file_name);
            written.push(article.document.filename);
        }

        log!("build"; "Built {} articles to {}/", written.len(), self.output_dir.display());

        Ok(BuildReport {
            output_dir: self.output_dir.clone(),
            articles: written,
        })
    }

    fn copy_assets(&self) -> Result<(), BuildError> {
        for asset in &self.assets {
            let file_name = asset
                .file_name()
                .ok_or_else(|| BuildError::InvalidPath(asset.clone()))?;
            let dest = self.output_dir.join(file_name);

            std::fs::copy(asset, &dest).map_err(|e| BuildError::Asset(asset.clone(), e))?;
            debug!("build"; "copied {} -> {}", asset.display(), dest.display());
        }

        Ok(())
    }
}

/// Build the article pages in one call.
pub fn build_site<P: AsRef<Path>>(
    site: &SiteConfig,
    source_dir: &Path,
    output_dir: &Path,
    assets: &[P],
    template_file: Option<&Path>,
) -> Result<BuildReport, BuildError> {
    let mut builder = SiteBuilder::new()
        .source_dir(source_dir)
        .output_dir(output_dir)
        .assets(assets)
        .site_config(site.clone());

    if let Some(path) = template_file {
        builder = builder.template_file(path);
    }

    builder.build()?.render_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_dir() {
        let result = SiteBuilder::new().build();
        assert!(matches!(result, Err(BuildError::MissingSourceDir)));
    }

    #[test]
    fn test_missing_template_file() {
        let result = SiteBuilder::new()
            .source_dir("./articles")
            .template_file("/no/such/template.html")
            .build();
        assert!(matches!(
            result,
            Err(BuildError::TemplateError(TemplateError::IoError(_)))
        ));
    }

    #[test]
    fn test_default_assets() {
        let builder = SiteBuilder::new();
        assert_eq!(builder.assets.len(), 3);
        assert_eq!(builder.output_dir, PathBuf::from("./public/t"));
    }
}
