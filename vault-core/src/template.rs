use std::path::Path;
use tera::{Context, Tera};

use crate::config::SiteConfig;

const ARTICLE_TEMPLATE: &str = include_str!("../templates/article.html");
const TEMPLATE_NAME: &str = "article.html";

#[derive(Debug)]
pub enum TemplateError {
    TeraError(tera::Error),
    IoError(std::io::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::TeraError(err)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::IoError(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TeraError(e) => write!(f, "Template error: {}", e),
            TemplateError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Wraps an article body and its navigation in the full page document.
///
/// Values are inserted verbatim: titles, content and navigation come from
/// the build's own markdown and are not escaped.
pub struct PageTemplate {
    tera: Tera,
}

impl PageTemplate {
    /// The built-in article page.
    pub fn new() -> Result<Self, TemplateError> {
        Self::from_source(ARTICLE_TEMPLATE)
    }

    /// Load a replacement page template from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_source(&source)
    }

    fn from_source(source: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, source)?;

        Ok(Self { tera })
    }

    pub fn assemble(
        &self,
        site: &SiteConfig,
        title: &str,
        content: &str,
        navigation: &str,
    ) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("title", title);
        context.insert("content", content);
        context.insert("navigation", navigation);

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// Assemble a page with the built-in template and default site settings.
pub fn assemble_page(title: &str, content: &str, navigation: &str) -> Result<String, TemplateError> {
    PageTemplate::new()?.assemble(&SiteConfig::default(), title, content, navigation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_inserts_values_verbatim() {
        let html = assemble_page(
            "Tom & Jerry",
            r#"<h1 id="header">Tom & Jerry</h1>"#,
            "\n<ol><li>nav</li></ol>",
        )
        .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("<title>TubeVault - Tom & Jerry</title>"));
        assert!(html.contains(r#"<h1 id="header">Tom & Jerry</h1>"#));
        assert!(html.contains("<div class=\"ytg-1col\">\n<ol><li>nav</li></ol>\n"));
        assert!(!html.contains("&amp;"));
    }

    #[test]
    fn test_site_settings_reach_the_page() {
        let site = SiteConfig {
            name: "Archive".to_string(),
            article_path: "/docs".to_string(),
            ..SiteConfig::default()
        };

        let html = PageTemplate::new()
            .unwrap()
            .assemble(&site, "Home", "", "")
            .unwrap();
        assert!(html.contains("<title>Archive - Home</title>"));
        assert!(html.contains(r#"<a href="/docs/overview">Documentation</a>"#));
        assert!(html.contains("Archive is an independent preservation project."));
    }

    #[test]
    fn test_template_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<title>{{ title }}</title>{{ content }}").unwrap();

        let html = PageTemplate::from_file(&path)
            .unwrap()
            .assemble(&SiteConfig::default(), "A", "<p>b</p>", "")
            .unwrap();
        assert_eq!(html, "<title>A</title><p>b</p>");
    }
}
