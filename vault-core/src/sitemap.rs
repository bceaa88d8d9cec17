use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::log;

#[derive(Debug)]
pub enum SitemapError {
    Walk(walkdir::Error),
    Write(PathBuf, std::io::Error),
}

impl From<walkdir::Error> for SitemapError {
    fn from(err: walkdir::Error) -> Self {
        SitemapError::Walk(err)
    }
}

impl std::fmt::Display for SitemapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SitemapError::Walk(e) => write!(f, "Walk error: {}", e),
            SitemapError::Write(p, e) => write!(f, "Failed to write {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for SitemapError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub url: String,
    pub priority: &'static str,
    pub changefreq: &'static str,
}

impl Route {
    fn new(url: impl Into<String>, priority: &'static str, changefreq: &'static str) -> Self {
        Self {
            url: url.into(),
            priority,
            changefreq,
        }
    }
}

/// Pages of the site that exist independently of the articles.
pub fn static_routes() -> Vec<Route> {
    vec![
        Route::new("/", "1.0", "weekly"),
        Route::new("/users", "0.9", "daily"),
        Route::new("/videos", "0.9", "daily"),
    ]
}

/// One route per generated `*.html` page, sorted by file name. A missing
/// directory yields no routes.
pub fn article_routes(article_dir: &Path, article_path: &str) -> Result<Vec<Route>, SitemapError> {
    if !article_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut routes = Vec::new();
    for entry in WalkDir::new(article_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_file() && name.ends_with(".html") {
            routes.push(Route::new(format!("{article_path}/{name}"), "0.6", "monthly"));
        }
    }

    Ok(routes)
}

pub fn generate_sitemap(site_url: &str, routes: &[Route], lastmod: NaiveDate) -> String {
    let date = lastmod.format("%Y-%m-%d");

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for route in routes {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{site_url}{}</loc>\n", route.url));
        xml.push_str(&format!("    <lastmod>{date}</lastmod>\n"));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", route.changefreq));
        xml.push_str(&format!("    <priority>{}</priority>\n", route.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>");
    xml
}

/// Write `sitemap.xml` for the static routes plus every page found in
/// `article_dir`. Returns the number of URLs written.
pub fn write_sitemap(
    site: &SiteConfig,
    article_dir: &Path,
    dest: &Path,
) -> Result<usize, SitemapError> {
    let mut routes = static_routes();
    routes.extend(article_routes(article_dir, &site.article_path)?);

    let xml = generate_sitemap(&site.url, &routes, Utc::now().date_naive());

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SitemapError::Write(dest.to_path_buf(), e))?;
    }
    std::fs::write(dest, xml).map_err(|e| SitemapError::Write(dest.to_path_buf(), e))?;

    log!("sitemap"; "Sitemap generated at {}", dest.display());
    log!("sitemap"; "Generated {} URLs", routes.len());

    Ok(routes.len())
}
