pub mod logger;
pub mod builder;
pub mod config;
pub mod jsonld;
pub mod markdown;
pub mod navigation;
pub mod records;
pub mod scanner;
pub mod site;
pub mod sitemap;
pub mod template;

// Re-export main types
pub use builder::{BuildError, BuildReport, Site, SiteBuilder, build_site};
pub use markdown::markdown_to_html;
pub use navigation::render_navigation;
pub use scanner::{ScanError, SiteScanner, scan_directory};
pub use site::{Article, Document, Folder, TreeNode, collect_articles};
pub use template::{PageTemplate, TemplateError, assemble_page};
