use std::fs;
use std::path::Path;

use tempfile::TempDir;
use vault_core::config::SiteConfig;
use vault_core::{BuildError, SiteBuilder, build_site};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Content tree plus the three static assets the page template expects.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "articles/overview.md", "# Overview\nHello **world**.");
    write(root, "articles/overview/sub.md", "# Sub Page\nNested.");
    write(root, "articles/about.md", "# About\n[Click]{button}");

    write(root, "assets/tubevault.css", "body {}");
    write(root, "assets/youtube-minimal.css", "a {}");
    write(root, "assets/interactive-components.js", "export {}");

    dir
}

fn assets(root: &Path) -> Vec<std::path::PathBuf> {
    ["tubevault.css", "youtube-minimal.css", "interactive-components.js"]
        .iter()
        .map(|name| root.join("assets").join(name))
        .collect()
}

#[test]
fn builds_overview_with_nested_navigation() {
    let dir = fixture();
    let root = dir.path();
    let out = root.join("public/t");

    let report = build_site(
        &SiteConfig::default(),
        &root.join("articles"),
        &out,
        &assets(root),
        None,
    )
    .unwrap();

    assert_eq!(report.articles, vec!["about", "overview", "sub"]);

    let overview = fs::read_to_string(out.join("overview.html")).unwrap();
    assert!(overview.contains(r#"<h1 id="header">Overview</h1>"#));
    assert!(overview.contains("<strong>world</strong>"));
    assert!(overview.contains("<title>TubeVault - Overview</title>"));

    // The sub page is listed inside the folder's nested list, after the folder link
    let folder_link = overview
        .find(r#"<a href="/t/overview" class="item-highlight">Overview</a>"#)
        .unwrap();
    let nested = overview.find(r#"<ol class="indented">"#).unwrap();
    let sub = overview.find(r#"<a href="/t/sub">Sub Page</a>"#).unwrap();
    assert!(folder_link < nested && nested < sub);

    // overview.md is the folder's page, never a sibling entry
    assert_eq!(overview.matches(">Overview</a>").count(), 1);

    let sub_page = fs::read_to_string(out.join("sub.html")).unwrap();
    assert!(sub_page.contains(r#"<a href="/t/sub" class="item-highlight">Sub Page</a>"#));
    assert!(sub_page.contains(r#"<a href="/t/overview">Overview</a>"#));

    let about = fs::read_to_string(out.join("about.html")).unwrap();
    assert!(about.contains(r#"<span class="yt-uix-button-content">Click</span>"#));

    for asset in ["tubevault.css", "youtube-minimal.css", "interactive-components.js"] {
        assert!(out.join(asset).is_file(), "{asset} was not copied");
    }
}

#[test]
fn missing_asset_aborts_before_articles() {
    let dir = fixture();
    let root = dir.path();
    let out = root.join("public/t");
    fs::remove_file(root.join("assets/youtube-minimal.css")).unwrap();

    let result = build_site(
        &SiteConfig::default(),
        &root.join("articles"),
        &out,
        &assets(root),
        None,
    );

    assert!(matches!(result, Err(BuildError::Asset(_, _))));
    assert!(!out.join("overview.html").exists());
}

#[test]
fn missing_source_dir_is_an_error() {
    let dir = fixture();
    let root = dir.path();

    let result = SiteBuilder::new()
        .source_dir(root.join("nowhere"))
        .output_dir(root.join("out"))
        .assets(assets(root))
        .build()
        .unwrap()
        .render_all();

    assert!(matches!(result, Err(BuildError::ScanError(_))));
}

#[test]
fn rebuild_reflects_removed_articles() {
    let dir = fixture();
    let root = dir.path();
    let out = root.join("public/t");

    let site = SiteBuilder::new()
        .source_dir(root.join("articles"))
        .output_dir(&out)
        .assets(assets(root))
        .build()
        .unwrap();
    site.render_all().unwrap();

    fs::remove_file(root.join("articles/about.md")).unwrap();
    let report = site.render_all().unwrap();

    assert_eq!(report.articles, vec!["overview", "sub"]);
    let overview = fs::read_to_string(out.join("overview.html")).unwrap();
    assert!(!overview.contains(r#"<a href="/t/about">About</a>"#));
}
