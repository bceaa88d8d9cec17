use std::path::PathBuf;

use crate::markdown::markdown_to_html;

/// One entry of the scanned content tree.
#[derive(Debug, Clone)]
pub enum TreeNode {
    Folder(Folder),
    File(Document),
}

/// A category directory.
#[derive(Debug, Clone)]
pub struct Folder {
    pub name: String,
    pub path: PathBuf,
    pub children: Vec<TreeNode>,
    /// Markdown file sitting next to the folder under the same name. It is
    /// never listed as a sibling; it becomes the folder's own page.
    pub page: Option<Document>,
}

impl Folder {
    /// Navigation label: `user_pages` becomes `User Pages`.
    pub fn display_name(&self) -> String {
        if self.name == "overview" {
            return "Overview".to_string();
        }

        self.name
            .split('_')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A markdown source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// File stem, used as the slug.
    pub filename: String,
    pub content: String,
    pub path: PathBuf,
    pub full_path: PathBuf,
}

impl Document {
    pub fn slug(&self) -> &str {
        &self.filename
    }

    pub fn out_file_name(&self) -> String {
        format!("{}.html", self.filename)
    }
}

/// A document together with its converted HTML body.
#[derive(Debug, Clone)]
pub struct Article {
    pub document: Document,
    pub html: String,
}

impl Article {
    pub fn render(document: Document) -> Self {
        let html = markdown_to_html(&document.content);
        Self { document, html }
    }
}

/// Title of a markdown document: its first line with the first `"# "` removed.
pub fn title_from_content(content: &str) -> String {
    let first_line = content.split('\n').next().unwrap_or_default();
    first_line.trim_end_matches('\r').replacen("# ", "", 1)
}

/// Flatten the tree into build order. A folder's own page comes right
/// before the folder's children.
pub fn collect_articles(tree: &[TreeNode]) -> Vec<Document> {
    let mut articles = Vec::new();
    traverse(tree, &mut articles);
    articles
}

fn traverse(items: &[TreeNode], articles: &mut Vec<Document>) {
    for item in items {
        match item {
            TreeNode::File(document) => articles.push(document.clone()),
            TreeNode::Folder(folder) => {
                if let Some(page) = &folder.page {
                    articles.push(page.clone());
                }
                traverse(&folder.children, articles);
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
