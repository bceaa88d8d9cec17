use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::debug;
use crate::site::{Document, Folder, TreeNode, title_from_content};

#[derive(Debug)]
pub enum ScanError {
    Walk(walkdir::Error),
    ReadFile(PathBuf, std::io::Error),
    InvalidPath(PathBuf),
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        ScanError::Walk(err)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Walk(e) => write!(f, "Walk error: {}", e),
            ScanError::ReadFile(p, e) => write!(f, "Failed to read {}: {}", p.display(), e),
            ScanError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for ScanError {}

/// Scans a content directory into a tree of folders and markdown documents.
pub struct SiteScanner {
    source_dir: PathBuf,
}

impl SiteScanner {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
        }
    }

    pub fn scan(&self) -> Result<Vec<TreeNode>, ScanError> {
        debug!("scan"; "scanning {}", self.source_dir.display());
        self.scan_dir(&self.source_dir, Path::new(""))
    }

    fn scan_dir(&self, dir: &Path, base: &Path) -> Result<Vec<TreeNode>, ScanError> {
        // Entries come back sorted by file name so navigation order is stable
        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .collect::<Result<Vec<DirEntry>, _>>()?;

        let folder_names: HashSet<String> = entries
            .iter()
            .filter(|e| e.file_type().is_dir())
            .map(entry_name)
            .collect();

        let mut items = Vec::new();

        for entry in &entries {
            let name = entry_name(entry);
            let relative_path = base.join(&name);

            if entry.file_type().is_dir() {
                let children = self.scan_dir(entry.path(), &relative_path)?;

                let page_path = dir.join(format!("{name}.md"));
                let page = if page_path.is_file() {
                    Some(read_document(&page_path, base.join(format!("{name}.md")))?)
                } else {
                    None
                };

                items.push(TreeNode::Folder(Folder {
                    name,
                    path: relative_path,
                    children,
                    page,
                }));
            } else if let Some(stem) = name.strip_suffix(".md") {
                // A folder with the same name owns this file
                if folder_names.contains(stem) {
                    debug!("scan"; "{} absorbed by folder {}", relative_path.display(), stem);
                    continue;
                }

                items.push(TreeNode::File(read_document(entry.path(), relative_path)?));
            }
        }

        Ok(items)
    }
}

/// Shorthand for `SiteScanner::new(root).scan()`.
pub fn scan_directory<P: AsRef<Path>>(root: P) -> Result<Vec<TreeNode>, ScanError> {
    SiteScanner::new(root).scan()
}

fn read_document(full_path: &Path, relative_path: PathBuf) -> Result<Document, ScanError> {
    let content = std::fs::read_to_string(full_path)
        .map_err(|e| ScanError::ReadFile(full_path.to_path_buf(), e))?;

    let filename = full_path
        .file_stem()
        .ok_or_else(|| ScanError::InvalidPath(full_path.to_path_buf()))?
        .to_string_lossy()
        .to_string();

    Ok(Document {
        title: title_from_content(&content),
        filename,
        content,
        path: relative_path,
        full_path: full_path.to_path_buf(),
    })
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().to_string()
}
