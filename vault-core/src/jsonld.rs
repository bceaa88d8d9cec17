//! schema.org structured data for the user and video listing pages.

use chrono::DateTime;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

use crate::log;
use crate::records::{RecordError, User, Video, load_users, load_videos, rank};

#[derive(Debug)]
pub enum JsonLdError {
    Records(RecordError),
    Serialize(serde_json::Error),
    Read(PathBuf, std::io::Error),
    Write(PathBuf, std::io::Error),
    MissingHead(PathBuf),
}

impl From<RecordError> for JsonLdError {
    fn from(err: RecordError) -> Self {
        JsonLdError::Records(err)
    }
}

impl From<serde_json::Error> for JsonLdError {
    fn from(err: serde_json::Error) -> Self {
        JsonLdError::Serialize(err)
    }
}

impl std::fmt::Display for JsonLdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonLdError::Records(e) => write!(f, "{}", e),
            JsonLdError::Serialize(e) => write!(f, "Serialization error: {}", e),
            JsonLdError::Read(p, e) => write!(f, "Failed to read {}: {}", p.display(), e),
            JsonLdError::Write(p, e) => write!(f, "Failed to write {}: {}", p.display(), e),
            JsonLdError::MissingHead(p) => write!(f, "No </head> tag in {}", p.display()),
        }
    }
}

impl std::error::Error for JsonLdError {}

/// A `CollectionPage` plus the label used for its HTML comment.
#[derive(Debug, Clone)]
pub struct Collection {
    pub label: &'static str,
    pub data: Value,
}

/// Records listed in the standalone `*-jsonld.json` files.
pub const STANDALONE_LIMIT: usize = 100;

/// Name given to untitled videos in the standalone files.
pub const UNTITLED_VIDEO: &str = "Unknown Video";

/// Where a collection ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// `users-jsonld.json` / `videos-jsonld.json`: the first
    /// [`STANDALONE_LIMIT`] records, untitled videos kept as [`UNTITLED_VIDEO`].
    Standalone,
    /// Scripts injected into a page `<head>`: every record, untitled videos dropped.
    Head,
}

impl Listing {
    fn limit(self) -> usize {
        match self {
            Listing::Standalone => STANDALONE_LIMIT,
            Listing::Head => usize::MAX,
        }
    }

    fn video_name(self, video: &Video) -> Option<String> {
        match self {
            Listing::Standalone => Some(
                video
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNTITLED_VIDEO.to_string()),
            ),
            Listing::Head => video.title.clone().filter(|_| video.has_title()),
        }
    }
}

pub fn users_collection(site_url: &str, users: &[User], listing: Listing) -> Collection {
    let items = users
        .iter()
        .take(listing.limit())
        .enumerate()
        .filter_map(|(index, user)| {
            let channel_id = user.channel_id.as_deref().filter(|id| !id.is_empty())?;
            Some(json!({
                "@type": "Person",
                "@id": format!("{site_url}/users#{}", rank(index)),
                "name": user.username,
                "identifier": user.username,
                "url": format!("https://www.youtube.com/channel/{channel_id}"),
            }))
        })
        .collect();

    Collection {
        label: "Users",
        data: collection_page(
            "Oldest YouTube Users",
            "Archive of the oldest YouTube users from 2005",
            format!("{site_url}/users"),
            items,
        ),
    }
}

pub fn videos_collection(site_url: &str, videos: &[Video], listing: Listing) -> Collection {
    let items = videos
        .iter()
        .take(listing.limit())
        .enumerate()
        .filter_map(|(index, video)| {
            let name = listing.video_name(video)?;
            let mut item = Map::new();
            item.insert("@type".into(), json!("VideoObject"));
            item.insert("@id".into(), json!(format!("{site_url}/videos#{}", rank(index))));
            item.insert("name".into(), json!(name));
            item.insert("identifier".into(), json!(video.video_id));
            item.insert(
                "url".into(),
                json!(format!("https://www.youtube.com/watch?v={}", video.video_id)),
            );
            if let Some(date) = video.timestamp.as_deref().and_then(upload_date) {
                item.insert("uploadDate".into(), json!(date));
            }
            if let Some(username) = video.username.as_deref().filter(|u| !u.is_empty()) {
                item.insert("creator".into(), json!({ "@type": "Person", "name": username }));
            }
            Some(Value::Object(item))
        })
        .collect();

    Collection {
        label: "Videos",
        data: collection_page(
            "Oldest YouTube Videos",
            "Archive of the oldest YouTube videos from 2005",
            format!("{site_url}/videos"),
            items,
        ),
    }
}

fn collection_page(name: &str, description: &str, url: String, items: Vec<Value>) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "name": name,
        "description": description,
        "url": url,
        "mainEntity": {
            "@type": "ItemList",
            "numberOfItems": items.len(),
            "itemListElement": items,
        }
    })
}

/// `YYYY-MM-DD` (UTC) for a unix timestamp given as text. Leading digits
/// are used, so `"1114205445abc"` still parses.
fn upload_date(timestamp: &str) -> Option<String> {
    let trimmed = timestamp.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let seconds: i64 = trimmed[..digits_end].parse().ok()?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Serialize with a fixed-width indent.
fn to_pretty(value: &Value, indent: usize) -> Result<String, serde_json::Error> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Render collections as `<script type="application/ld+json">` blocks.
pub fn script_blocks(collections: &[Collection]) -> Result<String, serde_json::Error> {
    let blocks = collections
        .iter()
        .map(|collection| -> Result<String, serde_json::Error> {
            Ok(format!(
                "    <!-- {} Collection JSON-LD -->\n    <script type=\"application/ld+json\">\n    {}\n    </script>",
                collection.label,
                to_pretty(&collection.data, 6)?
            ))
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;

    Ok(blocks.join("\n\n"))
}

/// Insert script blocks right before the last `</head>`.
pub fn inject_into_head(html: &str, scripts: &str) -> Option<String> {
    let pos = html.rfind("</head>")?;
    Some(format!("{}\n{}\n  {}", &html[..pos], scripts, &html[pos..]))
}

/// Load the record collections found in `data_dir`. `users.json` is
/// required; `videos.json` is skipped when absent.
pub fn load_collections(
    site_url: &str,
    data_dir: &Path,
    listing: Listing,
) -> Result<Vec<Collection>, JsonLdError> {
    let users = load_users(data_dir.join("users.json"))?;
    let mut collections = vec![users_collection(site_url, &users, listing)];

    let videos_path = data_dir.join("videos.json");
    if videos_path.is_file() {
        let videos = load_videos(&videos_path)?;
        collections.push(videos_collection(site_url, &videos, listing));
    } else {
        log!("jsonld"; "{} not found, skipping videos JSON-LD", videos_path.display());
    }

    Ok(collections)
}

/// Write `users-jsonld.json` and `videos-jsonld.json` next to the records.
pub fn write_collection_files(
    collections: &[Collection],
    data_dir: &Path,
) -> Result<Vec<PathBuf>, JsonLdError> {
    let mut written = Vec::new();

    for collection in collections {
        let path = data_dir.join(format!("{}-jsonld.json", collection.label.to_lowercase()));
        let json = serde_json::to_string_pretty(&collection.data)?;
        std::fs::write(&path, json).map_err(|e| JsonLdError::Write(path.clone(), e))?;

        log!("jsonld"; "{} JSON-LD generated at {}", collection.label, path.display());
        written.push(path);
    }

    Ok(written)
}

/// Inject the collections into an HTML file in place.
pub fn inject_into_file(collections: &[Collection], html_path: &Path) -> Result<(), JsonLdError> {
    let html = std::fs::read_to_string(html_path)
        .map_err(|e| JsonLdError::Read(html_path.to_path_buf(), e))?;
    let scripts = script_blocks(collections)?;
    let html = inject_into_head(&html, &scripts)
        .ok_or_else(|| JsonLdError::MissingHead(html_path.to_path_buf()))?;

    std::fs::write(html_path, html).map_err(|e| JsonLdError::Write(html_path.to_path_buf(), e))?;
    log!("jsonld"; "JSON-LD injected into {}", html_path.display());

    Ok(())
}
