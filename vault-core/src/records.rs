//! Archive record collections (`users.json`, `videos.json`).
//!
//! Both files are flat JSON arrays ordered by age; a record's rank is its
//! index + 1. Fields the tooling does not use are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum RecordError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_json::Error),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Io(p, e) => write!(f, "Failed to read {}: {}", p.display(), e),
            RecordError::Parse(p, e) => write!(f, "Invalid records in {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for RecordError {}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct User {
    pub username: String,
    pub user_id: Option<String>,
    pub channel_id: Option<String>,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub country: Option<String>,
    pub created_at: Option<f64>,
    pub subscribers: Option<i64>,
    pub videos: Option<i64>,
    pub views: Option<i64>,
    pub wayback_archive: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Video {
    pub video_id: String,
    pub title: Option<String>,
    /// Unix seconds; stored as a string in the archive but numbers are accepted
    #[serde(deserialize_with = "string_or_number")]
    pub timestamp: Option<String>,
    pub username: Option<String>,
    pub status: Option<i64>,
}

impl Video {
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn load_users<P: AsRef<Path>>(path: P) -> Result<Vec<User>, RecordError> {
    load(path.as_ref())
}

pub fn load_videos<P: AsRef<Path>>(path: P) -> Result<Vec<Video>, RecordError> {
    load(path.as_ref())
}

fn load<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, RecordError> {
    let data = std::fs::read_to_string(path).map_err(|e| RecordError::Io(path.to_path_buf(), e))?;
    serde_json::from_str(&data).map_err(|e| RecordError::Parse(path.to_path_buf(), e))
}

/// Position-based rank of a record.
pub fn rank(index: usize) -> usize {
    index + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_ignore_unknown_fields() {
        let users: Vec<User> = serde_json::from_str(
            r#"[{"username": "jawed", "channel_id": "UC4QobU6STFB0P71PMvOGN5A", "confirmed": 1, "notes": null}]"#,
        )
        .unwrap();
        assert_eq!(users[0].username, "jawed");
        assert_eq!(users[0].channel_id.as_deref(), Some("UC4QobU6STFB0P71PMvOGN5A"));
        assert_eq!(users[0].subscribers, None);
    }

    #[test]
    fn test_video_timestamp_string_or_number() {
        let videos: Vec<Video> = serde_json::from_str(
            r#"[
                {"video_id": "jNQXAC9IVRw", "title": "Me at the zoo", "timestamp": "1114205445"},
                {"video_id": "b", "title": " ", "timestamp": 1114205445},
                {"video_id": "c", "timestamp": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(videos[0].timestamp.as_deref(), Some("1114205445"));
        assert_eq!(videos[1].timestamp.as_deref(), Some("1114205445"));
        assert_eq!(videos[2].timestamp, None);
        assert!(videos[0].has_title());
        assert!(!videos[1].has_title());
        assert!(!videos[2].has_title());
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let bad = dir.path().join("users.json");
        std::fs::write(&bad, "{not json").unwrap();

        assert!(matches!(load_users(&bad), Err(RecordError::Parse(p, _)) if p == bad));
        assert!(matches!(
            load_videos(dir.path().join("videos.json")),
            Err(RecordError::Io(_, _))
        ));
    }

    #[test]
    fn test_rank_is_one_based() {
        assert_eq!(rank(0), 1);
    }
}
