//! File record types.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::TagFilter;

/// Metadata entry for one stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique file ID (UUID v4). Restored from the snapshot key on load.
    #[serde(default)]
    pub id: String,
    /// Original filename as supplied by the client.
    pub filename: String,
    /// Location of the blob on disk.
    pub filepath: PathBuf,
    /// Client-supplied key/value metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// When the file was uploaded.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Whether this record's metadata satisfies the tag filter.
    pub fn matches(&self, filter: &TagFilter) -> bool {
        self.metadata.get(filter.key()).map(String::as_str) == Some(filter.value())
    }

    /// Content type inferred from the filename extension.
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .to_string()
    }
}

/// Data for creating a new file entry.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Original filename.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
    /// Metadata fields.
    pub metadata: HashMap<String, String>,
}

impl NewFile {
    /// Create a new NewFile without metadata.
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata field. The first value given for a key wins.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.entry(key.into()).or_insert_with(|| value.into());
        self
    }
}
