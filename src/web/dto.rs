//! Request and response DTOs for the file API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::FileRecord;

/// Query parameters for listing files.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Optional `key:value` metadata filter.
    pub tags: Option<String>,
}

/// Multipart body accepted by `POST /files`.
///
/// Any field other than `file` is stored as metadata.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File content (.pdf, .jpg, .jpeg or .png).
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Upload response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Identifier of the stored file.
    pub file_id: String,
}

/// A stored file record.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileRecordResponse {
    /// File ID.
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// Blob location on the server.
    pub filepath: String,
    /// Metadata supplied at upload.
    pub metadata: HashMap<String, String>,
    /// Upload time (RFC 3339).
    pub created_at: String,
}

impl From<FileRecord> for FileRecordResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            filepath: record.filepath.to_string_lossy().into_owned(),
            metadata: record.metadata,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}
