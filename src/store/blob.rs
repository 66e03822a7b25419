//! Blob storage for uploaded file content.
//!
//! Files live in a single flat directory, one per upload:
//! ```text
//! {base_path}/
//! ├── 0f8e7c1a-…-9b2d_report.pdf
//! └── 5a1c33e0-…-77aa_scan.png
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Result, StoreError};

/// Extensions accepted for upload. Matched case-sensitively against the raw filename.
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".pdf", ".jpg", ".jpeg", ".png"];

/// Whether `filename` is non-empty and ends with an allowed extension.
///
/// `report.PDF` is rejected; the suffix check does not normalize case.
pub fn is_allowed_filename(filename: &str) -> bool {
    !filename.is_empty() && ALLOWED_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
}

/// Filesystem-backed blob storage.
#[derive(Debug, Clone)]
pub struct BlobStorage {
    /// Directory holding all blobs.
    base_path: PathBuf,
}

impl BlobStorage {
    /// Create a new BlobStorage, creating the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path for a blob: `{base_path}/{id}_{filename}`.
    ///
    /// The filename is used verbatim.
    pub fn blob_path(&self, id: &str, filename: &str) -> PathBuf {
        self.base_path.join(format!("{id}_{filename}"))
    }

    /// Write content for `id` and return where it was stored.
    pub async fn store(&self, content: &[u8], id: &str, filename: &str) -> Result<PathBuf> {
        let path = self.blob_path(id, filename);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    /// Open a blob for streaming.
    ///
    /// A blob that is no longer on disk is `StoreError::NotFound`.
    pub async fn open(&self, path: &Path) -> Result<tokio::fs::File> {
        match tokio::fs::File::open(path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound("File".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob. A missing file is an I/O error.
    pub async fn remove(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}
