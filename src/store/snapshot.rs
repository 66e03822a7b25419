//! Full-map JSON snapshot of the metadata store.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::record::FileRecord;
use crate::Result;

/// The snapshot file holding every record keyed by id.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    /// Create a handle for the snapshot at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is an empty store.
    pub fn load(&self) -> Result<HashMap<String, FileRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records: HashMap<String, FileRecord> = serde_json::from_slice(&bytes)?;
        for (id, record) in records.iter_mut() {
            record.id.clone_from(id);
        }
        Ok(records)
    }

    /// Rewrite the whole snapshot.
    ///
    /// Content goes to `{path}.tmp` first and is renamed over the old file.
    pub async fn save(&self, records: &HashMap<String, FileRecord>) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}
