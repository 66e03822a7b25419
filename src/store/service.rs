//! Metadata-indexed file store.
//!
//! Combines the in-memory record map, its JSON snapshot and blob storage.
//! Every operation takes the same lock, so concurrent requests never
//! interleave map mutations or snapshot rewrites.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::blob::{is_allowed_filename, BlobStorage};
use super::filter::TagFilter;
use super::record::{FileRecord, NewFile};
use super::snapshot::Snapshot;
use crate::config::StorageConfig;
use crate::{Result, StoreError};

/// The file store shared by all request handlers.
#[derive(Debug)]
pub struct FileStore {
    records: Mutex<HashMap<String, FileRecord>>,
    blobs: BlobStorage,
    snapshot: Snapshot,
}

impl FileStore {
    /// Open the store, loading the snapshot if one exists.
    pub fn open(upload_dir: impl Into<PathBuf>, metadata_file: impl Into<PathBuf>) -> Result<Self> {
        let blobs = BlobStorage::new(upload_dir)?;
        let snapshot = Snapshot::new(metadata_file);
        let records = snapshot.load()?;

        info!(
            records = records.len(),
            snapshot = %snapshot.path().display(),
            uploads = %blobs.base_path().display(),
            "File store opened"
        );

        Ok(Self {
            records: Mutex::new(records),
            blobs,
            snapshot,
        })
    }

    /// Open the store at the configured locations.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::open(&config.upload_dir, &config.metadata_file)
    }

    /// Get the blob storage.
    pub fn blobs(&self) -> &BlobStorage {
        &self.blobs
    }

    /// Store a new file and its metadata.
    ///
    /// The blob is written and the snapshot rewritten before returning. If the
    /// snapshot cannot be written the record is dropped again and the error
    /// returned.
    pub async fn put(&self, new_file: NewFile) -> Result<FileRecord> {
        if !is_allowed_filename(&new_file.filename) {
            return Err(StoreError::Validation(
                "File must be .pdf, .jpg, .jpeg, or .png".to_string(),
            ));
        }

        let mut records = self.records.lock().await;

        let mut id = Uuid::new_v4().to_string();
        while records.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let filepath = self
            .blobs
            .store(&new_file.content, &id, &new_file.filename)
            .await?;
        let record = FileRecord {
            id: id.clone(),
            filename: new_file.filename,
            filepath,
            metadata: new_file.metadata,
            created_at: chrono::Utc::now(),
        };
        records.insert(id.clone(), record.clone());

        if let Err(e) = self.snapshot.save(&records).await {
            records.remove(&id);
            if let Err(cleanup) = self.blobs.remove(&record.filepath).await {
                warn!(file_id = %id, error = %cleanup, "Failed to remove blob after snapshot error");
            }
            return Err(e);
        }

        info!(
            file_id = %id,
            filename = %record.filename,
            size = new_file.content.len(),
            "File stored"
        );
        Ok(record)
    }

    /// Look up a record by id.
    pub async fn get(&self, id: &str) -> Option<FileRecord> {
        self.records.lock().await.get(id).cloned()
    }

    /// List records, oldest first, optionally restricted by a tag filter.
    pub async fn list(&self, filter: Option<&TagFilter>) -> Vec<FileRecord> {
        let records = self.records.lock().await;
        let mut matching: Vec<FileRecord> = records
            .values()
            .filter(|r| filter.map_or(true, |f| r.matches(f)))
            .cloned()
            .collect();
        drop(records);

        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        matching
    }

    /// Delete a record and its blob.
    ///
    /// Returns `Ok(None)` for an unknown id. The snapshot is rewritten before
    /// the blob is removed; if blob removal then fails the error is returned
    /// and the blob stays orphaned on disk.
    pub async fn delete(&self, id: &str) -> Result<Option<FileRecord>> {
        let mut records = self.records.lock().await;

        let Some(record) = records.remove(id) else {
            return Ok(None);
        };

        if let Err(e) = self.snapshot.save(&records).await {
            records.insert(record.id.clone(), record);
            return Err(e);
        }

        if let Err(e) = self.blobs.remove(&record.filepath).await {
            error!(
                file_id = %id,
                path = %record.filepath.display(),
                error = %e,
                "Record deleted but blob removal failed"
            );
            return Err(e);
        }

        info!(file_id = %id, filename = %record.filename, "File deleted");
        Ok(Some(record))
    }

    /// Open the blob behind a record for streaming.
    ///
    /// The lock is not held, so a concurrent delete can remove the blob
    /// after `get`; that surfaces as `StoreError::NotFound`.
    pub async fn open_blob(&self, record: &FileRecord) -> Result<tokio::fs::File> {
        self.blobs.open(&record.filepath).await
    }

    /// Number of records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> FileStore {
        FileStore::open(dir.path().join("uploads"), dir.path().join("metadata.json")).unwrap()
    }

    fn pdf(name: &str) -> NewFile {
        NewFile::new(name, b"%PDF-1.4 test content".to_vec())
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let record = store
            .put(pdf("testfile.pdf").with_metadata("category", "personal"))
            .await
            .unwrap();

        assert_eq!(record.filename, "testfile.pdf");
        assert_eq!(
            record.filepath,
            dir.path().join("uploads").join(format!("{}_testfile.pdf", record.id))
        );
        assert_eq!(std::fs::read(&record.filepath).unwrap(), b"%PDF-1.4 test content");

        let fetched = store.get(&record.id).await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_put_generates_unique_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let a = store.put(pdf("same.pdf")).await.unwrap();
        let b = store.put(pdf("same.pdf")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(a.filepath, b.filepath);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_put_rejects_disallowed_extension() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        for name in ["notes.txt", "report.PDF", ""] {
            let result = store.put(pdf(name)).await;
            assert!(matches!(result, Err(StoreError::Validation(_))), "{name}");
        }

        assert!(store.is_empty().await);
        assert_eq!(std::fs::read_dir(store.blobs().base_path()).unwrap().count(), 0);
        assert!(!dir.path().join("metadata.json").exists());
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        assert!(store.get("does-not-exist").await.is_none());
    }

    #[tokio::test]
    async fn test_list_with_and_without_filter() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let a = store
            .put(pdf("a.pdf").with_metadata("category", "personal"))
            .await
            .unwrap();
        let b = store
            .put(pdf("b.pdf").with_metadata("category", "work"))
            .await
            .unwrap();
        let c = store
            .put(pdf("c.pdf").with_metadata("category", "personal").with_metadata("year", "2024"))
            .await
            .unwrap();

        let all = store.list(None).await;
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&a.id.as_str()) && ids.contains(&b.id.as_str()));

        let personal = store.list(Some(&TagFilter::new("category", "personal"))).await;
        let mut ids: Vec<_> = personal.iter().map(|r| r.id.clone()).collect();
        ids.sort();
        let mut expected = vec![a.id.clone(), c.id.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        let none = store.list(Some(&TagFilter::new("category", "Personal"))).await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_order_is_oldest_first() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        for name in ["1.pdf", "2.pdf", "3.pdf"] {
            store.put(pdf(name)).await.unwrap();
        }

        let list = store.list(None).await;
        assert!(list
            .windows(2)
            .all(|w| (w[0].created_at, &w[0].id) <= (w[1].created_at, &w[1].id)));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_blob() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let record = store.put(pdf("gone.pdf")).await.unwrap();
        let removed = store.delete(&record.id).await.unwrap().unwrap();

        assert_eq!(removed.id, record.id);
        assert!(store.get(&record.id).await.is_none());
        assert!(!record.filepath.exists());
    }

    #[tokio::test]
    async fn test_delete_unknown() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        assert!(store.delete("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_with_missing_blob_keeps_record_removed() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let record = store.put(pdf("orphan.pdf")).await.unwrap();
        std::fs::remove_file(&record.filepath).unwrap();

        let result = store.delete(&record.id).await;
        assert!(matches!(result, Err(StoreError::Io(_))));

        // The snapshot was already rewritten without the record.
        assert!(store.get(&record.id).await.is_none());
        let reopened = open_store(&dir);
        assert!(reopened.get(&record.id).await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let record = {
            let store = open_store(&dir);
            store
                .put(pdf("keep.pdf").with_metadata("subject", "python"))
                .await
                .unwrap()
        };

        let store = open_store(&dir);
        let reloaded = store.get(&record.id).await.unwrap();
        assert_eq!(reloaded, record);
    }

    #[tokio::test]
    async fn test_open_fails_on_corrupt_snapshot() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("metadata.json"), b"not json").unwrap();

        let result = FileStore::open(dir.path().join("uploads"), dir.path().join("metadata.json"));
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_open_blob() {
        use tokio::io::AsyncReadExt;

        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let record = store.put(pdf("read.pdf")).await.unwrap();

        let mut file = store.open_blob(&record).await.unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"%PDF-1.4 test content");
    }

    #[tokio::test]
    async fn test_open_blob_after_blob_removed() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let record = store.put(pdf("vanished.pdf")).await.unwrap();
        std::fs::remove_file(&record.filepath).unwrap();

        let result = store.open_blob(&record).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    /// Replace the snapshot path with a non-empty directory so the rename fails.
    fn block_snapshot(dir: &TempDir) {
        let path = dir.path().join("metadata.json");
        if path.is_file() {
            std::fs::remove_file(&path).unwrap();
        }
        std::fs::create_dir_all(path.join("occupied")).unwrap();
    }

    #[tokio::test]
    async fn test_put_rolls_back_when_snapshot_fails() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        block_snapshot(&dir);

        let result = store.put(pdf("doomed.pdf")).await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(store.len().await, 0);
        assert_eq!(std::fs::read_dir(store.blobs().base_path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_restores_record_when_snapshot_fails() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let record = store.put(pdf("kept.pdf")).await.unwrap();
        block_snapshot(&dir);

        let result = store.delete(&record.id).await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(store.get(&record.id).await, Some(record.clone()));
        assert!(record.filepath.is_file());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_are_all_persisted() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_store(&dir));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .put(pdf(&format!("{i}.pdf")).with_metadata("n", i.to_string()))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 16);
        let reopened = open_store(&dir);
        assert_eq!(reopened.len().await, 16);
    }
}
