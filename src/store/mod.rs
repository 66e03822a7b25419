//! File store for tagvault.
//!
//! This module provides:
//! - File records with key/value metadata
//! - Flat-directory blob storage named `{id}_{filename}`
//! - A full JSON snapshot rewritten on every mutation
//! - Single `key:value` tag filtering

mod blob;
mod filter;
mod record;
mod service;
mod snapshot;

pub use blob::{is_allowed_filename, BlobStorage, ALLOWED_EXTENSIONS};
pub use filter::TagFilter;
pub use record::{FileRecord, NewFile};
pub use service::FileStore;
pub use snapshot::Snapshot;
