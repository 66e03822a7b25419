//! tagvault - authenticated file storage with metadata tags.
//!
//! Clients upload files together with arbitrary key/value metadata, fetch
//! them by id, filter them by a single `key:value` tag and delete them.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod web;

pub use auth::{CredentialVerifier, StaticCredentials};
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{FileRecord, FileStore, NewFile, TagFilter};
pub use web::{AppState, WebServer};
