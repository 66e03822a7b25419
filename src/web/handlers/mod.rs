//! API handlers and shared application state.

pub mod files;

pub use files::*;

use std::sync::Arc;

use crate::auth::CredentialVerifier;
use crate::store::FileStore;

/// Default realm announced in authentication challenges.
pub const DEFAULT_REALM: &str = "tagvault";

/// Default request body limit for uploads (16MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Application state shared by all handlers.
pub struct AppState {
    /// File store.
    pub store: Arc<FileStore>,
    /// Credential verification capability.
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Realm for `WWW-Authenticate` challenges.
    pub realm: String,
    /// Maximum request body size for uploads, in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: Arc<FileStore>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            store,
            verifier,
            realm: DEFAULT_REALM.to_string(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set the authentication realm.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Set the upload size limit in bytes.
    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }
}
