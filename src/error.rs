//! Error types for tagvault.

use thiserror::Error;

/// Common error type for tagvault.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error from the snapshot file or blob storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error for client input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record or its blob is gone.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for tagvault operations.
pub type Result<T> = std::result::Result<T, StoreError>;
