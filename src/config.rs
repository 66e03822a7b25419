//! Configuration module for tagvault.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, StoreError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// File and snapshot storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding uploaded blobs.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Path to the JSON metadata snapshot.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

fn default_max_upload_size() -> u64 {
    16
}

impl StorageConfig {
    /// Upload limit in bytes, saturating at `usize::MAX`.
    pub fn max_upload_bytes(&self) -> usize {
        let bytes = self.max_upload_size_mb.saturating_mul(1024 * 1024);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            metadata_file: default_metadata_file(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// A user entry in the static credential table.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    /// Login name.
    pub username: String,
    /// Plaintext password, hashed once at startup.
    pub password: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Realm announced in the `WWW-Authenticate` challenge.
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Users allowed to access the API.
    #[serde(default = "default_users")]
    pub users: Vec<UserEntry>,
}

fn default_realm() -> String {
    "tagvault".to_string()
}

fn default_users() -> Vec<UserEntry> {
    vec![UserEntry {
        username: "user".to_string(),
        password: "password".to_string(),
    }]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            users: default_users(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/tagvault.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StoreError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration, using defaults only when the file does not exist.
    ///
    /// Returns `Ok(None)` for a missing file so the caller can report the
    /// fallback. A file that exists but fails to read or parse is an error.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TAGVAULT_UPLOAD_DIR`: blob directory
    /// - `TAGVAULT_METADATA_FILE`: snapshot path
    /// - `TAGVAULT_PORT`: listen port
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = non_empty_env("TAGVAULT_UPLOAD_DIR") {
            self.storage.upload_dir = dir;
        }
        if let Some(file) = non_empty_env("TAGVAULT_METADATA_FILE") {
            self.storage.metadata_file = file;
        }
        if let Some(port) = non_empty_env("TAGVAULT_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.users.is_empty() {
            return Err(StoreError::Config(
                "auth.users is empty; at least one user is required".to_string(),
            ));
        }
        if self.auth.users.iter().any(|u| u.username.is_empty()) {
            return Err(StoreError::Config(
                "auth.users contains an empty username".to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(StoreError::Config(
                "storage.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
