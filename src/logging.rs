//! Logging setup.
//!
//! Events go to stdout and, when [`init`] is used, are appended to the
//! configured log file. `RUST_LOG` overrides the configured level.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::{Result, StoreError};

/// Normalize a configured level name; unknown names mean `info`.
fn level_name(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => "off",
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Directives used when `RUST_LOG` is not set.
///
/// hyper is held at `warn` so connection chatter stays out of debug logs.
fn default_directives(level: &str) -> String {
    let level = level_name(level);
    match level {
        "off" | "error" | "warn" => level.to_string(),
        _ => format!("{level},hyper=warn"),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Open the log file for appending, creating parent directories.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber: colored stdout plus a plain-text log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_file = open_log_file(Path::new(&config.file))?;

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| StoreError::Config(format!("failed to install logger: {e}")))
}

/// Install a stdout-only subscriber. Does nothing if one is already set.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_writer(std::io::stdout))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_level_name() {
        assert_eq!(level_name("DEBUG"), "debug");
        assert_eq!(level_name(" warning "), "warn");
        assert_eq!(level_name("off"), "off");
        assert_eq!(level_name("verbose"), "info");
        assert_eq!(level_name(""), "info");
    }

    #[test]
    fn test_default_directives_quiet_hyper() {
        assert_eq!(default_directives("debug"), "debug,hyper=warn");
        assert_eq!(default_directives("info"), "info,hyper=warn");
        assert_eq!(default_directives("error"), "error");
    }

    #[test]
    fn test_open_log_file_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs/nested/tagvault.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
