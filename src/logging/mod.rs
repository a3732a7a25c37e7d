//! Diagnostics for the `ldaplog` binary.
//!
//! Stdout carries log records only, so diagnostics never go there. By default they go to
//! stderr at `warn`, which is where skipped malformed records are reported. When
//! `log_file_path` is configured they are appended to that file at `info` instead.
//! `RUST_LOG` overrides the level in both cases.

use crate::config::ResolvedConfig;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The directory for the log file could not be created.
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The log file path has no file name component.
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// A global subscriber is already installed.
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Where diagnostics are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error.
    Stderr,
    /// A file, created along with its directory if missing.
    File(PathBuf),
}

impl LogTarget {
    /// The target a resolved configuration asks for.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        match &config.log_file_path {
            Some(path) => LogTarget::File(path.clone()),
            None => LogTarget::Stderr,
        }
    }

    /// Level used when `RUST_LOG` is unset.
    pub fn default_level(&self) -> &'static str {
        match self {
            LogTarget::Stderr => "warn",
            LogTarget::File(_) => "info",
        }
    }
}

/// Install the global subscriber for `target`.
///
/// # Errors
///
/// Returns `LoggingError` if the log file location is unusable or a subscriber is
/// already installed.
pub fn init(target: &LogTarget) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(target.default_level()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init(),
        LogTarget::File(path) => {
            let (directory, file_name) = prepare_log_file(path)?;
            builder
                .with_writer(tracing_appender::rolling::never(directory, file_name))
                .with_ansi(false)
                .try_init()
        }
    };
    installed.map_err(|_| LoggingError::SubscriberAlreadySet)
}

// Split the path into directory and file name, creating the directory.
fn prepare_log_file(path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    Ok((directory, file_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn stderr_is_the_default_target() {
        assert_eq!(LogTarget::from_config(&ResolvedConfig::default()), LogTarget::Stderr);
        assert_eq!(LogTarget::Stderr.default_level(), "warn");
    }

    #[test]
    fn configured_path_selects_file_target() {
        let config = ResolvedConfig {
            log_file_path: Some(PathBuf::from("/var/log/ldaplog/diag.log")),
            ..ResolvedConfig::default()
        };
        let target = LogTarget::from_config(&config);
        assert_eq!(target, LogTarget::File(PathBuf::from("/var/log/ldaplog/diag.log")));
        assert_eq!(target.default_level(), "info");
    }

    #[test]
    fn prepare_log_file_creates_missing_directory() {
        let dir = std::env::temp_dir().join("ldaplog_test_logs_create").join("nested");
        let _ = fs::remove_dir_all(&dir);

        let (directory, file_name) = prepare_log_file(&dir.join("diag.log")).unwrap();
        assert_eq!(directory, dir);
        assert_eq!(file_name, "diag.log");
        assert!(dir.is_dir());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn bare_file_name_logs_to_current_directory() {
        let (directory, file_name) = prepare_log_file(Path::new("diag.log")).unwrap();
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, "diag.log");
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(matches!(
            prepare_log_file(Path::new("/")),
            Err(LoggingError::InvalidPath(_))
        ));
    }
}
