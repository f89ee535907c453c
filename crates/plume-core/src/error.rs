//! Error types for listing operations.

use std::path::PathBuf;

use derive_builder::UninitializedFieldError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a listing before any node is constructed.
#[derive(Debug, Error)]
pub enum ListError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Listed path is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid presentation options.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ListError {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

impl From<UninitializedFieldError> for ListError {
    fn from(err: UninitializedFieldError) -> Self {
        Self::invalid_config(err.to_string())
    }
}

/// Kind of listing warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Symbolic link target does not exist.
    BrokenSymlink,
    /// Symbolic link resolves back onto itself.
    SymlinkLoop,
    /// Error reading a directory entry.
    ReadError,
    /// Entry vanished or could not be stated.
    MetadataError,
}

/// Non-fatal anomaly recorded while listing. The affected node is still listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ListWarning {
    /// Create a new listing warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a broken symlink warning.
    pub fn broken_symlink(path: impl Into<PathBuf>, target: &str) -> Self {
        let path = path.into();
        Self {
            message: format!("Broken symlink: {} -> {target}", path.display()),
            path,
            kind: WarningKind::BrokenSymlink,
        }
    }

    /// Create a symlink loop warning.
    pub fn symlink_loop(path: impl Into<PathBuf>, target: &str) -> Self {
        let path = path.into();
        Self {
            message: format!("Symlink loop: {} -> {target}", path.display()),
            path,
            kind: WarningKind::SymlinkLoop,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Read error: {error}"),
            path,
            kind: WarningKind::ReadError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_error_io() {
        let err = ListError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ListError::PermissionDenied { .. }));

        let err = ListError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ListError::NotFound { .. }));
    }

    #[test]
    fn test_uninitialized_field_is_invalid_config() {
        let err = ListError::from(UninitializedFieldError::new("icon"));
        let ListError::InvalidConfig { message } = &err else {
            panic!("expected InvalidConfig, got {err:?}");
        };
        assert!(message.contains("icon"));
    }

    #[test]
    fn test_list_warning_creation() {
        let warning = ListWarning::symlink_loop("/test/x", "x");
        assert_eq!(warning.kind, WarningKind::SymlinkLoop);
        assert!(warning.message.contains("-> x"));
    }
}
