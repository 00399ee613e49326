//! Custom error types for dbackup.
//!
//! Two kinds of failure exist. Precondition violations are contract errors
//! (negative sizes, arithmetic overflow, malformed paths) and abort the
//! process. Everything else is operational: it is reported to the user and
//! only the current backup is abandoned.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Ignore file already exists: {}", .0.display())]
    IgnoreFileExists(PathBuf),

    #[error("No source directory set: --from must be given before --to")]
    MissingSource,

    #[error("Not enough disk space at {}: {required} bytes required, {available} available", .destination.display())]
    InsufficientSpace {
        destination: PathBuf,
        required: u64,
        available: u64,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackupError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for contract violations that must abort the process.
    pub fn is_precondition(&self) -> bool {
        matches!(self, BackupError::Precondition(_))
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_is_distinct() {
        assert!(BackupError::Precondition("negative buffer".into()).is_precondition());
        assert!(!BackupError::MissingSource.is_precondition());
        assert!(!BackupError::NotFound(PathBuf::from("/nowhere")).is_precondition());
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = BackupError::io(
            "/data/file.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/data/file.txt"));
        assert!(msg.contains("denied"));
    }
}
