//! Error types for chunk storage

use std::path::PathBuf;
use thiserror::Error;

use crate::table::TableError;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not hold a readable table
    #[error("{} does not contain a valid table: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    /// Item not found
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),
}

impl StorageError {
    /// Create an I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Create a format error for `path`
    pub fn format(path: impl Into<PathBuf>, source: TableError) -> Self {
        Self::Format {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
