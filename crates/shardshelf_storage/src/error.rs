//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing file does not exist and the open mode requires it.
    #[error("backing file not found: {path}")]
    FileNotFound {
        /// The path that was expected to exist.
        path: String,
    },

    /// The backing file is corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The storage is closed.
    #[error("storage is closed")]
    Closed,
}
