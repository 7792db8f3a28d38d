//! Error types for shelf operations.

use std::io;
use thiserror::Error;

/// Result type for shelf operations.
pub type ShelfResult<T> = Result<T, ShelfError>;

/// Errors that can occur during shelf operations.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// The requested key is not present.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// Canonical encoded form of the missing key.
        key: String,
    },

    /// The store holds no entries.
    #[error("store is empty")]
    Empty,

    /// A multi shelf needs at least one shard.
    #[error("shard count must be at least 1, got {n}")]
    InvalidShardCount {
        /// The rejected shard count.
        n: usize,
    },

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] shardshelf_storage::StorageError),

    /// Key codec error.
    #[error("codec error: {0}")]
    Codec(#[from] shardshelf_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShelfError {
    /// Creates a key-not-found error from an encoded key.
    pub fn key_not_found(encoded: impl Into<String>) -> Self {
        Self::KeyNotFound {
            key: encoded.into(),
        }
    }
}
