//! # ShardShelf Storage
//!
//! Byte-keyed table backends for ShardShelf.
//!
//! This crate provides the lowest-level storage abstraction for ShardShelf.
//! Backends are **opaque associative tables** from byte keys to byte
//! values - they do not interpret the data they store.
//!
//! ## Design Principles
//!
//! - Backends are simple byte tables (get, set, delete, iterate)
//! - No knowledge of key encodings, shelves, or shard routing
//! - ShardShelf owns all key interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using an append-only log
//!
//! ## Example
//!
//! ```rust
//! use shardshelf_storage::{KvBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.set(b"hello", b"world").unwrap();
//! assert_eq!(backend.get(b"hello").unwrap(), Some(b"world".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::KvBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
