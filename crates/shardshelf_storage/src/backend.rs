//! Storage backend trait definition.

use crate::error::StorageResult;
use std::path::PathBuf;

/// A low-level associative table backend for ShardShelf.
///
/// Backends are **opaque byte tables**. They map byte keys to byte values
/// and provide simple operations for reading, writing, deleting, and
/// iterating. ShardShelf owns all key interpretation - backends do not
/// understand key encodings or shard routing.
///
/// # Invariants
///
/// - `get` returns exactly the bytes most recently `set` for that key
/// - `delete` removes the key; a second delete of the same key is a no-op
///   that reports `false`
/// - `keys` returns every live key exactly once, in an
///   implementation-defined order
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait KvBackend {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Removes `key` from the table.
    ///
    /// Returns `true` if the key was present.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn delete(&mut self, key: &[u8]) -> StorageResult<bool>;

    /// Returns every live key, in an implementation-defined order.
    fn keys(&self) -> Vec<Vec<u8>>;

    /// Returns the number of live entries.
    fn len(&self) -> usize;

    /// Returns `true` if the table holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flushes all pending writes to durable storage.
    ///
    /// After this returns successfully, all previously written entries
    /// are guaranteed to survive process termination (for persistent
    /// backends; a no-op for ephemeral ones).
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Removes every entry and resets any backing files to empty.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn wipe(&mut self) -> StorageResult<()>;

    /// Returns the filesystem paths backing this table.
    ///
    /// Empty for ephemeral backends. Used by the layer above to implement
    /// whole-store destruction.
    fn backing_paths(&self) -> Vec<PathBuf>;
}
