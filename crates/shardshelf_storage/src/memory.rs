//! In-memory table backend for testing and ephemeral storage.

use crate::backend::KvBackend;
use crate::error::StorageResult;
use std::collections::HashMap;
use std::path::PathBuf;

/// An in-memory table backend.
///
/// Data is lost when the backend is dropped. Useful for tests and
/// ephemeral shelves.
///
/// # Example
///
/// ```rust
/// use shardshelf_storage::{KvBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.set(b"key", b"value").unwrap();
/// assert_eq!(backend.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    table: HashMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for InMemoryBackend {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.table.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.table.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.table.remove(key).is_some())
    }

    fn keys(&self) -> Vec<Vec<u8>> {
        self.table.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn wipe(&mut self) -> StorageResult<()> {
        self.table.clear();
        Ok(())
    }

    fn backing_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}
