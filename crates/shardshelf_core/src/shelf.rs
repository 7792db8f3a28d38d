//! A single persistent shelf with typed keys.

use crate::error::{ShelfError, ShelfResult};
use crate::options::{OpenMode, ShelfOptions};
use shardshelf_codec::{decode_key, encode_key, Key, KeyEncoding};
use shardshelf_storage::{FileBackend, InMemoryBackend, KvBackend};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extension of the backing file derived from a shelf's base path.
const SHELF_EXTENSION: &str = "shelf";

/// A persistent key/value shelf over one physical table.
///
/// A shelf owns exactly one backend table and never shares it. Every
/// operation encodes the [`Key`] to its canonical string form, applies
/// the configured [`KeyEncoding`], and delegates to the backend; reads
/// decode physical keys back to typed keys.
///
/// Values are opaque byte payloads handed to the backend unmodified.
///
/// # Lifecycle
///
/// Open (create or attach, optionally wiping) -> read/write/iterate ->
/// [`Shelf::close`] (flush) or [`Shelf::destroy`] (clear and delete the
/// backing files). Dropping a shelf flushes best-effort.
///
/// # Example
///
/// ```no_run
/// use shardshelf_core::{Shelf, ShelfOptions};
/// use shardshelf_codec::Key;
/// use std::path::Path;
///
/// let mut shelf = Shelf::open(Path::new("box"), &ShelfOptions::new()).unwrap();
/// shelf.set(&Key::from(1), b"one").unwrap();
/// shelf.set(&Key::from("1"), b"also one, but a string").unwrap();
/// assert_eq!(shelf.len(), 2);
/// ```
pub struct Shelf {
    backend: Box<dyn KvBackend>,
    encoding: KeyEncoding,
    path: Option<PathBuf>,
}

impl Shelf {
    /// Opens or creates a file-backed shelf at the given base path.
    ///
    /// The backing file lives at `<path>.shelf`. With `options.replace`
    /// the shelf is emptied immediately after attaching. With
    /// [`OpenMode::MustExist`] a missing backing file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be opened, is
    /// corrupted, or is missing under [`OpenMode::MustExist`].
    pub fn open(path: &Path, options: &ShelfOptions) -> ShelfResult<Self> {
        let file_path = backing_file(path);
        let backend = FileBackend::open(&file_path, options.mode == OpenMode::MustExist)?;

        let mut shelf = Self {
            backend: Box::new(backend),
            encoding: options.key_encoding,
            path: Some(file_path.clone()),
        };
        if options.replace {
            shelf.backend.wipe()?;
        }
        debug!(path = %file_path.display(), entries = shelf.len(), "opened shelf");
        Ok(shelf)
    }

    /// Creates an ephemeral in-memory shelf.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(InMemoryBackend::new()),
            encoding: KeyEncoding::default(),
            path: None,
        }
    }

    /// Returns the path of the backing file, if this shelf is file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the key encoding in effect.
    #[must_use]
    pub fn key_encoding(&self) -> KeyEncoding {
        self.encoding
    }

    fn physical_key(&self, key: &Key) -> ShelfResult<Vec<u8>> {
        Ok(self.encoding.encode(&encode_key(key))?)
    }

    /// Stores `value` under `key`, overwriting any existing entry for a
    /// key with the same canonical encoding.
    pub fn set(&mut self, key: &Key, value: &[u8]) -> ShelfResult<()> {
        let physical = self.physical_key(key)?;
        self.backend.set(&physical, value)?;
        Ok(())
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::KeyNotFound`] if the key is absent.
    pub fn get(&self, key: &Key) -> ShelfResult<Vec<u8>> {
        self.get_opt(key)?
            .ok_or_else(|| ShelfError::key_not_found(encode_key(key)))
    }

    /// Returns the value stored under `key`, or `None` if absent.
    pub fn get_opt(&self, key: &Key) -> ShelfResult<Option<Vec<u8>>> {
        let physical = self.physical_key(key)?;
        Ok(self.backend.get(&physical)?)
    }

    /// Returns the value stored under `key`, or `default` if absent.
    pub fn get_or(&self, key: &Key, default: Vec<u8>) -> ShelfResult<Vec<u8>> {
        Ok(self.get_opt(key)?.unwrap_or(default))
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &Key) -> ShelfResult<bool> {
        Ok(self.get_opt(key)?.is_some())
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::KeyNotFound`] if the key is absent.
    pub fn remove(&mut self, key: &Key) -> ShelfResult<Vec<u8>> {
        let physical = self.physical_key(key)?;
        let value = self
            .backend
            .get(&physical)?
            .ok_or_else(|| ShelfError::key_not_found(encode_key(key)))?;
        self.backend.delete(&physical)?;
        Ok(value)
    }

    /// Returns every key, in the backend's own iteration order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.backend
            .keys()
            .iter()
            .map(|raw| decode_key(raw, self.encoding))
            .collect()
    }

    /// Returns every key sorted by its canonical encoded form.
    ///
    /// Heterogeneous kinds interleave by their textual form, so the
    /// integer `2` lists next to the string `"2"`.
    #[must_use]
    pub fn keys_sorted(&self) -> Vec<Key> {
        let mut keys = self.keys();
        keys.sort_by(Key::cmp_canonical);
        keys
    }

    /// Returns every entry, in the backend's own iteration order.
    pub fn items(&self) -> ShelfResult<Vec<(Key, Vec<u8>)>> {
        let mut items = Vec::with_capacity(self.len());
        for raw in self.backend.keys() {
            let value = self
                .backend
                .get(&raw)?
                .ok_or_else(|| ShelfError::key_not_found(self.encoding.decode(&raw)))?;
            items.push((decode_key(&raw, self.encoding), value));
        }
        Ok(items)
    }

    /// Returns every value, in the backend's own iteration order.
    pub fn values(&self) -> ShelfResult<Vec<Vec<u8>>> {
        Ok(self.items()?.into_iter().map(|(_, v)| v).collect())
    }

    /// Removes and returns one arbitrary entry.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Empty`] when no entries remain.
    pub fn pop_item(&mut self) -> ShelfResult<(Key, Vec<u8>)> {
        let raw = self
            .backend
            .keys()
            .into_iter()
            .next()
            .ok_or(ShelfError::Empty)?;
        let value = self
            .backend
            .get(&raw)?
            .ok_or_else(|| ShelfError::key_not_found(self.encoding.decode(&raw)))?;
        self.backend.delete(&raw)?;
        Ok((decode_key(&raw, self.encoding), value))
    }

    /// Removes every entry by popping until the shelf is empty, so the
    /// cost is proportional to the number of entries.
    pub fn clear(&mut self) -> ShelfResult<()> {
        loop {
            match self.pop_item() {
                Ok(_) => {}
                Err(ShelfError::Empty) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Bulk-applies entries from an iterator of pairs.
    ///
    /// Every key goes through the same encode-on-write path as [`set`],
    /// so existing entries with the same canonical encoding are
    /// overwritten.
    ///
    /// [`set`]: Shelf::set
    pub fn update<I>(&mut self, entries: I) -> ShelfResult<()>
    where
        I: IntoIterator<Item = (Key, Vec<u8>)>,
    {
        for (key, value) in entries {
            self.set(&key, &value)?;
        }
        Ok(())
    }

    /// Returns the existing value for `key`, or stores and returns
    /// `default`. Idempotent under repeated calls with the same default.
    pub fn set_default(&mut self, key: &Key, default: Vec<u8>) -> ShelfResult<Vec<u8>> {
        if let Some(existing) = self.get_opt(key)? {
            return Ok(existing);
        }
        self.set(key, &default)?;
        Ok(default)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Returns `true` if the shelf holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    /// Flushes pending writes to durable storage.
    pub fn flush(&mut self) -> ShelfResult<()> {
        self.backend.flush()?;
        Ok(())
    }

    /// Flushes and closes the shelf.
    pub fn close(mut self) -> ShelfResult<()> {
        self.flush()
    }

    /// Clears the shelf and deletes every backing file.
    ///
    /// A file that is already absent is tolerated; any other removal
    /// failure (for example permission denied) propagates.
    pub fn destroy(mut self) -> ShelfResult<()> {
        self.clear()?;
        for path in self.backend.backing_paths() {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "backing file already absent on destroy");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl Drop for Shelf {
    fn drop(&mut self) {
        let _ = self.backend.flush();
    }
}

impl PartialEq for Shelf {
    /// Two shelves are equal iff their decoded item sets are equal,
    /// regardless of backend or iteration order.
    fn eq(&self, other: &Self) -> bool {
        let (Ok(a), Ok(b)) = (self.items(), other.items()) else {
            return false;
        };
        let a: HashMap<Key, Vec<u8>> = a.into_iter().collect();
        let b: HashMap<Key, Vec<u8>> = b.into_iter().collect();
        a == b
    }
}

impl std::fmt::Debug for Shelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shelf")
            .field("path", &self.path)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

/// Derives the backing file path for a shelf base path.
pub(crate) fn backing_file(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(SHELF_EXTENSION);
    PathBuf::from(os)
}
