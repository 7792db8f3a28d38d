//! File-based table backend for persistent storage.

use crate::backend::KvBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Log record opcodes.
const OP_PUT: u8 = 0;
const OP_DELETE: u8 = 1;

/// Size of a record header: opcode + key length + value length.
const HEADER_LEN: usize = 1 + 4 + 4;

/// A file-based table backend.
///
/// Entries are persisted as an append-only log of put/delete records.
/// On open, the log is replayed into an in-memory table; a torn record
/// at the tail (from a crash mid-write) is discarded by truncating the
/// file back to the last complete record.
///
/// # Durability
///
/// - `flush()` pushes buffered writes to the OS and calls
///   `File::sync_all()` so entries survive process termination
///
/// # Thread Safety
///
/// Mutation requires `&mut self`; callers sharing a backend across
/// threads must serialize access themselves.
///
/// # Example
///
/// ```no_run
/// use shardshelf_storage::{KvBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("data.shelf"), false).unwrap();
/// backend.set(b"key", b"value").unwrap();
/// backend.flush().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<File>,
    table: HashMap<Vec<u8>, Vec<u8>>,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// If the file exists, its log is replayed to rebuild the table.
    /// If it doesn't exist and `must_exist` is false, a new empty file
    /// is created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the file is missing and
    /// `must_exist` is true, [`StorageError::Corrupted`] if the log
    /// contains an undecodable record, or an I/O error otherwise.
    pub fn open(path: &Path, must_exist: bool) -> StorageResult<Self> {
        if must_exist && !path.exists() {
            return Err(StorageError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        let (table, good_len) = replay(&data)?;

        // Discard a torn tail record left by a crash mid-append.
        if (good_len as u64) < data.len() as u64 {
            file.set_len(good_len as u64)?;
            file.sync_all()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            table,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_record(&self, op: u8, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let mut record = Vec::with_capacity(HEADER_LEN + key.len() + value.len());
        record.push(op);
        record.extend_from_slice(&(key.len() as u32).to_le_bytes());
        record.extend_from_slice(&(value.len() as u32).to_le_bytes());
        record.extend_from_slice(key);
        record.extend_from_slice(value);

        let mut file = self.file.write();
        file.seek(SeekFrom::End(0))?;
        file.write_all(&record)?;
        Ok(())
    }
}

/// Replays a log buffer into a table.
///
/// Returns the rebuilt table and the byte offset of the last complete
/// record. A record that is cut off by the end of the buffer is treated
/// as a torn tail, not corruption.
fn replay(data: &[u8]) -> StorageResult<(HashMap<Vec<u8>, Vec<u8>>, usize)> {
    let mut table = HashMap::new();
    let mut pos = 0usize;

    while data.len() - pos >= HEADER_LEN {
        let op = data[pos];
        let key_len = u32::from_le_bytes([data[pos + 1], data[pos + 2], data[pos + 3], data[pos + 4]]) as usize;
        let val_len = u32::from_le_bytes([data[pos + 5], data[pos + 6], data[pos + 7], data[pos + 8]]) as usize;

        let body_start = pos + HEADER_LEN;
        let Some(body_end) = body_start.checked_add(key_len + val_len) else {
            return Err(StorageError::Corrupted(format!(
                "record at offset {pos} claims impossible length"
            )));
        };
        if body_end > data.len() {
            // Torn tail: stop at the last complete record.
            break;
        }

        let key = data[body_start..body_start + key_len].to_vec();
        match op {
            OP_PUT => {
                let value = data[body_start + key_len..body_end].to_vec();
                table.insert(key, value);
            }
            OP_DELETE => {
                table.remove(&key);
            }
            other => {
                return Err(StorageError::Corrupted(format!(
                    "unknown opcode {other} at offset {pos}"
                )));
            }
        }
        pos = body_end;
    }

    Ok((table, pos))
}

impl KvBackend for FileBackend {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.table.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.append_record(OP_PUT, key, value)?;
        self.table.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<bool> {
        if !self.table.contains_key(key) {
            return Ok(false);
        }
        self.append_record(OP_DELETE, key, &[])?;
        self.table.remove(key);
        Ok(true)
    }

    fn keys(&self) -> Vec<Vec<u8>> {
        self.table.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    fn wipe(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.set_len(0)?;
        file.sync_all()?;
        drop(file);
        self.table.clear();
        Ok(())
    }

    fn backing_paths(&self) -> Vec<PathBuf> {
        vec![self.path.clone()]
    }
}
