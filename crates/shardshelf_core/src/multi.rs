//! A logical shelf sharded across N physical shelves.

use crate::error::{ShelfError, ShelfResult};
use crate::options::ShelfOptions;
use crate::shelf::Shelf;
use shardshelf_codec::{encode_key, Key};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A persistent key/value store sharded across `N` independent shelves.
///
/// A multi shelf scales one logical store past the practical limits of a
/// single backing file by spreading entries over `N` [`Shelf`] instances,
/// while keeping standard mapping semantics (lookup, membership,
/// iteration, pop).
///
/// # Routing
///
/// An in-memory routing table maps each key's canonical encoding to the
/// index of the shard holding it. The table is rebuilt by scanning every
/// shard on open and is the single source of truth afterwards: a key
/// missing from the table does not exist, and no operation ever falls
/// back to scanning shards.
///
/// New keys are assigned by a rotating cursor over the shard array, so
/// inserts spread round-robin and shard sizes stay within one entry of
/// each other. Overwrites stay on the shard that already holds the key.
/// Eviction ([`MultiShelf::pop_item`]) walks the same rotation from the
/// other end, cycling shards in the order writes fill them.
///
/// # Example
///
/// ```no_run
/// use shardshelf_core::{MultiShelf, ShelfOptions};
/// use shardshelf_codec::Key;
/// use std::path::Path;
///
/// let mut store = MultiShelf::open(Path::new("boxes"), 3, &ShelfOptions::new()).unwrap();
/// store.set(&Key::from("a"), b"A").unwrap();
/// assert!(store.contains(&Key::from("a")));
/// ```
pub struct MultiShelf {
    /// Fixed-size shard array; index is the shard id.
    shards: Vec<Shelf>,
    /// Canonical encoded key -> owning shard index.
    routing: HashMap<String, usize>,
    /// Rotation cursor: the next write target is `cursor`, the next
    /// eviction target the shard just behind it.
    cursor: usize,
}

impl MultiShelf {
    /// Opens or creates a sharded store at the given base path.
    ///
    /// Shard `i` is a plain shelf at `<base>_<i>`, each independently
    /// openable. On open, every shard is scanned in index order to
    /// rebuild the routing table - the dominant cost of opening a large
    /// store. The write cursor starts at the shard currently holding the
    /// fewest entries (ties broken by lowest index), so inserts resume
    /// where balance demands.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::InvalidShardCount`] for `n_shards == 0`, or
    /// any error from opening the underlying shelves.
    pub fn open(base: &Path, n_shards: usize, options: &ShelfOptions) -> ShelfResult<Self> {
        if n_shards == 0 {
            return Err(ShelfError::InvalidShardCount { n: 0 });
        }

        let mut shards = Vec::with_capacity(n_shards);
        for idx in 0..n_shards {
            shards.push(Shelf::open(&shard_path(base, idx), options)?);
        }

        let multi = Self::from_shards(shards);
        debug!(
            base = %base.display(),
            shards = n_shards,
            entries = multi.routing.len(),
            "opened multi shelf"
        );
        Ok(multi)
    }

    /// Creates an ephemeral in-memory sharded store.
    ///
    /// # Panics
    ///
    /// Panics if `n_shards` is zero.
    #[must_use]
    pub fn in_memory(n_shards: usize) -> Self {
        assert!(n_shards > 0, "n_shards must be at least 1");
        Self::from_shards((0..n_shards).map(|_| Shelf::in_memory()).collect())
    }

    fn from_shards(shards: Vec<Shelf>) -> Self {
        // Rebuild the routing table shard by shard; on a pathological
        // key collision across shards the later shard wins, matching
        // insertion order.
        let mut routing = HashMap::new();
        for (idx, shard) in shards.iter().enumerate() {
            for key in shard.keys_sorted() {
                routing.insert(encode_key(&key), idx);
            }
        }

        let cursor = (0..shards.len())
            .min_by_key(|&idx| shards[idx].len())
            .unwrap_or(0);

        Self {
            shards,
            routing,
            cursor,
        }
    }

    /// Returns the number of shards.
    #[must_use]
    pub fn n_shards(&self) -> usize {
        self.shards.len()
    }

    /// Returns the current entry count of each shard, in index order.
    #[must_use]
    pub fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(Shelf::len).collect()
    }

    /// Stores `value` under `key`.
    ///
    /// An existing key is overwritten in place on its recorded shard; a
    /// new key takes the next shard from the rotation and is entered
    /// into the routing table once the physical write succeeds.
    pub fn set(&mut self, key: &Key, value: &[u8]) -> ShelfResult<()> {
        let encoded = encode_key(key);
        if let Some(&idx) = self.routing.get(&encoded) {
            return self.shards[idx].set(key, value);
        }

        let target = self.cursor;
        self.cursor = (self.cursor + 1) % self.shards.len();
        self.shards[target].set(key, value)?;
        self.routing.insert(encoded, target);
        Ok(())
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::KeyNotFound`] if the key is absent from the
    /// routing table.
    pub fn get(&self, key: &Key) -> ShelfResult<Vec<u8>> {
        self.get_opt(key)?
            .ok_or_else(|| ShelfError::key_not_found(encode_key(key)))
    }

    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// A routing-table miss is authoritative absence; shards are never
    /// scanned.
    pub fn get_opt(&self, key: &Key) -> ShelfResult<Option<Vec<u8>>> {
        let encoded = encode_key(key);
        match self.routing.get(&encoded) {
            Some(&idx) => self.shards[idx].get_opt(key),
            None => Ok(None),
        }
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.routing.contains_key(&encode_key(key))
    }

    /// Removes `key` from its owning shard and the routing table.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::KeyNotFound`] if the key is absent.
    pub fn remove(&mut self, key: &Key) -> ShelfResult<Vec<u8>> {
        let encoded = encode_key(key);
        let idx = *self
            .routing
            .get(&encoded)
            .ok_or_else(|| ShelfError::key_not_found(encoded.clone()))?;
        let value = self.shards[idx].remove(key)?;
        self.routing.remove(&encoded);
        Ok(value)
    }

    /// Removes `key` and returns its value, or `None` if absent. The
    /// safe variant of [`MultiShelf::remove`]; never errors on a missing
    /// key.
    pub fn pop(&mut self, key: &Key) -> ShelfResult<Option<Vec<u8>>> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.remove(key).map(Some)
    }

    /// Removes and returns one entry from the shard at the tail of the
    /// rotation, then advances the rotation.
    ///
    /// Successive pops cycle through shard indices in the same order
    /// repeated writes fill them, so interleaved insert/evict workloads
    /// keep shards roughly balanced instead of draining one shard at a
    /// time. Shards emptied by deletions are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Empty`] when the store holds no entries.
    pub fn pop_item(&mut self) -> ShelfResult<(Key, Vec<u8>)> {
        let n = self.shards.len();
        for _ in 0..n {
            let tail = (self.cursor + n - 1) % n;
            self.cursor = (self.cursor + 1) % n;
            if self.shards[tail].is_empty() {
                continue;
            }
            let (key, value) = self.shards[tail].pop_item()?;
            self.routing.remove(&encode_key(&key));
            return Ok((key, value));
        }
        Err(ShelfError::Empty)
    }

    /// Returns every key, concatenated in shard-index order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.shards.iter().flat_map(Shelf::keys).collect()
    }

    /// Returns every entry, concatenated in shard-index order.
    pub fn items(&self) -> ShelfResult<Vec<(Key, Vec<u8>)>> {
        let mut items = Vec::with_capacity(self.len());
        for shard in &self.shards {
            items.extend(shard.items()?);
        }
        Ok(items)
    }

    /// Returns every value, concatenated in shard-index order.
    pub fn values(&self) -> ShelfResult<Vec<Vec<u8>>> {
        Ok(self.items()?.into_iter().map(|(_, v)| v).collect())
    }

    /// Bulk-applies entries from an iterator of pairs; each key goes
    /// through the normal [`MultiShelf::set`] routing.
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
    /// `default`.
    pub fn set_default(&mut self, key: &Key, default: Vec<u8>) -> ShelfResult<Vec<u8>> {
        if let Some(existing) = self.get_opt(key)? {
            return Ok(existing);
        }
        self.set(key, &default)?;
        Ok(default)
    }

    /// Returns the total number of entries across all shards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routing.len()
    }

    /// Returns `true` if no shard holds any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routing.is_empty()
    }

    /// Clears every shard and resets the routing table. The rotation
    /// cursor is left where it is: the next write continues from
    /// wherever the rotation currently points.
    pub fn clear(&mut self) -> ShelfResult<()> {
        for shard in &mut self.shards {
            shard.clear()?;
        }
        self.routing.clear();
        Ok(())
    }

    /// Flushes every shard.
    pub fn flush(&mut self) -> ShelfResult<()> {
        for shard in &mut self.shards {
            shard.flush()?;
        }
        Ok(())
    }

    /// Flushes and closes every shard.
    pub fn close(mut self) -> ShelfResult<()> {
        for shard in self.shards.drain(..) {
            shard.close()?;
        }
        Ok(())
    }

    /// Destroys every shard, deleting all backing files.
    ///
    /// Destruction is best-effort: if one shard fails, the remaining
    /// shards are still destroyed and the first error is reported
    /// afterwards, so a partial file set is never left behind by an
    /// early return.
    pub fn destroy(mut self) -> ShelfResult<()> {
        let mut first_error = None;
        for shard in self.shards.drain(..) {
            if let Err(e) = shard.destroy() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl PartialEq for MultiShelf {
    /// Two stores are equal iff their decoded item sets are equal,
    /// regardless of shard count or key placement.
    fn eq(&self, other: &Self) -> bool {
        let (Ok(a), Ok(b)) = (self.items(), other.items()) else {
            return false;
        };
        let a: HashMap<Key, Vec<u8>> = a.into_iter().collect();
        let b: HashMap<Key, Vec<u8>> = b.into_iter().collect();
        a == b
    }
}

impl std::fmt::Debug for MultiShelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiShelf")
            .field("shards", &self.shards.len())
            .field("entries", &self.routing.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

/// Derives the base path of shard `idx`: the base path with `_<idx>`
/// appended to its final component.
fn shard_path(base: &Path, idx: usize) -> PathBuf {
    let mut os = base.as_os_str().to_os_string();
    os.push(format!("_{idx}"));
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n_shards: usize, n_keys: i64) -> MultiShelf {
        let mut store = MultiShelf::in_memory(n_shards);
        for i in 0..n_keys {
            store.set(&Key::from(i), format!("v{i}").as_bytes()).unwrap();
        }
        store
    }

    #[test]
    fn zero_shards_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = MultiShelf::open(&dir.path().join("m"), 0, &ShelfOptions::new());
        assert!(matches!(result, Err(ShelfError::InvalidShardCount { n: 0 })));
    }

    #[test]
    fn write_read_roundtrip_any_shard_count() {
        for n in [1, 2, 3, 7] {
            let store = filled(n, 50);
            assert_eq!(store.len(), 50);
            for i in 0..50 {
                assert_eq!(
                    store.get(&Key::from(i)).unwrap(),
                    format!("v{i}").as_bytes()
                );
            }
        }
    }

    #[test]
    fn inserts_balance_shards() {
        let store = filled(4, 103);
        let sizes = store.shard_sizes();
        let max = sizes.iter().max().unwrap();
        let min = sizes.iter().min().unwrap();
        assert!(max - min <= 1, "unbalanced shards: {sizes:?}");
    }

    #[test]
    fn alphabet_into_three_shards_splits_nine_nine_eight() {
        let mut store = MultiShelf::in_memory(3);
        for ch in 'a'..='z' {
            store
                .set(&Key::from(ch.to_string()), ch.to_uppercase().to_string().as_bytes())
                .unwrap();
        }

        let mut sizes = store.shard_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![8, 9, 9]);
        assert_eq!(store.len(), 26);
    }

    #[test]
    fn overwrite_never_moves_a_key() {
        let mut store = filled(3, 10);
        let before = store.shard_sizes();

        for i in 0..10 {
            store.set(&Key::from(i), b"rewritten").unwrap();
        }

        assert_eq!(store.shard_sizes(), before);
        assert_eq!(store.len(), 10);
        assert_eq!(store.get(&Key::from(0)).unwrap(), b"rewritten");
    }

    #[test]
    fn routing_miss_is_authoritative() {
        let store = filled(3, 5);
        let absent = Key::from(99);

        assert!(!store.contains(&absent));
        assert_eq!(store.get_opt(&absent).unwrap(), None);
        assert!(matches!(
            store.get(&absent),
            Err(ShelfError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn remove_absent_key_errors() {
        let mut store = filled(2, 3);
        assert!(matches!(
            store.remove(&Key::from(42)),
            Err(ShelfError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn pop_is_safe_on_absent_key() {
        let mut store = filled(2, 3);
        assert_eq!(store.pop(&Key::from(42)).unwrap(), None);
        assert_eq!(store.pop(&Key::from(1)).unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.pop(&Key::from(1)).unwrap(), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn pop_item_drains_every_key_once() {
        let n_keys = 26;
        let mut store = filled(3, n_keys);

        let mut popped = Vec::new();
        for _ in 0..n_keys {
            popped.push(store.pop_item().unwrap().0);
        }

        assert!(store.is_empty());
        assert!(matches!(store.pop_item(), Err(ShelfError::Empty)));

        popped.sort_by(Key::cmp_canonical);
        popped.dedup();
        assert_eq!(popped.len(), n_keys as usize);
    }

    #[test]
    fn pop_item_cycles_shards() {
        let mut store = filled(3, 9);

        // Each consecutive trio of pops must touch three distinct
        // shards: eviction rotates rather than draining one shard.
        for _ in 0..3 {
            let before = store.shard_sizes();
            for _ in 0..3 {
                store.pop_item().unwrap();
            }
            let after = store.shard_sizes();
            for (b, a) in before.iter().zip(after.iter()) {
                assert_eq!(b - a, 1);
            }
        }
    }

    #[test]
    fn pop_item_skips_emptied_shards() {
        let mut store = MultiShelf::in_memory(3);
        store.set(&Key::from("only"), b"v").unwrap();

        // Two shards are empty; pop_item must still find the entry.
        let (key, value) = store.pop_item().unwrap();
        assert_eq!(key, Key::from("only"));
        assert_eq!(value, b"v");
        assert!(store.is_empty());
    }

    #[test]
    fn set_default_is_idempotent() {
        let mut store = MultiShelf::in_memory(3);
        let key = Key::from("k");

        assert_eq!(store.set_default(&key, b"d".to_vec()).unwrap(), b"d");
        assert_eq!(store.set_default(&key, b"d".to_vec()).unwrap(), b"d");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_keeps_cursor_rolling() {
        let mut store = MultiShelf::in_memory(3);
        store.set(&Key::from(0), b"").unwrap();
        store.set(&Key::from(1), b"").unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());

        // The next write lands on shard 2: rotation was not reset.
        store.set(&Key::from(2), b"").unwrap();
        assert_eq!(store.shard_sizes(), vec![0, 0, 1]);
    }

    #[test]
    fn update_routes_through_set() {
        let mut store = MultiShelf::in_memory(2);
        store
            .update(vec![
                (Key::from("a"), b"1".to_vec()),
                (Key::from("b"), b"2".to_vec()),
                (Key::from("a"), b"3".to_vec()),
            ])
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&Key::from("a")).unwrap(), b"3");
        assert_eq!(store.shard_sizes(), vec![1, 1]);
    }

    #[test]
    fn iteration_concatenates_in_shard_order() {
        let mut store = MultiShelf::in_memory(2);
        store.set(&Key::from("a"), b"1").unwrap();
        store.set(&Key::from("b"), b"2").unwrap();
        store.set(&Key::from("c"), b"3").unwrap();

        // Shard 0 holds "a" and "c", shard 1 holds "b"; keys from shard
        // 0 come first whatever their sort order.
        let keys = store.keys();
        assert_eq!(keys.len(), 3);
        let shard0: Vec<Key> = keys[..2].to_vec();
        assert!(shard0.contains(&Key::from("a")));
        assert!(shard0.contains(&Key::from("c")));
        assert_eq!(keys[2], Key::from("b"));

        assert_eq!(store.items().unwrap().len(), 3);
        assert_eq!(store.values().unwrap().len(), 3);
    }

    #[test]
    fn store_equality_ignores_placement() {
        let mut a = MultiShelf::in_memory(2);
        let mut b = MultiShelf::in_memory(5);

        for i in 0..10 {
            a.set(&Key::from(i), b"v").unwrap();
        }
        for i in (0..10).rev() {
            b.set(&Key::from(i), b"v").unwrap();
        }

        assert_eq!(a, b);
        b.set(&Key::from(10), b"v").unwrap();
        assert_ne!(a, b);
    }
}
