//! On-disk integration tests: reopen cycles, routing rebuild, destroy.

use shardshelf_codec::Key;
use shardshelf_core::{MultiShelf, Shelf, ShelfError, ShelfOptions};
use std::path::Path;
use tempfile::tempdir;

fn demo_entries() -> Vec<(Key, Vec<u8>)> {
    vec![
        (Key::from("a"), b"A".to_vec()),
        (Key::from(1), b"2".to_vec()),
        (Key::from(true), b"false".to_vec()),
        (Key::from(3.4), b"5.3".to_vec()),
        (
            Key::tuple(vec![Key::from(3), Key::from("a")]),
            b"tuple key".to_vec(),
        ),
        (
            Key::set(vec![Key::from(1), Key::from(2), Key::from(3)]),
            b"set key".to_vec(),
        ),
        (
            Key::map(vec![(Key::from(1), Key::from("a")), (Key::from("b"), Key::from(2))]),
            b"map key".to_vec(),
        ),
    ]
}

#[test]
fn shelf_reopen_preserves_entries_and_kinds() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("box");

    {
        let mut shelf = Shelf::open(&base, &ShelfOptions::new().replace(true)).unwrap();
        for (key, value) in demo_entries() {
            shelf.set(&key, &value).unwrap();
        }
        shelf.close().unwrap();
    }

    let shelf = Shelf::open(&base, &ShelfOptions::new()).unwrap();
    assert_eq!(shelf.len(), demo_entries().len());
    for (key, value) in demo_entries() {
        assert_eq!(shelf.get(&key).unwrap(), value, "key {key:?}");
    }
}

#[test]
fn int_and_string_one_stay_adjacent_across_reopen() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("box");

    {
        let mut shelf = Shelf::open(&base, &ShelfOptions::new()).unwrap();
        shelf.set(&Key::from(1), b"x").unwrap();
        shelf.set(&Key::from("1"), b"y").unwrap();
        shelf.close().unwrap();
    }

    let shelf = Shelf::open(&base, &ShelfOptions::new()).unwrap();
    assert_eq!(shelf.len(), 2);

    // Both keys share the payload "1"; sorting by encoded form lists
    // them adjacent while keeping their kinds distinct.
    let sorted = shelf.keys_sorted();
    assert_eq!(sorted, vec![Key::from(1), Key::from("1")]);
    assert_eq!(shelf.get(&Key::from(1)).unwrap(), b"x");
    assert_eq!(shelf.get(&Key::from("1")).unwrap(), b"y");
}

#[test]
fn multi_reopen_rebuilds_routing_table() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("multi");

    {
        let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new().replace(true)).unwrap();
        for ch in 'a'..='z' {
            store
                .set(&Key::from(ch.to_string()), ch.to_uppercase().to_string().as_bytes())
                .unwrap();
        }
        assert_eq!(store.shard_sizes(), vec![9, 9, 8]);
        store.close().unwrap();
    }

    let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new()).unwrap();
    assert_eq!(store.len(), 26);
    assert_eq!(store.shard_sizes(), vec![9, 9, 8]);

    for ch in 'a'..='z' {
        let key = Key::from(ch.to_string());
        assert!(store.contains(&key));
        assert_eq!(
            store.get(&key).unwrap(),
            ch.to_uppercase().to_string().as_bytes()
        );
    }

    // Routing stays coherent through mutation after the rebuild.
    store.remove(&Key::from("c")).unwrap();
    assert!(!store.contains(&Key::from("c")));
    assert_eq!(store.len(), 25);
}

#[test]
fn multi_reopen_resumes_writes_at_smallest_shard() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("multi");

    {
        let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new().replace(true)).unwrap();
        for i in 0..4 {
            store.set(&Key::from(i), b"v").unwrap();
        }
        assert_eq!(store.shard_sizes(), vec![2, 1, 1]);
        store.close().unwrap();
    }

    let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new()).unwrap();
    store.set(&Key::from(4), b"v").unwrap();
    store.set(&Key::from(5), b"v").unwrap();
    assert_eq!(store.shard_sizes(), vec![2, 2, 2]);
}

#[test]
fn multi_eviction_survives_reopen() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("multi");

    {
        let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new().replace(true)).unwrap();
        for i in 0..12 {
            store.set(&Key::from(i), b"v").unwrap();
        }
        store.close().unwrap();
    }

    let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new()).unwrap();
    let mut popped = Vec::new();
    for _ in 0..12 {
        popped.push(store.pop_item().unwrap().0);
    }
    assert!(store.is_empty());
    assert!(matches!(store.pop_item(), Err(ShelfError::Empty)));

    popped.sort();
    popped.dedup();
    assert_eq!(popped.len(), 12);
}

#[test]
fn shards_are_independently_openable() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("multi");

    {
        let mut store = MultiShelf::open(&base, 2, &ShelfOptions::new().replace(true)).unwrap();
        store.set(&Key::from("a"), b"A").unwrap();
        store.set(&Key::from("b"), b"B").unwrap();
        store.close().unwrap();
    }

    // Each shard is a plain shelf at "<base>_<idx>".
    let shard0 = Shelf::open(Path::new(&format!("{}_0", base.display())), &ShelfOptions::new()).unwrap();
    let shard1 = Shelf::open(Path::new(&format!("{}_1", base.display())), &ShelfOptions::new()).unwrap();

    assert_eq!(shard0.len() + shard1.len(), 2);
    assert_eq!(shard0.get(&Key::from("a")).unwrap(), b"A");
    assert_eq!(shard1.get(&Key::from("b")).unwrap(), b"B");
}

#[test]
fn multi_replace_wipes_all_shards() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("multi");

    {
        let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new()).unwrap();
        for i in 0..9 {
            store.set(&Key::from(i), b"v").unwrap();
        }
        store.close().unwrap();
    }

    let store = MultiShelf::open(&base, 3, &ShelfOptions::new().replace(true)).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.shard_sizes(), vec![0, 0, 0]);
}

#[test]
fn destroy_leaves_no_files_behind() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("multi");

    let mut store = MultiShelf::open(&base, 3, &ShelfOptions::new()).unwrap();
    store.set(&Key::from("a"), b"A").unwrap();
    store.flush().unwrap();
    store.destroy().unwrap();

    let remaining: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(remaining.is_empty(), "leftover files: {remaining:?}");
}

#[test]
fn destroy_continues_past_missing_shard_files() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("multi");

    let store = MultiShelf::open(&base, 3, &ShelfOptions::new()).unwrap();

    // Pull one shard's file out from under the store; destroy must
    // still remove the rest and succeed.
    std::fs::remove_file(format!("{}_1.shelf", base.display())).unwrap();
    store.destroy().unwrap();

    let remaining: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(remaining.is_empty(), "leftover files: {remaining:?}");
}
