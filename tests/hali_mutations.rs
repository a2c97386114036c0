//! Insert/erase semantics on top of a loaded static layer, duplicate
//! handling across both layers, and delta-to-static compaction.

use hali::{Hali, Index};

fn loaded() -> Hali {
    let mut index = Hali::new(0.5);
    index.load(&[10, 20, 30, 40, 50], &[1, 2, 3, 4, 5]).unwrap();
    index
}

#[test]
fn test_insert_then_find() {
    let mut index = loaded();

    assert!(index.insert(25, 99));
    assert_eq!(index.find(25), Some(99));
    assert_eq!(index.size(), 6);
}

#[test]
fn test_insert_duplicate_of_static_key_refused() {
    let mut index = loaded();

    assert!(!index.insert(30, 77));
    assert_eq!(index.find(30), Some(3));
    assert_eq!(index.size(), 5);
}

#[test]
fn test_insert_duplicate_of_buffered_key_refused() {
    let mut index = loaded();

    assert!(index.insert(25, 99));
    assert!(!index.insert(25, 100));
    assert_eq!(index.find(25), Some(99));
}

#[test]
fn test_erase_buffered_key() {
    let mut index = loaded();

    assert!(index.insert(25, 99));
    assert!(index.erase(25));
    assert_eq!(index.find(25), None);
    assert_eq!(index.size(), 5);

    // Erasing again reports nothing to remove.
    assert!(!index.erase(25));
}

#[test]
fn test_erase_static_key_is_refused() {
    let mut index = loaded();

    // Lazy deletion never reaches the static layer.
    assert!(!index.erase(30));
    assert_eq!(index.find(30), Some(3));
    assert_eq!(index.size(), 5);
}

#[test]
fn test_insert_erase_reinsert() {
    let mut index = loaded();

    assert!(index.insert(25, 99));
    assert!(index.erase(25));
    assert!(index.insert(25, 111));
    assert_eq!(index.find(25), Some(111));
}

#[test]
fn test_mutations_on_empty_index() {
    let mut index = Hali::new(0.5);

    assert_eq!(index.find(1), None);
    assert!(!index.erase(1));
    assert!(index.insert(1, 10));
    assert_eq!(index.find(1), Some(10));
    assert_eq!(index.size(), 1);
}

#[test]
fn test_delta_overrides_nothing_but_coexists() {
    // Buffered keys interleave with static ones; both resolve.
    let mut index = loaded();
    for k in [5u64, 15, 25, 35, 45, 55] {
        assert!(index.insert(k, k * 10));
    }

    assert_eq!(index.size(), 11);
    assert_eq!(index.find(20), Some(2));
    assert_eq!(index.find(15), Some(150));
    assert_eq!(index.find(55), Some(550));
}

#[test]
fn test_delta_representation_follows_compression() {
    let mut speed = Hali::new(0.0);
    speed.load(&[1, 2], &[1, 2]).unwrap();
    speed.insert(100, 1);
    assert!(!speed.stats().delta_ordered);

    let mut memory = Hali::new(1.0);
    memory.load(&[1, 2], &[1, 2]).unwrap();
    memory.insert(100, 1);
    assert!(memory.stats().delta_ordered);
}

#[test]
fn test_compaction_roundtrip() {
    let keys: Vec<u64> = (0..20_000).map(|i| i * 5).collect();
    let values: Vec<u64> = (0..20_000).collect();

    for c in [0.0, 0.5, 1.0] {
        let mut index = Hali::new(c);
        index.load(&keys, &values).unwrap();

        for i in 0..500u64 {
            assert!(index.insert(i * 5 + 1, i), "c={}", c);
        }
        assert!(index.needs_compaction());

        index.compact().unwrap();
        assert_eq!(index.stats().delta_len, 0);
        assert_eq!(index.size(), 20_500);

        // Both the old static keys and the promoted ones resolve.
        assert_eq!(index.find(55), Some(11));
        assert_eq!(index.find(56), Some(11));
        assert_eq!(index.find(2_496), Some(499));
        assert_eq!(index.find(2_501), None);
    }
}

#[test]
fn test_compaction_of_empty_delta_is_noop() {
    let mut index = loaded();
    index.compact().unwrap();
    assert_eq!(index.size(), 5);
    assert_eq!(index.find(30), Some(3));
}

#[test]
fn test_erased_buffer_key_not_promoted() {
    let mut index = loaded();
    index.insert(25, 99);
    index.insert(35, 88);
    index.erase(25);

    index.compact().unwrap();
    assert_eq!(index.find(25), None);
    assert_eq!(index.find(35), Some(88));
    assert_eq!(index.size(), 6);
}

#[test]
fn test_heavy_mutation_churn() {
    let mut index = Hali::new(0.5);
    let keys: Vec<u64> = (0..10_000).map(|i| i * 2).collect();
    let values: Vec<u64> = (0..10_000).collect();
    index.load(&keys, &values).unwrap();

    // Odd keys cycle through insert and erase.
    for round in 0..3u64 {
        for i in 0..1_000u64 {
            let k = i * 2 + 1;
            assert!(index.insert(k, round * 10_000 + i));
        }
        for i in 0..1_000u64 {
            assert!(index.erase(i * 2 + 1));
        }
    }

    assert_eq!(index.size(), 10_000);
    assert_eq!(index.find(1), None);
    assert_eq!(index.find(2), Some(1));
}
