//! Mutation overlay consulted before the static layer.
//!
//! Writes between bulk-loads land here. The representation follows the
//! compression level: speed-leaning configurations use an unordered
//! hash map, memory-leaning ones an adaptive radix tree (smaller and
//! ordered, which also makes the compaction drain free of a sort).

use ahash::AHashMap;

use crate::art::ArtMap;

/// Overlay buffer absorbing inserts and erases.
#[derive(Debug)]
pub enum DeltaBuffer {
    Hash(AHashMap<u64, u64>),
    Art(ArtMap),
}

impl DeltaBuffer {
    /// `ordered` selects the tree representation.
    pub fn new(ordered: bool) -> Self {
        if ordered {
            Self::Art(ArtMap::new())
        } else {
            Self::Hash(AHashMap::new())
        }
    }

    /// Insert a new pair; refuses keys already buffered.
    pub fn insert(&mut self, key: u64, value: u64) -> bool {
        match self {
            Self::Hash(map) => {
                if map.contains_key(&key) {
                    return false;
                }
                map.insert(key, value);
                true
            }
            Self::Art(map) => {
                if map.get(key).is_some() {
                    return false;
                }
                map.insert(key, value);
                true
            }
        }
    }

    pub fn get(&self, key: u64) -> Option<u64> {
        match self {
            Self::Hash(map) => map.get(&key).copied(),
            Self::Art(map) => map.get(key),
        }
    }

    /// Remove a buffered key; `false` when it was not buffered.
    pub fn remove(&mut self, key: u64) -> bool {
        match self {
            Self::Hash(map) => map.remove(&key).is_some(),
            Self::Art(map) => map.remove(key).is_some(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Hash(map) => map.len(),
            Self::Art(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match self {
            Self::Hash(map) => map.clear(),
            Self::Art(map) => map.clear(),
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::Art(_))
    }

    /// All buffered pairs in ascending key order.
    pub fn entries(&self) -> Vec<(u64, u64)> {
        match self {
            Self::Hash(map) => {
                let mut out: Vec<(u64, u64)> = map.iter().map(|(&k, &v)| (k, v)).collect();
                out.sort_unstable_by_key(|&(k, _)| k);
                out
            }
            Self::Art(map) => map.entries(),
        }
    }

    /// Estimated footprint: 16 bytes per entry plus the structure's
    /// overhead factor (30% hash table, 25% tree).
    pub fn memory_bytes(&self) -> usize {
        match self {
            Self::Hash(map) => map.len() * 16 * 13 / 10,
            Self::Art(map) => map.len() * 16 * 5 / 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_find_remove_both_representations() {
        for ordered in [false, true] {
            let mut delta = DeltaBuffer::new(ordered);
            assert_eq!(delta.is_ordered(), ordered);

            assert!(delta.insert(5, 50));
            assert!(!delta.insert(5, 51), "duplicate accepted");
            assert_eq!(delta.get(5), Some(50));
            assert_eq!(delta.get(6), None);
            assert_eq!(delta.len(), 1);

            assert!(delta.remove(5));
            assert!(!delta.remove(5));
            assert!(delta.is_empty());
        }
    }

    #[test]
    fn test_entries_sorted_for_both() {
        for ordered in [false, true] {
            let mut delta = DeltaBuffer::new(ordered);
            for key in [900u64, 3, 77, 500, 42] {
                assert!(delta.insert(key, key + 1));
            }
            assert_eq!(
                delta.entries(),
                vec![(3, 4), (42, 43), (77, 78), (500, 501), (900, 901)]
            );
        }
    }

    #[test]
    fn test_clear() {
        let mut delta = DeltaBuffer::new(true);
        delta.insert(1, 2);
        delta.clear();
        assert!(delta.is_empty());
        assert_eq!(delta.get(1), None);
        assert!(delta.insert(1, 3));
    }

    #[test]
    fn test_memory_overhead_factors() {
        let mut hash = DeltaBuffer::new(false);
        let mut art = DeltaBuffer::new(true);
        for key in 0..100u64 {
            hash.insert(key, key);
            art.insert(key, key);
        }
        assert_eq!(hash.memory_bytes(), 100 * 16 * 13 / 10);
        assert_eq!(art.memory_bytes(), 100 * 16 * 5 / 4);
    }
}
