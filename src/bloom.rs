//! Bloom filter for fast negative lookups.
//!
//! A standard bloom filter with the bit array packed into 64-bit words.
//! All k probe positions are derived from one composite hash via double
//! hashing, so membership checks hash the key exactly twice.
//!
//! No false negatives; the false positive rate is `(1 - e^(-kn/m))^k`,
//! roughly 1% at 10 bits per key.

use crate::hash::composite_hash;

/// Approximation of ln 2 used to derive the hash function count.
const LN_2: f64 = 0.693;

#[derive(Debug, Clone)]
pub struct BloomFilter {
    /// Bit array packed in 64-bit words.
    words: Vec<u64>,
    /// Total bits (always a multiple of 64).
    num_bits: u64,
    /// Number of derived hash functions.
    num_hashes: usize,
    /// Count of inserted elements.
    num_inserted: usize,
}

impl BloomFilter {
    /// Create a filter sized for `expected_elements` at `bits_per_key`.
    ///
    /// The bit count is rounded up to a whole word; `k` is the optimal
    /// `bits_per_key * ln 2`, floored, with a minimum of one.
    pub fn new(expected_elements: usize, bits_per_key: usize) -> Self {
        let raw_bits = (expected_elements * bits_per_key) as u64;
        let num_bits = ((raw_bits + 63) / 64).max(1) * 64;
        let num_hashes = ((bits_per_key as f64 * LN_2) as usize).max(1);

        Self {
            words: vec![0u64; (num_bits / 64) as usize],
            num_bits,
            num_hashes,
            num_inserted: 0,
        }
    }

    /// Set all k bits for `key`.
    pub fn insert(&mut self, key: u64) {
        let (h1, h2) = composite_hash(key);
        for i in 0..self.num_hashes as u64 {
            let bit = h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits;
            self.words[(bit / 64) as usize] |= 1u64 << (bit % 64);
        }
        self.num_inserted += 1;
    }

    /// Whether `key` might be present.
    ///
    /// `false` means definitely absent; `true` means possibly present.
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        let (h1, h2) = composite_hash(key);
        for i in 0..self.num_hashes as u64 {
            let bit = h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits;
            if self.words[(bit / 64) as usize] & (1u64 << (bit % 64)) == 0 {
                return false;
            }
        }
        true
    }

    /// Zero all words and reset the insert counter.
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.num_inserted = 0;
    }

    /// Theoretical false positive rate `(1 - e^(-kn/m))^k` for the
    /// current fill level.
    pub fn false_positive_rate(&self) -> f64 {
        if self.num_inserted == 0 {
            return 0.0;
        }
        let k = self.num_hashes as f64;
        let exponent = -(k * self.num_inserted as f64) / self.num_bits as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    pub fn memory_bytes(&self) -> usize {
        self.words.capacity() * 8
    }

    pub fn len(&self) -> usize {
        self.num_inserted
    }

    pub fn is_empty(&self) -> bool {
        self.num_inserted == 0
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }
}
