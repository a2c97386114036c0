//! Fast non-cryptographic hashing for filter probes.
//!
//! Keys are hashed as their raw little-endian 8-byte representation.
//! The Bloom filter derives all of its probe positions from a single
//! composite hash, so each filter operation costs exactly two xxhash
//! invocations regardless of how many hash functions it uses.

use xxhash_rust::xxh64::xxh64;

/// Hash a key with the given seed.
#[inline]
pub fn hash_key(key: u64, seed: u64) -> u64 {
    xxh64(&key.to_le_bytes(), seed)
}

/// Composite hash `(h1, h2)` for double hashing.
///
/// `h2` is seeded with `h1` so the two halves are independent enough
/// for `h1 + i*h2` to behave like a family of k hash functions.
#[inline]
pub fn composite_hash(key: u64) -> (u64, u64) {
    let h1 = hash_key(key, 0);
    let h2 = hash_key(key, h1);
    (h1, h2)
}
