//! Common contract for point-lookup indexes.

use anyhow::Result;

/// Map-like API over 64-bit keys and payloads.
///
/// Implementations answer point queries only; mutation support may be
/// partial (an implementation may buffer writes and reject deletes of
/// bulk-loaded keys).
pub trait Index {
    /// Insert a pair; `false` if the key is already present.
    fn insert(&mut self, key: u64, value: u64) -> bool;

    /// Value for `key`, if present.
    fn find(&self, key: u64) -> Option<u64>;

    /// Remove a key; `false` if nothing was removed.
    fn erase(&mut self, key: u64) -> bool;

    /// Replace all state with the given pairs.
    ///
    /// Fails when `keys` and `values` differ in length, leaving the
    /// instance unchanged.
    fn load(&mut self, keys: &[u64], values: &[u64]) -> Result<()>;

    /// Number of stored pairs.
    fn size(&self) -> usize;

    /// Estimated memory footprint in bytes.
    fn memory_bytes(&self) -> usize;

    /// Identifier for reporting, e.g. `"HALIv2(c=0.50)"`.
    fn name(&self) -> String;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Drop all state.
    fn clear(&mut self);
}
