//! HALI - Hierarchical Adaptive Learned Index
//!
//! An in-memory ordered index over 64-bit integer keys and payloads.
//!
//! Key features:
//! - Disjoint key-range partitioning with O(log N) binary-search routing
//! - Per-partition experts picked from data linearity: PGM, RMI, or ART
//! - Two-tier Bloom filter hierarchy for fast negative lookups
//! - Delta buffer absorbing mutations between bulk-loads
//! - One compression-level dial trading lookup latency for memory density
//!
//! ```
//! use hali::{Hali, Index};
//!
//! let mut index = Hali::new(0.5);
//! index.load(&[10, 20, 30], &[1, 2, 3]).unwrap();
//! assert_eq!(index.find(20), Some(2));
//! assert_eq!(index.find(25), None);
//! ```

// ===== Core modules =====

// Key hashing for filter probes
pub mod hash;

// Bloom filters (global + per-partition)
pub mod bloom;

// Piecewise-linear cover with bounded error
pub mod pgm;

// Linear regression fit, linearity score, bounded search
pub mod linear;

// Adaptive radix tree over 64-bit keys
pub mod art;

// Per-partition lookup experts and selection
pub mod expert;

// Partition routing over disjoint key ranges
pub mod router;

// Mutation overlay between bulk-loads
pub mod delta;

// Tunable parameters and the compression-level dial
pub mod config;

// Common index contract
pub mod index;

// The three-level index itself
pub mod hali;

// ===== Public API =====

pub use bloom::BloomFilter;
pub use config::{HaliConfig, Workload};
pub use delta::DeltaBuffer;
pub use expert::{Expert, ExpertKind};
pub use hali::{Hali, HaliStats};
pub use index::Index;
pub use pgm::PgmSegments;
pub use router::Router;
