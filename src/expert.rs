//! Per-partition lookup experts.
//!
//! Each partition of the static layer is served by one expert chosen
//! from a closed set: a PGM cover for near-perfectly linear data, a
//! single linear model with a bounded verification window (RMI) for
//! mostly-linear data, and an adaptive radix tree for everything else.
//! The selection thresholds shift with the compression level, and tiny
//! partitions always fall back to the tree.
//!
//! Experts trust the router: a query reaching an expert is already
//! known to belong to its key range.

use crate::art::ArtMap;
use crate::linear::{find_in_window, linearity, LinearModel};
use crate::pgm::PgmSegments;

/// Maximum rank error of the PGM cover.
pub const PGM_EPSILON: usize = 64;

/// Half-width of the RMI verification window.
pub const RMI_ERROR: usize = 64;

/// Below this partition size model fitting is pointless.
const MIN_LEARNABLE_KEYS: usize = 100;

/// The lookup strategy kinds a partition can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpertKind {
    Pgm,
    Rmi,
    Art,
}

/// Pick an expert kind from the linearity of `(key, rank)` and the
/// compression level.
///
/// Speed-leaning configurations avoid PGM entirely; memory-leaning
/// ones avoid the tree.
pub fn select_expert_kind(keys: &[u64], compression_level: f64) -> ExpertKind {
    if keys.len() < MIN_LEARNABLE_KEYS {
        return ExpertKind::Art;
    }

    let r2 = linearity(keys);

    if compression_level < 0.3 {
        if r2 > 0.90 {
            ExpertKind::Rmi
        } else {
            ExpertKind::Art
        }
    } else if compression_level > 0.7 {
        if r2 > 0.70 {
            ExpertKind::Pgm
        } else {
            ExpertKind::Rmi
        }
    } else if r2 > 0.95 {
        ExpertKind::Pgm
    } else if r2 > 0.80 {
        ExpertKind::Rmi
    } else {
        ExpertKind::Art
    }
}

#[derive(Debug)]
pub struct PgmExpert {
    keys: Vec<u64>,
    values: Vec<u64>,
    segments: PgmSegments,
}

#[derive(Debug)]
pub struct RmiExpert {
    keys: Vec<u64>,
    values: Vec<u64>,
    model: LinearModel,
    /// Verification half-window: at least `RMI_ERROR`, widened to the
    /// worst prediction error seen at build time so a present key can
    /// never fall outside the searched slice.
    error: usize,
}

#[derive(Debug)]
pub struct ArtExpert {
    tree: ArtMap,
}

/// One partition's expert together with its inclusive key range.
///
/// `min_key`/`max_key` are the partition's actual extremes; for an
/// empty placeholder they hold the expected range assigned by the
/// bulk-load so the range guard still works.
#[derive(Debug)]
pub struct Expert {
    min_key: u64,
    max_key: u64,
    strategy: Strategy,
}

#[derive(Debug)]
enum Strategy {
    Pgm(PgmExpert),
    Rmi(RmiExpert),
    Art(ArtExpert),
}

impl Expert {
    /// Build an expert of the given kind over one partition's sorted,
    /// deduplicated keys and parallel values.
    pub fn build(kind: ExpertKind, keys: Vec<u64>, values: Vec<u64>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        debug_assert!(!keys.is_empty());

        let min_key = keys[0];
        let max_key = keys[keys.len() - 1];

        let strategy = match kind {
            ExpertKind::Pgm => {
                let segments = PgmSegments::build(&keys, PGM_EPSILON);
                Strategy::Pgm(PgmExpert {
                    keys,
                    values,
                    segments,
                })
            }
            ExpertKind::Rmi => {
                let model = LinearModel::fit(&keys);
                let max_pos = keys.len() - 1;
                let error = keys
                    .iter()
                    .enumerate()
                    .map(|(i, &k)| model.predict(k, max_pos).abs_diff(i))
                    .max()
                    .unwrap_or(0)
                    .max(RMI_ERROR);
                Strategy::Rmi(RmiExpert {
                    keys,
                    values,
                    model,
                    error,
                })
            }
            ExpertKind::Art => {
                let mut tree = ArtMap::new();
                for (&k, &v) in keys.iter().zip(values.iter()) {
                    tree.insert(k, v);
                }
                Strategy::Art(ArtExpert { tree })
            }
        };

        Self {
            min_key,
            max_key,
            strategy,
        }
    }

    /// Placeholder for a partition that received no keys; answers every
    /// lookup with a miss but keeps partition ids stable.
    pub fn placeholder(expected_min: u64, expected_max: u64) -> Self {
        Self {
            min_key: expected_min,
            max_key: expected_max,
            strategy: Strategy::Art(ArtExpert {
                tree: ArtMap::new(),
            }),
        }
    }

    /// Exact-match lookup.
    pub fn find(&self, key: u64) -> Option<u64> {
        match &self.strategy {
            Strategy::Pgm(e) => {
                let (lo, hi) = e.segments.search(key);
                find_in_window(&e.keys, key, lo, hi).map(|i| e.values[i])
            }
            Strategy::Rmi(e) => {
                if e.keys.is_empty() {
                    return None;
                }
                let pos = e.model.predict(key, e.keys.len() - 1);
                let lo = pos.saturating_sub(e.error);
                let hi = pos + e.error + 1;
                find_in_window(&e.keys, key, lo, hi).map(|i| e.values[i])
            }
            Strategy::Art(e) => e.tree.get(key),
        }
    }

    pub fn kind(&self) -> ExpertKind {
        match &self.strategy {
            Strategy::Pgm(_) => ExpertKind::Pgm,
            Strategy::Rmi(_) => ExpertKind::Rmi,
            Strategy::Art(_) => ExpertKind::Art,
        }
    }

    pub fn len(&self) -> usize {
        match &self.strategy {
            Strategy::Pgm(e) => e.keys.len(),
            Strategy::Rmi(e) => e.keys.len(),
            Strategy::Art(e) => e.tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn min_key(&self) -> u64 {
        self.min_key
    }

    pub fn max_key(&self) -> u64 {
        self.max_key
    }

    /// Whether `key` lies in the expert's inclusive range.
    #[inline]
    pub fn owns_key(&self, key: u64) -> bool {
        key >= self.min_key && key <= self.max_key
    }

    /// Every `(key, value)` pair in ascending key order.
    pub fn entries(&self) -> Vec<(u64, u64)> {
        match &self.strategy {
            Strategy::Pgm(e) => e.keys.iter().copied().zip(e.values.iter().copied()).collect(),
            Strategy::Rmi(e) => e.keys.iter().copied().zip(e.values.iter().copied()).collect(),
            Strategy::Art(e) => e.tree.entries(),
        }
    }

    /// Estimated footprint in bytes.
    ///
    /// PGM and RMI carry their arrays plus model state (one segment per
    /// ~5000 keys for PGM); the tree pays a 25% node overhead on its
    /// entries.
    pub fn memory_bytes(&self) -> usize {
        match &self.strategy {
            Strategy::Pgm(e) => e.keys.len() * 16 + (e.keys.len() / 5000) * 20,
            Strategy::Rmi(e) => e.keys.len() * 16 + std::mem::size_of::<LinearModel>(),
            Strategy::Art(e) => e.tree.len() * 16 * 5 / 4,
        }
    }
}
