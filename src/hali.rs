//! Hierarchical adaptive learned index.
//!
//! Three-level structure over 64-bit keys and payloads:
//! - Level 1: binary-search router over disjoint key-range partitions
//! - Level 2: per-partition experts (PGM / RMI / ART, picked from the
//!   partition's linearity and the compression level)
//! - Level 3: delta buffer absorbing mutations between bulk-loads
//!
//! A global Bloom filter short-circuits negative lookups before
//! routing; each partition carries its own filter behind the router.
//! The static layer is immutable between bulk-loads.

use anyhow::Result;
use tracing::{debug, info};

use crate::bloom::BloomFilter;
use crate::config::HaliConfig;
use crate::delta::DeltaBuffer;
use crate::expert::{select_expert_kind, Expert, ExpertKind};
use crate::index::Index;
use crate::router::Router;

/// Snapshot of an instance's structure, for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct HaliStats {
    pub partition_count: usize,
    pub pgm_partitions: usize,
    pub rmi_partitions: usize,
    pub art_partitions: usize,
    pub empty_partitions: usize,
    pub static_len: usize,
    pub delta_len: usize,
    pub delta_ordered: bool,
    pub global_bloom_fpr: f64,
}

/// Hierarchical adaptive learned index over `u64 -> u64`.
pub struct Hali {
    config: HaliConfig,
    experts: Vec<Expert>,
    router: Router,
    global_bloom: Option<BloomFilter>,
    partition_blooms: Vec<BloomFilter>,
    delta: DeltaBuffer,
    total_size: usize,
}

impl Default for Hali {
    fn default() -> Self {
        Self::with_config(HaliConfig::default())
    }
}

impl Hali {
    /// New empty index with the given compression level (clamped to
    /// [0, 1]).
    pub fn new(compression_level: f64) -> Self {
        Self::with_config(HaliConfig::with_compression_level(compression_level))
    }

    pub fn with_config(config: HaliConfig) -> Self {
        Self {
            config,
            experts: Vec::new(),
            router: Router::default(),
            global_bloom: None,
            partition_blooms: Vec::new(),
            delta: DeltaBuffer::new(config.ordered_delta()),
            total_size: 0,
        }
    }

    pub fn config(&self) -> &HaliConfig {
        &self.config
    }

    pub fn compression_level(&self) -> f64 {
        self.config.compression_level
    }

    /// Whether the delta buffer has outgrown the configured fraction of
    /// the static layer and a [`compact`](Self::compact) would help.
    pub fn needs_compaction(&self) -> bool {
        if self.total_size == 0 {
            return !self.delta.is_empty();
        }
        self.delta.len() as f64 / self.total_size as f64 > self.config.merge_threshold
    }

    /// Merge the delta buffer into the static layer.
    ///
    /// Rebuilds the whole static structure from the union of both
    /// layers; buffered values win over static ones for the same key.
    pub fn compact(&mut self) -> Result<()> {
        if self.delta.is_empty() {
            return Ok(());
        }

        let mut keys = Vec::with_capacity(self.size());
        let mut values = Vec::with_capacity(self.size());
        for expert in &self.experts {
            for (k, v) in expert.entries() {
                keys.push(k);
                values.push(v);
            }
        }
        // Delta entries go last so the last-seen-wins dedup in load
        // keeps them over static duplicates.
        for (k, v) in self.delta.entries() {
            keys.push(k);
            values.push(v);
        }

        let merged = self.delta.len();
        self.load(&keys, &values)?;
        info!(merged, total = self.total_size, "compacted delta buffer into static layer");
        Ok(())
    }

    pub fn stats(&self) -> HaliStats {
        let mut stats = HaliStats {
            partition_count: self.experts.len(),
            static_len: self.total_size,
            delta_len: self.delta.len(),
            delta_ordered: self.delta.is_ordered(),
            global_bloom_fpr: self
                .global_bloom
                .as_ref()
                .map_or(0.0, |b| b.false_positive_rate()),
            ..HaliStats::default()
        };
        for expert in &self.experts {
            if expert.is_empty() {
                stats.empty_partitions += 1;
                continue;
            }
            match expert.kind() {
                ExpertKind::Pgm => stats.pgm_partitions += 1,
                ExpertKind::Rmi => stats.rmi_partitions += 1,
                ExpertKind::Art => stats.art_partitions += 1,
            }
        }
        stats
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> &Router {
        &self.router
    }

    #[cfg(test)]
    pub(crate) fn experts(&self) -> &[Expert] {
        &self.experts
    }

    /// Sort input pairs and collapse duplicate keys to the last-seen
    /// value. The sort is stable, so "last seen" is input order.
    fn sort_and_dedup(keys: &[u64], values: &[u64]) -> Vec<(u64, u64)> {
        let mut pairs: Vec<(u64, u64)> =
            keys.iter().copied().zip(values.iter().copied()).collect();
        pairs.sort_by_key(|&(k, _)| k);

        let mut deduped: Vec<(u64, u64)> = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match deduped.last_mut() {
                Some(last) if last.0 == pair.0 => *last = pair,
                _ => deduped.push(pair),
            }
        }
        deduped
    }
}

impl Index for Hali {
    fn insert(&mut self, key: u64, value: u64) -> bool {
        if self.find(key).is_some() {
            return false;
        }
        self.delta.insert(key, value)
    }

    fn find(&self, key: u64) -> Option<u64> {
        // The buffer overrides the static layer and is not covered by
        // the Bloom hierarchy, so it is probed unconditionally first.
        if let Some(value) = self.delta.get(key) {
            return Some(value);
        }

        if self.experts.is_empty() {
            return None;
        }

        if let Some(bloom) = &self.global_bloom {
            if !bloom.contains(key) {
                return None;
            }
        }

        let partition = self.router.route(key);
        let expert = &self.experts[partition];

        if let Some(bloom) = self.partition_blooms.get(partition) {
            // A negative partition filter alone is not conclusive: the
            // 1-bit filters of empty partitions alias heavily. The
            // range check settles it.
            if !bloom.contains(key) && !expert.owns_key(key) {
                return None;
            }
        }

        expert.find(key)
    }

    fn erase(&mut self, key: u64) -> bool {
        // Lazy deletion: only buffered keys can be erased; the static
        // layer stays untouched until the next load or compaction.
        self.delta.remove(key)
    }

    fn load(&mut self, keys: &[u64], values: &[u64]) -> Result<()> {
        anyhow::ensure!(
            keys.len() == values.len(),
            "keys and values length mismatch: {} vs {}",
            keys.len(),
            values.len()
        );

        self.clear();
        if keys.is_empty() {
            return Ok(());
        }

        let pairs = Self::sort_and_dedup(keys, values);
        let n = pairs.len();
        let min_key = pairs[0].0;
        let max_key = pairs[n - 1].0;

        // Never more partitions than distinct values in the key span,
        // or the derived boundaries would repeat.
        let span_width = (max_key - min_key).saturating_add(1);
        let partitions = if min_key == max_key {
            1
        } else {
            (self.config.partition_count(n) as u64).min(span_width) as usize
        };
        let bits_per_key = self.config.bloom_bits_per_key();

        // Boundaries first, then assignment through the router itself:
        // a key is stored exactly where lookups will route it.
        let span = span_width as f64 / partitions as f64;
        let mut lower_bounds = Vec::with_capacity(partitions);
        for p in 0..partitions {
            lower_bounds.push(min_key + (p as f64 * span) as u64);
        }
        let router = Router::new(lower_bounds, max_key);

        let mut partition_data: Vec<Vec<(u64, u64)>> = vec![Vec::new(); partitions];
        let mut global_bloom = BloomFilter::new(n, bits_per_key);
        for &(key, value) in &pairs {
            partition_data[router.route(key)].push((key, value));
            global_bloom.insert(key);
        }

        self.experts.reserve(partitions);
        self.partition_blooms.reserve(partitions);

        for (p, data) in partition_data.into_iter().enumerate() {
            if data.is_empty() {
                let expected_min = router.lower_bounds()[p];
                let expected_max = if p + 1 < partitions {
                    router.lower_bounds()[p + 1] - 1
                } else {
                    max_key
                };
                self.experts.push(Expert::placeholder(expected_min, expected_max));
                self.partition_blooms.push(BloomFilter::new(1, bits_per_key));
                continue;
            }

            let (part_keys, part_values): (Vec<u64>, Vec<u64>) = data.into_iter().unzip();
            let kind = select_expert_kind(&part_keys, self.config.compression_level);

            let mut bloom = BloomFilter::new(part_keys.len(), bits_per_key);
            for &k in &part_keys {
                bloom.insert(k);
            }
            self.partition_blooms.push(bloom);
            self.experts.push(Expert::build(kind, part_keys, part_values));
        }

        self.router = router;
        self.global_bloom = Some(global_bloom);
        self.total_size = n;

        let stats = self.stats();
        debug!(
            keys = n,
            partitions,
            pgm = stats.pgm_partitions,
            rmi = stats.rmi_partitions,
            art = stats.art_partitions,
            empty = stats.empty_partitions,
            bits_per_key,
            "bulk-loaded static layer"
        );
        Ok(())
    }

    fn size(&self) -> usize {
        self.total_size + self.delta.len()
    }

    fn memory_bytes(&self) -> usize {
        let mut total = 0usize;
        for expert in &self.experts {
            total += expert.memory_bytes();
        }
        if let Some(bloom) = &self.global_bloom {
            total += bloom.memory_bytes();
        }
        for bloom in &self.partition_blooms {
            total += bloom.memory_bytes();
        }
        total += self.router.memory_bytes();
        total += self.delta.memory_bytes();
        total
    }

    fn name(&self) -> String {
        format!("HALIv2(c={:.2})", self.config.compression_level)
    }

    fn clear(&mut self) {
        self.experts.clear();
        self.router.clear();
        self.global_bloom = None;
        self.partition_blooms.clear();
        self.delta.clear();
        self.total_size = 0;
    }
}
