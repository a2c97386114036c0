//! Index configuration.
//!
//! A single compression level in [0, 1] tunes the whole structure:
//! partition count, Bloom filter bit budget, expert selection
//! thresholds, and the delta buffer representation. 0.0 favours lookup
//! speed, 1.0 favours memory density.
//!
//! Sources, highest priority first: environment variables (`HALI_*`),
//! an optional JSON config file, built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Tunable parameters for a HALI instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HaliConfig {
    /// Memory-vs-speed dial in [0, 1]; out-of-range values are clamped.
    pub compression_level: f64,
    /// Compaction is suggested once the delta buffer exceeds this
    /// fraction of the static layer.
    pub merge_threshold: f64,
}

impl Default for HaliConfig {
    fn default() -> Self {
        Self {
            compression_level: 0.5,
            merge_threshold: 0.01,
        }
    }
}

/// Workload shape hint for [`HaliConfig::recommended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    ReadHeavy,
    Mixed,
    WriteHeavy,
}

impl HaliConfig {
    /// Configuration with the given compression level, clamped to [0, 1].
    pub fn with_compression_level(compression_level: f64) -> Self {
        Self {
            compression_level: compression_level.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Load defaults, then apply `HALI_COMPRESSION_LEVEL` and
    /// `HALI_MERGE_THRESHOLD` overrides when set and parseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var("HALI_COMPRESSION_LEVEL") {
            match value.parse::<f64>() {
                Ok(level) => config.compression_level = level.clamp(0.0, 1.0),
                Err(_) => eprintln!(
                    "Warning: could not parse HALI_COMPRESSION_LEVEL from '{}'. Using default: {}",
                    value, config.compression_level
                ),
            }
        }

        if let Ok(value) = env::var("HALI_MERGE_THRESHOLD") {
            match value.parse::<f64>() {
                Ok(threshold) => config.merge_threshold = threshold.clamp(0.0001, 0.5),
                Err(_) => eprintln!(
                    "Warning: could not parse HALI_MERGE_THRESHOLD from '{}'. Using default: {}",
                    value, config.merge_threshold
                ),
            }
        }

        config
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.compression_level),
            "compression level must be within [0, 1], got {}",
            self.compression_level
        );
        anyhow::ensure!(
            self.merge_threshold > 0.0,
            "merge threshold must be positive, got {}",
            self.merge_threshold
        );
        Ok(())
    }

    /// Recommended configuration for a dataset size and workload.
    ///
    /// Smaller datasets route faster with fewer partitions; larger ones
    /// approximate better with more. Thresholds follow the systematic
    /// sweep on the reference hardware (250K / 1M / 5M keys).
    pub fn recommended(dataset_size: usize, workload: Workload) -> Self {
        let compression_level = if dataset_size < 250_000 {
            0.0
        } else if dataset_size < 1_000_000 {
            0.25
        } else if dataset_size < 5_000_000 {
            0.5
        } else {
            0.75
        };

        let merge_threshold = match workload {
            Workload::ReadHeavy => 0.005,
            Workload::Mixed => 0.01,
            Workload::WriteHeavy => 0.05,
        };

        Self {
            compression_level,
            merge_threshold,
        }
    }

    /// Load from a JSON file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }

    // ----- derived parameters -----

    /// Partition count for a static layer of `n` keys:
    /// `max(4, sqrt(n)/100)` scaled by `0.5 + 1.5 * c`, at least 4.
    pub fn partition_count(&self, n: usize) -> usize {
        let base = ((n as f64).sqrt() / 100.0) as usize;
        let base = base.max(4);
        let scaled = (base as f64 * (0.5 + 1.5 * self.compression_level)) as usize;
        scaled.max(4)
    }

    /// Bloom filter budget: 5 bits/key at full speed up to 15 at full
    /// compression.
    pub fn bloom_bits_per_key(&self) -> usize {
        (5.0 + self.compression_level * 10.0) as usize
    }

    /// Memory-leaning configurations keep the delta buffer ordered.
    pub fn ordered_delta(&self) -> bool {
        self.compression_level >= 0.5
    }
}
