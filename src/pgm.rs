//! Piecewise-linear cover of a sorted key array with a bounded error.
//!
//! Construction walks the keys once, maintaining the interval of slopes
//! that keep every point of the open segment within `epsilon` of its
//! predicted rank. When a new point empties the interval the segment is
//! sealed and a new one starts there, so every prediction is provably
//! within `epsilon` of the true rank.
//!
//! Queries return a half-open candidate window of width at most
//! `2 * epsilon + 1` which the caller verifies with a binary search.

/// One linear segment anchored at its first covered key.
///
/// Predicted rank for `key` is `slope * (key - start_key) + intercept`,
/// with `intercept` being the rank of `start_key`.
#[derive(Debug, Clone, Copy)]
pub struct PgmSegment {
    start_key: u64,
    slope: f64,
    intercept: u64,
}

/// Piecewise geometric segments over one sorted, deduplicated key slice.
#[derive(Debug, Clone)]
pub struct PgmSegments {
    segments: Vec<PgmSegment>,
    len: usize,
    epsilon: usize,
}

impl PgmSegments {
    /// Build the minimal-ish cover of `keys` for the given `epsilon`.
    ///
    /// `keys` must be strictly increasing; bulk-load establishes that
    /// once, so construction does not re-check it.
    pub fn build(keys: &[u64], epsilon: usize) -> Self {
        let mut segments = Vec::new();
        if keys.is_empty() {
            return Self {
                segments,
                len: 0,
                epsilon,
            };
        }

        let eps = epsilon as f64;
        let mut start = 0usize;

        while start < keys.len() {
            let start_key = keys[start];
            let mut slope_lo = 0.0f64;
            let mut slope_hi = f64::INFINITY;
            let mut end = start + 1;

            while end < keys.len() {
                let dx = (keys[end] - start_key) as f64;
                let dy = (end - start) as f64;

                // Slope range keeping this point within +-epsilon.
                let lo = (dy - eps) / dx;
                let hi = (dy + eps) / dx;

                let next_lo = slope_lo.max(lo);
                let next_hi = slope_hi.min(hi);
                if next_lo > next_hi {
                    break;
                }
                slope_lo = next_lo;
                slope_hi = next_hi;
                end += 1;
            }

            let slope = if slope_hi.is_infinite() {
                // Single-key segment; any slope works.
                0.0
            } else {
                (slope_lo + slope_hi) / 2.0
            };

            segments.push(PgmSegment {
                start_key,
                slope,
                intercept: start as u64,
            });
            start = end;
        }

        Self {
            segments,
            len: keys.len(),
            epsilon,
        }
    }

    /// Candidate window `[lo, hi)` for the rank of `key`.
    ///
    /// If `key` is present its rank lies within the window; the window
    /// never exceeds `2 * epsilon + 1` entries.
    pub fn search(&self, key: u64) -> (usize, usize) {
        if self.len == 0 {
            return (0, 0);
        }

        // Last segment whose start_key <= key; keys below the first
        // segment clamp to it.
        let idx = self
            .segments
            .partition_point(|s| s.start_key <= key)
            .saturating_sub(1);
        let seg = &self.segments[idx];

        let offset = key.saturating_sub(seg.start_key) as f64;
        let predicted = ((seg.slope * offset) as u64)
            .saturating_add(seg.intercept)
            .min(self.len as u64 - 1) as usize;

        let lo = predicted.saturating_sub(self.epsilon);
        let hi = (predicted + self.epsilon + 1).min(self.len);
        (lo, hi)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn epsilon(&self) -> usize {
        self.epsilon
    }

    pub fn memory_bytes(&self) -> usize {
        self.segments.capacity() * std::mem::size_of::<PgmSegment>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn assert_windows_cover(keys: &[u64], epsilon: usize) {
        let pgm = PgmSegments::build(keys, epsilon);
        for (rank, &key) in keys.iter().enumerate() {
            let (lo, hi) = pgm.search(key);
            assert!(
                lo <= rank && rank < hi,
                "rank {} of key {} outside window [{}, {})",
                rank,
                key,
                lo,
                hi
            );
            assert!(hi - lo <= 2 * epsilon + 1, "window too wide: [{}, {})", lo, hi);
            assert!(hi <= keys.len());
        }
    }

    #[test]
    fn test_sequential_keys_few_segments() {
        let keys: Vec<u64> = (0..100_000).collect();
        let pgm = PgmSegments::build(&keys, 64);
        // A perfect line needs a single segment.
        assert_eq!(pgm.segment_count(), 1);
        assert_windows_cover(&keys, 64);
    }

    #[test]
    fn test_uniform_random_keys() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut keys: Vec<u64> = (0..50_000).map(|_| rng.gen()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_windows_cover(&keys, 64);
    }

    #[test]
    fn test_clustered_keys() {
        // Tight clusters separated by large gaps stress segment breaks.
        let mut keys = Vec::new();
        for cluster in 0..50u64 {
            let base = cluster * 1_000_000_000;
            for i in 0..500 {
                keys.push(base + i * 3);
            }
        }
        assert_windows_cover(&keys, 64);
        assert_windows_cover(&keys, 8);
    }

    #[test]
    fn test_small_inputs() {
        assert_windows_cover(&[42], 64);
        assert_windows_cover(&[10, 20], 64);
        let pgm = PgmSegments::build(&[], 64);
        assert_eq!(pgm.search(5), (0, 0));
        assert_eq!(pgm.segment_count(), 0);
    }

    #[test]
    fn test_absent_key_window_is_valid() {
        let keys: Vec<u64> = (0..10_000).map(|i| i * 7).collect();
        let pgm = PgmSegments::build(&keys, 64);
        for probe in [0u64, 3, 69_990, 69_993, 1 << 40] {
            let (lo, hi) = pgm.search(probe);
            assert!(lo <= hi && hi <= keys.len());
        }
    }

    #[test]
    fn test_extreme_key_range() {
        let keys = vec![0, 1, u64::MAX - 1, u64::MAX];
        assert_windows_cover(&keys, 64);
    }

    #[test]
    fn test_tiny_epsilon() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut keys: Vec<u64> = (0..5_000).map(|_| rng.gen_range(0..1 << 48)).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_windows_cover(&keys, 1);
    }
}
