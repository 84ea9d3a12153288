//! Message size histogram
//!
//! A fixed-size histogram whose bucket index is [`bucket_of`]: one bucket
//! per value up to 15, then about nine linear buckets per power-of-four band.
//!
//! - Fixed 276-bucket array (no dynamic allocation)
//! - O(1) bucket calculation, no search
//! - Mergeable across threads

use crate::bucket::{bucket_of, lower_bound, NUM_BUCKETS};
use serde::{Deserialize, Serialize};

const BUCKETS: usize = NUM_BUCKETS as usize;

/// Histogram of sizes bucketed with the power-of-four formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeHistogram {
    /// Counts per bucket, serialized as sparse `(bucket, count)` pairs
    #[serde(with = "serde_sparse")]
    buckets: [u64; BUCKETS],

    /// Total number of samples
    num_samples: u64,

    /// Sum of all recorded values
    total: u128,

    /// Minimum value
    min: u64,

    /// Maximum value
    max: u64,
}

// Large arrays serialize as the non-empty buckets only
mod serde_sparse {
    use super::BUCKETS;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(arr: &[u64; BUCKETS], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<(usize, u64)> = arr
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(bucket, &count)| (bucket, count))
            .collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u64; BUCKETS], D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<(usize, u64)> = Vec::deserialize(deserializer)?;
        let mut arr = [0u64; BUCKETS];
        for (bucket, count) in pairs {
            let slot = arr.get_mut(bucket).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "bucket {} out of range (max {})",
                    bucket,
                    BUCKETS - 1
                ))
            })?;
            *slot = count;
        }
        Ok(arr)
    }
}

impl SizeHistogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self {
            buckets: [0; BUCKETS],
            num_samples: 0,
            total: 0,
            min: u64::MAX,
            max: 0,
        }
    }

    /// Record a value
    #[inline(always)]
    pub fn record(&mut self, value: u64) {
        self.num_samples += 1;
        self.total += value as u128;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.buckets[bucket_of(value) as usize] += 1;
    }

    /// Get the number of samples
    pub fn len(&self) -> u64 {
        self.num_samples
    }

    /// Check if histogram is empty
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    /// Sum of all recorded values
    pub fn total(&self) -> u128 {
        self.total
    }

    /// Smallest recorded value (0 when empty)
    pub fn min(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.min
        }
    }

    /// Largest recorded value
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Mean value (0 when empty)
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.total as f64 / self.num_samples as f64
        }
    }

    /// Lower bound of the bucket holding the given percentile (0.0 - 100.0)
    ///
    /// Returns 0 for an empty histogram.
    pub fn percentile(&self, percentile: f64) -> u64 {
        if self.is_empty() {
            return 0;
        }

        let target = ((percentile / 100.0) * self.num_samples as f64).ceil().max(1.0) as u64;
        let mut cumulative = 0u64;

        for (bucket, &count) in self.buckets.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                return lower_bound(bucket as u64).unwrap_or(0);
            }
        }

        self.max
    }

    /// Merge another histogram into this one
    pub fn merge(&mut self, other: &SizeHistogram) {
        for (mine, theirs) in self.buckets.iter_mut().zip(other.buckets.iter()) {
            *mine += theirs;
        }

        self.num_samples += other.num_samples;
        self.total += other.total;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Get bucket count at index (0 for out-of-range ids)
    pub fn bucket_count(&self, bucket: usize) -> u64 {
        self.buckets.get(bucket).copied().unwrap_or(0)
    }

    /// Non-empty buckets as `(bucket, count)` pairs, in bucket order
    pub fn non_empty(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(bucket, &count)| (bucket, count))
    }
}

impl Default for SizeHistogram {
    fn default() -> Self {
        Self::new()
    }
}
