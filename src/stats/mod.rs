//! Statistics collection
//!
//! - [`histogram::LatencyHistogram`]: HdrHistogram-backed per-operation latency
//! - [`size_histogram::SizeHistogram`]: message sizes bucketed with `bucket_of`
//! - [`Throughput`]: bytes and operations over an elapsed time

pub mod histogram;
pub mod size_histogram;

use crate::util::time::{calculate_rate, calculate_throughput};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Work completed over a measured interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Throughput {
    pub bytes: u64,
    pub ops: u64,
    pub elapsed: Duration,
}

impl Throughput {
    pub fn new(bytes: u64, ops: u64, elapsed: Duration) -> Self {
        Self { bytes, ops, elapsed }
    }

    /// Bytes per second
    pub fn bytes_per_sec(&self) -> f64 {
        calculate_throughput(self.bytes, self.elapsed)
    }

    /// MiB per second
    pub fn mib_per_sec(&self) -> f64 {
        self.bytes_per_sec() / (1024.0 * 1024.0)
    }

    /// Operations per second
    pub fn ops_per_sec(&self) -> f64 {
        calculate_rate(self.ops, self.elapsed)
    }

    /// Mean time per operation
    pub fn time_per_op(&self) -> Duration {
        if self.ops == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos((self.elapsed.as_nanos() / self.ops as u128) as u64)
        }
    }

    /// Combine two intervals measured back to back
    pub fn merge(&mut self, other: &Throughput) {
        self.bytes += other.bytes;
        self.ops += other.ops;
        self.elapsed += other.elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_rates() {
        let t = Throughput::new(10 * 1024 * 1024, 1000, Duration::from_secs(10));
        assert_eq!(t.bytes_per_sec(), 1024.0 * 1024.0);
        assert_eq!(t.mib_per_sec(), 1.0);
        assert_eq!(t.ops_per_sec(), 100.0);
        assert_eq!(t.time_per_op(), Duration::from_millis(10));
    }

    #[test]
    fn test_throughput_zero() {
        let t = Throughput::default();
        assert_eq!(t.bytes_per_sec(), 0.0);
        assert_eq!(t.ops_per_sec(), 0.0);
        assert_eq!(t.time_per_op(), Duration::ZERO);
    }

    #[test]
    fn test_throughput_merge() {
        let mut a = Throughput::new(100, 1, Duration::from_secs(1));
        a.merge(&Throughput::new(300, 3, Duration::from_secs(1)));
        assert_eq!(a, Throughput::new(400, 4, Duration::from_secs(2)));
    }
}
