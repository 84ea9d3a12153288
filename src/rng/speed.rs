//! Time-boxed read throughput
//!
//! Reads fixed-size chunks from a source until the time budget runs out and
//! reports how many bytes came back. Both sources are measured through a
//! [`BufferedSource`], so the comparison is generator cost, not call cost.

use super::{BufferedSource, ByteSource, PseudoSource, SecureSource};
use crate::config::SpeedConfig;
use crate::util::time::calculate_throughput;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Reads between clock checks
const CLOCK_CHECK_INTERVAL: u32 = 64;

/// Bytes read from one source within the time budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedResult {
    pub source: String,
    pub bytes: u64,
    pub reads: u64,
    pub elapsed: Duration,
}

impl SpeedResult {
    /// Bytes per second
    pub fn throughput(&self) -> f64 {
        calculate_throughput(self.bytes, self.elapsed)
    }

    /// MiB per second
    pub fn mib_per_sec(&self) -> f64 {
        self.throughput() / (1024.0 * 1024.0)
    }
}

/// Read `chunk`-byte blocks from `source` for `budget`
pub fn measure<S: ByteSource + ?Sized>(
    source: &mut S,
    chunk: usize,
    budget: Duration,
) -> crate::Result<SpeedResult> {
    let mut buf = vec![0u8; chunk];
    let mut bytes = 0u64;
    let mut reads = 0u64;
    let start = Instant::now();

    loop {
        for _ in 0..CLOCK_CHECK_INTERVAL {
            source.fill(&mut buf)
                .with_context(|| format!("Failed to read from {} source", source.name()))?;
            bytes += chunk as u64;
            reads += 1;
        }
        if start.elapsed() >= budget {
            break;
        }
    }

    Ok(SpeedResult {
        source: source.name().to_string(),
        bytes,
        reads,
        elapsed: start.elapsed(),
    })
}

/// Measure the buffered pseudo source, then the buffered secure source
pub fn run(config: &SpeedConfig, debug: bool) -> crate::Result<Vec<SpeedResult>> {
    let budget = Duration::from_secs(config.seconds);

    if debug {
        eprintln!(
            "DEBUG: Speed test: {}s per source, {} byte reads, seed {}",
            config.seconds, config.chunk, config.seed
        );
    }

    let mut pseudo = BufferedSource::new(PseudoSource::with_seed(config.seed));
    let mut secure = BufferedSource::new(SecureSource::new());

    let results = vec![
        measure(&mut pseudo, config.chunk, budget)?,
        measure(&mut secure, config.chunk, budget)?,
    ];

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_counts_bytes() {
        let mut source = PseudoSource::with_seed(1);
        let result = measure(&mut source, 32, Duration::from_millis(20)).unwrap();

        assert_eq!(result.source, "pseudo");
        assert!(result.reads >= CLOCK_CHECK_INTERVAL as u64);
        assert_eq!(result.bytes, result.reads * 32);
        assert!(result.elapsed >= Duration::from_millis(20));
        assert!(result.throughput() > 0.0);
    }

    #[test]
    fn test_run_reports_both_sources() {
        let config = SpeedConfig {
            seconds: 1,
            chunk: 32,
            seed: 42,
        };
        let results = run(&config, false).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "pseudo");
        assert_eq!(results[1].source, "secure");
        assert!(results.iter().all(|r| r.bytes > 0));
    }
}
