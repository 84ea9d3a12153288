//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Every section and field has a default, so an empty file (or no file at
//! all) is a valid configuration.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
pub use workload::{FeedStrategy, SourceKind};

/// Complete configuration for every experiment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub speed: SpeedConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Bucket formula validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Number of random inputs per implementation
    #[serde(default = "default_samples")]
    pub samples: u64,
    /// Seed for the random phase
    #[serde(default = "default_verify_seed")]
    pub seed: u64,
    /// Dense check covers every input in `[0, range_end)`
    #[serde(default = "default_range_end")]
    pub range_end: u64,
}

fn default_samples() -> u64 {
    100_000
}

fn default_verify_seed() -> u64 {
    0x5eed
}

fn default_range_end() -> u64 {
    1 << 24
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: default_verify_seed(),
            range_end: default_range_end(),
        }
    }
}

/// Time-boxed read throughput settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// Seconds spent reading from each source
    #[serde(default = "default_speed_seconds")]
    pub seconds: u64,
    /// Bytes requested per read
    #[serde(default = "default_chunk")]
    pub chunk: usize,
    /// Seed for the pseudo source
    #[serde(default = "default_speed_seed")]
    pub seed: u64,
}

fn default_speed_seconds() -> u64 {
    10
}

fn default_chunk() -> usize {
    32
}

fn default_speed_seed() -> u64 {
    42
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            seconds: default_speed_seconds(),
            chunk: default_chunk(),
            seed: default_speed_seed(),
        }
    }
}

/// Producer/consumer pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Generator behind the payloads
    #[serde(default)]
    pub payload: SourceKind,
    /// Number of producers (and of consumers)
    #[serde(default = "default_producers")]
    pub producers: usize,
    /// Messages sent by each producer per run
    #[serde(default = "default_messages")]
    pub messages_per_producer: usize,
    /// Upper bound (exclusive) for secure payload lengths
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    /// Number of repetitions
    #[serde(default = "default_runs")]
    pub runs: usize,
}

fn default_producers() -> usize {
    10
}

fn default_messages() -> usize {
    9_999
}

fn default_max_len() -> usize {
    10_000
}

fn default_runs() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            payload: SourceKind::default(),
            producers: default_producers(),
            messages_per_producer: default_messages(),
            max_len: default_max_len(),
            runs: default_runs(),
        }
    }
}

/// Token feeding strategy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Strategies to run, in order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<FeedStrategy>,
    /// Parallel consumer threads
    #[serde(default = "default_feed_threads")]
    pub threads: usize,
    /// Tokens taken by each consumer
    #[serde(default = "default_ops")]
    pub ops_per_thread: u64,
    /// Feeder threads for the many-writer strategies
    #[serde(default = "default_feeders")]
    pub feeders: usize,
    /// Capacity of each token channel
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Time every take and report percentiles
    #[serde(default)]
    pub record_latency: bool,
}

fn default_strategies() -> Vec<FeedStrategy> {
    FeedStrategy::ALL.to_vec()
}

fn default_feed_threads() -> usize {
    num_cpus::get()
}

fn default_ops() -> u64 {
    10_000
}

fn default_feeders() -> usize {
    32
}

fn default_capacity() -> usize {
    1000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            threads: default_feed_threads(),
            ops_per_thread: default_ops(),
            feeders: default_feeders(),
            capacity: default_capacity(),
            record_latency: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON report file path
    pub json_output: Option<PathBuf>,
    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.verify.range_end, 1 << 24);
        assert_eq!(config.speed.chunk, 32);
        assert_eq!(config.pipeline.producers, 10);
        assert_eq!(config.pipeline.payload, SourceKind::Secure);
        assert_eq!(config.feed.strategies.len(), 7);
        assert!(config.feed.threads >= 1);
        assert!(config.output.json_output.is_none());
    }
}
