//! randbucket - power-of-four bucket indexing and RNG throughput experiments
//!
//! The core is [`bucket::bucket_of`], a constant-time map from any `u64` to
//! one of 276 ordered buckets: exact buckets for 0..=15, then roughly nine
//! linear buckets per power-of-four band, saturating at bucket 275.
//!
//! # Architecture
//!
//! - **bucket**: reference formula, fast and search variants, validation harness
//! - **rng**: secure and pseudo byte sources, buffering, letter payloads
//! - **pipeline**: fan-out/fan-in producer/consumer experiment
//! - **feed**: random token feeding strategies for parallel consumers
//! - **stats**: latency and size histograms, throughput counters
//! - **output**: text and JSON reports

pub mod bucket;
pub mod config;
pub mod feed;
pub mod output;
pub mod pipeline;
pub mod rng;
pub mod stats;
pub mod util;

// Re-export commonly used types
pub use bucket::{bucket_of, NUM_BUCKETS};
pub use config::Config;

/// Result type used throughout randbucket
pub type Result<T> = anyhow::Result<T>;
