//! CLI argument parsing using clap

use super::workload::{FeedStrategy, SourceKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// randbucket - power-of-four bucket indexing and RNG throughput experiments
#[derive(Parser, Debug)]
#[command(name = "randbucket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (CLI flags take precedence)
    #[arg(short, long, global = true, env = "RANDBUCKET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write a JSON report to this path
    #[arg(long, global = true)]
    pub json_output: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Experiment to run
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the bucket of each value (decimal or 0x-prefixed hex)
    Bucket {
        #[arg(value_name = "VALUE", required = true)]
        values: Vec<String>,
    },

    /// Print the value range of every bucket
    Table,

    /// Cross-check the bucket implementations against the reference formula
    Verify {
        /// Random samples per implementation
        #[arg(long)]
        samples: Option<u64>,

        /// Seed for the random phase
        #[arg(long)]
        seed: Option<u64>,

        /// Check every input below this value (e.g. 65536, 16M, 0x100000000)
        #[arg(long)]
        range_end: Option<String>,
    },

    /// Read from the pseudo and secure sources for a fixed time
    Speed {
        /// Time per source (e.g. 10s, 1m)
        #[arg(short = 'd', long)]
        duration: Option<String>,

        /// Bytes per read (e.g. 32, 4k)
        #[arg(long)]
        chunk: Option<String>,

        /// Seed for the pseudo source
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Fan-out/fan-in producers and consumers over an unbuffered channel
    Pipeline {
        /// Generator behind the payloads
        #[arg(long, value_enum)]
        payload: Option<SourceKind>,

        /// Producers (and consumers)
        #[arg(short = 't', long)]
        producers: Option<usize>,

        /// Messages per producer
        #[arg(short = 'm', long)]
        messages: Option<usize>,

        /// Upper bound for secure payload lengths (e.g. 10000, 16k)
        #[arg(long)]
        max_len: Option<String>,

        /// Repetitions
        #[arg(short = 'r', long)]
        runs: Option<usize>,
    },

    /// Feed 16-byte random tokens to parallel consumers
    Feed {
        /// Strategy to run (repeatable; default: all)
        #[arg(long = "strategy", value_enum)]
        strategies: Vec<FeedStrategy>,

        /// Consumer threads
        #[arg(short = 't', long)]
        threads: Option<usize>,

        /// Tokens per consumer
        #[arg(short = 'n', long)]
        ops: Option<u64>,

        /// Feeder threads for the many-writer strategies
        #[arg(long)]
        feeders: Option<usize>,

        /// Channel capacity
        #[arg(long)]
        capacity: Option<usize>,

        /// Record per-take latency percentiles
        #[arg(long)]
        latency: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    ///
    /// Only catches values that are wrong regardless of the config file;
    /// the merged configuration is validated again afterwards.
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Pipeline {
                producers: Some(0), ..
            } => anyhow::bail!("producers must be at least 1"),
            Command::Feed {
                threads: Some(0), ..
            } => anyhow::bail!("threads must be at least 1"),
            Command::Feed {
                capacity: Some(0), ..
            } => anyhow::bail!("capacity must be at least 1"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_values() {
        let cli = Cli::try_parse_from(["randbucket", "bucket", "16", "0xff"]).unwrap();
        match cli.command {
            Command::Bucket { values } => assert_eq!(values, vec!["16", "0xff"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_feed_strategies() {
        let cli = Cli::try_parse_from([
            "randbucket",
            "--debug",
            "feed",
            "--strategy",
            "round-robin",
            "--strategy",
            "amortized-many-writers",
            "-t",
            "4",
        ])
        .unwrap();

        assert!(cli.debug);
        match cli.command {
            Command::Feed {
                strategies, threads, ..
            } => {
                assert_eq!(
                    strategies,
                    vec![FeedStrategy::RoundRobin, FeedStrategy::AmortizedManyWriters]
                );
                assert_eq!(threads, Some(4));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_zero_producers() {
        let cli = Cli::try_parse_from(["randbucket", "pipeline", "-t", "0"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["randbucket", "pipeline", "--payload", "pseudo"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_bucket_requires_value() {
        assert!(Cli::try_parse_from(["randbucket", "bucket"]).is_err());
    }
}
