//! TOML configuration file parsing

use super::*;
use crate::config::cli::{Cli, Command};
use crate::config::cli_convert::{parse_duration, parse_size};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Load the config file named on the command line (if any) and apply CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }
    if cli.debug {
        config.output.debug = true;
    }

    match &cli.command {
        Command::Bucket { .. } | Command::Table => {}
        Command::Verify {
            samples,
            seed,
            range_end,
        } => {
            if let Some(samples) = samples {
                config.verify.samples = *samples;
            }
            if let Some(seed) = seed {
                config.verify.seed = *seed;
            }
            if let Some(range_end) = range_end {
                config.verify.range_end = parse_size(range_end)
                    .context("Invalid range end")?;
            }
        }
        Command::Speed {
            duration,
            chunk,
            seed,
        } => {
            if let Some(duration) = duration {
                config.speed.seconds = parse_duration(duration)
                    .context("Invalid duration")?;
            }
            if let Some(chunk) = chunk {
                config.speed.chunk = parse_size(chunk).context("Invalid chunk size")? as usize;
            }
            if let Some(seed) = seed {
                config.speed.seed = *seed;
            }
        }
        Command::Pipeline {
            payload,
            producers,
            messages,
            max_len,
            runs,
        } => {
            if let Some(payload) = payload {
                config.pipeline.payload = *payload;
            }
            if let Some(producers) = producers {
                config.pipeline.producers = *producers;
            }
            if let Some(messages) = messages {
                config.pipeline.messages_per_producer = *messages;
            }
            if let Some(max_len) = max_len {
                config.pipeline.max_len = parse_size(max_len)
                    .context("Invalid max length")? as usize;
            }
            if let Some(runs) = runs {
                config.pipeline.runs = *runs;
            }
        }
        Command::Feed {
            strategies,
            threads,
            ops,
            feeders,
            capacity,
            latency,
        } => {
            if !strategies.is_empty() {
                config.feed.strategies = strategies.clone();
            }
            if let Some(threads) = threads {
                config.feed.threads = *threads;
            }
            if let Some(ops) = ops {
                config.feed.ops_per_thread = *ops;
            }
            if let Some(feeders) = feeders {
                config.feed.feeders = *feeders;
            }
            if let Some(capacity) = capacity {
                config.feed.capacity = *capacity;
            }
            if *latency {
                config.feed.record_latency = true;
            }
        }
    }

    Ok(config)
}
