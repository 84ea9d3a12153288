//! randbucket CLI entry point

use anyhow::{Context, Result};
use randbucket::bucket::verify;
use randbucket::config::cli::{Cli, Command};
use randbucket::config::cli_convert::parse_u64;
use randbucket::config::{toml, validator, Config};
use randbucket::output::json::{self, JsonBucket, JsonFeed, JsonPipeline, JsonSpeed, JsonVerify};
use randbucket::output::text;
use randbucket::{feed, pipeline, rng};
use serde::Serialize;
use std::time::Instant;

fn main() -> Result<()> {
    let main_start = Instant::now();

    let cli = Cli::parse_args();
    cli.validate()?;

    let config = toml::load_config(&cli)?;
    validator::validate_config(&config).context("Configuration validation failed")?;

    let debug = config.output.debug;
    if debug {
        eprintln!("DEBUG: Configuration: {:?}", config);
    }

    let passed = run_command(&cli.command, &config)?;

    if debug {
        eprintln!("DEBUG: Total time: {:.3}s", main_start.elapsed().as_secs_f64());
    }

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the selected experiment; returns false if validation found a divergence
fn run_command(command: &Command, config: &Config) -> Result<bool> {
    let debug = config.output.debug;

    match command {
        Command::Bucket { values } => {
            let values = values
                .iter()
                .map(|v| parse_u64(v).with_context(|| format!("Invalid value: {}", v)))
                .collect::<Result<Vec<u64>>>()?;

            text::print_bucket_lookups(&values);
            let lookups: Vec<JsonBucket> = values.iter().map(|&v| JsonBucket::lookup(v)).collect();
            write_json(config, "bucket", lookups)?;
        }
        Command::Table => {
            text::print_table();
            write_json(config, "table", json::bucket_table())?;
        }
        Command::Verify { .. } => {
            println!(
                "Validating {} implementations: {} random samples (seed {:#x}), dense range 0..{}",
                verify::Implementation::ALL.len(),
                config.verify.samples,
                config.verify.seed,
                config.verify.range_end
            );
            println!();

            let start = Instant::now();
            let report = verify::run(&config.verify, debug);
            if debug {
                eprintln!("DEBUG: Validation took {:.3}s", start.elapsed().as_secs_f64());
            }

            text::print_verify(&report);
            write_json(config, "verify", JsonVerify::from(&report))?;

            if !report.passed() {
                eprintln!("Error: bucket implementations diverge from the reference formula");
                return Ok(false);
            }
        }
        Command::Speed { .. } => {
            println!(
                "Reading {} byte chunks for {}s per source...",
                config.speed.chunk, config.speed.seconds
            );
            println!();

            let results = rng::speed::run(&config.speed, debug)?;
            text::print_speed(&results);
            let results: Vec<JsonSpeed> = results.iter().map(JsonSpeed::from).collect();
            write_json(config, "speed", results)?;
        }
        Command::Pipeline { .. } => {
            println!(
                "Starting pipeline: {} producers, {} consumers, {} run(s)...",
                config.pipeline.producers, config.pipeline.producers, config.pipeline.runs
            );
            println!();

            let report = pipeline::run(&config.pipeline, debug)?;
            text::print_pipeline(&report);
            write_json(config, "pipeline", JsonPipeline::from(&report))?;
        }
        Command::Feed { .. } => {
            if config.feed.threads > num_cpus::get() {
                eprintln!(
                    "Warning: {} consumer threads on {} CPUs; results include scheduling overhead",
                    config.feed.threads,
                    num_cpus::get()
                );
            }
            println!(
                "Feeding {} tokens to each of {} threads...",
                config.feed.ops_per_thread, config.feed.threads
            );
            println!();

            let reports = feed::run(&config.feed, debug)?;
            text::print_feed(&reports);
            let reports: Vec<JsonFeed> = reports.iter().map(JsonFeed::from).collect();
            write_json(config, "feed", reports)?;
        }
    }

    Ok(true)
}

fn write_json<T: Serialize>(config: &Config, experiment: &str, results: T) -> Result<()> {
    if let Some(ref path) = config.output.json_output {
        let report = json::build_report(experiment, results);
        json::write_json_output(path, &report, true)?;
        println!();
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}
