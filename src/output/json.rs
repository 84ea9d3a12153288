//! JSON output formatting
//!
//! Every experiment is written inside the same envelope:
//!
//! ```json
//! {
//!   "tool": "randbucket",
//!   "version": "0.1.0",
//!   "timestamp": "2026-01-01T00:00:00+00:00",
//!   "experiment": "pipeline",
//!   "results": { ... }
//! }
//! ```
//!
//! Durations and rates carry both a raw number and a human-readable string.

use crate::bucket::bucket_range;
use crate::bucket::verify::VerifyReport;
use crate::feed::FeedReport;
use crate::pipeline::PipelineReport;
use crate::rng::speed::SpeedResult;
use crate::stats::histogram::LatencySummary;
use crate::stats::size_histogram::SizeHistogram;
use crate::util::time::{format_duration, format_throughput};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

/// Duration with both nanoseconds and human-readable format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDuration {
    pub nanos: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            nanos: d.as_nanos().min(u64::MAX as u128) as u64,
            human: format_duration(d),
        }
    }
}

/// Throughput with bytes/sec and human-readable format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonThroughput {
    pub bytes_per_sec: f64,
    pub human: String,
}

impl JsonThroughput {
    pub fn new(bytes_per_sec: f64) -> Self {
        Self {
            bytes_per_sec,
            human: format_throughput(bytes_per_sec),
        }
    }
}

/// Latency percentiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonLatency {
    pub samples: u64,
    pub min: JsonDuration,
    pub mean: JsonDuration,
    pub p50: JsonDuration,
    pub p90: JsonDuration,
    pub p99: JsonDuration,
    pub p99_9: JsonDuration,
    pub max: JsonDuration,
}

impl From<&LatencySummary> for JsonLatency {
    fn from(summary: &LatencySummary) -> Self {
        Self {
            samples: summary.samples,
            min: JsonDuration::from_duration(summary.min),
            mean: JsonDuration::from_duration(summary.mean),
            p50: JsonDuration::from_duration(summary.p50),
            p90: JsonDuration::from_duration(summary.p90),
            p99: JsonDuration::from_duration(summary.p99),
            p99_9: JsonDuration::from_duration(summary.p99_9),
            max: JsonDuration::from_duration(summary.max),
        }
    }
}

/// Bucket id and value range of one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonBucket {
    pub value: u64,
    pub bucket: u64,
    pub low: u64,
    pub high: u64,
}

impl JsonBucket {
    pub fn lookup(value: u64) -> Self {
        let bucket = crate::bucket::bucket_of(value);
        // Every bucket_of result is a valid bucket id
        let range = bucket_range(bucket).unwrap_or(value..=value);
        Self {
            value,
            bucket,
            low: *range.start(),
            high: *range.end(),
        }
    }
}

/// Value range of one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonBucketRange {
    pub bucket: u64,
    pub low: u64,
    pub high: u64,
}

/// Every bucket's value range
pub fn bucket_table() -> Vec<JsonBucketRange> {
    (0..crate::bucket::NUM_BUCKETS)
        .filter_map(|bucket| {
            bucket_range(bucket).map(|range| JsonBucketRange {
                bucket,
                low: *range.start(),
                high: *range.end(),
            })
        })
        .collect()
}

/// Validation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonVerify {
    pub passed: bool,
    pub total_checked: u64,
    pub report: VerifyReport,
}

impl From<&VerifyReport> for JsonVerify {
    fn from(report: &VerifyReport) -> Self {
        Self {
            passed: report.passed(),
            total_checked: report.total_checked(),
            report: report.clone(),
        }
    }
}

/// Read throughput of one source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSpeed {
    pub source: String,
    pub bytes: u64,
    pub reads: u64,
    pub elapsed: JsonDuration,
    pub throughput: JsonThroughput,
}

impl From<&SpeedResult> for JsonSpeed {
    fn from(result: &SpeedResult) -> Self {
        Self {
            source: result.source.clone(),
            bytes: result.bytes,
            reads: result.reads,
            elapsed: JsonDuration::from_duration(result.elapsed),
            throughput: JsonThroughput::new(result.throughput()),
        }
    }
}

/// Payload size distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSizes {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p99: u64,
    /// Non-empty buckets only
    pub buckets: Vec<JsonBucketCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBucketCount {
    pub bucket: u64,
    pub low: u64,
    pub count: u64,
}

impl From<&SizeHistogram> for JsonSizes {
    fn from(hist: &SizeHistogram) -> Self {
        Self {
            count: hist.len(),
            min: hist.min(),
            max: hist.max(),
            mean: hist.mean(),
            p50: hist.percentile(50.0),
            p99: hist.percentile(99.0),
            buckets: hist
                .non_empty()
                .map(|(bucket, count)| JsonBucketCount {
                    bucket: bucket as u64,
                    low: crate::bucket::lower_bound(bucket as u64).unwrap_or(0),
                    count,
                })
                .collect(),
        }
    }
}

/// Pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonPipeline {
    pub payload: String,
    pub producers: usize,
    pub messages_per_producer: usize,
    pub runs: Vec<JsonPipelineRun>,
    pub mean_run_time: JsonDuration,
    pub throughput: JsonThroughput,
    pub sizes: JsonSizes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonPipelineRun {
    pub run: usize,
    pub elapsed: JsonDuration,
    pub messages: u64,
    pub bytes: u64,
}

impl From<&PipelineReport> for JsonPipeline {
    fn from(report: &PipelineReport) -> Self {
        Self {
            payload: report.payload.to_string(),
            producers: report.producers,
            messages_per_producer: report.messages_per_producer,
            runs: report
                .runs
                .iter()
                .map(|r| JsonPipelineRun {
                    run: r.run,
                    elapsed: JsonDuration::from_duration(r.elapsed),
                    messages: r.messages,
                    bytes: r.bytes_consumed,
                })
                .collect(),
            mean_run_time: JsonDuration::from_duration(report.mean_run_time()),
            throughput: JsonThroughput::new(report.throughput().bytes_per_sec()),
            sizes: JsonSizes::from(&report.sizes),
        }
    }
}

/// Results of one feeding strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonFeed {
    pub strategy: String,
    pub threads: usize,
    pub feeders: usize,
    pub ops: u64,
    pub elapsed: JsonDuration,
    pub ops_per_sec: f64,
    pub time_per_op: JsonDuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<JsonLatency>,
}

impl From<&FeedReport> for JsonFeed {
    fn from(report: &FeedReport) -> Self {
        let throughput = report.throughput();
        Self {
            strategy: report.strategy.to_string(),
            threads: report.threads,
            feeders: report.feeders,
            ops: report.ops,
            elapsed: JsonDuration::from_duration(report.elapsed),
            ops_per_sec: throughput.ops_per_sec(),
            time_per_op: JsonDuration::from_duration(throughput.time_per_op()),
            latency: report.latency.as_ref().map(JsonLatency::from),
        }
    }
}

/// Envelope written for every experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport<T> {
    pub tool: String,
    pub version: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub experiment: String,
    pub results: T,
}

/// Wrap `results` in the report envelope, stamped with the current time
pub fn build_report<T: Serialize>(experiment: &str, results: T) -> JsonReport<T> {
    JsonReport {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        experiment: experiment.to_string(),
        results,
    }
}

/// Write JSON output to file
pub fn write_json_output<T: Serialize>(
    output_path: &Path,
    report: &JsonReport<T>,
    pretty: bool,
) -> Result<()> {
    let file = File::create(output_path).with_context(|| {
        format!("Failed to create JSON output file: {}", output_path.display())
    })?;
    let writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(writer, report)?;
    } else {
        serde_json::to_writer(writer, report)?;
    }

    Ok(())
}
