//! Human-readable text output

use crate::bucket::verify::VerifyReport;
use crate::bucket::{bucket_of, bucket_range, NUM_BUCKETS};
use crate::feed::FeedReport;
use crate::pipeline::PipelineReport;
use crate::rng::speed::SpeedResult;
use crate::stats::histogram::LatencySummary;
use crate::stats::size_histogram::SizeHistogram;
use crate::util::time::{format_duration, format_number, format_rate, format_throughput};

const RULE: &str = "═══════════════════════════════════════════════════════════";

fn print_header(title: &str) {
    println!("{}", RULE);
    println!("{:^59}", title);
    println!("{}", RULE);
    println!();
}

/// Print the bucket and bucket range of each value
pub fn print_bucket_lookups(values: &[u64]) {
    for &value in values {
        let bucket = bucket_of(value);
        match bucket_range(bucket) {
            Some(range) => println!(
                "{:>20} -> bucket {:>3}  [{}, {}]",
                value,
                bucket,
                range.start(),
                range.end()
            ),
            None => println!("{:>20} -> bucket {:>3}", value, bucket),
        }
    }
}

/// Print the value range of every bucket
pub fn print_table() {
    println!("{:>6}  {:>20}  {:>20}", "bucket", "low", "high");
    for bucket in 0..NUM_BUCKETS {
        if let Some(range) = bucket_range(bucket) {
            println!("{:>6}  {:>20}  {:>20}", bucket, range.start(), range.end());
        }
    }
}

/// Print validation results
pub fn print_verify(report: &VerifyReport) {
    print_header("BUCKET VALIDATION");

    for result in &report.phases {
        let implementation = result
            .implementation
            .map(|i| i.to_string())
            .unwrap_or_else(|| "reference".to_string());
        let status = if result.passed() { "ok" } else { "FAILED" };
        println!(
            "  {:<10} {:<15} {:>16} inputs  {}",
            implementation,
            result.phase.to_string(),
            format_number(result.checked),
            status
        );
        if let Some(ref failure) = result.failure {
            println!("      {}", failure);
        }
    }

    println!();
    println!("Inputs checked: {}", format_number(report.total_checked()));
    if report.passed() {
        println!("All implementations agree with the reference formula");
    } else {
        println!("Divergence found");
    }
    println!("{}", RULE);
}

/// Print read throughput per source
pub fn print_speed(results: &[SpeedResult]) {
    print_header("READ THROUGHPUT");

    for result in results {
        println!(
            "  {:<8} {:>12} reads  {:>12}  in {:>8}  {}",
            result.source,
            format_number(result.reads),
            format_bytes(result.bytes),
            format_duration(result.elapsed),
            format_throughput(result.throughput())
        );
    }

    println!("{}", RULE);
}

/// Print pipeline results
pub fn print_pipeline(report: &PipelineReport) {
    print_header("PIPELINE RESULTS");

    println!(
        "Payload: {}  Producers/consumers: {}  Messages per producer: {}",
        report.payload,
        report.producers,
        format_number(report.messages_per_producer as u64)
    );
    println!();

    for run in &report.runs {
        println!(
            "  Run {:>3}: {} messages, {} in {}",
            run.run,
            format_number(run.messages),
            format_bytes(run.bytes_consumed),
            format_duration(run.elapsed)
        );
    }

    let throughput = report.throughput();
    println!();
    println!("Mean time per run: {}", format_duration(report.mean_run_time()));
    println!(
        "Throughput:        {} ({} msgs/s)",
        format_throughput(throughput.bytes_per_sec()),
        format_rate(throughput.ops_per_sec())
    );
    println!();

    print_sizes(&report.sizes);
    println!("{}", RULE);
}

fn print_sizes(sizes: &SizeHistogram) {
    println!("Payload sizes:");
    if sizes.is_empty() {
        println!("  No messages received");
        return;
    }

    println!(
        "  Min: {}  Mean: {:.1}  Max: {}  p50 >= {}  p99 >= {}",
        sizes.min(),
        sizes.mean(),
        sizes.max(),
        sizes.percentile(50.0),
        sizes.percentile(99.0)
    );
    println!();
    println!("  {:>6}  {:>20}  {:>12}", "bucket", "range", "count");
    for (bucket, count) in sizes.non_empty() {
        let range = bucket_range(bucket as u64)
            .map(|r| format!("{}..={}", r.start(), r.end()))
            .unwrap_or_default();
        println!("  {:>6}  {:>20}  {:>12}", bucket, range, format_number(count));
    }
}

/// Print token feeding results, one line per strategy
pub fn print_feed(reports: &[FeedReport]) {
    print_header("TOKEN FEEDING");

    println!(
        "  {:<24} {:>7} {:>7} {:>12} {:>10} {:>10}",
        "strategy", "threads", "feeders", "tokens", "ops/s", "per op"
    );
    for report in reports {
        let throughput = report.throughput();
        println!(
            "  {:<24} {:>7} {:>7} {:>12} {:>10} {:>10}",
            report.strategy.to_string(),
            report.threads,
            report.feeders,
            format_number(report.ops),
            format_rate(throughput.ops_per_sec()),
            format_duration(throughput.time_per_op())
        );
    }

    let with_latency: Vec<_> = reports
        .iter()
        .filter_map(|r| r.latency.as_ref().map(|l| (r, l)))
        .collect();
    if !with_latency.is_empty() {
        println!();
        println!("Latency:");
        for (report, latency) in with_latency {
            print_latency(&report.strategy.to_string(), latency);
        }
    }

    println!("{}", RULE);
}

fn print_latency(label: &str, latency: &LatencySummary) {
    println!(
        "  {:<24} min {:>9}  p50 {:>9}  p90 {:>9}  p99 {:>9}  p99.9 {:>9}  max {:>9}",
        label,
        format_duration(latency.min),
        format_duration(latency.p50),
        format_duration(latency.p90),
        format_duration(latency.p99),
        format_duration(latency.p99_9),
        format_duration(latency.max)
    );
}

/// Format bytes with appropriate units
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
