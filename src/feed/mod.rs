//! Random token feeding strategies
//!
//! Parallel consumers each take `ops_per_thread` 16-byte tokens and yield
//! the thread after every take. The strategies differ only in where a
//! token comes from:
//!
//! | Strategy | Token path |
//! |---|---|
//! | `baseline` | 16 bytes straight from the consumer's own OS generator |
//! | `amortized` | 16 bytes out of the consumer's own 256-byte block |
//! | `channel` | one feeder thread, one bounded channel |
//! | `channel-amortized` | one amortized feeder thread, one bounded channel |
//! | `round-robin` | one channel per feeder; consumers rotate between them |
//! | `many-writers` | every feeder writes into one shared channel |
//! | `amortized-many-writers` | amortized feeders, one shared channel |
//!
//! Feeders run until every receiver is gone, so they are joined after the
//! consumers finish.

use crate::config::{FeedConfig, FeedStrategy};
use crate::rng::{BufferedSource, ByteSource, SecureSource};
use crate::stats::histogram::{LatencyHistogram, LatencySummary};
use crate::stats::Throughput;
use crate::Result;
use anyhow::Context;
use crossbeam::channel::{self, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Bytes per token
pub const TOKEN_LEN: usize = 16;

/// One random token
pub type Token = [u8; TOKEN_LEN];

/// Results of one strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedReport {
    pub strategy: FeedStrategy,
    pub threads: usize,
    /// Feeder threads (0 for the direct strategies)
    pub feeders: usize,
    /// Tokens taken across all consumers
    pub ops: u64,
    /// Gate release to last consumer joined
    pub elapsed: Duration,
    /// Per-take latency, when recorded
    pub latency: Option<LatencySummary>,
}

impl FeedReport {
    pub fn throughput(&self) -> Throughput {
        Throughput::new(self.ops * TOKEN_LEN as u64, self.ops, self.elapsed)
    }
}

/// Where a consumer takes its tokens from
enum Tap {
    Direct(Box<dyn ByteSource>),
    Channel(Receiver<Token>),
    RoundRobin {
        receivers: Vec<Receiver<Token>>,
        next: usize,
    },
}

impl Tap {
    #[inline]
    fn take(&mut self) -> Result<Token> {
        match self {
            Tap::Direct(source) => {
                let mut token = [0u8; TOKEN_LEN];
                source.fill(&mut token).context("Failed to read token")?;
                Ok(token)
            }
            Tap::Channel(rx) => rx
                .recv()
                .map_err(|_| anyhow::anyhow!("All feeders exited early")),
            Tap::RoundRobin { receivers, next } => {
                let rx = &receivers[*next];
                *next = (*next + 1) % receivers.len();
                rx.recv()
                    .map_err(|_| anyhow::anyhow!("Round-robin feeder exited early"))
            }
        }
    }
}

/// What one consumer did
struct ConsumerResult {
    ops: u64,
    latency: Option<LatencyHistogram>,
}

/// Run every configured strategy in order
pub fn run(config: &FeedConfig, debug: bool) -> Result<Vec<FeedReport>> {
    let mut reports = Vec::with_capacity(config.strategies.len());

    for &strategy in &config.strategies {
        if debug {
            eprintln!(
                "DEBUG: Feed strategy {}: {} threads x {} tokens, {} feeders",
                strategy,
                config.threads,
                config.ops_per_thread,
                feeder_count(strategy, config)
            );
        }

        let report = run_strategy(strategy, config)
            .with_context(|| format!("Feed strategy {} failed", strategy))?;

        if debug {
            eprintln!("DEBUG: Feed strategy {} finished in {:?}", strategy, report.elapsed);
        }
        reports.push(report);
    }

    Ok(reports)
}

/// Feeder threads a strategy starts
pub fn feeder_count(strategy: FeedStrategy, config: &FeedConfig) -> usize {
    match strategy {
        FeedStrategy::Baseline | FeedStrategy::Amortized => 0,
        FeedStrategy::Channel | FeedStrategy::ChannelAmortized => 1,
        FeedStrategy::RoundRobin
        | FeedStrategy::ManyWriters
        | FeedStrategy::AmortizedManyWriters => config.feeders,
    }
}

/// Run one strategy to completion
pub fn run_strategy(strategy: FeedStrategy, config: &FeedConfig) -> Result<FeedReport> {
    let feeders = feeder_count(strategy, config);
    if strategy.uses_feeders() && feeders == 0 {
        anyhow::bail!("Strategy {} needs at least one feeder", strategy);
    }
    let (feeder_handles, taps) = build_taps(strategy, config, feeders)?;

    let (start_tx, start_rx) = channel::bounded::<()>(0);
    let mut consumers: Vec<JoinHandle<Result<ConsumerResult>>> = Vec::with_capacity(config.threads);

    for (id, mut tap) in taps.into_iter().enumerate() {
        let start = start_rx.clone();
        let ops = config.ops_per_thread;
        let record_latency = config.record_latency;

        let handle = thread::Builder::new()
            .name(format!("consumer-{}", id))
            .spawn(move || {
                let _ = start.recv();
                consume(&mut tap, ops, record_latency)
            })
            .context("Failed to spawn consumer thread")?;
        consumers.push(handle);
    }
    drop(start_rx);

    let start = Instant::now();
    drop(start_tx);

    let mut ops = 0u64;
    let mut latency = config.record_latency.then(LatencyHistogram::new);
    for handle in consumers {
        let result = handle
            .join()
            .map_err(|_| anyhow::anyhow!("Consumer thread panicked"))??;
        ops += result.ops;
        if let (Some(total), Some(hist)) = (latency.as_mut(), result.latency.as_ref()) {
            total.merge(hist)?;
        }
    }
    let elapsed = start.elapsed();

    // Every receiver is gone now, so each feeder's next send fails
    for handle in feeder_handles {
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("Feeder thread panicked"))??;
    }

    Ok(FeedReport {
        strategy,
        threads: config.threads,
        feeders,
        ops,
        elapsed,
        latency: latency.and_then(|hist| hist.summary()),
    })
}

type FeederHandle = JoinHandle<Result<u64>>;

/// Start the feeders for `strategy` and build one tap per consumer
fn build_taps(
    strategy: FeedStrategy,
    config: &FeedConfig,
    feeders: usize,
) -> Result<(Vec<FeederHandle>, Vec<Tap>)> {
    let amortized = strategy.is_amortized();
    let mut handles = Vec::with_capacity(feeders);

    let taps: Vec<Tap> = match strategy {
        FeedStrategy::Baseline | FeedStrategy::Amortized => (0..config.threads)
            .map(|_| Tap::Direct(token_source(amortized)))
            .collect(),
        FeedStrategy::RoundRobin => {
            let mut receivers = Vec::with_capacity(feeders);
            for id in 0..feeders {
                let (tx, rx) = channel::bounded(config.capacity);
                handles.push(spawn_feeder(id, token_source(amortized), tx)?);
                receivers.push(rx);
            }
            (0..config.threads)
                .map(|id| Tap::RoundRobin {
                    receivers: receivers.clone(),
                    next: id % feeders,
                })
                .collect()
        }
        FeedStrategy::Channel
        | FeedStrategy::ChannelAmortized
        | FeedStrategy::ManyWriters
        | FeedStrategy::AmortizedManyWriters => {
            let (tx, rx) = channel::bounded(config.capacity);
            for id in 0..feeders {
                handles.push(spawn_feeder(id, token_source(amortized), tx.clone())?);
            }
            (0..config.threads).map(|_| Tap::Channel(rx.clone())).collect()
        }
    };

    Ok((handles, taps))
}

fn token_source(amortized: bool) -> Box<dyn ByteSource> {
    if amortized {
        Box::new(BufferedSource::amortized(SecureSource::new()))
    } else {
        Box::new(SecureSource::new())
    }
}

fn spawn_feeder(id: usize, source: Box<dyn ByteSource>, tx: Sender<Token>) -> Result<FeederHandle> {
    thread::Builder::new()
        .name(format!("feeder-{}", id))
        .spawn(move || feed(source, &tx))
        .context("Failed to spawn feeder thread")
}

/// Push tokens until the channel disconnects, returning how many were sent
fn feed<S: ByteSource + ?Sized>(mut source: Box<S>, tx: &Sender<Token>) -> Result<u64> {
    let mut sent = 0u64;
    loop {
        let mut token = [0u8; TOKEN_LEN];
        source.fill(&mut token).context("Feeder failed to read token")?;
        if tx.send(token).is_err() {
            return Ok(sent);
        }
        sent += 1;
    }
}

fn consume(tap: &mut Tap, ops: u64, record_latency: bool) -> Result<ConsumerResult> {
    let mut latency = record_latency.then(LatencyHistogram::new);

    for _ in 0..ops {
        let start = Instant::now();
        let token = tap.take()?;
        if let Some(hist) = latency.as_mut() {
            hist.record(start.elapsed());
        }
        black_box(token);
        thread::yield_now();
    }

    Ok(ConsumerResult { ops, latency })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> FeedConfig {
        FeedConfig {
            strategies: FeedStrategy::ALL.to_vec(),
            threads: 4,
            ops_per_thread: 500,
            feeders: 3,
            capacity: 8,
            record_latency: false,
        }
    }

    #[test]
    fn test_every_strategy_completes() {
        let config = small_config();
        let reports = run(&config, false).unwrap();

        assert_eq!(reports.len(), FeedStrategy::ALL.len());
        for (report, strategy) in reports.iter().zip(FeedStrategy::ALL) {
            assert_eq!(report.strategy, strategy);
            assert_eq!(report.ops, 4 * 500);
            assert!(report.latency.is_none());
        }
    }

    #[test]
    fn test_feeder_counts() {
        let config = small_config();
        assert_eq!(feeder_count(FeedStrategy::Baseline, &config), 0);
        assert_eq!(feeder_count(FeedStrategy::Amortized, &config), 0);
        assert_eq!(feeder_count(FeedStrategy::ChannelAmortized, &config), 1);
        assert_eq!(feeder_count(FeedStrategy::RoundRobin, &config), 3);
        assert_eq!(feeder_count(FeedStrategy::AmortizedManyWriters, &config), 3);
    }

    #[test]
    fn test_latency_recorded() {
        let mut config = small_config();
        config.record_latency = true;

        let report = run_strategy(FeedStrategy::ManyWriters, &config).unwrap();
        let latency = report.latency.unwrap();
        assert_eq!(latency.samples, 4 * 500);
        assert!(latency.p50 <= latency.max);
    }

    #[test]
    fn test_more_feeders_than_consumers() {
        let mut config = small_config();
        config.threads = 1;
        config.feeders = 8;
        config.capacity = 1;

        let report = run_strategy(FeedStrategy::RoundRobin, &config).unwrap();
        assert_eq!(report.ops, 500);
        assert_eq!(report.feeders, 8);
    }

    #[test]
    fn test_zero_ops() {
        let mut config = small_config();
        config.ops_per_thread = 0;

        let report = run_strategy(FeedStrategy::Channel, &config).unwrap();
        assert_eq!(report.ops, 0);
        assert_eq!(report.throughput().bytes, 0);
    }

    #[test]
    fn test_feeder_stops_on_disconnect() {
        let (tx, rx) = channel::bounded(4);
        let handle = thread::spawn(move || feed(Box::new(SecureSource::new()), &tx));

        for _ in 0..10 {
            rx.recv().unwrap();
        }
        drop(rx);

        let sent = handle.join().unwrap().unwrap();
        assert!(sent >= 10);
    }

    #[test]
    fn test_round_robin_rotates() {
        let (tx_a, rx_a) = channel::bounded(4);
        let (tx_b, rx_b) = channel::bounded(4);
        tx_a.send([1u8; TOKEN_LEN]).unwrap();
        tx_a.send([1u8; TOKEN_LEN]).unwrap();
        tx_b.send([2u8; TOKEN_LEN]).unwrap();

        let mut tap = Tap::RoundRobin {
            receivers: vec![rx_a, rx_b],
            next: 0,
        };
        assert_eq!(tap.take().unwrap()[0], 1);
        assert_eq!(tap.take().unwrap()[0], 2);
        assert_eq!(tap.take().unwrap()[0], 1);
    }
}
