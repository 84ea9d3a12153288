//! Producer/consumer pipeline experiment
//!
//! `N` producer threads build random uppercase payloads and hand them to
//! `N` consumer threads over one unbuffered (rendezvous) channel. Every
//! thread parks on a start gate, so the clock starts only once all of them
//! exist.
//!
//! Payload generation depends on [`SourceKind`]:
//!
//! - **Secure**: length is a little-endian `u32` from the OS generator
//!   modulo `max_len`; letters come from OS random bytes
//! - **Pseudo**: message `j` of a producer has length `gen_range(0..j)`
//!   from a per-producer xoshiro; letters come from `gen_range(0..26)`
//!
//! Consumers sum the lengths they receive and bucket each one into a
//! [`SizeHistogram`].

use crate::config::{PipelineConfig, SourceKind};
use crate::rng::letters::{random_letters, source_letters};
use crate::rng::{ByteSource, SecureSource};
use crate::stats::size_histogram::SizeHistogram;
use crate::stats::Throughput;
use crate::Result;
use anyhow::Context;
use crossbeam::channel::{self, Receiver, Sender};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One repetition of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Zero-based repetition index
    pub run: usize,
    /// Gate release to last thread joined
    pub elapsed: Duration,
    /// Messages received by consumers
    pub messages: u64,
    /// Payload bytes sent by producers
    pub bytes_produced: u64,
    /// Payload bytes received by consumers
    pub bytes_consumed: u64,
}

/// Results of all repetitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub payload: SourceKind,
    pub producers: usize,
    pub messages_per_producer: usize,
    pub runs: Vec<RunResult>,
    /// Payload lengths across every run
    pub sizes: SizeHistogram,
}

impl PipelineReport {
    /// Sum of per-run elapsed times
    pub fn total_elapsed(&self) -> Duration {
        self.runs.iter().map(|r| r.elapsed).sum()
    }

    /// Mean elapsed time per run
    pub fn mean_run_time(&self) -> Duration {
        if self.runs.is_empty() {
            return Duration::ZERO;
        }
        self.total_elapsed() / self.runs.len() as u32
    }

    /// Consumed bytes and messages over the total elapsed time
    pub fn throughput(&self) -> Throughput {
        self.runs.iter().fold(Throughput::default(), |mut acc, r| {
            acc.merge(&Throughput::new(r.bytes_consumed, r.messages, r.elapsed));
            acc
        })
    }
}

/// What one consumer saw
struct ConsumerTally {
    bytes: u64,
    sizes: SizeHistogram,
}

/// Run the pipeline `config.runs` times
pub fn run(config: &PipelineConfig, debug: bool) -> Result<PipelineReport> {
    let mut report = PipelineReport {
        payload: config.payload,
        producers: config.producers,
        messages_per_producer: config.messages_per_producer,
        runs: Vec::with_capacity(config.runs),
        sizes: SizeHistogram::new(),
    };

    for run in 0..config.runs {
        let (result, sizes) = run_once(config, run)?;

        if debug {
            eprintln!(
                "DEBUG: Pipeline run {}: {} messages, {} bytes in {:?}",
                run, result.messages, result.bytes_consumed, result.elapsed
            );
        }
        if result.bytes_produced != result.bytes_consumed {
            anyhow::bail!(
                "Run {} lost payload bytes: produced {}, consumed {}",
                run,
                result.bytes_produced,
                result.bytes_consumed
            );
        }

        report.sizes.merge(&sizes);
        report.runs.push(result);
    }

    Ok(report)
}

fn run_once(config: &PipelineConfig, run: usize) -> Result<(RunResult, SizeHistogram)> {
    let (start_tx, start_rx) = channel::bounded::<()>(0);
    let (tx, rx) = channel::bounded::<Vec<u8>>(0);

    let mut producers: Vec<JoinHandle<Result<u64>>> = Vec::with_capacity(config.producers);
    for id in 0..config.producers {
        let start = start_rx.clone();
        let tx = tx.clone();
        let payload = config.payload;
        let messages = config.messages_per_producer;
        let max_len = config.max_len;

        let handle = thread::Builder::new()
            .name(format!("producer-{}", id))
            .spawn(move || {
                // Blocks until the gate sender is dropped
                let _ = start.recv();
                produce(payload, messages, max_len, &tx)
            })
            .context("Failed to spawn producer thread")?;
        producers.push(handle);
    }

    let mut consumers: Vec<JoinHandle<ConsumerTally>> = Vec::with_capacity(config.producers);
    for id in 0..config.producers {
        let start = start_rx.clone();
        let rx = rx.clone();

        let handle = thread::Builder::new()
            .name(format!("consumer-{}", id))
            .spawn(move || {
                let _ = start.recv();
                consume(&rx)
            })
            .context("Failed to spawn consumer thread")?;
        consumers.push(handle);
    }

    // Only the threads may hold channel ends, or the consumers never see
    // the channel close
    drop(tx);
    drop(rx);
    drop(start_rx);

    let start = Instant::now();
    drop(start_tx);

    let mut bytes_produced = 0u64;
    for handle in producers {
        bytes_produced += handle
            .join()
            .map_err(|_| anyhow::anyhow!("Producer thread panicked"))??;
    }

    let mut bytes_consumed = 0u64;
    let mut sizes = SizeHistogram::new();
    for handle in consumers {
        let tally = handle
            .join()
            .map_err(|_| anyhow::anyhow!("Consumer thread panicked"))?;
        bytes_consumed += tally.bytes;
        sizes.merge(&tally.sizes);
    }

    let result = RunResult {
        run,
        elapsed: start.elapsed(),
        messages: sizes.len(),
        bytes_produced,
        bytes_consumed,
    };

    Ok((result, sizes))
}

/// Send `messages` payloads, returning the bytes sent
fn produce(
    payload: SourceKind,
    messages: usize,
    max_len: usize,
    tx: &Sender<Vec<u8>>,
) -> Result<u64> {
    let mut sent = 0u64;

    match payload {
        SourceKind::Secure => {
            let mut source = SecureSource::new();
            for _ in 1..=messages {
                let len = secure_len(&mut source, max_len)?;
                let message = source_letters(&mut source, len)
                    .context("Failed to generate payload")?;
                sent += message.len() as u64;
                tx.send(message)
                    .map_err(|_| anyhow::anyhow!("All consumers exited early"))?;
            }
        }
        SourceKind::Pseudo => {
            let mut rng = Xoshiro256PlusPlus::from_entropy();
            for j in 1..=messages {
                let len = rng.gen_range(0..j);
                let message = random_letters(&mut rng, len);
                sent += message.len() as u64;
                tx.send(message)
                    .map_err(|_| anyhow::anyhow!("All consumers exited early"))?;
            }
        }
    }

    Ok(sent)
}

/// Payload length from four OS random bytes
fn secure_len<S: ByteSource + ?Sized>(source: &mut S, max_len: usize) -> Result<usize> {
    let mut raw = [0u8; 4];
    source.fill(&mut raw).context("Failed to read payload length")?;
    Ok(u32::from_le_bytes(raw) as usize % max_len)
}

/// Drain the channel until every producer has hung up
fn consume(rx: &Receiver<Vec<u8>>) -> ConsumerTally {
    let mut tally = ConsumerTally {
        bytes: 0,
        sizes: SizeHistogram::new(),
    };

    for message in rx.iter() {
        tally.bytes += message.len() as u64;
        tally.sizes.record(message.len() as u64);
    }

    tally
}
