//! Cross-implementation validation
//!
//! Every alternative bucket implementation is compared against the
//! reference [`bucket_of`]. A mismatch is reported as a [`Divergence`],
//! which the caller treats as a defect, not as a condition to recover from.
//!
//! # Phases
//!
//! - **Known cases**: fixed regression inputs and edges
//! - **Powers of two**: `2^0` through `2^63`
//! - **Dense range**: every input in `[0, range_end)`, checked in parallel
//! - **Random**: seeded samples spread over all bit widths
//! - **Monotonic**: `bucket_of(n) <= bucket_of(n + 1)` over the dense range

use super::{
    bucket_of, bucket_of_fast, bucket_of_no_inline, bucket_of_search, NUM_BUCKETS,
    SATURATION_THRESHOLD,
};
use crate::config::VerifyConfig;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Inputs that have caught real mismatches or sit on an edge of the formula
pub const KNOWN_CASES: &[u64] = &[
    0xdf5b0412ffd341c0,
    0,
    1,
    15,
    16,
    63,
    64,
    85,
    SATURATION_THRESHOLD - 1,
    SATURATION_THRESHOLD,
    1 << 62,
    1 << 63,
    u64::MAX - 1,
    u64::MAX,
];

/// Two implementations disagreed on an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error(
    "results don't match for input {input:#x}: reference {reference}, {implementation} {candidate}"
)]
pub struct Divergence {
    pub input: u64,
    pub implementation: Implementation,
    pub reference: u64,
    pub candidate: u64,
}

/// Bucket implementations checked against the reference formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implementation {
    Fast,
    Search,
    NoInline,
}

impl Implementation {
    pub const ALL: [Implementation; 3] = [Self::Fast, Self::Search, Self::NoInline];

    /// The function under test
    pub fn function(self) -> fn(u64) -> u64 {
        match self {
            Self::Fast => bucket_of_fast,
            Self::Search => bucket_of_search,
            Self::NoInline => bucket_of_no_inline,
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Search => write!(f, "search"),
            Self::NoInline => write!(f, "no_inline"),
        }
    }
}

/// Validation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    KnownCases,
    PowersOfTwo,
    DenseRange,
    Random,
    Monotonic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KnownCases => "known cases",
            Self::PowersOfTwo => "powers of two",
            Self::DenseRange => "dense range",
            Self::Random => "random",
            Self::Monotonic => "monotonic",
        };
        f.write_str(name)
    }
}

/// Outcome of one phase for one implementation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: Phase,
    /// `None` for checks on the reference formula alone
    pub implementation: Option<Implementation>,
    pub checked: u64,
    pub failure: Option<String>,
}

impl PhaseResult {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Results of a full validation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyReport {
    pub phases: Vec<PhaseResult>,
}

impl VerifyReport {
    /// True if every phase passed
    pub fn passed(&self) -> bool {
        self.phases.iter().all(PhaseResult::passed)
    }

    /// Total inputs checked across all phases
    pub fn total_checked(&self) -> u64 {
        self.phases.iter().map(|p| p.checked).sum()
    }

    /// Add a phase outcome, keeping the matched count of a failed phase
    fn record(
        &mut self,
        phase: Phase,
        implementation: Option<Implementation>,
        result: Result<u64, PhaseFailure>,
    ) {
        match result {
            Ok(checked) => self.push(phase, implementation, checked, None),
            Err(failure) => self.push(
                phase,
                implementation,
                failure.checked,
                Some(failure.divergence.to_string()),
            ),
        }
    }

    fn push(
        &mut self,
        phase: Phase,
        implementation: Option<Implementation>,
        checked: u64,
        failure: Option<String>,
    ) {
        self.phases.push(PhaseResult {
            phase,
            implementation,
            checked,
            failure,
        });
    }
}

/// A phase stopped at a divergence
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{divergence} (after {checked} matching inputs)")]
pub struct PhaseFailure {
    /// Inputs that matched before the divergence
    pub checked: u64,
    pub divergence: Divergence,
}

/// Compare one input against the reference formula
#[inline]
pub fn compare(n: u64, implementation: Implementation) -> Result<(), Divergence> {
    compare_with(n, implementation, implementation.function())
}

#[inline]
fn compare_with(
    n: u64,
    implementation: Implementation,
    f: fn(u64) -> u64,
) -> Result<(), Divergence> {
    let reference = bucket_of(n);
    let candidate = f(n);

    if reference != candidate {
        return Err(Divergence {
            input: n,
            implementation,
            reference,
            candidate,
        });
    }

    Ok(())
}

/// Check `inputs` in order, stopping at the first divergence
fn check_inputs<I>(
    inputs: I,
    implementation: Implementation,
    f: fn(u64) -> u64,
) -> Result<u64, PhaseFailure>
where
    I: IntoIterator<Item = u64>,
{
    let mut checked = 0u64;
    for n in inputs {
        compare_with(n, implementation, f).map_err(|divergence| PhaseFailure {
            checked,
            divergence,
        })?;
        checked += 1;
    }
    Ok(checked)
}

/// Check every entry of [`KNOWN_CASES`]
pub fn check_known_cases(implementation: Implementation) -> Result<u64, PhaseFailure> {
    check_inputs(KNOWN_CASES.iter().copied(), implementation, implementation.function())
}

/// Check `2^k` for `k` in `0..=63`
pub fn check_powers_of_two(implementation: Implementation) -> Result<u64, PhaseFailure> {
    check_inputs((0..64).map(|k| 1u64 << k), implementation, implementation.function())
}

/// Check every input in `range`, in parallel
///
/// On failure, reports the lowest mismatching input and how many inputs
/// below it matched.
pub fn check_range(
    range: Range<u64>,
    implementation: Implementation,
) -> Result<u64, PhaseFailure> {
    check_range_with(range, implementation, implementation.function())
}

fn check_range_with(
    range: Range<u64>,
    implementation: Implementation,
    f: fn(u64) -> u64,
) -> Result<u64, PhaseFailure> {
    let start = range.start;
    let checked = range.end.saturating_sub(start);
    let first_bad = range
        .into_par_iter()
        .find_first(|&n| compare_with(n, implementation, f).is_err());

    match first_bad {
        Some(n) => match compare_with(n, implementation, f) {
            Err(divergence) => Err(PhaseFailure {
                checked: n - start,
                divergence,
            }),
            Ok(()) => Ok(checked),
        },
        None => Ok(checked),
    }
}

/// Check `samples` random inputs drawn from a seeded generator
///
/// Values are drawn uniformly and then shifted right by a random amount so
/// every magnitude band gets sampled, not just the saturated top band.
pub fn check_random(
    samples: u64,
    seed: u64,
    implementation: Implementation,
) -> Result<u64, PhaseFailure> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let inputs = (0..samples).map(move |_| rng.gen::<u64>() >> rng.gen_range(0..64));
    check_inputs(inputs, implementation, implementation.function())
}

/// Check `bucket_of(n) <= bucket_of(n + 1)` and `bucket_of(n) < NUM_BUCKETS` over `range`
///
/// Returns the first offending input on failure.
pub fn check_monotonic(range: Range<u64>) -> Result<u64, u64> {
    let checked = range.end.saturating_sub(range.start);
    let first_bad = range.into_par_iter().find_first(|&n| {
        let bucket = bucket_of(n);
        bucket >= NUM_BUCKETS || n.checked_add(1).map_or(false, |next| bucket > bucket_of(next))
    });

    match first_bad {
        Some(n) => Err(n),
        None => Ok(checked),
    }
}

/// Run every phase for every implementation
pub fn run(config: &VerifyConfig, debug: bool) -> VerifyReport {
    let mut report = VerifyReport::default();
    let dense = 0..config.range_end;

    for implementation in Implementation::ALL {
        if debug {
            eprintln!("DEBUG: Verifying {} implementation", implementation);
        }

        let phases: [(Phase, Result<u64, PhaseFailure>); 4] = [
            (Phase::KnownCases, check_known_cases(implementation)),
            (Phase::PowersOfTwo, check_powers_of_two(implementation)),
            (Phase::DenseRange, check_range(dense.clone(), implementation)),
            (
                Phase::Random,
                check_random(config.samples, config.seed, implementation),
            ),
        ];

        for (phase, result) in phases {
            report.record(phase, Some(implementation), result);
        }
    }

    match check_monotonic(dense.clone()) {
        Ok(checked) => report.push(Phase::Monotonic, None, checked, None),
        Err(n) => report.push(
            Phase::Monotonic,
            None,
            n - dense.start,
            Some(format!(
                "bucket_of({}) = {} breaks ordering against bucket_of({})",
                n,
                bucket_of(n),
                n.wrapping_add(1)
            )),
        ),
    }

    report
}
