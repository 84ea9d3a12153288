//! Power-of-four bucket indexing
//!
//! This module maps any `u64` magnitude onto one of [`NUM_BUCKETS`] buckets in
//! constant time. Small values get one bucket each; larger values are grouped
//! into bands that start at powers of four, and every band is cut into
//! roughly nine linear sub-buckets.
//!
//! # Layout
//!
//! - **Identity region**: `0..=15` map to buckets `0..=15`
//! - **Power-of-four bands**: band `k` covers `[4^k, 4^(k+1))` and starts at
//!   `OFFSET_TABLE[k] + 1`
//! - **Saturation**: everything at or above [`SATURATION_THRESHOLD`] lands in
//!   the last bucket (275)
//!
//! # Implementations
//!
//! - [`bucket_of`]: the reference formula, step by step
//! - [`bucket_of_no_inline`]: the same formula behind an inlining barrier
//! - [`bucket_of_fast`]: hand-tuned bit tricks, always inlined
//! - [`bucket_of_search`]: binary search over bucket boundaries (the
//!   logarithmic lookup the formula replaces)
//!
//! All four must agree for every input; [`verify`] checks that.
//!
//! # Example
//!
//! ```
//! use randbucket::bucket::{bucket_of, bucket_of_fast, NUM_BUCKETS};
//!
//! assert_eq!(bucket_of(7), 7);
//! assert_eq!(bucket_of(64), 24);
//! assert_eq!(bucket_of(u64::MAX), NUM_BUCKETS - 1);
//! assert_eq!(bucket_of_fast(0xdf5b0412ffd341c0), bucket_of(0xdf5b0412ffd341c0));
//! ```

pub mod fast;
pub mod verify;

pub use fast::bucket_of_fast;

use std::ops::RangeInclusive;
use std::sync::OnceLock;

/// Number of buckets produced by the formula
pub const NUM_BUCKETS: u64 = 276;

/// Values at or below this map to themselves
pub const IDENTITY_MAX: u64 = 15;

/// Smallest input that lands in the last bucket
///
/// Band 30 starts at 2^60 with a step of (2^60 - 1) / 3; its ninth step
/// (offset 8) already reaches `NUM_BUCKETS - 1`.
pub const SATURATION_THRESHOLD: u64 = (1 << 60) + 8 * (((1 << 60) - 1) / 3);

/// Cumulative bucket index at each power-of-four boundary
///
/// Indexed by `lshift / 2`, i.e. by log4 of the band start.
pub static OFFSET_TABLE: [u64; 32] = [
    0, 3, 14, 23, 32, 41, 50, 59, 68, 77, 86, 95, 104, 113, 122, 131, 140, 149, 158, 167, 176,
    185, 194, 203, 212, 221, 230, 239, 248, 257, 266, 275,
];

/// Compute the bucket for `n`
///
/// Reference implementation. Each step matches the formula literally,
/// including the order of the saturation check and the final `+1`.
///
/// # Example
///
/// ```
/// use randbucket::bucket::bucket_of;
///
/// assert_eq!(bucket_of(0), 0);
/// assert_eq!(bucket_of(15), 15);
/// assert_eq!(bucket_of(16), 15);
/// assert_eq!(bucket_of(85), 25);
/// ```
#[inline]
pub fn bucket_of(n: u64) -> u64 {
    if n <= IDENTITY_MAX {
        return n;
    }

    let rshift = 64 - n.leading_zeros() - 1;
    let mut lshift = rshift;

    if lshift & 1 == 1 {
        lshift -= 1;
    }

    let prev_power_of_4 = (n >> rshift) << lshift;
    let delta = prev_power_of_4 / 3;
    let offset = (n - prev_power_of_4) / delta;
    let pos = offset + OFFSET_TABLE[(lshift / 2) as usize];

    if pos >= NUM_BUCKETS - 1 {
        return NUM_BUCKETS - 1;
    }

    pos + 1
}

/// Same as [`bucket_of`], but never inlined into the caller
///
/// Exists so benchmarks can measure the cost of the call itself.
#[inline(never)]
pub fn bucket_of_no_inline(n: u64) -> u64 {
    bucket_of(n)
}

/// Compute the bucket for `n` by binary search over [`boundaries`]
///
/// This is the O(log B) lookup the closed-form formula replaces. It is
/// kept as an independent oracle for the formula.
pub fn bucket_of_search(n: u64) -> u64 {
    let bounds = boundaries();
    // bounds[0] == 0, so at least one boundary is <= n
    (bounds.partition_point(|&lower| lower <= n) - 1) as u64
}

/// Lower bound of every bucket
///
/// Entry `b` is the smallest input with `bucket_of(input) >= b`. Built once
/// on first use and shared read-only afterwards.
pub fn boundaries() -> &'static [u64; NUM_BUCKETS as usize] {
    static BOUNDARIES: OnceLock<[u64; NUM_BUCKETS as usize]> = OnceLock::new();

    BOUNDARIES.get_or_init(|| {
        let mut bounds = [0u64; NUM_BUCKETS as usize];
        for (bucket, lower) in bounds.iter_mut().enumerate() {
            *lower = first_input_reaching(bucket as u64);
        }
        bounds
    })
}

/// Smallest value that falls into `bucket`, or `None` for an invalid id
pub fn lower_bound(bucket: u64) -> Option<u64> {
    boundaries().get(bucket as usize).copied()
}

/// Inclusive range of values that fall into `bucket`
///
/// Returns `None` for bucket ids outside `0..NUM_BUCKETS`.
///
/// # Example
///
/// ```
/// use randbucket::bucket::bucket_range;
///
/// assert_eq!(bucket_range(3), Some(3..=3));
/// assert_eq!(bucket_range(24), Some(61..=84));
/// assert_eq!(bucket_range(276), None);
/// ```
pub fn bucket_range(bucket: u64) -> Option<RangeInclusive<u64>> {
    let start = lower_bound(bucket)?;
    let end = match lower_bound(bucket + 1) {
        Some(next) => next - 1,
        None => u64::MAX,
    };
    Some(start..=end)
}

/// Binary search on the monotonic formula for the first input reaching `bucket`
fn first_input_reaching(bucket: u64) -> u64 {
    let (mut lo, mut hi) = (0u64, u64::MAX);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if bucket_of(mid) >= bucket {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_region() {
        for n in 0..=IDENTITY_MAX {
            assert_eq!(bucket_of(n), n);
        }
    }

    #[test]
    fn test_first_band_boundaries() {
        assert_eq!(bucket_of(16), 15);
        assert_eq!(bucket_of(20), 15);
        assert_eq!(bucket_of(21), 16);
        assert_eq!(bucket_of(60), 23);
        assert_eq!(bucket_of(61), 24);
    }

    #[test]
    fn test_power_of_four_crossing_at_64() {
        // 63 is the top of band 2 and 64 the bottom of band 3; both land in 24
        assert_eq!(bucket_of(63), 24);
        assert_eq!(bucket_of(64), 24);
        assert_eq!(bucket_of(84), 24);
        assert_eq!(bucket_of(85), 25);
        assert_eq!(OFFSET_TABLE[3], 23);
    }

    #[test]
    fn test_powers_of_two() {
        let expected = [1, 2, 4, 8, 15, 18, 24, 27, 33, 36];
        for (k, &bucket) in expected.iter().enumerate() {
            assert_eq!(bucket_of(1u64 << k), bucket, "2^{}", k);
        }
        assert_eq!(bucket_of(1u64 << 62), NUM_BUCKETS - 1);
        assert_eq!(bucket_of(1u64 << 63), NUM_BUCKETS - 1);
    }

    #[test]
    fn test_saturation_threshold() {
        assert_eq!(SATURATION_THRESHOLD, 4_227_378_850_225_105_576);
        assert_eq!(bucket_of(SATURATION_THRESHOLD), NUM_BUCKETS - 1);
        assert_eq!(bucket_of(SATURATION_THRESHOLD - 1), NUM_BUCKETS - 2);
        assert_eq!(bucket_of(u64::MAX), NUM_BUCKETS - 1);
        assert_eq!(bucket_of(u64::MAX - 1), NUM_BUCKETS - 1);
    }

    #[test]
    fn test_known_regression_input() {
        let n = 0xdf5b0412ffd341c0;
        assert_eq!(bucket_of(n), NUM_BUCKETS - 1);
        assert_eq!(bucket_of_fast(n), bucket_of(n));
    }

    #[test]
    fn test_no_inline_matches() {
        for n in [0, 1, 15, 16, 63, 64, 1 << 40, u64::MAX] {
            assert_eq!(bucket_of_no_inline(n), bucket_of(n));
        }
    }

    #[test]
    fn test_boundaries_strictly_increasing() {
        let bounds = boundaries();
        assert_eq!(bounds[0], 0);
        assert_eq!(bounds[15], 15);
        assert_eq!(bounds[16], 21);
        assert_eq!(bounds[(NUM_BUCKETS - 1) as usize], SATURATION_THRESHOLD);
        for pair in bounds.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_search_matches_formula() {
        for n in 0..10_000u64 {
            assert_eq!(bucket_of_search(n), bucket_of(n), "input {}", n);
        }
        for &lower in boundaries().iter() {
            assert_eq!(bucket_of_search(lower), bucket_of(lower));
            if lower > 0 {
                assert_eq!(bucket_of_search(lower - 1), bucket_of(lower - 1));
            }
        }
        assert_eq!(bucket_of_search(u64::MAX), NUM_BUCKETS - 1);
    }

    #[test]
    fn test_bucket_range() {
        assert_eq!(bucket_range(0), Some(0..=0));
        assert_eq!(bucket_range(15), Some(15..=20));
        assert_eq!(bucket_range(24), Some(61..=84));
        assert_eq!(bucket_range(NUM_BUCKETS - 1), Some(SATURATION_THRESHOLD..=u64::MAX));
        assert_eq!(bucket_range(NUM_BUCKETS), None);
        assert_eq!(lower_bound(NUM_BUCKETS), None);
    }

    #[test]
    fn test_monotonic_dense() {
        let mut prev = 0;
        for n in 0..200_000u64 {
            let bucket = bucket_of(n);
            assert!(bucket >= prev, "bucket_of({}) = {} < {}", n, bucket, prev);
            prev = bucket;
        }
    }
}
