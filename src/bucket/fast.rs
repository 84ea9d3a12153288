//! Hand-tuned bucket formula
//!
//! Produces exactly the same output as [`super::bucket_of`] using only
//! primitive integer operations:
//!
//! - `rshift` is `63 ^ clz(n)` (equal to `63 - clz(n)` because `clz <= 63`)
//! - the band start is `1 << lshift`, since `n >> rshift` is always 1
//! - division by 3 is a 128-bit multiply-high by `0xAAAA_AAAA_AAAA_AAAB`
//! - the saturation branch becomes a `min`

use super::{IDENTITY_MAX, NUM_BUCKETS, OFFSET_TABLE};

/// Multiplicative inverse of 3 scaled by 2^65
const DIV3_MAGIC: u128 = 0xAAAA_AAAA_AAAA_AAAB;

/// Compute the bucket for `n` (optimized path)
#[inline(always)]
pub fn bucket_of_fast(n: u64) -> u64 {
    if n <= IDENTITY_MAX {
        return n;
    }

    let rshift = 63 ^ n.leading_zeros();
    let lshift = rshift & !1;
    let band_start = 1u64 << lshift;
    let offset = (n - band_start) / div3(band_start);
    let pos = offset + OFFSET_TABLE[(lshift >> 1) as usize];

    // pos >= NUM_BUCKETS - 1 saturates; otherwise pos + 1 <= NUM_BUCKETS - 1
    (pos + 1).min(NUM_BUCKETS - 1)
}

/// Exact `x / 3` for every `u64`
#[inline(always)]
const fn div3(x: u64) -> u64 {
    ((x as u128 * DIV3_MAGIC) >> 65) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::bucket_of;

    #[test]
    fn test_div3_exact() {
        for x in (0..10_000u64).chain([u64::MAX, u64::MAX - 1, u64::MAX - 2, 1 << 62, 1 << 63]) {
            assert_eq!(div3(x), x / 3, "x = {}", x);
        }
    }

    #[test]
    fn test_fast_matches_reference_small() {
        for n in 0..100_000u64 {
            assert_eq!(bucket_of_fast(n), bucket_of(n), "input {}", n);
        }
    }

    #[test]
    fn test_fast_matches_reference_top_bit_set() {
        // 1101 1111 0101 1011 0000 0100 0001 0010
        // 1111 1111 1101 0011 0100 0001 1100 0000
        let n = 0xdf5b0412ffd341c0;
        assert_eq!(bucket_of_fast(n), bucket_of(n));

        for n in [1u64 << 63, u64::MAX, u64::MAX >> 1, (1 << 63) | 1] {
            assert_eq!(bucket_of_fast(n), bucket_of(n), "input {:#x}", n);
        }
    }

    #[test]
    fn test_fast_matches_reference_band_edges() {
        for k in 2..64u32 {
            let p = 1u64 << k;
            for n in [p - 1, p, p + 1] {
                assert_eq!(bucket_of_fast(n), bucket_of(n), "input {:#x}", n);
            }
        }
    }
}
