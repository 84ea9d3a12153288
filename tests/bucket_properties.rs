//! Property tests for the bucket index formula

use proptest::prelude::*;
use randbucket::bucket::fast::bucket_of_fast;
use randbucket::bucket::{
    bucket_of, bucket_of_no_inline, bucket_of_search, bucket_range, lower_bound, IDENTITY_MAX,
    NUM_BUCKETS, SATURATION_THRESHOLD,
};

/// Values spread across every bit width
fn any_width() -> impl Strategy<Value = u64> {
    (any::<u64>(), 0u32..64).prop_map(|(n, shift)| n >> shift)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn prop_result_in_range(n in any::<u64>()) {
        prop_assert!(bucket_of(n) < NUM_BUCKETS);
    }

    #[test]
    fn prop_monotonic(a in any_width(), b in any_width()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(bucket_of(lo) <= bucket_of(hi));
    }

    #[test]
    fn prop_adjacent_step_at_most_one(n in any_width()) {
        prop_assume!(n < u64::MAX);
        let step = bucket_of(n + 1) - bucket_of(n);
        prop_assert!(step <= 1);
    }

    #[test]
    fn prop_saturates(n in SATURATION_THRESHOLD..=u64::MAX) {
        prop_assert_eq!(bucket_of(n), NUM_BUCKETS - 1);
    }

    #[test]
    fn prop_variants_agree(n in any_width()) {
        let expected = bucket_of(n);
        prop_assert_eq!(bucket_of_fast(n), expected);
        prop_assert_eq!(bucket_of_no_inline(n), expected);
        prop_assert_eq!(bucket_of_search(n), expected);
    }

    #[test]
    fn prop_pure(n in any::<u64>()) {
        prop_assert_eq!(bucket_of(n), bucket_of(n));
    }

    #[test]
    fn prop_value_inside_its_range(n in any_width()) {
        let range = bucket_range(bucket_of(n)).unwrap();
        prop_assert!(range.contains(&n));
    }
}

#[test]
fn identity_below_sixteen() {
    for n in 0..=IDENTITY_MAX {
        assert_eq!(bucket_of(n), n);
    }
}

#[test]
fn powers_of_two() {
    let expected = [1, 2, 4, 8, 15, 18, 24, 27, 33, 36];
    for (shift, &bucket) in expected.iter().enumerate() {
        assert_eq!(bucket_of(1 << shift), bucket, "2^{}", shift);
    }
    assert_eq!(bucket_of(1 << 62), 275);
    assert_eq!(bucket_of(1 << 63), 275);
}

#[test]
fn band_boundaries() {
    assert_eq!(bucket_of(16), 15);
    assert_eq!(bucket_of(63), 24);
    assert_eq!(bucket_of(64), 24);
    assert_eq!(bucket_of(85), 25);
    assert_eq!(lower_bound(24), Some(61));
    assert_eq!(lower_bound(25), Some(85));
}

#[test]
fn saturation_threshold_is_exact() {
    assert_eq!(bucket_of(SATURATION_THRESHOLD), 275);
    assert_eq!(bucket_of(SATURATION_THRESHOLD - 1), 274);
    assert_eq!(lower_bound(275), Some(SATURATION_THRESHOLD));
}

#[test]
fn fast_variant_regression_input() {
    let n = 0xdf5b0412ffd341c0;
    assert_eq!(bucket_of(n), 275);
    assert_eq!(bucket_of_fast(n), 275);
}

#[test]
fn every_bucket_reachable() {
    for bucket in 0..NUM_BUCKETS {
        let low = lower_bound(bucket).unwrap();
        assert_eq!(bucket_of(low), bucket);
    }
    assert_eq!(lower_bound(NUM_BUCKETS), None);
}
