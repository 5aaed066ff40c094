//! Property-based tests for the weight feedback rule
//!
//! Invariants:
//! - Bounds: any input, including out-of-range and NaN, yields a weight in [0, 1]
//! - Strict contraction: a correct answer lowers any weight in (0, 1], a miss
//!   raises any weight in [0, 1)
//! - Fixed points: 0 stays 0 on a correct answer, 1 stays 1 on a miss
//! - Monotonicity: the update preserves the order of two weights

use proptest::prelude::*;

use tango_recall::{update_weight, WeightUpdatePolicy};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_weight() -> impl Strategy<Value = f64> {
    (0u64..=10_000u64).prop_map(|v| v as f64 / 10_000.0)
}

/// Weights in (0, 1]
fn arb_positive_weight() -> impl Strategy<Value = f64> {
    (1u64..=10_000u64).prop_map(|v| v as f64 / 10_000.0)
}

/// Weights in [0, 1)
fn arb_unsaturated_weight() -> impl Strategy<Value = f64> {
    (0u64..10_000u64).prop_map(|v| v as f64 / 10_000.0)
}

fn arb_step() -> impl Strategy<Value = f64> {
    (1u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_raw_weight() -> impl Strategy<Value = f64> {
    prop_oneof![
        arb_weight(),
        (-10.0f64..10.0f64),
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_result_stays_in_bounds(w in arb_raw_weight(), correct in any::<bool>(), step in arb_step()) {
        let next = WeightUpdatePolicy::new(step).update(w, correct);
        prop_assert!((0.0..=1.0).contains(&next), "{} -> {}", w, next);
    }

    #[test]
    fn prop_correct_strictly_lowers(w in arb_positive_weight()) {
        let next = update_weight(w, true);
        prop_assert!(next < w, "{} -> {}", w, next);
    }

    #[test]
    fn prop_incorrect_strictly_raises(w in arb_unsaturated_weight()) {
        let next = update_weight(w, false);
        prop_assert!(next > w, "{} -> {}", w, next);
    }

    #[test]
    fn prop_update_preserves_order(a in arb_weight(), b in arb_weight(), correct in any::<bool>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(update_weight(lo, correct) <= update_weight(hi, correct) + 1e-12);
    }

    #[test]
    fn prop_repeated_correct_answers_converge_down(w in arb_weight()) {
        let mut current = w;
        for _ in 0..50 {
            let next = update_weight(current, true);
            prop_assert!(next <= current);
            current = next;
        }
        prop_assert!(current <= w);
    }
}

#[test]
fn test_fixed_points() {
    assert_eq!(update_weight(0.0, true), 0.0);
    assert_eq!(update_weight(1.0, false), 1.0);
    assert!((update_weight(1.0, true) - 0.6).abs() < 1e-12);
    assert!((update_weight(0.0, false) - 0.4).abs() < 1e-12);
}

#[test]
fn test_nan_reads_as_unreviewed() {
    assert!((update_weight(f64::NAN, true) - 0.6).abs() < 1e-12);
    assert_eq!(update_weight(f64::NAN, false), 1.0);
}
