//! Property-based tests for LargeDoubleSequence
//!
//! Chunking is invisible to callers and the rolling median only ever reads
//! pre-transform values.

use fast_expected::core::{LargeDoubleSequence, SequenceError};
use proptest::prelude::*;

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000i32..1_000, 0..200)
        .prop_map(|v| v.into_iter().map(|x| x as f64 / 4.0).collect())
}

fn build(values: &[f64], chunk_len: u64) -> LargeDoubleSequence {
    let mut seq = LargeDoubleSequence::with_chunk_len(values.len() as u64, chunk_len);
    for (i, v) in values.iter().enumerate() {
        seq.set(i as u64, *v).unwrap();
    }
    seq
}

fn reference_median(values: &[f64], radius: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(values.len());
            let mut w = values[lo..hi].to_vec();
            w.sort_by(|a, b| a.total_cmp(b));
            let n = w.len();
            if n % 2 == 1 {
                w[n / 2]
            } else {
                (w[n / 2 - 1] + w[n / 2]) / 2.0
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Values read back are the values written, whatever the chunk length
    #[test]
    fn prop_chunked_get_set(values in arb_values(), chunk_len in 1u64..17) {
        let seq = build(&values, chunk_len);
        prop_assert_eq!(seq.len(), values.len() as u64);
        prop_assert_eq!(seq.iter().collect::<Vec<_>>(), values.clone());
        prop_assert_eq!(seq.last(), values.last().copied());
        prop_assert_eq!(
            seq.get(values.len() as u64),
            Err(SequenceError::IndexOutOfBounds { index: values.len() as u64, len: values.len() as u64 })
        );
    }

    /// Rolling median matches a brute-force median over clipped windows
    #[test]
    fn prop_rolling_median_matches_reference(
        values in arb_values(),
        radius in 0usize..12,
        chunk_len in 1u64..17,
    ) {
        let mut seq = build(&values, chunk_len);
        seq.rolling_median(radius as u64);
        prop_assert_eq!(seq.iter().collect::<Vec<_>>(), reference_median(&values, radius));
    }

    /// A constant sequence is left unchanged
    #[test]
    fn prop_rolling_median_constant(value in -100.0f64..100.0, len in 0usize..150, radius in 0u64..120) {
        let mut seq = LargeDoubleSequence::from_values(vec![value; len]);
        seq.rolling_median(radius);
        prop_assert!(seq.iter().all(|v| v == value));
    }

    /// Monotonic input stays monotonic and its interior is untouched
    #[test]
    fn prop_rolling_median_monotonic(values in arb_values(), radius in 0usize..12) {
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mut seq = LargeDoubleSequence::from_values(sorted.clone());
        seq.rolling_median(radius as u64);
        let out: Vec<f64> = seq.iter().collect();

        prop_assert!(out.windows(2).all(|w| w[0] <= w[1]));
        for i in radius..sorted.len().saturating_sub(radius) {
            prop_assert_eq!(out[i], sorted[i]);
        }
    }
}

#[test]
fn test_radius_zero_is_identity() {
    let values = vec![3.0, -1.0, 7.5, 0.0];
    let mut seq = LargeDoubleSequence::from_values(values.clone());
    seq.rolling_median(0);
    assert_eq!(seq.iter().collect::<Vec<_>>(), values);
}
