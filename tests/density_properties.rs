//! Property-based tests for DensityAccumulator
//!
//! Accumulation is order independent, possible distances follow the
//! triangular closed form, and the adaptive window honors its floor.

use fast_expected::core::{
    AdaptiveWindows, Chromosome, ChromosomeSet, DensityAccumulator, NormalizationType,
    MIN_VALS_NEEDED,
};
use proptest::prelude::*;
use rayon::prelude::*;

/// Chromosome lengths for a small synthetic genome
fn arb_lengths() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..5_000, 1..6)
}

/// (chromosome slot, bin1, bin2, integer weight) observations
fn arb_observations() -> impl Strategy<Value = Vec<(usize, u64, u64, u32)>> {
    prop::collection::vec((0usize..8, 0u64..60, 0u64..60, 0u32..50), 0..300)
}

fn genome(lengths: &[u64]) -> ChromosomeSet {
    ChromosomeSet::new(
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| Chromosome::new(i, format!("chr{}", i + 1), len))
            .collect(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Concurrent ingestion yields the same sums as a sequential reference
    #[test]
    fn prop_actual_distances_order_independent(
        lengths in arb_lengths(),
        observations in arb_observations(),
    ) {
        let set = genome(&lengths);
        let acc = DensityAccumulator::new(&set, 100, NormalizationType::None).unwrap();
        let n_bins = acc.number_of_bins();

        observations.par_iter().for_each(|&(chr, b1, b2, w)| {
            acc.add_distance(chr, b1, b2, w as f64);
        });

        let mut expected_dist = vec![0.0; n_bins];
        let mut expected_chr = vec![0.0; lengths.len()];
        for &(chr, b1, b2, w) in &observations {
            let d = b1.abs_diff(b2) as usize;
            if chr < lengths.len() && d < n_bins {
                expected_dist[d] += w as f64;
                expected_chr[chr] += w as f64;
            }
        }

        prop_assert_eq!(acc.actual_distances(), expected_dist);
        for (chr, total) in expected_chr.iter().enumerate() {
            prop_assert_eq!(acc.chromosome_count(chr), Some(*total));
        }
    }

    /// NaN and infinite weights never change any accumulator
    #[test]
    fn prop_non_finite_weights_ignored(
        lengths in arb_lengths(),
        observations in arb_observations(),
    ) {
        let set = genome(&lengths);
        let acc = DensityAccumulator::new(&set, 100, NormalizationType::None).unwrap();
        for (i, &(chr, b1, b2, _)) in observations.iter().enumerate() {
            let weight = match i % 3 {
                0 => f64::NAN,
                1 => f64::INFINITY,
                _ => f64::NEG_INFINITY,
            };
            prop_assert!(!acc.add_distance(chr, b1, b2, weight));
        }
        prop_assert!(acc.actual_distances().iter().all(|v| *v == 0.0));
    }

    /// Sum of possible distances equals the triangular closed form and a
    /// brute-force pair count
    #[test]
    fn prop_possible_distances_triangular(
        lengths in arb_lengths(),
        bin_size in 50u64..400,
    ) {
        let set = genome(&lengths);
        let mut acc = DensityAccumulator::new(&set, bin_size, NormalizationType::None).unwrap();
        for chr in 0..lengths.len() {
            acc.add_distance(chr, 0, 0, 1.0);
        }
        acc.compute_density().unwrap();

        let n_chr_bins: Vec<u64> = lengths.iter().map(|l| l / bin_size).collect();
        let max_num_bins = n_chr_bins.iter().copied().max().unwrap_or(0) as usize;
        prop_assert_eq!(acc.max_num_bins(), max_num_bins);

        let possible = acc.possible_distances();
        prop_assert_eq!(possible.len(), max_num_bins);

        let closed_form: u64 = n_chr_bins.iter().map(|n| n * (n + 1) / 2).sum();
        prop_assert_eq!(possible.iter().sum::<f64>(), closed_form as f64);

        let mut brute = vec![0.0; max_num_bins];
        for &n in &n_chr_bins {
            for i in 0..n {
                for j in i..n {
                    brute[(j - i) as usize] += 1.0;
                }
            }
        }
        prop_assert_eq!(possible, brute.as_slice());
    }

    /// Every window holds at least the floor unless it already reaches the
    /// last distance, and its sums match its bounds
    #[test]
    fn prop_window_floor_honored(
        weights in prop::collection::vec(0u32..300, 1..120),
    ) {
        let actual: Vec<f64> = weights.iter().map(|&w| w as f64).collect();
        let possible: Vec<f64> = (0..actual.len()).map(|i| (actual.len() - i) as f64).collect();
        let last = actual.len() - 1;

        let windows: Vec<_> = AdaptiveWindows::new(&actual, &possible).collect();
        prop_assert_eq!(windows.len(), actual.len());

        for w in &windows {
            prop_assert!(w.bound1 <= w.bound2);
            prop_assert!(w.bound2 <= last);
            prop_assert!(
                w.num_sum >= MIN_VALS_NEEDED || w.bound2 == last,
                "window [{}, {}] holds {}", w.bound1, w.bound2, w.num_sum
            );
            let num: f64 = actual[w.bound1..=w.bound2].iter().sum();
            let den: f64 = possible[w.bound1..=w.bound2].iter().sum();
            prop_assert_eq!(w.num_sum, num);
            prop_assert_eq!(w.den_sum, den);
        }
    }

    /// Exposed scale factors are always positive
    #[test]
    fn prop_scale_factors_positive(
        lengths in arb_lengths(),
        observations in arb_observations(),
    ) {
        let set = genome(&lengths);
        let mut acc = DensityAccumulator::new(&set, 100, NormalizationType::Kr).unwrap();
        for &(chr, b1, b2, w) in &observations {
            acc.add_distance(chr, b1, b2, w as f64);
        }
        acc.compute_density().unwrap();
        for (&chr, &factor) in acc.chr_scale_factors().iter() {
            prop_assert!(chr < lengths.len());
            prop_assert!(factor > 0.0);
        }
    }
}
