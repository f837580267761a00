//! Expected contact density from pairwise contact observations
//!
//! Using a [`DensityAccumulator`] takes three steps:
//!
//! 1. build it from a [`ChromosomeSet`], a bin size and a normalization type
//! 2. feed every contact through [`DensityAccumulator::add_distance`] (or
//!    [`DensityAccumulator::add_contact`]), possibly from many threads
//! 3. call [`DensityAccumulator::compute_density`] once ingestion is done
//!
//! The result is a smoothed genome-wide curve of observed / possible contacts
//! per diagonal distance, plus a per-chromosome factor relating the curve's
//! predicted total to what was actually observed on that chromosome.

use crate::core::chromosome::{Chromosome, ChromosomeSet};
use crate::core::error::{ExpectedError, Result};
use crate::core::expected::{ExpectedValueFunction, HicUnit};
use crate::core::sequence::LargeDoubleSequence;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Minimum weighted count a window must hold (5% shot noise)
pub const MIN_VALS_NEEDED: f64 = 400.0;

/// Radius of the median pass applied to the windowed average
pub const ROLLING_MEDIAN_RADIUS: u64 = 100;

/// Normalization scheme that produced the ingested weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NormalizationType {
    /// Raw observed counts
    #[default]
    None,
    /// Vanilla coverage
    Vc,
    /// Square root of vanilla coverage
    VcSqrt,
    /// Knight-Ruiz balancing
    Kr,
    /// SCALE balancing
    Scale,
}

impl NormalizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationType::None => "NONE",
            NormalizationType::Vc => "VC",
            NormalizationType::VcSqrt => "VC_SQRT",
            NormalizationType::Kr => "KR",
            NormalizationType::Scale => "SCALE",
        }
    }
}

impl fmt::Display for NormalizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" | "OBSERVED" => Ok(NormalizationType::None),
            "VC" => Ok(NormalizationType::Vc),
            "VC_SQRT" => Ok(NormalizationType::VcSqrt),
            "KR" => Ok(NormalizationType::Kr),
            "SCALE" => Ok(NormalizationType::Scale),
            other => Err(format!("unknown normalization type: {}", other)),
        }
    }
}

/// One binned contact: two bin coordinates and a count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    pub bin_x: u64,
    pub bin_y: u64,
    pub counts: f32,
}

impl ContactRecord {
    pub fn new(bin_x: u64, bin_y: u64, counts: f32) -> Self {
        Self {
            bin_x,
            bin_y,
            counts,
        }
    }
}

/// A usable contact weight is finite and positive
pub fn is_valid_norm_value(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Inclusive distance window `[bound1, bound2]` with its running sums
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceWindow {
    pub bound1: usize,
    pub bound2: usize,
    /// Observed weight inside the window
    pub num_sum: f64,
    /// Possible bin pairs inside the window
    pub den_sum: f64,
}

impl DistanceWindow {
    pub fn average(&self) -> f64 {
        self.num_sum / self.den_sum
    }
}

/// Variable-width windows over distance bins, one per distance
///
/// Sparse distances far from the diagonal get wide windows so each average
/// rests on at least [`MIN_VALS_NEEDED`] observations; dense distances keep
/// narrow ones. The window grows only from a cold start, shrinks
/// symmetrically while the floor still holds, and widens by two per step to
/// stay centered. Once `bound2` hits the last distance the floor may no
/// longer be reachable and the window keeps whatever it has.
#[derive(Debug, Clone)]
pub struct AdaptiveWindows<'a> {
    actual: &'a [f64],
    possible: &'a [f64],
    window: DistanceWindow,
    next: usize,
}

impl<'a> AdaptiveWindows<'a> {
    /// Windows over `possible.len()` distances; `actual` must be at least as long
    pub fn new(actual: &'a [f64], possible: &'a [f64]) -> Self {
        let (num_sum, den_sum) = match possible.first() {
            Some(&p) => (actual[0], p),
            None => (0.0, 0.0),
        };
        Self {
            actual,
            possible,
            window: DistanceWindow {
                bound1: 0,
                bound2: 0,
                num_sum,
                den_sum,
            },
            next: 0,
        }
    }
}

impl Iterator for AdaptiveWindows<'_> {
    type Item = DistanceWindow;

    fn next(&mut self) -> Option<DistanceWindow> {
        let len = self.possible.len();
        if self.next >= len {
            return None;
        }
        let (actual, possible) = (self.actual, self.possible);
        let w = &mut self.window;

        if w.num_sum < MIN_VALS_NEEDED {
            while w.num_sum < MIN_VALS_NEEDED && w.bound2 + 1 < len {
                w.bound2 += 1;
                w.num_sum += actual[w.bound2];
                w.den_sum += possible[w.bound2];
            }
        } else if w.bound2 > w.bound1 {
            while w.bound2 > w.bound1
                && w.num_sum - actual[w.bound1] - actual[w.bound2] >= MIN_VALS_NEEDED
            {
                w.num_sum -= actual[w.bound1] + actual[w.bound2];
                w.den_sum -= possible[w.bound1] + possible[w.bound2];
                w.bound1 += 1;
                w.bound2 -= 1;
            }
        }

        let current = *w;

        if w.bound2 + 2 < len {
            w.num_sum += actual[w.bound2 + 1] + actual[w.bound2 + 2];
            w.den_sum += possible[w.bound2 + 1] + possible[w.bound2 + 2];
            w.bound2 += 2;
        } else if w.bound2 + 1 < len {
            w.num_sum += actual[w.bound2 + 1];
            w.den_sum += possible[w.bound2 + 1];
            w.bound2 += 1;
        }

        self.next += 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.possible.len().saturating_sub(self.next);
        (n, Some(n))
    }
}

/// Running sums mutated by ingestion, always updated together
#[derive(Debug)]
struct Tallies {
    /// chromosome index -> total weight observed on it
    chromosome_counts: Vec<f64>,
    /// distance -> genome-wide weight observed at it
    actual_distances: Vec<f64>,
}

/// Accumulates contacts by diagonal distance and derives the expected curve
///
/// Ingestion takes `&self` and is safe to call from any number of threads.
/// [`compute_density`](Self::compute_density) takes `&mut self`, so no
/// ingestion can overlap it.
#[derive(Debug)]
pub struct DensityAccumulator {
    bin_size: u64,
    number_of_bins: usize,
    norm_type: NormalizationType,
    /// chromosome index -> chromosome; `None` for unused slots and "All"
    chromosomes: Vec<Option<Chromosome>>,
    tallies: Mutex<Tallies>,
    max_num_bins: usize,
    possible_distances: Vec<f64>,
    density_avg: Option<LargeDoubleSequence>,
    /// chromosome index -> expected / observed, 0 when undefined
    chr_scale_factors: Vec<f64>,
}

impl DensityAccumulator {
    /// Size all accumulators for `chromosomes` binned at `bin_size` bp
    ///
    /// The "All" chromosome is left out. `number_of_bins` comes from the
    /// longest chromosome and is fixed from here on.
    pub fn new(
        chromosomes: &ChromosomeSet,
        bin_size: u64,
        norm_type: NormalizationType,
    ) -> Result<Self> {
        if bin_size == 0 {
            return Err(ExpectedError::InvalidBinSize(bin_size));
        }

        let table_len = chromosomes.max_index() + 1;
        let mut table: Vec<Option<Chromosome>> = vec![None; table_len];
        let mut max_len = 0u64;
        for chromosome in chromosomes.without_all() {
            max_len = max_len.max(chromosome.length);
            table[chromosome.index] = Some(chromosome.clone());
        }

        let number_of_bins = (max_len / bin_size) as usize + 1;
        log::debug!(
            "Density accumulator: {} chromosome slots, {} distance bins at {} bp",
            table_len,
            number_of_bins,
            bin_size
        );

        Ok(Self {
            bin_size,
            number_of_bins,
            norm_type,
            chromosomes: table,
            tallies: Mutex::new(Tallies {
                chromosome_counts: vec![0.0; table_len],
                actual_distances: vec![0.0; number_of_bins],
            }),
            max_num_bins: 0,
            possible_distances: Vec::new(),
            density_avg: None,
            chr_scale_factors: vec![0.0; table_len],
        })
    }

    /// Record one observation of `weight` between `bin1` and `bin2`
    ///
    /// Non-finite weights, unknown chromosomes and distances beyond the
    /// longest chromosome are ignored. Returns whether the weight was added.
    pub fn add_distance(&self, chr_idx: usize, bin1: u64, bin2: u64, weight: f64) -> bool {
        if !weight.is_finite() {
            return false;
        }
        if !matches!(self.chromosomes.get(chr_idx), Some(Some(_))) {
            return false;
        }
        let dist = bin1.abs_diff(bin2);
        if dist >= self.number_of_bins as u64 {
            return false;
        }

        let mut tallies = self.lock_tallies();
        tallies.chromosome_counts[chr_idx] += weight;
        tallies.actual_distances[dist as usize] += weight;
        true
    }

    /// Record a contact record, skipping it unless its count is finite and positive
    pub fn add_contact(&self, chr_idx: usize, record: &ContactRecord) -> bool {
        if !is_valid_norm_value(record.counts) {
            return false;
        }
        self.add_distance(chr_idx, record.bin_x, record.bin_y, record.counts as f64)
    }

    /// Compute the expected density curve and per-chromosome scale factors
    ///
    /// Only reads the running sums, so calling it again recomputes the same
    /// outputs. Chromosomes with a total count below one are left out.
    pub fn compute_density(&mut self) -> Result<()> {
        let bin_size = self.bin_size;
        let chromosomes = &self.chromosomes;
        let tallies = self.tallies.get_mut().unwrap_or_else(PoisonError::into_inner);
        let counts = &tallies.chromosome_counts;
        let actual = &tallies.actual_distances;

        // chromosome index -> bin count, for chromosomes with data
        let mut n_chr_bins: Vec<Option<usize>> = vec![None; chromosomes.len()];
        let mut max_num_bins = 0usize;
        for (z, chromosome) in chromosomes.iter().enumerate() {
            let Some(chromosome) = chromosome else { continue };
            if counts[z] < 1.0 {
                continue;
            }
            let n = (chromosome.length / bin_size) as usize;
            max_num_bins = max_num_bins.max(n);
            n_chr_bins[z] = Some(n);
        }

        let mut possible = vec![0.0; max_num_bins];
        for n in n_chr_bins.iter().flatten().copied() {
            for (i, slot) in possible.iter_mut().enumerate().take(n) {
                *slot += (n - i) as f64;
            }
        }

        let mut density = LargeDoubleSequence::new(max_num_bins as u64);
        for (ii, window) in AdaptiveWindows::new(actual, &possible).enumerate() {
            density.set(ii as u64, window.average())?;
        }

        density.rolling_median(ROLLING_MEDIAN_RADIUS);

        let mut scale_factors = vec![0.0; chromosomes.len()];
        for (z, n) in n_chr_bins.iter().enumerate() {
            let Some(n) = *n else { continue };
            let mut expected_count = 0.0;
            for d in 0..n.min(max_num_bins) {
                expected_count += (n - d) as f64 * density.get(d as u64)?;
            }
            scale_factors[z] = expected_count / counts[z];
        }

        let dropped = n_chr_bins
            .iter()
            .zip(&scale_factors)
            .filter(|(n, f)| n.is_some() && !(**f > 0.0))
            .count();
        if dropped > 0 {
            log::warn!("{} chromosome(s) have no positive scale factor", dropped);
        }
        log::debug!(
            "Expected density over {} distance bins ({} {})",
            max_num_bins,
            self.norm_type,
            bin_size
        );

        self.max_num_bins = max_num_bins;
        self.possible_distances = possible;
        self.density_avg = Some(density);
        self.chr_scale_factors = scale_factors;
        Ok(())
    }

    /// chromosome index -> scale factor, only for factors `> 0`
    pub fn chr_scale_factors(&self) -> HashMap<usize, f64> {
        self.chr_scale_factors
            .iter()
            .enumerate()
            .filter(|(_, f)| **f > 0.0)
            .map(|(z, f)| (z, *f))
            .collect()
    }

    /// Compute the density and wrap it as a queryable expected-value function
    pub fn expected_function(&mut self) -> Result<ExpectedValueFunction> {
        self.compute_density()?;
        let density = self
            .density_avg
            .clone()
            .unwrap_or_else(|| LargeDoubleSequence::new(0));
        Ok(ExpectedValueFunction::new(
            self.norm_type,
            HicUnit::Bp,
            self.bin_size,
            density,
            self.chr_scale_factors(),
        ))
    }

    pub fn norm_type(&self) -> NormalizationType {
        self.norm_type
    }

    pub fn bin_size(&self) -> u64 {
        self.bin_size
    }

    /// Size of the distance accumulator, fixed at construction
    pub fn number_of_bins(&self) -> usize {
        self.number_of_bins
    }

    /// Largest bin count among chromosomes with data (after compute)
    pub fn max_num_bins(&self) -> usize {
        self.max_num_bins
    }

    /// Total weight observed on a chromosome
    pub fn chromosome_count(&self, chr_idx: usize) -> Option<f64> {
        self.lock_tallies().chromosome_counts.get(chr_idx).copied()
    }

    /// Snapshot of the per-distance observed weights
    pub fn actual_distances(&self) -> Vec<f64> {
        self.lock_tallies().actual_distances.clone()
    }

    /// Per-distance count of possible bin pairs (empty before compute)
    pub fn possible_distances(&self) -> &[f64] {
        &self.possible_distances
    }

    /// Smoothed expected curve (after compute)
    pub fn density(&self) -> Option<&LargeDoubleSequence> {
        self.density_avg.as_ref()
    }

    fn lock_tallies(&self) -> MutexGuard<'_, Tallies> {
        self.tallies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
