//! Queryable expected-value function
//!
//! Wraps a computed density curve together with the per-chromosome scale
//! factors it was derived with.

use crate::core::density::NormalizationType;
use crate::core::sequence::LargeDoubleSequence;
use std::collections::HashMap;
use std::fmt;

/// Resolution unit of a contact map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HicUnit {
    /// Base pairs
    Bp,
    /// Restriction fragments
    Frag,
}

impl fmt::Display for HicUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HicUnit::Bp => f.write_str("BP"),
            HicUnit::Frag => f.write_str("FRAG"),
        }
    }
}

/// Expected count for a `(chromosome, distance)` pair
#[derive(Debug, Clone)]
pub struct ExpectedValueFunction {
    norm_type: NormalizationType,
    unit: HicUnit,
    bin_size: u64,
    density: LargeDoubleSequence,
    norm_factors: HashMap<usize, f64>,
}

impl ExpectedValueFunction {
    pub fn new(
        norm_type: NormalizationType,
        unit: HicUnit,
        bin_size: u64,
        density: LargeDoubleSequence,
        norm_factors: HashMap<usize, f64>,
    ) -> Self {
        Self {
            norm_type,
            unit,
            bin_size,
            density,
            norm_factors,
        }
    }

    /// Expected value at `distance` bins on chromosome `chr_idx`
    ///
    /// Distances past the end of the curve use its last value. The curve is
    /// divided by the chromosome's scale factor (1 when it has none), so the
    /// expected total over a chromosome matches its observed total.
    /// Returns `None` only for an empty curve.
    pub fn expected_value(&self, chr_idx: usize, distance: u64) -> Option<f64> {
        let len = self.density.len();
        if len == 0 {
            return None;
        }
        let value = self.density.get(distance.min(len - 1)).ok()?;
        Some(value / self.norm_factor(chr_idx))
    }

    /// The whole curve scaled for one chromosome
    pub fn expected_values_for(&self, chr_idx: usize) -> Vec<f64> {
        let factor = self.norm_factor(chr_idx);
        self.density.iter().map(|v| v / factor).collect()
    }

    /// Scale factor for a chromosome, 1 when it has none
    pub fn norm_factor(&self, chr_idx: usize) -> f64 {
        self.norm_factors.get(&chr_idx).copied().unwrap_or(1.0)
    }

    /// Number of distances covered by the curve
    pub fn len(&self) -> u64 {
        self.density.len()
    }

    pub fn is_empty(&self) -> bool {
        self.density.is_empty()
    }

    pub fn norm_type(&self) -> NormalizationType {
        self.norm_type
    }

    pub fn unit(&self) -> HicUnit {
        self.unit
    }

    pub fn bin_size(&self) -> u64 {
        self.bin_size
    }

    pub fn norm_factors(&self) -> &HashMap<usize, f64> {
        &self.norm_factors
    }

    pub fn density(&self) -> &LargeDoubleSequence {
        &self.density
    }
}
