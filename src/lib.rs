//! FastExpected - genome-wide expected contact density for Hi-C
//!
//! Accumulates contacts by distance from the diagonal, smooths the
//! observed / possible ratio into an expected curve, and derives
//! per-chromosome scale factors so expected totals match observed totals.
//!
//! # Features
//!
//! - Lock-protected accumulation, safe under parallel ingestion
//! - Adaptive windowed average with a 400-count sparsity floor
//! - Rolling-median smoothing over a chunked `u64`-indexed sequence
//! - Plain, gzip and bzip2 contact lists
//!
//! # Example
//!
//! ```ignore
//! use fast_expected::{ChromosomeSet, DensityAccumulator, NormalizationType};
//!
//! let genome = ChromosomeSet::from_sizes(vec![("chr1", 248_956_422)]);
//! let mut acc = DensityAccumulator::new(&genome, 10_000, NormalizationType::None)?;
//! acc.add_distance(1, 120, 135, 4.0);
//!
//! let expected = acc.expected_function()?;
//! let value = expected.expected_value(1, 15);
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    Chromosome, ChromosomeSet, ContactRecord, DensityAccumulator, ExpectedError,
    ExpectedValueFunction, HicUnit, LargeDoubleSequence, NormalizationType, SequenceError,
};
pub use formats::{accumulate_contacts, IngestStats};
