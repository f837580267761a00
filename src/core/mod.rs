//! Core expected-density functionality
//!
//! This module contains the distance accumulator, the chunked sequence it
//! stores its curve in, chromosome metadata, and input helpers.

mod chromosome;
mod density;
mod error;
mod expected;
pub mod io;
mod sequence;

pub use chromosome::{parse_chrom_sizes, Chromosome, ChromosomeSet, ALL_CHROMOSOME_NAME};
pub use density::{
    is_valid_norm_value, AdaptiveWindows, ContactRecord, DensityAccumulator, DistanceWindow,
    NormalizationType, MIN_VALS_NEEDED, ROLLING_MEDIAN_RADIUS,
};
pub use error::{
    ChromSizesError, ChromSizesResult, ContactParseError, ContactResult, ExpectedError, Result,
    SequenceError, SequenceResult,
};
pub use expected::{ExpectedValueFunction, HicUnit};
pub use io::{detect_compression, open_text, ByteLineIterator, CompressionFormat};
pub use sequence::{LargeDoubleSequence, DEFAULT_CHUNK_LEN};
