//! Error types for FastExpected
//!
//! Defines all error types used throughout the library. Input-data anomalies
//! (NaN weights, unknown chromosomes) are filtered where they occur and never
//! show up here; these types cover structural misuse and I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for FastExpected operations
#[derive(Debug, Error)]
pub enum ExpectedError {
    /// Bin size must be positive
    #[error("Invalid bin size: {0} (must be > 0)")]
    InvalidBinSize(u64),

    /// Sequence access errors
    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// Chromosome sizes parsing errors
    #[error("Chromosome sizes error: {0}")]
    ChromSizes(#[from] ChromSizesError),

    /// Contact list parsing errors
    #[error("Contact parse error: {0}")]
    Contacts(#[from] ContactParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`LargeDoubleSequence`](crate::core::LargeDoubleSequence)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Index outside `[0, len)`
    #[error("Index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: u64, len: u64 },
}

/// Errors that can occur while reading a chrom.sizes file
#[derive(Debug, Error)]
pub enum ChromSizesError {
    /// Line does not have a name and a length
    #[error("Invalid chrom.sizes line {line}: {message}")]
    InvalidLine { line: usize, message: String },

    /// Length column is not an integer
    #[error("Invalid chromosome length '{value}' at line {line}")]
    InvalidLength { line: usize, value: String },

    /// Same chromosome listed twice
    #[error("Duplicate chromosome '{name}' at line {line}")]
    Duplicate { line: usize, name: String },

    /// File not found
    #[error("Chromosome sizes file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while parsing a contact list
#[derive(Debug, Error)]
pub enum ContactParseError {
    /// Empty line
    #[error("Empty line")]
    EmptyLine,

    /// Too few fields
    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// Field is not valid UTF-8
    #[error("Invalid UTF-8 in field '{0}'")]
    InvalidUtf8(&'static str),

    /// Numeric field could not be parsed
    #[error("Invalid number in field '{0}': {1}")]
    InvalidNumber(&'static str, String),

    /// File not found
    #[error("Contact file not found: {0}")]
    FileNotFound(PathBuf),

    /// Worker pool could not be created
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FastExpected operations
pub type Result<T> = std::result::Result<T, ExpectedError>;

/// Result type alias for sequence access
pub type SequenceResult<T> = std::result::Result<T, SequenceError>;

/// Result type alias for chrom.sizes parsing
pub type ChromSizesResult<T> = std::result::Result<T, ChromSizesError>;

/// Result type alias for contact parsing
pub type ContactResult<T> = std::result::Result<T, ContactParseError>;
