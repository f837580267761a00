//! File format adapters
//!
//! Contact list ingestion and TSV reports of the computed expected function.

pub mod contacts;
pub mod report;

pub use contacts::{accumulate_contacts, ContactLineView, IngestStats};
pub use report::{write_expected_tsv, write_scale_factors_tsv};
