//! Binned contact list adapter
//!
//! Reads whitespace separated `chrom binX binY [count]` lines and feeds them
//! into a [`DensityAccumulator`]. A missing count means one contact.

use crate::core::{
    open_text, ByteLineIterator, ChromosomeSet, ContactParseError, ContactRecord, ContactResult,
    DensityAccumulator,
};
use memchr::memchr2;
use rayon::prelude::*;
use std::ops::AddAssign;
use std::path::Path;
use std::str::FromStr;

/// Lines handed to the pool at once
const BATCH_SIZE: usize = 200_000;

/// Lines per rayon task
const CHUNK_SIZE: usize = 10_000;

/// Zero-copy view of one contact line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactLineView<'a> {
    pub chrom: &'a str,
    pub bin_x: u64,
    pub bin_y: u64,
    pub counts: f32,
}

impl<'a> ContactLineView<'a> {
    /// Parse a contact line; runs of tabs or spaces separate fields
    pub fn parse(line: &'a [u8]) -> ContactResult<Self> {
        if line.is_empty() {
            return Err(ContactParseError::EmptyLine);
        }

        let mut fields: [&[u8]; 4] = [&[]; 4];
        let mut found = 0;
        let mut pos = 0;
        while pos < line.len() && found < fields.len() {
            let end = memchr2(b'\t', b' ', &line[pos..]).map_or(line.len(), |i| pos + i);
            if end > pos {
                fields[found] = &line[pos..end];
                found += 1;
            }
            pos = end + 1;
        }

        if found < 3 {
            return Err(ContactParseError::TooFewFields { expected: 3, found });
        }

        let chrom =
            std::str::from_utf8(fields[0]).map_err(|_| ContactParseError::InvalidUtf8("chrom"))?;
        let bin_x: u64 = parse_field(fields[1], "binX")?;
        let bin_y: u64 = parse_field(fields[2], "binY")?;
        let counts: f32 = if found > 3 {
            parse_field(fields[3], "count")?
        } else {
            1.0
        };

        Ok(Self {
            chrom,
            bin_x,
            bin_y,
            counts,
        })
    }

    pub fn record(&self) -> ContactRecord {
        ContactRecord::new(self.bin_x, self.bin_y, self.counts)
    }
}

fn parse_field<T: FromStr>(field: &[u8], name: &'static str) -> ContactResult<T> {
    let text = std::str::from_utf8(field).map_err(|_| ContactParseError::InvalidUtf8(name))?;
    text.parse()
        .map_err(|_| ContactParseError::InvalidNumber(name, text.to_string()))
}

/// Ingestion statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Data lines seen (comments and blank lines excluded)
    pub total: usize,
    /// Contacts added to the accumulator
    pub accepted: usize,
    /// Chromosome name not in the genome
    pub unknown_chrom: usize,
    /// Rejected by the accumulator (bad weight, distance out of range)
    pub filtered: usize,
    /// Could not be parsed
    pub malformed: usize,
}

impl AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.accepted += other.accepted;
        self.unknown_chrom += other.unknown_chrom;
        self.filtered += other.filtered;
        self.malformed += other.malformed;
    }
}

fn is_skippable(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace) || line.first() == Some(&b'#')
}

/// Parse one data line and hand it to the accumulator
fn ingest_line(
    line: &[u8],
    chromosomes: &ChromosomeSet,
    accumulator: &DensityAccumulator,
    stats: &mut IngestStats,
) {
    stats.total += 1;
    let view = match ContactLineView::parse(line) {
        Ok(view) => view,
        Err(e) => {
            log::trace!("Skipping malformed contact line: {}", e);
            stats.malformed += 1;
            return;
        }
    };
    let Some(chromosome) = chromosomes.by_name(view.chrom) else {
        stats.unknown_chrom += 1;
        return;
    };
    if accumulator.add_contact(chromosome.index, &view.record()) {
        stats.accepted += 1;
    } else {
        stats.filtered += 1;
    }
}

/// Accumulate every contact in `input` (plain, gzip or bzip2)
///
/// # Arguments
/// * `input` - Contact list path
/// * `chromosomes` - Genome used to resolve chromosome names
/// * `accumulator` - Target accumulator
/// * `threads` - Worker threads (1 = sequential)
pub fn accumulate_contacts<P: AsRef<Path>>(
    input: P,
    chromosomes: &ChromosomeSet,
    accumulator: &DensityAccumulator,
    threads: usize,
) -> ContactResult<IngestStats> {
    let input = input.as_ref();
    if !input.exists() {
        return Err(ContactParseError::FileNotFound(input.to_path_buf()));
    }

    let stats = if threads > 1 {
        accumulate_parallel(input, chromosomes, accumulator, threads)?
    } else {
        accumulate_sequential(input, chromosomes, accumulator)?
    };

    log::info!(
        "Accumulated {} of {} contacts ({} unknown chromosome, {} filtered, {} malformed)",
        stats.accepted,
        stats.total,
        stats.unknown_chrom,
        stats.filtered,
        stats.malformed
    );
    Ok(stats)
}

fn accumulate_sequential(
    input: &Path,
    chromosomes: &ChromosomeSet,
    accumulator: &DensityAccumulator,
) -> ContactResult<IngestStats> {
    let mut lines = ByteLineIterator::new(open_text(input)?);
    let mut stats = IngestStats::default();

    while let Some(line) = lines.next_line() {
        let line = line?;
        if is_skippable(line) {
            continue;
        }
        ingest_line(line, chromosomes, accumulator, &mut stats);
    }

    Ok(stats)
}

/// Parallel ingestion using rayon
///
/// Lines are read in batches so memory stays bounded on large inputs; each
/// batch is split into chunks that workers feed into the shared accumulator.
fn accumulate_parallel(
    input: &Path,
    chromosomes: &ChromosomeSet,
    accumulator: &DensityAccumulator,
    threads: usize,
) -> ContactResult<IngestStats> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ContactParseError::ThreadPool(e.to_string()))?;

    let mut lines = ByteLineIterator::new(open_text(input)?);
    let mut stats = IngestStats::default();
    let mut batch: Vec<Vec<u8>> = Vec::with_capacity(BATCH_SIZE);
    let mut eof = false;

    while !eof {
        batch.clear();
        while batch.len() < BATCH_SIZE {
            match lines.next_line() {
                Some(line) => {
                    let line = line?;
                    if !is_skippable(line) {
                        batch.push(line.to_vec());
                    }
                }
                None => {
                    eof = true;
                    break;
                }
            }
        }

        let batch_stats = pool.install(|| {
            batch
                .par_chunks(CHUNK_SIZE)
                .map(|chunk| {
                    let mut local = IngestStats::default();
                    for line in chunk {
                        ingest_line(line, chromosomes, accumulator, &mut local);
                    }
                    local
                })
                .reduce(IngestStats::default, |mut a, b| {
                    a += b;
                    a
                })
        });
        stats += batch_stats;
    }

    Ok(stats)
}
