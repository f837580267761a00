//! Chromosome metadata
//!
//! A [`ChromosomeSet`] is the genome the accumulator is sized from. Index 0
//! is conventionally the synthetic "All" chromosome, which never takes part
//! in distance accumulation.

use crate::core::error::{ChromSizesError, ChromSizesResult};
use crate::core::io::{open_text, ByteLineIterator};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Name of the whole-genome pseudo chromosome
pub const ALL_CHROMOSOME_NAME: &str = "All";

/// A chromosome with its position in the genome table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chromosome {
    pub index: usize,
    pub name: String,
    /// Length in base pairs
    pub length: u64,
}

impl Chromosome {
    pub fn new(index: usize, name: impl Into<String>, length: u64) -> Self {
        Self {
            index,
            name: name.into(),
            length,
        }
    }

    /// Whether this is the whole-genome marker
    pub fn is_all(&self) -> bool {
        self.name.eq_ignore_ascii_case(ALL_CHROMOSOME_NAME)
    }
}

/// Ordered set of chromosomes, addressable by index and by name
#[derive(Debug, Clone, Default)]
pub struct ChromosomeSet {
    chromosomes: Vec<Chromosome>,
    /// Normalized name -> position in `chromosomes`
    by_name: HashMap<String, usize>,
}

impl ChromosomeSet {
    /// Build a set from chromosomes carrying their own indices
    pub fn new(chromosomes: Vec<Chromosome>) -> Self {
        let by_name = chromosomes
            .iter()
            .enumerate()
            .map(|(pos, c)| (normalize_chrom_key(&c.name), pos))
            .collect();
        Self {
            chromosomes,
            by_name,
        }
    }

    /// Build a set from `(name, length)` pairs
    ///
    /// Index 0 is the "All" chromosome spanning the whole genome; the listed
    /// chromosomes get indices 1.. in input order.
    pub fn from_sizes<I, S>(sizes: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut chromosomes = vec![Chromosome::new(0, ALL_CHROMOSOME_NAME, 0)];
        for (name, length) in sizes {
            let index = chromosomes.len();
            chromosomes.push(Chromosome::new(index, name, length));
        }
        chromosomes[0].length = chromosomes[1..].iter().map(|c| c.length).sum();
        Self::new(chromosomes)
    }

    /// Read a two-column chrom.sizes file (plain, gzip or bzip2)
    pub fn from_chrom_sizes_file<P: AsRef<Path>>(path: P) -> ChromSizesResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ChromSizesError::FileNotFound(path.to_path_buf()));
        }
        parse_chrom_sizes(open_text(path)?)
    }

    /// Largest chromosome index, 0 for an empty set
    pub fn max_index(&self) -> usize {
        self.chromosomes.iter().map(|c| c.index).max().unwrap_or(0)
    }

    /// All chromosomes, including the "All" marker
    pub fn iter(&self) -> impl Iterator<Item = &Chromosome> {
        self.chromosomes.iter()
    }

    /// Real chromosomes only
    pub fn without_all(&self) -> impl Iterator<Item = &Chromosome> {
        self.chromosomes.iter().filter(|c| !c.is_all())
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Look up a chromosome by its index
    pub fn get(&self, index: usize) -> Option<&Chromosome> {
        self.chromosomes.iter().find(|c| c.index == index)
    }

    /// Look up a chromosome by name, accepting `chr1`, `1` and `CHR1` alike
    pub fn by_name(&self, name: &str) -> Option<&Chromosome> {
        self.by_name
            .get(&normalize_chrom_key(name))
            .map(|&pos| &self.chromosomes[pos])
    }
}

/// Parse chrom.sizes content: `name <ws> length`, extra columns ignored
pub fn parse_chrom_sizes<R: BufRead>(reader: R) -> ChromSizesResult<ChromosomeSet> {
    let mut sizes: Vec<(String, u64)> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut lines = ByteLineIterator::new(reader);
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        let text = String::from_utf8_lossy(line);
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut fields = text.split_whitespace();
        let (name, length) = match (fields.next(), fields.next()) {
            (Some(name), Some(length)) => (name, length),
            _ => {
                return Err(ChromSizesError::InvalidLine {
                    line: line_number,
                    message: "expected '<name> <length>'".to_string(),
                })
            }
        };
        let length: u64 = length.parse().map_err(|_| ChromSizesError::InvalidLength {
            line: line_number,
            value: length.to_string(),
        })?;

        if name.eq_ignore_ascii_case(ALL_CHROMOSOME_NAME) {
            log::debug!("Ignoring explicit '{}' entry at line {}", name, line_number);
            continue;
        }
        if seen.insert(normalize_chrom_key(name), line_number).is_some() {
            return Err(ChromSizesError::Duplicate {
                line: line_number,
                name: name.to_string(),
            });
        }
        sizes.push((name.to_string(), length));
    }

    log::debug!("Loaded {} chromosomes", sizes.len());
    Ok(ChromosomeSet::from_sizes(sizes))
}

/// Normalize chromosome name for flexible matching
///
/// Converts to lowercase and removes the `chr` prefix.
fn normalize_chrom_key(chrom: &str) -> String {
    let lower = chrom.to_lowercase();
    match lower.strip_prefix("chr") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}
