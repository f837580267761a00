//! Chunked sequence of `f64` values addressed by `u64`
//!
//! Genome-scale bin counts at fine resolution can run into the billions, so
//! values live in fixed-size chunks instead of one contiguous allocation.

use crate::core::error::{SequenceError, SequenceResult};
use std::cmp::Ordering;

/// Default number of values per chunk (64M values, 512MB)
pub const DEFAULT_CHUNK_LEN: u64 = 1 << 26;

/// Index-addressable sequence of doubles sized by a 64-bit length
#[derive(Debug, Clone, PartialEq)]
pub struct LargeDoubleSequence {
    chunks: Vec<Vec<f64>>,
    len: u64,
    chunk_len: u64,
}

impl LargeDoubleSequence {
    /// Create a zero-filled sequence of `len` values
    pub fn new(len: u64) -> Self {
        Self::with_chunk_len(len, DEFAULT_CHUNK_LEN)
    }

    /// Create a zero-filled sequence with a custom chunk length
    ///
    /// A chunk length of zero is treated as one.
    pub fn with_chunk_len(len: u64, chunk_len: u64) -> Self {
        let chunk_len = chunk_len.max(1);
        let mut chunks = Vec::with_capacity(len.div_ceil(chunk_len) as usize);
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(chunk_len);
            chunks.push(vec![0.0; n as usize]);
            remaining -= n;
        }
        Self {
            chunks,
            len,
            chunk_len,
        }
    }

    /// Build a sequence holding `values`
    pub fn from_values(values: Vec<f64>) -> Self {
        let len = values.len() as u64;
        if len <= DEFAULT_CHUNK_LEN {
            let chunks = if values.is_empty() { Vec::new() } else { vec![values] };
            return Self {
                chunks,
                len,
                chunk_len: DEFAULT_CHUNK_LEN,
            };
        }
        let chunks = values
            .chunks(DEFAULT_CHUNK_LEN as usize)
            .map(|c| c.to_vec())
            .collect();
        Self {
            chunks,
            len,
            chunk_len: DEFAULT_CHUNK_LEN,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of backing chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Get the value at `index`
    pub fn get(&self, index: u64) -> SequenceResult<f64> {
        self.check(index)?;
        Ok(self.value(index))
    }

    /// Set the value at `index`
    pub fn set(&mut self, index: u64, value: f64) -> SequenceResult<()> {
        self.check(index)?;
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk][offset] = value;
        Ok(())
    }

    /// Last value, if any
    pub fn last(&self) -> Option<f64> {
        self.chunks.last().and_then(|c| c.last()).copied()
    }

    /// Iterate over all values in index order
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.chunks.iter().flat_map(|c| c.iter().copied())
    }

    /// Replace every value with the median of `[i - radius, i + radius]`
    ///
    /// Windows are clipped at both ends of the sequence, so they get narrower
    /// near the edges. Every median is taken over the values as they were
    /// before the call; results go to a fresh buffer that replaces `self`.
    pub fn rolling_median(&mut self, radius: u64) {
        if self.len == 0 {
            return;
        }

        let mut smoothed = Self::with_chunk_len(self.len, self.chunk_len);
        let width = radius.saturating_mul(2).saturating_add(1).min(self.len);
        let mut window: Vec<f64> = Vec::with_capacity(width as usize);
        // window holds the sorted values of [lo, hi)
        let mut lo = 0u64;
        let mut hi = 0u64;

        for i in 0..self.len {
            let want_hi = i.saturating_add(radius).saturating_add(1).min(self.len);
            while hi < want_hi {
                insert_sorted(&mut window, self.value(hi));
                hi += 1;
            }
            let want_lo = i.saturating_sub(radius);
            while lo < want_lo {
                remove_sorted(&mut window, self.value(lo));
                lo += 1;
            }
            let (chunk, offset) = smoothed.locate(i);
            smoothed.chunks[chunk][offset] = median_of_sorted(&window);
        }

        *self = smoothed;
    }

    fn check(&self, index: u64) -> SequenceResult<()> {
        if index >= self.len {
            return Err(SequenceError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    #[inline]
    fn locate(&self, index: u64) -> (usize, usize) {
        (
            (index / self.chunk_len) as usize,
            (index % self.chunk_len) as usize,
        )
    }

    #[inline]
    fn value(&self, index: u64) -> f64 {
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk][offset]
    }
}

fn insert_sorted(window: &mut Vec<f64>, value: f64) {
    let pos = window.partition_point(|v| v.total_cmp(&value) == Ordering::Less);
    window.insert(pos, value);
}

fn remove_sorted(window: &mut Vec<f64>, value: f64) {
    if let Ok(pos) = window.binary_search_by(|v| v.total_cmp(&value)) {
        window.remove(pos);
    }
}

/// Median of an already sorted, non-empty slice
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
