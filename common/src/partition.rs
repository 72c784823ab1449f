//! Splitting a file into contiguous byte ranges
//!
//! Boundaries are proportional: boundary `k` of `n` sits at `floor(k / n * file_size)`. The last
//! boundary is pinned to `file_size` so floating point drift can never leave a tail uncovered.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("number of parts must be at least 1, got {0}")]
    InvalidPartCount(usize),
}

/// Half-open byte range `[start, end)` of the source file copied by a single worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Partition {
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "part {} [{}, {})", self.index, self.start, self.end)
    }
}

fn boundary(k: usize, parts: usize, file_size: u64) -> u64 {
    if k >= parts {
        return file_size;
    }
    let offset = (k as f64 / parts as f64 * file_size as f64) as u64;
    offset.min(file_size)
}

/// Computes `parts` contiguous partitions covering `[0, file_size)`.
///
/// Partition lengths differ by at most the rounding introduced by proportional division. When
/// `parts` exceeds `file_size` some partitions are empty.
pub fn plan(file_size: u64, parts: usize) -> Result<Vec<Partition>, Error> {
    if parts == 0 {
        return Err(Error::InvalidPartCount(parts));
    }
    let partitions = (0..parts)
        .map(|index| Partition {
            index,
            start: boundary(index, parts, file_size),
            end: boundary(index + 1, parts, file_size),
        })
        .collect();
    Ok(partitions)
}
