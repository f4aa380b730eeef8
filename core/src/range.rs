use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// An inclusive byte range, `start..=end`, matching the `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// Create a new range, `end` is inclusive.
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end < start {
            return Err(Error::invalid_input(format!(
                "invalid byte range {start}-{end}: end is before start"
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a range covering `len` bytes from `offset`.
    pub fn from_offset(offset: u64, len: u64) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid_input("byte range must not be empty"));
        }
        let end = offset.checked_add(len - 1).ok_or_else(|| {
            Error::invalid_input(format!(
                "byte range of {len} bytes from {offset} is past the largest offset"
            ))
        })?;
        Self::new(offset, end)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered by this range, saturating at `u64::MAX`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Format as a `Range`/`x-ms-range` header value.
    pub fn to_header(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes={}-{}", self.start, self.end)
    }
}

impl FromStr for ByteRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::invalid_input(format!("invalid byte range {s:?}"));

        let v = s.strip_prefix("bytes=").unwrap_or(s);
        let (start, end) = v.split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse::<u64>().map_err(|_| invalid())?;
        let end = end.trim().parse::<u64>().map_err(|_| invalid())?;
        Self::new(start, end)
    }
}

/// Split `total` bytes into consecutive ranges of `chunk_size` bytes.
///
/// The last range is truncated to the end of the content. Empty content
/// yields no ranges.
pub fn plan_ranges(total: u64, chunk_size: u64) -> Result<Vec<ByteRange>> {
    if chunk_size == 0 {
        return Err(Error::invalid_input("chunk size must be greater than zero"));
    }

    let mut ranges = Vec::with_capacity(total.div_ceil(chunk_size) as usize);
    let mut start = 0;
    while start < total {
        let end = (start + chunk_size).min(total) - 1;
        ranges.push(ByteRange { start, end });
        start = end + 1;
    }
    Ok(ranges)
}
