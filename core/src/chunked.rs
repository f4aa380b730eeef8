//! Chunked transfers: split content into byte ranges and move them with
//! bounded parallelism.

use std::future::Future;

use bytes::{Bytes, BytesMut};
use futures::{future, stream, StreamExt, TryStreamExt};
use log::debug;

use crate::range::plan_ranges;
use crate::{ByteRange, Error, Result};

const MIB: u64 = 1024 * 1024;

/// Chunk size and parallelism of a chunked transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    chunk_size: u64,
    parallelism: usize,
}

impl Default for TransferOptions {
    /// 4 MiB chunks, 4 in flight.
    fn default() -> Self {
        Self {
            chunk_size: 4 * MIB,
            parallelism: 4,
        }
    }
}

impl TransferOptions {
    /// Create options from a chunk size in MiB.
    pub fn new(chunk_size_mb: u64, parallelism: usize) -> Result<Self> {
        Self::default()
            .with_chunk_size(chunk_size_mb.saturating_mul(MIB))
            .and_then(|o| o.with_parallelism(parallelism))
    }

    /// Set the chunk size in bytes.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid_input("chunk size must be greater than zero"));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// Set how many ranges may be in flight at once.
    pub fn with_parallelism(mut self, parallelism: usize) -> Result<Self> {
        if parallelism == 0 {
            return Err(Error::invalid_input("parallelism must be greater than zero"));
        }
        self.parallelism = parallelism;
        Ok(self)
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Split `total` bytes into ranges of `chunk_size`.
    pub fn plan(&self, total: u64) -> Result<Vec<ByteRange>> {
        plan_ranges(total, self.chunk_size)
    }
}

/// Run `upload` once per range, at most `parallelism` at a time.
///
/// The first error is returned and the remaining ranges are not started.
/// Ranges that already finished are left in place.
pub async fn upload_ranges<F, Fut>(
    ranges: Vec<ByteRange>,
    parallelism: usize,
    upload: F,
) -> Result<()>
where
    F: Fn(ByteRange) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let total = ranges.len();
    stream::iter(ranges.into_iter().enumerate().map(|(idx, range)| {
        debug!("uploading range {range} ({}/{total})", idx + 1);
        upload(range)
    }))
    .buffer_unordered(parallelism.max(1))
    .try_for_each(|_| future::ready(Ok(())))
    .await
}

/// Run `download` once per range and assemble `total` bytes.
///
/// Each range is written at its own offset, so the output does not depend
/// on completion order. The first error is returned.
pub async fn download_ranges<F, Fut>(
    total: u64,
    ranges: Vec<ByteRange>,
    parallelism: usize,
    download: F,
) -> Result<Bytes>
where
    F: Fn(ByteRange) -> Fut,
    Fut: Future<Output = Result<Bytes>>,
{
    let mut buf = BytesMut::zeroed(total as usize);

    let mut chunks = stream::iter(ranges.into_iter().map(|range| {
        debug!("downloading range {range}");
        let fut = download(range);
        async move { fut.await.map(|bs| (range, bs)) }
    }))
    .buffer_unordered(parallelism.max(1));

    while let Some((range, bs)) = chunks.try_next().await? {
        if range.end() >= total || bs.len() as u64 != range.len() {
            return Err(Error::unexpected(format!(
                "range {range} returned {} bytes, expected {} within {total}",
                bs.len(),
                range.len()
            )));
        }
        buf[range.start() as usize..=range.end() as usize].copy_from_slice(&bs);
    }

    Ok(buf.freeze())
}
