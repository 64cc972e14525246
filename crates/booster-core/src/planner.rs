//! Byte-range math: partitioning a content length into fetch tasks.
//!
//! The produced ranges are disjoint, ascending, and cover `[0, len-1]`
//! exactly. The coordinator reassembles strictly in this order, so the
//! ordering here is load-bearing.

use crate::error::DownloadError;

/// One contiguous byte range of the target resource, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset covered.
    pub start: u64,
    /// Last byte offset covered.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for curl's range option: `start-end` (inclusive, no `bytes=` prefix).
    pub fn range_value(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Splits `content_length` into `chunk_count` ranges, as even as possible.
///
/// Leading ranges absorb the remainder one byte each, so sizes differ by at
/// most one. A count larger than the length clamps to one-byte ranges.
pub fn plan_by_count(
    content_length: u64,
    chunk_count: u64,
) -> Result<Vec<ByteRange>, DownloadError> {
    if content_length == 0 {
        return Err(DownloadError::InvalidConfig(
            "content length is 0; nothing to download".to_string(),
        ));
    }
    if chunk_count == 0 {
        return Err(DownloadError::InvalidConfig(
            "chunk count must be >= 1".to_string(),
        ));
    }

    let count = chunk_count.min(content_length);
    let base = content_length / count;
    let remainder = content_length % count;

    let mut out = Vec::with_capacity(count as usize);
    let mut offset = 0u64;
    for i in 0..count {
        let len = base + u64::from(i < remainder);
        out.push(ByteRange {
            start: offset,
            end: offset + len - 1,
        });
        offset += len;
    }
    Ok(out)
}

/// Splits `content_length` into ranges of `chunk_size` bytes each, the last
/// truncated to the remainder.
pub fn plan_by_size(content_length: u64, chunk_size: u64) -> Result<Vec<ByteRange>, DownloadError> {
    if content_length == 0 {
        return Err(DownloadError::InvalidConfig(
            "content length is 0; nothing to download".to_string(),
        ));
    }
    if chunk_size == 0 {
        return Err(DownloadError::InvalidConfig(
            "chunk size must be >= 1".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(content_length.div_ceil(chunk_size) as usize);
    let mut offset = 0u64;
    while offset < content_length {
        let end = (offset + chunk_size).min(content_length) - 1;
        out.push(ByteRange { start: offset, end });
        offset = end + 1;
    }
    Ok(out)
}
