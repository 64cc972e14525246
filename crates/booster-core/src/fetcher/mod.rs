//! Chunk fetching: the per-range fetch contract and the curl implementer.

mod curl;

pub use curl::CurlChunkFetcher;

use crate::error::{ChunkError, DownloadError};
use crate::planner::ByteRange;

/// One fetched range and its bytes, held by the coordinator until the merge.
#[derive(Debug)]
pub struct ChunkResult {
    pub range: ByteRange,
    pub data: Vec<u8>,
}

impl ChunkResult {
    /// True when the body length matches the range it was fetched for.
    /// Checked before reassembly; a mismatch fails the job.
    pub fn length_matches(&self) -> bool {
        self.data.len() as u64 == self.range.len()
    }
}

/// A single-use unit of work: one configured range, one execution, one
/// retrievable result.
///
/// Implementations hold no state shared with other instances, so the
/// coordinator can run many of them on independent threads without locks at
/// this layer. Concurrency is supplied externally (the coordinator spawns
/// the threads); implementers stay plain value types.
pub trait ChunkFetcher: Send {
    /// Binds the fetch target and inclusive byte range. Discards any
    /// previously fetched result.
    fn configure(&mut self, url: &str, range: ByteRange);

    /// Fetches exactly the configured range and stores the bytes internally.
    fn execute(&mut self) -> Result<(), ChunkError>;

    /// Moves the fetched bytes out. Fails with `NotReady` until `execute`
    /// has completed successfully; a second call also fails, since the
    /// result has been handed off.
    fn chunk_data(&mut self) -> Result<Vec<u8>, DownloadError>;
}
