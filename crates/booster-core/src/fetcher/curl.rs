//! Curl-backed chunk fetcher: one easy handle per range, body buffered in
//! memory.

use std::time::Duration;

use crate::control::CancelToken;
use crate::error::{ChunkError, DownloadError};
use crate::planner::ByteRange;

use super::ChunkFetcher;

/// Upper bound on the buffer preallocation, so a huge range does not reserve
/// the whole allocation up front.
const PREALLOC_CAP: u64 = 16 * 1024 * 1024;

/// Fetches one byte range over HTTP and keeps the body in memory until the
/// coordinator collects it.
#[derive(Debug, Default)]
pub struct CurlChunkFetcher {
    target: Option<(String, ByteRange)>,
    data: Option<Vec<u8>>,
    cancel: Option<CancelToken>,
}

impl CurlChunkFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher whose in-flight transfer aborts when `token` fires.
    pub fn with_cancel_token(token: CancelToken) -> Self {
        Self {
            cancel: Some(token),
            ..Self::default()
        }
    }
}

impl ChunkFetcher for CurlChunkFetcher {
    fn configure(&mut self, url: &str, range: ByteRange) {
        self.target = Some((url.to_string(), range));
        self.data = None;
    }

    fn execute(&mut self) -> Result<(), ChunkError> {
        let (url, range) = self.target.clone().ok_or(ChunkError::NotConfigured)?;
        let expected = range.len();
        let mut buf: Vec<u8> = Vec::with_capacity(expected.min(PREALLOC_CAP) as usize);

        let mut easy = curl::easy::Easy::new();
        easy.url(&url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(Duration::from_secs(30))?;
        // Abort if throughput drops below 1 KiB/s for 60s; keeps a stalled
        // range request from hanging the whole job.
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.range(&range.range_value())?;
        if self.cancel.is_some() {
            easy.progress(true)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|chunk| {
                buf.extend_from_slice(chunk);
                Ok(chunk.len())
            })?;
            if let Some(token) = self.cancel.clone() {
                transfer.progress_function(move |_, _, _, _| !token.is_cancelled())?;
            }
            if let Err(e) = transfer.perform() {
                if e.is_aborted_by_callback() {
                    return Err(ChunkError::Aborted);
                }
                return Err(ChunkError::Curl(e));
            }
        }

        let code = easy.response_code()?;
        if code < 200 || code >= 300 {
            return Err(ChunkError::Http(code));
        }

        let received = buf.len() as u64;
        if received != expected {
            return Err(ChunkError::ShortBody { expected, received });
        }

        tracing::debug!(range = %range.range_value(), bytes = received, "range fetched");
        self.data = Some(buf);
        Ok(())
    }

    fn chunk_data(&mut self) -> Result<Vec<u8>, DownloadError> {
        self.data.take().ok_or(DownloadError::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_before_configure_fails() {
        let mut fetcher = CurlChunkFetcher::new();
        assert!(matches!(fetcher.execute(), Err(ChunkError::NotConfigured)));
    }

    #[test]
    fn chunk_data_before_execute_is_not_ready() {
        let mut fetcher = CurlChunkFetcher::new();
        fetcher.configure("http://example.com/f", ByteRange { start: 0, end: 9 });
        assert!(matches!(
            fetcher.chunk_data(),
            Err(DownloadError::NotReady)
        ));
    }

    #[test]
    fn reconfigure_discards_previous_result() {
        let mut fetcher = CurlChunkFetcher::new();
        fetcher.data = Some(vec![1, 2, 3]);
        fetcher.configure("http://example.com/f", ByteRange { start: 0, end: 2 });
        assert!(matches!(
            fetcher.chunk_data(),
            Err(DownloadError::NotReady)
        ));
    }
}
