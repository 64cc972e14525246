//! Error taxonomy for the chunked download engine.
//!
//! Configuration and lifecycle violations (`InvalidConfig`, `NotReady`,
//! `AlreadySet`) are detected synchronously and never retried. Per-range
//! transport failures are collected by the coordinator and surfaced together
//! as `ChunkFetchFailed` so the caller can see which ranges failed.

use std::fmt;
use std::time::Duration;

use crate::planner::ByteRange;

/// Error from fetching a single byte range.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Transfer completed but the body length does not match the range.
    #[error("short body: expected {expected} bytes, got {received}")]
    ShortBody { expected: u64, received: u64 },
    /// Transfer stopped because the cancel token fired.
    #[error("aborted by cancel token")]
    Aborted,
    /// `execute` was called before `configure`.
    #[error("execute called before configure")]
    NotConfigured,
    /// Fetch worker exited before reporting a result.
    #[error("fetch worker exited before reporting a result")]
    WorkerLost,
}

/// A planned range together with the error that failed it.
#[derive(Debug)]
pub struct RangeFailure {
    pub range: ByteRange,
    pub error: ChunkError,
}

impl fmt::Display for RangeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "range {}-{}: {}",
            self.range.start, self.range.end, self.error
        )
    }
}

/// Error surfaced by download jobs and the coordinator.
#[derive(Debug)]
pub enum DownloadError {
    /// Bad URL, chunk count/size below 1, or zero content length.
    /// Detected before any network activity.
    InvalidConfig(String),
    /// Payload or chunk data requested before it was produced.
    NotReady,
    /// Second assignment into a write-once slot, or mutation of a job
    /// whose payload is already populated.
    AlreadySet,
    /// Resolving the content length (HEAD probe) failed.
    Probe(ChunkError),
    /// One or more ranges failed; the payload stays unset.
    ChunkFetchFailed { failures: Vec<RangeFailure> },
    /// The caller's cancel token fired before all ranges completed.
    Cancelled,
    /// The deadline elapsed before all ranges completed.
    Timeout(Duration),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            DownloadError::NotReady => write!(f, "result requested before it was produced"),
            DownloadError::AlreadySet => {
                write!(f, "payload already set; a download result is assigned exactly once")
            }
            DownloadError::Probe(e) => write!(f, "content length probe failed: {}", e),
            DownloadError::ChunkFetchFailed { failures } => {
                write!(f, "chunk fetch failed for {} range(s)", failures.len())?;
                if let Some(first) = failures.first() {
                    write!(f, " ({})", first)?;
                }
                Ok(())
            }
            DownloadError::Cancelled => write!(f, "download cancelled"),
            DownloadError::Timeout(d) => write!(f, "download timed out after {:?}", d),
        }
    }
}

impl std::error::Error for DownloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DownloadError::Probe(e) => Some(e),
            DownloadError::ChunkFetchFailed { failures } => failures
                .first()
                .map(|fail| &fail.error as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_failure_names_the_range() {
        let fail = RangeFailure {
            range: ByteRange { start: 4, end: 6 },
            error: ChunkError::Http(503),
        };
        assert_eq!(fail.to_string(), "range 4-6: HTTP 503");
    }

    #[test]
    fn chunk_fetch_failed_reports_count_and_first_failure() {
        let err = DownloadError::ChunkFetchFailed {
            failures: vec![
                RangeFailure {
                    range: ByteRange { start: 0, end: 3 },
                    error: ChunkError::Http(500),
                },
                RangeFailure {
                    range: ByteRange { start: 7, end: 9 },
                    error: ChunkError::ShortBody {
                        expected: 3,
                        received: 1,
                    },
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 range(s)"), "got: {}", msg);
        assert!(msg.contains("range 0-3: HTTP 500"), "got: {}", msg);
    }

    #[test]
    fn short_body_display() {
        let e = ChunkError::ShortBody {
            expected: 10,
            received: 4,
        };
        assert_eq!(e.to_string(), "short body: expected 10 bytes, got 4");
    }
}
