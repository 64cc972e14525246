//! Download job: validated target description plus the write-once payload slot.

use url::Url;

use crate::error::DownloadError;

/// Descriptor of a download target and the single-assignment result slot.
///
/// `url`, `chunk_count`, and `chunk_size` validate independently and may be
/// re-set any time before the payload is assigned; afterwards the job is
/// read-only. The payload is assigned exactly once, by the coordinator,
/// after every range has completed. A second assignment always fails, so a
/// merged result can never be silently overwritten.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    url: String,
    chunk_count: u64,
    chunk_size: u64,
    payload: Option<Vec<u8>>,
}

impl DownloadJob {
    /// Validates and stores all three settings. The payload slot starts empty.
    pub fn new(url: &str, chunk_count: u64, chunk_size: u64) -> Result<Self, DownloadError> {
        let mut job = Self {
            url: String::new(),
            chunk_count: 1,
            chunk_size: 1,
            payload: None,
        };
        job.set_url(url)?
            .set_chunk_count(chunk_count)?
            .set_chunk_size(chunk_size)?;
        Ok(job)
    }

    /// Validates `url` syntax and stores it. Chainable.
    pub fn set_url(&mut self, url: &str) -> Result<&mut Self, DownloadError> {
        self.ensure_mutable()?;
        validate_url(url)?;
        self.url = url.to_string();
        Ok(self)
    }

    /// Stores the chunk count; values below 1 are rejected. Chainable.
    pub fn set_chunk_count(&mut self, chunk_count: u64) -> Result<&mut Self, DownloadError> {
        self.ensure_mutable()?;
        if chunk_count < 1 {
            return Err(DownloadError::InvalidConfig(format!(
                "chunk count of {} is not valid; must be >= 1",
                chunk_count
            )));
        }
        self.chunk_count = chunk_count;
        Ok(self)
    }

    /// Stores the chunk size in bytes; values below 1 are rejected. Chainable.
    pub fn set_chunk_size(&mut self, chunk_size: u64) -> Result<&mut Self, DownloadError> {
        self.ensure_mutable()?;
        if chunk_size < 1 {
            return Err(DownloadError::InvalidConfig(format!(
                "chunk size of {} is not valid; must be >= 1",
                chunk_size
            )));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn chunk_count(&self) -> u64 {
        self.chunk_count
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// True once the merged payload has been assigned.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Assigns the merged payload. Fails with `AlreadySet` if the slot is
    /// populated; the slot accepts exactly one assignment for its lifetime.
    pub fn set_payload(&mut self, data: Vec<u8>) -> Result<(), DownloadError> {
        if self.payload.is_some() {
            return Err(DownloadError::AlreadySet);
        }
        self.payload = Some(data);
        Ok(())
    }

    /// The merged payload. Fails with `NotReady` before assignment.
    pub fn payload(&self) -> Result<&[u8], DownloadError> {
        self.payload.as_deref().ok_or(DownloadError::NotReady)
    }

    /// Consumes the job and moves the payload out. Fails with `NotReady`
    /// before assignment.
    pub fn into_payload(self) -> Result<Vec<u8>, DownloadError> {
        self.payload.ok_or(DownloadError::NotReady)
    }

    fn ensure_mutable(&self) -> Result<(), DownloadError> {
        if self.payload.is_some() {
            return Err(DownloadError::AlreadySet);
        }
        Ok(())
    }
}

fn validate_url(url: &str) -> Result<(), DownloadError> {
    let parsed = Url::parse(url)
        .map_err(|e| DownloadError::InvalidConfig(format!("the url '{}' is invalid: {}", url, e)))?;
    if !parsed.has_host() {
        return Err(DownloadError::InvalidConfig(format!(
            "the url '{}' is invalid: no host",
            url
        )));
    }
    Ok(())
}
