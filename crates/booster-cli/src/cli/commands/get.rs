//! `booster get`: run a chunked download job and write the payload to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use booster_core::config::{self, BoosterConfig};
use booster_core::coordinator::{DownloadCoordinator, PlanStrategy};
use booster_core::job::DownloadJob;
use booster_core::url_model;

pub fn run_get(
    url: &str,
    chunks: Option<u64>,
    chunk_size: Option<u64>,
    max_concurrent: Option<usize>,
    timeout: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let cfg = config::load_or_init().unwrap_or_else(|e| {
        tracing::warn!("config unavailable ({:#}); using defaults", e);
        BoosterConfig::default()
    });

    let count = chunks.unwrap_or(cfg.chunk_count);
    let size = chunk_size.unwrap_or(cfg.chunk_size);
    let mut job = DownloadJob::new(url, count, size)?;

    // an explicit --chunk-size switches planning to size-driven ranges
    let strategy = if chunk_size.is_some() {
        PlanStrategy::BySize
    } else {
        PlanStrategy::ByCount
    };
    let mut coordinator = DownloadCoordinator::new().plan_strategy(strategy);
    if let Some(max) = max_concurrent.or(cfg.max_concurrent) {
        coordinator = coordinator.max_concurrent(max);
    }
    if let Some(secs) = timeout.or(cfg.timeout_secs) {
        coordinator = coordinator.timeout(Duration::from_secs(secs));
    }

    coordinator.run(&mut job).context("download failed")?;

    let path = output.unwrap_or_else(|| default_output_path(url));
    let payload = job.into_payload()?;
    write_payload(&path, &payload)?;
    tracing::info!(bytes = payload.len(), path = %path.display(), "download complete");
    println!("saved {} bytes to {}", payload.len(), path.display());
    Ok(())
}

/// Default output path: filename derived from the URL, in the current
/// directory.
fn default_output_path(url: &str) -> PathBuf {
    PathBuf::from(url_model::derive_filename(url))
}

fn write_payload(path: &Path, payload: &[u8]) -> Result<()> {
    fs::write(path, payload).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_comes_from_url() {
        assert_eq!(
            default_output_path("https://example.com/tools/app.tar.gz"),
            PathBuf::from("app.tar.gz")
        );
        assert_eq!(
            default_output_path("https://example.com/"),
            PathBuf::from("download.bin")
        );
    }

    #[test]
    fn write_payload_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        write_payload(&path, b"abc123").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"abc123");
    }

    #[test]
    fn write_payload_fails_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.bin");
        assert!(write_payload(&path, b"x").is_err());
    }
}
