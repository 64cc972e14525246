//! HEAD probe: content length and range support for a target URL.
//!
//! Uses the curl crate to fetch response headers only. The engine needs
//! `Content-Length` to plan ranges and `Accept-Ranges: bytes` to know
//! whether the server advertises range support.

use std::str;
use std::time::Duration;

use crate::error::ChunkError;

/// What the planner needs to know before any range request goes out.
#[derive(Debug, Clone, Copy)]
pub struct ProbeResult {
    /// Total size in bytes, if `Content-Length` was present.
    pub content_length: Option<u64>,
    /// True if the server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

/// Performs a HEAD request and parses the headers. Follows redirects; a
/// non-2xx final status fails the probe.
pub fn probe(url: &str) -> Result<ProbeResult, ChunkError> {
    let mut lines: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(30))?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if code < 200 || code >= 300 {
        return Err(ChunkError::Http(code));
    }

    Ok(parse_headers(&lines))
}

/// Parses collected header lines. Later occurrences win, so the final hop of
/// a redirect chain is what counts.
fn parse_headers(lines: &[String]) -> ProbeResult {
    let mut content_length = None;
    let mut accept_ranges = false;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("accept-ranges") {
                accept_ranges = value.eq_ignore_ascii_case("bytes");
            }
        }
    }

    ProbeResult {
        content_length,
        accept_ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_content_length_and_ranges() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Length: 12345".to_string(),
            "Accept-Ranges: bytes".to_string(),
        ];
        let r = parse_headers(&lines);
        assert_eq!(r.content_length, Some(12345));
        assert!(r.accept_ranges);
    }

    #[test]
    fn parse_no_range_support() {
        let lines = [
            "Content-Length: 999".to_string(),
            "Accept-Ranges: none".to_string(),
        ];
        let r = parse_headers(&lines);
        assert_eq!(r.content_length, Some(999));
        assert!(!r.accept_ranges);
    }

    #[test]
    fn parse_missing_content_length() {
        let lines = ["HTTP/1.1 200 OK".to_string()];
        let r = parse_headers(&lines);
        assert_eq!(r.content_length, None);
        assert!(!r.accept_ranges);
    }

    #[test]
    fn redirect_chain_last_hop_wins() {
        let lines = [
            "HTTP/1.1 302 Found".to_string(),
            "Content-Length: 0".to_string(),
            "HTTP/1.1 200 OK".to_string(),
            "Content-Length: 4096".to_string(),
            "Accept-Ranges: bytes".to_string(),
        ];
        let r = parse_headers(&lines);
        assert_eq!(r.content_length, Some(4096));
        assert!(r.accept_ranges);
    }

    #[test]
    fn garbage_content_length_ignored() {
        let lines = ["Content-Length: many".to_string()];
        let r = parse_headers(&lines);
        assert_eq!(r.content_length, None);
    }
}
