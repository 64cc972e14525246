//! Filename derivation from a download URL.
//!
//! Used by callers (e.g. the CLI) to pick a default output name: last URL
//! path segment, sanitized for Linux filesystems.

use url::Url;

/// Default filename when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe local filename from the URL's last path segment.
///
/// The result is sanitized (no `/`, NUL, or control chars; no leading or
/// trailing dots or spaces); empty or reserved results fall back to
/// `download.bin`.
pub fn derive_filename(url: &str) -> String {
    let candidate = Url::parse(url).ok().and_then(|u| {
        u.path_segments().and_then(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .next_back()
                .map(str::to_string)
        })
    });

    let raw = match candidate {
        Some(c) => c,
        None => return DEFAULT_FILENAME.to_string(),
    };

    let sanitized = sanitize(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| *c != '/' && *c != '\0' && !c.is_control())
        .collect();
    cleaned
        .trim_matches(|c: char| c == ' ' || c == '.')
        .to_string()
}
