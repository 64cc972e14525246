//! `booster probe`: show content length and range support for a URL.

use anyhow::{Context, Result};
use booster_core::probe;

pub fn run_probe(url: &str) -> Result<()> {
    let result = probe::probe(url).with_context(|| format!("probing {}", url))?;

    match result.content_length {
        Some(n) => println!("content length: {} bytes", n),
        None => println!("content length: unknown"),
    }
    println!(
        "range support: {}",
        if result.accept_ranges {
            "advertised"
        } else {
            "not advertised"
        }
    );
    Ok(())
}
