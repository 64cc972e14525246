//! CLI for the booster parallel chunked downloader.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use commands::{run_completions, run_get, run_probe};

/// Top-level CLI for the booster downloader.
#[derive(Debug, Parser)]
#[command(name = "booster")]
#[command(about = "booster: parallel chunked file downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL with concurrent range requests.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,
        /// Number of ranges to split the download into.
        #[arg(long, value_name = "N")]
        chunks: Option<u64>,
        /// Plan by fixed chunk size in bytes instead of chunk count.
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<u64>,
        /// Cap concurrent range fetches (default: one per range).
        #[arg(long, value_name = "N")]
        max_concurrent: Option<usize>,
        /// Abort the whole download after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Output file (default: derived from the URL path).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Probe a URL: content length and range support.
    Probe {
        /// Direct HTTP/HTTPS URL to probe.
        url: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse the process arguments and dispatch to the matching command.
pub fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Get {
            url,
            chunks,
            chunk_size,
            max_concurrent,
            timeout,
            output,
        } => run_get(&url, chunks, chunk_size, max_concurrent, timeout, output),
        CliCommand::Probe { url } => run_probe(&url),
        CliCommand::Completions { shell } => run_completions(shell),
    }
}
