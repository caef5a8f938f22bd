//! Waystone CLI - symbol search over a generated documentation index.
//!
//! # Usage
//!
//! ```bash
//! # Search an index directory (./search by default)
//! ws "setArea"
//! ws "rc" -n 20
//! ws "dtNavMesh" --json
//!
//! # Point at a specific documentation build
//! ws "swap" --index-dir ./docs/html/search
//!
//! # Show help
//! ws --help
//! ```

mod config;
mod output;
mod search;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Waystone symbol search CLI.
///
/// Searches the static symbol index emitted by a documentation build and
/// prints matching declarations grouped by kind, with links to their
/// documentation location.
#[derive(Parser)]
#[command(name = "ws", version, about)]
struct Cli {
    /// Symbol name prefix to search for
    query: String,

    /// Maximum number of entries to return
    #[arg(short = 'n', long, default_value = "50")]
    limit: usize,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Index directory containing manifest.json and shard files
    /// (default: $WAYSTONE_INDEX_DIR, then ./search)
    #[arg(long)]
    index_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let results = search::execute_search(&cli.query, cli.limit, cli.index_dir.as_ref()).await?;

    let rendered = if cli.json {
        output::format_json(&results)
    } else {
        output::format_human(&results)
    };
    println!("{}", rendered);

    Ok(())
}
