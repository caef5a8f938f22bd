//! Search command implementation.
//!
//! Wires the filesystem fetcher into the query engine, submits a single
//! query, and collects the engine's updates until it settles.

use crate::config;
use anyhow::{anyhow, bail, Result};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::info;
use waystone_core::engine::{EngineConfig, QueryEngine, ResultSet, SearchUpdate};
use waystone_core::index::FsIndexFetcher;

/// Runs one query against an index directory.
///
/// # Arguments
///
/// * `query` - Symbol name prefix
/// * `limit` - Maximum number of entries in the result set
/// * `index_dir` - Optional index directory override
///
/// # Returns
///
/// The result set for the query. An empty set means the index had no
/// matching symbols; an unavailable index is an error.
pub async fn execute_search(
    query: &str,
    limit: usize,
    index_dir: Option<&PathBuf>,
) -> Result<ResultSet> {
    if query.trim().is_empty() {
        bail!("empty search query");
    }

    let dir = config::find_index_dir(index_dir)?;
    info!("Using search index at {}", dir.display());

    // One-shot submission: nothing to debounce.
    let engine_config = EngineConfig {
        result_cap: limit,
        debounce: Duration::ZERO,
    };
    let (engine, submitter) = QueryEngine::start(FsIndexFetcher::new(&dir), engine_config).await;
    submitter.submit(query);
    drop(submitter);

    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&updates);
    engine.run(move |update| sink.borrow_mut().push(update)).await;

    let mut result = None;
    for update in updates.borrow().iter() {
        match update {
            SearchUpdate::Ready(set) => result = Some(set.clone()),
            SearchUpdate::Unavailable { reason } => {
                bail!("search unavailable: {}", reason);
            }
            _ => {}
        }
    }
    result.ok_or_else(|| anyhow!("search engine produced no result for \"{}\"", query))
}
