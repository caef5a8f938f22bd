//! Incremental query engine: keystrokes in, ranked result sets out.
//!
//! The engine is a single cooperative driver loop fed by a channel of
//! keystroke submissions, in the same shape as a UI search coroutine: the
//! submitter side is always non-blocking, the driver side awaits shard
//! loads and matching, and subscribers receive a [`SearchUpdate`] whenever
//! the displayable state changes.
//!
//! # Last-keystroke-wins
//!
//! The central correctness property: results are only ever delivered for
//! the most recently submitted query. Every submission carries a generation
//! id, and [`QuerySubmitter::submit`] advances the shared latest-generation
//! counter *before* enqueueing, which is the moment the previous in-flight
//! query is cancelled. A match that finishes for a superseded generation is
//! discarded on arrival; a slow old query can never clobber a newer, faster
//! one. Cancellation only suppresses delivery: a shard fetch already in
//! flight completes and populates the cache for whichever query needs that
//! shard next.
//!
//! # Session lifecycle
//!
//! [`QueryEngine::start`] loads the manifest once. If that fails, search is
//! down for the whole session: the engine reports
//! [`SearchUpdate::Unavailable`] instead of silently returning empty
//! results, which would be indistinguishable from "no matches".

mod matcher;
mod results;

pub use results::{ResultGroup, ResultSet, SearchUpdate};

use crate::config;
use crate::index::fetch::IndexFetcher;
use crate::index::store::IndexStore;
use crate::index::types::{IndexError, SymbolEntry};
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::StreamExt;
use instant::Instant;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum entries per result set; the rest are dropped and flagged.
    pub result_cap: usize,
    /// How long to defer matching so keystroke bursts coalesce. Zero
    /// disables coalescing; correctness never depends on this value.
    pub debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            result_cap: config::DEFAULT_RESULT_CAP,
            debounce: Duration::from_millis(config::DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// Normalizes raw input the same way index keys are folded.
///
/// Trims surrounding whitespace and lowercase-folds. An empty result means
/// "treat as cleared input".
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One keystroke's worth of input, tagged with its generation.
#[derive(Debug)]
struct Submission {
    generation: u64,
    raw: String,
}

/// Non-blocking keystroke entry point, clonable into input handlers.
///
/// Dropping every submitter ends the engine's [`run`](QueryEngine::run)
/// loop once the queue drains.
#[derive(Clone)]
pub struct QuerySubmitter {
    tx: UnboundedSender<Submission>,
    latest: Arc<AtomicU64>,
}

impl QuerySubmitter {
    /// Accepts the current input text.
    ///
    /// Always returns immediately, even while a previous query is still
    /// resolving. Advancing the generation counter here, on the input side,
    /// is what cancels the in-flight query at the moment the keystroke is
    /// accepted.
    pub fn submit(&self, raw: impl Into<String>) {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        // Send only fails when the engine loop is gone; there is nothing
        // left to render to in that case.
        let _ = self.tx.unbounded_send(Submission {
            generation,
            raw: raw.into(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Idle,
    Pending,
    Displaying,
}

/// The driver side of a search session.
pub struct QueryEngine<F: IndexFetcher> {
    index: Result<IndexStore<F>, IndexError>,
    rx: UnboundedReceiver<Submission>,
    latest: Arc<AtomicU64>,
    config: EngineConfig,
    state: SearchState,
}

impl<F: IndexFetcher> QueryEngine<F> {
    /// Creates a session: loads the manifest (exactly once) and wires up
    /// the submission channel.
    ///
    /// A manifest failure does not abort construction; the returned engine
    /// latches the failure and reports search-unavailable for the session.
    pub async fn start(fetcher: F, config: EngineConfig) -> (Self, QuerySubmitter) {
        let index = IndexStore::load(fetcher).await;
        if let Err(e) = &index {
            warn!(error = %e, "search index failed to load; search is unavailable this session");
        }

        let (tx, rx) = unbounded();
        let latest = Arc::new(AtomicU64::new(0));
        let submitter = QuerySubmitter {
            tx,
            latest: Arc::clone(&latest),
        };
        let engine = Self {
            index,
            rx,
            latest,
            config,
            state: SearchState::Idle,
        };
        (engine, submitter)
    }

    /// Drives the session until every submitter is dropped.
    ///
    /// `on_update` is the subscription callback: it receives the latest
    /// [`SearchUpdate`] each time the displayable state changes. Futures
    /// here are not `Send`; run this on a current-thread executor alongside
    /// the input handling.
    pub async fn run<C>(mut self, mut on_update: C)
    where
        C: FnMut(SearchUpdate),
    {
        if let Err(e) = &self.index {
            on_update(SearchUpdate::Unavailable {
                reason: e.to_string(),
            });
        }

        while let Some(mut submission) = self.rx.next().await {
            // Coalesce bursts: wait out the debounce interval, then keep
            // only the newest queued submission.
            if !self.config.debounce.is_zero() {
                tokio::time::sleep(self.config.debounce).await;
            }
            let mut closed = false;
            loop {
                match self.rx.try_next() {
                    Ok(Some(newer)) => submission = newer,
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            self.process(submission, &mut on_update).await;

            if closed {
                break;
            }
        }
        debug!("query engine stopped: all submitters dropped");
    }

    async fn process<C>(&mut self, submission: Submission, on_update: &mut C)
    where
        C: FnMut(SearchUpdate),
    {
        let Submission { generation, raw } = submission;
        if generation != self.latest.load(Ordering::SeqCst) {
            debug!(generation, "query superseded before matching started");
            return;
        }

        let normalized = normalize_query(&raw);
        if normalized.is_empty() {
            // Cleared input: back to idle immediately, no shard access.
            debug!(from = ?self.state, "input cleared");
            self.state = SearchState::Idle;
            on_update(SearchUpdate::Idle);
            return;
        }

        let store = match &self.index {
            Ok(store) => store,
            Err(e) => {
                on_update(SearchUpdate::Unavailable {
                    reason: e.to_string(),
                });
                return;
            }
        };

        debug!(from = ?self.state, query = %raw, "match submitted");
        self.state = SearchState::Pending;
        on_update(SearchUpdate::Pending { query: raw.clone() });

        let started = Instant::now();
        let (matches, partial) = collect_matches(store, &normalized).await;

        if generation != self.latest.load(Ordering::SeqCst) {
            // Stale result for a superseded query. Suppression is a
            // correctness requirement, not an optimization; the shard the
            // match loaded stays cached for whoever needs it next.
            debug!(query = %raw, generation, "discarding stale result");
            return;
        }

        let mut ranked = matcher::rank(&normalized, matches);
        let truncated = matcher::cap(&mut ranked, self.config.result_cap);
        let groups = matcher::group(ranked);
        let result = ResultSet {
            query: raw,
            groups,
            truncated,
            partial,
        };

        debug!(
            query = %result.query,
            entries = result.entry_count(),
            truncated,
            partial,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query matched"
        );

        self.state = SearchState::Displaying;
        on_update(SearchUpdate::Ready(result));
    }
}

/// Collects prefix matches for a normalized, non-empty query.
///
/// Returns the matches in shard order plus a partial flag. A shard that
/// fails to load contributes zero entries instead of failing the query.
async fn collect_matches<F: IndexFetcher>(
    store: &IndexStore<F>,
    normalized: &str,
) -> (Vec<SymbolEntry>, bool) {
    let Some(lead) = normalized.chars().next() else {
        return (Vec::new(), false);
    };
    let Some(shard_id) = store.shard_for(lead) else {
        // No partition covers this lead: legitimately zero matches.
        return (Vec::new(), false);
    };
    match store.ensure_loaded(shard_id).await {
        Ok(shard) => (shard.entries_matching(normalized).cloned().collect(), false),
        Err(e) => {
            warn!(error = %e, "shard unavailable; answering with partial results");
            (Vec::new(), true)
        }
    }
}
