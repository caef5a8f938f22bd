//! Result model delivered to the rendering layer.

use crate::index::types::{SymbolEntry, SymbolKind};
use serde::Serialize;

/// Ranked entries of one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultGroup {
    pub kind: SymbolKind,
    pub entries: Vec<SymbolEntry>,
}

/// Ordered, grouped matches for one query.
///
/// Produced fresh per query; a new result set supersedes the previous one
/// entirely, never merges with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    /// The raw query this set answers.
    pub query: String,
    /// Groups in fixed kind-priority order; empty groups are omitted.
    pub groups: Vec<ResultGroup>,
    /// Entries beyond the result cap were dropped.
    pub truncated: bool,
    /// A shard failed to load, so matches from it are missing. UI
    /// affordance only; the entries that are present are still correct.
    pub partial: bool,
}

impl ResultSet {
    /// An empty result set for the given query.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            groups: Vec::new(),
            truncated: false,
            partial: false,
        }
    }

    /// Returns `true` when no entries matched ("no results", as opposed to
    /// "search unavailable", which never produces a result set at all).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total entries across all groups.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// All entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }
}

/// Subscription payload: what the rendering layer should show right now.
///
/// Delivered through the callback passed to
/// [`QueryEngine::run`](super::QueryEngine::run) whenever the displayable
/// state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUpdate {
    /// Input is empty; show nothing (no error messaging either).
    Idle,
    /// A query was accepted and its match is in flight.
    Pending { query: String },
    /// The match for the current query completed. An empty set means
    /// "no results" and is worth saying explicitly.
    Ready(ResultSet),
    /// The index failed to load; search is down for the whole session.
    Unavailable { reason: String },
}
