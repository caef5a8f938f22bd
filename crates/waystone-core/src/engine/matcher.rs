//! Ranking, truncation, and grouping of prefix matches.
//!
//! Pure functions over already-collected matches. Ranking uses exactly two
//! keys: exactness (a symbol literally named `list` outranks `listNode` for
//! the query "list"), then the generator's emission order. No popularity,
//! no recency, no fuzziness.

use super::results::ResultGroup;
use crate::index::types::{SymbolEntry, SymbolKind};

/// Orders matches by exactness, then generation order.
///
/// `matches` must already be in shard (generation) order; the partition is
/// stable, so ties keep that order.
pub(crate) fn rank(normalized_query: &str, matches: Vec<SymbolEntry>) -> Vec<SymbolEntry> {
    let (exact, extended): (Vec<_>, Vec<_>) = matches
        .into_iter()
        .partition(|e| e.normalized_key == normalized_query);
    let mut ranked = exact;
    ranked.extend(extended);
    ranked
}

/// Drops entries beyond `limit`, returning whether anything was dropped.
pub(crate) fn cap(ranked: &mut Vec<SymbolEntry>, limit: usize) -> bool {
    if ranked.len() > limit {
        ranked.truncate(limit);
        true
    } else {
        false
    }
}

/// Buckets ranked entries by kind.
///
/// Rank order is preserved inside each group; group order follows
/// [`SymbolKind::DISPLAY_ORDER`], never the match ranking. Empty groups are
/// omitted.
pub(crate) fn group(entries: Vec<SymbolEntry>) -> Vec<ResultGroup> {
    let mut buckets: [Vec<SymbolEntry>; SymbolKind::DISPLAY_ORDER.len()] =
        std::array::from_fn(|_| Vec::new());
    for entry in entries {
        buckets[entry.kind.display_rank()].push(entry);
    }
    SymbolKind::DISPLAY_ORDER
        .into_iter()
        .zip(buckets)
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(kind, entries)| ResultGroup { kind, entries })
        .collect()
}
