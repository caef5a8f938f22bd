//! Core types for the symbol index: entries, shards, manifest, and errors.
//!
//! The documentation generator writes the index once at build time; nothing
//! in this module mutates after parse. Wire formats are JSON with camelCase
//! field names:
//!
//! - **Manifest**: `{"formatVersion": 1, "partitions": [{"key": "s", "shard": "shard_s.json"}, ...]}`
//! - **Shard**: ordered array of key groups,
//!   `[["setarea", [{"displayName": "setArea", "kind": "function", "scope": "rcCompactSpan", "anchorUrl": "..."}]], ...]`

use crate::config;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Folds a display name into its match key.
///
/// A pure function of the name (no locale, no external state), so entries
/// never need re-keying after load. Queries are folded the same way before
/// matching.
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase()
}

/// Category tag of a documented declaration.
///
/// Drives result grouping and label selection in the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Type,
    Function,
    Variable,
    EnumValue,
    Member,
    File,
    Page,
    Group,
}

impl SymbolKind {
    /// Fixed display order for result groups.
    ///
    /// Group order on screen never depends on match scores; types always
    /// come before functions, functions before members, and so on.
    pub const DISPLAY_ORDER: [SymbolKind; 8] = [
        SymbolKind::Type,
        SymbolKind::Function,
        SymbolKind::Member,
        SymbolKind::EnumValue,
        SymbolKind::Variable,
        SymbolKind::File,
        SymbolKind::Page,
        SymbolKind::Group,
    ];

    /// Position of this kind in [`DISPLAY_ORDER`](Self::DISPLAY_ORDER).
    pub fn display_rank(self) -> usize {
        match self {
            SymbolKind::Type => 0,
            SymbolKind::Function => 1,
            SymbolKind::Member => 2,
            SymbolKind::EnumValue => 3,
            SymbolKind::Variable => 4,
            SymbolKind::File => 5,
            SymbolKind::Page => 6,
            SymbolKind::Group => 7,
        }
    }

    /// Human-readable group heading.
    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Type => "Types",
            SymbolKind::Function => "Functions",
            SymbolKind::Member => "Members",
            SymbolKind::EnumValue => "Enum Values",
            SymbolKind::Variable => "Variables",
            SymbolKind::File => "Files",
            SymbolKind::Page => "Pages",
            SymbolKind::Group => "Groups",
        }
    }
}

/// One declaration occurrence in the index.
///
/// The same display name may legitimately resolve to several occurrences
/// (overloads, or the same member name on different types); each occurrence
/// is a distinct entry and is never merged with its siblings. `ordinal`
/// preserves the generator's emission order and tells occurrences apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolEntry {
    /// Identifier as written in the source, case-preserving.
    pub name: String,
    /// Lowercase-folded `name`; the key prefix matching runs against.
    pub normalized_key: String,
    /// Category used for grouping.
    pub kind: SymbolKind,
    /// Owning entity shown as a qualifier; absent for free/global symbols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Relative URL plus optional in-page fragment pointing at the exact
    /// documentation location. Delivered to the rendering layer byte-for-byte
    /// as it appears in the shard file.
    pub anchor_url: String,
    /// Generation order within the shard.
    pub ordinal: u32,
}

/// Wire form of a single occurrence inside a shard file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolRecord {
    display_name: String,
    kind: SymbolKind,
    #[serde(default)]
    scope: Option<String>,
    anchor_url: String,
}

/// Identifier of one shard file, as referenced by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardId(String);

impl ShardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Partition of the index a leading character maps to.
///
/// The partition function is total and deterministic over every legal
/// match-key lead: ASCII letters fold to a per-letter partition, ASCII
/// digits to a per-digit partition, and everything else (punctuation,
/// non-ASCII) collapses into the single [`Symbols`](Self::Symbols) bucket.
/// Every query prefix therefore resolves to exactly one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKey {
    /// Lowercase ASCII letter partition (`a`..`z`).
    Letter(u8),
    /// ASCII digit partition (`0`..`9`).
    Digit(u8),
    /// Catch-all partition for every other lead.
    Symbols,
}

impl PartitionKey {
    /// Resolves the partition for a leading character.
    pub fn of(lead: char) -> Self {
        match lead {
            'a'..='z' => PartitionKey::Letter(lead as u8),
            'A'..='Z' => PartitionKey::Letter(lead.to_ascii_lowercase() as u8),
            '0'..='9' => PartitionKey::Digit(lead as u8),
            _ => PartitionKey::Symbols,
        }
    }

    /// Parses a manifest partition key (`"a"`..`"z"`, `"0"`..`"9"`, `"symbols"`).
    pub fn parse(key: &str) -> Option<Self> {
        if key == config::SYMBOL_PARTITION {
            return Some(PartitionKey::Symbols);
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c @ 'a'..='z'), None) => Some(PartitionKey::Letter(c as u8)),
            (Some(c @ '0'..='9'), None) => Some(PartitionKey::Digit(c as u8)),
            _ => None,
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKey::Letter(c) | PartitionKey::Digit(c) => write!(f, "{}", *c as char),
            PartitionKey::Symbols => f.write_str(config::SYMBOL_PARTITION),
        }
    }
}

/// Errors surfaced by the index store.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// Manifest missing or malformed. Fatal to the search feature for the
    /// whole session; the manifest will not become valid without a fresh
    /// documentation build, so there are no retries.
    #[error("search index unavailable: {0}")]
    Unavailable(String),

    /// A single shard could not be fetched or parsed. Recovered locally:
    /// the shard contributes no entries to the query, other shards keep
    /// working, and the next access retries the fetch.
    #[error("failed to load shard {shard}: {reason}")]
    ShardLoad { shard: ShardId, reason: String },
}

/// Manifest describing which partition each shard covers.
///
/// Written once by the documentation generator next to the shard files.
/// A partition absent from the list simply has no entries with that lead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexManifest {
    /// Index format version; must match [`config::SUPPORTED_FORMAT_VERSION`].
    pub format_version: u32,
    /// Partition-to-shard mapping. Never empty in a valid manifest.
    pub partitions: Vec<PartitionRecord>,
}

/// One partition entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRecord {
    /// Partition key this shard covers (see [`PartitionKey::parse`]).
    pub key: String,
    /// Shard file holding the partition's entries.
    pub shard: ShardId,
    /// Entry count hint written by the generator; informational only.
    #[serde(default)]
    pub entry_count: Option<u64>,
}

impl IndexManifest {
    /// Parses and validates a manifest payload.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Unavailable`] if the payload is not valid JSON,
    /// misses required fields, carries an unsupported format version, or
    /// lists no partitions.
    pub fn parse(bytes: &[u8]) -> Result<Self, IndexError> {
        let manifest: IndexManifest = serde_json::from_slice(bytes)
            .map_err(|e| IndexError::Unavailable(format!("malformed manifest: {}", e)))?;

        if manifest.format_version != config::SUPPORTED_FORMAT_VERSION {
            return Err(IndexError::Unavailable(format!(
                "unsupported index format version {} (expected {})",
                manifest.format_version,
                config::SUPPORTED_FORMAT_VERSION
            )));
        }
        if manifest.partitions.is_empty() {
            return Err(IndexError::Unavailable(
                "manifest lists no partitions".to_string(),
            ));
        }
        Ok(manifest)
    }

    /// Builds the typed partition lookup table.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Unavailable`] on unknown or duplicate partition
    /// keys; both indicate a broken generator run rather than a recoverable
    /// condition.
    pub fn partition_map(&self) -> Result<HashMap<PartitionKey, ShardId>, IndexError> {
        let mut map = HashMap::with_capacity(self.partitions.len());
        for record in &self.partitions {
            let key = PartitionKey::parse(&record.key).ok_or_else(|| {
                IndexError::Unavailable(format!("unknown partition key {:?}", record.key))
            })?;
            if map.insert(key, record.shard.clone()).is_some() {
                return Err(IndexError::Unavailable(format!(
                    "duplicate partition key {:?}",
                    record.key
                )));
            }
        }
        Ok(map)
    }
}

/// Shard payload validation failures.
#[derive(Debug, Clone, Error)]
pub enum ShardFormatError {
    #[error("invalid shard payload: {0}")]
    Json(String),
    #[error("key group {index} has an empty key")]
    EmptyKey { index: usize },
    #[error("key groups out of order at {key:?}")]
    OutOfOrder { key: String },
}

/// Entries sharing one normalized key, in generation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGroup {
    pub key: String,
    pub entries: Vec<SymbolEntry>,
}

/// One partition's worth of index entries.
///
/// Key groups are sorted by key (strictly increasing), which makes a prefix
/// lookup a binary search plus a bounded scan over the contiguous run of
/// matching keys. Entries inside a group keep the generator's order; there
/// is no cross-entry sort at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    groups: Vec<KeyGroup>,
}

impl Shard {
    /// Parses and validates a shard payload.
    ///
    /// Byte-identical repeated occurrences (same name, scope, kind, and
    /// anchor) are dropped here: real generator output occasionally repeats
    /// an occurrence verbatim, and keeping both would hand the rendering
    /// layer two rows navigating to one target.
    ///
    /// # Errors
    ///
    /// Returns [`ShardFormatError`] on invalid JSON, empty keys, or key
    /// groups that are unsorted or duplicated.
    pub fn parse(bytes: &[u8]) -> Result<Self, ShardFormatError> {
        let raw: Vec<(String, Vec<SymbolRecord>)> =
            serde_json::from_slice(bytes).map_err(|e| ShardFormatError::Json(e.to_string()))?;

        let mut groups: Vec<KeyGroup> = Vec::with_capacity(raw.len());
        let mut ordinal: u32 = 0;

        for (index, (key, records)) in raw.into_iter().enumerate() {
            if key.is_empty() {
                return Err(ShardFormatError::EmptyKey { index });
            }
            if let Some(last) = groups.last() {
                if last.key >= key {
                    return Err(ShardFormatError::OutOfOrder { key });
                }
            }

            let mut entries: Vec<SymbolEntry> = Vec::with_capacity(records.len());
            for record in records {
                let duplicate = entries.iter().any(|e| {
                    e.name == record.display_name
                        && e.kind == record.kind
                        && e.scope == record.scope
                        && e.anchor_url == record.anchor_url
                });
                if duplicate {
                    debug!(key = %key, name = %record.display_name, "dropping duplicate occurrence");
                    continue;
                }
                entries.push(SymbolEntry {
                    name: record.display_name,
                    normalized_key: key.clone(),
                    kind: record.kind,
                    scope: record.scope,
                    anchor_url: record.anchor_url,
                    ordinal,
                });
                ordinal += 1;
            }
            groups.push(KeyGroup { key, entries });
        }

        Ok(Self { groups })
    }

    /// Ordered key groups of this shard.
    pub fn groups(&self) -> &[KeyGroup] {
        &self.groups
    }

    /// Total number of entries in the shard.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// Returns `true` if the shard holds no entries.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.entries.is_empty())
    }

    /// Ordered sub-sequence of entries whose key starts with `prefix`.
    ///
    /// Because groups are sorted, all matching keys form one contiguous run:
    /// a `partition_point` finds the first candidate and the scan stops at
    /// the first non-matching key.
    pub fn entries_matching<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a SymbolEntry> + 'a {
        let start = self.groups.partition_point(|g| g.key.as_str() < prefix);
        self.groups[start..]
            .iter()
            .take_while(move |g| g.key.starts_with(prefix))
            .flat_map(|g| g.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{shard_json, OccurrenceSpec};

    #[test]
    fn test_kind_wire_names() {
        let kind: SymbolKind = serde_json::from_str("\"enumValue\"").unwrap();
        assert_eq!(kind, SymbolKind::EnumValue);
        let kind: SymbolKind = serde_json::from_str("\"type\"").unwrap();
        assert_eq!(kind, SymbolKind::Type);
        assert!(serde_json::from_str::<SymbolKind>("\"EnumValue\"").is_err());
    }

    #[test]
    fn test_display_order_matches_ranks() {
        for (position, kind) in SymbolKind::DISPLAY_ORDER.iter().enumerate() {
            assert_eq!(kind.display_rank(), position);
        }
    }

    #[test]
    fn test_normalize_key_folds_case() {
        assert_eq!(normalize_key("SetArea"), "setarea");
        assert_eq!(normalize_key("already_lower"), "already_lower");
        // Folding is pure: whitespace inside a name is preserved.
        assert_eq!(normalize_key("operator =="), "operator ==");
    }

    #[test]
    fn test_partition_key_total_over_leads() {
        assert_eq!(PartitionKey::of('s'), PartitionKey::Letter(b's'));
        assert_eq!(PartitionKey::of('S'), PartitionKey::Letter(b's'));
        assert_eq!(PartitionKey::of('7'), PartitionKey::Digit(b'7'));
        assert_eq!(PartitionKey::of('~'), PartitionKey::Symbols);
        assert_eq!(PartitionKey::of('é'), PartitionKey::Symbols);
        assert_eq!(PartitionKey::of('漢'), PartitionKey::Symbols);
    }

    #[test]
    fn test_partition_key_parse_display_round_trip() {
        for key in ["a", "z", "0", "9", "symbols"] {
            let parsed = PartitionKey::parse(key).unwrap();
            assert_eq!(parsed.to_string(), key);
        }
        assert!(PartitionKey::parse("ab").is_none());
        assert!(PartitionKey::parse("A").is_none());
        assert!(PartitionKey::parse("").is_none());
    }

    #[test]
    fn test_manifest_parse_rejects_malformed() {
        // Not JSON
        assert!(matches!(
            IndexManifest::parse(b"not json"),
            Err(IndexError::Unavailable(_))
        ));
        // Missing required fields
        assert!(IndexManifest::parse(br#"{"partitions": []}"#).is_err());
        // Wrong version
        let wrong_version = br#"{"formatVersion": 99, "partitions": [{"key": "a", "shard": "a.json"}]}"#;
        assert!(matches!(
            IndexManifest::parse(wrong_version),
            Err(IndexError::Unavailable(reason)) if reason.contains("version")
        ));
        // Empty partition list
        let empty = br#"{"formatVersion": 1, "partitions": []}"#;
        assert!(matches!(
            IndexManifest::parse(empty),
            Err(IndexError::Unavailable(reason)) if reason.contains("no partitions")
        ));
    }

    #[test]
    fn test_manifest_partition_map_rejects_bad_keys() {
        let unknown = br#"{"formatVersion": 1, "partitions": [{"key": "zz", "shard": "z.json"}]}"#;
        let manifest = IndexManifest::parse(unknown).unwrap();
        assert!(manifest.partition_map().is_err());

        let duplicate = br#"{"formatVersion": 1, "partitions": [
            {"key": "a", "shard": "a1.json"},
            {"key": "a", "shard": "a2.json"}
        ]}"#;
        let manifest = IndexManifest::parse(duplicate).unwrap();
        assert!(manifest.partition_map().is_err());
    }

    fn occurrence(name: &str, kind: &str, scope: Option<&str>, anchor: &str) -> OccurrenceSpec {
        OccurrenceSpec {
            name: name.to_string(),
            kind: kind.to_string(),
            scope: scope.map(str::to_string),
            anchor_url: anchor.to_string(),
        }
    }

    #[test]
    fn test_shard_parse_preserves_order_and_anchors() {
        let bytes = shard_json(&[
            (
                "set",
                vec![occurrence("set", "function", None, "fns.html#set")],
            ),
            (
                "setarea",
                vec![
                    occurrence(
                        "setArea",
                        "function",
                        Some("rcCompactSpan"),
                        "structrcCompactSpan.html#a1",
                    ),
                    occurrence(
                        "setArea",
                        "function",
                        Some("rcHeightfield"),
                        "structrcHeightfield.html#a2",
                    ),
                ],
            ),
        ]);
        let shard = Shard::parse(&bytes).unwrap();
        assert_eq!(shard.len(), 3);

        let entries: Vec<_> = shard.entries_matching("set").collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "set");
        assert_eq!(entries[1].anchor_url, "structrcCompactSpan.html#a1");
        assert_eq!(entries[2].anchor_url, "structrcHeightfield.html#a2");
        assert!(entries.windows(2).all(|w| w[0].ordinal < w[1].ordinal));
    }

    #[test]
    fn test_shard_parse_rejects_unsorted_keys() {
        let bytes = shard_json(&[
            ("beta", vec![occurrence("beta", "type", None, "b.html")]),
            ("alpha", vec![occurrence("alpha", "type", None, "a.html")]),
        ]);
        assert!(matches!(
            Shard::parse(&bytes),
            Err(ShardFormatError::OutOfOrder { key }) if key == "alpha"
        ));

        let duplicated = shard_json(&[
            ("alpha", vec![occurrence("alpha", "type", None, "a.html")]),
            ("alpha", vec![occurrence("Alpha", "type", None, "a2.html")]),
        ]);
        assert!(Shard::parse(&duplicated).is_err());
    }

    #[test]
    fn test_shard_parse_rejects_empty_key() {
        let bytes = shard_json(&[("", vec![occurrence("x", "type", None, "x.html")])]);
        assert!(matches!(
            Shard::parse(&bytes),
            Err(ShardFormatError::EmptyKey { index: 0 })
        ));
    }

    #[test]
    fn test_shard_parse_drops_exact_duplicates_keeps_overloads() {
        let bytes = shard_json(&[(
            "savegeomset",
            vec![
                occurrence(
                    "saveGeomSet",
                    "function",
                    Some("InputGeom"),
                    "classInputGeom.html#a866",
                ),
                // Generator emitted the same occurrence twice.
                occurrence(
                    "saveGeomSet",
                    "function",
                    Some("InputGeom"),
                    "classInputGeom.html#a866",
                ),
                // A genuine overload with its own anchor stays.
                occurrence(
                    "saveGeomSet",
                    "function",
                    Some("InputGeom"),
                    "classInputGeom.html#a867",
                ),
            ],
        )]);
        let shard = Shard::parse(&bytes).unwrap();
        assert_eq!(shard.len(), 2);
        let anchors: Vec<_> = shard
            .entries_matching("savegeomset")
            .map(|e| e.anchor_url.as_str())
            .collect();
        assert_eq!(
            anchors,
            ["classInputGeom.html#a866", "classInputGeom.html#a867"]
        );
    }

    #[test]
    fn test_entries_matching_is_a_contiguous_prefix_range() {
        let bytes = shard_json(&[
            ("sequence", vec![occurrence("Sequence", "type", None, "s1.html")]),
            ("set", vec![occurrence("set", "function", None, "s2.html")]),
            ("setarea", vec![occurrence("setArea", "function", None, "s3.html")]),
            ("setflags", vec![occurrence("setFlags", "function", None, "s4.html")]),
            ("swap", vec![occurrence("swap", "function", None, "s5.html")]),
        ]);
        let shard = Shard::parse(&bytes).unwrap();

        let keys: Vec<_> = shard
            .entries_matching("set")
            .map(|e| e.normalized_key.as_str())
            .collect();
        assert_eq!(keys, ["set", "setarea", "setflags"]);

        assert_eq!(shard.entries_matching("sw").count(), 1);
        assert_eq!(shard.entries_matching("z").count(), 0);
        // A prefix past every key must not scan off the end.
        assert_eq!(shard.entries_matching("zzzz").count(), 0);
    }
}
