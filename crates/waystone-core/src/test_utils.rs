//! Shared fixture builders for unit tests.
//!
//! Only compiled for tests. Integration tests under `tests/` build their own
//! fixtures against the public API.

use crate::index::fetch::InMemoryIndexFetcher;
use serde_json::{json, Value};

/// One occurrence in a fixture shard, in wire-field terms.
#[derive(Debug, Clone)]
pub(crate) struct OccurrenceSpec {
    pub name: String,
    pub kind: String,
    pub scope: Option<String>,
    pub anchor_url: String,
}

impl OccurrenceSpec {
    fn to_value(&self) -> Value {
        let mut record = json!({
            "displayName": self.name,
            "kind": self.kind,
            "anchorUrl": self.anchor_url,
        });
        if let Some(scope) = &self.scope {
            record["scope"] = Value::String(scope.clone());
        }
        record
    }
}

/// Serializes a shard payload from `(key, occurrences)` groups.
pub(crate) fn shard_json(groups: &[(&str, Vec<OccurrenceSpec>)]) -> Vec<u8> {
    let value = Value::Array(
        groups
            .iter()
            .map(|(key, occurrences)| {
                json!([
                    key,
                    occurrences.iter().map(OccurrenceSpec::to_value).collect::<Vec<_>>()
                ])
            })
            .collect(),
    );
    serde_json::to_vec(&value).expect("fixture shard must serialize")
}

/// Serializes a manifest payload from `(partition key, shard file)` pairs.
pub(crate) fn manifest_json(partitions: &[(&str, &str)]) -> Vec<u8> {
    let value = json!({
        "formatVersion": 1,
        "partitions": partitions
            .iter()
            .map(|(key, shard)| json!({"key": key, "shard": shard}))
            .collect::<Vec<_>>(),
    });
    serde_json::to_vec(&value).expect("fixture manifest must serialize")
}

fn occ(name: &str, kind: &str, scope: Option<&str>, anchor: &str) -> OccurrenceSpec {
    OccurrenceSpec {
        name: name.to_string(),
        kind: kind.to_string(),
        scope: scope.map(str::to_string),
        anchor_url: anchor.to_string(),
    }
}

/// A small two-shard index: an `s` partition with overloads and an exact
/// match candidate, plus a `v` partition.
pub(crate) fn sample_fetcher() -> InMemoryIndexFetcher {
    let manifest = manifest_json(&[("s", "shard_s.json"), ("v", "shard_v.json")]);
    let shard_s = shard_json(&[
        (
            "set",
            vec![occ("set", "function", None, "fns.html#set")],
        ),
        (
            "setarea",
            vec![
                occ(
                    "setArea",
                    "function",
                    Some("rcCompactSpan"),
                    "structrcCompactSpan.html#a48a4",
                ),
                occ(
                    "setArea",
                    "function",
                    Some("rcHeightfield"),
                    "structrcHeightfield.html#aeaa8",
                ),
            ],
        ),
        (
            "setflags",
            vec![occ(
                "setFlags",
                "function",
                Some("rcCompactSpan"),
                "structrcCompactSpan.html#a85b9",
            )],
        ),
        (
            "span",
            vec![occ("Span", "type", None, "structSpan.html")],
        ),
        (
            "swap",
            vec![occ("swap", "function", None, "fns.html#swap")],
        ),
    ]);
    let shard_v = shard_json(&[(
        "vertcount",
        vec![occ(
            "vertCount",
            "member",
            Some("rcPolyMesh"),
            "structrcPolyMesh.html#a595d",
        )],
    )]);

    InMemoryIndexFetcher::new()
        .with_manifest(manifest)
        .with_shard("shard_s.json", shard_s)
        .with_shard("shard_v.json", shard_v)
}
