//! The index store: manifest resolution plus lazy, cached shard loading.

use super::fetch::IndexFetcher;
use super::types::{IndexError, IndexManifest, PartitionKey, Shard, ShardId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Read-only view over the complete symbol index.
///
/// The manifest is loaded exactly once, in [`load`](Self::load); shards are
/// fetched lazily the first time a query needs them and cached for the rest
/// of the session. The cache is append-only (entries are added, never
/// evicted or mutated), so the only locking discipline required is the
/// atomic check-cache-else-fetch-and-insert in
/// [`ensure_loaded`](Self::ensure_loaded).
pub struct IndexStore<F: IndexFetcher> {
    fetcher: F,
    manifest: IndexManifest,
    partitions: HashMap<PartitionKey, ShardId>,
    shards: RwLock<HashMap<ShardId, Arc<Shard>>>,
}

impl<F: IndexFetcher> IndexStore<F> {
    /// Fetches and validates the manifest, producing a ready store.
    ///
    /// Taking the manifest load into the constructor is what guarantees it
    /// happens exactly once and before any lookup.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Unavailable`] when the manifest cannot be
    /// retrieved or is malformed. The caller should treat this as fatal for
    /// the session; a broken manifest only heals with a fresh build.
    pub async fn load(fetcher: F) -> Result<Self, IndexError> {
        let bytes = fetcher
            .fetch_manifest()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        let manifest = IndexManifest::parse(&bytes)?;
        let partitions = manifest.partition_map()?;

        info!(
            partitions = partitions.len(),
            format_version = manifest.format_version,
            "loaded search index manifest"
        );

        Ok(Self {
            fetcher,
            manifest,
            partitions,
            shards: RwLock::new(HashMap::new()),
        })
    }

    /// The validated manifest this store was built from.
    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// Resolves which shard covers a given leading character.
    ///
    /// Pure function over the manifest, no I/O. `None` means the manifest
    /// lists no partition for that character class: there are no entries
    /// with that lead, which is an empty result rather than an error.
    ///
    /// Refining a query by typing further characters never changes the
    /// resolved shard, since the partition depends only on the first
    /// character; the session cache below turns that into a single fetch
    /// per partition no matter how the user types.
    pub fn shard_for(&self, lead: char) -> Option<&ShardId> {
        self.partitions.get(&PartitionKey::of(lead))
    }

    /// Returns `true` if the shard is already in the session cache.
    pub fn is_loaded(&self, id: &ShardId) -> bool {
        self.shards
            .read()
            .map(|cache| cache.contains_key(id))
            .unwrap_or(false)
    }

    /// Scoped acquisition of a shard's entry list.
    ///
    /// Cached shards return immediately; otherwise the payload is fetched,
    /// parsed, validated, and inserted. Failures are never cached, so the
    /// next access simply retries.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ShardLoad`] on fetch or parse failure. Callers
    /// must treat this as "no matches from this shard", not as a failed
    /// query: other shards may still be perfectly usable.
    pub async fn ensure_loaded(&self, id: &ShardId) -> Result<Arc<Shard>, IndexError> {
        if let Some(shard) = self.cached(id)? {
            return Ok(shard);
        }

        let bytes = self
            .fetcher
            .fetch_shard(id)
            .await
            .map_err(|e| IndexError::ShardLoad {
                shard: id.clone(),
                reason: e.to_string(),
            })?;
        let shard = Shard::parse(&bytes)
            .map(Arc::new)
            .map_err(|e| IndexError::ShardLoad {
                shard: id.clone(),
                reason: e.to_string(),
            })?;

        debug!(shard = %id, entries = shard.len(), "cached shard");

        let mut cache = self.shards.write().map_err(|e| IndexError::ShardLoad {
            shard: id.clone(),
            reason: format!("lock poisoned: {}", e),
        })?;
        // Two in-flight loads of the same shard can race here; the first
        // insert wins and both callers see the same parsed value.
        Ok(cache.entry(id.clone()).or_insert(shard).clone())
    }

    fn cached(&self, id: &ShardId) -> Result<Option<Arc<Shard>>, IndexError> {
        let cache = self.shards.read().map_err(|e| IndexError::ShardLoad {
            shard: id.clone(),
            reason: format!("lock poisoned: {}", e),
        })?;
        Ok(cache.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fetch::{FetchError, InMemoryIndexFetcher};
    use crate::test_utils::{manifest_json, sample_fetcher};
    use async_trait::async_trait;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Wraps a fetcher and counts shard fetches.
    struct CountingFetcher {
        inner: InMemoryIndexFetcher,
        shard_fetches: Rc<Cell<usize>>,
    }

    #[async_trait(?Send)]
    impl IndexFetcher for CountingFetcher {
        async fn fetch_manifest(&self) -> Result<Vec<u8>, FetchError> {
            self.inner.fetch_manifest().await
        }

        async fn fetch_shard(&self, id: &ShardId) -> Result<Vec<u8>, FetchError> {
            self.shard_fetches.set(self.shard_fetches.get() + 1);
            self.inner.fetch_shard(id).await
        }
    }

    #[tokio::test]
    async fn test_load_validates_manifest() {
        let store = IndexStore::load(sample_fetcher()).await.unwrap();
        assert_eq!(store.manifest().partitions.len(), 2);

        let missing = InMemoryIndexFetcher::new();
        assert!(matches!(
            IndexStore::load(missing).await,
            Err(IndexError::Unavailable(_))
        ));

        let garbled = InMemoryIndexFetcher::new().with_manifest(b"[1, 2".to_vec());
        assert!(matches!(
            IndexStore::load(garbled).await,
            Err(IndexError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_shard_for_resolves_partitions() {
        let store = IndexStore::load(sample_fetcher()).await.unwrap();

        let s_shard = store.shard_for('s').unwrap();
        assert_eq!(s_shard.as_str(), "shard_s.json");
        // Case folds to the same partition.
        assert_eq!(store.shard_for('S'), Some(s_shard));
        // Unlisted partitions mean "no entries", not an error.
        assert!(store.shard_for('q').is_none());
        assert!(store.shard_for('~').is_none());
        assert!(store.shard_for('7').is_none());
    }

    #[tokio::test]
    async fn test_ensure_loaded_fetches_once_per_shard() {
        let shard_fetches = Rc::new(Cell::new(0));
        let fetcher = CountingFetcher {
            inner: sample_fetcher(),
            shard_fetches: Rc::clone(&shard_fetches),
        };
        let store = IndexStore::load(fetcher).await.unwrap();

        let id = store.shard_for('s').unwrap().clone();
        assert!(!store.is_loaded(&id));

        let first = store.ensure_loaded(&id).await.unwrap();
        let second = store.ensure_loaded(&id).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.is_loaded(&id));
        assert_eq!(shard_fetches.get(), 1);
    }

    #[tokio::test]
    async fn test_failed_shard_load_is_retried_on_next_access() {
        // Manifest references a shard the fetcher cannot produce yet.
        let manifest = manifest_json(&[("a", "shard_a.json")]);
        let shard_fetches = Rc::new(Cell::new(0));
        let fetcher = CountingFetcher {
            inner: InMemoryIndexFetcher::new().with_manifest(manifest),
            shard_fetches: Rc::clone(&shard_fetches),
        };
        let store = IndexStore::load(fetcher).await.unwrap();

        let id = store.shard_for('a').unwrap().clone();
        assert!(matches!(
            store.ensure_loaded(&id).await,
            Err(IndexError::ShardLoad { .. })
        ));
        // The failure is not cached: the next access fetches again.
        assert!(store.ensure_loaded(&id).await.is_err());
        assert_eq!(shard_fetches.get(), 2);
        assert!(!store.is_loaded(&id));
    }

    #[tokio::test]
    async fn test_malformed_shard_is_a_shard_load_error() {
        let manifest = manifest_json(&[("a", "shard_a.json")]);
        let fetcher = InMemoryIndexFetcher::new()
            .with_manifest(manifest)
            .with_shard("shard_a.json", b"{\"not\": \"a shard\"}".to_vec());
        let store = IndexStore::load(fetcher).await.unwrap();

        let id = store.shard_for('a').unwrap().clone();
        match store.ensure_loaded(&id).await {
            Err(IndexError::ShardLoad { shard, .. }) => assert_eq!(shard, id),
            other => panic!("expected ShardLoad error, got {:?}", other.map(|_| ())),
        }
    }
}
