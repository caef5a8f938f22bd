//! Fetch abstraction for the static index files.
//!
//! The manifest and shard payloads are plain files produced by the
//! documentation generator; how they are retrieved depends on where the
//! search runs. [`IndexFetcher`] abstracts over that transport:
//!
//! - [`FsIndexFetcher`] - index directory on the local filesystem
//! - [`InMemoryIndexFetcher`] - canned payloads for testing

use super::types::ShardId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Fetch error types.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The requested file does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other retrieval failure.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Read-only access to the generated index files.
///
/// Single-threaded cooperative model: futures are not required to be `Send`.
/// Implementations never cache; caching is the index store's job.
#[async_trait(?Send)]
pub trait IndexFetcher {
    /// Retrieves the raw partition manifest.
    async fn fetch_manifest(&self) -> Result<Vec<u8>, FetchError>;

    /// Retrieves one shard payload.
    async fn fetch_shard(&self, id: &ShardId) -> Result<Vec<u8>, FetchError>;
}

// Blanket implementation so a fetcher can be shared with test harnesses
// that want to observe it while the store owns a handle.
#[async_trait(?Send)]
impl<T: IndexFetcher> IndexFetcher for std::sync::Arc<T> {
    async fn fetch_manifest(&self) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_manifest().await
    }

    async fn fetch_shard(&self, id: &ShardId) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_shard(id).await
    }
}

/// In-memory fetcher for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndexFetcher {
    manifest: Option<Vec<u8>>,
    shards: HashMap<ShardId, Vec<u8>>,
}

impl InMemoryIndexFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the manifest payload.
    pub fn with_manifest(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.manifest = Some(bytes.into());
        self
    }

    /// Adds a shard payload under the given identifier.
    pub fn with_shard(mut self, id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.shards.insert(ShardId::new(id), bytes.into());
        self
    }
}

#[async_trait(?Send)]
impl IndexFetcher for InMemoryIndexFetcher {
    async fn fetch_manifest(&self) -> Result<Vec<u8>, FetchError> {
        self.manifest
            .clone()
            .ok_or_else(|| FetchError::NotFound("manifest".to_string()))
    }

    async fn fetch_shard(&self, id: &ShardId) -> Result<Vec<u8>, FetchError> {
        self.shards
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

/// Fetcher reading a generated index directory from the filesystem.
///
/// The directory layout matches the generator contract: one
/// `manifest.json` plus the shard files it references, all side by side.
#[derive(Debug, Clone)]
pub struct FsIndexFetcher {
    root: PathBuf,
}

impl FsIndexFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, file_name: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(file_name);
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
            _ => FetchError::Io(format!("{}: {}", path.display(), e)),
        })
    }
}

#[async_trait(?Send)]
impl IndexFetcher for FsIndexFetcher {
    async fn fetch_manifest(&self) -> Result<Vec<u8>, FetchError> {
        self.read(crate::config::MANIFEST_FILE_NAME)
    }

    async fn fetch_shard(&self, id: &ShardId) -> Result<Vec<u8>, FetchError> {
        self.read(id.as_str())
    }
}
