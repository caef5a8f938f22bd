//! Immutable symbol index, partitioned into lazily loaded shards.
//!
//! The index is built once by the documentation generator and never changes
//! within a page session. It consists of a partition manifest plus one
//! shard file per leading-character partition.
//!
//! # Architecture
//!
//! - `types`: data model (entries, shards, manifest) and wire parsing
//! - `fetch`: transport abstraction over the static index files
//! - `store`: manifest resolution and the session-scoped shard cache
//!
//! # Usage
//!
//! ```ignore
//! use waystone_core::index::{FsIndexFetcher, IndexStore};
//!
//! let store = IndexStore::load(FsIndexFetcher::new("./search")).await?;
//! let shard_id = store.shard_for('s').expect("partition listed");
//! let shard = store.ensure_loaded(shard_id).await?;
//! for entry in shard.entries_matching("set") {
//!     println!("{} -> {}", entry.name, entry.anchor_url);
//! }
//! ```

pub mod fetch;
pub mod store;
pub mod types;

pub use fetch::{FetchError, FsIndexFetcher, InMemoryIndexFetcher, IndexFetcher};
pub use store::IndexStore;
pub use types::{
    normalize_key, IndexError, IndexManifest, KeyGroup, PartitionKey, PartitionRecord, Shard,
    ShardFormatError, ShardId, SymbolEntry, SymbolKind,
};
