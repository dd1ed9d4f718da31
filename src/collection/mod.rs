// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Collection cache gateway.
//!
//! The [`CollectionCache`] ties the layers together: TTL cache in front,
//! batching loaders behind it, key codec in between, and the invalidation
//! surface on the side.
//!
//! ```text
//! load_one_by_id / load_many_by_query
//!         │
//!         ▼
//! ┌──────────────────────────────┐
//! │  TTL cache (injected store)  │── hit ──→ return cached result
//! └──────────────────────────────┘
//!         │ miss
//!         ▼
//! ┌──────────────────────────────┐
//! │  Batching loader (per tick)  │── one fetch per coalesced batch
//! └──────────────────────────────┘
//!         │
//!         ▼
//!   write-through iff a positive TTL was requested,
//!   registering the key for later bulk invalidation
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use doc_cache::{CollectionCache, CollectionCacheConfig, Document, LoadOptions, MemoryCollection};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryCollection::new("users"));
//! store.insert(Document::new("u1", json!({"name": "Alice"})));
//!
//! let cache = CollectionCache::new(store, CollectionCacheConfig::default());
//!
//! let doc = cache.load_one_by_id("u1", LoadOptions::ttl(60)).await.unwrap();
//! assert!(doc.is_some());
//! # }
//! ```

mod invalidate;
mod load;

pub use invalidate::{CacheTarget, FlushOutcome};

use std::sync::Arc;

use crate::cache::{CacheStore, InMemoryCache};
use crate::config::CollectionCacheConfig;
use crate::key::KeyCodec;
use crate::loader::{IdLoader, QueryLoader};
use crate::storage::BackingStore;

use invalidate::KeyIndex;

/// Per-load options. A positive TTL is the only trigger for persistence:
/// without one, results live exactly as long as the loader's coalescing
/// tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Time-to-live in seconds for the cached result. `None` or `0` means
    /// "do not persist past this request".
    pub ttl: Option<u64>,
}

impl LoadOptions {
    /// No persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist the result for `secs` seconds.
    #[must_use]
    pub fn ttl(secs: u64) -> Self {
        Self { ttl: Some(secs) }
    }

    pub(crate) fn effective_ttl(&self) -> Option<std::time::Duration> {
        self.ttl
            .filter(|&secs| secs > 0)
            .map(std::time::Duration::from_secs)
    }
}

/// Read-through, write-through TTL cache over one document collection.
///
/// Construct once per collection; the instance is `Send + Sync` and designed
/// for concurrent use. Key-index maintenance is read-modify-write without
/// compare-and-swap; concurrent writers can under-record a key, which only
/// defers that key's cleanup to its own TTL.
pub struct CollectionCache {
    pub(super) store: Arc<dyn BackingStore>,
    pub(super) cache: Arc<dyn CacheStore>,
    pub(super) codec: KeyCodec,
    pub(super) collection: String,
    pub(super) id_loader: IdLoader,
    pub(super) query_loader: QueryLoader,
    pub(super) key_index: KeyIndex,
    pub(super) allow_flushing: bool,
}

impl CollectionCache {
    /// Create a cache over `store` with the default bounded in-process
    /// cache store.
    #[must_use]
    pub fn new(store: Arc<dyn BackingStore>, config: CollectionCacheConfig) -> Self {
        let cache = Arc::new(InMemoryCache::new(config.max_cached_entries));
        Self::with_cache(store, cache, config)
    }

    /// Create a cache over `store` with an injected cache store.
    #[must_use]
    pub fn with_cache(
        store: Arc<dyn BackingStore>,
        cache: Arc<dyn CacheStore>,
        config: CollectionCacheConfig,
    ) -> Self {
        let codec = KeyCodec::new(store.backing_name(), store.collection_name());
        let collection = store.collection_name().to_string();
        let key_index = KeyIndex::new(Arc::clone(&cache), codec.index_key());

        Self {
            id_loader: IdLoader::new(Arc::clone(&store)),
            query_loader: QueryLoader::new(Arc::clone(&store)),
            store,
            cache,
            codec,
            collection,
            key_index,
            allow_flushing: config.allow_flushing_collection_cache,
        }
    }

    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// The codec deriving this collection's cache keys.
    #[must_use]
    pub fn key_codec(&self) -> &KeyCodec {
        &self.codec
    }
}
