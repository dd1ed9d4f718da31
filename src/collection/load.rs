// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Read-through loads.
//!
//! Cache failures here are soft: a read failure is a miss, a write failure
//! after a successful fetch is logged and swallowed. Only the backing store
//! can fail a load.

use tracing::{debug, warn};

use super::{CollectionCache, LoadOptions};
use crate::cache::CachedEntry;
use crate::document::{Document, DocumentId};
use crate::metrics;
use crate::query::Predicate;
use crate::storage::StoreError;

impl CollectionCache {
    /// Load one document by id.
    ///
    /// Checks the TTL cache first; on a miss, delegates to the id loader
    /// (coalescing with every other load of the current tick), then writes
    /// through iff `options` carries a positive TTL and a document was
    /// found. A missing document is `Ok(None)`.
    pub async fn load_one_by_id(
        &self,
        id: impl Into<DocumentId>,
        options: LoadOptions,
    ) -> Result<Option<Document>, StoreError> {
        let id = id.into();
        let key = self.codec.id_key(&id);

        if let Some(CachedEntry::Document(doc)) = self.cache_read(&key).await {
            return Ok(Some(doc));
        }

        let fetched = self.id_loader.load(id).await?;

        if let (Some(ttl), Some(doc)) = (options.effective_ttl(), fetched.as_ref()) {
            self.write_through(&key, CachedEntry::Document(doc.clone()), ttl)
                .await;
        }
        Ok(fetched)
    }

    /// Load many documents by id.
    ///
    /// Fans out to per-id read-through loads (each id takes its own
    /// cache-hit path) issued concurrently, so the misses still coalesce
    /// into one backing fetch at the loader layer. The result sequence
    /// matches the input in length and order.
    pub async fn load_many_by_ids(
        &self,
        ids: impl IntoIterator<Item = impl Into<DocumentId>>,
        options: LoadOptions,
    ) -> Result<Vec<Option<Document>>, StoreError> {
        let loads = ids
            .into_iter()
            .map(|id| self.load_one_by_id(id.into(), options));
        futures::future::try_join_all(loads).await
    }

    /// Load every document matching `predicate`.
    ///
    /// Same read-through pattern as [`load_one_by_id`](Self::load_one_by_id)
    /// under the query key. A cached empty result set is still a hit.
    pub async fn load_many_by_query(
        &self,
        predicate: Predicate,
        options: LoadOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let key = self.codec.query_key(&predicate);

        if let Some(CachedEntry::Documents(docs)) = self.cache_read(&key).await {
            return Ok(docs);
        }

        let fetched = self.query_loader.load(predicate).await?;

        if let Some(ttl) = options.effective_ttl() {
            self.write_through(&key, CachedEntry::Documents(fetched.clone()), ttl)
                .await;
        }
        Ok(fetched)
    }

    /// Consult the TTL cache, degrading any failure to a miss.
    async fn cache_read(&self, key: &str) -> Option<CachedEntry> {
        match self.cache.get(key).await {
            Ok(Some(entry)) => {
                debug!(key, "cache hit");
                metrics::record_cache_lookup(&self.collection, "hit");
                Some(entry)
            }
            Ok(None) => {
                debug!(key, "cache miss");
                metrics::record_cache_lookup(&self.collection, "miss");
                None
            }
            Err(err) => {
                warn!(key, error = %err, "cache read failed, treating as miss");
                metrics::record_cache_lookup(&self.collection, "miss");
                None
            }
        }
    }

    /// Persist a fetched result and register its key for bulk invalidation.
    /// Failures are logged and swallowed; the result is served regardless.
    async fn write_through(&self, key: &str, entry: CachedEntry, ttl: std::time::Duration) {
        match self.cache.set(key, entry, Some(ttl)).await {
            Ok(()) => {
                debug!(key, ttl_secs = ttl.as_secs(), "cached with ttl");
                metrics::record_write_through(&self.collection);
                if self.allow_flushing {
                    self.key_index.register(key, ttl).await;
                    metrics::record_key_registered(&self.collection);
                }
            }
            Err(err) => {
                warn!(key, error = %err, "cache write failed, serving fetched result");
            }
        }
    }
}
