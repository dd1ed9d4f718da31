// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Invalidation: targeted deletes, the key index, and collection flushes.
//!
//! Many cache backends have no affordable "enumerate keys by prefix"
//! primitive, so the gateway keeps a sidecar index of every key it wrote
//! with a TTL. Flush cost is then proportional to keys-for-this-collection,
//! not keys-in-the-whole-store. Backends that do scan natively declare
//! [`FlushSupport::PrefixScan`] and skip the index entirely.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::CollectionCache;
use crate::cache::{CacheError, CacheStore, CachedEntry, FlushSupport};
use crate::document::{DocumentId, ObjectId};
use crate::metrics;
use crate::query::Predicate;

/// What a targeted invalidation points at: an id or a predicate.
#[derive(Debug, Clone)]
pub enum CacheTarget {
    Id(DocumentId),
    Query(Predicate),
}

impl From<DocumentId> for CacheTarget {
    fn from(id: DocumentId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for CacheTarget {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}

impl From<String> for CacheTarget {
    fn from(id: String) -> Self {
        Self::Id(id.into())
    }
}

impl From<i64> for CacheTarget {
    fn from(id: i64) -> Self {
        Self::Id(id.into())
    }
}

impl From<ObjectId> for CacheTarget {
    fn from(id: ObjectId) -> Self {
        Self::Id(id.into())
    }
}

impl From<Predicate> for CacheTarget {
    fn from(predicate: Predicate) -> Self {
        Self::Query(predicate)
    }
}

/// Result of [`CollectionCache::flush_collection_cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Flushing was not enabled at setup; nothing happened.
    Disabled,
    /// Every recorded key for the collection was deleted.
    Flushed { deleted: usize },
}

impl FlushOutcome {
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl CollectionCache {
    /// Delete a single cached entry, by id or by predicate.
    ///
    /// Also detaches the matching in-flight loader entry, so a load issued
    /// after this call fetches fresh instead of joining a possibly-stale
    /// flight, and drops the key from the key index when flushing is
    /// enabled.
    pub async fn delete_from_cache(
        &self,
        target: impl Into<CacheTarget>,
    ) -> Result<(), CacheError> {
        let target = target.into();
        let (key, kind) = match &target {
            CacheTarget::Id(id) => {
                self.id_loader.invalidate(&id.normalized());
                (self.codec.id_key(id), "id")
            }
            CacheTarget::Query(predicate) => {
                let canonical = predicate.canonical();
                self.query_loader.invalidate(&canonical);
                (self.codec.query_key(predicate), "query")
            }
        };

        self.cache.delete(&key).await?;
        if self.allow_flushing {
            self.key_index.remove(&key).await;
        }

        debug!(key, kind, "deleted from cache");
        metrics::record_invalidation(&self.collection, kind);
        Ok(())
    }

    /// Delete every key ever recorded for this collection.
    ///
    /// A no-op returning [`FlushOutcome::Disabled`] unless
    /// `allow_flushing_collection_cache` was set at setup. The strategy
    /// follows the cache store's declared capability: prefix-scanning stores
    /// are swept directly; everything else walks the key index and resets it.
    pub async fn flush_collection_cache(&self) -> Result<FlushOutcome, CacheError> {
        if !self.allow_flushing {
            return Ok(FlushOutcome::Disabled);
        }

        let deleted = match self.cache.flush_support() {
            FlushSupport::PrefixScan => {
                self.cache.delete_prefix(self.codec.prefix()).await? as usize
            }
            FlushSupport::KeyIndex => {
                let keys = self.key_index.read().await?;
                for key in &keys {
                    self.cache.delete(key).await?;
                }
                self.key_index.reset().await?;
                keys.len()
            }
        };

        debug!(collection = %self.collection, deleted, "flushed collection cache");
        metrics::record_flush(&self.collection, deleted);
        Ok(FlushOutcome::Flushed { deleted })
    }
}

/// The sidecar record of every TTL-cached key for one collection, stored in
/// the cache itself under a reserved key.
///
/// Mutation is read-modify-write with no compare-and-swap: concurrent
/// writers can under-record a key (last writer wins). A lost entry only
/// means a future flush misses that key's eager cleanup; its own TTL still
/// expires it.
pub(super) struct KeyIndex {
    cache: Arc<dyn CacheStore>,
    index_key: String,
}

impl KeyIndex {
    pub fn new(cache: Arc<dyn CacheStore>, index_key: String) -> Self {
        Self { cache, index_key }
    }

    /// Record `key`, idempotently. The index is written with the same TTL as
    /// the entry that triggered the registration. Failures are soft.
    pub async fn register(&self, key: &str, ttl: Duration) {
        let mut keys = match self.current().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "key index read failed, skipping registration");
                return;
            }
        };

        if !keys.insert(key.to_string()) {
            debug!(key, total = keys.len(), "key index: already recorded");
            return;
        }

        let total = keys.len();
        if let Err(err) = self
            .cache
            .set(&self.index_key, CachedEntry::Keys(keys), Some(ttl))
            .await
        {
            warn!(key, error = %err, "key index write failed");
        } else {
            debug!(key, total, "key index: recorded");
        }
    }

    /// Drop `key` from the index. Failures are soft.
    pub async fn remove(&self, key: &str) {
        let mut keys = match self.current().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "key index read failed, skipping removal");
                return;
            }
        };

        if !keys.remove(key) {
            return;
        }

        if let Err(err) = self
            .cache
            .set(&self.index_key, CachedEntry::Keys(keys), None)
            .await
        {
            warn!(key, error = %err, "key index write failed");
        }
    }

    /// Read the current key set for a flush. An absent or malformed index
    /// reads as empty; a store failure surfaces (flush has no fallback).
    pub async fn read(&self) -> Result<BTreeSet<String>, CacheError> {
        self.current().await
    }

    /// Reset the index to empty.
    pub async fn reset(&self) -> Result<(), CacheError> {
        self.cache
            .set(&self.index_key, CachedEntry::Keys(BTreeSet::new()), None)
            .await
    }

    async fn current(&self) -> Result<BTreeSet<String>, CacheError> {
        Ok(self
            .cache
            .get(&self.index_key)
            .await?
            .and_then(CachedEntry::into_keys)
            .unwrap_or_default())
    }
}
