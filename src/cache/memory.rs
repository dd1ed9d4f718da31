// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bounded in-process cache store.
//!
//! The default store when none is injected: values are held in-process by
//! reference (no serialization boundary), entry count is bounded with
//! oldest-first eviction, and expiry is lazy, checked on read.
//!
//! Uses tokio's clock, so TTL behavior is testable under paused time.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::entry::CachedEntry;
use super::traits::{CacheError, CacheStore, FlushSupport};

struct Stored {
    entry: CachedEntry,
    expires_at: Option<Instant>,
}

impl Stored {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }
}

/// Bounded in-process TTL store.
pub struct InMemoryCache {
    entries: DashMap<String, Stored>,
    /// Insertion order for eviction (oldest first).
    order: Mutex<VecDeque<String>>,
    max_entries: usize,
}

impl InMemoryCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.order.lock().clear();
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        // Matches the default gateway bound.
        Self::new(1000)
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CachedEntry>, CacheError> {
        if let Some(stored) = self.entries.get(key) {
            if stored.is_expired() {
                drop(stored); // Release read lock before removing
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(stored.entry.clone()));
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        entry: CachedEntry,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let expires_at = ttl.map(|d| Instant::now() + d);
        let is_new = !self.entries.contains_key(key);

        if is_new && self.entries.len() >= self.max_entries {
            let mut order = self.order.lock();
            while self.entries.len() >= self.max_entries {
                if let Some(oldest) = order.pop_front() {
                    self.entries.remove(&oldest);
                } else {
                    break;
                }
            }
        }

        self.entries
            .insert(key.to_string(), Stored { entry, expires_at });

        if is_new {
            self.order.lock().push_back(key.to_string());
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    fn flush_support(&self) -> FlushSupport {
        FlushSupport::KeyIndex
    }
}
