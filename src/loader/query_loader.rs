// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Batching loader for predicate queries.
//!
//! Coalesces concurrently issued predicate loads into one
//! [`BackingStore::fetch_by_queries`] call shaped as the logical OR of the
//! batch. The store returns the union of matching documents once; the loader
//! re-partitions that union by re-evaluating each original predicate, so
//! overlapping predicates each get their own independent result sequence.
//! Per-predicate order follows the union's retrieval order; nothing more is
//! guaranteed, because the backing store guarantees nothing more either.

use std::sync::Arc;

use tracing::debug;

use super::coalesce::Coalescer;
use crate::document::Document;
use crate::metrics;
use crate::query::Predicate;
use crate::storage::{BackingStore, StoreError};

pub struct QueryLoader {
    store: Arc<dyn BackingStore>,
    coalescer: Arc<Coalescer<Predicate, Vec<Document>>>,
}

impl QueryLoader {
    #[must_use]
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            coalescer: Arc::new(Coalescer::new()),
        }
    }

    /// Load every document matching `predicate`, coalescing with the other
    /// query loads of the current tick. Structurally equal predicates share
    /// one flight (they coalesce by canonical serialization).
    pub async fn load(&self, predicate: Predicate) -> Result<Vec<Document>, StoreError> {
        let key = predicate.canonical();

        let (rx, opened_batch) = self.coalescer.enqueue(&key, || predicate);
        if opened_batch {
            let store = Arc::clone(&self.store);
            let coalescer = Arc::clone(&self.coalescer);
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                Self::dispatch(store, coalescer).await;
            });
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Dropped),
        }
    }

    /// Detach the in-flight entry for a canonical predicate serialization.
    pub fn invalidate(&self, canonical: &str) {
        self.coalescer.invalidate(canonical);
    }

    async fn dispatch(
        store: Arc<dyn BackingStore>,
        coalescer: Arc<Coalescer<Predicate, Vec<Document>>>,
    ) {
        let batch = coalescer.take_batch();
        if batch.is_empty() {
            return;
        }

        let queries: Vec<Predicate> = batch.iter().map(|f| f.request.clone()).collect();
        debug!(
            collection = store.collection_name(),
            batch = queries.len(),
            "dispatching query batch"
        );
        metrics::record_dispatch(store.collection_name(), "queries", queries.len());

        match store.fetch_by_queries(&queries).await {
            Ok(union) => {
                for flight in &batch {
                    let matched: Vec<Document> = union
                        .iter()
                        .filter(|doc| flight.request.matches(doc))
                        .cloned()
                        .collect();
                    coalescer.complete(flight, Ok(matched));
                }
            }
            Err(err) => {
                for flight in &batch {
                    coalescer.complete(flight, Err(err.clone()));
                }
            }
        }
    }
}
