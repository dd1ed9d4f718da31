// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Batching loader for point lookups.
//!
//! Coalesces concurrently issued single-id loads into one
//! [`BackingStore::fetch_by_ids`] call per tick, deduplicated by normalized
//! id, then remaps the store's possibly reordered, possibly sparse output
//! back onto each original request. An id the store does not return resolves
//! to `None` for that caller; a store failure resolves every caller of the
//! batch with the same error.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::coalesce::Coalescer;
use crate::document::{Document, DocumentId};
use crate::metrics;
use crate::storage::{BackingStore, StoreError};

pub struct IdLoader {
    store: Arc<dyn BackingStore>,
    coalescer: Arc<Coalescer<DocumentId, Option<Document>>>,
}

impl IdLoader {
    #[must_use]
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            coalescer: Arc::new(Coalescer::new()),
        }
    }

    /// Load one document by id, coalescing with every other load issued
    /// before the current tick yields. A missing document is `Ok(None)`,
    /// not an error.
    pub async fn load(&self, id: impl Into<DocumentId>) -> Result<Option<Document>, StoreError> {
        let id = id.into();
        let key = id.normalized();

        let (rx, opened_batch) = self.coalescer.enqueue(&key, || id);
        if opened_batch {
            let store = Arc::clone(&self.store);
            let coalescer = Arc::clone(&self.coalescer);
            tokio::spawn(async move {
                // Let every load of the current tick enqueue first.
                tokio::task::yield_now().await;
                Self::dispatch(store, coalescer).await;
            });
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Dropped),
        }
    }

    /// Load many ids; the result sequence matches the input in length and
    /// order, with `None` holes for ids the store did not return.
    pub async fn load_many(
        &self,
        ids: impl IntoIterator<Item = impl Into<DocumentId>>,
    ) -> Result<Vec<Option<Document>>, StoreError> {
        let loads = ids.into_iter().map(|id| self.load(id));
        futures::future::try_join_all(loads).await
    }

    /// Detach the in-flight entry for a normalized id, so loads issued after
    /// an explicit delete never attach to a possibly-stale flight.
    pub fn invalidate(&self, normalized_id: &str) {
        self.coalescer.invalidate(normalized_id);
    }

    async fn dispatch(
        store: Arc<dyn BackingStore>,
        coalescer: Arc<Coalescer<DocumentId, Option<Document>>>,
    ) {
        let batch = coalescer.take_batch();
        if batch.is_empty() {
            return;
        }

        // One flight per normalized id, so this set is already deduplicated.
        let ids: Vec<DocumentId> = batch.iter().map(|f| f.request.clone()).collect();
        debug!(collection = store.collection_name(), batch = ids.len(), "dispatching id batch");
        metrics::record_dispatch(store.collection_name(), "ids", ids.len());

        match store.fetch_by_ids(&ids).await {
            Ok(docs) => {
                let mut by_id: HashMap<String, Document> = docs
                    .into_iter()
                    .map(|doc| (doc.id.normalized(), doc))
                    .collect();
                for flight in &batch {
                    let doc = by_id.remove(&flight.key);
                    coalescer.complete(flight, Ok(doc));
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

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use crate::query::Predicate;

    /// Records every id batch it is asked for; optionally scrambles output
    /// order and fails on demand.
    struct RecordingStore {
        docs: Vec<Document>,
        batches: Mutex<Vec<Vec<String>>>,
        reverse: bool,
        fail: bool,
    }

    impl RecordingStore {
        fn new(docs: Vec<Document>) -> Self {
            Self {
                docs,
                batches: Mutex::new(Vec::new()),
                reverse: false,
                fail: false,
            }
        }

        fn batches(&self) -> Vec<Vec<String>> {
            self.batches.lock().clone()
        }
    }

    #[async_trait]
    impl BackingStore for RecordingStore {
        fn backing_name(&self) -> &str {
            "memory"
        }

        fn collection_name(&self) -> &str {
            "test"
        }

        async fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, StoreError> {
            self.batches
                .lock()
                .push(ids.iter().map(DocumentId::normalized).collect());
            if self.fail {
                return Err(StoreError::Backend("store down".into()));
            }
            let mut found: Vec<Document> = self
                .docs
                .iter()
                .filter(|d| ids.iter().any(|id| *id == d.id))
                .cloned()
                .collect();
            if self.reverse {
                found.reverse();
            }
            Ok(found)
        }

        async fn fetch_by_queries(&self, _: &[Predicate]) -> Result<Vec<Document>, StoreError> {
            unimplemented!("id loader never queries")
        }
    }

    fn doc(id: &str) -> Document {
        Document::new(id, json!({"id": id}))
    }

    #[tokio::test]
    async fn test_concurrent_loads_coalesce_into_one_call() {
        let store = Arc::new(RecordingStore::new(vec![doc("a"), doc("b"), doc("c")]));
        let loader = IdLoader::new(store.clone());

        let (a, b, c) = tokio::join!(loader.load("a"), loader.load("b"), loader.load("c"));

        assert_eq!(a.unwrap().unwrap().id, DocumentId::from("a"));
        assert_eq!(b.unwrap().unwrap().id, DocumentId::from("b"));
        assert_eq!(c.unwrap().unwrap().id, DocumentId::from("c"));

        let batches = store.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_deduplicated() {
        let store = Arc::new(RecordingStore::new(vec![doc("a")]));
        let loader = IdLoader::new(store.clone());

        let (r1, r2, r3) = tokio::join!(loader.load("a"), loader.load("a"), loader.load("a"));

        assert!(r1.unwrap().is_some());
        assert!(r2.unwrap().is_some());
        assert!(r3.unwrap().is_some());

        let batches = store.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], ["a"]);
    }

    #[tokio::test]
    async fn test_binary_and_string_forms_coalesce() {
        use crate::document::ObjectId;

        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let store = Arc::new(RecordingStore::new(vec![Document::new(oid, json!({}))]));
        let loader = IdLoader::new(store.clone());

        let (r1, r2) = tokio::join!(
            loader.load(oid),
            loader.load("507f1f77bcf86cd799439011")
        );

        assert!(r1.unwrap().is_some());
        assert!(r2.unwrap().is_some());
        assert_eq!(store.batches()[0].len(), 1);
    }

    #[tokio::test]
    async fn test_load_many_preserves_order_with_gaps() {
        let mut store = RecordingStore::new(vec![doc("a"), doc("c")]);
        store.reverse = true; // store returns documents out of request order
        let loader = IdLoader::new(Arc::new(store));

        let results = loader.load_many(["a", "missing", "c"]).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id, DocumentId::from("a"));
        assert!(results[1].is_none());
        assert_eq!(results[2].as_ref().unwrap().id, DocumentId::from("c"));
    }

    #[tokio::test]
    async fn test_sequential_loads_are_separate_batches() {
        let store = Arc::new(RecordingStore::new(vec![doc("a")]));
        let loader = IdLoader::new(store.clone());

        loader.load("a").await.unwrap();
        loader.load("a").await.unwrap();

        // No cross-tick memo: two ticks, two fetches.
        assert_eq!(store.batches().len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_reaches_every_waiter() {
        let mut store = RecordingStore::new(vec![]);
        store.fail = true;
        let loader = IdLoader::new(Arc::new(store));

        let (r1, r2) = tokio::join!(loader.load("a"), loader.load("b"));

        assert_eq!(r1, Err(StoreError::Backend("store down".into())));
        assert_eq!(r2, Err(StoreError::Backend("store down".into())));
    }
}
