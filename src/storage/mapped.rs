use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;

use super::traits::{BackingStore, StoreError};
use crate::document::{Document, DocumentId};
use crate::query::Predicate;

/// A typed record that can live in a [`MappedCollection`].
pub trait CollectionModel: Serialize + Send + Sync {
    /// The identifier the record is keyed by.
    fn document_id(&self) -> DocumentId;
}

/// In-memory collection of typed records, the object-mapped flavor.
///
/// Records are projected through serde into [`Document`]s at fetch time, so
/// the caching layer sees the same shape either flavor produces. A record
/// that does not serialize to a JSON object fails the fetch, which is how
/// malformed data surfaces here.
pub struct MappedCollection<T> {
    name: String,
    records: RwLock<BTreeMap<String, T>>,
}

impl<T: CollectionModel> MappedCollection<T> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn insert(&self, record: T) -> Option<T> {
        self.records
            .write()
            .insert(record.document_id().normalized(), record)
    }

    pub fn insert_many(&self, records: impl IntoIterator<Item = T>) {
        let mut guard = self.records.write();
        for record in records {
            guard.insert(record.document_id().normalized(), record);
        }
    }

    pub fn remove(&self, id: &DocumentId) -> Option<T> {
        self.records.write().remove(&id.normalized())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn project(record: &T) -> Result<Document, StoreError> {
        let fields = serde_json::to_value(record)
            .map_err(|e| StoreError::Backend(format!("record projection failed: {e}")))?;
        Ok(Document::new(record.document_id(), fields))
    }
}

#[async_trait]
impl<T: CollectionModel> BackingStore for MappedCollection<T> {
    fn backing_name(&self) -> &str {
        "mapped"
    }

    fn collection_name(&self) -> &str {
        &self.name
    }

    async fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, StoreError> {
        let records = self.records.read();
        ids.iter()
            .filter_map(|id| records.get(&id.normalized()))
            .map(Self::project)
            .collect()
    }

    async fn fetch_by_queries(&self, queries: &[Predicate]) -> Result<Vec<Document>, StoreError> {
        let records = self.records.read();
        let mut union = Vec::new();
        for record in records.values() {
            let doc = Self::project(record)?;
            if queries.iter().any(|q| q.matches(&doc)) {
                union.push(doc);
            }
        }
        Ok(union)
    }
}
