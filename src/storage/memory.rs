use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{BackingStore, StoreError};
use crate::document::{Document, DocumentId};
use crate::query::Predicate;

/// In-memory document collection, the plain-record flavor.
///
/// Documents are held as raw JSON records keyed by normalized id and
/// retrieved in ascending id order, which is this adapter's natural
/// retrieval order for query results.
pub struct MemoryCollection {
    name: String,
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryCollection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert or replace a document, returning the previous one if any.
    pub fn insert(&self, doc: Document) -> Option<Document> {
        self.docs.write().insert(doc.id.normalized(), doc)
    }

    pub fn insert_many(&self, docs: impl IntoIterator<Item = Document>) {
        let mut guard = self.docs.write();
        for doc in docs {
            guard.insert(doc.id.normalized(), doc);
        }
    }

    pub fn remove(&self, id: &DocumentId) -> Option<Document> {
        self.docs.write().remove(&id.normalized())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    pub fn clear(&self) {
        self.docs.write().clear();
    }
}

#[async_trait]
impl BackingStore for MemoryCollection {
    fn backing_name(&self) -> &str {
        "memory"
    }

    fn collection_name(&self) -> &str {
        &self.name
    }

    async fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read();
        Ok(ids
            .iter()
            .filter_map(|id| docs.get(&id.normalized()).cloned())
            .collect())
    }

    async fn fetch_by_queries(&self, queries: &[Predicate]) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read();
        Ok(docs
            .values()
            .filter(|doc| queries.iter().any(|q| q.matches(doc)))
            .cloned()
            .collect())
    }
}
