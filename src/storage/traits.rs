use async_trait::async_trait;
use thiserror::Error;

use crate::document::{Document, DocumentId};
use crate::query::Predicate;

/// Errors surfaced by a backing store fetch.
///
/// `Clone` because one dispatched batch fans its outcome back out to every
/// caller coalesced into it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("backing store error: {0}")]
    Backend(String),
    /// The dispatching task died before delivering a result.
    #[error("batched fetch was dropped before completing")]
    Dropped,
}

/// Minimal polymorphic interface over a document collection.
///
/// Two flavors exist in this crate, selected at construction time:
/// [`MemoryCollection`](super::MemoryCollection) returns plain JSON records,
/// [`MappedCollection`](super::MappedCollection) projects typed records
/// through serde. The loaders only ever see this trait.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Name of the backing system; becomes the second cache-key segment.
    fn backing_name(&self) -> &str;

    /// Collection name; becomes the third cache-key segment.
    fn collection_name(&self) -> &str;

    /// Fetch every document whose id is in `ids`.
    ///
    /// Result order and completeness are unspecified; an absent id is simply
    /// not represented in the output. Callers remap by normalized id.
    async fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, StoreError>;

    /// Fetch the deduplicated union of documents matching any of `queries`
    /// (logical OR), in the store's natural retrieval order.
    async fn fetch_by_queries(&self, queries: &[Predicate]) -> Result<Vec<Document>, StoreError>;
}
