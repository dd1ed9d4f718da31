use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// What the gateway stores in a cache slot.
///
/// Serde round-trips through JSON for serialization-boundary stores;
/// reference-holding stores keep the value as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CachedEntry {
    /// A single id-lookup result.
    Document(Document),
    /// A query result set. May be empty; an empty set is still a hit.
    Documents(Vec<Document>),
    /// The collection's key index.
    Keys(BTreeSet<String>),
}

impl CachedEntry {
    #[must_use]
    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_documents(self) -> Option<Vec<Document>> {
        match self {
            Self::Documents(docs) => Some(docs),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_keys(self) -> Option<BTreeSet<String>> {
        match self {
            Self::Keys(keys) => Some(keys),
            _ => None,
        }
    }
}
