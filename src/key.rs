// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cache-key derivation.
//!
//! Keys take the form `db:<backing>:<collection>:<suffix>` where the suffix
//! is a normalized document id or a canonical predicate serialization.
//! Derivation is a pure function of its inputs; the same logical entity
//! always maps to the same key.

use crate::document::DocumentId;
use crate::query::Predicate;

/// Reserved suffix for the collection's key index.
const INDEX_SUFFIX: &str = "all-keys";

/// Derives cache keys for one collection.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    #[must_use]
    pub fn new(backing: &str, collection: &str) -> Self {
        Self {
            prefix: format!("db:{backing}:{collection}:"),
        }
    }

    /// The shared prefix of every key this codec derives, including the
    /// index key. Prefix-scanning flush strategies delete under this.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn id_key(&self, id: &DocumentId) -> String {
        format!("{}{}", self.prefix, id.normalized())
    }

    #[must_use]
    pub fn query_key(&self, predicate: &Predicate) -> String {
        format!("{}{}", self.prefix, predicate.canonical())
    }

    /// The reserved key the collection's key index lives under.
    #[must_use]
    pub fn index_key(&self) -> String {
        format!("{}{INDEX_SUFFIX}", self.prefix)
    }
}
