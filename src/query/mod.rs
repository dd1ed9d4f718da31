// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Predicate language.
//!
//! Structured document filters with a canonical serialization:
//!
//! ```text
//! Predicate (field -> condition, implicit AND)
//!     ├─→ canonical()  → deterministic JSON, the query cache-key suffix
//!     └─→ matches(doc) → evaluation, used to re-partition OR-batched results
//! ```
//!
//! ```
//! use doc_cache::{Document, Predicate};
//! use serde_json::json;
//!
//! let adults = Predicate::gte("age", 18).and(Predicate::eq("active", true));
//! let doc = Document::new("u1", json!({"age": 34, "active": true}));
//! assert!(adults.matches(&doc));
//! ```

mod matcher;
mod predicate;

pub use matcher::lookup_path;
pub use predicate::{CmpOp, FieldCondition, Predicate};
