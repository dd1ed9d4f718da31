// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Predicate AST for document filters.
//!
//! A [`Predicate`] is a set of field constraints combined with implicit AND.
//! Each field carries either a bare value (deep equality) or a set of
//! comparison operators:
//!
//! ```json
//! {"name": "Alice"}
//! {"age": {"$gte": 21, "$lt": 65}}
//! {"role": {"$in": ["admin", "ops"]}, "active": true}
//! ```
//!
//! Clause and operator maps are `BTreeMap`s, so the serialized form is
//! canonical: structurally equal predicates produce byte-identical JSON no
//! matter the order their clauses were added in. That serialization is the
//! cache-key suffix for query results.
//!
//! # Example
//!
//! ```
//! use doc_cache::Predicate;
//!
//! let a = Predicate::eq("name", "Alice").and(Predicate::gte("age", 21));
//! let b = Predicate::gte("age", 21).and(Predicate::eq("name", "Alice"));
//!
//! assert_eq!(a.canonical(), b.canonical());
//! assert_eq!(a.canonical(), r#"{"age":{"$gte":21},"name":"Alice"}"#);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;

/// Comparison operator, serialized in the backing store's `$`-prefixed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = "$gt")]
    Gt,
    #[serde(rename = "$gte")]
    Gte,
    #[serde(rename = "$in")]
    In,
    #[serde(rename = "$lt")]
    Lt,
    #[serde(rename = "$lte")]
    Lte,
    #[serde(rename = "$ne")]
    Ne,
}

/// Constraint on a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldCondition {
    /// Operator set, e.g. `{"$gte": 21, "$lt": 65}`. All operators must hold.
    Ops(BTreeMap<CmpOp, Value>),
    /// Bare value, deep equality.
    Value(Value),
}

/// A serializable document filter with implicit conjunction across fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate {
    clauses: BTreeMap<String, FieldCondition>,
}

impl Predicate {
    /// The empty predicate. Matches every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// `field == value` (deep equality).
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut clauses = BTreeMap::new();
        clauses.insert(field.into(), FieldCondition::Value(value.into()));
        Self { clauses }
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with_op(field, CmpOp::Ne, value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with_op(field, CmpOp::Gt, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with_op(field, CmpOp::Gte, value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with_op(field, CmpOp::Lt, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with_op(field, CmpOp::Lte, value.into())
    }

    /// `field` is any of `values`.
    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::with_op(field, CmpOp::In, Value::Array(values))
    }

    fn with_op(field: impl Into<String>, op: CmpOp, value: Value) -> Self {
        let mut ops = BTreeMap::new();
        ops.insert(op, value);
        let mut clauses = BTreeMap::new();
        clauses.insert(field.into(), FieldCondition::Ops(ops));
        Self { clauses }
    }

    /// Merge another predicate's clauses into this one (implicit AND).
    ///
    /// Operator sets on the same field merge; anything else on a colliding
    /// field is replaced by the right-hand side.
    #[must_use]
    pub fn and(mut self, other: Predicate) -> Self {
        for (field, condition) in other.clauses {
            match (self.clauses.get_mut(&field), condition) {
                (Some(FieldCondition::Ops(existing)), FieldCondition::Ops(incoming)) => {
                    existing.extend(incoming);
                }
                (_, condition) => {
                    self.clauses.insert(field, condition);
                }
            }
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// The canonical serialization: sorted fields, sorted operators.
    ///
    /// Structurally equal predicates always yield the identical string, which
    /// is what makes query cache keys deterministic.
    #[must_use]
    pub fn canonical(&self) -> String {
        // All map keys are strings, so serialization cannot fail.
        serde_json::to_string(&self.clauses).unwrap_or_default()
    }

    /// Evaluate this predicate against a document.
    ///
    /// These are the same semantics the in-crate backing store adapters use,
    /// which is what lets the query loader re-partition an OR-combined result
    /// union back into per-predicate result sets.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        super::matcher::matches(self, doc)
    }

    pub(crate) fn clauses(&self) -> &BTreeMap<String, FieldCondition> {
        &self.clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_is_insertion_order_independent() {
        let a = Predicate::eq("b", 2).and(Predicate::eq("a", 1));
        let b = Predicate::eq("a", 1).and(Predicate::eq("b", 2));

        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_operator_order_is_canonical() {
        let a = Predicate::lte("age", 65).and(Predicate::gte("age", 21));
        let b = Predicate::gte("age", 21).and(Predicate::lte("age", 65));

        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), r#"{"age":{"$gte":21,"$lte":65}}"#);
    }

    #[test]
    fn test_and_merges_operator_sets() {
        let p = Predicate::gte("age", 21).and(Predicate::lt("age", 65));

        match p.clauses().get("age") {
            Some(FieldCondition::Ops(ops)) => {
                assert_eq!(ops.len(), 2);
                assert_eq!(ops.get(&CmpOp::Gte), Some(&json!(21)));
                assert_eq!(ops.get(&CmpOp::Lt), Some(&json!(65)));
            }
            other => panic!("expected merged ops, got {other:?}"),
        }
    }

    #[test]
    fn test_and_replaces_equality_clause() {
        let p = Predicate::eq("name", "Alice").and(Predicate::eq("name", "Bob"));
        assert_eq!(p.canonical(), r#"{"name":"Bob"}"#);
    }

    #[test]
    fn test_serde_round_trip() {
        let p = Predicate::eq("name", "Alice")
            .and(Predicate::gte("age", 21))
            .and(Predicate::is_in("role", ["admin", "ops"]));

        let text = p.canonical();
        let back: Predicate = serde_json::from_str(&text).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_deserializes_equality_against_object() {
        // A bare object value with no operator keys is deep equality,
        // not an operator set.
        let p: Predicate = serde_json::from_str(r#"{"meta":{"kind":"x"}}"#).unwrap();
        match p.clauses().get("meta") {
            Some(FieldCondition::Value(v)) => assert_eq!(v, &json!({"kind": "x"})),
            other => panic!("expected equality clause, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_predicate() {
        let p = Predicate::all();
        assert!(p.is_empty());
        assert_eq!(p.canonical(), "{}");
    }
}
