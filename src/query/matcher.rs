// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Predicate evaluation against documents.
//!
//! Implements the matching semantics the predicate language defines:
//! deep equality with cross-representation numeric comparison, ordered
//! comparison for numbers and strings, `$in` membership, and `$ne` holding
//! for a missing field. Dotted paths descend into nested objects; `"_id"`
//! compares against the normalized document id.

use std::cmp::Ordering;

use serde_json::Value;

use super::predicate::{CmpOp, FieldCondition, Predicate};
use crate::document::Document;

/// Does `doc` satisfy every clause of `predicate`?
pub(crate) fn matches(predicate: &Predicate, doc: &Document) -> bool {
    predicate.clauses().iter().all(|(field, condition)| {
        if field == "_id" {
            let id = Value::String(doc.id.normalized());
            eval(condition, Some(&id), true)
        } else {
            eval(condition, lookup_path(&doc.fields, field), false)
        }
    })
}

/// Resolve a dotted field path against a JSON value.
#[must_use]
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn eval(condition: &FieldCondition, actual: Option<&Value>, as_id: bool) -> bool {
    match condition {
        FieldCondition::Value(expected) => match actual {
            Some(actual) => {
                if as_id {
                    id_form(expected).map_or(false, |e| values_equal(actual, &e))
                } else {
                    values_equal(actual, expected)
                }
            }
            // A missing field only equals an explicit null.
            None => expected.is_null(),
        },
        FieldCondition::Ops(ops) => ops
            .iter()
            .all(|(op, operand)| eval_op(*op, operand, actual, as_id)),
    }
}

fn eval_op(op: CmpOp, operand: &Value, actual: Option<&Value>, as_id: bool) -> bool {
    let operand_id;
    let operand = if as_id {
        match id_form(operand) {
            Some(v) => {
                operand_id = v;
                &operand_id
            }
            None => return op == CmpOp::Ne,
        }
    } else {
        operand
    };

    match op {
        CmpOp::Ne => actual.map_or(true, |a| !values_equal(a, operand)),
        CmpOp::In => match (actual, operand) {
            (Some(a), Value::Array(candidates)) => candidates.iter().any(|c| values_equal(a, c)),
            _ => false,
        },
        CmpOp::Gt => ordered(actual, operand, |ord| ord == Ordering::Greater),
        CmpOp::Gte => ordered(actual, operand, |ord| ord != Ordering::Less),
        CmpOp::Lt => ordered(actual, operand, |ord| ord == Ordering::Less),
        CmpOp::Lte => ordered(actual, operand, |ord| ord != Ordering::Greater),
    }
}

fn ordered(actual: Option<&Value>, operand: &Value, check: impl Fn(Ordering) -> bool) -> bool {
    actual
        .and_then(|a| compare(a, operand))
        .map_or(false, check)
}

/// Deep equality, with numbers compared by value rather than representation
/// (so `1` equals `1.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Total order where one exists: numbers by value, strings lexicographically,
/// booleans false-before-true. Mixed or unordered types do not compare.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Map a predicate operand into normalized-id space: numbers and strings via
/// their normalized form, `{"$oid": ...}` via its hex.
fn id_form(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => Some(Value::String(s.clone())),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Object(map) => match (map.len(), map.get("$oid")) {
            (1, Some(Value::String(hex))) => Some(Value::String(hex.clone())),
            _ => None,
        },
        Value::Array(items) => {
            let mapped: Option<Vec<Value>> = items.iter().map(id_form).collect();
            mapped.map(Value::Array)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ObjectId;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        Document::new("d1", fields)
    }

    #[test]
    fn test_equality() {
        let p = Predicate::eq("name", "Alice");
        assert!(p.matches(&doc(json!({"name": "Alice"}))));
        assert!(!p.matches(&doc(json!({"name": "Bob"}))));
        assert!(!p.matches(&doc(json!({}))));
    }

    #[test]
    fn test_numeric_equality_across_representations() {
        let p = Predicate::eq("score", 1.0);
        assert!(p.matches(&doc(json!({"score": 1}))));
    }

    #[test]
    fn test_null_matches_missing_field() {
        let p = Predicate::eq("deleted_at", Value::Null);
        assert!(p.matches(&doc(json!({}))));
        assert!(p.matches(&doc(json!({"deleted_at": null}))));
        assert!(!p.matches(&doc(json!({"deleted_at": 5}))));
    }

    #[test]
    fn test_comparison_operators() {
        let d = doc(json!({"age": 30}));

        assert!(Predicate::gt("age", 29).matches(&d));
        assert!(!Predicate::gt("age", 30).matches(&d));
        assert!(Predicate::gte("age", 30).matches(&d));
        assert!(Predicate::lt("age", 31).matches(&d));
        assert!(Predicate::lte("age", 30).matches(&d));
        assert!(!Predicate::lte("age", 29).matches(&d));
    }

    #[test]
    fn test_string_ordering() {
        // Lexicographic comparison covers ISO-8601 timestamps.
        let d = doc(json!({"created_at": "2026-01-15T12:00:00Z"}));
        assert!(Predicate::lte("created_at", "2026-02-01T00:00:00Z").matches(&d));
        assert!(!Predicate::lte("created_at", "2026-01-01T00:00:00Z").matches(&d));
    }

    #[test]
    fn test_mixed_types_do_not_order() {
        let d = doc(json!({"age": "thirty"}));
        assert!(!Predicate::gt("age", 5).matches(&d));
        assert!(!Predicate::lt("age", 5).matches(&d));
    }

    #[test]
    fn test_ne_holds_for_missing_field() {
        let p = Predicate::ne("status", "closed");
        assert!(p.matches(&doc(json!({}))));
        assert!(p.matches(&doc(json!({"status": "open"}))));
        assert!(!p.matches(&doc(json!({"status": "closed"}))));
    }

    #[test]
    fn test_in_membership() {
        let p = Predicate::is_in("role", ["admin", "ops"]);
        assert!(p.matches(&doc(json!({"role": "ops"}))));
        assert!(!p.matches(&doc(json!({"role": "viewer"}))));
        assert!(!p.matches(&doc(json!({}))));
    }

    #[test]
    fn test_implicit_conjunction() {
        let p = Predicate::eq("name", "Alice").and(Predicate::gte("age", 21));
        assert!(p.matches(&doc(json!({"name": "Alice", "age": 30}))));
        assert!(!p.matches(&doc(json!({"name": "Alice", "age": 18}))));
    }

    #[test]
    fn test_bounded_range_on_one_field() {
        let p = Predicate::gte("age", 21).and(Predicate::lt("age", 65));
        assert!(p.matches(&doc(json!({"age": 21}))));
        assert!(p.matches(&doc(json!({"age": 64}))));
        assert!(!p.matches(&doc(json!({"age": 65}))));
        assert!(!p.matches(&doc(json!({"age": 18}))));
    }

    #[test]
    fn test_dotted_path() {
        let p = Predicate::eq("address.city", "Leeds");
        assert!(p.matches(&doc(json!({"address": {"city": "Leeds"}}))));
        assert!(!p.matches(&doc(json!({"address": {"city": "York"}}))));
        assert!(!p.matches(&doc(json!({"address": "Leeds"}))));
    }

    #[test]
    fn test_id_clause_uses_normalized_form() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let d = Document::new(oid, json!({}));

        assert!(Predicate::eq("_id", "507f1f77bcf86cd799439011").matches(&d));
        assert!(Predicate::eq("_id", json!({"$oid": "507f1f77bcf86cd799439011"})).matches(&d));

        let numeric = Document::new(42, json!({}));
        assert!(Predicate::eq("_id", 42).matches(&numeric));
        assert!(Predicate::eq("_id", "42").matches(&numeric));
    }

    #[test]
    fn test_id_in_clause() {
        let d = Document::new("id2", json!({}));
        assert!(Predicate::is_in("_id", ["id1", "id2"]).matches(&d));
        assert!(!Predicate::is_in("_id", ["id3"]).matches(&d));
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        assert!(Predicate::all().matches(&doc(json!({}))));
        assert!(Predicate::all().matches(&doc(json!({"anything": 1}))));
    }

    #[test]
    fn test_deep_object_equality() {
        let p = Predicate::eq("meta", json!({"a": 1, "b": [1, 2]}));
        assert!(p.matches(&doc(json!({"meta": {"b": [1, 2], "a": 1}}))));
        assert!(!p.matches(&doc(json!({"meta": {"a": 1}}))));
    }
}
