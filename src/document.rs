//! Document data structures.
//!
//! The [`Document`] is the unit that flows through the caching layer: an
//! entity identifier plus an opaque JSON payload. The layer never interprets
//! the payload except through the predicate matcher and the identifier it
//! needs for result remapping.
//!
//! Identifiers arrive in three shapes (string, integer, 12-byte binary id)
//! and all of them reduce to one canonical string form via
//! [`DocumentId::normalized`]. Every internal lookup table is keyed by that
//! form only, so the binary and string renditions of the same id are
//! interchangeable at every API boundary.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A 12-byte binary object id.
///
/// Canonical string form is 24 lowercase hex characters.
///
/// # Example
///
/// ```
/// use doc_cache::{DocumentId, ObjectId};
///
/// let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
/// assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
///
/// // The binary and string forms normalize identically.
/// let a = DocumentId::from(oid);
/// let b = DocumentId::from("507f1f77bcf86cd799439011");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectId([u8; 12]);

/// Error parsing an [`ObjectId`] from its hex form.
#[derive(Debug, Error)]
pub enum ObjectIdError {
    #[error("object id must be 24 hex characters, got {0}")]
    Length(usize),
    #[error("object id is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl ObjectId {
    #[must_use]
    pub fn new(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Parse from the canonical 24-character hex form.
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != 24 {
            return Err(ObjectIdError::Length(s.len()));
        }
        let raw = hex::decode(s)?;
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Canonical lowercase hex rendering.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

/// Extended-JSON wire shape: `{"$oid": "<hex>"}`.
#[derive(Serialize, Deserialize)]
struct ObjectIdRepr {
    #[serde(rename = "$oid")]
    oid: String,
}

impl Serialize for ObjectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ObjectIdRepr { oid: self.to_hex() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = ObjectIdRepr::deserialize(deserializer)?;
        Self::parse_str(&repr.oid).map_err(serde::de::Error::custom)
    }
}

/// An entity identifier.
///
/// Equality, ordering into lookup tables, and cache-key derivation all go
/// through [`DocumentId::normalized`], so `DocumentId::from(42)` and
/// `DocumentId::from("42")` denote the same logical entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    ObjectId(ObjectId),
    String(String),
}

impl DocumentId {
    /// The canonical string form of this id.
    ///
    /// Pure and total: integers render in decimal, binary ids in hex,
    /// strings pass through unchanged.
    #[must_use]
    pub fn normalized(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::ObjectId(oid) => oid.to_hex(),
            Self::String(s) => s.clone(),
        }
    }
}

impl PartialEq for DocumentId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::ObjectId(a), Self::ObjectId(b)) => a == b,
            _ => self.normalized() == other.normalized(),
        }
    }
}

impl Eq for DocumentId {}

impl Hash for DocumentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for DocumentId {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self::ObjectId(oid)
    }
}

impl From<[u8; 12]> for DocumentId {
    fn from(bytes: [u8; 12]) -> Self {
        Self::ObjectId(ObjectId::new(bytes))
    }
}

/// An opaque record keyed by its entity identifier.
///
/// Serializes flat, with the id under `"_id"`:
///
/// ```json
/// {"_id": "id1", "name": "Alice", "age": 42}
/// ```
///
/// `fields` must be a JSON object; the identifier is carried separately and
/// is what result remapping and `"_id"` predicates operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub fields: Value,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a field by dotted path (`"address.city"`).
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&Value> {
        crate::query::lookup_path(&self.fields, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_object_id_round_trip() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
        assert_eq!(oid.bytes().len(), 12);
    }

    #[test]
    fn test_object_id_rejects_bad_input() {
        assert!(matches!(
            ObjectId::parse_str("abc"),
            Err(ObjectIdError::Length(3))
        ));
        assert!(matches!(
            ObjectId::parse_str("zzzf1f77bcf86cd799439011"),
            Err(ObjectIdError::Hex(_))
        ));
    }

    #[test]
    fn test_normalization_across_variants() {
        assert_eq!(DocumentId::from(42).normalized(), "42");
        assert_eq!(DocumentId::from("42").normalized(), "42");
        assert_eq!(
            DocumentId::from(ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap()).normalized(),
            "507f1f77bcf86cd799439011"
        );
    }

    #[test]
    fn test_cross_variant_equality() {
        assert_eq!(DocumentId::from(42), DocumentId::from("42"));

        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(
            DocumentId::from(oid),
            DocumentId::from("507f1f77bcf86cd799439011")
        );
    }

    #[test]
    fn test_cross_variant_hashing() {
        let mut map: HashMap<DocumentId, u32> = HashMap::new();
        map.insert(DocumentId::from(7), 1);

        // The string rendition reaches the same slot.
        assert_eq!(map.get(&DocumentId::from("7")), Some(&1));
    }

    #[test]
    fn test_id_serde_shapes() {
        assert_eq!(serde_json::to_value(DocumentId::from(5)).unwrap(), json!(5));
        assert_eq!(
            serde_json::to_value(DocumentId::from("id1")).unwrap(),
            json!("id1")
        );

        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(
            serde_json::to_value(DocumentId::from(oid)).unwrap(),
            json!({"$oid": "507f1f77bcf86cd799439011"})
        );

        let back: DocumentId =
            serde_json::from_value(json!({"$oid": "507f1f77bcf86cd799439011"})).unwrap();
        assert_eq!(back, DocumentId::from(oid));
    }

    #[test]
    fn test_document_serializes_flat() {
        let doc = Document::new("id1", json!({"name": "Alice", "age": 42}));
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value, json!({"_id": "id1", "name": "Alice", "age": 42}));

        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_document_field_lookup() {
        let doc = Document::new("id1", json!({"address": {"city": "Leeds"}}));
        assert_eq!(doc.field("address.city"), Some(&json!("Leeds")));
        assert_eq!(doc.field("address.street"), None);
    }

    #[test]
    fn test_document_without_id_fails_to_parse() {
        let result: Result<Document, _> = serde_json::from_value(json!({"name": "Alice"}));
        assert!(result.is_err());
    }
}
