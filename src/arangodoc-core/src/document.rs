//! Dynamic document container and its JSON boundary.
//!
//! A `Document` is a string-keyed map of `Value`s backed by a `BTreeMap`, so
//! iteration order is deterministic. Path-addressed access lives in
//! `crate::path`, typed access in `crate::accessors`.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::error::{DocumentError, Result};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Top-level field lookup (no path parsing)
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Insert a top-level field, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub(crate) fn entry(&mut self, name: String) -> btree_map::Entry<'_, String, Value> {
        self.fields.entry(name)
    }

    /// Parse a JSON object into a document
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(Self::from(map)),
            other => Err(DocumentError::InvalidFieldType {
                path: "$root".to_string(),
                expected: "document",
                found: Value::from(other).type_name(),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Document {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Document(Document::from(map)),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            // Non-finite floats have no JSON form
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Guid(g) => serde_json::Value::String(g.hyphenated().to_string()),
            Value::Enum { name, .. } => serde_json::Value::String(name.clone()),
            Value::Document(doc) => serde_json::Value::from(doc),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
        }
    }
}

impl From<&Document> for serde_json::Value {
    fn from(doc: &Document) -> Self {
        serde_json::Value::Object(
            doc.iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                .collect(),
        )
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Decimal(d) => serializer.serialize_str(&d.to_string()),
            Value::String(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::Guid(g) => serializer.serialize_str(&g.hyphenated().to_string()),
            Value::Enum { name, .. } => serializer.serialize_str(name),
            Value::Document(doc) => doc.serialize(serializer),
            Value::List(items) => serializer.collect_seq(items),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(&self.fields)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Document::from(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_maps_kinds() {
        let doc = Document::from_json(json!({
            "n": null,
            "b": true,
            "i": 42,
            "f": 1.5,
            "s": "text",
            "l": [1, "two"],
            "d": {"inner": 1}
        }))
        .unwrap();

        assert_eq!(doc.get("n"), Some(&Value::Null));
        assert_eq!(doc.get("b"), Some(&Value::Bool(true)));
        assert_eq!(doc.get("i"), Some(&Value::Int(42)));
        assert_eq!(doc.get("f"), Some(&Value::Float(1.5)));
        assert_eq!(doc.get("s"), Some(&Value::from("text")));
        assert_eq!(
            doc.get("l"),
            Some(&Value::List(vec![Value::Int(1), Value::from("two")]))
        );
        assert!(doc.get("d").unwrap().as_document().is_some());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Document::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidFieldType { found: "list", .. }));
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let mut doc = Document::new();
        doc.insert("guid", Value::Guid(uuid::Uuid::nil()));
        doc.insert(
            "level",
            Value::Enum {
                name: "High".to_string(),
                value: 3,
            },
        );
        doc.insert("nan", f64::NAN);

        let text = serde_json::to_string(&doc).unwrap();
        let serialized: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(serialized, doc.to_json());
        assert_eq!(doc.to_json()["guid"], json!("00000000-0000-0000-0000-000000000000"));
        assert_eq!(doc.to_json()["level"], json!("High"));
        assert_eq!(doc.to_json()["nan"], json!(null));
    }

    #[test]
    fn test_deserialize_document() {
        let doc: Document = serde_json::from_str(r#"{"a": {"b": [1, 2]}}"#).unwrap();
        assert_eq!(doc.to_json(), json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut doc = Document::new();
        doc.insert("b", 1);
        doc.insert("a", 2);
        doc.insert("c", 3);
        let keys: Vec<_> = doc.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
