//! Reserved system attributes: `_id`, `_key`, `_rev`, `_from`, `_to`.
//!
//! A document handle (`_id`, `_from`, `_to`) has the form `collection/key`.

use crate::document::Document;
use crate::error::{DocumentError, Result};

pub const ID: &str = "_id";
pub const KEY: &str = "_key";
pub const REV: &str = "_rev";
pub const FROM: &str = "_from";
pub const TO: &str = "_to";

const MAX_KEY_LEN: usize = 254;
const MAX_COLLECTION_LEN: usize = 256;

/// Valid document key: 1-254 chars from the key alphabet
pub fn is_document_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key.chars().all(|c| {
            c.is_ascii_alphanumeric() || "_-:.@()+,=;$!*'%".contains(c)
        })
}

/// Valid collection name: starts with a letter or underscore
pub fn is_collection_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_COLLECTION_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Valid document handle: `collection/key`
pub fn is_document_handle(handle: &str) -> bool {
    match handle.split_once('/') {
        Some((collection, key)) => is_collection_name(collection) && is_document_key(key),
        None => false,
    }
}

impl Document {
    pub fn id(&self) -> Result<String> {
        self.get_string(ID)
    }

    pub fn set_id(&mut self, handle: &str) -> Result<&mut Self> {
        check(ID, handle, is_document_handle)?;
        self.set(ID, handle)
    }

    pub fn key(&self) -> Result<String> {
        self.get_string(KEY)
    }

    pub fn set_key(&mut self, key: &str) -> Result<&mut Self> {
        check(KEY, key, is_document_key)?;
        self.set(KEY, key)
    }

    pub fn rev(&self) -> Result<String> {
        self.get_string(REV)
    }

    pub fn set_rev(&mut self, rev: &str) -> Result<&mut Self> {
        self.set(REV, rev)
    }

    pub fn edge_from(&self) -> Result<String> {
        self.get_string(FROM)
    }

    pub fn set_edge_from(&mut self, handle: &str) -> Result<&mut Self> {
        check(FROM, handle, is_document_handle)?;
        self.set(FROM, handle)
    }

    pub fn edge_to(&self) -> Result<String> {
        self.get_string(TO)
    }

    pub fn set_edge_to(&mut self, handle: &str) -> Result<&mut Self> {
        check(TO, handle, is_document_handle)?;
        self.set(TO, handle)
    }

    /// True when `path` holds a string shaped like a document handle
    pub fn is_id(&self, path: &str) -> bool {
        self.get_string(path).is_ok_and(|s| is_document_handle(&s))
    }

    pub fn is_key(&self, path: &str) -> bool {
        self.get_string(path).is_ok_and(|s| is_document_key(&s))
    }

    pub fn has_id(&self) -> bool {
        self.is_id(ID)
    }
}

fn check(field: &'static str, value: &str, valid: fn(&str) -> bool) -> Result<()> {
    if valid(value) {
        Ok(())
    } else {
        Err(DocumentError::InvalidHandle {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_alphabet() {
        assert!(is_document_key("abc-123_x:y"));
        assert!(is_document_key("(weird)+key,'%"));
        assert!(!is_document_key(""));
        assert!(!is_document_key("has/slash"));
        assert!(!is_document_key("space key"));
        assert!(!is_document_key(&"k".repeat(255)));
    }

    #[test]
    fn test_handle_shape() {
        assert!(is_document_handle("users/123"));
        assert!(is_document_handle("_system/abc"));
        assert!(!is_document_handle("users"));
        assert!(!is_document_handle("1users/123"));
        assert!(!is_document_handle("users/"));
        assert!(!is_document_handle("users/a/b"));
    }

    #[test]
    fn test_system_attribute_accessors() {
        let mut doc = Document::new();
        doc.set_id("users/ann")
            .unwrap()
            .set_key("ann")
            .unwrap()
            .set_rev("_hJ3-x--")
            .unwrap();

        assert_eq!(doc.id().unwrap(), "users/ann");
        assert_eq!(doc.key().unwrap(), "ann");
        assert_eq!(doc.rev().unwrap(), "_hJ3-x--");
        assert!(doc.has_id());
        assert!(doc.is_key(KEY));
    }

    #[test]
    fn test_edge_attributes_validated() {
        let mut edge = Document::new();
        edge.set_edge_from("users/ann").unwrap().set_edge_to("users/bob").unwrap();
        assert_eq!(edge.edge_from().unwrap(), "users/ann");
        assert_eq!(edge.edge_to().unwrap(), "users/bob");

        let err = edge.set_edge_to("not a handle").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidHandle { field: "_to", .. }));
        assert_eq!(edge.edge_to().unwrap(), "users/bob");
    }
}
