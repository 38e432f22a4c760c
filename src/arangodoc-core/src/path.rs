//! Field path parsing and traversal.
//!
//! A path such as `user.tags[2].name` addresses a location inside nested
//! documents. Each dot-separated segment is a field name with an optional
//! index specifier: `[n]` for a list position or `[*]` (writes only) to append.
//!
//! Parsed paths are cached per thread so hot accessors skip re-parsing.

use lru::LruCache;
use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

use crate::document::Document;
use crate::error::{DocumentError, Result};
use crate::value::Value;

const PATH_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

thread_local! {
    static PATH_CACHE: RefCell<LruCache<String, Rc<FieldPath>>> =
        RefCell::new(LruCache::new(PATH_CACHE_CAPACITY));
}

/// Index specifier of a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Position(usize),
    /// `[*]`
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub index: Option<Index>,
}

/// A parsed field path. Always holds at least one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(DocumentError::invalid_path(path, "path is empty"));
        }

        let segments = path
            .split('.')
            .map(|part| parse_segment(path, part))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// Parse through the per-thread cache
    pub(crate) fn cached(path: &str) -> Result<Rc<Self>> {
        if let Some(hit) = PATH_CACHE.with(|cache| cache.borrow_mut().get(path).cloned()) {
            return Ok(hit);
        }

        let parsed = Rc::new(Self::parse(path)?);
        PATH_CACHE.with(|cache| {
            cache
                .borrow_mut()
                .put(path.to_string(), Rc::clone(&parsed));
        });
        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn split_last(&self) -> (&Segment, &[Segment]) {
        // parse() never yields an empty segment list
        match self.segments.split_last() {
            Some((last, parents)) => (last, parents),
            None => unreachable!("field path without segments"),
        }
    }

    fn not_found(&self, segment: &Segment) -> DocumentError {
        DocumentError::FieldNotFound {
            path: self.raw.clone(),
            field: segment.name.clone(),
        }
    }

    fn not_traversable(&self, segment: &Segment) -> DocumentError {
        DocumentError::NotTraversable {
            path: self.raw.clone(),
            field: segment.name.clone(),
        }
    }

    fn out_of_range(&self, segment: &Segment, index: usize, len: usize) -> DocumentError {
        DocumentError::IndexOutOfRange {
            path: self.raw.clone(),
            field: segment.name.clone(),
            index,
            len,
        }
    }

    pub(crate) fn invalid_type(&self, expected: &'static str, found: &Value) -> DocumentError {
        DocumentError::InvalidFieldType {
            path: self.raw.clone(),
            expected,
            found: found.type_name(),
        }
    }

    fn append_on_read(&self) -> DocumentError {
        DocumentError::invalid_path(&self.raw, "'[*]' is only valid when setting a field")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(path: &str, part: &str) -> Result<Segment> {
    let (name, index) = match part.find('[') {
        Some(open) => {
            let bracket = &part[open..];
            if bracket.len() < 3 || !bracket.ends_with(']') || bracket[1..].contains('[') {
                return Err(DocumentError::invalid_path(
                    path,
                    format!("malformed index specifier in '{}'", part),
                ));
            }
            let inner = &bracket[1..bracket.len() - 1];
            let index = if inner == "*" {
                Index::Append
            } else {
                inner.parse::<usize>().map(Index::Position).map_err(|_| {
                    DocumentError::invalid_path(path, format!("invalid index '{}'", inner))
                })?
            };
            (&part[..open], Some(index))
        }
        None => (part, None),
    };

    if name.is_empty() {
        return Err(DocumentError::invalid_path(path, "empty field name"));
    }
    if name.contains(']') {
        return Err(DocumentError::invalid_path(
            path,
            format!("unexpected ']' in '{}'", part),
        ));
    }

    Ok(Segment {
        name: name.to_string(),
        index,
    })
}

fn lookup<'a>(
    doc: &'a Document,
    segment: &Segment,
    path: &FieldPath,
    terminal: bool,
) -> Result<&'a Value> {
    let value = doc.get(&segment.name).ok_or_else(|| path.not_found(segment))?;
    match segment.index {
        None => Ok(value),
        Some(Index::Append) => Err(path.append_on_read()),
        Some(Index::Position(i)) => match value {
            Value::List(items) => items
                .get(i)
                .ok_or_else(|| path.out_of_range(segment, i, items.len())),
            other if terminal => Err(path.invalid_type("list", other)),
            _ => Err(path.not_traversable(segment)),
        },
    }
}

fn lookup_mut<'a>(
    doc: &'a mut Document,
    segment: &Segment,
    path: &FieldPath,
    terminal: bool,
) -> Result<&'a mut Value> {
    let value = doc.get_mut(&segment.name).ok_or_else(|| path.not_found(segment))?;
    match segment.index {
        None => Ok(value),
        Some(Index::Append) => Err(path.append_on_read()),
        Some(Index::Position(i)) => match value {
            Value::List(items) => {
                let len = items.len();
                items.get_mut(i).ok_or_else(|| path.out_of_range(segment, i, len))
            }
            other if terminal => Err(path.invalid_type("list", other)),
            _ => Err(path.not_traversable(segment)),
        },
    }
}

fn resolve_parent<'a>(doc: &'a Document, path: &FieldPath) -> Result<&'a Document> {
    let (_, parents) = path.split_last();
    let mut current = doc;
    for segment in parents {
        current = lookup(current, segment, path, false)?
            .as_document()
            .ok_or_else(|| path.not_traversable(segment))?;
    }
    Ok(current)
}

fn resolve_parent_mut<'a>(doc: &'a mut Document, path: &FieldPath) -> Result<&'a mut Document> {
    let (_, parents) = path.split_last();
    let mut current = doc;
    for segment in parents {
        current = match lookup_mut(current, segment, path, false)? {
            Value::Document(inner) => inner,
            _ => return Err(path.not_traversable(segment)),
        };
    }
    Ok(current)
}

pub(crate) fn resolve<'a>(doc: &'a Document, path: &FieldPath) -> Result<&'a Value> {
    let (last, _) = path.split_last();
    lookup(resolve_parent(doc, path)?, last, path, true)
}

pub(crate) fn resolve_mut<'a>(doc: &'a mut Document, path: &FieldPath) -> Result<&'a mut Value> {
    let (last, _) = path.split_last();
    lookup_mut(resolve_parent_mut(doc, path)?, last, path, true)
}

/// Replace a non-document slot with an empty document and hand it back
fn ensure_document(slot: &mut Value) -> &mut Document {
    if !matches!(slot, Value::Document(_)) {
        *slot = Value::Document(Document::new());
    }
    match slot {
        Value::Document(doc) => doc,
        _ => unreachable!("slot was just replaced with a document"),
    }
}

fn existing_list<'a>(
    doc: &'a mut Document,
    segment: &Segment,
    path: &FieldPath,
    terminal: bool,
) -> Result<&'a mut Vec<Value>> {
    match doc.get_mut(&segment.name) {
        Some(Value::List(items)) => Ok(items),
        Some(other) if terminal => Err(path.invalid_type("list", other)),
        Some(_) => Err(path.not_traversable(segment)),
        None => Err(path.not_found(segment)),
    }
}

fn descend_or_create<'a>(
    doc: &'a mut Document,
    segment: &Segment,
    path: &FieldPath,
) -> Result<&'a mut Document> {
    match segment.index {
        None => Ok(ensure_document(
            doc.entry(segment.name.clone()).or_insert(Value::Null),
        )),
        Some(Index::Position(i)) => {
            let items = existing_list(doc, segment, path, false)?;
            let len = items.len();
            let slot = items
                .get_mut(i)
                .ok_or_else(|| path.out_of_range(segment, i, len))?;
            Ok(ensure_document(slot))
        }
        Some(Index::Append) => {
            let items = existing_list(doc, segment, path, false)?;
            items.push(Value::Document(Document::new()));
            match items.last_mut() {
                Some(slot) => Ok(ensure_document(slot)),
                None => Err(path.not_found(segment)),
            }
        }
    }
}

pub(crate) fn assign(doc: &mut Document, path: &FieldPath, value: Value) -> Result<()> {
    let (last, parents) = path.split_last();
    let mut current = doc;
    for segment in parents {
        current = descend_or_create(current, segment, path)?;
    }

    match last.index {
        None => {
            current.insert(last.name.clone(), value);
        }
        Some(Index::Append) => existing_list(current, last, path, true)?.push(value),
        Some(Index::Position(i)) => {
            let items = existing_list(current, last, path, true)?;
            let len = items.len();
            let slot = items
                .get_mut(i)
                .ok_or_else(|| path.out_of_range(last, i, len))?;
            *slot = value;
        }
    }
    Ok(())
}

/// Remove the value behind `path`; `None` when any part fails to resolve
pub(crate) fn remove(doc: &mut Document, path: &FieldPath) -> Option<Value> {
    let (last, _) = path.split_last();
    let parent = resolve_parent_mut(doc, path).ok()?;
    match last.index {
        None => parent.remove(&last.name),
        Some(Index::Position(i)) => match parent.get_mut(&last.name)? {
            Value::List(items) if i < items.len() => Some(items.remove(i)),
            _ => None,
        },
        Some(Index::Append) => None,
    }
}

impl Document {
    /// Resolve `path` to the stored value
    pub fn get_value(&self, path: &str) -> Result<&Value> {
        let path = FieldPath::cached(path)?;
        resolve(self, &path)
    }

    pub fn get_value_mut(&mut self, path: &str) -> Result<&mut Value> {
        let path = FieldPath::cached(path)?;
        resolve_mut(self, &path)
    }

    /// Store `value` at `path`, creating intermediate documents as needed
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<&mut Self> {
        let parsed = FieldPath::cached(path)?;
        assign(self, &parsed, value)?;
        Ok(self)
    }

    /// True when `path` resolves to an existing field, including null ones
    pub fn has(&self, path: &str) -> bool {
        self.get_value(path).is_ok()
    }

    pub fn is_null(&self, path: &str) -> bool {
        matches!(self.get_value(path), Ok(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_json(json!({
            "user": {
                "name": "Ann",
                "tags": ["x", "y"],
                "friends": [{"name": "Bob"}, {"name": "Eve"}],
                "nothing": null
            },
            "count": 3
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_segments() {
        let path = FieldPath::parse("a.b[2].c[*]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment { name: "a".into(), index: None },
                Segment { name: "b".into(), index: Some(Index::Position(2)) },
                Segment { name: "c".into(), index: Some(Index::Append) },
            ]
        );
        assert_eq!(path.to_string(), "a.b[2].c[*]");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let malformed = [
            "", "a..b", ".a", "a.", "a[", "a[]", "a[x]", "a[1]b", "[1]", "a]", "a[1][2]", "a[-1]",
        ];
        for bad in malformed {
            assert!(
                matches!(FieldPath::parse(bad), Err(DocumentError::InvalidPath { .. })),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_cached_parse_returns_same_path() {
        let first = FieldPath::cached("x.y[1]").unwrap();
        let second = FieldPath::cached("x.y[1]").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_resolve_nested_and_indexed() {
        let doc = sample();
        assert_eq!(doc.get_value("user.name").unwrap(), &Value::from("Ann"));
        assert_eq!(doc.get_value("user.tags[1]").unwrap(), &Value::from("y"));
        assert_eq!(doc.get_value("user.friends[1].name").unwrap(), &Value::from("Eve"));
    }

    #[test]
    fn test_resolve_errors() {
        let doc = sample();
        assert!(matches!(
            doc.get_value("user.age"),
            Err(DocumentError::FieldNotFound { ref field, .. }) if field == "age"
        ));
        assert!(matches!(
            doc.get_value("count.value"),
            Err(DocumentError::NotTraversable { ref field, .. }) if field == "count"
        ));
        assert!(matches!(
            doc.get_value("user.tags[5]"),
            Err(DocumentError::IndexOutOfRange { index: 5, len: 2, .. })
        ));
        assert!(matches!(
            doc.get_value("user.name[0]"),
            Err(DocumentError::InvalidFieldType { expected: "list", found: "string", .. })
        ));
        assert!(matches!(
            doc.get_value("user.name[0].x"),
            Err(DocumentError::NotTraversable { .. })
        ));
        assert!(matches!(
            doc.get_value("user.tags[*]"),
            Err(DocumentError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_has_and_is_null() {
        let doc = sample();
        assert!(doc.has("user.nothing"));
        assert!(doc.is_null("user.nothing"));
        assert!(!doc.is_null("user.name"));
        assert!(!doc.has("user.age"));
        assert!(!doc.has("user..name"));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = Document::new();
        doc.set_value("a.b.c", Value::Int(1)).unwrap();
        assert_eq!(doc.get_value("a.b.c").unwrap(), &Value::Int(1));
    }

    #[test]
    fn test_set_overwrites_non_document_intermediate() {
        let mut doc = sample();
        doc.set_value("count.value", Value::Int(7)).unwrap();
        assert_eq!(doc.get_value("count.value").unwrap(), &Value::Int(7));
    }

    #[test]
    fn test_set_append_and_position() {
        let mut doc = sample();
        doc.set_value("user.tags[*]", Value::from("z")).unwrap();
        doc.set_value("user.tags[0]", Value::from("w")).unwrap();
        assert_eq!(
            doc.get_value("user.tags").unwrap(),
            &Value::List(vec![Value::from("w"), Value::from("y"), Value::from("z")])
        );
    }

    #[test]
    fn test_set_never_grows_or_creates_lists() {
        let mut doc = sample();
        assert!(matches!(
            doc.set_value("user.tags[2]", Value::from("z")),
            Err(DocumentError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            doc.set_value("user.missing[*]", Value::from("z")),
            Err(DocumentError::FieldNotFound { .. })
        ));
        assert!(matches!(
            doc.set_value("user.name[*]", Value::from("z")),
            Err(DocumentError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn test_set_through_indexed_intermediate() {
        let mut doc = sample();
        doc.set_value("user.friends[0].age", Value::Int(30)).unwrap();
        assert_eq!(doc.get_value("user.friends[0].age").unwrap(), &Value::Int(30));

        doc.set_value("user.friends[*].name", Value::from("Zed")).unwrap();
        assert_eq!(doc.get_value("user.friends[2].name").unwrap(), &Value::from("Zed"));
    }

    #[test]
    fn test_remove_paths() {
        let mut doc = sample();
        assert_eq!(
            remove(&mut doc, &FieldPath::parse("user.tags[0]").unwrap()),
            Some(Value::from("x"))
        );
        assert_eq!(remove(&mut doc, &FieldPath::parse("user.missing.deep").unwrap()), None);
        assert_eq!(remove(&mut doc, &FieldPath::parse("count").unwrap()), Some(Value::Int(3)));
        assert!(!doc.has("count"));
        assert_eq!(doc.get_value("user.tags").unwrap(), &Value::List(vec![Value::from("y")]));
    }

    #[test]
    fn test_get_value_mut() {
        let mut doc = sample();
        *doc.get_value_mut("user.name").unwrap() = Value::from("Anna");
        assert_eq!(doc.get_value("user.name").unwrap(), &Value::from("Anna"));
    }
}
