//! Behavioural laws of the document model

use std::collections::BTreeMap;

use arangodoc_core::{
    Document, DocumentReader, DocumentWriter, FieldOptions, FromDocument, MergePolicy, Schema,
    ToDocument, Value, ValueKind,
};
use proptest::prelude::*;
use serde_json::json;

/// Scalar values that compare equal to themselves
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<bool>().prop_map(Value::Bool),
        "[a-z ]{0,12}".prop_map(Value::String),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        Just(Value::Null),
    ]
}

/// Scalars, scalar lists and lists of empty documents, so indexed paths resolve
fn arb_stored_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_value(),
        prop::collection::vec(arb_value(), 0..4).prop_map(Value::List),
        (1usize..4).prop_map(|n| Value::List(vec![Value::Document(Document::new()); n])),
    ]
}

/// Paths over a small alphabet so generated paths overlap; some segments are indexed
fn arb_path() -> impl Strategy<Value = String> {
    let segment = ("[a-d]{1,2}", prop::option::of(0usize..3)).prop_map(|(name, index)| {
        match index {
            Some(i) => format!("{}[{}]", name, i),
            None => name,
        }
    });
    prop::collection::vec(segment, 1..4).prop_map(|parts| parts.join("."))
}

fn arb_document() -> impl Strategy<Value = Document> {
    prop::collection::vec((arb_path(), arb_stored_value()), 0..16).prop_map(|entries| {
        let mut doc = Document::new();
        for (path, value) in entries {
            // Conflicting shapes are expected; only successful writes matter
            let _ = doc.set_value(&path, value);
        }
        doc
    })
}

fn arb_flat_map() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-f]", any::<i64>(), 0..6)
}

fn flat(map: &BTreeMap<String, i64>) -> Document {
    map.iter().map(|(k, v)| (k.clone(), Value::Int(*v))).collect()
}

proptest! {
    #[test]
    fn test_set_then_resolve(
        mut doc in arb_document(),
        path in arb_path(),
        value in arb_stored_value()
    ) {
        if doc.set_value(&path, value.clone()).is_ok() {
            prop_assert!(doc.has(&path));
            prop_assert_eq!(doc.get_value(&path).unwrap(), &value);
        }
    }

    #[test]
    fn test_clone_shares_no_storage(doc in arb_document(), path in arb_path()) {
        let snapshot = doc.to_json();
        let mut copy = doc.clone();
        prop_assert_eq!(&copy, &doc);

        let _ = copy.set_value(&path, Value::String("changed".into()));
        let _ = copy.drop_fields([path.as_str()]);
        prop_assert_eq!(doc.to_json(), snapshot);
    }

    #[test]
    fn test_clone_except_removes_only_named_field(map in arb_flat_map(), victim in "[a-f]") {
        let doc = flat(&map);
        let copy = doc.clone_except([victim.as_str()]);
        prop_assert!(!copy.has(&victim));
        for (key, value) in &map {
            if *key != victim {
                prop_assert_eq!(copy.get_i64(key).unwrap(), *value);
            }
        }
    }

    #[test]
    fn test_merge_policies(base in arb_flat_map(), other in arb_flat_map()) {
        let mut keep = flat(&base);
        keep.merge(&flat(&other), MergePolicy::KeepFields);
        let mut overwrite = flat(&base);
        overwrite.merge(&flat(&other), MergePolicy::OverwriteFields);

        for (key, value) in &base {
            prop_assert_eq!(keep.get_i64(key).unwrap(), *value);
        }
        for (key, value) in &other {
            prop_assert_eq!(overwrite.get_i64(key).unwrap(), *value);
            prop_assert!(keep.has(key));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Measurement {
    label: String,
    count: i32,
    ratio: f64,
    flags: Vec<bool>,
    note: Option<String>,
}

impl ToDocument for Measurement {
    fn to_document(&self) -> arangodoc_core::Result<Document> {
        let mut w = DocumentWriter::new();
        w.field("label", &self.label)?
            .field("count", &self.count)?
            .field("ratio", &self.ratio)?
            .field("flags", &self.flags)?
            .field_with("note", &self.note, FieldOptions::new().alias("remark"))?;
        Ok(w.finish())
    }
}

impl FromDocument for Measurement {
    fn from_document(doc: &Document) -> arangodoc_core::Result<Self> {
        let r = DocumentReader::new(doc);
        let mut m = Measurement::default();
        r.read("label", &mut m.label)?;
        r.read("count", &mut m.count)?;
        r.read("ratio", &mut m.ratio)?;
        r.read("flags", &mut m.flags)?;
        r.read_with("note", &mut m.note, FieldOptions::new().alias("remark"))?;
        Ok(m)
    }
}

proptest! {
    #[test]
    fn test_object_round_trip(
        label in "[A-Za-z0-9 ]{0,20}",
        count in any::<i32>(),
        ratio in -1.0e9f64..1.0e9,
        flags in prop::collection::vec(any::<bool>(), 0..5),
        note in prop::option::of("[a-z]{1,10}"),
    ) {
        let original = Measurement { label, count, ratio, flags, note };
        let doc = Document::from_object(&original).unwrap();
        prop_assert_eq!(doc.to_object::<Measurement>().unwrap(), original);
    }
}

#[test]
fn test_user_document_scenario() {
    let mut doc =
        Document::from_json(json!({"user": {"name": "Ann", "tags": ["x", "y"]}})).unwrap();

    assert_eq!(doc.get_string("user.name").unwrap(), "Ann");
    assert_eq!(
        doc.get_array::<String>("user.tags").unwrap().to_vec(),
        vec!["x".to_string(), "y".to_string()]
    );

    doc.set("user.tags[*]", "z").unwrap();
    assert_eq!(doc.get_list::<String>("user.tags").unwrap(), vec!["x", "y", "z"]);
    assert!(!doc.has("user.age"));

    doc.drop_fields(["user.name"]);
    assert!(!doc.has("user.name"));
    assert!(doc.has("user.tags"));
}

#[test]
fn test_required_typed_field() {
    let mut schema = Schema::new();
    schema.must_have("a").of_type(ValueKind::Int);

    let empty = schema.validate(&Document::new());
    assert_eq!(empty.violations.len(), 1);
    assert_eq!(empty.violations[0].constraint, arangodoc_core::Constraint::MustHave);

    let wrong = schema.validate(&Document::from_json(json!({"a": "x"})).unwrap());
    assert_eq!(wrong.violations.len(), 1);
    assert_eq!(wrong.violations[0].constraint, arangodoc_core::Constraint::Type(ValueKind::Int));

    assert!(schema.validate(&Document::from_json(json!({"a": 5})).unwrap()).is_valid());
}

#[test]
fn test_optional_field_minimum() {
    let mut schema = Schema::new();
    schema.should_have("a").min(3);

    assert!(schema.validate(&Document::new()).is_valid());
    assert_eq!(
        schema
            .validate(&Document::from_json(json!({"a": "ab"})).unwrap())
            .violations
            .len(),
        1
    );
    assert!(schema.validate(&Document::from_json(json!({"a": "abc"})).unwrap()).is_valid());
}

#[test]
fn test_range_over_list_length() {
    let mut schema = Schema::new();
    schema.must_have("list").range(1, 5);

    assert!(schema.validate(&Document::from_json(json!({"list": [1, 2, 3]})).unwrap()).is_valid());
    assert!(!schema
        .validate(&Document::from_json(json!({"list": [1, 2, 3, 4, 5, 6]})).unwrap())
        .is_valid());
}
