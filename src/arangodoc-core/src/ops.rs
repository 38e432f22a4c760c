use crate::config::{MergePolicy, Settings};
use crate::convert::FromValue;
use crate::document::Document;
use crate::path::{self, FieldPath};
use crate::value::Value;

impl Document {
    /// Deep copy without the given paths; missing paths are ignored
    pub fn clone_except<I, S>(&self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut copy = self.clone();
        copy.drop_fields(paths);
        copy
    }

    /// New document holding only the given paths (and the documents leading to them)
    pub fn clone_only<I, S>(&self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut copy = Document::new();
        for raw in paths {
            let Ok(parsed) = FieldPath::cached(raw.as_ref()) else {
                continue;
            };
            let Ok(value) = path::resolve(self, &parsed) else {
                continue;
            };
            if let Err(e) = path::assign(&mut copy, &parsed, value.clone()) {
                tracing::debug!("clone_only skipped '{}': {}", parsed, e);
            }
        }
        copy
    }

    /// Remove the field behind each path in place.
    ///
    /// A path whose intermediate segments do not resolve is skipped.
    pub fn drop_fields<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in paths {
            if let Ok(parsed) = FieldPath::cached(raw.as_ref()) {
                path::remove(self, &parsed);
            }
        }
        self
    }

    /// Shallow merge of `other`'s top-level fields
    pub fn merge(&mut self, other: &Document, policy: MergePolicy) -> &mut Self {
        for (name, value) in other {
            match policy {
                MergePolicy::OverwriteFields => {
                    self.insert(name.clone(), value.clone());
                }
                MergePolicy::KeepFields => {
                    self.entry(name.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        self
    }

    /// Merge using the configured default policy
    pub fn merge_with(&mut self, other: &Document, settings: &Settings) -> &mut Self {
        self.merge(other, settings.merge_policy)
    }

    /// Call `action` for every document element of the list at `path`.
    ///
    /// No-op when the field is absent or not a list; non-document elements are skipped.
    pub fn each<F>(&self, path: &str, mut action: F)
    where
        F: FnMut(usize, &Document),
    {
        if let Ok(Value::List(items)) = self.get_value(path) {
            for (i, item) in items.iter().enumerate() {
                if let Value::Document(doc) = item {
                    action(i, doc);
                }
            }
        }
    }

    /// Like `each`, coercing elements to `T`; elements that do not coerce are skipped
    pub fn each_as<T, F>(&self, path: &str, mut action: F)
    where
        T: FromValue,
        F: FnMut(usize, T),
    {
        let settings = Settings::default();
        if let Ok(Value::List(items)) = self.get_value(path) {
            for (i, item) in items.iter().enumerate() {
                if let Some(converted) = T::from_value(item, &settings) {
                    action(i, converted);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(json: serde_json::Value) -> Document {
        Document::from_json(json).unwrap()
    }

    #[test]
    fn test_clone_is_deep() {
        let original = doc(json!({"a": {"b": [1, {"c": 2}]}}));
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.set("a.b[1].c", 3i64).unwrap();
        copy.set("a.new", true).unwrap();
        assert_eq!(original.get_i64("a.b[1].c").unwrap(), 2);
        assert!(!original.has("a.new"));
    }

    #[test]
    fn test_clone_except() {
        let original = doc(json!({"x": 1, "y": {"z": 2, "w": 3}}));
        let copy = original.clone_except(["x", "y.z", "missing.path"]);
        assert!(!copy.has("x"));
        assert!(!copy.has("y.z"));
        assert!(copy.has("y.w"));
        assert!(original.has("x"));
    }

    #[test]
    fn test_clone_only() {
        let original = doc(json!({"x": 1, "y": {"z": 2, "w": 3}, "list": [1, 2]}));
        let copy = original.clone_only(["y.z", "missing", "list[0]", "bad..path"]);
        assert_eq!(copy.to_json(), json!({"y": {"z": 2}}));
    }

    #[test]
    fn test_drop_fields() {
        let mut d = doc(json!({"user": {"name": "Ann", "tags": ["x", "y"]}}));
        d.drop_fields(["user.name"]);
        assert!(!d.has("user.name"));
        assert!(d.has("user.tags"));

        d.drop_fields(["user.name.deeper", "nope.nothing", "user.tags[9]"]);
        assert_eq!(d.to_json(), json!({"user": {"tags": ["x", "y"]}}));

        d.drop_fields(["user.tags[0]"]);
        assert_eq!(d.to_json(), json!({"user": {"tags": ["y"]}}));
    }

    #[test]
    fn test_merge_policies() {
        let other = doc(json!({"a": 10, "c": 30}));

        let mut overwrite = doc(json!({"a": 1, "b": 2}));
        overwrite.merge(&other, MergePolicy::OverwriteFields);
        assert_eq!(overwrite.to_json(), json!({"a": 10, "b": 2, "c": 30}));

        let mut keep = doc(json!({"a": 1, "b": 2}));
        keep.merge(&other, MergePolicy::KeepFields);
        assert_eq!(keep.to_json(), json!({"a": 1, "b": 2, "c": 30}));
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut base = doc(json!({"n": {"keep": 1}}));
        base.merge(&doc(json!({"n": {"other": 2}})), MergePolicy::OverwriteFields);
        assert_eq!(base.to_json(), json!({"n": {"other": 2}}));
    }

    #[test]
    fn test_merge_with_settings_default() {
        let settings = Settings {
            merge_policy: MergePolicy::KeepFields,
            ..Settings::default()
        };
        let mut base = doc(json!({"a": 1}));
        base.merge_with(&doc(json!({"a": 2})), &settings);
        assert_eq!(base.get_i64("a").unwrap(), 1);
    }

    #[test]
    fn test_each_visits_documents_in_order() {
        let d = doc(json!({"items": [{"n": 1}, "skip", {"n": 3}], "scalar": 5}));
        let mut seen = Vec::new();
        d.each("items", |i, item| seen.push((i, item.get_i64("n").unwrap())));
        assert_eq!(seen, vec![(0, 1), (2, 3)]);

        let mut calls = 0;
        d.each("scalar", |_, _| calls += 1);
        d.each("missing", |_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_each_as() {
        let d = doc(json!({"values": [1, "2", "x", 4.0]}));
        let mut seen = Vec::new();
        d.each_as::<i32, _>("values", |i, v| seen.push((i, v)));
        assert_eq!(seen, vec![(0, 1), (1, 2), (3, 4)]);
    }
}
