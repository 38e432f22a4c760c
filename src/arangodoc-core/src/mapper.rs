//! Conversion between documents and statically typed values.
//!
//! Types opt in by implementing `ToDocument` / `FromDocument`, usually with a
//! `DocumentWriter` / `DocumentReader` that applies per-field `FieldOptions`
//! (alias, ignore, ignore-if-null).
//!
//! ```
//! use arangodoc_core::{Document, DocumentReader, DocumentWriter, FieldOptions};
//! use arangodoc_core::{FromDocument, ToDocument};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Account {
//!     login: String,
//!     nickname: Option<String>,
//! }
//!
//! impl ToDocument for Account {
//!     fn to_document(&self) -> arangodoc_core::Result<Document> {
//!         let mut w = DocumentWriter::new();
//!         w.field("login", &self.login)?;
//!         let nickname = FieldOptions::new().alias("nick").ignore_null();
//!         w.field_with("nickname", &self.nickname, nickname)?;
//!         Ok(w.finish())
//!     }
//! }
//!
//! impl FromDocument for Account {
//!     fn from_document(doc: &Document) -> arangodoc_core::Result<Self> {
//!         let r = DocumentReader::new(doc);
//!         let mut account = Account::default();
//!         r.read("login", &mut account.login)?;
//!         let nickname = FieldOptions::new().alias("nick").ignore_null();
//!         r.read_with("nickname", &mut account.nickname, nickname)?;
//!         Ok(account)
//!     }
//! }
//!
//! let account = Account { login: "ann".into(), nickname: None };
//! let doc = Document::from_object(&account).unwrap();
//! assert!(!doc.has("nick"));
//! assert_eq!(doc.to_object::<Account>().unwrap(), account);
//! ```

use std::borrow::Cow;

use crate::config::Settings;
use crate::convert::{Enumerated, FromValue, IntoValue};
use crate::document::Document;
use crate::error::{DocumentError, Result};
use crate::path::{resolve, FieldPath};
use crate::value::{EnumValue, Value};

/// Field name used for keys in an ordered key/value collection element
pub const PAIR_KEY: &str = "Key";
/// Field name used for values in an ordered key/value collection element
pub const PAIR_VALUE: &str = "Value";

pub trait ToDocument {
    fn to_document(&self) -> Result<Document>;
}

pub trait FromDocument: Sized {
    fn from_document(doc: &Document) -> Result<Self>;
}

impl ToDocument for Document {
    fn to_document(&self) -> Result<Document> {
        Ok(self.clone())
    }
}

impl FromDocument for Document {
    fn from_document(doc: &Document) -> Result<Self> {
        Ok(doc.clone())
    }
}

/// Per-field binding options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOptions {
    alias: Option<&'static str>,
    ignore: bool,
    ignore_null: bool,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the field under `name` instead of its own name
    pub fn alias(mut self, name: &'static str) -> Self {
        self.alias = Some(name);
        self
    }

    /// Never map the field in either direction
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Skip the field when its value is null
    pub fn ignore_null(mut self) -> Self {
        self.ignore_null = true;
        self
    }

    fn field_name<'a>(&self, name: &'a str) -> &'a str {
        self.alias.unwrap_or(name)
    }
}

/// Builds a document field by field
pub struct DocumentWriter<'s> {
    doc: Document,
    settings: Cow<'s, Settings>,
}

impl Default for DocumentWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> DocumentWriter<'s> {
    pub fn new() -> Self {
        Self {
            doc: Document::new(),
            settings: Cow::Owned(Settings::default()),
        }
    }

    /// Encode date-times and enums per `settings`
    pub fn with_settings(settings: &'s Settings) -> Self {
        Self {
            doc: Document::new(),
            settings: Cow::Borrowed(settings),
        }
    }

    fn write(&mut self, name: &str, value: Value, options: FieldOptions) -> &mut Self {
        if options.ignore || (options.ignore_null && value.is_null()) {
            return self;
        }
        self.doc.insert(options.field_name(name), value);
        self
    }

    pub fn field<T: IntoValue + Clone>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        self.field_with(name, value, FieldOptions::default())
    }

    pub fn field_with<T: IntoValue + Clone>(
        &mut self,
        name: &str,
        value: &T,
        options: FieldOptions,
    ) -> Result<&mut Self> {
        let value = value.clone().into_value(&self.settings);
        Ok(self.write(name, value, options))
    }

    pub fn nested<T: ToDocument>(
        &mut self,
        name: &str,
        value: &T,
        options: FieldOptions,
    ) -> Result<&mut Self> {
        self.nested_opt(name, Some(value), options)
    }

    pub fn nested_opt<T: ToDocument>(
        &mut self,
        name: &str,
        value: Option<&T>,
        options: FieldOptions,
    ) -> Result<&mut Self> {
        if options.ignore {
            return Ok(self);
        }
        let value = match value {
            Some(inner) => {
                let doc = inner
                    .to_document()
                    .map_err(|e| DocumentError::mapping(name, e))?;
                Value::Document(doc)
            }
            None => Value::Null,
        };
        Ok(self.write(name, value, options))
    }

    pub fn nested_list<T: ToDocument>(
        &mut self,
        name: &str,
        values: &[T],
        options: FieldOptions,
    ) -> Result<&mut Self> {
        if options.ignore {
            return Ok(self);
        }
        let items = values
            .iter()
            .map(|item| item.to_document().map(Value::Document))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| DocumentError::mapping(name, e))?;
        Ok(self.write(name, Value::List(items), options))
    }

    pub fn enum_field<E: EnumValue>(
        &mut self,
        name: &str,
        value: E,
        options: FieldOptions,
    ) -> Result<&mut Self> {
        let value = Enumerated(value).into_value(&self.settings);
        Ok(self.write(name, value, options))
    }

    /// Ordered key/value collection, one `{ "Key": k, "Value": v }` document per entry
    pub fn pairs<K, V>(
        &mut self,
        name: &str,
        entries: &[(K, V)],
        options: FieldOptions,
    ) -> Result<&mut Self>
    where
        K: IntoValue + Clone,
        V: IntoValue + Clone,
    {
        let items = entries
            .iter()
            .map(|(k, v)| {
                let mut pair = Document::new();
                pair.insert(PAIR_KEY, k.clone().into_value(&self.settings));
                pair.insert(PAIR_VALUE, v.clone().into_value(&self.settings));
                Value::Document(pair)
            })
            .collect();
        Ok(self.write(name, Value::List(items), options))
    }

    pub fn finish(self) -> Document {
        self.doc
    }
}

/// Reads fields of a document into typed targets.
///
/// Absent fields leave the target untouched.
pub struct DocumentReader<'a, 's> {
    doc: &'a Document,
    settings: Cow<'s, Settings>,
}

impl<'a, 's> DocumentReader<'a, 's> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            settings: Cow::Owned(Settings::default()),
        }
    }

    pub fn with_settings(doc: &'a Document, settings: &'s Settings) -> Self {
        Self {
            doc,
            settings: Cow::Borrowed(settings),
        }
    }

    /// Field value to map, or `None` when the field should be skipped
    fn lookup<'n>(&self, name: &'n str, options: FieldOptions) -> Option<(&'n str, &'a Value)> {
        if options.ignore {
            return None;
        }
        let key = options.field_name(name);
        let value = self.doc.get(key)?;
        if options.ignore_null && value.is_null() {
            return None;
        }
        Some((key, value))
    }

    fn convert<T: FromValue>(&self, key: &str, value: &Value) -> Result<T> {
        T::from_value(value, &self.settings).ok_or_else(|| {
            DocumentError::mapping(
                key,
                format!("cannot convert {} to {}", value.type_name(), T::EXPECTED),
            )
        })
    }

    pub fn read<T: FromValue>(&self, name: &str, target: &mut T) -> Result<()> {
        self.read_with(name, target, FieldOptions::default())
    }

    pub fn read_with<T: FromValue>(
        &self,
        name: &str,
        target: &mut T,
        options: FieldOptions,
    ) -> Result<()> {
        if let Some((key, value)) = self.lookup(name, options) {
            *target = self.convert(key, value)?;
        }
        Ok(())
    }

    fn document<T: FromDocument>(key: &str, value: &Value) -> Result<T> {
        let doc = value.as_document().ok_or_else(|| {
            DocumentError::mapping(key, format!("expected document, found {}", value.type_name()))
        })?;
        T::from_document(doc).map_err(|e| DocumentError::mapping(key, e))
    }

    pub fn nested<T: FromDocument>(
        &self,
        name: &str,
        target: &mut T,
        options: FieldOptions,
    ) -> Result<()> {
        if let Some((key, value)) = self.lookup(name, options) {
            *target = Self::document(key, value)?;
        }
        Ok(())
    }

    pub fn nested_opt<T: FromDocument>(
        &self,
        name: &str,
        target: &mut Option<T>,
        options: FieldOptions,
    ) -> Result<()> {
        if let Some((key, value)) = self.lookup(name, options) {
            *target = match value {
                Value::Null => None,
                other => Some(Self::document(key, other)?),
            };
        }
        Ok(())
    }

    pub fn nested_list<T: FromDocument>(
        &self,
        name: &str,
        target: &mut Vec<T>,
        options: FieldOptions,
    ) -> Result<()> {
        let Some((key, value)) = self.lookup(name, options) else {
            return Ok(());
        };
        let items = value.as_list().ok_or_else(|| {
            DocumentError::mapping(key, format!("expected list, found {}", value.type_name()))
        })?;
        *target = items
            .iter()
            .map(|item| Self::document(key, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    pub fn enum_field<E: EnumValue>(
        &self,
        name: &str,
        target: &mut E,
        options: FieldOptions,
    ) -> Result<()> {
        if let Some((key, value)) = self.lookup(name, options) {
            *target = self.convert::<Enumerated<E>>(key, value)?.0;
        }
        Ok(())
    }

    /// Ordered key/value collection written by `DocumentWriter::pairs`
    pub fn pairs<K, V>(
        &self,
        name: &str,
        target: &mut Vec<(K, V)>,
        options: FieldOptions,
    ) -> Result<()>
    where
        K: FromValue,
        V: FromValue,
    {
        let Some((key, value)) = self.lookup(name, options) else {
            return Ok(());
        };
        let items = value.as_list().ok_or_else(|| {
            DocumentError::mapping(key, format!("expected list, found {}", value.type_name()))
        })?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let pair = item.as_document().ok_or_else(|| {
                let reason = format!("expected key/value document, found {}", item.type_name());
                DocumentError::mapping(key, reason)
            })?;
            let k = pair
                .get(PAIR_KEY)
                .ok_or_else(|| DocumentError::mapping(key, "missing pair key"))?;
            let v = pair.get(PAIR_VALUE).unwrap_or(&Value::Null);
            entries.push((self.convert(key, k)?, self.convert(key, v)?));
        }
        *target = entries;
        Ok(())
    }
}

impl Document {
    pub fn from_object<T: ToDocument + ?Sized>(value: &T) -> Result<Document> {
        value.to_document()
    }

    pub fn to_object<T: FromDocument>(&self) -> Result<T> {
        T::from_document(self)
    }

    /// Map every document in the list at `path`
    pub fn to_objects<T: FromDocument>(&self, path: &str) -> Result<Vec<T>> {
        let parsed = FieldPath::cached(path)?;
        let value = resolve(self, &parsed)?;
        let items = value
            .as_list()
            .ok_or_else(|| parsed.invalid_type("list", value))?;
        items
            .iter()
            .map(|item| {
                item.as_document()
                    .ok_or_else(|| parsed.invalid_type("document", item))
                    .and_then(T::from_document)
            })
            .collect()
    }
}
