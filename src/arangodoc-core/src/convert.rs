//! Coercion between stored `Value`s and Rust types.
//!
//! `FromValue::from_value` performs the lenient conversion used by typed
//! getters (numeric widening/narrowing, numeric strings, epoch offsets), while
//! `FromValue::matches` is the strict check behind `Document::is`: it accepts
//! only values that already have the requested shape.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::config::{DateTimeFormat, EnumFormat, Settings};
use crate::document::Document;
use crate::value::{EnumValue, Value};

pub trait FromValue: Sized {
    /// Type name reported in `InvalidFieldType` errors
    const EXPECTED: &'static str;

    fn from_value(value: &Value, settings: &Settings) -> Option<Self>;

    fn matches(value: &Value) -> bool;
}

pub trait IntoValue {
    fn into_value(self, settings: &Settings) -> Value;
}

fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Float(f) => {
            let rounded = f.round_ties_even();
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                Some(rounded as i64)
            } else {
                None
            }
        }
        Value::Decimal(d) => d.round().to_i64(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Enum { value, .. } => Some(*value),
        _ => None,
    }
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Decimal(d) => d.to_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

macro_rules! integer_value {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl FromValue for $ty {
            const EXPECTED: &'static str = $name;

            fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
                <$ty>::try_from(to_i64(value)?).ok()
            }

            fn matches(value: &Value) -> bool {
                matches!(value, Value::Int(i) if <$ty>::try_from(*i).is_ok())
            }
        }

        impl IntoValue for $ty {
            fn into_value(self, _settings: &Settings) -> Value {
                Value::Int(i64::from(self))
            }
        }
    )*};
}

integer_value!(
    i8 => "i8",
    u8 => "u8",
    i16 => "i16",
    u16 => "u16",
    i32 => "i32",
    u32 => "u32",
    i64 => "i64",
);

impl FromValue for u64 {
    const EXPECTED: &'static str = "u64";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        match value {
            Value::Decimal(d) => d.round().to_u64(),
            other => u64::try_from(to_i64(other)?).ok(),
        }
    }

    fn matches(value: &Value) -> bool {
        match value {
            Value::Int(i) => *i >= 0,
            Value::Decimal(d) => d.fract().is_zero() && d.to_u64().is_some(),
            _ => false,
        }
    }
}

impl IntoValue for u64 {
    /// Values above `i64::MAX` are stored as decimals
    fn into_value(self, _settings: &Settings) -> Value {
        match i64::try_from(self) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Decimal(Decimal::from(self)),
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "f64";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        to_f64(value)
    }

    fn matches(value: &Value) -> bool {
        matches!(value, Value::Float(_))
    }
}

impl IntoValue for f64 {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f32 {
    const EXPECTED: &'static str = "f32";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        to_f64(value).map(|f| f as f32)
    }

    fn matches(value: &Value) -> bool {
        match value {
            Value::Float(f) => !f.is_finite() || f64::from(*f as f32) == *f,
            _ => false,
        }
    }
}

impl IntoValue for f32 {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::Float(f64::from(self))
    }
}

impl FromValue for Decimal {
    const EXPECTED: &'static str = "decimal";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        match value {
            Value::Int(i) => Some(Decimal::from(*i)),
            Value::Float(f) => Decimal::try_from(*f).ok(),
            Value::Decimal(d) => Some(*d),
            Value::String(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    fn matches(value: &Value) -> bool {
        matches!(value, Value::Decimal(_))
    }
}

impl IntoValue for Decimal {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::Decimal(self)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    fn matches(value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }
}

impl IntoValue for bool {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn matches(value: &Value) -> bool {
        matches!(value, Value::String(_))
    }
}

impl IntoValue for String {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for DateTime<Utc> {
    const EXPECTED: &'static str = "datetime";

    fn from_value(value: &Value, settings: &Settings) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            Value::String(s) => settings.parse_date_time(s),
            Value::Int(i) => settings.from_timestamp(*i as f64),
            Value::Float(f) => settings.from_timestamp(*f),
            _ => None,
        }
    }

    fn matches(value: &Value) -> bool {
        matches!(value, Value::DateTime(_))
    }
}

impl IntoValue for DateTime<Utc> {
    fn into_value(self, settings: &Settings) -> Value {
        match settings.date_time_format {
            DateTimeFormat::Native => Value::DateTime(self),
            DateTimeFormat::String => Value::String(settings.format_date_time(&self)),
            DateTimeFormat::UnixTimeStamp => Value::Int(settings.to_timestamp(&self)),
        }
    }
}

impl FromValue for Uuid {
    const EXPECTED: &'static str = "guid";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        match value {
            Value::Guid(g) => Some(*g),
            Value::String(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }

    fn matches(value: &Value) -> bool {
        matches!(value, Value::Guid(_))
    }
}

impl IntoValue for Uuid {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::Guid(self)
    }
}

impl FromValue for Document {
    const EXPECTED: &'static str = "document";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        value.as_document().cloned()
    }

    fn matches(value: &Value) -> bool {
        matches!(value, Value::Document(_))
    }
}

impl IntoValue for Document {
    fn into_value(self, _settings: &Settings) -> Value {
        Value::Document(self)
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        Some(value.clone())
    }

    fn matches(_value: &Value) -> bool {
        true
    }
}

impl IntoValue for Value {
    fn into_value(self, _settings: &Settings) -> Value {
        self
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value, settings: &Settings) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other, settings).map(Some),
        }
    }

    fn matches(value: &Value) -> bool {
        value.is_null() || T::matches(value)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self, settings: &Settings) -> Value {
        match self {
            Some(inner) => inner.into_value(settings),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value, settings: &Settings) -> Option<Self> {
        value
            .as_list()?
            .iter()
            .map(|item| T::from_value(item, settings))
            .collect()
    }

    fn matches(value: &Value) -> bool {
        value
            .as_list()
            .is_some_and(|items| items.iter().all(T::matches))
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self, settings: &Settings) -> Value {
        Value::List(
            self.into_iter()
                .map(|item| item.into_value(settings))
                .collect(),
        )
    }
}

impl<T: FromValue> FromValue for Box<[T]> {
    const EXPECTED: &'static str = "array";

    fn from_value(value: &Value, settings: &Settings) -> Option<Self> {
        Vec::<T>::from_value(value, settings).map(Vec::into_boxed_slice)
    }

    fn matches(value: &Value) -> bool {
        Vec::<T>::matches(value)
    }
}

impl<T: IntoValue> IntoValue for Box<[T]> {
    fn into_value(self, settings: &Settings) -> Value {
        self.into_vec().into_value(settings)
    }
}

/// Wrapper routing an `EnumValue` through the coercion traits.
///
/// Reads accept a native enum value, its ordinal or its name; writes follow
/// `Settings::enum_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumerated<E>(pub E);

impl<E: EnumValue> FromValue for Enumerated<E> {
    const EXPECTED: &'static str = "enum";

    fn from_value(value: &Value, _settings: &Settings) -> Option<Self> {
        let parsed = match value {
            Value::Enum { value, .. } => E::from_ordinal(*value),
            Value::Int(i) => E::from_ordinal(*i),
            Value::String(s) => E::from_name(s),
            _ => None,
        };
        parsed.map(Enumerated)
    }

    fn matches(value: &Value) -> bool {
        match value {
            Value::Enum { name, value } => {
                E::from_name(name).is_some_and(|e| e.ordinal() == *value)
            }
            _ => false,
        }
    }
}

impl<E: EnumValue> IntoValue for Enumerated<E> {
    fn into_value(self, settings: &Settings) -> Value {
        match settings.enum_format {
            EnumFormat::Native => Value::Enum {
                name: self.0.name().to_string(),
                value: self.0.ordinal(),
            },
            EnumFormat::Integer => Value::Int(self.0.ordinal()),
            EnumFormat::String => Value::String(self.0.name().to_string()),
        }
    }
}
