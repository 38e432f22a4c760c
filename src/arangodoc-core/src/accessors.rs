//! Typed get / set / check operations over field paths.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::Settings;
use crate::convert::{Enumerated, FromValue, IntoValue};
use crate::document::Document;
use crate::error::Result;
use crate::path::{resolve, FieldPath};
use crate::value::{EnumValue, Value};

macro_rules! typed_accessors {
    ($($get:ident, $is:ident => $ty:ty;)*) => {$(
        #[doc = concat!("Read `path` coerced to `", stringify!($ty), "`")]
        pub fn $get(&self, path: &str) -> Result<$ty> {
            self.get_as(path)
        }

        #[doc = concat!("True when `path` holds a `", stringify!($ty), "` without coercion")]
        pub fn $is(&self, path: &str) -> bool {
            self.is::<$ty>(path)
        }
    )*};
}

impl Document {
    /// Resolve `path` and coerce the stored value to `T` using default settings
    pub fn get_as<T: FromValue>(&self, path: &str) -> Result<T> {
        self.get_as_with(path, &Settings::default())
    }

    pub fn get_as_with<T: FromValue>(&self, path: &str, settings: &Settings) -> Result<T> {
        let parsed = FieldPath::cached(path)?;
        let value = resolve(self, &parsed)?;
        T::from_value(value, settings).ok_or_else(|| parsed.invalid_type(T::EXPECTED, value))
    }

    /// Store `value` at `path` using default settings
    pub fn set<T: IntoValue>(&mut self, path: &str, value: T) -> Result<&mut Self> {
        self.set_with(path, value, &Settings::default())
    }

    pub fn set_with<T: IntoValue>(
        &mut self,
        path: &str,
        value: T,
        settings: &Settings,
    ) -> Result<&mut Self> {
        self.set_value(path, value.into_value(settings))
    }

    /// Strict check: the field exists and holds a `T` as-is
    pub fn is<T: FromValue>(&self, path: &str) -> bool {
        self.get_value(path).is_ok_and(T::matches)
    }

    /// True when the field exists and equals `value`, both nulls included
    pub fn is_equal<T: IntoValue>(&self, path: &str, value: T) -> bool {
        let expected = value.into_value(&Settings::default());
        self.get_value(path).is_ok_and(|stored| *stored == expected)
    }

    typed_accessors! {
        get_bool, is_bool => bool;
        get_i8, is_i8 => i8;
        get_u8, is_u8 => u8;
        get_i16, is_i16 => i16;
        get_u16, is_u16 => u16;
        get_i32, is_i32 => i32;
        get_u32, is_u32 => u32;
        get_i64, is_i64 => i64;
        get_u64, is_u64 => u64;
        get_f32, is_f32 => f32;
        get_f64, is_f64 => f64;
        get_decimal, is_decimal => Decimal;
        get_datetime, is_datetime => DateTime<Utc>;
        get_guid, is_guid => Uuid;
        get_string, is_string => String;
        get_document, is_document => Document;
    }

    pub fn get_enum<E: EnumValue>(&self, path: &str) -> Result<E> {
        self.get_as::<Enumerated<E>>(path).map(|e| e.0)
    }

    pub fn is_enum<E: EnumValue>(&self, path: &str) -> bool {
        self.is::<Enumerated<E>>(path)
    }

    pub fn set_enum<E: EnumValue>(&mut self, path: &str, value: E) -> Result<&mut Self> {
        self.set(path, Enumerated(value))
    }

    pub fn set_enum_with<E: EnumValue>(
        &mut self,
        path: &str,
        value: E,
        settings: &Settings,
    ) -> Result<&mut Self> {
        self.set_with(path, Enumerated(value), settings)
    }

    /// Read a list field with per-element coercion to `T`
    pub fn get_list<T: FromValue>(&self, path: &str) -> Result<Vec<T>> {
        self.get_as(path)
    }

    pub fn get_array<T: FromValue>(&self, path: &str) -> Result<Box<[T]>> {
        self.get_as(path)
    }

    pub fn is_list(&self, path: &str) -> bool {
        matches!(self.get_value(path), Ok(Value::List(_)))
    }

    pub fn is_list_of<T: FromValue>(&self, path: &str) -> bool {
        self.is::<Vec<T>>(path)
    }

    pub fn is_array_of<T: FromValue>(&self, path: &str) -> bool {
        self.is::<Box<[T]>>(path)
    }
}
