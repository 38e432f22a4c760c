//! arangodoc Core Library
//!
//! This crate provides the document model used by the arangodoc client:
//! - Dynamic `Document` values with dotted/bracketed field paths
//! - Typed getters, setters and checks with value coercion
//! - Structural operations (clone, drop, merge, iteration)
//! - Object mapping through `ToDocument` / `FromDocument`
//! - Declarative schema validation

pub mod accessors;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod mapper;
pub mod ops;
pub mod path;
pub mod schema;
pub mod system;
pub mod value;

// Re-export commonly used types
pub use config::{DateTimeFormat, EnumFormat, MergePolicy, Settings};
pub use convert::{Enumerated, FromValue, IntoValue};
pub use document::Document;
pub use error::{DocumentError, Result, SchemaError};
pub use mapper::{DocumentReader, DocumentWriter, FieldOptions, FromDocument, ToDocument};
pub use path::FieldPath;
pub use schema::{Constraint, ConstraintKind, Rule, Schema, ValidationResult};
pub use value::{EnumValue, Value, ValueKind};
