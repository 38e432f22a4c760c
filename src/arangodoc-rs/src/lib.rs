//! arangodoc Client Library
//!
//! HTTP client for the document, collection and cursor endpoints of an
//! ArangoDB server, built on the `arangodoc-core` document model.

mod client;
mod config;

pub use arangodoc_core::{
    Document, DocumentError, FromDocument, Schema, Settings, ToDocument, ValidationResult,
};
pub use client::{Client, CollectionType};
pub use config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Document failed validation: {}", .0.messages().join("; "))]
    Validation(ValidationResult),

    #[error("Invalid response from server")]
    InvalidResponse,
}

pub type Result<T> = std::result::Result<T, ClientError>;
