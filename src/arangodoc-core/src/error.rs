/// Errors raised by field path resolution, typed access and object mapping
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Field '{field}' not found in path '{path}'")]
    FieldNotFound { path: String, field: String },

    #[error("Field '{field}' in path '{path}' is not a document")]
    NotTraversable { path: String, field: String },

    #[error("Index {index} out of range for field '{field}' in path '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        field: String,
        index: usize,
        len: usize,
    },

    #[error("Field '{path}' holds {found}, expected {expected}")]
    InvalidFieldType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid value '{value}' for system attribute '{field}'")]
    InvalidHandle { field: &'static str, value: String },

    #[error("Failed to map field '{field}': {reason}")]
    MappingFailure { field: String, reason: String },
}

impl DocumentError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mapping(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::MappingFailure {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while declaring a schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid match pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
