//! Error types for the mapping engine

use serde_json::Value;
use thiserror::Error;

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors raised during schema registration or parsing
#[derive(Error, Debug)]
pub enum MappingError {
    /// A field was declared with an unusable coercion spec. Raised at
    /// registration time, before any parse can run.
    #[error("invalid spec for field '{field}': {reason}")]
    InvalidFieldSpec { field: String, reason: String },

    /// A required field was absent from the input and has no default.
    #[error("the '{field}' attribute is required for '{type_name}'")]
    MissingRequiredField { field: String, type_name: String },

    /// A strict schema saw an input key that maps to no field.
    #[error("unsupported attribute '{key}: {value}' for {type_name}")]
    UnsupportedAttribute {
        key: String,
        value: Value,
        type_name: String,
    },

    /// The value handed to `parse` was not a mapping, or a sequence field
    /// received a non-sequence raw value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
