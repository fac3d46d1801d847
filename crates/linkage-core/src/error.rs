//! Error types for Linkage Core

use thiserror::Error;

/// Result type alias using Linkage's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Linkage error types
///
/// None of these are retryable: a schema registration problem or a misuse of
/// the data model has to be fixed by the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No schema registered for type: {type_name}")]
    SchemaNotFound { type_name: String },

    #[error("Invalid relationship data access: expected {expected}, found {found}")]
    InvalidVariant {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Traversal depth exceeded: limit is {limit}")]
    DepthExceeded { limit: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
