//! Error types for Linkage Media

use thiserror::Error;

/// Result type alias using MediaTypeError
pub type Result<T> = std::result::Result<T, MediaTypeError>;

/// Malformed header input
///
/// A failed negotiation is not an error; matchers return `None` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaTypeError {
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    #[error("Invalid media type parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid quality value: {0}")]
    InvalidQuality(String),
}
