//! Error types for the annotator core.

use thiserror::Error;

/// Annotator errors.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Unknown annotation: {0}")]
    UnknownAnnotation(String),
    #[error("No annotation is selected")]
    NothingSelected,
}

/// Result type for annotator operations.
pub type AnnotatorResult<T> = Result<T, AnnotatorError>;
