//! Error types for survey and volume operations

use thiserror::Error;

/// Main error type for survey operations
#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Degenerate survey geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Unsupported index type: {0}")]
    DispatchType(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Specialized Result type for survey operations
pub type Result<T> = std::result::Result<T, SurveyError>;

impl From<serde_json::Error> for SurveyError {
    fn from(err: serde_json::Error) -> Self {
        SurveyError::Serialization(err.to_string())
    }
}
