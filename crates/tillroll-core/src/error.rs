//! Error types for the tillroll-core library.

use thiserror::Error;

/// Main error type for the tillroll library.
#[derive(Error, Debug)]
pub enum TillrollError {
    /// The input is not a well-formed expense document.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Structural problems with an expense document.
///
/// Missing fields and unparsable amounts are not errors; only input whose
/// outer shape cannot be an expense document ends up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A value had the wrong JSON type.
    #[error("invalid input at {path}: expected {expected}")]
    InvalidShape { path: String, expected: &'static str },

    /// The response contained no expense documents.
    #[error("no expense documents in response")]
    NoDocuments,
}

impl DocumentError {
    pub(crate) fn shape(path: impl Into<String>, expected: &'static str) -> Self {
        DocumentError::InvalidShape {
            path: path.into(),
            expected,
        }
    }
}

/// Result type for the tillroll library.
pub type Result<T> = std::result::Result<T, TillrollError>;
