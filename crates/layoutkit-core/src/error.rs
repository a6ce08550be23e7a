//! Error types shared by the layout engine.

use thiserror::Error;

/// Errors surfaced to callers of the layout engine.
///
/// Name collisions, rename conflicts and rejected geometry are not errors:
/// they are resolved or reported through return values.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Malformed layout document: {0}")]
    MalformedDocument(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Configuration error: {0}")]
    Config(String),
    /// Producing output from a valid document failed.
    #[error("Encoding error: {0}")]
    Encode(String),
}

/// Result type for layout engine operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

impl From<crate::storage::StorageError> for LayoutError {
    fn from(err: crate::storage::StorageError) -> Self {
        LayoutError::Io(err.to_string())
    }
}
