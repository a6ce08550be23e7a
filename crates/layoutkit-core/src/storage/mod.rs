//! Storage for exported layouts.
//!
//! A backend stores the two documents of a [`LayoutExport`] under its base
//! name and can read a structured document back for import.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::export::LayoutExport;
use std::path::PathBuf;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Where the two documents of an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub structured: PathBuf,
    pub human: PathBuf,
}

/// Trait for export storage backends.
pub trait Storage {
    /// Write both documents. Either both are written or an error is returned.
    fn write_export(&self, export: &LayoutExport) -> StorageResult<ExportPaths>;

    /// Read the structured document saved under `base_name`.
    fn read_structured(&self, base_name: &str) -> StorageResult<String>;

    /// List the base names of stored exports.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if an export exists.
    fn exists(&self, base_name: &str) -> StorageResult<bool>;
}
