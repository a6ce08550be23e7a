//! In-memory export storage.

use super::{ExportPaths, Storage, StorageError, StorageResult};
use crate::export::LayoutExport;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    exports: RwLock<BTreeMap<String, LayoutExport>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full export stored under `base_name`.
    pub fn get(&self, base_name: &str) -> StorageResult<LayoutExport> {
        let exports = self
            .exports
            .read()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;
        exports
            .get(base_name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(base_name.to_string()))
    }
}

impl Storage for MemoryStorage {
    fn write_export(&self, export: &LayoutExport) -> StorageResult<ExportPaths> {
        let mut exports = self
            .exports
            .write()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;
        exports.insert(export.base_name.clone(), export.clone());
        Ok(ExportPaths {
            structured: PathBuf::from(export.structured_file_name()),
            human: PathBuf::from(export.human_file_name()),
        })
    }

    fn read_structured(&self, base_name: &str) -> StorageResult<String> {
        self.get(base_name).map(|export| export.structured)
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let exports = self
            .exports
            .read()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;
        Ok(exports.keys().cloned().collect())
    }

    fn exists(&self, base_name: &str) -> StorageResult<bool> {
        let exports = self
            .exports
            .read()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;
        Ok(exports.contains_key(base_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        let export = LayoutExport {
            base_name: "layout".to_string(),
            structured: "LAYOUT_CONFIG = {}".to_string(),
            human: "#".to_string(),
        };

        let paths = storage.write_export(&export).unwrap();
        assert_eq!(paths.structured, PathBuf::from("layout.py"));
        assert_eq!(storage.read_structured("layout").unwrap(), "LAYOUT_CONFIG = {}");
        assert_eq!(storage.list().unwrap(), vec!["layout"]);
        assert!(storage.exists("layout").unwrap());
        assert!(matches!(storage.read_structured("other"), Err(StorageError::NotFound(_))));
    }
}
