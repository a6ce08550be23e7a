//! File-based export storage.

use super::{ExportPaths, Storage, StorageError, StorageResult};
use crate::export::LayoutExport;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes exports as `<base>.py` / `<base>.txt` pairs into a directory.
pub struct FileStorage {
    /// Base directory for exports.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create export directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/layoutkit/export/`
    /// On Windows: `%LOCALAPPDATA%\layoutkit\export\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("layoutkit").join("export"))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, base_name: &str, extension: &str) -> PathBuf {
        // Keep the name inside the base directory.
        let safe: String = base_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
            .collect();
        self.base_path.join(format!("{}.{}", safe, extension))
    }

    /// Write `contents` to a temporary file beside `target`.
    fn stage(&self, target: &Path, contents: &str) -> StorageResult<NamedTempFile> {
        let fail = |e: std::io::Error| {
            StorageError::Io(format!("Failed to write {}: {}", target.display(), e))
        };
        let mut staged = NamedTempFile::new_in(&self.base_path).map_err(fail)?;
        staged.write_all(contents.as_bytes()).map_err(fail)?;
        staged.as_file().sync_all().map_err(fail)?;
        Ok(staged)
    }

    /// Read any document from disk.
    pub fn read_path(path: &Path) -> StorageResult<String> {
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }
}

impl Storage for FileStorage {
    fn write_export(&self, export: &LayoutExport) -> StorageResult<ExportPaths> {
        let structured = self.file_path(&export.base_name, "py");
        let human = self.file_path(&export.base_name, "txt");

        for target in [&structured, &human] {
            if target.is_dir() {
                return Err(StorageError::Io(format!(
                    "Cannot replace directory {}",
                    target.display()
                )));
            }
        }

        // Both documents are complete on disk before either target changes.
        let staged_structured = self.stage(&structured, &export.structured)?;
        let staged_human = self.stage(&human, &export.human)?;

        staged_human.persist(&human).map_err(|e| {
            StorageError::Io(format!("Failed to replace {}: {}", human.display(), e.error))
        })?;
        if let Err(e) = staged_structured.persist(&structured) {
            log::error!(
                "{} was replaced but {} was not: {}",
                human.display(),
                structured.display(),
                e.error
            );
            return Err(StorageError::Io(format!(
                "Failed to replace {}: {}",
                structured.display(),
                e.error
            )));
        }

        log::info!("Wrote {} and {}", structured.display(), human.display());
        Ok(ExportPaths { structured, human })
    }

    fn read_structured(&self, base_name: &str) -> StorageResult<String> {
        let path = self.file_path(base_name, "py");
        if !path.exists() {
            return Err(StorageError::NotFound(base_name.to_string()));
        }
        Self::read_path(&path)
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "py"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, base_name: &str) -> StorageResult<bool> {
        Ok(self.file_path(base_name, "py").exists())
    }
}
