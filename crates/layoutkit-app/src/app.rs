//! Command handlers behind the `layoutkit` binary.

use chrono::NaiveDateTime;
use layoutkit_core::storage::ExportPaths;
use layoutkit_core::{Editor, EditorConfig, FileStorage, FontResolver, LayoutError, StorageError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("No export directory available; pass --out")]
    NoExportDir,
}

pub type AppResult<T> = Result<T, AppError>;

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub editor: EditorConfig,
    /// File the editor settings were read from.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Load settings from `path`, or use defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let editor = EditorConfig::load(path)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(Self {
            editor,
            source: Some(path.to_path_buf()),
        })
    }
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn open(&self, file: &Path) -> AppResult<Editor> {
        let mut editor = Editor::new(self.config.editor.clone());
        let count = editor.import_file(file)?;
        log::debug!("Opened {} with {} shapes", file.display(), count);
        Ok(editor)
    }

    /// JSON view of a structured layout document.
    pub fn inspect(&self, file: &Path) -> AppResult<String> {
        let editor = self.open(file)?;
        Ok(editor.document.snapshot().to_json()?)
    }

    /// Import a structured document and write a fresh export pair.
    ///
    /// With a template the export is named after it. Without `out` the
    /// configured export directory is used.
    pub fn reexport(
        &self,
        file: &Path,
        out: Option<&Path>,
        template: Option<&Path>,
        timestamp: NaiveDateTime,
    ) -> AppResult<ExportPaths> {
        let mut editor = self.open(file)?;
        if let Some(template) = template {
            editor.load_background(template, self.config.editor.placeholder_size);
        }

        let dir = match out {
            Some(dir) => dir.to_path_buf(),
            None => self
                .config
                .editor
                .resolved_export_dir()
                .ok_or(AppError::NoExportDir)?,
        };
        let storage = FileStorage::new(dir)?;
        Ok(editor.export_to(&storage, timestamp)?)
    }

    /// Font files available in the configured fonts directory.
    pub fn fonts(&self) -> Vec<String> {
        FontResolver::new(self.config.editor.fonts_dir.clone()).available_fonts()
    }
}
