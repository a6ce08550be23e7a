//! Font resolution for shape typography.
//!
//! Shapes name their font by file (`Tw-Cen-MT-Bold.ttf`) the way the exported
//! layout references it. The resolver maps that name to a family for the text
//! layout. Lookups go through a [`FontCache`] owned by the editor session and
//! handed in by the caller.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Family used when a font file cannot be found.
pub const FALLBACK_FAMILY: &str = "Arial";

const STYLE_WORDS: &[&str] = &[
    "bold", "italic", "regular", "light", "medium", "semibold", "black", "thin", "oblique",
];

/// Outcome of resolving a font name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    /// Family name used for layout and rendering.
    pub family: String,
    /// Bold weight inferred from the file name.
    pub bold: bool,
    /// False when the requested file was missing and the fallback was used.
    pub found: bool,
}

impl ResolvedFont {
    pub fn fallback() -> Self {
        Self {
            family: FALLBACK_FAMILY.to_string(),
            bold: false,
            found: true,
        }
    }
}

impl Default for ResolvedFont {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Cache of font file path -> resolved family.
#[derive(Debug, Clone, Default)]
pub struct FontCache {
    families: HashMap<PathBuf, String>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.families.get(path).map(String::as_str)
    }

    pub fn insert(&mut self, path: PathBuf, family: String) {
        self.families.insert(path, family);
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn clear(&mut self) {
        self.families.clear();
    }
}

/// Resolves font names against a fonts directory.
#[derive(Debug, Clone)]
pub struct FontResolver {
    fonts_dir: PathBuf,
}

impl FontResolver {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
        }
    }

    pub fn fonts_dir(&self) -> &Path {
        &self.fonts_dir
    }

    /// Resolve a font name to a family, consulting and filling `cache`.
    pub fn resolve(&self, font_name: &str, cache: &mut FontCache) -> ResolvedFont {
        if font_name.is_empty() || font_name.eq_ignore_ascii_case(FALLBACK_FAMILY) {
            return ResolvedFont::fallback();
        }

        let path = self.fonts_dir.join(font_name);
        let bold = font_name.to_lowercase().contains("bold");

        if let Some(family) = cache.get(&path) {
            return ResolvedFont {
                family: family.to_string(),
                bold,
                found: true,
            };
        }

        if path.is_file() {
            let family = family_from_file_name(font_name);
            cache.insert(path, family.clone());
            return ResolvedFont {
                family,
                bold,
                found: true,
            };
        }

        log::warn!(
            "Font {} not found in {}, using {}",
            font_name,
            self.fonts_dir.display(),
            FALLBACK_FAMILY
        );
        ResolvedFont {
            family: FALLBACK_FAMILY.to_string(),
            bold: false,
            found: false,
        }
    }

    /// List font files (`.ttf`, `.otf`) in the fonts directory, sorted.
    pub fn available_fonts(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.fonts_dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let path = entry.path();
                let ext = path.extension()?.to_str()?.to_lowercase();
                if ext == "ttf" || ext == "otf" {
                    path.file_name()?.to_str().map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        names
    }
}

/// Derive a family name from a font file name.
///
/// `Tw-Cen-MT-Bold.ttf` becomes `Tw Cen MT`; style words at the end are
/// dropped unless nothing else would remain.
pub fn family_from_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let words: Vec<&str> = stem
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .collect();

    let mut end = words.len();
    while end > 1 && STYLE_WORDS.contains(&words[end - 1].to_lowercase().as_str()) {
        end -= 1;
    }

    if end == 0 {
        return stem.to_string();
    }
    words[..end].join(" ")
}
