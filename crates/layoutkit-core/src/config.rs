//! Editor configuration.
//!
//! Every field has a default, so a TOML file only needs to name the values it
//! overrides:
//!
//! ```toml
//! snap_threshold = 6.0
//! fonts_dir = "assets/fonts"
//!
//! [autopan]
//! margin = 40.0
//! ```

use crate::error::{LayoutError, LayoutResult};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for the interactive editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Distance (scene units) within which a coordinate snaps to a sibling.
    pub snap_threshold: f64,
    /// Distance from a box edge that still grabs the edge handle.
    pub handle_margin: f64,
    /// Minimum width and height of a box at rest.
    pub min_box_size: f64,
    /// Pick radius around a label point.
    pub label_hit_radius: f64,
    /// Font applied to new shapes when none is requested.
    pub default_font: String,
    /// Point size applied to new shapes.
    pub default_font_size: u32,
    /// Smallest point size reachable through size adjustments.
    pub min_font_size: u32,
    /// Directory holding font files referenced by name.
    pub fonts_dir: PathBuf,
    /// Export directory; `None` uses the per-user data directory.
    pub export_dir: Option<PathBuf>,
    /// Scene size shown while no background template is loaded.
    pub placeholder_size: Size,
    pub autopan: AutoPanConfig,
    pub zoom: ZoomConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 4.0,
            handle_margin: 5.0,
            min_box_size: 8.0,
            label_hit_radius: 5.0,
            default_font: "Arial".to_string(),
            default_font_size: 10,
            min_font_size: 4,
            fonts_dir: PathBuf::from("fonts"),
            export_dir: None,
            placeholder_size: Size::new(1200.0, 700.0),
            autopan: AutoPanConfig::default(),
            zoom: ZoomConfig::default(),
        }
    }
}

/// Edge auto-pan while dragging near the viewport border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPanConfig {
    /// Width of the viewport band that triggers panning (screen pixels).
    pub margin: f64,
    /// Scroll distance per tick (screen pixels).
    pub speed: f64,
    /// Tick interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for AutoPanConfig {
    fn default() -> Self {
        Self {
            margin: 30.0,
            speed: 10.0,
            interval_ms: 20,
        }
    }
}

/// Stepped wheel zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub factor: f64,
    pub min_step: i32,
    pub max_step: i32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            factor: 1.25,
            min_step: -8,
            max_step: 20,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> LayoutResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LayoutError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> LayoutResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LayoutError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values that would break the geometry invariants.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.snap_threshold.is_nan() || self.snap_threshold < 0.0 {
            return Err(LayoutError::Config("snap_threshold must be >= 0".into()));
        }
        if self.handle_margin.is_nan() || self.handle_margin < 0.0 {
            return Err(LayoutError::Config("handle_margin must be >= 0".into()));
        }
        if self.min_box_size.is_nan() || self.min_box_size <= 0.0 {
            return Err(LayoutError::Config("min_box_size must be > 0".into()));
        }
        if self.min_font_size == 0 || self.default_font_size < self.min_font_size {
            return Err(LayoutError::Config(
                "default_font_size must be >= min_font_size >= 1".into(),
            ));
        }
        if self.autopan.interval_ms == 0 {
            return Err(LayoutError::Config("autopan.interval_ms must be > 0".into()));
        }
        if self.zoom.factor.is_nan() || self.zoom.factor <= 1.0 || self.zoom.min_step > self.zoom.max_step {
            return Err(LayoutError::Config("invalid zoom settings".into()));
        }
        Ok(())
    }

    /// Resolve the export directory, falling back to the per-user data dir.
    pub fn resolved_export_dir(&self) -> Option<PathBuf> {
        self.export_dir.clone().or_else(|| {
            dirs::data_local_dir()
                .or_else(dirs::home_dir)
                .map(|base| base.join("layoutkit").join("export"))
        })
    }
}
