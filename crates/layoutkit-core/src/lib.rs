//! LayoutKit Core Library
//!
//! Platform-agnostic geometry engine for the LayoutKit designer: grid
//! quantization, named shape registries, alignment snapping, the shape
//! drag/resize controller and the layout export/import format.

pub mod alignment;
pub mod autopan;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod fonts;
pub mod grid;
pub mod handles;
pub mod input;
pub mod registry;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use alignment::{AlignmentCandidates, AlignmentEngine, Guide, GuideOrientation, SnapResult};
pub use camera::Camera;
pub use canvas::{Document, DocumentSnapshot, Editor, EditorEvent, ShapeRequest};
pub use config::EditorConfig;
pub use controller::{GeometryChange, ShapeController};
pub use error::{LayoutError, LayoutResult};
pub use export::{LayoutExport, export_layout, import_layout};
pub use fonts::{FontCache, FontResolver, ResolvedFont};
pub use grid::{GRID_UNIT, quantize, quantize_point, quantize_rect};
pub use handles::{CursorHint, HandleKind, detect_handle};
pub use input::{MouseButton, PointerEvent, PointerState};
pub use registry::{NameRegistry, Registered};
pub use shapes::{BoxShape, LabelShape, ShapeKind, ShapeRef, ShapeTrait, Typography};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use tools::{InteractionMode, ToolManager};
