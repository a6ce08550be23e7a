//! Shape definitions for the layout designer.
//!
//! Two variants exist: rectangular text boxes and point labels. Both carry a
//! name (their export key), typography and an attached text run. Shapes are
//! plain data owned by the document's registries; the UI refers to them by
//! [`ShapeRef`].

mod boxes;
mod label;
mod text;

pub use boxes::{BoxFields, BoxShape, LOREM_LONG};
pub use label::{LabelFields, LabelShape, LOREM_SHORT};
pub use text::{ApproximateMetrics, TextLayout, TextMetrics, TextRun, WrapMode};

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Discriminant of the two shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Box,
    Label,
}

impl ShapeKind {
    /// Prefix used for auto-generated names.
    pub fn name_prefix(self) -> &'static str {
        match self {
            ShapeKind::Box => "Box",
            ShapeKind::Label => "Label",
        }
    }
}

/// Stable reference to a placed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeRef {
    pub kind: ShapeKind,
    pub id: ShapeId,
}

impl ShapeRef {
    pub fn new(kind: ShapeKind, id: ShapeId) -> Self {
        Self { kind, id }
    }
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB components.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// RGB components as exported with labels.
    pub fn to_rgb_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Font file name and point size applied to a shape's text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Typography {
    /// Font file name (e.g. `Tw-Cen-MT-Bold.ttf`) or a system family name.
    pub font_name: String,
    /// Point size.
    pub font_size: u32,
}

impl Typography {
    pub fn new(font_name: impl Into<String>, font_size: u32) -> Self {
        Self {
            font_name: font_name.into(),
            font_size,
        }
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self::new("Arial", 10)
    }
}

/// Capability interface shared by both shape variants.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Which variant this shape is.
    fn kind(&self) -> ShapeKind;

    /// Registry name (empty until registered).
    fn name(&self) -> &str;

    /// Bounding box in scene coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a scene point hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Coordinates other shapes of the same variant may snap to,
    /// as `(x candidates, y candidates)`.
    fn alignment_points(&self) -> (Vec<f64>, Vec<f64>);

    fn typography(&self) -> &Typography;

    fn is_visible(&self) -> bool;

    fn shape_ref(&self) -> ShapeRef {
        ShapeRef::new(self.kind(), self.id())
    }
}
