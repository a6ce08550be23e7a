//! Point label.

use super::{
    SerializableColor, ShapeId, ShapeKind, ShapeTrait, TextMetrics, TextRun, Typography, WrapMode,
};
use crate::fonts::ResolvedFont;
use crate::registry::Registered;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder text for new labels.
pub const LOREM_SHORT: &str = "Lorem";

/// Half the side of the marker drawn at the label point.
const MARKER_HALF: f64 = 2.5;

/// A single anchor point with a one-line text run.
#[derive(Debug, Clone)]
pub struct LabelShape {
    pub(crate) id: ShapeId,
    pub(crate) name: String,
    pub position: Point,
    pub typography: Typography,
    pub text: TextRun,
    /// Fill exported with the label.
    pub fill: SerializableColor,
    pub visible: bool,
}

impl LabelShape {
    pub fn new(position: Point, typography: Typography) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            position,
            typography,
            text: TextRun::new(LOREM_SHORT, WrapMode::Simple),
            fill: SerializableColor::black(),
            visible: true,
        }
    }

    /// Lay the text out again at the current position.
    pub fn relayout(&mut self, font: ResolvedFont, metrics: &dyn TextMetrics) {
        let anchor = Rect::from_origin_size(self.position, (0.0, 0.0));
        self.text
            .relayout(anchor, font, self.typography.font_size, metrics);
    }
}

impl ShapeTrait for LabelShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Label
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, (MARKER_HALF * 2.0, MARKER_HALF * 2.0))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance(point) <= tolerance
    }

    fn alignment_points(&self) -> (Vec<f64>, Vec<f64>) {
        (vec![self.position.x], vec![self.position.y])
    }

    fn typography(&self) -> &Typography {
        &self.typography
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Export projection of a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelFields {
    pub x: i64,
    pub y: i64,
    pub font_name: String,
    pub font_size: u32,
    pub fill: (u8, u8, u8),
    pub text: String,
}

impl Registered for LabelShape {
    const KIND: ShapeKind = ShapeKind::Label;
    type Fields = LabelFields;

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn export_fields(&self) -> LabelFields {
        LabelFields {
            x: self.position.x.round() as i64,
            y: self.position.y.round() as i64,
            font_name: self.typography.font_name.clone(),
            font_size: self.typography.font_size,
            fill: self.fill.to_rgb_tuple(),
            text: self.text.content.clone(),
        }
    }
}
