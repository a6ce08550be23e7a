//! Rectangular text box.

use super::{ShapeId, ShapeKind, ShapeTrait, TextMetrics, TextRun, Typography, WrapMode};
use crate::fonts::ResolvedFont;
use crate::registry::Registered;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder paragraph for new boxes.
pub const LOREM_LONG: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis \
nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure \
dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur.";

/// An axis-aligned region with justified text.
#[derive(Debug, Clone)]
pub struct BoxShape {
    pub(crate) id: ShapeId,
    pub(crate) name: String,
    /// Always normalized (`x0 <= x1`, `y0 <= y1`).
    rect: Rect,
    pub typography: Typography,
    pub text: TextRun,
    pub visible: bool,
}

impl BoxShape {
    pub fn new(rect: Rect, typography: Typography) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            rect: rect.abs(),
            typography,
            text: TextRun::new(LOREM_LONG, WrapMode::Justified),
            visible: true,
        }
    }

    /// Create a box from two corner points.
    pub fn from_corners(p1: Point, p2: Point, typography: Typography) -> Self {
        Self::new(Rect::from_points(p1, p2), typography)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Replace the geometry, normalizing the corners.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect.abs();
    }

    /// Lay the text out again inside the current rectangle.
    pub fn relayout(&mut self, font: ResolvedFont, metrics: &dyn TextMetrics) {
        self.text
            .relayout(self.rect, font, self.typography.font_size, metrics);
    }
}

impl ShapeTrait for BoxShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Box
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.rect.inflate(tolerance, tolerance).contains(point)
    }

    fn alignment_points(&self) -> (Vec<f64>, Vec<f64>) {
        (
            vec![self.rect.x0, self.rect.x1],
            vec![self.rect.y0, self.rect.y1],
        )
    }

    fn typography(&self) -> &Typography {
        &self.typography
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Export projection of a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxFields {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub font_name: String,
    pub font_size: u32,
    pub text: String,
}

impl Registered for BoxShape {
    const KIND: ShapeKind = ShapeKind::Box;
    type Fields = BoxFields;

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn export_fields(&self) -> BoxFields {
        BoxFields {
            x1: self.rect.x0.round() as i64,
            y1: self.rect.y0.round() as i64,
            x2: self.rect.x1.round() as i64,
            y2: self.rect.y1.round() as i64,
            font_name: self.typography.font_name.clone(),
            font_size: self.typography.font_size,
            text: self.text.content.clone(),
        }
    }
}
