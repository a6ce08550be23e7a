//! Grid quantization for user-driven coordinates.

use kurbo::{Point, Rect};

/// Grid unit every interactive coordinate is rounded to.
pub const GRID_UNIT: f64 = 5.0;

/// Round a coordinate to the nearest multiple of [`GRID_UNIT`].
///
/// Halfway values round away from zero (`2.5 -> 5`, `-2.5 -> -5`), so the
/// result never depends on banker's rounding. NaN maps to 0.
pub fn quantize(value: f64) -> i64 {
    ((value / GRID_UNIT).round() * GRID_UNIT) as i64
}

/// [`quantize`] returned as a scene coordinate.
pub fn quantize_f64(value: f64) -> f64 {
    quantize(value) as f64
}

/// Quantize both axes of a point independently.
pub fn quantize_point(point: Point) -> Point {
    Point::new(quantize_f64(point.x), quantize_f64(point.y))
}

/// Quantize all four edges of a rectangle.
pub fn quantize_rect(rect: Rect) -> Rect {
    Rect::new(
        quantize_f64(rect.x0),
        quantize_f64(rect.y0),
        quantize_f64(rect.x1),
        quantize_f64(rect.y1),
    )
}

/// Whether a coordinate already lies on the grid.
pub fn is_on_grid(value: f64) -> bool {
    value.is_finite() && (value % GRID_UNIT).abs() < f64::EPSILON
}
