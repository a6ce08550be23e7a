//! Alignment snapping against sibling shapes.
//!
//! While a shape is manipulated the pointer is compared against coordinates
//! contributed by the other shapes of the same variant: box edges, or label
//! points. Within the threshold the axis snaps and a guide line spanning the
//! whole scene is shown.

use crate::shapes::{ShapeId, ShapeKind, ShapeTrait};
use kurbo::{Line, Point, Rect};

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Direction of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideOrientation {
    /// Constant x, spans the scene height.
    Vertical,
    /// Constant y, spans the scene width.
    Horizontal,
}

/// A guide indicator for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub orientation: GuideOrientation,
    pub line: Line,
}

/// Sorted, deduplicated coordinates shapes can align to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentCandidates {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl AlignmentCandidates {
    /// Gather candidates from visible shapes of `kind`, skipping `exclude`.
    pub fn collect<'a, I>(shapes: I, kind: ShapeKind, exclude: Option<ShapeId>) -> Self
    where
        I: IntoIterator<Item = &'a dyn ShapeTrait>,
    {
        let mut xs = Vec::new();
        let mut ys = Vec::new();

        for shape in shapes {
            if shape.kind() != kind || !shape.is_visible() || Some(shape.id()) == exclude {
                continue;
            }
            let (px, py) = shape.alignment_points();
            xs.extend(px);
            ys.extend(py);
        }

        Self {
            xs: sorted_unique(xs),
            ys: sorted_unique(ys),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty() && self.ys.is_empty()
    }
}

fn sorted_unique(mut values: Vec<f64>) -> Vec<f64> {
    values.retain(|v| v.is_finite());
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// First candidate (ascending) within `threshold` of `value`.
pub fn first_within(candidates: &[f64], value: f64, threshold: f64) -> Option<f64> {
    candidates
        .iter()
        .copied()
        .find(|c| (value - c).abs() <= threshold)
}

/// Per-gesture alignment state: retained snap and visible guides.
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    threshold: f64,
    guides: Vec<Guide>,
    last_x: Option<f64>,
    last_y: Option<f64>,
}

impl AlignmentEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            guides: Vec::new(),
            last_x: None,
            last_y: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Recompute the snap for `pos` and replace the guides.
    pub fn update_guides(
        &mut self,
        pos: Point,
        candidates: &AlignmentCandidates,
        scene: Rect,
    ) -> SnapResult {
        self.clear_guides();

        self.last_x = first_within(&candidates.xs, pos.x, self.threshold);
        self.last_y = first_within(&candidates.ys, pos.y, self.threshold);

        if let Some(x) = self.last_x {
            self.guides.push(Guide {
                orientation: GuideOrientation::Vertical,
                line: Line::new((x, scene.y0), (x, scene.y1)),
            });
        }
        if let Some(y) = self.last_y {
            self.guides.push(Guide {
                orientation: GuideOrientation::Horizontal,
                line: Line::new((scene.x0, y), (scene.x1, y)),
            });
        }

        SnapResult {
            point: self.snapped_pos(pos),
            snapped_x: self.last_x.is_some(),
            snapped_y: self.last_y.is_some(),
        }
    }

    /// Substitute the retained snap per axis.
    pub fn snapped_pos(&self, pos: Point) -> Point {
        Point::new(self.last_x.unwrap_or(pos.x), self.last_y.unwrap_or(pos.y))
    }

    /// Drop guides and the retained snap.
    pub fn clear_guides(&mut self) {
        self.guides.clear();
        self.last_x = None;
        self.last_y = None;
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BoxShape, LabelShape, Typography};

    fn scene() -> Rect {
        Rect::new(0.0, 0.0, 1200.0, 700.0)
    }

    #[test]
    fn test_first_ascending_wins_over_nearest() {
        let candidates = AlignmentCandidates {
            xs: vec![10.0, 12.0, 50.0],
            ys: vec![],
        };
        let mut engine = AlignmentEngine::new(4.0);
        let result = engine.update_guides(Point::new(11.0, 300.0), &candidates, scene());
        assert_eq!(result.point, Point::new(10.0, 300.0));
        assert!(result.snapped_x);
        assert!(!result.snapped_y);
        assert!(result.is_snapped());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(first_within(&[100.0], 104.0, 4.0), Some(100.0));
        assert_eq!(first_within(&[100.0], 104.5, 4.0), None);
    }

    #[test]
    fn test_guides_span_scene() {
        let candidates = AlignmentCandidates {
            xs: vec![196.0],
            ys: vec![40.0],
        };
        let mut engine = AlignmentEngine::new(4.0);
        engine.update_guides(Point::new(198.0, 42.0), &candidates, scene());

        let guides = engine.guides();
        assert_eq!(guides.len(), 2);
        assert_eq!(guides[0].orientation, GuideOrientation::Vertical);
        assert_eq!(guides[0].line, Line::new((196.0, 0.0), (196.0, 700.0)));
        assert_eq!(guides[1].line, Line::new((0.0, 40.0), (1200.0, 40.0)));
    }

    #[test]
    fn test_clear_resets_snap() {
        let candidates = AlignmentCandidates {
            xs: vec![10.0],
            ys: vec![10.0],
        };
        let mut engine = AlignmentEngine::new(4.0);
        engine.update_guides(Point::new(12.0, 12.0), &candidates, scene());
        assert_eq!(engine.snapped_pos(Point::new(0.0, 0.0)), Point::new(10.0, 10.0));

        engine.clear_guides();
        assert!(engine.guides().is_empty());
        assert_eq!(engine.snapped_pos(Point::new(1.0, 2.0)), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_candidates_filtered_by_variant_and_visibility() {
        let a = BoxShape::new(Rect::new(0.0, 0.0, 100.0, 50.0), Typography::default());
        let b = BoxShape::new(Rect::new(196.0, 0.0, 300.0, 50.0), Typography::default());
        let mut hidden = BoxShape::new(Rect::new(500.0, 500.0, 600.0, 600.0), Typography::default());
        hidden.visible = false;
        let label = LabelShape::new(Point::new(77.0, 77.0), Typography::default());

        let shapes: Vec<&dyn ShapeTrait> = vec![&a, &b, &hidden, &label];
        let candidates =
            AlignmentCandidates::collect(shapes.iter().copied(), ShapeKind::Box, Some(b.id()));
        assert_eq!(candidates.xs, vec![0.0, 100.0]);
        assert_eq!(candidates.ys, vec![0.0, 50.0]);

        let labels = AlignmentCandidates::collect(shapes.iter().copied(), ShapeKind::Label, None);
        assert_eq!(labels.xs, vec![77.0]);
        assert_eq!(labels.ys, vec![77.0]);
    }

    #[test]
    fn test_candidates_are_deduplicated() {
        let a = BoxShape::new(Rect::new(0.0, 0.0, 100.0, 50.0), Typography::default());
        let b = BoxShape::new(Rect::new(100.0, 0.0, 200.0, 50.0), Typography::default());
        let shapes: Vec<&dyn ShapeTrait> = vec![&b, &a];
        let candidates = AlignmentCandidates::collect(shapes, ShapeKind::Box, None);
        assert_eq!(candidates.xs, vec![0.0, 100.0, 200.0]);
        assert_eq!(candidates.ys, vec![0.0, 50.0]);
    }
}
