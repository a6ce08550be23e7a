//! Pointer manipulation of placed shapes.
//!
//! The controller is a two-state machine. A press in transform mode over a
//! shape captures its starting geometry and the starting pointer; every move
//! recomputes the geometry from those, never incrementally, so quantization
//! errors do not accumulate over a drag.

use crate::alignment::{AlignmentCandidates, AlignmentEngine};
use crate::canvas::Document;
use crate::config::EditorConfig;
use crate::grid::{quantize_f64, quantize_point};
use crate::handles::{CursorHint, HandleKind, detect_handle};
use crate::shapes::{ShapeKind, ShapeRef, ShapeTrait};
use crate::tools::InteractionMode;
use kurbo::{Point, Rect, Vec2};

/// Outcome of feeding a pointer move to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryChange {
    /// Nothing is being dragged, or the geometry did not move.
    Unchanged,
    /// The target's geometry was updated.
    Committed(ShapeRef),
    /// The candidate geometry violated the minimum size and was discarded.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StartGeometry {
    Rect(Rect),
    Point(Point),
}

/// Snapshot taken when a drag begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub target: ShapeRef,
    pub handle: HandleKind,
    pub start_pointer: Point,
    start: StartGeometry,
}

impl DragState {
    /// Pointer travel since the press.
    pub fn delta(&self, pointer: Point) -> Vec2 {
        pointer - self.start_pointer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Dragging(DragState),
}

/// Drag/resize state machine shared by all shapes.
#[derive(Debug, Clone)]
pub struct ShapeController {
    state: ControllerState,
    handle_margin: f64,
    min_box_size: f64,
    label_hit_radius: f64,
}

impl ShapeController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: ControllerState::Idle,
            handle_margin: config.handle_margin,
            min_box_size: config.min_box_size,
            label_hit_radius: config.label_hit_radius,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ControllerState::Dragging(_))
    }

    pub fn target(&self) -> Option<ShapeRef> {
        match self.state {
            ControllerState::Dragging(drag) => Some(drag.target),
            ControllerState::Idle => None,
        }
    }

    /// Topmost shape and handle under `pos`. Labels sit above boxes.
    pub fn pick(&self, doc: &Document, pos: Point) -> Option<(ShapeRef, HandleKind)> {
        let label = doc
            .labels
            .iter()
            .rev()
            .map(|(_, label)| label)
            .find(|label| label.is_visible() && label.hit_test(pos, self.label_hit_radius));
        if let Some(label) = label {
            return Some((label.shape_ref(), HandleKind::Center));
        }

        doc.boxes
            .iter()
            .rev()
            .filter(|(_, shape)| shape.is_visible())
            .find_map(|(_, shape)| {
                detect_handle(pos, shape.rect(), self.handle_margin)
                    .map(|handle| (shape.shape_ref(), handle))
            })
    }

    /// Cursor to show while hovering in `mode`.
    pub fn hover_cursor(&self, doc: &Document, mode: InteractionMode, pos: Point) -> CursorHint {
        if let ControllerState::Dragging(drag) = self.state {
            return drag.handle.cursor();
        }
        if mode != InteractionMode::Transform {
            return CursorHint::Default;
        }
        self.pick(doc, pos)
            .map(|(_, handle)| handle.cursor())
            .unwrap_or_default()
    }

    /// Start a drag. Only transform mode grabs shapes; elsewhere the press
    /// passes through and `None` is returned.
    pub fn press(&mut self, doc: &Document, mode: InteractionMode, pos: Point) -> Option<ShapeRef> {
        if mode != InteractionMode::Transform {
            return None;
        }
        let (target, handle) = self.pick(doc, pos)?;

        let start = match target.kind {
            ShapeKind::Box => StartGeometry::Rect(doc.boxes.find_by_id(target.id)?.rect()),
            ShapeKind::Label => StartGeometry::Point(doc.labels.find_by_id(target.id)?.position),
        };

        log::debug!("Drag start on {:?} with {:?} handle", target, handle);
        self.state = ControllerState::Dragging(DragState {
            target,
            handle,
            start_pointer: pos,
            start,
        });
        Some(target)
    }

    /// Apply a pointer move to the dragged shape.
    pub fn drag(
        &mut self,
        doc: &mut Document,
        engine: &mut AlignmentEngine,
        pos: Point,
    ) -> GeometryChange {
        let ControllerState::Dragging(drag) = self.state else {
            return GeometryChange::Unchanged;
        };

        match drag.start {
            StartGeometry::Rect(start_rect) if drag.handle.is_resize() => {
                self.resize_box(doc, engine, &drag, start_rect, pos)
            }
            StartGeometry::Rect(start_rect) => {
                let origin = quantize_point(start_rect.origin() + drag.delta(pos));
                let rect = Rect::from_origin_size(origin, start_rect.size());
                Self::commit_rect(doc, drag.target, rect)
            }
            StartGeometry::Point(start_pos) => {
                // Guides are shown for reference; the move itself is grid-only.
                let candidates =
                    AlignmentCandidates::collect(doc.shapes(), ShapeKind::Label, Some(drag.target.id));
                engine.update_guides(pos, &candidates, doc.scene_rect());

                let position = quantize_point(start_pos + drag.delta(pos));
                let Some(label) = doc.labels.find_by_id_mut(drag.target.id) else {
                    return GeometryChange::Unchanged;
                };
                if label.position == position {
                    return GeometryChange::Unchanged;
                }
                label.position = position;
                GeometryChange::Committed(drag.target)
            }
        }
    }

    fn resize_box(
        &self,
        doc: &mut Document,
        engine: &mut AlignmentEngine,
        drag: &DragState,
        start_rect: Rect,
        pos: Point,
    ) -> GeometryChange {
        let candidates =
            AlignmentCandidates::collect(doc.shapes(), ShapeKind::Box, Some(drag.target.id));
        let snapped = engine.update_guides(pos, &candidates, doc.scene_rect()).point;
        let delta = drag.delta(snapped);

        let handle = drag.handle;
        let mut rect = start_rect;
        if handle.affects_left() {
            rect.x0 = quantize_f64(start_rect.x0 + delta.x);
        }
        if handle.affects_right() {
            rect.x1 = quantize_f64(start_rect.x1 + delta.x);
        }
        if handle.affects_top() {
            rect.y0 = quantize_f64(start_rect.y0 + delta.y);
        }
        if handle.affects_bottom() {
            rect.y1 = quantize_f64(start_rect.y1 + delta.y);
        }
        let rect = rect.abs();

        if rect.width() < self.min_box_size || rect.height() < self.min_box_size {
            return GeometryChange::Rejected;
        }
        Self::commit_rect(doc, drag.target, rect)
    }

    fn commit_rect(doc: &mut Document, target: ShapeRef, rect: Rect) -> GeometryChange {
        let Some(shape) = doc.boxes.find_by_id_mut(target.id) else {
            return GeometryChange::Unchanged;
        };
        if shape.rect() == rect {
            return GeometryChange::Unchanged;
        }
        shape.set_rect(rect);
        GeometryChange::Committed(target)
    }

    /// End the drag. Guides are cleared whether or not a drag was active.
    pub fn release(&mut self, engine: &mut AlignmentEngine) -> Option<ShapeRef> {
        engine.clear_guides();
        let target = self.target();
        if let Some(target) = target {
            log::debug!("Drag end on {:?}", target);
        }
        self.state = ControllerState::Idle;
        target
    }

    /// Abort the drag and put the target back where it started.
    pub fn cancel(&mut self, doc: &mut Document, engine: &mut AlignmentEngine) -> Option<ShapeRef> {
        engine.clear_guides();
        let ControllerState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return None;
        };

        match drag.start {
            StartGeometry::Rect(rect) => {
                if let Some(shape) = doc.boxes.find_by_id_mut(drag.target.id) {
                    shape.set_rect(rect);
                }
            }
            StartGeometry::Point(position) => {
                if let Some(label) = doc.labels.find_by_id_mut(drag.target.id) {
                    label.position = position;
                }
            }
        }
        log::debug!("Drag cancelled on {:?}", drag.target);
        Some(drag.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BoxShape, LabelShape, Typography};

    fn setup(rects: &[Rect]) -> (Document, ShapeController, AlignmentEngine) {
        let config = EditorConfig::default();
        let mut doc = Document::new(&config);
        for rect in rects {
            doc.boxes.add(BoxShape::new(*rect, Typography::default()), None);
        }
        (doc, ShapeController::new(&config), AlignmentEngine::new(config.snap_threshold))
    }

    fn rect_of(doc: &Document, name: &str) -> Rect {
        doc.boxes.get(name).map(|b| b.rect()).unwrap()
    }

    #[test]
    fn test_press_requires_transform_mode() {
        let (doc, mut controller, _) = setup(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
        let pos = Point::new(50.0, 50.0);
        assert!(controller.press(&doc, InteractionMode::Select, pos).is_none());
        assert!(controller.press(&doc, InteractionMode::CreateBox, pos).is_none());
        assert!(!controller.is_dragging());
        assert!(controller.press(&doc, InteractionMode::Transform, pos).is_some());
        assert!(controller.is_dragging());
    }

    #[test]
    fn test_press_outside_passes_through() {
        let (doc, mut controller, _) = setup(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
        assert!(controller
            .press(&doc, InteractionMode::Transform, Point::new(300.0, 300.0))
            .is_none());
    }

    #[test]
    fn test_center_drag_moves_on_grid_without_snapping() {
        let (mut doc, mut controller, mut engine) = setup(&[
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(200.0, 0.0, 300.0, 100.0),
        ]);
        controller.press(&doc, InteractionMode::Transform, Point::new(250.0, 50.0));
        let change = controller.drag(&mut doc, &mut engine, Point::new(148.0, 57.0));
        assert!(matches!(change, GeometryChange::Committed(_)));
        // 200 - 102 = 98 -> 100, 0 + 7 = 7 -> 5; the sibling edge at 100 is not snapped to.
        assert_eq!(rect_of(&doc, "Box2"), Rect::new(100.0, 5.0, 200.0, 105.0));
        assert!(engine.guides().is_empty());
    }

    #[test]
    fn test_edge_drag_snaps_to_sibling_edge() {
        let (mut doc, mut controller, mut engine) = setup(&[
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(195.0, 0.0, 300.0, 100.0),
            Rect::new(150.0, 200.0, 250.0, 300.0),
        ]);
        controller.press(&doc, InteractionMode::Transform, Point::new(150.0, 250.0));
        controller.drag(&mut doc, &mut engine, Point::new(198.0, 250.0));
        assert_eq!(rect_of(&doc, "Box3").x0, 195.0);
        assert_eq!(engine.guides().len(), 1);

        controller.release(&mut engine);
        assert!(engine.guides().is_empty());
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_snapped_off_grid_edge_lands_on_nearest_grid_line() {
        let (mut doc, mut controller, mut engine) = setup(&[
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(196.0, 0.0, 300.0, 100.0),
            Rect::new(150.0, 200.0, 250.0, 300.0),
        ]);
        controller.press(&doc, InteractionMode::Transform, Point::new(150.0, 250.0));
        controller.drag(&mut doc, &mut engine, Point::new(198.0, 250.0));
        // Snapped to 196, then quantized; without the snap it would be 200.
        assert_eq!(rect_of(&doc, "Box3").x0, 195.0);
    }

    #[test]
    fn test_resize_below_minimum_is_rejected() {
        let (mut doc, mut controller, mut engine) = setup(&[Rect::new(100.0, 100.0, 200.0, 200.0)]);
        controller.press(&doc, InteractionMode::Transform, Point::new(200.0, 150.0));

        let change = controller.drag(&mut doc, &mut engine, Point::new(150.0, 150.0));
        assert!(matches!(change, GeometryChange::Committed(_)));
        assert_eq!(rect_of(&doc, "Box1"), Rect::new(100.0, 100.0, 150.0, 200.0));

        let change = controller.drag(&mut doc, &mut engine, Point::new(104.0, 150.0));
        assert_eq!(change, GeometryChange::Rejected);
        assert_eq!(rect_of(&doc, "Box1"), Rect::new(100.0, 100.0, 150.0, 200.0));
    }

    #[test]
    fn test_resize_past_opposite_edge_normalizes() {
        let (mut doc, mut controller, mut engine) = setup(&[Rect::new(100.0, 100.0, 200.0, 200.0)]);
        controller.press(&doc, InteractionMode::Transform, Point::new(200.0, 150.0));
        controller.drag(&mut doc, &mut engine, Point::new(50.0, 150.0));
        assert_eq!(rect_of(&doc, "Box1"), Rect::new(50.0, 100.0, 100.0, 200.0));
    }

    #[test]
    fn test_corner_drag_moves_two_edges() {
        let (mut doc, mut controller, mut engine) = setup(&[Rect::new(100.0, 100.0, 200.0, 200.0)]);
        controller.press(&doc, InteractionMode::Transform, Point::new(201.0, 199.0));
        controller.drag(&mut doc, &mut engine, Point::new(233.0, 262.0));
        assert_eq!(rect_of(&doc, "Box1"), Rect::new(100.0, 100.0, 230.0, 265.0));
    }

    #[test]
    fn test_cancel_restores_start_geometry() {
        let (mut doc, mut controller, mut engine) = setup(&[Rect::new(100.0, 100.0, 200.0, 200.0)]);
        controller.press(&doc, InteractionMode::Transform, Point::new(150.0, 150.0));
        controller.drag(&mut doc, &mut engine, Point::new(300.0, 300.0));
        assert_ne!(rect_of(&doc, "Box1"), Rect::new(100.0, 100.0, 200.0, 200.0));

        assert!(controller.cancel(&mut doc, &mut engine).is_some());
        assert_eq!(rect_of(&doc, "Box1"), Rect::new(100.0, 100.0, 200.0, 200.0));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_label_drag_quantizes_and_shows_guides() {
        let config = EditorConfig::default();
        let mut doc = Document::new(&config);
        doc.labels
            .add(LabelShape::new(Point::new(100.0, 100.0), Typography::default()), None);
        doc.labels
            .add(LabelShape::new(Point::new(300.0, 300.0), Typography::default()), None);
        let mut controller = ShapeController::new(&config);
        let mut engine = AlignmentEngine::new(config.snap_threshold);

        let target = controller.press(&doc, InteractionMode::Transform, Point::new(301.0, 299.0));
        assert_eq!(target.map(|t| t.kind), Some(ShapeKind::Label));

        controller.drag(&mut doc, &mut engine, Point::new(103.0, 412.0));
        let moved = doc.labels.get("Label2").map(|l| l.position).unwrap();
        assert_eq!(moved, Point::new(100.0, 415.0));
        assert_eq!(engine.guides().len(), 1);
    }

    #[test]
    fn test_hover_cursor() {
        let (doc, controller, _) = setup(&[Rect::new(100.0, 100.0, 200.0, 200.0)]);
        let pos = Point::new(100.0, 150.0);
        assert_eq!(
            controller.hover_cursor(&doc, InteractionMode::Transform, pos),
            CursorHint::ResizeHorizontal
        );
        assert_eq!(
            controller.hover_cursor(&doc, InteractionMode::Select, pos),
            CursorHint::Default
        );
    }
}
