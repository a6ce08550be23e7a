//! Manipulation handles on a box.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Part of a box grabbed by the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Inside the box away from every edge: moves the whole box.
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl HandleKind {
    pub fn affects_left(self) -> bool {
        matches!(self, HandleKind::Left | HandleKind::TopLeft | HandleKind::BottomLeft)
    }

    pub fn affects_right(self) -> bool {
        matches!(self, HandleKind::Right | HandleKind::TopRight | HandleKind::BottomRight)
    }

    pub fn affects_top(self) -> bool {
        matches!(self, HandleKind::Top | HandleKind::TopLeft | HandleKind::TopRight)
    }

    pub fn affects_bottom(self) -> bool {
        matches!(self, HandleKind::Bottom | HandleKind::BottomLeft | HandleKind::BottomRight)
    }

    /// Whether dragging this handle resizes rather than moves.
    pub fn is_resize(self) -> bool {
        self != HandleKind::Center
    }

    pub fn cursor(self) -> CursorHint {
        match self {
            HandleKind::Center => CursorHint::Move,
            HandleKind::Top | HandleKind::Bottom => CursorHint::ResizeVertical,
            HandleKind::Left | HandleKind::Right => CursorHint::ResizeHorizontal,
            HandleKind::TopLeft | HandleKind::BottomRight => CursorHint::ResizeNwSe,
            HandleKind::TopRight | HandleKind::BottomLeft => CursorHint::ResizeNeSw,
        }
    }
}

/// Pointer shape the host should show over a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Move,
    ResizeHorizontal,
    ResizeVertical,
    ResizeNwSe,
    ResizeNeSw,
}

/// Find the handle under `pos`, if any.
///
/// Corners win over edges. An edge only counts while the other coordinate
/// lies within the box span. Any other point inside the box is the center.
pub fn detect_handle(pos: Point, rect: Rect, margin: f64) -> Option<HandleKind> {
    let rect = rect.abs();
    let near_left = (pos.x - rect.x0).abs() <= margin;
    let near_right = (pos.x - rect.x1).abs() <= margin;
    let near_top = (pos.y - rect.y0).abs() <= margin;
    let near_bottom = (pos.y - rect.y1).abs() <= margin;
    let within_x = pos.x >= rect.x0 && pos.x <= rect.x1;
    let within_y = pos.y >= rect.y0 && pos.y <= rect.y1;

    let handle = if near_left && near_top {
        HandleKind::TopLeft
    } else if near_right && near_top {
        HandleKind::TopRight
    } else if near_left && near_bottom {
        HandleKind::BottomLeft
    } else if near_right && near_bottom {
        HandleKind::BottomRight
    } else if near_top && within_x {
        HandleKind::Top
    } else if near_bottom && within_x {
        HandleKind::Bottom
    } else if near_left && within_y {
        HandleKind::Left
    } else if near_right && within_y {
        HandleKind::Right
    } else if within_x && within_y {
        HandleKind::Center
    } else {
        return None;
    };
    Some(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 160.0)
    }

    #[test]
    fn test_corners_take_priority() {
        assert_eq!(detect_handle(Point::new(98.0, 103.0), rect(), 5.0), Some(HandleKind::TopLeft));
        assert_eq!(detect_handle(Point::new(204.0, 97.0), rect(), 5.0), Some(HandleKind::TopRight));
        assert_eq!(detect_handle(Point::new(100.0, 160.0), rect(), 5.0), Some(HandleKind::BottomLeft));
        assert_eq!(detect_handle(Point::new(201.0, 158.0), rect(), 5.0), Some(HandleKind::BottomRight));
    }

    #[test]
    fn test_edges_need_span() {
        assert_eq!(detect_handle(Point::new(150.0, 97.0), rect(), 5.0), Some(HandleKind::Top));
        assert_eq!(detect_handle(Point::new(150.0, 163.0), rect(), 5.0), Some(HandleKind::Bottom));
        assert_eq!(detect_handle(Point::new(96.0, 130.0), rect(), 5.0), Some(HandleKind::Left));
        assert_eq!(detect_handle(Point::new(203.0, 130.0), rect(), 5.0), Some(HandleKind::Right));
    }

    #[test]
    fn test_center_and_outside() {
        assert_eq!(detect_handle(Point::new(150.0, 130.0), rect(), 5.0), Some(HandleKind::Center));
        assert_eq!(detect_handle(Point::new(250.0, 130.0), rect(), 5.0), None);
        assert_eq!(detect_handle(Point::new(150.0, 90.0), rect(), 5.0), None);
    }

    #[test]
    fn test_cursor_hints() {
        assert_eq!(HandleKind::Center.cursor(), CursorHint::Move);
        assert_eq!(HandleKind::BottomRight.cursor(), CursorHint::ResizeNwSe);
        assert_eq!(HandleKind::Left.cursor(), CursorHint::ResizeHorizontal);
        assert!(!HandleKind::Center.is_resize());
    }
}
