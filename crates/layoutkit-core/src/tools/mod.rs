//! Interaction modes and the create-tool state.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// What a primary-button drag on the canvas does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    /// Drag pans the viewport.
    #[default]
    Select,
    /// Drag moves or resizes the shape under the pointer.
    Transform,
    /// Drag draws a new box.
    CreateBox,
    /// Click places a new label.
    CreateLabel,
}

impl InteractionMode {
    /// Get display name for UI.
    pub fn display_name(self) -> &'static str {
        match self {
            InteractionMode::Select => "Select",
            InteractionMode::Transform => "Transform",
            InteractionMode::CreateBox => "Create Box",
            InteractionMode::CreateLabel => "Create Label",
        }
    }

    /// Whether gestures in this mode trigger edge auto-pan.
    pub fn auto_pans(self) -> bool {
        matches!(self, InteractionMode::Transform | InteractionMode::CreateBox)
    }
}

/// State of a create-box gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for a press.
    #[default]
    Idle,
    /// Dragging out a rectangle.
    Active {
        /// Quantized anchor corner.
        start: Point,
        /// Latest (snapped, quantized) opposite corner.
        current: Point,
    },
}

/// Tracks the current mode and any in-progress creation.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    mode: InteractionMode,
    pub state: ToolState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switch mode, abandoning any in-progress creation.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.state = ToolState::Idle;
    }

    pub fn begin(&mut self, start: Point) {
        self.state = ToolState::Active {
            start,
            current: start,
        };
    }

    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
        }
    }

    /// Finish the gesture, returning the normalized rectangle drawn.
    pub fn end(&mut self) -> Option<Rect> {
        let rect = self.preview_rect();
        self.state = ToolState::Idle;
        rect
    }

    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Temporary rectangle shown while drawing.
    pub fn preview_rect(&self) -> Option<Rect> {
        match self.state {
            ToolState::Active { start, current } => Some(Rect::from_points(start, current)),
            ToolState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gesture_lifecycle() {
        let mut tools = ToolManager::new();
        tools.set_mode(InteractionMode::CreateBox);
        assert!(!tools.is_active());

        tools.begin(Point::new(100.0, 50.0));
        tools.update(Point::new(20.0, 150.0));
        assert_eq!(tools.preview_rect(), Some(Rect::new(20.0, 50.0, 100.0, 150.0)));

        assert_eq!(tools.end(), Some(Rect::new(20.0, 50.0, 100.0, 150.0)));
        assert!(!tools.is_active());
        assert_eq!(tools.end(), None);
    }

    #[test]
    fn test_mode_switch_discards_pending_create() {
        let mut tools = ToolManager::new();
        tools.set_mode(InteractionMode::CreateBox);
        tools.begin(Point::new(0.0, 0.0));
        tools.set_mode(InteractionMode::Transform);
        assert_eq!(tools.preview_rect(), None);
    }

    #[test]
    fn test_auto_pan_modes() {
        assert!(InteractionMode::Transform.auto_pans());
        assert!(InteractionMode::CreateBox.auto_pans());
        assert!(!InteractionMode::Select.auto_pans());
        assert!(!InteractionMode::CreateLabel.auto_pans());
    }
}
