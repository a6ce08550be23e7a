//! Pointer events delivered by the host.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in viewport (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    /// Wheel rotation in notches; positive zooms in.
    Wheel {
        position: Point,
        notches: i32,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Wheel { position, .. } => position,
        }
    }
}

/// Button and position tracking between events.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Button currently held, if any.
    pub pressed: Option<MouseButton>,
    /// Latest pointer position in screen coordinates.
    pub position: Point,
    /// Position of the previous event, for drag deltas.
    pub previous: Point,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and return the movement since the previous one.
    pub fn record(&mut self, event: &PointerEvent) -> Vec2 {
        self.previous = self.position;
        self.position = event.position();
        match *event {
            PointerEvent::Down { button, .. } => self.pressed = Some(button),
            PointerEvent::Up { button, .. } if self.pressed == Some(button) => self.pressed = None,
            _ => {}
        }
        self.position - self.previous
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed == Some(button)
    }
}
