//! Edge auto-pan during drags.
//!
//! While a gesture is active and the pointer sits within `margin` pixels of a
//! viewport edge, the view scrolls by `speed` pixels toward that edge on
//! every tick. The host clock drives ticks through [`AutoPan::tick`].

use crate::config::AutoPanConfig;
use kurbo::{Point, Size, Vec2};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AutoPan {
    config: AutoPanConfig,
    delta: Vec2,
    last_screen_pos: Option<Point>,
    next_due: Option<Instant>,
}

impl AutoPan {
    pub fn new(config: AutoPanConfig) -> Self {
        Self {
            config,
            delta: Vec2::ZERO,
            last_screen_pos: None,
            next_due: None,
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.config.interval_ms)
    }

    /// Scroll direction for a pointer at `pos` inside a viewport of `size`.
    pub fn edge_delta(&self, pos: Point, size: Size) -> Vec2 {
        let axis = |value: f64, extent: f64| {
            if value < self.config.margin {
                -self.config.speed
            } else if value > extent - self.config.margin {
                self.config.speed
            } else {
                0.0
            }
        };
        Vec2::new(axis(pos.x, size.width), axis(pos.y, size.height))
    }

    /// Re-evaluate after a pointer move. Returns whether panning is active.
    pub fn evaluate(&mut self, pos: Point, viewport: Size, gesture_active: bool, now: Instant) -> bool {
        self.last_screen_pos = Some(pos);
        let delta = if gesture_active {
            self.edge_delta(pos, viewport)
        } else {
            Vec2::ZERO
        };

        if delta == Vec2::ZERO {
            self.stop();
            return false;
        }

        if self.next_due.is_none() {
            log::debug!("Auto-pan started toward {:?}", delta);
            self.next_due = Some(now + self.interval());
        }
        self.delta = delta;
        true
    }

    /// Scroll delta due at `now`, if a tick has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<Vec2> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(now + self.interval());
        Some(self.delta)
    }

    pub fn stop(&mut self) {
        if self.next_due.take().is_some() {
            log::debug!("Auto-pan stopped");
        }
        self.delta = Vec2::ZERO;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Last pointer position seen, in viewport coordinates.
    pub fn last_screen_pos(&self) -> Option<Point> {
        self.last_screen_pos
    }
}
