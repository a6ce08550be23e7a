//! Camera module for scroll/zoom transforms.

use crate::config::ZoomConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the view transform for the canvas.
///
/// Zoom is stepped: each wheel notch multiplies or divides the scale by
/// `factor`, within `min_step..=max_step`. Scrolling is clamped so the
/// viewport never leaves the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (screen pixels).
    pub offset: Vec2,
    /// Viewport size in screen pixels.
    pub viewport: Size,
    step: i32,
    zoom: ZoomConfig,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

impl Camera {
    pub fn new(zoom: ZoomConfig) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport: Size::new(800.0, 600.0),
            step: 0,
            zoom,
        }
    }

    /// Current scale factor.
    pub fn zoom(&self) -> f64 {
        self.zoom.factor.powi(self.step)
    }

    pub fn zoom_step(&self) -> i32 {
        self.step
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom())
    }

    /// Get the inverse transform for input handling (screen to world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom()) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Part of the scene currently visible.
    pub fn visible_world_rect(&self) -> Rect {
        Rect::from_points(
            self.screen_to_world(Point::ZERO),
            self.screen_to_world(Point::new(self.viewport.width, self.viewport.height)),
        )
    }

    /// Scroll the view by a screen-space delta, clamped to `scene`.
    ///
    /// A positive delta reveals content to the right/bottom.
    pub fn scroll_by(&mut self, delta: Vec2, scene: Rect) {
        self.offset -= delta;
        self.clamp_to_scene(scene);
    }

    /// Zoom by `steps` notches keeping `screen_point` fixed.
    /// Returns false when already at the limit.
    pub fn zoom_at(&mut self, screen_point: Point, steps: i32, scene: Rect) -> bool {
        let new_step = (self.step + steps).clamp(self.zoom.min_step, self.zoom.max_step);
        if new_step == self.step {
            return false;
        }

        let world_point = self.screen_to_world(screen_point);
        self.step = new_step;

        // Adjust offset so world_point stays at screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
        self.clamp_to_scene(scene);
        true
    }

    /// Keep the viewport inside the scene; a scene smaller than the
    /// viewport on an axis is centered on that axis.
    pub fn clamp_to_scene(&mut self, scene: Rect) {
        let zoom = self.zoom();
        self.offset.x = clamp_axis(self.offset.x, scene.x0, scene.x1, zoom, self.viewport.width);
        self.offset.y = clamp_axis(self.offset.y, scene.y0, scene.y1, zoom, self.viewport.height);
    }

    /// Reset to 100% with the scene origin at the top-left.
    pub fn reset(&mut self, scene: Rect) {
        self.step = 0;
        self.offset = Vec2::new(-scene.x0, -scene.y0);
        self.clamp_to_scene(scene);
    }
}

fn clamp_axis(offset: f64, min: f64, max: f64, zoom: f64, viewport: f64) -> f64 {
    let content = (max - min) * zoom;
    if content <= viewport {
        (viewport - content) / 2.0 - min * zoom
    } else {
        offset.clamp(viewport - max * zoom, -min * zoom)
    }
}
