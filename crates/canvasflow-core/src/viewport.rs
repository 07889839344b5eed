//! Camera pan/zoom and page ↔ screen conversion.

use crate::settings::EditorSettings;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// View transform of the canvas.
///
/// `offset` is the screen position of the page origin; `zoom` scales page
/// units to screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Factor applied by [`Viewport::zoom_in`] and [`Viewport::zoom_out`].
    pub zoom_step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl Viewport {
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            zoom_step: settings.zoom_step,
        }
    }

    /// Page to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to page transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn page_point(&self, screen: Point) -> Point {
        self.inverse_transform() * screen
    }

    pub fn screen_point(&self, page: Point) -> Point {
        self.transform() * page
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor`, keeping `screen_point` over the same page point.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.set_zoom_at(screen_point, self.zoom * factor);
    }

    fn set_zoom_at(&mut self, screen_point: Point, zoom: f64) {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let page = self.page_point(screen_point);
        self.zoom = zoom;
        let moved = self.screen_point(page);
        self.offset += screen_point - moved;
    }

    pub fn zoom_in(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, self.zoom_step);
    }

    pub fn zoom_out(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, 1.0 / self.zoom_step);
    }

    /// Back to 100%, keeping `screen_point` fixed.
    pub fn reset_zoom(&mut self, screen_point: Point) {
        self.set_zoom_at(screen_point, 1.0);
    }

    /// Apply one pinch sample: pan by the gesture's movement, then zoom about its center.
    pub fn pinch_zoom(&mut self, screen_point: Point, delta: Vec2, scale: f64) {
        self.pan(delta);
        if scale > 0.0 {
            self.zoom_at(screen_point, scale);
        }
    }
}
