//! Viewport state and navigation.
//!
//! The viewport is a zoom level plus a translation: a pixel at level-local
//! image coordinates `(ix, iy)` is drawn at canvas coordinates
//! `(ix + offset_x, iy + offset_y)`.
//!
//! Zooming keeps a focal point fixed. Switching from level `a` to level `b`
//! scales image coordinates by `width(b) / width(a)`, so the offset is moved
//! by however far the point under the focus travelled:
//!
//! ```text
//! before = focal - offset
//! after  = before * scale
//! offset = offset - (after - before)
//! ```
//!
//! Panning is unclamped: the image may be moved arbitrarily far from the
//! canvas.

use crate::geometry::{CanvasSize, Rect};
use crate::pyramid::Pyramid;
use crate::tile::visible_rect;

/// Zoom level and pan offset of one viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom_level: usize,
    offset_x: f64,
    offset_y: f64,
    canvas: CanvasSize,
}

impl Viewport {
    /// Start at the pyramid's start level with a zero offset.
    pub fn new(pyramid: &Pyramid, canvas: CanvasSize) -> Self {
        Self {
            zoom_level: pyramid.start_level(),
            offset_x: 0.0,
            offset_y: 0.0,
            canvas,
        }
    }

    pub fn zoom_level(&self) -> usize {
        self.zoom_level
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Offset the viewport would have after zooming to `new_level` around
    /// `(focal_x, focal_y)`, or `None` if the level does not exist.
    pub fn preview_zoom(
        &self,
        pyramid: &Pyramid,
        new_level: usize,
        focal_x: f64,
        focal_y: f64,
    ) -> Option<(f64, f64)> {
        let new_width = pyramid.width_at(new_level)?;
        let current_width = pyramid.width_at(self.zoom_level)?;
        let scale = new_width / current_width;

        let before_x = focal_x - self.offset_x;
        let before_y = focal_y - self.offset_y;
        let after_x = before_x * scale;
        let after_y = before_y * scale;

        Some((
            self.offset_x - (after_x - before_x),
            self.offset_y - (after_y - before_y),
        ))
    }

    /// Switch to `new_level`, keeping the image point under
    /// `(focal_x, focal_y)` in place.
    ///
    /// Does nothing and returns `false` if `new_level` is outside the
    /// pyramid.
    pub fn zoom_to(
        &mut self,
        pyramid: &Pyramid,
        new_level: usize,
        focal_x: f64,
        focal_y: f64,
    ) -> bool {
        match self.preview_zoom(pyramid, new_level, focal_x, focal_y) {
            Some(offset) => {
                self.set_state(new_level, offset);
                true
            }
            None => false,
        }
    }

    /// Zoom one level in around a canvas point.
    pub fn zoom_in_at(&mut self, pyramid: &Pyramid, x: f64, y: f64) -> bool {
        match self.zoom_level.checked_add(1) {
            Some(level) => self.zoom_to(pyramid, level, x, y),
            None => false,
        }
    }

    /// Zoom one level out around a canvas point.
    pub fn zoom_out_at(&mut self, pyramid: &Pyramid, x: f64, y: f64) -> bool {
        match self.zoom_level.checked_sub(1) {
            Some(level) => self.zoom_to(pyramid, level, x, y),
            None => false,
        }
    }

    /// Zoom one level in around the canvas centre.
    pub fn zoom_in_centre(&mut self, pyramid: &Pyramid) -> bool {
        let (x, y) = self.canvas.centre();
        self.zoom_in_at(pyramid, x, y)
    }

    /// Zoom one level out around the canvas centre.
    pub fn zoom_out_centre(&mut self, pyramid: &Pyramid) -> bool {
        let (x, y) = self.canvas.centre();
        self.zoom_out_at(pyramid, x, y)
    }

    /// Move the image by `(dx, dy)` canvas pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Centre the current level's image on the canvas.
    pub fn centre_on_level(&mut self, pyramid: &Pyramid) {
        if let Some(level) = pyramid.level(self.zoom_level) {
            self.offset_x = (self.canvas.width as f64 - level.width) / 2.0;
            self.offset_y = (self.canvas.height as f64 - level.height) / 2.0;
        }
    }

    /// Commit a level and offset computed elsewhere (e.g. by
    /// [`Viewport::preview_zoom`]).
    pub(crate) fn set_state(&mut self, level: usize, offset: (f64, f64)) {
        self.zoom_level = level;
        self.offset_x = offset.0;
        self.offset_y = offset.1;
    }

    /// Level-local rectangle currently visible on the canvas.
    pub fn visible_rect(&self) -> Rect {
        visible_rect(self.offset(), self.canvas)
    }

    /// Canvas-space bounding box of the current level's image.
    pub fn image_rect(&self, pyramid: &Pyramid) -> Option<Rect> {
        pyramid
            .level(self.zoom_level)
            .map(|level| level.bounds().translate(self.offset_x, self.offset_y))
    }
}
