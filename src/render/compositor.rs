//! Frame compositing.
//!
//! Each paint is a full redraw of the canvas:
//!
//! 1. The four regions around the image bounding box are cleared, so shrinking
//!    the image (zooming out, panning) leaves no stale pixels behind.
//! 2. Every visible tile is drawn. Loaded tiles are drawn at their position;
//!    missing ones show the fallback tile stretched over the whole image and
//!    clipped to the missing tile's rectangle.
//! 3. An optional border is stroked around the canvas.

use tracing::trace;

use crate::geometry::Rect;
use crate::pyramid::Pyramid;
use crate::tile::{visible_tiles, TileId, TileStore};
use crate::viewport::Viewport;

use super::surface::Surface;

/// What a single paint drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Visible tiles drawn from their own image
    pub tiles: usize,

    /// Visible tiles covered by the fallback image
    pub fallback: usize,

    /// Visible tiles left blank because the fallback has not arrived either
    pub blank: usize,
}

/// Draws the current state of a viewer onto a [`Surface`].
#[derive(Debug, Clone)]
pub struct Compositor {
    draw_border: bool,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Compositor {
    pub fn new(draw_border: bool) -> Self {
        Self { draw_border }
    }

    pub fn draw_border(&self) -> bool {
        self.draw_border
    }

    /// Repaint the whole frame.
    pub fn paint<S: Surface>(
        &self,
        pyramid: &Pyramid,
        store: &TileStore<S::Image>,
        viewport: &Viewport,
        surface: &mut S,
    ) -> PaintStats {
        let mut stats = PaintStats::default();
        let canvas = surface.size().rect();

        let Some(level) = pyramid.level(viewport.zoom_level()) else {
            return stats;
        };
        let (offset_x, offset_y) = viewport.offset();
        let image_rect = level.bounds().translate(offset_x, offset_y);

        for region in surrounding_regions(&image_rect, &canvas) {
            surface.clear_rect(region);
        }

        let fallback = store.image(TileId::new(pyramid.fallback_level(), 0, 0));

        for id in visible_tiles(level, viewport.visible_rect()) {
            let tile_rect = level
                .tile_rect(id.column, id.row)
                .translate(offset_x, offset_y);

            if let Some(image) = store.image(id) {
                surface.draw_image(image, tile_rect.x, tile_rect.y);
                stats.tiles += 1;
            } else if let Some(fallback) = fallback {
                surface.draw_image_scaled_clipped(fallback, image_rect, tile_rect);
                stats.fallback += 1;
            } else {
                stats.blank += 1;
            }
        }

        if self.draw_border {
            surface.stroke_rect(canvas);
        }

        trace!(
            level = level.index,
            tiles = stats.tiles,
            fallback = stats.fallback,
            blank = stats.blank,
            "Painted frame"
        );

        stats
    }
}

/// Canvas regions above, left of, right of and below the image, clipped to
/// the canvas. Empty regions are omitted.
pub fn surrounding_regions(image: &Rect, canvas: &Rect) -> Vec<Rect> {
    let candidates = [
        // above, full canvas width
        Rect::from_edges(canvas.left(), canvas.top(), canvas.right(), image.top()),
        // left, from the image top down
        Rect::from_edges(canvas.left(), image.top(), image.left(), canvas.bottom()),
        // right, from the image top down
        Rect::from_edges(image.right(), image.top(), canvas.right(), canvas.bottom()),
        // below, between the side regions
        Rect::from_edges(image.left(), image.bottom(), image.right(), canvas.bottom()),
    ];

    candidates
        .iter()
        .filter_map(|region| region.intersection(canvas))
        .collect()
}
