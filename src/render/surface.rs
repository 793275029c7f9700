use crate::geometry::{CanvasSize, Rect};

/// A canvas-like drawing target.
///
/// The compositor only needs four primitives, so any 2D backend (an HTML
/// canvas, a GPU texture, an in-memory raster) can sit behind this trait.
/// Coordinates are canvas pixels and may be fractional or lie partly outside
/// the surface; implementations clip.
pub trait Surface {
    /// Decoded tile image type this surface can draw.
    type Image;

    /// Size of the surface in pixels.
    fn size(&self) -> CanvasSize;

    /// Reset a region to transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Draw an image at its natural size with its top-left corner at
    /// `(x, y)`.
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64);

    /// Draw an image stretched to cover `dest`, touching only pixels inside
    /// `clip`.
    fn draw_image_scaled_clipped(&mut self, image: &Self::Image, dest: Rect, clip: Rect);

    /// Outline a rectangle.
    fn stroke_rect(&mut self, rect: Rect);
}
