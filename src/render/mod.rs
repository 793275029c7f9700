//! Drawing.
//!
//! - [`Surface`]: the canvas-like target the compositor draws on
//! - [`Compositor`]: full-frame repaint of loaded tiles over a low-resolution
//!   fallback
//! - [`RasterSurface`]: an [`image::RgbaImage`]-backed surface for headless
//!   rendering

mod compositor;
mod raster;
mod surface;

pub use compositor::{surrounding_regions, Compositor, PaintStats};
pub use raster::{RasterSurface, DEFAULT_FRAME_QUALITY};
pub use surface::Surface;
