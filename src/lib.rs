//! # canvas-zoom
//!
//! A deep zoom tile viewer engine.
//!
//! An image is cut into a pyramid of fixed-size tiles, one level per power of
//! two. The viewer shows a pannable, zoomable window onto that pyramid,
//! loading only the tiles that are visible and covering the gaps with a
//! scaled-up single-tile fallback until they arrive.
//!
//! ## Features
//!
//! - **Pyramid geometry**: level sizes, tile grids, fallback and start levels
//! - **Lazy loading**: each tile is requested at most once and kept forever
//! - **Focal-point zoom**: the image point under the cursor stays put
//! - **Pointer gestures**: drag to pan, click or wheel to zoom
//! - **Software rendering**: full-frame compositing into an RGBA raster
//!
//! ## Architecture
//!
//! - [`pyramid`] - Level geometry derived from image, tile and canvas size
//! - [`tile`] - Tile identifiers, addressing, state store and visibility
//! - [`viewport`] - Zoom level, offset and focal-point zoom maths
//! - [`render`] - Drawing surface abstraction and the compositor
//! - [`gesture`] - Pointer and wheel input to navigation intents
//! - [`loader`] - Asynchronous tile fetching and decoding
//! - [`viewer`] - Per-viewer state tying the above together
//! - [`session`] - Single-consumer control loop driving a viewer
//! - [`descriptor`] - Deep Zoom (`.dzi`) image descriptors
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use canvas_zoom::{
//!     CanvasSize, FsTileSource, ImageDescriptor, Intent, RasterSurface, Session, Viewer,
//!     ViewerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let canvas = CanvasSize::new(800, 600);
//!     let config = ViewerConfig::new(ImageDescriptor::new(46920, 33600), "tiles", canvas);
//!
//!     let viewer = Viewer::new(config)?;
//!     let mut session = Session::new(viewer, FsTileSource::new(), RasterSurface::new(canvas));
//!
//!     session.start().await;
//!     session.apply(Intent::ZoomInCentre);
//!     session.settle().await;
//!
//!     let jpeg = session.surface().encode_jpeg(90)?;
//!     std::fs::write("frame.jpg", &jpeg)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod loader;
pub mod pyramid;
pub mod render;
pub mod session;
pub mod tile;
pub mod viewer;
pub mod viewport;

// Re-export commonly used types
pub use config::{Action, CanvasArgs, Cli, Command, ImageArgs, InfoConfig, RenderConfig};
pub use descriptor::ImageDescriptor;
pub use error::{ConfigError, LoadError, RenderError, TileIdError};
pub use geometry::{CanvasSize, Point, Rect};
pub use gesture::{GestureClassifier, Intent};
pub use loader::{decode_tile, load_tile, BatchId, FsTileSource, LoaderEvent, TileLoader, TileSource};
pub use pyramid::{max_level_for, Level, Pyramid, DEFAULT_TILE_SIZE};
pub use render::{
    surrounding_regions, Compositor, PaintStats, RasterSurface, Surface, DEFAULT_FRAME_QUALITY,
};
pub use session::Session;
pub use tile::{
    visible_rect, visible_tiles, TileAddressing, TileCounts, TileId, TileRequest, TileSetResolver,
    TileState, TileStore, DEFAULT_TILE_FORMAT,
};
pub use viewer::{Viewer, ViewerConfig};
pub use viewport::Viewport;
