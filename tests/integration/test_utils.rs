//! Test utilities for integration tests.
//!
//! This module provides a mock tile source with request tracking, a drawing
//! surface that records every call, and helpers for building JPEG tile
//! pyramids in memory or on disk.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use canvas_zoom::{
    CanvasSize, ImageDescriptor, LoadError, Pyramid, Rect, Surface, TileAddressing, TileId,
    TileSource, Viewer, ViewerConfig,
};

// =============================================================================
// Mock Tile Source with Request Tracking
// =============================================================================

/// An in-memory tile source that records every fetch.
///
/// URIs without an entry fail with [`LoadError::NotFound`].
#[derive(Clone, Default)]
pub struct TrackingTileSource {
    tiles: Arc<HashMap<String, Bytes>>,
    fetch_count: Arc<AtomicUsize>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl TrackingTileSource {
    pub fn new(tiles: HashMap<String, Bytes>) -> Self {
        Self {
            tiles: Arc::new(tiles),
            ..Self::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Every fetched URI, in fetch order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// True if no URI has been fetched more than once.
    pub fn no_duplicate_fetches(&self) -> bool {
        let fetched = self.fetched();
        let unique: HashSet<&String> = fetched.iter().collect();
        unique.len() == fetched.len()
    }
}

#[async_trait]
impl TileSource for TrackingTileSource {
    async fn fetch(&self, uri: &str) -> Result<Bytes, LoadError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(uri.to_string());

        self.tiles
            .get(uri)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(uri.to_string()))
    }
}

// =============================================================================
// Recording Surface
// =============================================================================

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Rect),
    Draw {
        size: (u32, u32),
        x: f64,
        y: f64,
    },
    DrawScaled {
        size: (u32, u32),
        dest: Rect,
        clip: Rect,
    },
    Stroke(Rect),
}

/// A surface that records calls instead of drawing.
pub struct RecordingSurface {
    size: CanvasSize,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn clear_ops(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Clear(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Draw { .. }))
            .count()
    }

    pub fn scaled_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::DrawScaled { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    type Image = RgbaImage;

    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Clear(rect));
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64) {
        self.ops.push(DrawOp::Draw {
            size: image.dimensions(),
            x,
            y,
        });
    }

    fn draw_image_scaled_clipped(&mut self, image: &RgbaImage, dest: Rect, clip: Rect) {
        self.ops.push(DrawOp::DrawScaled {
            size: image.dimensions(),
            dest,
            clip,
        });
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Stroke(rect));
    }
}

// =============================================================================
// Tile Fixtures
// =============================================================================

/// Encode a solid-colour JPEG.
pub fn solid_jpeg(width: u32, height: u32, colour: [u8; 3]) -> Bytes {
    let img = RgbImage::from_pixel(width, height, Rgb(colour));
    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, 95)
        .encode_image(&img)
        .expect("JPEG encoding failed");
    Bytes::from(output)
}

/// Colour used for every tile of `level`, distinct per level.
pub fn level_colour(level: usize) -> [u8; 3] {
    let shade = (level as u8).wrapping_mul(20);
    [shade, 255 - shade, 128]
}

/// Pixel size of a tile, with partial edge tiles rounded up.
pub fn tile_pixels(pyramid: &Pyramid, id: TileId) -> (u32, u32) {
    let level = pyramid.level(id.level).expect("level out of range");
    let rect = level.tile_rect(id.column, id.row);
    (
        (rect.width.ceil() as u32).max(1),
        (rect.height.ceil() as u32).max(1),
    )
}

/// Every tile of `levels`, encoded, keyed by URI.
pub fn pyramid_tiles(
    pyramid: &Pyramid,
    addressing: &TileAddressing,
    levels: impl IntoIterator<Item = usize>,
) -> HashMap<String, Bytes> {
    let mut tiles = HashMap::new();
    for index in levels {
        let level = pyramid.level(index).expect("level out of range");
        for column in 0..level.columns {
            for row in 0..level.rows {
                let id = TileId::new(index, column, row);
                let (width, height) = tile_pixels(pyramid, id);
                tiles.insert(
                    addressing.uri(id),
                    solid_jpeg(width, height, level_colour(index)),
                );
            }
        }
    }
    tiles
}

/// Write tiles produced by [`pyramid_tiles`] to disk, treating each URI as
/// a path.
pub fn write_tiles(tiles: &HashMap<String, Bytes>) {
    for (uri, data) in tiles {
        let path = Path::new(uri);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, data).unwrap();
    }
}

// =============================================================================
// Viewer Fixtures
// =============================================================================

/// The reference scenario: 1000x1000 image, 256 tiles, 800x600 canvas.
pub fn reference_config() -> ViewerConfig {
    ViewerConfig::new(
        ImageDescriptor::new(1000, 1000),
        "tiles",
        CanvasSize::new(800, 600),
    )
}

pub fn reference_viewer() -> Viewer<RgbaImage> {
    Viewer::new(reference_config()).expect("valid viewer config")
}

/// Build the pyramid described by `config`.
pub fn pyramid_for(config: &ViewerConfig) -> Pyramid {
    Pyramid::build(
        config.descriptor.width,
        config.descriptor.height,
        config.descriptor.tile_size,
        config.canvas,
    )
    .expect("valid pyramid")
}

/// Addressing matching `config`.
pub fn addressing_for(config: &ViewerConfig) -> TileAddressing {
    TileAddressing::new(config.tiles_folder.clone(), config.descriptor.format.clone())
        .expect("valid addressing")
}
