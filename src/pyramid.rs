//! Tile pyramid geometry.
//!
//! A deep zoom pyramid stores the source image at every power-of-two
//! reduction, cut into square tiles. Levels are numbered from the most
//! reduced upwards:
//!
//! - level 0 = the image shrunk to at most 1x1 pixel
//! - level N = full resolution, where N = ceil(log2(max(width, height)))
//!
//! Each level halves the dimensions of the one above it. Dimensions are kept
//! real-valued so that `width(L) == width(L + 1) / 2` holds exactly; tile
//! counts round up.
//!
//! Two levels are singled out when the pyramid is built:
//!
//! - the **fallback level**, the first level (scanning down from N) whose
//!   whole image fits in one tile. Its single tile is painted, scaled up,
//!   behind any tile that has not arrived yet.
//! - the **start level**, the first level (scanning down from N) whose whole
//!   image fits on the canvas. Navigation starts there.

use serde::Serialize;

use crate::error::ConfigError;
use crate::geometry::{CanvasSize, Rect};

/// Default edge length of a square tile, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

// =============================================================================
// Level
// =============================================================================

/// Geometry of a single pyramid level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    /// Index of this level (0 = most reduced)
    pub index: usize,

    /// Image width at this level in pixels
    pub width: f64,

    /// Image height at this level in pixels
    pub height: f64,

    /// Number of tile columns
    pub columns: u32,

    /// Number of tile rows
    pub rows: u32,

    /// Tile edge length in pixels
    pub tile_size: u32,
}

impl Level {
    fn new(index: usize, width: f64, height: f64, tile_size: u32) -> Self {
        let size = tile_size as f64;
        Self {
            index,
            width,
            height,
            columns: (width / size).ceil() as u32,
            rows: (height / size).ceil() as u32,
            tile_size,
        }
    }

    /// Total number of tiles at this level.
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// True if `(column, row)` addresses a tile of this level.
    pub fn contains(&self, column: u32, row: u32) -> bool {
        column < self.columns && row < self.rows
    }

    /// Level-local rectangle covered by a tile.
    ///
    /// Tiles on the right and bottom edges are narrower than the tile size
    /// when the level dimension is not a multiple of it.
    pub fn tile_rect(&self, column: u32, row: u32) -> Rect {
        let size = self.tile_size as f64;
        let left = column as f64 * size;
        let top = row as f64 * size;
        Rect::new(
            left,
            top,
            size.min(self.width - left),
            size.min(self.height - top),
        )
    }

    /// Level-local rectangle covered by the whole image.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn fits_within(&self, width: f64, height: f64) -> bool {
        self.width <= width && self.height <= height
    }
}

// =============================================================================
// Pyramid
// =============================================================================

/// The complete, immutable level structure of one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pyramid {
    image_width: u32,
    image_height: u32,
    tile_size: u32,
    levels: Vec<Level>,
    fallback_level: usize,
    start_level: usize,
}

impl Pyramid {
    /// Derive the pyramid for an image of `image_width` x `image_height`
    /// pixels cut into `tile_size` tiles, viewed on `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any dimension or the tile size is zero.
    pub fn build(
        image_width: u32,
        image_height: u32,
        tile_size: u32,
        canvas: CanvasSize,
    ) -> Result<Self, ConfigError> {
        if image_width == 0 || image_height == 0 {
            return Err(ConfigError::InvalidImageSize {
                width: image_width,
                height: image_height,
            });
        }
        if tile_size == 0 {
            return Err(ConfigError::InvalidTileSize(tile_size));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ConfigError::InvalidCanvasSize {
                width: canvas.width,
                height: canvas.height,
            });
        }

        let max_level = max_level_for(image_width, image_height);
        let levels: Vec<Level> = (0..=max_level)
            .map(|index| {
                let divisor = (1u64 << (max_level - index)) as f64;
                Level::new(
                    index,
                    image_width as f64 / divisor,
                    image_height as f64 / divisor,
                    tile_size,
                )
            })
            .collect();

        // Level 0 is at most 1x1, so both scans always find a level.
        let tile = tile_size as f64;
        let fallback_level = levels
            .iter()
            .rev()
            .find(|level| level.fits_within(tile, tile))
            .map_or(0, |level| level.index);
        let start_level = levels
            .iter()
            .rev()
            .find(|level| level.fits_within(canvas.width as f64, canvas.height as f64))
            .map_or(0, |level| level.index);

        Ok(Self {
            image_width,
            image_height,
            tile_size,
            levels,
            fallback_level,
            start_level,
        })
    }

    /// Index of the full resolution level (N).
    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    /// All levels, most reduced first.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level by index, or `None` if out of range.
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Image width at `index`, or `None` if out of range.
    pub fn width_at(&self, index: usize) -> Option<f64> {
        self.level(index).map(|level| level.width)
    }

    /// Level whose single tile is drawn behind missing tiles.
    pub fn fallback_level(&self) -> usize {
        self.fallback_level
    }

    /// Largest level that fits on the canvas.
    pub fn start_level(&self) -> usize {
        self.start_level
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Number of tiles across all levels.
    pub fn tile_count(&self) -> usize {
        self.levels.iter().map(Level::tile_count).sum()
    }
}

/// Calculate N = ceil(log2(max(width, height))).
///
/// Computed on integers so exact powers of two do not round up.
pub fn max_level_for(width: u32, height: u32) -> usize {
    let max_dim = width.max(height).max(1) as u64;
    max_dim.next_power_of_two().trailing_zeros() as usize
}
