//! Visible tile resolution.
//!
//! Given a level and a viewport offset, the resolver finds the tiles that
//! intersect the canvas and have never been requested, marks them pending and
//! returns load requests for them. Marking happens before the requests leave
//! this module, so a tile can never have two requests in flight.
//!
//! # Visibility
//!
//! The visible rectangle in level-local image space is
//!
//! ```text
//! left = -offset_x          right  = left + canvas_width
//! top  = -offset_y          bottom = top  + canvas_height
//! ```
//!
//! and a tile is visible when its rectangle touches it, edges included.

use serde::Serialize;
use tracing::{debug, trace};

use crate::geometry::{CanvasSize, Rect};
use crate::pyramid::{Level, Pyramid};

use super::address::TileAddressing;
use super::store::TileStore;
use super::TileId;

/// A load request for one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileRequest {
    /// Tile coordinates
    pub id: TileId,

    /// Storage location of the tile
    pub uri: String,
}

impl TileRequest {
    /// Textual identifier the loader tags the arrival with.
    pub fn identifier(&self) -> String {
        self.id.to_string()
    }
}

/// Level-local rectangle visible through a canvas at `offset`.
pub fn visible_rect(offset: (f64, f64), canvas: CanvasSize) -> Rect {
    Rect::new(
        -offset.0,
        -offset.1,
        canvas.width as f64,
        canvas.height as f64,
    )
}

/// Tiles of `level` touching `visible`, in column-major order.
pub fn visible_tiles(level: &Level, visible: Rect) -> impl Iterator<Item = TileId> + '_ {
    (0..level.columns).flat_map(move |column| {
        (0..level.rows).filter_map(move |row| {
            level
                .tile_rect(column, row)
                .touches(&visible)
                .then(|| TileId::new(level.index, column, row))
        })
    })
}

/// Computes which tiles need loading for a viewport.
#[derive(Debug, Clone)]
pub struct TileSetResolver {
    addressing: TileAddressing,
    canvas: CanvasSize,
}

impl TileSetResolver {
    pub fn new(addressing: TileAddressing, canvas: CanvasSize) -> Self {
        Self { addressing, canvas }
    }

    pub fn addressing(&self) -> &TileAddressing {
        &self.addressing
    }

    /// Resolve the tiles that must be fetched to show `level` at `offset`.
    ///
    /// Every returned tile has been moved to `Pending` in `store`. Tiles that
    /// are already pending or loaded are skipped. An out-of-range level
    /// yields no requests.
    pub fn resolve<H>(
        &self,
        store: &mut TileStore<H>,
        pyramid: &Pyramid,
        level: usize,
        offset: (f64, f64),
    ) -> Vec<TileRequest> {
        let Some(level) = pyramid.level(level) else {
            return Vec::new();
        };

        let visible = visible_rect(offset, self.canvas);
        let requests: Vec<TileRequest> = visible_tiles(level, visible)
            .filter_map(|id| self.request(store, id))
            .collect();

        debug!(
            level = level.index,
            offset_x = offset.0,
            offset_y = offset.1,
            requested = requests.len(),
            "Resolved visible tiles"
        );

        requests
    }

    /// The initial batch: every tile of the start level, then the single
    /// fallback tile.
    pub fn startup_batch<H>(
        &self,
        store: &mut TileStore<H>,
        pyramid: &Pyramid,
    ) -> Vec<TileRequest> {
        let mut requests = Vec::new();

        if let Some(level) = pyramid.level(pyramid.start_level()) {
            for column in 0..level.columns {
                for row in 0..level.rows {
                    requests.extend(self.request(store, TileId::new(level.index, column, row)));
                }
            }
        }
        requests.extend(self.request(store, TileId::new(pyramid.fallback_level(), 0, 0)));

        debug!(
            start_level = pyramid.start_level(),
            fallback_level = pyramid.fallback_level(),
            requested = requests.len(),
            "Built startup batch"
        );

        requests
    }

    fn request<H>(&self, store: &mut TileStore<H>, id: TileId) -> Option<TileRequest> {
        if !store.mark_pending(id) {
            trace!(tile = %id, "Tile already requested");
            return None;
        }

        Some(TileRequest {
            id,
            uri: self.addressing.uri(id),
        })
    }
}
