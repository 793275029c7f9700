//! Tile state storage.
//!
//! Every tile of every level has a slot that moves through
//! `Empty -> Pending -> Loaded`. Slots never move backwards and loaded images
//! are kept for the lifetime of the store; there is no eviction.
//!
//! The store is generic over the decoded image handle `H` so the same state
//! machine serves raster surfaces, GPU textures or test doubles.

use tracing::{debug, trace};

use crate::pyramid::Pyramid;

use super::TileId;

// =============================================================================
// Tile State
// =============================================================================

/// Load state of a single tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileState<H> {
    /// Not requested yet
    Empty,

    /// Requested, waiting for the loader
    Pending,

    /// Decoded image available
    Loaded(H),
}

impl<H> TileState<H> {
    pub fn is_empty(&self) -> bool {
        matches!(self, TileState::Empty)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TileState::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, TileState::Loaded(_))
    }

    /// The loaded image, if any.
    pub fn image(&self) -> Option<&H> {
        match self {
            TileState::Loaded(image) => Some(image),
            _ => None,
        }
    }
}

/// Number of tiles in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileCounts {
    pub empty: usize,
    pub pending: usize,
    pub loaded: usize,
}

// =============================================================================
// Tile Store
// =============================================================================

struct LevelGrid<H> {
    columns: u32,
    rows: u32,
    tiles: Vec<TileState<H>>,
}

impl<H> LevelGrid<H> {
    fn index(&self, column: u32, row: u32) -> Option<usize> {
        if column < self.columns && row < self.rows {
            Some(row as usize * self.columns as usize + column as usize)
        } else {
            None
        }
    }
}

/// Grid of tile states for all levels of a pyramid.
pub struct TileStore<H> {
    levels: Vec<LevelGrid<H>>,
}

impl<H> TileStore<H> {
    /// Create a store with every tile of `pyramid` in the `Empty` state.
    pub fn new(pyramid: &Pyramid) -> Self {
        let levels = pyramid
            .levels()
            .iter()
            .map(|level| LevelGrid {
                columns: level.columns,
                rows: level.rows,
                tiles: std::iter::repeat_with(|| TileState::Empty)
                    .take(level.tile_count())
                    .collect(),
            })
            .collect();

        Self { levels }
    }

    /// State of a tile, or `None` if `id` is outside the pyramid.
    pub fn state(&self, id: TileId) -> Option<&TileState<H>> {
        let grid = self.levels.get(id.level)?;
        let index = grid.index(id.column, id.row)?;
        grid.tiles.get(index)
    }

    fn state_mut(&mut self, id: TileId) -> Option<&mut TileState<H>> {
        let grid = self.levels.get_mut(id.level)?;
        let index = grid.index(id.column, id.row)?;
        grid.tiles.get_mut(index)
    }

    /// The decoded image of a loaded tile.
    pub fn image(&self, id: TileId) -> Option<&H> {
        self.state(id).and_then(TileState::image)
    }

    /// True if the tile exists and has not been requested yet.
    pub fn is_requestable(&self, id: TileId) -> bool {
        self.state(id).is_some_and(TileState::is_empty)
    }

    /// Move a tile from `Empty` to `Pending`.
    ///
    /// Returns `false` (and changes nothing) if the tile is out of range or
    /// has already been requested or loaded.
    pub fn mark_pending(&mut self, id: TileId) -> bool {
        match self.state_mut(id) {
            Some(state @ TileState::Empty) => {
                *state = TileState::Pending;
                true
            }
            _ => false,
        }
    }

    /// Record the decoded image of a tile.
    ///
    /// Empty and pending tiles become `Loaded`. Out-of-range coordinates are
    /// dropped without any state change, and a tile that is already loaded
    /// keeps its original image. Returns `true` if the store changed.
    pub fn tile_arrived(&mut self, id: TileId, image: H) -> bool {
        match self.state_mut(id) {
            Some(TileState::Loaded(_)) => {
                trace!(tile = %id, "Ignoring arrival for already loaded tile");
                false
            }
            Some(state) => {
                *state = TileState::Loaded(image);
                true
            }
            None => {
                debug!(tile = %id, "Dropping arrival outside the pyramid");
                false
            }
        }
    }

    /// Record an arrival tagged with a textual identifier.
    ///
    /// Identifiers that do not parse as `"{level}_{column}_{row}"` are
    /// dropped silently.
    pub fn tile_arrived_named(&mut self, identifier: &str, image: H) -> bool {
        match identifier.parse::<TileId>() {
            Ok(id) => self.tile_arrived(id, image),
            Err(e) => {
                debug!(identifier, error = %e, "Dropping arrival with malformed identifier");
                false
            }
        }
    }

    /// Count tiles per state across all levels.
    pub fn counts(&self) -> TileCounts {
        let mut counts = TileCounts::default();
        for state in self.levels.iter().flat_map(|grid| grid.tiles.iter()) {
            match state {
                TileState::Empty => counts.empty += 1,
                TileState::Pending => counts.pending += 1,
                TileState::Loaded(_) => counts.loaded += 1,
            }
        }
        counts
    }
}
