//! Tile bookkeeping.
//!
//! This module tracks which tiles exist, which have been requested and which
//! have arrived, and decides what to fetch next.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                 Viewer                  │
//! └───────────┬─────────────────┬───────────┘
//!             │ resolve         │ tile_arrived
//!             ▼                 ▼
//! ┌─────────────────────┐  ┌────────────────┐
//! │  TileSetResolver    │─▶│   TileStore    │
//! │  (visible, Empty →  │  │ Empty→Pending  │
//! │   TileRequest)      │  │   →Loaded      │
//! └─────────┬───────────┘  └────────────────┘
//!           │ uri
//!           ▼
//! ┌─────────────────────┐
//! │  TileAddressing     │
//! │ {base}/{L}/{C}_{R}  │
//! └─────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileId`]: `(level, column, row)` coordinates with a `"L_C_R"` text form
//! - [`TileStore`]: per-tile state machine, no eviction
//! - [`TileSetResolver`]: visible-tile computation and request issuing
//! - [`TileAddressing`]: storage URI scheme
//!
//! # Example
//!
//! ```
//! use canvas_zoom::geometry::CanvasSize;
//! use canvas_zoom::pyramid::Pyramid;
//! use canvas_zoom::tile::{TileAddressing, TileSetResolver, TileStore};
//!
//! let canvas = CanvasSize::new(800, 600);
//! let pyramid = Pyramid::build(1000, 1000, 256, canvas).unwrap();
//! let mut store: TileStore<()> = TileStore::new(&pyramid);
//! let resolver = TileSetResolver::new(TileAddressing::new("tiles", "jpg").unwrap(), canvas);
//!
//! let requests = resolver.resolve(&mut store, &pyramid, 10, (0.0, 0.0));
//! assert_eq!(requests[0].uri, "tiles/10/0_0.jpg");
//!
//! // Pending tiles are never requested twice
//! assert!(resolver.resolve(&mut store, &pyramid, 10, (0.0, 0.0)).is_empty());
//! ```

mod address;
mod id;
mod resolver;
mod store;

pub use address::{TileAddressing, DEFAULT_TILE_FORMAT};
pub use id::TileId;
pub use resolver::{visible_rect, visible_tiles, TileRequest, TileSetResolver};
pub use store::{TileCounts, TileState, TileStore};
