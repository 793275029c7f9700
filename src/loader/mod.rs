//! Tile loading.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  batch   ┌──────────────────────────────────┐
//! │   Session    │─────────▶│           TileLoader             │
//! │ (single      │          │  per tile: fetch ─▶ decode       │
//! │  consumer)   │◀─────────│  (TileSource)    (spawn_blocking)│
//! └──────────────┘  events  └──────────────────────────────────┘
//! ```
//!
//! - [`TileSource`]: where encoded tile bytes come from
//! - [`FsTileSource`]: local folder implementation
//! - [`decode_tile`]: bytes to [`image::RgbaImage`]
//! - [`TileLoader`]: concurrent batch loading reporting [`LoaderEvent`]s

mod decode;
mod dispatch;
mod source;

pub use decode::decode_tile;
pub use dispatch::{load_tile, BatchId, LoaderEvent, TileLoader};
pub use source::{FsTileSource, TileSource};
