//! Tile identifiers.
//!
//! A tile is addressed by `(level, column, row)`. When a tile travels through
//! the loader it is tagged with the textual form `"{level}_{column}_{row}"`,
//! which is parsed back when the decoded image arrives.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TileIdError;

/// Coordinates of a single tile in the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileId {
    /// Pyramid level (0 = most reduced)
    pub level: usize,

    /// Tile column (0-indexed from left)
    pub column: u32,

    /// Tile row (0-indexed from top)
    pub row: u32,
}

impl TileId {
    pub fn new(level: usize, column: u32, row: u32) -> Self {
        Self { level, column, row }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.level, self.column, self.row)
    }
}

impl FromStr for TileId {
    type Err = TileIdError;

    fn from_str(identifier: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = identifier.split('_').collect();
        if parts.len() != 3 {
            return Err(TileIdError::Malformed(identifier.to_string()));
        }

        let number = |part: &str| -> Result<u64, TileIdError> {
            part.parse::<u64>()
                .map_err(|_| TileIdError::InvalidNumber {
                    identifier: identifier.to_string(),
                    part: part.to_string(),
                })
        };

        let level = number(parts[0])?;
        let column = number(parts[1])?;
        let row = number(parts[2])?;

        let out_of_range = || TileIdError::Malformed(identifier.to_string());
        Ok(TileId {
            level: usize::try_from(level).map_err(|_| out_of_range())?,
            column: u32::try_from(column).map_err(|_| out_of_range())?,
            row: u32::try_from(row).map_err(|_| out_of_range())?,
        })
    }
}
