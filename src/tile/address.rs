//! Tile addressing on the storage backend.
//!
//! Tile sets are laid out as `{base_folder}/{level}/{column}_{row}.{format}`.
//! This matches the Deep Zoom `_files` layout, so existing tile sets can be
//! used without conversion.

use crate::error::ConfigError;

use super::TileId;

/// Default tile file extension.
pub const DEFAULT_TILE_FORMAT: &str = "jpg";

/// Builds storage URIs for tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileAddressing {
    base_folder: String,
    format: String,
}

impl TileAddressing {
    /// Create addressing for tiles under `base_folder` with the given file
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyFormat`] if `format` is empty.
    pub fn new(
        base_folder: impl Into<String>,
        format: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let format = format.into();
        if format.is_empty() {
            return Err(ConfigError::EmptyFormat);
        }

        let mut base_folder = base_folder.into();
        while base_folder.len() > 1 && base_folder.ends_with('/') {
            base_folder.pop();
        }

        Ok(Self {
            base_folder,
            format,
        })
    }

    /// URI of a tile.
    pub fn uri(&self, id: TileId) -> String {
        format!(
            "{}/{}/{}_{}.{}",
            self.base_folder, id.level, id.column, id.row, self.format
        )
    }

    pub fn base_folder(&self) -> &str {
        &self.base_folder
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}
