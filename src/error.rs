use thiserror::Error;

/// Errors raised while building a viewer from its configuration.
///
/// These are fatal at construction time: no viewer state is created when
/// one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Image width or height is zero
    #[error("Invalid image dimensions: {width}x{height} (both must be greater than 0)")]
    InvalidImageSize { width: u32, height: u32 },

    /// Tile size is zero
    #[error("Invalid tile size: {0} (must be greater than 0)")]
    InvalidTileSize(u32),

    /// Canvas width or height is zero
    #[error("Invalid canvas size: {width}x{height} (both must be greater than 0)")]
    InvalidCanvasSize { width: u32, height: u32 },

    /// Tile file format (extension) is empty
    #[error("Tile format must not be empty")]
    EmptyFormat,

    /// Image descriptor could not be parsed
    #[error("Invalid image descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Errors from parsing a textual tile identifier such as `"3_1_2"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileIdError {
    /// Identifier does not have exactly three `_`-separated parts
    #[error("Malformed tile identifier '{0}': expected '<level>_<column>_<row>'")]
    Malformed(String),

    /// One of the parts is not an unsigned integer
    #[error("Invalid number '{part}' in tile identifier '{identifier}'")]
    InvalidNumber { identifier: String, part: String },
}

/// Errors that can occur while fetching or decoding a tile.
///
/// Load errors never reach navigation code: the tile simply stays pending
/// and the fallback image keeps covering it.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// Tile does not exist at the given location
    #[error("Tile not found: {0}")]
    NotFound(String),

    /// Read failure other than a missing file
    #[error("I/O error reading {uri}: {message}")]
    Io { uri: String, message: String },

    /// Tile bytes could not be decoded as an image
    #[error("Failed to decode tile {uri}: {message}")]
    Decode { uri: String, message: String },
}

/// Errors producing output from a rendered frame.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// Frame could not be encoded
    #[error("Failed to encode frame: {message}")]
    EncodeError { message: String },

    /// Encoded frame could not be written
    #[error("Failed to write frame to {path}: {message}")]
    WriteError { path: String, message: String },
}
