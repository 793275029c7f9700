use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::LoadError;

/// Trait for fetching the encoded bytes of a tile.
///
/// This abstraction lets the loader work with local folders, HTTP servers or
/// in-memory fixtures alike. Implementations must be thread-safe since
/// fetches run concurrently on the runtime.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch the tile stored at `uri`.
    async fn fetch(&self, uri: &str) -> Result<Bytes, LoadError>;
}

/// Tile source reading from the local filesystem.
///
/// URIs are treated as paths, relative to an optional root directory.
#[derive(Debug, Clone, Default)]
pub struct FsTileSource {
    root: Option<PathBuf>,
}

impl FsTileSource {
    /// Resolve URIs against the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve URIs against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Filesystem path a URI maps to.
    pub fn path_for(&self, uri: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(uri),
            None => Path::new(uri).to_path_buf(),
        }
    }
}

#[async_trait]
impl TileSource for FsTileSource {
    async fn fetch(&self, uri: &str) -> Result<Bytes, LoadError> {
        let path = self.path_for(uri);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LoadError::NotFound(uri.to_string()))
            }
            Err(e) => Err(LoadError::Io {
                uri: uri.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
