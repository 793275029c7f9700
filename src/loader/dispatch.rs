//! Asynchronous batch loading.
//!
//! A [`TileLoader`] takes a batch of [`TileRequest`]s, fetches and decodes
//! every tile concurrently on the tokio runtime, and reports each result as a
//! [`LoaderEvent`] on a channel. Once every tile of a batch has been
//! reported, a `BatchComplete` event follows.
//!
//! The loader never touches viewer state. Whoever owns the receiving end of
//! the channel applies arrivals, one at a time, on its own task.
//!
//! Requests are never cancelled or timed out. A failed tile is reported and
//! logged; the viewer keeps showing the fallback image for it.

use std::sync::Arc;

use image::RgbaImage;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::tile::TileRequest;

use super::decode::decode_tile;
use super::source::TileSource;

/// Identifier of a dispatched batch.
pub type BatchId = u64;

/// Outcome of a load, delivered through the loader channel.
#[derive(Debug)]
pub enum LoaderEvent {
    /// A tile was fetched and decoded
    Arrived { identifier: String, image: RgbaImage },

    /// A tile could not be fetched or decoded
    Failed { identifier: String, error: LoadError },

    /// Every tile of a batch has been reported
    BatchComplete { batch: BatchId },
}

/// Dispatches tile batches to a [`TileSource`].
pub struct TileLoader<S: TileSource> {
    source: Arc<S>,
    sender: mpsc::UnboundedSender<LoaderEvent>,
    next_batch: BatchId,
}

impl<S: TileSource + 'static> TileLoader<S> {
    /// Create a loader and the receiving end of its event channel.
    pub fn new(source: S) -> (Self, mpsc::UnboundedReceiver<LoaderEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let loader = Self {
            source: Arc::new(source),
            sender,
            next_batch: 0,
        };
        (loader, receiver)
    }

    /// Start loading a batch in the background.
    ///
    /// Returns the batch id, or `None` for an empty batch, which is not
    /// dispatched at all. Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, requests: Vec<TileRequest>) -> Option<BatchId> {
        if requests.is_empty() {
            return None;
        }

        let batch = self.next_batch;
        self.next_batch += 1;

        debug!(batch, tiles = requests.len(), "Dispatching tile batch");

        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        tokio::spawn(run_batch(source, sender, batch, requests));

        Some(batch)
    }
}

async fn run_batch<S: TileSource + 'static>(
    source: Arc<S>,
    sender: mpsc::UnboundedSender<LoaderEvent>,
    batch: BatchId,
    requests: Vec<TileRequest>,
) {
    let mut tasks = JoinSet::new();

    for request in requests {
        let source = Arc::clone(&source);
        let sender = sender.clone();
        tasks.spawn(async move {
            let identifier = request.identifier();
            let event = match load_tile(source.as_ref(), &request.uri).await {
                Ok(image) => LoaderEvent::Arrived { identifier, image },
                Err(error) => {
                    warn!(uri = %request.uri, error = %error, "Tile load failed");
                    LoaderEvent::Failed { identifier, error }
                }
            };
            if sender.send(event).is_err() {
                debug!(uri = %request.uri, "Loader channel closed, dropping tile");
            }
        });
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            warn!(batch, error = %e, "Tile load task failed");
        }
    }

    if sender.send(LoaderEvent::BatchComplete { batch }).is_err() {
        debug!(batch, "Loader channel closed before batch completion");
    }
}

/// Fetch and decode one tile. Decoding runs on the blocking pool.
pub async fn load_tile<S: TileSource + ?Sized>(
    source: &S,
    uri: &str,
) -> Result<RgbaImage, LoadError> {
    let data = source.fetch(uri).await?;

    let owned_uri = uri.to_string();
    tokio::task::spawn_blocking(move || decode_tile(&owned_uri, &data))
        .await
        .map_err(|e| LoadError::Decode {
            uri: uri.to_string(),
            message: e.to_string(),
        })?
}
