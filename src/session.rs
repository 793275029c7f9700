//! Session driver.
//!
//! A [`Session`] is the single control loop of one viewer. It owns the
//! [`Viewer`], the drawing surface and the receiving end of the loader
//! channel, so viewer state is only ever touched from one task.
//!
//! ```text
//!  input ──▶ GestureClassifier ──▶ Intent ──▶ Viewer ──▶ requests ──▶ TileLoader
//!                                               ▲                        │
//!                                               └──── LoaderEvent ◀──────┘
//!                                               │
//!                                               ▼
//!                                            Surface (full repaint)
//! ```
//!
//! Repaints happen after every navigation and after every applied arrival,
//! but only once startup has completed.

use std::collections::HashSet;

use image::RgbaImage;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::geometry::Point;
use crate::gesture::{GestureClassifier, Intent};
use crate::loader::{BatchId, LoaderEvent, TileLoader, TileSource};
use crate::render::{PaintStats, Surface};
use crate::tile::TileRequest;
use crate::viewer::Viewer;

/// Drives a [`Viewer`] with a [`TileLoader`] and paints into a surface.
pub struct Session<S, F>
where
    S: TileSource + 'static,
    F: Surface<Image = RgbaImage>,
{
    viewer: Viewer<RgbaImage>,
    loader: TileLoader<S>,
    events: mpsc::UnboundedReceiver<LoaderEvent>,
    surface: F,
    gestures: GestureClassifier,

    /// Batch whose completion ends startup
    startup_batch: Option<BatchId>,

    /// Dispatched batches that have not completed yet
    outstanding: HashSet<BatchId>,

    /// Number of frames painted
    frames: u64,

    last_paint: PaintStats,
}

impl<S, F> Session<S, F>
where
    S: TileSource + 'static,
    F: Surface<Image = RgbaImage>,
{
    pub fn new(viewer: Viewer<RgbaImage>, source: S, surface: F) -> Self {
        let (loader, events) = TileLoader::new(source);
        Self {
            viewer,
            loader,
            events,
            surface,
            gestures: GestureClassifier::new(),
            startup_batch: None,
            outstanding: HashSet::new(),
            frames: 0,
            last_paint: PaintStats::default(),
        }
    }

    /// Load the startup batch, then centre the image and paint the first
    /// frame.
    ///
    /// Returns once the startup batch has completed, whether or not every
    /// tile in it could be loaded.
    pub async fn start(&mut self) {
        if self.viewer.is_ready() {
            return;
        }

        let requests = self.viewer.startup_requests();
        info!(tiles = requests.len(), "Loading startup tiles");
        self.startup_batch = self.dispatch(requests);

        while !self.viewer.is_ready() {
            if self.startup_batch.is_none() {
                self.complete_startup();
                break;
            }
            let Some(event) = self.events.recv().await else {
                break;
            };
            self.handle_event(event);
        }
    }

    pub fn viewer(&self) -> &Viewer<RgbaImage> {
        &self.viewer
    }

    pub fn surface(&self) -> &F {
        &self.surface
    }

    pub fn into_surface(self) -> F {
        self.surface
    }

    /// Number of frames painted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Statistics of the most recent paint.
    pub fn last_paint(&self) -> PaintStats {
        self.last_paint
    }

    /// Number of dispatched batches still loading.
    pub fn outstanding_batches(&self) -> usize {
        self.outstanding.len()
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Apply a navigation intent, load what it needs and repaint.
    ///
    /// Returns the id of the dispatched batch, if any tiles were missing.
    pub fn apply(&mut self, intent: Intent) -> Option<BatchId> {
        if !self.viewer.is_ready() {
            debug!(?intent, "Ignoring input before startup completed");
            return None;
        }

        let requests = self.viewer.apply(intent);
        let batch = self.dispatch(requests);
        self.repaint();
        batch
    }

    pub fn pointer_down(&mut self, position: Point) {
        self.gestures.pointer_down(position);
    }

    pub fn pointer_move(&mut self, position: Point) -> Option<BatchId> {
        let intent = self.gestures.pointer_move(position)?;
        self.apply(intent)
    }

    pub fn pointer_up(&mut self, position: Point) -> Option<BatchId> {
        let intent = self.gestures.pointer_up(position)?;
        self.apply(intent)
    }

    pub fn pointer_leave(&mut self) {
        self.gestures.pointer_leave();
    }

    pub fn pointer_enter(&mut self) {
        self.gestures.pointer_enter();
    }

    /// Pointer movement anywhere in the window, used while a drag has left
    /// the canvas.
    pub fn window_pointer_move(&mut self, position: Point) -> Option<BatchId> {
        let intent = self.gestures.window_pointer_move(position)?;
        self.apply(intent)
    }

    pub fn window_pointer_up(&mut self, position: Point) -> Option<BatchId> {
        let intent = self.gestures.window_pointer_up(position)?;
        self.apply(intent)
    }

    pub fn wheel(&mut self, delta: f64, position: Point) -> Option<BatchId> {
        let intent = self.gestures.wheel(delta, position)?;
        self.apply(intent)
    }

    // =========================================================================
    // Loader events
    // =========================================================================

    /// Apply one loader event. Returns `true` if a frame was painted.
    pub fn handle_event(&mut self, event: LoaderEvent) -> bool {
        match event {
            LoaderEvent::Arrived { identifier, image } => {
                if !self.viewer.tile_arrived(&identifier, image) {
                    trace!(tile = %identifier, "Arrival did not change the store");
                    return false;
                }
                debug!(tile = %identifier, "Tile arrived");
                if self.viewer.is_ready() {
                    self.repaint();
                    return true;
                }
                false
            }
            LoaderEvent::Failed { identifier, error } => {
                debug!(tile = %identifier, error = %error, "Tile stays pending");
                false
            }
            LoaderEvent::BatchComplete { batch } => {
                self.outstanding.remove(&batch);
                debug!(batch, outstanding = self.outstanding.len(), "Batch complete");
                if self.startup_batch == Some(batch) && !self.viewer.is_ready() {
                    self.complete_startup();
                    return true;
                }
                false
            }
        }
    }

    /// Wait for the next loader event and apply it.
    ///
    /// Returns `false` if the loader channel is closed.
    pub async fn next_event(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply loader events until every dispatched batch has completed.
    pub async fn settle(&mut self) {
        while !self.outstanding.is_empty() {
            if !self.next_event().await {
                break;
            }
        }
    }

    /// Apply every loader event that is already queued, without waiting.
    ///
    /// Returns the number of events applied.
    pub fn try_drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    fn dispatch(&mut self, requests: Vec<TileRequest>) -> Option<BatchId> {
        let batch = self.loader.dispatch(requests)?;
        self.outstanding.insert(batch);
        Some(batch)
    }

    fn complete_startup(&mut self) {
        self.viewer.finish_startup();
        self.repaint();
        info!(
            zoom_level = self.viewer.viewport().zoom_level(),
            "Viewer ready"
        );
    }

    fn repaint(&mut self) {
        self.last_paint = self.viewer.paint(&mut self.surface);
        self.frames += 1;
    }
}
