//! Per-viewer state.
//!
//! A [`Viewer`] exclusively owns everything one deep zoom view needs: the
//! pyramid, the tile store and the viewport. There is no shared or global
//! state, so any number of viewers can coexist.
//!
//! Every navigation call resolves the tiles needed for the *target* view
//! before committing it and hands the resulting requests back to the caller,
//! which forwards them to a loader and repaints. Tiles returned from one call
//! are already pending and will never be returned again.
//!
//! # Lifecycle
//!
//! 1. [`Viewer::new`] derives the pyramid; the view starts at the start level.
//! 2. [`Viewer::startup_requests`] returns every tile of the start level plus
//!    the fallback tile.
//! 3. Once that batch has completed, [`Viewer::finish_startup`] centres the
//!    image and enables input intents.

use tracing::debug;

use crate::descriptor::ImageDescriptor;
use crate::error::ConfigError;
use crate::geometry::CanvasSize;
use crate::gesture::Intent;
use crate::pyramid::Pyramid;
use crate::render::{Compositor, PaintStats, Surface};
use crate::tile::{TileAddressing, TileId, TileRequest, TileSetResolver, TileStore};
use crate::viewport::Viewport;

/// Everything needed to construct a [`Viewer`].
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Image size, tile size and tile format
    pub descriptor: ImageDescriptor,

    /// Folder (or URL prefix) tiles are addressed under
    pub tiles_folder: String,

    /// Size of the drawing surface
    pub canvas: CanvasSize,

    /// Stroke a border around the canvas on every paint
    pub draw_border: bool,
}

impl ViewerConfig {
    pub fn new(
        descriptor: ImageDescriptor,
        tiles_folder: impl Into<String>,
        canvas: CanvasSize,
    ) -> Self {
        Self {
            descriptor,
            tiles_folder: tiles_folder.into(),
            canvas,
            draw_border: true,
        }
    }

    pub fn with_border(mut self, draw_border: bool) -> Self {
        self.draw_border = draw_border;
        self
    }
}

/// A single deep zoom view, generic over the decoded tile image type `H`.
pub struct Viewer<H> {
    pyramid: Pyramid,
    store: TileStore<H>,
    viewport: Viewport,
    resolver: TileSetResolver,
    compositor: Compositor,
    ready: bool,
}

impl<H> Viewer<H> {
    /// Build a viewer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for zero image, tile or canvas dimensions or
    /// an empty tile format. Nothing is allocated in that case.
    pub fn new(config: ViewerConfig) -> Result<Self, ConfigError> {
        let descriptor = &config.descriptor;
        let addressing = TileAddressing::new(config.tiles_folder, descriptor.format.clone())?;
        let pyramid = Pyramid::build(
            descriptor.width,
            descriptor.height,
            descriptor.tile_size,
            config.canvas,
        )?;

        debug!(
            width = descriptor.width,
            height = descriptor.height,
            max_level = pyramid.max_level(),
            start_level = pyramid.start_level(),
            fallback_level = pyramid.fallback_level(),
            "Created viewer"
        );

        Ok(Self {
            store: TileStore::new(&pyramid),
            viewport: Viewport::new(&pyramid, config.canvas),
            resolver: TileSetResolver::new(addressing, config.canvas),
            compositor: Compositor::new(config.draw_border),
            pyramid,
            ready: false,
        })
    }

    pub fn pyramid(&self) -> &Pyramid {
        &self.pyramid
    }

    pub fn store(&self) -> &TileStore<H> {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// True once the startup batch has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The initial batch: all tiles of the start level and the fallback tile.
    pub fn startup_requests(&mut self) -> Vec<TileRequest> {
        self.resolver.startup_batch(&mut self.store, &self.pyramid)
    }

    /// Centre the image and start accepting input intents.
    pub fn finish_startup(&mut self) {
        self.viewport.centre_on_level(&self.pyramid);
        self.ready = true;
        debug!(
            offset_x = self.viewport.offset().0,
            offset_y = self.viewport.offset().1,
            "Startup complete"
        );
    }

    /// Pan by a canvas-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Vec<TileRequest> {
        let (x, y) = self.viewport.offset();
        let requests = self.resolve(self.viewport.zoom_level(), (x + dx, y + dy));
        self.viewport.pan_by(dx, dy);
        requests
    }

    /// Zoom to `level` around a canvas point. Out-of-range levels are
    /// ignored.
    pub fn zoom_to(&mut self, level: usize, focal_x: f64, focal_y: f64) -> Vec<TileRequest> {
        let Some(offset) = self
            .viewport
            .preview_zoom(&self.pyramid, level, focal_x, focal_y)
        else {
            debug!(level, "Ignoring zoom outside the pyramid");
            return Vec::new();
        };

        let requests = self.resolve(level, offset);
        self.viewport.set_state(level, offset);
        requests
    }

    pub fn zoom_in_at(&mut self, x: f64, y: f64) -> Vec<TileRequest> {
        match self.viewport.zoom_level().checked_add(1) {
            Some(level) => self.zoom_to(level, x, y),
            None => Vec::new(),
        }
    }

    pub fn zoom_out_at(&mut self, x: f64, y: f64) -> Vec<TileRequest> {
        match self.viewport.zoom_level().checked_sub(1) {
            Some(level) => self.zoom_to(level, x, y),
            None => Vec::new(),
        }
    }

    pub fn zoom_in_centre(&mut self) -> Vec<TileRequest> {
        let (x, y) = self.viewport.canvas().centre();
        self.zoom_in_at(x, y)
    }

    pub fn zoom_out_centre(&mut self) -> Vec<TileRequest> {
        let (x, y) = self.viewport.canvas().centre();
        self.zoom_out_at(x, y)
    }

    /// Apply an input intent. Intents are ignored until startup has
    /// finished.
    pub fn apply(&mut self, intent: Intent) -> Vec<TileRequest> {
        if !self.ready {
            debug!(?intent, "Ignoring input before startup completed");
            return Vec::new();
        }

        match intent {
            Intent::Pan { dx, dy } => self.pan(dx, dy),
            Intent::ZoomInAt(point) => self.zoom_in_at(point.x, point.y),
            Intent::ZoomOutAt(point) => self.zoom_out_at(point.x, point.y),
            Intent::ZoomInCentre => self.zoom_in_centre(),
            Intent::ZoomOutCentre => self.zoom_out_centre(),
        }
    }

    /// Record a decoded tile tagged with its textual identifier.
    ///
    /// Returns `true` if the store changed and the frame should be repainted.
    /// Malformed or out-of-range identifiers are dropped.
    pub fn tile_arrived(&mut self, identifier: &str, image: H) -> bool {
        self.store.tile_arrived_named(identifier, image)
    }

    /// Record a decoded tile by coordinates.
    pub fn tile_arrived_id(&mut self, id: TileId, image: H) -> bool {
        self.store.tile_arrived(id, image)
    }

    /// Repaint the full frame.
    pub fn paint<S: Surface<Image = H>>(&self, surface: &mut S) -> PaintStats {
        self.compositor
            .paint(&self.pyramid, &self.store, &self.viewport, surface)
    }

    fn resolve(&mut self, level: usize, offset: (f64, f64)) -> Vec<TileRequest> {
        self.resolver
            .resolve(&mut self.store, &self.pyramid, level, offset)
    }
}
