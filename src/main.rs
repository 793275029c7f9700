//! canvas-zoom - A deep zoom tile viewer.
//!
//! This binary replays scripted navigation against a tile pyramid on disk and
//! writes the resulting frame, or prints the pyramid geometry.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvas_zoom::{
    config::{Action, Cli, Command, ImageArgs, InfoConfig, RenderConfig},
    FsTileSource, ImageDescriptor, Intent, Pyramid, RasterSurface, RenderError, Session,
    Viewer, ViewerConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Render(config) => run_render(config).await,
        Command::Info(config) => run_info(config).await,
    }
}

// =============================================================================
// Render Command
// =============================================================================

async fn run_render(config: RenderConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let descriptor = match load_descriptor(&config.image).await {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let canvas = config.canvas.size();
    let viewer_config = ViewerConfig::new(descriptor, config.tiles.clone(), canvas)
        .with_border(config.draw_border());

    let viewer = match Viewer::new(viewer_config) {
        Ok(viewer) => viewer,
        Err(e) => {
            error!("Failed to create viewer: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration:");
    info!("  Tiles: {}", config.tiles);
    info!(
        "  Image: {}x{}, {} levels",
        viewer.pyramid().image_width(),
        viewer.pyramid().image_height(),
        viewer.pyramid().max_level() + 1
    );
    info!("  Canvas: {}x{}", canvas.width, canvas.height);

    let mut session = Session::new(viewer, FsTileSource::new(), RasterSurface::new(canvas));
    session.start().await;

    for action in &config.actions {
        info!("Action: {}", action);
        replay(&mut session, *action);
        session.settle().await;
    }

    let stats = session.last_paint();
    let counts = session.viewer().store().counts();
    info!(
        "Final frame at level {}: {} tiles, {} fallback, {} blank",
        session.viewer().viewport().zoom_level(),
        stats.tiles,
        stats.fallback,
        stats.blank
    );
    info!(
        "Tile store: {} loaded, {} pending, {} empty",
        counts.loaded, counts.pending, counts.empty
    );

    let jpeg = match session.surface().encode_jpeg(config.quality) {
        Ok(jpeg) => jpeg,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::write(&config.output, &jpeg).await {
        let e = RenderError::WriteError {
            path: config.output.display().to_string(),
            message: e.to_string(),
        };
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    info!("Wrote {} ({} bytes)", config.output.display(), jpeg.len());
    ExitCode::SUCCESS
}

/// Feed one scripted action through the session's input handlers.
fn replay(session: &mut Session<FsTileSource, RasterSurface>, action: Action) {
    match action {
        Action::Pan { dx, dy } => {
            session.apply(Intent::Pan { dx, dy });
        }
        Action::ZoomIn(point) => {
            session.apply(Intent::ZoomInAt(point));
        }
        Action::ZoomOut(point) => {
            session.apply(Intent::ZoomOutAt(point));
        }
        Action::Click(point) => {
            session.pointer_down(point);
            session.pointer_up(point);
        }
        Action::Wheel { delta, at } => {
            session.wheel(delta, at);
        }
        Action::ZoomInCentre => {
            session.apply(Intent::ZoomInCentre);
        }
        Action::ZoomOutCentre => {
            session.apply(Intent::ZoomOutCentre);
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

async fn run_info(config: InfoConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let descriptor = match load_descriptor(&config.image).await {
        Ok(descriptor) => descriptor,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pyramid = match Pyramid::build(
        descriptor.width,
        descriptor.height,
        descriptor.tile_size,
        config.canvas.size(),
    ) {
        Ok(pyramid) => pyramid,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let json = serde_json::json!({
        "descriptor": descriptor,
        "canvas": config.canvas.size(),
        "tile_count": pyramid.tile_count(),
        "pyramid": &pyramid,
    });

    match serde_json::to_string_pretty(&json) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Shared
// =============================================================================

/// Read the image descriptor from `--dzi` or the explicit dimensions.
async fn load_descriptor(image: &ImageArgs) -> Result<ImageDescriptor, String> {
    let dzi_xml = match &image.dzi {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        ),
        None => None,
    };

    image
        .descriptor(dzi_xml.as_deref())
        .map_err(|e| format!("Invalid image descriptor: {}", e))
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "canvas_zoom=debug"
    } else {
        "canvas_zoom=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
