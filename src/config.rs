//! Configuration management for canvas-zoom.
//!
//! This module provides the command-line interface:
//! - Command-line arguments via clap
//! - Environment variables with `CANVASZOOM_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use canvas_zoom::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Render(config) => println!("Rendering tiles from {}", config.tiles),
//!     Command::Info(config) => println!("Canvas {}x{}", config.canvas.canvas_width, config.canvas.canvas_height),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `CANVASZOOM_TILES` - Folder containing the tile pyramid
//! - `CANVASZOOM_DZI` - Deep Zoom descriptor describing the image
//! - `CANVASZOOM_WIDTH` / `CANVASZOOM_HEIGHT` - Image size, when no descriptor is given
//! - `CANVASZOOM_TILE_SIZE` - Tile edge length (default: 256)
//! - `CANVASZOOM_FORMAT` - Tile file extension (default: jpg)
//! - `CANVASZOOM_CANVAS_WIDTH` / `CANVASZOOM_CANVAS_HEIGHT` - Canvas size (default: 800x600)
//! - `CANVASZOOM_OUTPUT` - Rendered frame path (default: out.jpg)
//! - `CANVASZOOM_QUALITY` - JPEG quality of the rendered frame (default: 90)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::descriptor::ImageDescriptor;
use crate::error::ConfigError;
use crate::geometry::{CanvasSize, Point};
use crate::pyramid::DEFAULT_TILE_SIZE;
use crate::render::DEFAULT_FRAME_QUALITY;
use crate::tile::DEFAULT_TILE_FORMAT;

// =============================================================================
// Default Values
// =============================================================================

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Default output path for rendered frames.
pub const DEFAULT_OUTPUT: &str = "out.jpg";

// =============================================================================
// CLI Arguments
// =============================================================================

/// canvas-zoom - A deep zoom tile viewer.
///
/// Loads a tile pyramid, replays navigation actions and renders the
/// resulting frame.
#[derive(Parser, Debug, Clone)]
#[command(name = "canvas-zoom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replay navigation actions and write the final frame as a JPEG.
    Render(RenderConfig),

    /// Print the pyramid geometry as JSON.
    Info(InfoConfig),
}

/// Image size and tile layout.
#[derive(Args, Debug, Clone)]
pub struct ImageArgs {
    /// Deep Zoom descriptor (.dzi) describing the image.
    ///
    /// Takes precedence over --width, --height, --tile-size and --format.
    #[arg(long, env = "CANVASZOOM_DZI")]
    pub dzi: Option<PathBuf>,

    /// Full-resolution image width in pixels.
    #[arg(long, env = "CANVASZOOM_WIDTH")]
    pub width: Option<u32>,

    /// Full-resolution image height in pixels.
    #[arg(long, env = "CANVASZOOM_HEIGHT")]
    pub height: Option<u32>,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "CANVASZOOM_TILE_SIZE")]
    pub tile_size: u32,

    /// Tile file extension.
    #[arg(long, default_value = DEFAULT_TILE_FORMAT, env = "CANVASZOOM_FORMAT")]
    pub format: String,
}

impl ImageArgs {
    /// Validate the image arguments and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.dzi.is_none() && (self.width.is_none() || self.height.is_none()) {
            return Err(
                "Image size is required. Set --dzi, or both --width and --height".to_string(),
            );
        }

        if self.dzi.is_none() {
            if self.width == Some(0) || self.height == Some(0) {
                return Err("width and height must be greater than 0".to_string());
            }
            if self.tile_size == 0 {
                return Err("tile_size must be greater than 0".to_string());
            }
            if self.format.is_empty() {
                return Err("format must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Build the image descriptor, from the contents of the `--dzi` file if
    /// one was given, otherwise from the explicit dimensions.
    pub fn descriptor(&self, dzi_xml: Option<&str>) -> Result<ImageDescriptor, ConfigError> {
        if let Some(xml) = dzi_xml {
            return ImageDescriptor::from_dzi_xml(xml);
        }

        match (self.width, self.height) {
            (Some(width), Some(height)) => Ok(ImageDescriptor::new(width, height)
                .with_tile_size(self.tile_size)
                .with_format(self.format.clone())),
            (width, height) => Err(ConfigError::InvalidImageSize {
                width: width.unwrap_or(0),
                height: height.unwrap_or(0),
            }),
        }
    }
}

/// Size of the drawing surface.
#[derive(Args, Debug, Clone)]
pub struct CanvasArgs {
    /// Canvas width in pixels.
    #[arg(long, default_value_t = DEFAULT_CANVAS_WIDTH, env = "CANVASZOOM_CANVAS_WIDTH")]
    pub canvas_width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = DEFAULT_CANVAS_HEIGHT, env = "CANVASZOOM_CANVAS_HEIGHT")]
    pub canvas_height: u32,
}

impl CanvasArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err("canvas_width and canvas_height must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }
}

/// Configuration for the `render` command.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    // =========================================================================
    // Input
    // =========================================================================
    /// Folder containing the tile pyramid (`{level}/{column}_{row}.{format}`).
    #[arg(long, env = "CANVASZOOM_TILES")]
    pub tiles: String,

    #[command(flatten)]
    pub image: ImageArgs,

    // =========================================================================
    // Viewer
    // =========================================================================
    #[command(flatten)]
    pub canvas: CanvasArgs,

    /// Do not stroke a border around the canvas.
    #[arg(long, default_value_t = false)]
    pub no_border: bool,

    /// Navigation action to replay, in order. May be repeated.
    ///
    /// One of `pan:DX,DY`, `zoom-in:X,Y`, `zoom-out:X,Y`, `click:X,Y`,
    /// `wheel:DELTA@X,Y`, `zoom-in-centre`, `zoom-out-centre`.
    #[arg(long = "action", value_name = "ACTION")]
    pub actions: Vec<Action>,

    // =========================================================================
    // Output
    // =========================================================================
    /// Path of the rendered JPEG frame.
    #[arg(short, long, default_value = DEFAULT_OUTPUT, env = "CANVASZOOM_OUTPUT")]
    pub output: PathBuf,

    /// JPEG quality of the rendered frame (1-100).
    #[arg(long, default_value_t = DEFAULT_FRAME_QUALITY, env = "CANVASZOOM_QUALITY")]
    pub quality: u8,

    // =========================================================================
    // Logging
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RenderConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tiles.is_empty() {
            return Err("Tile folder is required. Set --tiles or CANVASZOOM_TILES".to_string());
        }

        self.image.validate()?;
        self.canvas.validate()?;

        if self.quality == 0 || self.quality > 100 {
            return Err("quality must be between 1 and 100".to_string());
        }

        Ok(())
    }

    pub fn draw_border(&self) -> bool {
        !self.no_border
    }
}

/// Configuration for the `info` command.
#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    #[command(flatten)]
    pub image: ImageArgs,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.image.validate()?;
        self.canvas.validate()
    }
}

// =============================================================================
// Actions
// =============================================================================

/// A scripted navigation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Drag by a canvas-space delta
    Pan { dx: f64, dy: f64 },

    /// Zoom one level in around a point
    ZoomIn(Point),

    /// Zoom one level out around a point
    ZoomOut(Point),

    /// Press and release at the same point
    Click(Point),

    /// Wheel turned at a point; negative zooms in
    Wheel { delta: f64, at: Point },

    ZoomInCentre,

    ZoomOutCentre,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, args) = match s.split_once(':') {
            Some((name, args)) => (name, Some(args)),
            None => (s, None),
        };

        match (name, args) {
            ("zoom-in-centre", None) => Ok(Action::ZoomInCentre),
            ("zoom-out-centre", None) => Ok(Action::ZoomOutCentre),
            ("pan", Some(args)) => {
                let (dx, dy) = parse_pair(args)?;
                Ok(Action::Pan { dx, dy })
            }
            ("zoom-in", Some(args)) => Ok(Action::ZoomIn(parse_point(args)?)),
            ("zoom-out", Some(args)) => Ok(Action::ZoomOut(parse_point(args)?)),
            ("click", Some(args)) => Ok(Action::Click(parse_point(args)?)),
            ("wheel", Some(args)) => {
                let (delta, at) = args
                    .split_once('@')
                    .ok_or_else(|| format!("Expected wheel:DELTA@X,Y, got '{}'", s))?;
                Ok(Action::Wheel {
                    delta: parse_number(delta)?,
                    at: parse_point(at)?,
                })
            }
            _ => Err(format!("Unknown action '{}'", s)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pan { dx, dy } => write!(f, "pan:{},{}", dx, dy),
            Action::ZoomIn(p) => write!(f, "zoom-in:{},{}", p.x, p.y),
            Action::ZoomOut(p) => write!(f, "zoom-out:{},{}", p.x, p.y),
            Action::Click(p) => write!(f, "click:{},{}", p.x, p.y),
            Action::Wheel { delta, at } => write!(f, "wheel:{}@{},{}", delta, at.x, at.y),
            Action::ZoomInCentre => f.write_str("zoom-in-centre"),
            Action::ZoomOutCentre => f.write_str("zoom-out-centre"),
        }
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number '{}'", s))?;
    if !value.is_finite() {
        return Err(format!("Invalid number '{}'", s));
    }
    Ok(value)
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected two comma-separated numbers, got '{}'", s))?;
    Ok((parse_number(a)?, parse_number(b)?))
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = parse_pair(s)?;
    Ok(Point::new(x, y))
}

// =============================================================================
// Tests
// =============================================================================
