//! In-memory raster surface.
//!
//! Renders frames into an [`RgbaImage`], which makes the viewer usable
//! headless: the CLI writes the result to disk and the tests inspect pixels.
//!
//! Cleared pixels are fully transparent. When a frame is encoded as JPEG,
//! which has no alpha channel, it is flattened onto the configured
//! background colour first.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};

use crate::error::RenderError;
use crate::geometry::{CanvasSize, Rect};

use super::surface::Surface;

/// Default JPEG quality for encoded frames (1-100).
pub const DEFAULT_FRAME_QUALITY: u8 = 90;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Integer pixel span `[x0, x1) x [y0, y1)` of a rectangle, clipped to the
/// frame. `None` if nothing remains.
fn pixel_span(rect: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.left().round().max(0.0) as u32;
    let y0 = rect.top().round().max(0.0) as u32;
    let x1 = rect.right().round().clamp(0.0, width as f64) as u32;
    let y1 = rect.bottom().round().clamp(0.0, height as f64) as u32;

    if x0 < x1 && y0 < y1 {
        Some((x0, y0, x1, y1))
    } else {
        None
    }
}

/// A [`Surface`] backed by an RGBA pixel buffer.
pub struct RasterSurface {
    frame: RgbaImage,
    background: Rgb<u8>,
}

impl RasterSurface {
    /// Create a transparent surface of the given size.
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            frame: RgbaImage::from_pixel(canvas.width, canvas.height, TRANSPARENT),
            background: WHITE,
        }
    }

    /// Colour transparent pixels are flattened onto when encoding.
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    /// The rendered pixels.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Flatten the frame onto the background colour.
    pub fn flatten(&self) -> RgbImage {
        let bg = self.background.0;
        RgbImage::from_fn(self.frame.width(), self.frame.height(), |x, y| {
            let Rgba([r, g, b, a]) = *self.frame.get_pixel(x, y);
            let alpha = a as u32;
            let blend = |c: u8, bg: u8| -> u8 {
                ((c as u32 * alpha + bg as u32 * (255 - alpha)) / 255) as u8
            };
            Rgb([blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2])])
        })
    }

    /// Encode the flattened frame as JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EncodeError`] if encoding fails.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Bytes, RenderError> {
        let quality = quality.clamp(1, 100);
        let flattened = self.flatten();

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
        encoder
            .encode_image(&flattened)
            .map_err(|e| RenderError::EncodeError {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}

impl Surface for RasterSurface {
    type Image = RgbaImage;

    fn size(&self) -> CanvasSize {
        CanvasSize::new(self.frame.width(), self.frame.height())
    }

    fn clear_rect(&mut self, rect: Rect) {
        let Some((x0, y0, x1, y1)) = pixel_span(rect, self.frame.width(), self.frame.height())
        else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.frame.put_pixel(x, y, TRANSPARENT);
            }
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64) {
        imageops::replace(&mut self.frame, image, x.round() as i64, y.round() as i64);
    }

    fn draw_image_scaled_clipped(&mut self, image: &RgbaImage, dest: Rect, clip: Rect) {
        if dest.is_empty() || image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(region) = clip.intersection(&dest) else {
            return;
        };
        let Some((x0, y0, x1, y1)) = pixel_span(region, self.frame.width(), self.frame.height())
        else {
            return;
        };

        // Nearest-neighbour sampling from pixel centres.
        let scale_x = image.width() as f64 / dest.width;
        let scale_y = image.height() as f64 / dest.height;
        let max_x = image.width() - 1;
        let max_y = image.height() - 1;

        for y in y0..y1 {
            let sy = ((y as f64 + 0.5 - dest.y) * scale_y).floor().clamp(0.0, max_y as f64) as u32;
            for x in x0..x1 {
                let sx =
                    ((x as f64 + 0.5 - dest.x) * scale_x).floor().clamp(0.0, max_x as f64) as u32;
                self.frame.put_pixel(x, y, *image.get_pixel(sx, sy));
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let Some((x0, y0, x1, y1)) = pixel_span(rect, self.frame.width(), self.frame.height())
        else {
            return;
        };
        for x in x0..x1 {
            self.frame.put_pixel(x, y0, BORDER);
            self.frame.put_pixel(x, y1 - 1, BORDER);
        }
        for y in y0..y1 {
            self.frame.put_pixel(x0, y, BORDER);
            self.frame.put_pixel(x1 - 1, y, BORDER);
        }
    }
}
