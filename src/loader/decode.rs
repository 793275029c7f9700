use std::io::Cursor;

use image::{ImageReader, RgbaImage};

use crate::error::LoadError;

/// Decode encoded tile bytes into an RGBA image.
///
/// The format is sniffed from the data rather than trusted from the file
/// extension.
///
/// # Errors
///
/// Returns [`LoadError::Decode`] if the data is not a supported image.
pub fn decode_tile(uri: &str, data: &[u8]) -> Result<RgbaImage, LoadError> {
    let decode_error = |message: String| LoadError::Decode {
        uri: uri.to_string(),
        message,
    };

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?;

    let image = reader.decode().map_err(|e| decode_error(e.to_string()))?;

    Ok(image.to_rgba8())
}
