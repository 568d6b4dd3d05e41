//! Image decoding and validation

use crate::utils::error::{PuritanError, Result};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Verify and fully decode an uploaded image, then convert it to 8-bit RGB.
///
/// Unknown formats, truncated data and corrupt pixel streams all surface as
/// [`PuritanError::Decode`].
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    if bytes.is_empty() {
        return Err(PuritanError::decode("empty image payload"));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| PuritanError::decode(format!("unrecognized image format: {}", e)))?;

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PuritanError::decode(format!("invalid {:?} image: {}", format, e)))?;

    Ok(decoded.to_rgb8())
}

/// Encode an RGB image as PNG
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| PuritanError::internal(format!("failed to encode PNG: {}", e)))?;
    Ok(buffer.into_inner())
}
