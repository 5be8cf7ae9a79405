//! Image acquisition helpers
//!
//! Submitted images arrive as raw file bytes (upload, camera capture, file on
//! disk). The only validation performed is that they decode. Everything that is
//! stored or sent to the model is re-encoded as PNG.

use crate::error::{CoachError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// MIME type of every image this crate emits
pub const PNG_MIME: &str = "image/png";

/// Decode raw image bytes in any supported format
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(CoachError::InvalidImage("empty image data".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Decode a base64 payload (plain or `data:` URL) into an image
pub fn decode_base64(payload: &str) -> Result<DynamicImage> {
    let data = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };

    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| CoachError::InvalidInput(format!("image is not valid base64: {}", e)))?;
    decode(&bytes)
}

/// Read and decode an image file
pub fn load(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode an image losslessly as PNG
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// PNG-encode and base64 an image for JSON transport
pub fn to_base64_png(image: &DynamicImage) -> Result<String> {
    Ok(BASE64.encode(encode_png(image)?))
}
