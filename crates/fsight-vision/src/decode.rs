//! Image normalization: raw or base64-encoded bytes into an RGB raster.
//!
//! Pure transforms with no side effects. Any source color mode
//! (grayscale, palette, RGBA, CMYK) is converted to 3-channel RGB;
//! alpha and extra channels are dropped intentionally since face
//! geometry only needs color content.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ndarray::Array3;

use crate::error::{VisionError, VisionResult};
use crate::raster::RgbRaster;

/// Decode encoded image bytes (PNG, JPEG, ...) into an RGB raster.
pub fn normalize_bytes(bytes: &[u8]) -> VisionResult<RgbRaster> {
    if bytes.is_empty() {
        return Err(VisionError::invalid_image("empty image payload"));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| VisionError::invalid_image(format!("undecodable image bytes: {e}")))?;

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let data = Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw())
        .map_err(|e| VisionError::internal(format!("raster shape mismatch: {e}")))?;

    RgbRaster::from_array(data)
}

/// Decode a base64 string of encoded image bytes into an RGB raster.
///
/// Invalid base64 (wrong alphabet, bad padding) is reported as
/// `InvalidImage`, not as a lower-level decode error.
pub fn normalize_base64(image_base64: &str) -> VisionResult<RgbRaster> {
    if image_base64.is_empty() {
        return Err(VisionError::invalid_image("empty base64 payload"));
    }

    let bytes = BASE64
        .decode(image_base64)
        .map_err(|e| VisionError::invalid_image(format!("invalid base64: {e}")))?;

    normalize_bytes(&bytes)
}
