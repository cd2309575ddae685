//! Canonical in-memory RGB frame representation.

use ndarray::Array3;

use crate::error::{VisionError, VisionResult};

/// A decoded RGB frame: dense `(height, width, 3)` array of 8-bit
/// samples in red-green-blue channel order.
///
/// Construction validates the shape, so holding an `RgbRaster` is proof
/// that `height > 0`, `width > 0` and there are exactly three channels.
/// Both classifiers rely on this invariant and never re-check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbRaster {
    data: Array3<u8>,
}

impl RgbRaster {
    /// Wrap a `(height, width, 3)` array, rejecting anything else.
    pub fn from_array(data: Array3<u8>) -> VisionResult<Self> {
        let (height, width, channels) = data.dim();
        if channels != 3 {
            return Err(VisionError::invalid_image(format!(
                "expected 3 channels, got {channels}"
            )));
        }
        if height == 0 || width == 0 {
            return Err(VisionError::invalid_image(format!(
                "empty raster ({height}x{width})"
            )));
        }
        Ok(Self { data })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    /// Read-only view of the underlying `(height, width, 3)` array.
    pub fn data(&self) -> &Array3<u8> {
        &self.data
    }

    /// RGB sample at `(x, y)`. Panics if out of bounds; callers iterate
    /// within `width()`/`height()`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let d = &self.data;
        [
            d[(y as usize, x as usize, 0)],
            d[(y as usize, x as usize, 1)],
            d[(y as usize, x as usize, 2)],
        ]
    }
}
