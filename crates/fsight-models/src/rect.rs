use serde::{Deserialize, Serialize};

/// An axis-aligned face bounding box in pixel coordinates with its
/// detector confidence. Only the count of boxes matters to the
/// presence classifier; coordinates are kept for logging and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Box width in pixels.
    pub width: f64,
    /// Box height in pixels.
    pub height: f64,
    /// Detector confidence (0.0 to 1.0).
    pub confidence: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Check if the box has positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Box area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}
