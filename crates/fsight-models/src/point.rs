use serde::{Deserialize, Serialize};

/// A 2D landmark point in normalized image coordinates
/// (0.0 = left/top edge, 1.0 = right/bottom edge).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Create a new normalized point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// De-normalize to pixel coordinates for a frame of the given size.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * f64::from(width), self.y * f64::from(height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pixels() {
        let p = NormalizedPoint::new(0.5, 0.25);
        assert_eq!(p.to_pixels(640, 480), (320.0, 120.0));
    }
}
