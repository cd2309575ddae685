use serde::{Deserialize, Serialize};

/// Head orientation as Euler angles in degrees.
///
/// Yaw rotates about the vertical axis, pitch about the lateral axis,
/// roll about the forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl PoseAngles {
    /// Create a new pose angle triple.
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }
}
