//! HTTP request/response schemas for the inference endpoints.

use serde::{Deserialize, Serialize};

use crate::face_count::FaceCount;
use crate::pose::PoseAngles;

/// JSON request body carrying a single RGB frame as base64 image bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBase64Request {
    /// Single RGB frame encoded as base64 image bytes.
    pub image_base64: String,
}

/// Response for `POST /infer/face-presence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacePresenceResponse {
    pub faces_detected: FaceCount,
}

/// Response for `POST /infer/head-pose`.
///
/// All three angles are null when no face was found or the pose could
/// not be solved; the two conditions are indistinguishable on the wire
/// by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadPoseResponse {
    pub yaw: Option<f64>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
}

impl HeadPoseResponse {
    /// The "unknown pose" response.
    pub fn unknown() -> Self {
        Self {
            yaw: None,
            pitch: None,
            roll: None,
        }
    }
}

impl From<Option<PoseAngles>> for HeadPoseResponse {
    fn from(angles: Option<PoseAngles>) -> Self {
        match angles {
            Some(a) => Self {
                yaw: Some(a.yaw),
                pitch: Some(a.pitch),
                roll: Some(a.roll),
            },
            None => Self::unknown(),
        }
    }
}
