//! Error types for perception operations.

use thiserror::Error;

/// Result type for perception operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur in the perception pipeline.
///
/// Note that "no face found" and "pose could not be solved" are NOT
/// errors: both are representable results (`FaceCount::None`, a `None`
/// pose). Only malformed input and capability failures surface here.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Input bytes are not a decodable image, not valid base64, or the
    /// decoded raster does not have three channels. Always user-caused.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// A model file could not be found or loaded.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A face detector or landmarker capability failed.
    #[error("Detection failed: {0}")]
    DetectionFailed(String),

    /// Any other unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VisionError {
    /// Create an invalid image error.
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
