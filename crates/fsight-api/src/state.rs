//! Application state.

use std::sync::Arc;

use fsight_vision::backend::{OnnxBlazeFaceDetector, OnnxFaceMeshLandmarker};
use fsight_vision::{
    FaceDetector, FaceLandmarker, FacePresenceClassifier, HeadPoseEstimator, VisionError,
};

use crate::config::ApiConfig;

/// Shared application state.
///
/// The model-backed capabilities load once at startup and are shared
/// across requests; each inference call is read-only with respect to
/// this state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub presence: Arc<FacePresenceClassifier>,
    pub pose: Arc<HeadPoseEstimator>,
}

impl AppState {
    /// Create application state with the ONNX-backed capabilities.
    pub fn new(config: ApiConfig) -> Result<Self, VisionError> {
        let detector = Arc::new(OnnxBlazeFaceDetector::load(&config.detector_model_path)?);
        let landmarker = Arc::new(OnnxFaceMeshLandmarker::load(&config.landmarker_model_path)?);
        Ok(Self::with_capabilities(config, detector, landmarker))
    }

    /// Create application state over arbitrary capability
    /// implementations. This is the seam integration tests use to swap
    /// in synthetic detectors.
    pub fn with_capabilities(
        config: ApiConfig,
        detector: Arc<dyn FaceDetector>,
        landmarker: Arc<dyn FaceLandmarker>,
    ) -> Self {
        Self {
            config,
            presence: Arc::new(FacePresenceClassifier::new(detector)),
            pose: Arc::new(HeadPoseEstimator::new(landmarker)),
        }
    }
}
