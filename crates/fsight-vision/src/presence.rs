//! Face presence classification.

use std::sync::Arc;

use fsight_models::FaceCount;
use tracing::debug;

use crate::capability::FaceDetector;
use crate::error::VisionResult;
use crate::raster::RgbRaster;

/// Classifies a frame into the three-valued face presence category by
/// counting detector bounding boxes.
///
/// Holds a shared reference to the detector capability; the classifier
/// itself is stateless and request-scoped. A single detector invocation
/// per call, no retries — detector failures propagate to the caller.
pub struct FacePresenceClassifier {
    detector: Arc<dyn FaceDetector>,
}

impl FacePresenceClassifier {
    /// Create a classifier over a detector capability.
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        Self { detector }
    }

    /// Name of the underlying detector backend.
    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Count faces in a frame, bucketed into {0, 1, 2-or-more}.
    ///
    /// The raster shape invariant (HxWx3, non-empty) is enforced by
    /// `RgbRaster` construction, before any model capability runs.
    pub fn count_faces(&self, raster: &RgbRaster) -> VisionResult<FaceCount> {
        let boxes = self.detector.detect(raster)?;

        let count = match boxes {
            None => 0,
            Some(b) => b.len(),
        };
        debug!(
            detector = self.detector.name(),
            raw_count = count,
            "Face presence classified"
        );

        Ok(FaceCount::from_detections(count))
    }
}
