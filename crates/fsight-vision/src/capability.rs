//! Capability traits wrapping the underlying model runtimes.
//!
//! Face detection and landmark detection are consumed through these
//! narrow interfaces so alternative backends (or synthetic test
//! doubles) can be substituted without touching the classifier or
//! estimator logic. Implementations are long-lived, initialized once at
//! process start, and must be safe to share across concurrent
//! read-only inference calls.

use fsight_models::BoundingBox;

use crate::error::VisionResult;
use crate::landmark::FaceLandmarks;
use crate::raster::RgbRaster;

/// Face detection capability.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a frame.
    ///
    /// # Returns
    /// `None` when the detector signals "no detections"; otherwise the
    /// detected bounding boxes. Only the count matters to callers.
    fn detect(&self, raster: &RgbRaster) -> VisionResult<Option<Vec<BoundingBox>>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Facial landmark detection capability.
///
/// The provider is configured to return at most one face; callers use
/// the first landmark set and ignore extras by contract.
pub trait FaceLandmarker: Send + Sync {
    /// Detect per-face landmark sets in a frame. Empty means no face.
    fn detect(&self, raster: &RgbRaster) -> VisionResult<Vec<FaceLandmarks>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
