//! Perception pipeline for single-frame face analysis.
//!
//! Turns raw request bytes into a validated RGB raster, then answers
//! two questions about it: how many faces are present (bucketed into
//! zero, one, two-or-more) and how the most prominent head is oriented
//! (yaw/pitch/roll degrees via PnP against a fixed 3D head model).
//!
//! Model runtimes are consumed through the [`capability`] traits so the
//! ONNX backends can be swapped for test doubles. The real backends
//! live behind the `ort` cargo feature.

pub mod backend;
pub mod capability;
pub mod decode;
pub mod error;
pub mod landmark;
pub mod pose;
pub mod presence;
pub mod raster;

pub use capability::{FaceDetector, FaceLandmarker};
pub use decode::{normalize_base64, normalize_bytes};
pub use error::{VisionError, VisionResult};
pub use landmark::{FaceLandmarks, LandmarkId, REFERENCE_LANDMARKS};
pub use pose::HeadPoseEstimator;
pub use presence::FacePresenceClassifier;
pub use raster::RgbRaster;
