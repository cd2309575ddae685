//! Head pose estimation pipeline.
//!
//! Landmarks from the landmarker capability are de-normalized to pixel
//! coordinates, matched against a fixed 3D head model, and fed through
//! a PnP solve plus an RQ decomposition to produce yaw/pitch/roll in
//! degrees. Any unusable intermediate (no face, incomplete landmarks,
//! degenerate geometry) yields `Ok(None)` rather than an error.

pub mod camera;
pub mod euler;
pub mod head_model;
pub mod pnp;

use std::sync::Arc;

use fsight_models::PoseAngles;
use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::capability::FaceLandmarker;
use crate::error::VisionResult;
use crate::landmark::REFERENCE_LANDMARKS;
use crate::raster::RgbRaster;

pub use camera::CameraIntrinsics;
pub use euler::{rotation_to_euler, EulerAngles};
pub use head_model::{head_model_points, HEAD_MODEL_POINTS};
pub use pnp::{solve_pnp, PnpSolution};

/// Estimates head orientation for the most prominent face in a frame.
pub struct HeadPoseEstimator {
    landmarker: Arc<dyn FaceLandmarker>,
}

impl HeadPoseEstimator {
    /// Create an estimator over a landmarker capability.
    pub fn new(landmarker: Arc<dyn FaceLandmarker>) -> Self {
        Self { landmarker }
    }

    /// Name of the underlying landmarker backend.
    pub fn landmarker_name(&self) -> &'static str {
        self.landmarker.name()
    }

    /// Estimate yaw/pitch/roll for the first detected face.
    ///
    /// `Ok(None)` means orientation is unknown: no face found, a
    /// reference landmark missing, or an unsolvable PnP geometry.
    /// Errors are reserved for backend failures.
    pub fn estimate(&self, raster: &RgbRaster) -> VisionResult<Option<PoseAngles>> {
        let faces = self.landmarker.detect(raster)?;
        let Some(face) = faces.first() else {
            debug!(landmarker = self.landmarker.name(), "No face for pose estimation");
            return Ok(None);
        };
        if faces.len() > 1 {
            debug!(extra = faces.len() - 1, "Ignoring extra landmark sets");
        }

        let width = raster.width();
        let height = raster.height();
        let mut image_points = Vec::with_capacity(REFERENCE_LANDMARKS.len());
        for id in REFERENCE_LANDMARKS {
            let Some(point) = face.point(id) else {
                warn!(?id, "Reference landmark missing from landmark set");
                return Ok(None);
            };
            let (u, v) = point.to_pixels(width, height);
            image_points.push(Vector2::new(u, v));
        }

        let intrinsics = CameraIntrinsics::for_frame(width, height);
        let rotation = match solve_pnp(&head_model_points(), &image_points, &intrinsics) {
            PnpSolution::Solved { rotation, .. } => rotation,
            PnpSolution::Unsolved => {
                debug!("PnP solve failed, reporting unknown orientation");
                return Ok(None);
            }
        };

        let Some(angles) = rotation_to_euler(&rotation) else {
            return Ok(None);
        };
        debug!(
            yaw = angles.yaw,
            pitch = angles.pitch,
            roll = angles.roll,
            "Head pose estimated"
        );

        Ok(Some(PoseAngles {
            yaw: angles.yaw,
            pitch: angles.pitch,
            roll: angles.roll,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{FaceLandmarks, LANDMARK_VOCABULARY_SIZE};
    use fsight_models::NormalizedPoint;
    use ndarray::Array3;

    struct StaticLandmarker(Vec<FaceLandmarks>);

    impl FaceLandmarker for StaticLandmarker {
        fn detect(&self, _raster: &RgbRaster) -> VisionResult<Vec<FaceLandmarks>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    fn raster(width: usize, height: usize) -> RgbRaster {
        RgbRaster::from_array(Array3::zeros((height, width, 3))).unwrap()
    }

    /// Landmark set whose reference points are the head model projected
    /// through the frame's own synthetic camera at a given pose.
    fn synthetic_face(
        width: u32,
        height: u32,
        rotation: &nalgebra::Matrix3<f64>,
        translation: &nalgebra::Vector3<f64>,
    ) -> FaceLandmarks {
        let intrinsics = CameraIntrinsics::for_frame(width, height);
        let mut points = vec![NormalizedPoint::new(0.5, 0.5); LANDMARK_VOCABULARY_SIZE];
        for (id, model) in REFERENCE_LANDMARKS.iter().zip(head_model_points()) {
            let cam = rotation * model + translation;
            let (u, v) = intrinsics.project(cam.x, cam.y, cam.z);
            points[id.index()] =
                NormalizedPoint::new(u / f64::from(width), v / f64::from(height));
        }
        FaceLandmarks::new(points)
    }

    #[test]
    fn test_frontal_face_is_near_zero() {
        let face = synthetic_face(
            640,
            480,
            &nalgebra::Matrix3::identity(),
            &nalgebra::Vector3::new(0.0, 0.0, 1000.0),
        );
        let estimator = HeadPoseEstimator::new(Arc::new(StaticLandmarker(vec![face])));

        let angles = estimator.estimate(&raster(640, 480)).unwrap().unwrap();
        assert!(angles.yaw.abs() < 2.0, "yaw {}", angles.yaw);
        assert!(angles.pitch.abs() < 2.0, "pitch {}", angles.pitch);
        assert!(angles.roll.abs() < 2.0, "roll {}", angles.roll);
    }

    #[test]
    fn test_turned_head_recovers_yaw() {
        let truth = nalgebra::Rotation3::from_euler_angles(0.0, 0.35, 0.0);
        let face = synthetic_face(
            1280,
            720,
            truth.matrix(),
            &nalgebra::Vector3::new(0.0, 0.0, 1200.0),
        );
        let estimator = HeadPoseEstimator::new(Arc::new(StaticLandmarker(vec![face])));

        let angles = estimator.estimate(&raster(1280, 720)).unwrap().unwrap();
        assert!((angles.yaw - 0.35f64.to_degrees()).abs() < 2.0, "yaw {}", angles.yaw);
        assert!(angles.pitch.abs() < 2.0);
        assert!(angles.roll.abs() < 2.0);
    }

    #[test]
    fn test_no_face_yields_none() {
        let estimator = HeadPoseEstimator::new(Arc::new(StaticLandmarker(vec![])));
        assert!(estimator.estimate(&raster(64, 64)).unwrap().is_none());
    }

    #[test]
    fn test_first_face_wins_when_landmarker_returns_extras() {
        let face = synthetic_face(
            640,
            480,
            &nalgebra::Matrix3::identity(),
            &nalgebra::Vector3::new(0.0, 0.0, 1000.0),
        );
        let bogus = FaceLandmarks::new(vec![
            NormalizedPoint::new(f64::NAN, f64::NAN);
            LANDMARK_VOCABULARY_SIZE
        ]);
        let estimator =
            HeadPoseEstimator::new(Arc::new(StaticLandmarker(vec![face, bogus])));

        assert!(estimator.estimate(&raster(640, 480)).unwrap().is_some());
    }

    #[test]
    fn test_truncated_landmark_set_yields_none() {
        let face = FaceLandmarks::new(vec![NormalizedPoint::new(0.5, 0.5); 10]);
        let estimator = HeadPoseEstimator::new(Arc::new(StaticLandmarker(vec![face])));
        assert!(estimator.estimate(&raster(64, 64)).unwrap().is_none());
    }

    #[test]
    fn test_unsolvable_geometry_yields_none() {
        let face = FaceLandmarks::new(vec![
            NormalizedPoint::new(f64::NAN, 0.5);
            LANDMARK_VOCABULARY_SIZE
        ]);
        let estimator = HeadPoseEstimator::new(Arc::new(StaticLandmarker(vec![face])));
        assert!(estimator.estimate(&raster(64, 64)).unwrap().is_none());
    }

    #[test]
    fn test_backend_failure_propagates() {
        struct FailingLandmarker;
        impl FaceLandmarker for FailingLandmarker {
            fn detect(&self, _raster: &RgbRaster) -> VisionResult<Vec<FaceLandmarks>> {
                Err(crate::error::VisionError::detection_failed("session lost"))
            }
            fn name(&self) -> &'static str {
                "failing"
            }
        }

        let estimator = HeadPoseEstimator::new(Arc::new(FailingLandmarker));
        assert!(estimator.estimate(&raster(64, 64)).is_err());
    }
}
