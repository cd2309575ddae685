//! Facial landmark vocabulary and per-face landmark sets.
//!
//! The landmark provider reports a fixed-size ordered list of
//! normalized 2D points per face (MediaPipe Face Mesh vocabulary,
//! 468 points). Pose estimation consumes exactly six of them, matched
//! one-to-one with the 3D head model.

use fsight_models::NormalizedPoint;

/// Number of points in the landmark provider's vocabulary.
pub const LANDMARK_VOCABULARY_SIZE: usize = 468;

/// The six canonical landmarks used for pose estimation, named to
/// document the contract with the provider's point vocabulary instead
/// of scattering magic indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkId {
    NoseTip,
    Chin,
    LeftEyeOuter,
    RightEyeOuter,
    LeftMouthCorner,
    RightMouthCorner,
}

impl LandmarkId {
    /// Index into the Face Mesh point list.
    pub const fn index(self) -> usize {
        match self {
            Self::NoseTip => 1,
            Self::Chin => 152,
            Self::LeftEyeOuter => 33,
            Self::RightEyeOuter => 263,
            Self::LeftMouthCorner => 61,
            Self::RightMouthCorner => 291,
        }
    }
}

/// Pose landmarks in the order matching [`crate::pose::HEAD_MODEL_POINTS`].
pub const REFERENCE_LANDMARKS: [LandmarkId; 6] = [
    LandmarkId::NoseTip,
    LandmarkId::Chin,
    LandmarkId::LeftEyeOuter,
    LandmarkId::RightEyeOuter,
    LandmarkId::LeftMouthCorner,
    LandmarkId::RightMouthCorner,
];

/// Ordered landmark set for a single detected face, in normalized
/// image coordinates.
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    points: Vec<NormalizedPoint>,
}

impl FaceLandmarks {
    /// Wrap an ordered point list as reported by the provider.
    pub fn new(points: Vec<NormalizedPoint>) -> Self {
        Self { points }
    }

    /// Number of points reported.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the provider reported no points at all.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a named landmark. `None` means the provider's vocabulary
    /// drifted from the contract (too few points).
    pub fn point(&self, id: LandmarkId) -> Option<NormalizedPoint> {
        self.points.get(id.index()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_within_vocabulary() {
        for id in REFERENCE_LANDMARKS {
            assert!(id.index() < LANDMARK_VOCABULARY_SIZE);
        }
    }

    #[test]
    fn test_point_lookup() {
        let mut points = vec![NormalizedPoint::new(0.0, 0.0); LANDMARK_VOCABULARY_SIZE];
        points[LandmarkId::Chin.index()] = NormalizedPoint::new(0.5, 0.9);
        let landmarks = FaceLandmarks::new(points);

        let chin = landmarks.point(LandmarkId::Chin).unwrap();
        assert_eq!(chin.y, 0.9);
    }

    #[test]
    fn test_short_list_yields_none() {
        let landmarks = FaceLandmarks::new(vec![NormalizedPoint::new(0.0, 0.0); 10]);
        assert!(landmarks.point(LandmarkId::Chin).is_none());
        assert!(landmarks.point(LandmarkId::NoseTip).is_some());
    }
}
