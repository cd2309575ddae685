//! Fixed 3D head model for pose estimation.

use nalgebra::Vector3;

/// Canonical anatomical landmarks of a generic head, in millimeters,
/// head-centered frame with the nose tip at the origin. Order matches
/// [`crate::landmark::REFERENCE_LANDMARKS`]: nose tip, chin, left eye
/// outer corner, right eye outer corner, left mouth corner, right
/// mouth corner. Static and never recomputed.
pub const HEAD_MODEL_POINTS: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [0.0, -330.0, -65.0],
    [-225.0, 170.0, -135.0],
    [225.0, 170.0, -135.0],
    [-150.0, -150.0, -125.0],
    [150.0, -150.0, -125.0],
];

/// Head model as nalgebra vectors.
pub fn head_model_points() -> [Vector3<f64>; 6] {
    HEAD_MODEL_POINTS.map(Vector3::from)
}
