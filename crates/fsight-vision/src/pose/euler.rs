//! Euler angle extraction from a rotation matrix.
//!
//! RQ-decomposes the rotation into Givens rotations about the camera
//! axes and reads the three angles off the eliminated terms. Angle
//! conventions follow the decomposition order x, then y, then z, which
//! is what downstream consumers of yaw/pitch/roll expect.

use nalgebra::Matrix3;

/// Head orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Decompose a rotation matrix into yaw/pitch/roll degrees.
///
/// Returns `None` for non-finite input. An identity rotation maps to
/// all-zero angles.
pub fn rotation_to_euler(rotation: &Matrix3<f64>) -> Option<EulerAngles> {
    if !rotation.iter().all(|v| v.is_finite()) {
        return None;
    }

    // Givens rotation about x eliminating m[2][1].
    let pitch_rad = rotation[(2, 1)].atan2(rotation[(2, 2)]);
    let (sx, cx) = pitch_rad.sin_cos();
    let qx = Matrix3::new(1.0, 0.0, 0.0, 0.0, cx, sx, 0.0, -sx, cx);
    let r1 = rotation * qx;

    // Givens rotation about y eliminating r1[2][0].
    let yaw_rad = (-r1[(2, 0)]).atan2(r1[(2, 2)]);
    let (sy, cy) = yaw_rad.sin_cos();
    let qy = Matrix3::new(cy, 0.0, -sy, 0.0, 1.0, 0.0, sy, 0.0, cy);
    let r2 = r1 * qy;

    // Remaining in-plane rotation about z.
    let roll_rad = r2[(1, 0)].atan2(r2[(1, 1)]);

    Some(EulerAngles {
        yaw: yaw_rad.to_degrees(),
        pitch: pitch_rad.to_degrees(),
        roll: roll_rad.to_degrees(),
    })
}
