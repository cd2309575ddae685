//! Synthetic pinhole camera model.

use nalgebra::Matrix3;

/// Pinhole intrinsics approximated per-request from frame dimensions:
/// focal length equal to the image width, principal point at the image
/// center, zero skew and zero lens distortion. Cheap to recompute, so
/// never cached across calls.
#[derive(Debug, Clone, Copy)]
pub struct CameraIntrinsics {
    focal_length: f64,
    center: (f64, f64),
}

impl CameraIntrinsics {
    /// Build intrinsics for a frame of the given pixel size.
    pub fn for_frame(width: u32, height: u32) -> Self {
        Self {
            focal_length: f64::from(width),
            center: (f64::from(width) / 2.0, f64::from(height) / 2.0),
        }
    }

    /// The 3x3 intrinsic matrix K.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.focal_length,
            0.0,
            self.center.0,
            0.0,
            self.focal_length,
            self.center.1,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Project a camera-frame point `(x, y, z)` to pixel coordinates.
    /// Caller guarantees `z > 0`.
    pub fn project(&self, x: f64, y: f64, z: f64) -> (f64, f64) {
        (
            self.focal_length * x / z + self.center.0,
            self.focal_length * y / z + self.center.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_layout() {
        let k = CameraIntrinsics::for_frame(640, 480).matrix();
        assert_eq!(k[(0, 0)], 640.0);
        assert_eq!(k[(1, 1)], 640.0);
        assert_eq!(k[(0, 2)], 320.0);
        assert_eq!(k[(1, 2)], 240.0);
        assert_eq!(k[(0, 1)], 0.0); // zero skew
        assert_eq!(k[(2, 2)], 1.0);
    }

    #[test]
    fn test_projection_of_optical_axis_hits_center() {
        let k = CameraIntrinsics::for_frame(640, 480);
        assert_eq!(k.project(0.0, 0.0, 1000.0), (320.0, 240.0));
    }
}
