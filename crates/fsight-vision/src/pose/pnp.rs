//! Iterative Perspective-n-Point solver.
//!
//! Recovers the rotation and translation mapping the 3D head model
//! through the pinhole camera onto observed 2D landmarks. A DLT
//! estimate seeds a damped Gauss-Newton refinement of the reprojection
//! error, with the rotation parameterized as a scaled axis (Rodrigues)
//! vector. Every numerical failure mode folds into
//! [`PnpSolution::Unsolved`] so callers get a typed branch instead of a
//! caught exception.

use nalgebra::{DMatrix, DVector, Matrix3, Rotation3, UnitQuaternion, Vector2, Vector3};
use tracing::trace;

use super::camera::CameraIntrinsics;

/// Outcome of a PnP solve.
#[derive(Debug, Clone)]
pub enum PnpSolution {
    /// The solver converged; pose is camera-relative.
    Solved {
        rotation: Matrix3<f64>,
        translation: Vector3<f64>,
    },
    /// Degenerate geometry, singular matrices or non-finite input.
    Unsolved,
}

impl PnpSolution {
    /// Whether the solve succeeded.
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

const MIN_POINTS: usize = 6;
const MAX_ITERATIONS: usize = 20;
const DAMPING: f64 = 1e-8;
const STEP_TOLERANCE: f64 = 1e-10;
const MIN_DEPTH: f64 = 1e-9;

/// Solve the PnP problem for matched 3D/2D point lists.
pub fn solve_pnp(
    object_points: &[Vector3<f64>],
    image_points: &[Vector2<f64>],
    intrinsics: &CameraIntrinsics,
) -> PnpSolution {
    if object_points.len() != image_points.len() || object_points.len() < MIN_POINTS {
        return PnpSolution::Unsolved;
    }
    let finite = object_points.iter().all(|p| p.iter().all(|v| v.is_finite()))
        && image_points.iter().all(|p| p.iter().all(|v| v.is_finite()));
    if !finite {
        return PnpSolution::Unsolved;
    }

    let Some((rotation, translation)) = dlt_estimate(object_points, image_points, intrinsics)
    else {
        return PnpSolution::Unsolved;
    };

    match refine(rotation, translation, object_points, image_points, intrinsics) {
        Some((rotation, translation)) => PnpSolution::Solved {
            rotation,
            translation,
        },
        None => PnpSolution::Unsolved,
    }
}

/// Direct Linear Transform estimate of the full projection matrix,
/// decomposed into an orthonormal rotation and a translation.
///
/// Pixel and millimeter magnitudes keep the design matrix well within
/// f64 conditioning for six points, so no Hartley normalization here.
fn dlt_estimate(
    object_points: &[Vector3<f64>],
    image_points: &[Vector2<f64>],
    intrinsics: &CameraIntrinsics,
) -> Option<(Matrix3<f64>, Vector3<f64>)> {
    let n = object_points.len();
    let mut a = DMatrix::<f64>::zeros(2 * n, 12);

    for (i, (obj, img)) in object_points.iter().zip(image_points).enumerate() {
        let (x, y, z) = (obj.x, obj.y, obj.z);
        let (u, v) = (img.x, img.y);

        let r0 = 2 * i;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = z;
        a[(r0, 3)] = 1.0;
        a[(r0, 8)] = -u * x;
        a[(r0, 9)] = -u * y;
        a[(r0, 10)] = -u * z;
        a[(r0, 11)] = -u;

        let r1 = r0 + 1;
        a[(r1, 4)] = x;
        a[(r1, 5)] = y;
        a[(r1, 6)] = z;
        a[(r1, 7)] = 1.0;
        a[(r1, 8)] = -v * x;
        a[(r1, 9)] = -v * y;
        a[(r1, 10)] = -v * z;
        a[(r1, 11)] = -v;
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t?;

    // nalgebra does not guarantee singular value ordering.
    let mut min_idx = 0;
    for (i, sigma) in svd.singular_values.iter().enumerate() {
        if *sigma < svd.singular_values[min_idx] {
            min_idx = i;
        }
    }
    let p = v_t.row(min_idx);

    // P ~ K [R | t]; strip the intrinsics.
    let proj = Matrix3::new(p[0], p[1], p[2], p[4], p[5], p[6], p[8], p[9], p[10]);
    let offset = Vector3::new(p[3], p[7], p[11]);
    let k_inv = intrinsics.matrix().try_inverse()?;
    let m = k_inv * proj;
    let b = k_inv * offset;

    // Scale so the third row of the rotation part has unit norm.
    let scale = m.row(2).norm();
    if scale < 1e-12 || !scale.is_finite() {
        return None;
    }
    let mut m = m / scale;
    let mut b = b / scale;

    // Cheirality: the first model point must sit in front of the camera.
    let depth = m.row(2).transpose().dot(&object_points[0]) + b.z;
    if depth < 0.0 {
        m = -m;
        b = -b;
    }

    // Project onto the closest proper rotation.
    let svd = m.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let det = (u * v_t).determinant();
    let rotation = u * Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, det.signum())) * v_t;

    Some((rotation, b))
}

/// Damped Gauss-Newton refinement of the reprojection error over a
/// 6-vector of scaled-axis rotation and translation.
fn refine(
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
    object_points: &[Vector3<f64>],
    image_points: &[Vector2<f64>],
    intrinsics: &CameraIntrinsics,
) -> Option<(Matrix3<f64>, Vector3<f64>)> {
    // Via a quaternion: the direct matrix-to-axis-angle path takes
    // acos of (trace - 1) / 2, which rounding can push past 1 for
    // near-identity rotations, yielding a NaN seed.
    let rvec = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation))
        .scaled_axis();
    let mut params = DVector::from_vec(vec![
        rvec.x,
        rvec.y,
        rvec.z,
        translation.x,
        translation.y,
        translation.z,
    ]);

    let mut residual = residuals(&params, object_points, image_points, intrinsics)?;

    for iteration in 0..MAX_ITERATIONS {
        let jacobian = numeric_jacobian(&params, &residual, object_points, image_points, intrinsics)?;

        let jtj = jacobian.transpose() * &jacobian;
        let gradient = jacobian.transpose() * &residual;
        let damped = jtj + DMatrix::identity(6, 6) * DAMPING;
        let step = damped.lu().solve(&(-gradient))?;

        params += &step;
        residual = residuals(&params, object_points, image_points, intrinsics)?;

        trace!(
            iteration,
            cost = residual.norm_squared(),
            step = step.norm(),
            "PnP refinement"
        );

        if step.norm() < STEP_TOLERANCE {
            break;
        }
    }

    if !residual.iter().all(|v| v.is_finite()) {
        return None;
    }

    let rvec = Vector3::new(params[0], params[1], params[2]);
    let translation = Vector3::new(params[3], params[4], params[5]);
    Some((
        Rotation3::from_scaled_axis(rvec).into_inner(),
        translation,
    ))
}

/// Stacked reprojection residuals (2 per point). `None` when a model
/// point lands behind the camera or the math goes non-finite.
fn residuals(
    params: &DVector<f64>,
    object_points: &[Vector3<f64>],
    image_points: &[Vector2<f64>],
    intrinsics: &CameraIntrinsics,
) -> Option<DVector<f64>> {
    let rotation = Rotation3::from_scaled_axis(Vector3::new(params[0], params[1], params[2]));
    let translation = Vector3::new(params[3], params[4], params[5]);

    let mut out = DVector::zeros(2 * object_points.len());
    for (i, (obj, img)) in object_points.iter().zip(image_points).enumerate() {
        let cam = rotation * obj + translation;
        if cam.z <= MIN_DEPTH {
            return None;
        }
        let (u, v) = intrinsics.project(cam.x, cam.y, cam.z);
        out[2 * i] = u - img.x;
        out[2 * i + 1] = v - img.y;
    }

    if out.iter().all(|v| v.is_finite()) {
        Some(out)
    } else {
        None
    }
}

/// Central-difference Jacobian of the residual vector, falling back to
/// one-sided differences when a perturbation pushes a point behind the
/// camera.
fn numeric_jacobian(
    params: &DVector<f64>,
    base: &DVector<f64>,
    object_points: &[Vector3<f64>],
    image_points: &[Vector2<f64>],
    intrinsics: &CameraIntrinsics,
) -> Option<DMatrix<f64>> {
    let rows = base.len();
    let mut jacobian = DMatrix::zeros(rows, 6);

    for k in 0..6 {
        let h = 1e-6 * params[k].abs().max(1.0);

        let mut plus = params.clone();
        plus[k] += h;
        let mut minus = params.clone();
        minus[k] -= h;

        let fp = residuals(&plus, object_points, image_points, intrinsics);
        let fm = residuals(&minus, object_points, image_points, intrinsics);

        let column = match (fp, fm) {
            (Some(fp), Some(fm)) => (fp - fm) / (2.0 * h),
            (Some(fp), None) => (fp - base) / h,
            (None, Some(fm)) => (base - fm) / h,
            (None, None) => return None,
        };
        jacobian.set_column(k, &column);
    }

    Some(jacobian)
}
