//! Mathematical utilities (vectors, transforms, basis checks).

use nalgebra::{Matrix4, Vector3};

/// 3D vector / point in world or camera space.
pub type Vec3 = Vector3<f64>;

/// 4×4 row-major affine transform.
pub type Mat4 = Matrix4<f64>;

/// Tolerance used when validating camera bases.
pub const BASIS_EPSILON: f64 = 1e-6;

/// Convert degrees to radians.
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Normalize a vector, returning the zero vector for zero-length input.
///
/// `nalgebra`'s `normalize()` divides by the norm unconditionally, which
/// yields NaN for a zero vector.
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    let len = v.norm();
    if len == 0.0 || !len.is_finite() {
        return Vec3::zeros();
    }
    v / len
}

/// Transform a point by an affine matrix (w = 1).
///
/// p' = M[0..3, 0..3] * p + M[0..3, 3]
pub fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    Vec3::new(
        m[(0, 0)] * p.x + m[(0, 1)] * p.y + m[(0, 2)] * p.z + m[(0, 3)],
        m[(1, 0)] * p.x + m[(1, 1)] * p.y + m[(1, 2)] * p.z + m[(1, 3)],
        m[(2, 0)] * p.x + m[(2, 1)] * p.y + m[(2, 2)] * p.z + m[(2, 3)],
    )
}

/// Build a world-to-camera matrix whose rows are the given basis vectors.
///
/// | rx  ry  rz  -r·p |
/// | ux  uy  uz  -u·p |
/// | fx  fy  fz  -f·p |
/// | 0   0   0    1   |
pub fn basis_view_matrix(right: &Vec3, up: &Vec3, forward: &Vec3, position: &Vec3) -> Mat4 {
    Mat4::new(
        right.x,
        right.y,
        right.z,
        -right.dot(position),
        up.x,
        up.y,
        up.z,
        -up.dot(position),
        forward.x,
        forward.y,
        forward.z,
        -forward.dot(position),
        0.0,
        0.0,
        0.0,
        1.0,
    )
}

/// Check that three vectors are unit length and mutually orthogonal.
pub fn is_orthonormal_basis(a: &Vec3, b: &Vec3, c: &Vec3, eps: f64) -> bool {
    let unit = |v: &Vec3| (v.norm() - 1.0).abs() <= eps;
    unit(a)
        && unit(b)
        && unit(c)
        && a.dot(b).abs() <= eps
        && a.dot(c).abs() <= eps
        && b.dot(c).abs() <= eps
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_zero_vector() {
        let n = normalize_or_zero(&Vec3::zeros());
        assert_eq!(n, Vec3::zeros());
        assert!(n.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = normalize_or_zero(&Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.x, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_point_translation() {
        let mut m = Mat4::identity();
        m[(0, 3)] = 1.0;
        m[(1, 3)] = -2.0;
        m[(2, 3)] = 3.0;
        let p = transform_point(&m, &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Vec3::new(2.0, -1.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_basis_view_matrix_maps_position_to_origin() {
        let right = Vec3::new(0.0, 1.0, 0.0);
        let up = Vec3::new(0.0, 0.0, 1.0);
        let forward = Vec3::new(1.0, 0.0, 0.0);
        let position = Vec3::new(-5.0, 0.0, 0.0);
        let m = basis_view_matrix(&right, &up, &forward, &position);

        let cam = transform_point(&m, &position);
        assert_relative_eq!(cam, Vec3::zeros(), epsilon = 1e-12);

        // World origin sits 5 units in front of the camera
        let origin = transform_point(&m, &Vec3::zeros());
        assert_relative_eq!(origin.z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orthonormal_basis_check() {
        let x = Vec3::x();
        let y = Vec3::y();
        let z = Vec3::z();
        assert!(is_orthonormal_basis(&x, &y, &z, BASIS_EPSILON));
        assert!(!is_orthonormal_basis(&x, &x, &z, BASIS_EPSILON));
        assert!(!is_orthonormal_basis(&(x * 2.0), &y, &z, BASIS_EPSILON));
    }

    #[test]
    fn test_deg_to_rad() {
        assert_relative_eq!(deg_to_rad(180.0), std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(deg_to_rad(90.0), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }
}
