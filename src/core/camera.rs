//! Camera model for sprite views (orthographic and perspective).
//!
//! Every sprite camera sits on a sphere around the world origin and looks at
//! it. Cameras are used to:
//! - Project voxel centers to sprite pixel coordinates (carving, coloring)
//! - Project voxels with depth for z-buffered comparison renders
//! - Produce mirrored views across the Y=0 plane (symmetry)

use crate::core::math::{
    basis_view_matrix, deg_to_rad, is_orthonormal_basis, normalize_or_zero, transform_point,
    Mat4, Vec3, BASIS_EPSILON,
};
use crate::core::sprite::Sprite;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing a camera.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error(
        "camera basis is not orthonormal (right={right:?}, up={up:?}, forward={forward:?})"
    )]
    NonOrthonormalBasis {
        right: [f64; 3],
        up: [f64; 3],
        forward: [f64; 3],
    },

    #[error("invalid camera parameter: {0}")]
    InvalidParameter(String),
}

/// Projection model and its scale parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Parallel projection; `scale` is the world half-height covered by the image.
    Orthographic { scale: f64 },

    /// Pinhole projection with vertical field of view in degrees.
    Perspective { fov_y_deg: f64 },
}

/// Data shared by both camera kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraBase {
    /// World-to-camera transform
    pub view: Mat4,

    /// Image width (pixels)
    pub width: u32,

    /// Image height (pixels)
    pub height: u32,

    /// Focal lengths (pixels per camera-space unit, or per unit at depth 1)
    pub fx: f64,
    pub fy: f64,

    /// Principal point (pixels)
    pub cx: f64,
    pub cy: f64,

    /// Camera pose, kept so the basis can be mirrored and the view rebuilt
    pub position: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl CameraBase {
    /// Transform a point from world coordinates to camera coordinates.
    pub fn world_to_camera(&self, point_world: &Vec3) -> Vec3 {
        transform_point(&self.view, point_world)
    }

    /// Unit vector from the camera toward the world origin.
    pub fn forward(&self) -> Vec3 {
        normalize_or_zero(&(-self.position))
    }

    fn mirrored(&self) -> CameraBase {
        let position = Vec3::new(self.position.x, -self.position.y, self.position.z);
        let up = Vec3::new(self.up.x, -self.up.y, self.up.z);
        let right = Vec3::new(-self.right.x, self.right.y, -self.right.z);

        CameraBase {
            view: view_matrix(&position, &up, &right),
            position,
            up,
            right,
            ..self.clone()
        }
    }
}

/// A sprite camera.
///
/// The two kinds share [`CameraBase`] and differ only in the pixel projection
/// and in whether points behind the camera are rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum Camera {
    Orthographic(CameraBase),
    Perspective(CameraBase),
}

impl Camera {
    /// Create a camera from spherical pose parameters.
    ///
    /// `up` and `right` come from external metadata; together with the derived
    /// forward vector they must form an orthonormal basis.
    pub fn new(
        yaw_deg: f64,
        pitch_deg: f64,
        up: Vec3,
        right: Vec3,
        width: u32,
        height: u32,
        distance: f64,
        projection: Projection,
    ) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidParameter(format!(
                "image size must be non-zero (got {}×{})",
                width, height
            )));
        }
        if !(distance.is_finite() && distance > 0.0) {
            return Err(CameraError::InvalidParameter(format!(
                "distance must be positive (got {})",
                distance
            )));
        }

        let position = compute_position(yaw_deg, pitch_deg, distance);
        let forward = normalize_or_zero(&(-position));

        if !is_orthonormal_basis(&right, &up, &forward, BASIS_EPSILON) {
            return Err(CameraError::NonOrthonormalBasis {
                right: right.into(),
                up: up.into(),
                forward: forward.into(),
            });
        }

        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;

        let (fx, fy) = match projection {
            Projection::Orthographic { scale } => {
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(CameraError::InvalidParameter(format!(
                        "orthographic scale must be positive (got {})",
                        scale
                    )));
                }
                (width as f64 / (2.0 * scale), height as f64 / (2.0 * scale))
            }
            Projection::Perspective { fov_y_deg } => {
                if !(fov_y_deg > 0.0 && fov_y_deg < 180.0) {
                    return Err(CameraError::InvalidParameter(format!(
                        "field of view must be in (0, 180) degrees (got {})",
                        fov_y_deg
                    )));
                }
                // fy = (height / 2) / tan(fovY / 2), square pixels
                let fy = height as f64 / (2.0 * (deg_to_rad(fov_y_deg) / 2.0).tan());
                (fy, fy)
            }
        };

        let base = CameraBase {
            view: basis_view_matrix(&right, &up, &forward, &position),
            width,
            height,
            fx,
            fy,
            cx,
            cy,
            position,
            up,
            right,
        };

        Ok(match projection {
            Projection::Orthographic { .. } => Camera::Orthographic(base),
            Projection::Perspective { .. } => Camera::Perspective(base),
        })
    }

    /// Orthographic camera from sprite pose parameters.
    pub fn orthographic(
        yaw_deg: f64,
        pitch_deg: f64,
        up: Vec3,
        right: Vec3,
        width: u32,
        height: u32,
        ortho_scale: f64,
        distance: f64,
    ) -> Result<Self, CameraError> {
        Self::new(
            yaw_deg,
            pitch_deg,
            up,
            right,
            width,
            height,
            distance,
            Projection::Orthographic { scale: ortho_scale },
        )
    }

    /// Perspective camera from sprite pose parameters.
    pub fn perspective(
        yaw_deg: f64,
        pitch_deg: f64,
        up: Vec3,
        right: Vec3,
        width: u32,
        height: u32,
        fov_y_deg: f64,
        distance: f64,
    ) -> Result<Self, CameraError> {
        Self::new(
            yaw_deg,
            pitch_deg,
            up,
            right,
            width,
            height,
            distance,
            Projection::Perspective { fov_y_deg },
        )
    }

    /// Camera for a sprite view.
    pub fn from_sprite(
        sprite: &Sprite,
        projection: Projection,
        distance: f64,
    ) -> Result<Self, CameraError> {
        Self::new(
            sprite.yaw,
            sprite.pitch,
            sprite.camera_up_vec(),
            sprite.camera_right_vec(),
            sprite.width,
            sprite.height,
            distance,
            projection,
        )
    }

    pub fn base(&self) -> &CameraBase {
        match self {
            Camera::Orthographic(base) | Camera::Perspective(base) => base,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, Camera::Perspective(_))
    }

    pub fn position(&self) -> Vec3 {
        self.base().position
    }

    pub fn width(&self) -> u32 {
        self.base().width
    }

    pub fn height(&self) -> u32 {
        self.base().height
    }

    /// Transform a point from world coordinates to camera coordinates.
    pub fn world_to_camera(&self, point_world: &Vec3) -> Vec3 {
        self.base().world_to_camera(point_world)
    }

    /// Project a world point to pixel coordinates and camera-space depth.
    ///
    /// Returns None if the point is behind a perspective camera (z <= 0).
    /// Orthographic depth is only meaningful for z-buffering.
    pub fn project_with_depth(&self, point_world: &Vec3) -> Option<(Vector2<f64>, f64)> {
        match self {
            Camera::Orthographic(base) => {
                let cam = base.world_to_camera(point_world);
                let u = base.fx * cam.x + base.cx;
                let v = base.fy * cam.y + base.cy;
                Some((Vector2::new(u, v), cam.z))
            }
            Camera::Perspective(base) => {
                let cam = base.world_to_camera(point_world);
                if cam.z <= 0.0 {
                    return None;
                }
                let u = base.fx * (cam.x / cam.z) + base.cx;
                let v = base.fy * (cam.y / cam.z) + base.cy;
                Some((Vector2::new(u, v), cam.z))
            }
        }
    }

    /// Project a world point to pixel coordinates.
    pub fn project(&self, point_world: &Vec3) -> Option<Vector2<f64>> {
        self.project_with_depth(point_world).map(|(pixel, _)| pixel)
    }

    /// Camera reflected across the Y=0 world plane.
    ///
    /// Position and up have their Y negated, right has X and Z negated so the
    /// basis keeps its handedness. Intrinsics are unchanged.
    pub fn mirror(&self) -> Camera {
        match self {
            Camera::Orthographic(base) => Camera::Orthographic(base.mirrored()),
            Camera::Perspective(base) => Camera::Perspective(base.mirrored()),
        }
    }
}

/// Camera position for sprite angles.
///
/// - YAW 0 = rear (camera at -X), 180 = front (camera at +X)
/// - PITCH 90 = camera at +Z, -90 = camera at -Z
pub fn compute_position(yaw_deg: f64, pitch_deg: f64, distance: f64) -> Vec3 {
    let yaw = deg_to_rad(yaw_deg);
    let pitch = deg_to_rad(pitch_deg);

    Vec3::new(
        -distance * yaw.cos() * pitch.cos(),
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
    )
}

/// World-to-camera matrix for a camera at `position` looking at the origin.
pub fn view_matrix(position: &Vec3, up: &Vec3, right: &Vec3) -> Mat4 {
    let forward = normalize_or_zero(&(-position));
    basis_view_matrix(right, up, &forward, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rear_camera(projection: Projection) -> Camera {
        // yaw 0: camera at -X looking toward +X
        Camera::new(
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
            100,
            80,
            5.0,
            projection,
        )
        .expect("valid basis")
    }

    #[test]
    fn test_position_convention() {
        let rear = compute_position(0.0, 0.0, 5.0);
        assert_relative_eq!(rear, Vec3::new(-5.0, 0.0, 0.0), epsilon = 1e-12);

        let front = compute_position(180.0, 0.0, 5.0);
        assert_relative_eq!(front, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-12);

        let below = compute_position(0.0, 90.0, 5.0);
        assert_relative_eq!(below, Vec3::new(0.0, 0.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_origin_projects_to_principal_point() {
        for projection in [
            Projection::Orthographic { scale: 2.0 },
            Projection::Perspective { fov_y_deg: 60.0 },
        ] {
            let cam = rear_camera(projection);
            let (pixel, depth) = cam.project_with_depth(&Vec3::zeros()).unwrap();
            assert_eq!(pixel.x, cam.base().cx);
            assert_eq!(pixel.y, cam.base().cy);
            assert_relative_eq!(depth, 5.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_orthographic_intrinsics() {
        let cam = rear_camera(Projection::Orthographic { scale: 2.0 });
        let base = cam.base();
        assert_relative_eq!(base.fx, 25.0);
        assert_relative_eq!(base.fy, 20.0);
        assert_relative_eq!(base.cx, 50.0);
        assert_relative_eq!(base.cy, 40.0);

        // Right is +Y, so a point at y=1 moves fx pixels right
        let pixel = cam.project(&Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(pixel.x, 75.0, epsilon = 1e-9);
        assert_relative_eq!(pixel.y, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_perspective_intrinsics() {
        let cam = rear_camera(Projection::Perspective { fov_y_deg: 90.0 });
        let base = cam.base();
        // tan(45°) = 1 => fy = height / 2
        assert_relative_eq!(base.fy, 40.0, epsilon = 1e-9);
        assert_relative_eq!(base.fx, base.fy);

        // Point at depth 5 (world origin plane), y=1 => u = 40 * 1/5 + 50
        let pixel = cam.project(&Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(pixel.x, 58.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_behind_perspective_camera() {
        let cam = rear_camera(Projection::Perspective { fov_y_deg: 60.0 });
        assert!(cam.project(&Vec3::new(-6.0, 0.0, 0.0)).is_none());
        assert!(cam.project(&Vec3::new(-5.0, 0.0, 0.0)).is_none());

        // Orthographic cameras never reject points
        let ortho = rear_camera(Projection::Orthographic { scale: 2.0 });
        assert!(ortho.project(&Vec3::new(-6.0, 0.0, 0.0)).is_some());
    }

    #[test]
    fn test_rejects_non_orthonormal_basis() {
        let err = Camera::orthographic(
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0), // parallel to forward
            10,
            10,
            2.0,
            5.0,
        )
        .unwrap_err();
        assert!(matches!(err, CameraError::NonOrthonormalBasis { .. }));

        let err = Camera::orthographic(
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, 2.0), // not unit length
            Vec3::new(0.0, 1.0, 0.0),
            10,
            10,
            2.0,
            5.0,
        )
        .unwrap_err();
        assert!(matches!(err, CameraError::NonOrthonormalBasis { .. }));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let up = Vec3::new(0.0, 0.0, 1.0);
        let right = Vec3::new(0.0, 1.0, 0.0);
        assert!(Camera::orthographic(0.0, 0.0, up, right, 10, 10, 0.0, 5.0).is_err());
        assert!(Camera::orthographic(0.0, 0.0, up, right, 10, 10, 2.0, 0.0).is_err());
        assert!(Camera::orthographic(0.0, 0.0, up, right, 0, 10, 2.0, 5.0).is_err());
        assert!(Camera::perspective(0.0, 0.0, up, right, 10, 10, 180.0, 5.0).is_err());
    }

    #[test]
    fn test_mirror_reflects_pose() {
        let cam = Camera::orthographic(
            90.0,
            0.0,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0),
            64,
            64,
            2.0,
            5.0,
        )
        .unwrap();
        let mirrored = cam.mirror();

        assert!(!mirrored.is_perspective());
        assert_relative_eq!(mirrored.position().y, -cam.position().y, epsilon = 1e-12);
        assert_relative_eq!(mirrored.base().right.x, -cam.base().right.x, epsilon = 1e-12);
        assert_eq!(mirrored.base().fx, cam.base().fx);

        // Mirroring twice is the identity
        let twice = mirrored.mirror();
        assert_relative_eq!(twice.base().view, cam.base().view, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_flips_horizontal_pixel() {
        // A point and its Y-reflection land at mirrored pixel columns.
        let cam = rear_camera(Projection::Orthographic { scale: 2.0 });
        let mirrored = cam.mirror();
        let p = Vec3::new(0.3, 0.4, -0.2);
        let p_reflected = Vec3::new(p.x, -p.y, p.z);

        let a = cam.project(&p).unwrap();
        let b = mirrored.project(&p_reflected).unwrap();
        assert_relative_eq!(b.x, cam.width() as f64 - a.x, epsilon = 1e-9);
        assert_relative_eq!(b.y, a.y, epsilon = 1e-9);
    }
}
