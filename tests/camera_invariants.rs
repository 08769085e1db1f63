//! Camera and grid invariants with numbers that can be checked by hand.

use approx::assert_relative_eq;
use carve_rs::core::{Camera, Projection, Vec3, VoxelGrid};

fn rear_camera(projection: Projection) -> Camera {
    Camera::new(
        0.0,
        0.0,
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, -1.0, 0.0),
        120,
        90,
        5.0,
        projection,
    )
    .unwrap()
}

#[test]
fn test_origin_projects_to_principal_point() {
    for projection in [
        Projection::Orthographic { scale: 2.0 },
        Projection::Perspective { fov_y_deg: 60.0 },
    ] {
        let cam = rear_camera(projection);
        let pixel = cam.project(&Vec3::zeros()).unwrap();
        assert_relative_eq!(pixel.x, 60.0, epsilon = 1e-9);
        assert_relative_eq!(pixel.y, 45.0, epsilon = 1e-9);
    }
}

#[test]
fn test_view_matrix_rows_are_camera_basis() {
    let cam = rear_camera(Projection::Orthographic { scale: 2.0 });
    let view = cam.base().view;

    // Rows: right, up, forward; last row (0, 0, 0, 1)
    assert_relative_eq!(view[(0, 1)], -1.0, epsilon = 1e-12);
    assert_relative_eq!(view[(1, 2)], 1.0, epsilon = 1e-12);
    assert_relative_eq!(view[(2, 0)], 1.0, epsilon = 1e-12);
    assert_relative_eq!(view[(3, 3)], 1.0);

    // Camera sits at depth 0, the origin at depth = distance
    assert_relative_eq!(cam.world_to_camera(&cam.position()).norm(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(cam.world_to_camera(&Vec3::zeros()).z, 5.0, epsilon = 1e-12);
}

#[test]
fn test_mirrored_camera_basis_stays_orthonormal() {
    let up = Vec3::new(0.0, 0.0, 1.0);
    for yaw in [0.0, 30.0, 90.0, 135.0, 270.0] {
        let position = carve_rs::core::camera::compute_position(yaw, 0.0, 5.0);
        let right = (-position).normalize().cross(&up);
        let cam = Camera::orthographic(yaw, 0.0, up, right, 32, 32, 2.0, 5.0).unwrap();

        let mirrored = cam.mirror();
        let base = mirrored.base();
        let forward = base.forward();
        assert_relative_eq!(base.right.dot(&base.up), 0.0, epsilon = 1e-9);
        assert_relative_eq!(base.right.dot(&forward), 0.0, epsilon = 1e-9);
        assert_relative_eq!(base.up.dot(&forward), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_grid_index_position_roundtrip() {
    let grid = VoxelGrid::new(5, 1.25).unwrap();
    let geometry = grid.geometry();
    let mut previous_x = f64::NEG_INFINITY;

    for ix in 0..5 {
        let x = grid.position(ix, 0, 0).x;
        assert!(x > previous_x, "positions must increase along x");
        previous_x = x;

        for iy in 0..5 {
            for iz in 0..5 {
                let index = grid.index(ix, iy, iz);
                assert_eq!(geometry.coords(index), [ix, iy, iz]);
                let center = grid.position(ix, iy, iz);
                assert_eq!(geometry.cell_of(&center), Some([ix, iy, iz]));
            }
        }
    }
}

#[test]
fn test_visibility_through_carved_tunnel() {
    // Solid grid with a tunnel carved along the X axis at (iy, iz) = (2, 2).
    let mut grid = VoxelGrid::new(5, 1.0).unwrap();
    for ix in 0..4 {
        grid.carve(ix, 2, 2);
    }
    let camera = Vec3::new(-5.0, 0.0, 0.0);

    // The end of the tunnel is visible, its neighbours are not
    assert!(grid.is_visible_from(4, 2, 2, &camera));
    assert!(!grid.is_visible_from(4, 1, 2, &camera));

    // Blocking the tunnel hides the far end
    grid.set_opacity(1, 2, 2, 1.0);
    assert!(!grid.is_visible_from(4, 2, 2, &camera));
    assert!(grid.is_visible_from(1, 2, 2, &camera));
}
