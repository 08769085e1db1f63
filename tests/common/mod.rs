//! Shared fixtures: axis-aligned cube silhouettes seen from cardinal views.

#![allow(dead_code)]

use carve_rs::core::camera::compute_position;
use carve_rs::core::{Camera, Projection, Sprite, SpriteImage, Vec3};
use image::{Rgba, RgbaImage};

pub const IMAGE_SIZE: u32 = 64;

/// `(yaw, pitch, up)` for the rear, side, front and top views.
pub const CUBE_VIEWS: [(f64, f64, [f64; 3]); 4] = [
    (0.0, 0.0, [0.0, 0.0, 1.0]),
    (90.0, 0.0, [0.0, 0.0, 1.0]),
    (180.0, 0.0, [0.0, 0.0, 1.0]),
    (0.0, 90.0, [1.0, 0.0, 0.0]),
];

/// Right vector completing a basis with the camera's forward direction.
pub fn right_for(yaw: f64, pitch: f64, up: &Vec3) -> Vec3 {
    let forward = -compute_position(yaw, pitch, 1.0);
    forward.normalize().cross(up)
}

/// Image whose pixels in `[lo, hi)` on both axes have color `inside`.
pub fn square_image(lo: u32, hi: u32, inside: [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(IMAGE_SIZE, IMAGE_SIZE, |x, y| {
        if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
            Rgba(inside)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Sprite record for a view, with a valid basis.
pub fn sprite(yaw: f64, pitch: f64, up: [f64; 3], filename: &str) -> Sprite {
    let up_vec = Vec3::new(up[0], up[1], up[2]);
    let right = right_for(yaw, pitch, &up_vec);
    Sprite {
        block: 0,
        row: Some(0),
        yaw,
        pitch,
        width: IMAGE_SIZE,
        height: IMAGE_SIZE,
        x: 0,
        y: 0,
        filename: filename.to_string(),
        kind: None,
        camera_up: up,
        camera_right: [right.x, right.y, right.z],
    }
}

/// Orthographic cameras (scale 1) for [`CUBE_VIEWS`].
pub fn cube_cameras() -> Vec<Camera> {
    CUBE_VIEWS
        .iter()
        .map(|&(yaw, pitch, up)| {
            Camera::from_sprite(&sprite(yaw, pitch, up, ""), Projection::Orthographic { scale: 1.0 }, 5.0)
                .unwrap()
        })
        .collect()
}

/// Silhouettes of the cube `[-0.5, 0.5]^3` for [`cube_cameras`].
pub fn cube_images() -> Vec<SpriteImage> {
    (0..CUBE_VIEWS.len())
        .map(|_| SpriteImage::new(square_image(16, 48, [255, 0, 0, 255]), 0.5))
        .collect()
}
