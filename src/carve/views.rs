//! Effective view list for carving and painting.

use crate::carve::CarveError;
use crate::core::{Camera, SpriteImage, Vec3};
use nalgebra::Vector2;

/// A camera paired with the sprite it observes.
///
/// Mirrored views reuse the original sprite; their projected X coordinate is
/// flipped so the reflected camera reads the image as if it were mirrored.
#[derive(Clone, Debug)]
pub struct View<'a> {
    pub camera: Camera,
    pub image: &'a SpriteImage,
    pub mirrored: bool,
}

impl<'a> View<'a> {
    pub fn new(camera: Camera, image: &'a SpriteImage, mirrored: bool) -> Self {
        Self {
            camera,
            image,
            mirrored,
        }
    }

    /// Pixel coordinates to sample in this view's image for a world point.
    ///
    /// Returns None if the point is behind a perspective camera.
    pub fn sample_point(&self, point: &Vec3) -> Option<Vector2<f64>> {
        let mut pixel = self.camera.project(point)?;
        if self.mirrored {
            pixel.x = self.image.width() as f64 - pixel.x;
        }
        Some(pixel)
    }
}

/// Build the effective view list: originals, then (with `symmetry`) each
/// camera mirrored across Y=0, paired with the same image.
pub fn build_views<'a>(
    cameras: &[Camera],
    images: &'a [SpriteImage],
    symmetry: bool,
) -> Result<Vec<View<'a>>, CarveError> {
    if cameras.len() != images.len() {
        return Err(CarveError::ViewCountMismatch {
            cameras: cameras.len(),
            images: images.len(),
        });
    }

    let mut views: Vec<View<'a>> = cameras
        .iter()
        .zip(images)
        .map(|(cam, img)| View::new(cam.clone(), img, false))
        .collect();

    if symmetry {
        views.extend(
            cameras
                .iter()
                .zip(images)
                .map(|(cam, img)| View::new(cam.mirror(), img, true)),
        );
    }

    Ok(views)
}
