//! Sprite image loading.
//!
//! Any format the `image` crate decodes is accepted; pixels are always
//! converted to RGBA8 so transparency drives the silhouette.

use crate::core::{Sprite, SpriteImage};
use crate::io::LoadError;
use image::RgbaImage;
use log::{debug, info};
use std::path::Path;

/// Decode an image file to RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, LoadError> {
    let img = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => LoadError::Image {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(img.to_rgba8())
}

/// Load a single sprite image with the given alpha threshold.
pub fn load_sprite_image(path: &Path, alpha_threshold: f64) -> Result<SpriteImage, LoadError> {
    let rgba = load_rgba(path)?;
    debug!(
        "  Loaded {} ({}x{})",
        path.display(),
        rgba.width(),
        rgba.height()
    );
    Ok(SpriteImage::new(rgba, alpha_threshold))
}

/// Load the image of every sprite from `images_dir`, in sprite order.
pub fn load_sprite_images(
    sprites: &[Sprite],
    images_dir: &Path,
    alpha_threshold: f64,
) -> Result<Vec<SpriteImage>, LoadError> {
    let images = sprites
        .iter()
        .map(|sprite| load_sprite_image(&images_dir.join(&sprite.filename), alpha_threshold))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Loaded {} images from {}", images.len(), images_dir.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_load_png_as_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprite.png");

        // Save as RGB to check the RGBA conversion adds opaque alpha
        let rgb = image::RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        rgb.save(&path).unwrap();

        let img = load_sprite_image(&path, 0.5).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
        assert_eq!(*img.as_rgba().get_pixel(1, 1), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_missing_image_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rgba(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_corrupt_image_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really a png").unwrap();
        assert!(matches!(load_rgba(&path), Err(LoadError::Image { .. })));
    }
}
