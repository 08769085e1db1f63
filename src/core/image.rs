//! Sprite image wrapper with bilinear sampling.

use crate::core::color::Color;
use image::RgbaImage;

/// Decoded sprite with the alpha threshold used for silhouette tests.
#[derive(Clone, Debug)]
pub struct SpriteImage {
    img: RgbaImage,
    alpha_threshold: f64,
}

impl SpriteImage {
    /// Wrap a decoded image. The threshold is clamped to `[0, 1]`.
    pub fn new(img: RgbaImage, alpha_threshold: f64) -> Self {
        Self {
            img,
            alpha_threshold: alpha_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn alpha_threshold(&self) -> f64 {
        self.alpha_threshold
    }

    /// Underlying pixel buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.img
    }

    /// Check whether `(x, y)` lies in `[0, width) × [0, height)`.
    pub fn in_bounds(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < self.width() as f64 && y >= 0.0 && y < self.height() as f64
    }

    /// Pixel at integer coordinates; transparent black outside the image.
    fn pixel(&self, x: i64, y: i64) -> Color {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return Color::TRANSPARENT;
        }
        Color::from_rgba8(self.img.get_pixel(x as u32, y as u32).0)
    }

    /// Bilinearly interpolated RGBA at float coordinates.
    ///
    /// Pixel centers are at half-integer coordinates, so `(0.5, 0.5)` reads
    /// pixel `(0, 0)` exactly. Coordinates outside the image (or NaN) return
    /// transparent black.
    pub fn sample(&self, x: f64, y: f64) -> Color {
        if !self.in_bounds(x, y) {
            return Color::TRANSPARENT;
        }

        let sx = x - 0.5;
        let sy = y - 0.5;
        let x0 = sx.floor();
        let y0 = sy.floor();
        let fx = sx - x0;
        let fy = sy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let c00 = self.pixel(x0, y0);
        let c10 = self.pixel(x0 + 1, y0);
        let c01 = self.pixel(x0, y0 + 1);
        let c11 = self.pixel(x0 + 1, y0 + 1);

        let w00 = (1.0 - fx) * (1.0 - fy);
        let w10 = fx * (1.0 - fy);
        let w01 = (1.0 - fx) * fy;
        let w11 = fx * fy;

        Color {
            r: w00 * c00.r + w10 * c10.r + w01 * c01.r + w11 * c11.r,
            g: w00 * c00.g + w10 * c10.g + w01 * c01.g + w11 * c11.g,
            b: w00 * c00.b + w10 * c10.b + w01 * c01.b + w11 * c11.b,
            a: w00 * c00.a + w10 * c10.a + w01 * c01.a + w11 * c11.a,
        }
    }

    /// Bilinearly interpolated alpha at float coordinates.
    pub fn sample_alpha(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y).a
    }

    /// True if the sampled alpha falls below the threshold (outside the silhouette).
    pub fn is_background(&self, x: f64, y: f64) -> bool {
        self.sample_alpha(x, y) < self.alpha_threshold
    }
}
