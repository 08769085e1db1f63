//! RGBA color with floating point channels.
//!
//! Sprite pixels are sampled into `[0, 1]` floats so bilinear interpolation
//! and alpha weighting stay exact; colors are only quantized to 8 bits at
//! export and render time.

use serde::{Deserialize, Serialize};

/// RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Opaque black.
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB components.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build from 8-bit RGBA.
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self {
            r: px[0] as f64 / 255.0,
            g: px[1] as f64 / 255.0,
            b: px[2] as f64 / 255.0,
            a: px[3] as f64 / 255.0,
        }
    }

    /// Quantize RGB to 8 bits (truncating, clamped).
    pub fn to_rgb8(&self) -> [u8; 3] {
        [unit_to_u8(self.r), unit_to_u8(self.g), unit_to_u8(self.b)]
    }

    /// Quantize RGBA to 8 bits (truncating, clamped).
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            unit_to_u8(self.r),
            unit_to_u8(self.g),
            unit_to_u8(self.b),
            unit_to_u8(self.a),
        ]
    }
}

/// Slack added before truncation so averages of exact 8-bit values that land
/// a rounding error below an integer keep that integer.
const QUANTIZE_EPSILON: f64 = 1e-6;

/// Map a `[0, 1]` float to `0..=255` by truncation.
///
/// NaN maps to 0.
pub fn unit_to_u8(x: f64) -> u8 {
    if x.is_nan() {
        return 0;
    }
    (x * 255.0 + QUANTIZE_EPSILON).clamp(0.0, 255.0) as u8
}
