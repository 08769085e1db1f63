//! Per-view sprite metadata.

use crate::core::math::Vec3;
use serde::{Deserialize, Serialize};

/// Metadata for a single sprite view.
///
/// One array of sprites fully describes the view set. Angles follow the
/// sprite sheet convention: yaw 0 = rear (camera at -X), yaw 180 = front
/// (camera at +X), pitch 90 = camera at +Z, pitch -90 = camera at -Z.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Sheet block the sprite was cut from
    #[serde(default)]
    pub block: i32,

    /// Sheet row (absent for special views)
    #[serde(default)]
    pub row: Option<i32>,

    /// Yaw in degrees
    pub yaw: f64,

    /// Pitch in degrees
    pub pitch: f64,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Offset of the sprite within its sheet
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,

    /// Image file name, relative to the images directory
    pub filename: String,

    /// Optional view tag
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Camera up vector in world space
    pub camera_up: [f64; 3],

    /// Camera right vector in world space
    pub camera_right: [f64; 3],
}

impl Sprite {
    pub fn camera_up_vec(&self) -> Vec3 {
        Vec3::new(self.camera_up[0], self.camera_up[1], self.camera_up[2])
    }

    pub fn camera_right_vec(&self) -> Vec3 {
        Vec3::new(
            self.camera_right[0],
            self.camera_right[1],
            self.camera_right[2],
        )
    }

    /// True for straight top/bottom views and horizontal views at 90° yaw steps.
    pub fn is_cardinal(&self) -> bool {
        if self.pitch == 90.0 || self.pitch == -90.0 {
            return true;
        }
        self.pitch == 0.0 && self.yaw % 90.0 == 0.0
    }
}

/// Keep only cardinal views (see [`Sprite::is_cardinal`]).
pub fn filter_cardinal(sprites: Vec<Sprite>) -> Vec<Sprite> {
    sprites.into_iter().filter(Sprite::is_cardinal).collect()
}
