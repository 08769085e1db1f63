//! Run configuration.
//!
//! A [`ReconstructionConfig`] holds every knob of a reconstruction run. It can
//! be loaded from a JSON file (missing fields take their defaults) and is then
//! overridden field by field from the command line.

use crate::core::Projection;
use crate::io::MAX_VOX_RESOLUTION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("camera projection not set (use orthographic or perspective)")]
    MissingCamera,

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Output file kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// ASCII PLY of surface voxel centers
    #[default]
    PointCloud,

    /// ASCII PLY of surface voxels as cubes
    Mesh,

    /// MagicaVoxel `.vox`
    Vox,
}

/// Camera projection kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraKind {
    Orthographic,
    Perspective,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    pub sprites_path: PathBuf,
    pub images_dir: PathBuf,

    /// Defaults to `model.ply`, or `model.vox` for the vox format
    pub output_path: Option<PathBuf>,

    /// Voxels per axis
    pub resolution: usize,

    /// Half-size of the reconstruction cube (world units)
    pub extent: f64,

    /// Orthographic half-height covered by a sprite (world units)
    pub ortho_scale: f64,

    /// Camera distance from the origin
    pub distance: f64,

    /// Sprite pixels with alpha below this are background
    pub alpha_threshold: f64,

    /// Also use every view mirrored across Y=0
    pub symmetry: bool,

    /// Dissenting views required to carve a voxel
    pub min_votes: usize,

    pub format: OutputFormat,

    /// Include per-vertex colors in point clouds
    pub color: bool,

    pub camera: Option<CameraKind>,

    /// Vertical field of view for perspective cameras (degrees)
    pub fov_y_deg: f64,

    /// Keep only axis-aligned views
    pub cardinal_only: bool,

    /// Directory for comparison renders; None disables rendering
    pub render: Option<PathBuf>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            sprites_path: PathBuf::from("ship_sprites_centered.json"),
            images_dir: PathBuf::from("centered_images"),
            output_path: None,
            resolution: 128,
            extent: 1.5,
            ortho_scale: 2.0,
            distance: 5.0,
            alpha_threshold: 0.5,
            symmetry: false,
            min_votes: 2,
            format: OutputFormat::PointCloud,
            color: true,
            camera: None,
            fov_y_deg: 60.0,
            cardinal_only: false,
            render: None,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl ReconstructionConfig {
    /// Load a configuration from JSON; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every value before any work is done.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.is_none() {
            return Err(ConfigError::MissingCamera);
        }
        if self.resolution == 0 {
            return Err(invalid("resolution", "must be at least 1"));
        }
        if self.format == OutputFormat::Vox && self.resolution > MAX_VOX_RESOLUTION {
            return Err(invalid(
                "resolution",
                format!(
                    "{} exceeds .vox maximum of {}",
                    self.resolution, MAX_VOX_RESOLUTION
                ),
            ));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(invalid("extent", format!("must be positive (got {})", self.extent)));
        }
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(invalid(
                "distance",
                format!("must be positive (got {})", self.distance),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha_threshold) {
            return Err(invalid(
                "alpha",
                format!("must be in [0, 1] (got {})", self.alpha_threshold),
            ));
        }
        if self.min_votes == 0 {
            return Err(invalid("min-votes", "must be at least 1"));
        }
        match self.projection()? {
            Projection::Orthographic { scale } if !(scale.is_finite() && scale > 0.0) => {
                Err(invalid("ortho", format!("must be positive (got {})", scale)))
            }
            Projection::Perspective { fov_y_deg } if !(fov_y_deg > 0.0 && fov_y_deg < 180.0) => {
                Err(invalid(
                    "fov",
                    format!("must be in (0, 180) degrees (got {})", fov_y_deg),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Camera projection for the configured kind.
    pub fn projection(&self) -> Result<Projection, ConfigError> {
        match self.camera {
            Some(CameraKind::Orthographic) => Ok(Projection::Orthographic {
                scale: self.ortho_scale,
            }),
            Some(CameraKind::Perspective) => Ok(Projection::Perspective {
                fov_y_deg: self.fov_y_deg,
            }),
            None => Err(ConfigError::MissingCamera),
        }
    }

    /// Output path, falling back to the per-format default.
    pub fn resolved_output_path(&self) -> PathBuf {
        match (&self.output_path, self.format) {
            (Some(path), _) => path.clone(),
            (None, OutputFormat::Vox) => PathBuf::from("model.vox"),
            (None, _) => PathBuf::from("model.ply"),
        }
    }
}
