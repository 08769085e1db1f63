//! I/O operations for loading and saving data.
//!
//! This module handles all file format parsing and export:
//! - Sprite metadata (JSON)
//! - Sprite images (PNG, decoded to RGBA8)
//! - PLY format (point clouds and cube meshes)
//! - MagicaVoxel-style chunked `.vox` export with a quantized palette

mod images;
mod palette;
mod ply;
mod sprites;
mod vox;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

// Re-export public types and functions
pub use images::{load_rgba, load_sprite_image, load_sprite_images};
pub use palette::{build_palette, pack_rgb, Palette, MAX_PALETTE_COLORS};
pub use ply::{save_mesh_ply, save_point_cloud_ply, write_mesh, write_point_cloud};
pub use sprites::{load_sprites, parse_sprites};
pub use vox::{save_vox, write_vox, MAX_VOX_RESOLUTION};

/// Errors that can occur when loading sprite metadata or images.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sprite metadata in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("sprite metadata {0} contains no sprites")]
    NoSprites(PathBuf),
}

/// Errors that can occur when exporting a reconstruction.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("grid resolution {resolution} exceeds .vox maximum of {max}")]
    ResolutionTooLarge { resolution: usize, max: usize },
}

/// Write an export file through a temporary sibling that is renamed into
/// place once `write` succeeds.
///
/// On any failure the temporary is removed and `path` is left untouched.
pub(crate) fn write_atomically<T>(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<&mut File>) -> Result<T, ExportError>,
) -> Result<T, ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;

    let value = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let value = write(&mut writer)?;
        writer.flush()?;
        value
    };

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(value)
}
