//! End-to-end reconstruction.
//!
//! Stages run strictly in order:
//! 1. Load sprite metadata (optionally keeping only cardinal views)
//! 2. Build one camera per sprite and load its image
//! 3. Carve the visual hull out of a fully opaque grid
//! 4. Paint surviving voxels
//! 5. Export the surface
//! 6. Optionally render comparison images (never fatal)
//!
//! Every input problem is reported before anything is written.

use crate::carve::{carve_visual_hull, paint_grid, CarveError, CarveOptions, CarveStats, PaintStats};
use crate::config::{ConfigError, OutputFormat, ReconstructionConfig};
use crate::core::{filter_cardinal, Camera, CameraError, GridError, Sprite, SpriteImage, VoxelGrid};
use crate::io::{
    load_sprite_images, load_sprites, save_mesh_ply, save_point_cloud_ply, save_vox, ExportError,
    LoadError,
};
use crate::render::{render_comparisons, ComparisonReport};
use log::{info, warn};
use std::path::PathBuf;
use thiserror::Error;

/// Any fatal reconstruction error.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("sprite {index} ({filename}): {source}")]
    Camera {
        index: usize,
        filename: String,
        #[source]
        source: CameraError,
    },

    #[error("no views left to carve with")]
    NoViews,

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Carve(#[from] CarveError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Sprites with their cameras and images, index-aligned.
pub struct ViewSet {
    pub sprites: Vec<Sprite>,
    pub cameras: Vec<Camera>,
    pub images: Vec<SpriteImage>,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct ReconstructionOutputs {
    pub grid: VoxelGrid,
    pub carve: CarveStats,
    pub paint: PaintStats,
    pub surface_voxels: usize,
    pub output_path: PathBuf,
    pub comparison: Option<ComparisonReport>,
}

/// Build one camera per sprite.
///
/// Basis or parameter errors name the offending sprite.
pub fn build_cameras(
    sprites: &[Sprite],
    cfg: &ReconstructionConfig,
) -> Result<Vec<Camera>, PipelineError> {
    let projection = cfg.projection()?;
    sprites
        .iter()
        .enumerate()
        .map(|(index, sprite)| {
            Camera::from_sprite(sprite, projection, cfg.distance).map_err(|source| {
                PipelineError::Camera {
                    index,
                    filename: sprite.filename.clone(),
                    source,
                }
            })
        })
        .collect()
}

/// Load sprites, cameras and images for a run.
pub fn load_views(cfg: &ReconstructionConfig) -> Result<ViewSet, PipelineError> {
    let mut sprites = load_sprites(&cfg.sprites_path)?;
    if cfg.cardinal_only {
        let total = sprites.len();
        sprites = filter_cardinal(sprites);
        info!("Cardinal filter: {}/{} sprites kept", sprites.len(), total);
    }
    if sprites.is_empty() {
        return Err(PipelineError::NoViews);
    }

    let cameras = build_cameras(&sprites, cfg)?;
    let images = load_sprite_images(&sprites, &cfg.images_dir, cfg.alpha_threshold)?;

    Ok(ViewSet {
        sprites,
        cameras,
        images,
    })
}

/// Carve and paint a fresh grid from a view set.
pub fn reconstruct(
    views: &ViewSet,
    cfg: &ReconstructionConfig,
) -> Result<(VoxelGrid, CarveStats, PaintStats), PipelineError> {
    let mut grid = VoxelGrid::new(cfg.resolution, cfg.extent)?;
    info!(
        "Grid: {}^3 voxels, extent ±{}, voxel size {:.4}",
        cfg.resolution,
        cfg.extent,
        grid.voxel_size()
    );

    let options = CarveOptions {
        symmetry: cfg.symmetry,
        min_votes: cfg.min_votes,
    };
    let carve = carve_visual_hull(&mut grid, &views.cameras, &views.images, &options)?;
    let paint = paint_grid(&mut grid, &views.cameras, &views.images, cfg.symmetry)?;

    Ok((grid, carve, paint))
}

/// Write the surface of `grid` in the configured format.
pub fn export(grid: &VoxelGrid, cfg: &ReconstructionConfig) -> Result<PathBuf, PipelineError> {
    let path = cfg.resolved_output_path();
    match cfg.format {
        OutputFormat::PointCloud => save_point_cloud_ply(grid, &path, cfg.color)?,
        OutputFormat::Mesh => save_mesh_ply(grid, &path)?,
        OutputFormat::Vox => save_vox(grid, &path)?,
    }
    Ok(path)
}

/// Run a full reconstruction.
pub fn run(cfg: &ReconstructionConfig) -> Result<ReconstructionOutputs, PipelineError> {
    cfg.validate()?;

    let views = load_views(cfg)?;
    let (grid, carve, paint) = reconstruct(&views, cfg)?;

    let surface_voxels = grid.surface_count();
    info!(
        "Surface: {} of {} occupied voxels",
        surface_voxels, carve.remaining
    );
    let output_path = export(&grid, cfg)?;

    // Comparison renders are diagnostic; the export above stands regardless.
    let comparison = match &cfg.render {
        Some(dir) => {
            match render_comparisons(&grid, &views.cameras, &views.sprites, &cfg.images_dir, dir) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("Comparison renders skipped: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    Ok(ReconstructionOutputs {
        grid,
        carve,
        paint,
        surface_voxels,
        output_path,
        comparison,
    })
}
