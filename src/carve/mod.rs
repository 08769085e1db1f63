//! Multi-view reconstruction passes over a [`VoxelGrid`](crate::core::VoxelGrid).
//!
//! - `views`: the effective view list (originals plus optional mirrors)
//! - `hull`: vote-thresholded visual hull carving
//! - `paint`: occlusion-aware color sampling of surviving voxels
//!
//! Passes must run in order: carve, then paint. Painting a partially carved
//! grid changes both the occlusion results and the colors assigned.

pub mod hull;
pub mod paint;
pub mod views;

use thiserror::Error;

pub use hull::{carve_visual_hull, carve_with_views, CarveOptions, CarveStats};
pub use paint::{paint_grid, sample_colors, PaintStats};
pub use views::{build_views, View};

/// Errors raised by the carving and painting passes.
#[derive(Debug, Error)]
pub enum CarveError {
    #[error("got {cameras} cameras but {images} images")]
    ViewCountMismatch { cameras: usize, images: usize },

    #[error("min_votes must be at least 1 (got {0})")]
    InvalidMinVotes(usize),
}
