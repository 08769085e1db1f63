//! Comparison rendering (CPU implementation).
//!
//! This module re-projects a carved grid into the sprite cameras:
//! - `zbuffer`: splat occupied voxels as depth-tested squares
//! - `compare`: side-by-side original/render images for every view
//!
//! Renders are diagnostic only; failures never affect the exported model.

pub mod compare;
pub mod zbuffer;

use thiserror::Error;

// Re-export
pub use compare::{render_comparisons, side_by_side, ComparisonReport, ViewFailure};
pub use zbuffer::ZBufferRenderer;

/// Misuse of the comparison API (I/O problems are collected in the
/// [`ComparisonReport`] instead).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("got {cameras} cameras but {sprites} sprites")]
    ViewCountMismatch { cameras: usize, sprites: usize },
}
