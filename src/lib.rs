//! # carve-rs: Visual-hull voxel reconstruction from sprite views
//!
//! This crate reconstructs a colored voxel model from a set of calibrated 2D
//! sprites (each with a known camera pose and an RGBA image) by carving away
//! every voxel that falls outside the sprite silhouettes, then painting the
//! survivors from the views that can actually see them.
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - `core`: Fundamental data structures (cameras, voxel grid, sprites, math)
//! - `carve`: Visual hull carving and occlusion-aware coloring
//! - `io`: File I/O (sprite metadata, images, PLY and `.vox` export)
//! - `render`: Z-buffered comparison renders (CPU)
//! - `config`: Run configuration
//! - `pipeline`: End-to-end orchestration

// Core data structures and math
pub mod core;

// Carving and coloring passes
pub mod carve;

// I/O operations (JSON, PNG, PLY, VOX)
pub mod io;

// Comparison rendering
pub mod render;

pub mod config;
pub mod pipeline;

// Re-export commonly used types at crate root for convenience
pub use crate::config::{CameraKind, OutputFormat, ReconstructionConfig};
pub use crate::core::{Camera, Projection, Sprite, SpriteImage, VoxelGrid};
pub use crate::pipeline::{run, PipelineError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
