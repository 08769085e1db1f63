//! Core data structures and mathematical operations.
//!
//! This module contains the fundamental types used throughout the system:
//! - `Camera`: sprite view cameras (orthographic / perspective)
//! - `VoxelGrid`: dense opacity + color volume with visibility queries
//! - `SpriteImage`, `Sprite`: view images and their metadata
//! - Math utilities: vectors, transforms, basis checks
//!
//! All types here are "pure data" - no file I/O, no pipeline logic.

pub mod camera;
pub mod color;
pub mod grid;
pub mod image;
pub mod math;
pub mod sprite;

// Re-export public types
pub use self::camera::{Camera, CameraBase, CameraError, Projection};
pub use self::color::Color;
pub use self::grid::{ColoredPoint, GridError, GridGeometry, Voxel, VoxelGrid};
pub use self::image::SpriteImage;
pub use self::math::{Mat4, Vec3};
pub use self::sprite::{filter_cardinal, Sprite};
