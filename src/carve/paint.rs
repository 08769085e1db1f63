//! Occlusion-aware color sampling for carved voxels.
//!
//! Each occupied voxel takes the alpha-weighted mean of the colors it projects
//! to in every view that actually sees it. Visibility is checked by ray
//! casting through the grid, so colors from the far side of the model do not
//! bleed through.

use crate::carve::views::{build_views, View};
use crate::carve::CarveError;
use crate::core::{Camera, Color, SpriteImage, VoxelGrid};
use log::info;
use rayon::prelude::*;

/// Views whose sampled alpha is at or below this contribute nothing.
pub const MIN_SAMPLE_ALPHA: f64 = 0.01;

/// Summary of a painting pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Occupied voxels that received a color from at least one view
    pub painted: usize,

    /// Occupied voxels no view could see (left black)
    pub unseen: usize,
}

/// Paint occupied voxels from the original (and optionally mirrored) views.
pub fn paint_grid(
    grid: &mut VoxelGrid,
    cameras: &[Camera],
    images: &[SpriteImage],
    symmetry: bool,
) -> Result<PaintStats, CarveError> {
    let views = build_views(cameras, images, symmetry)?;
    Ok(sample_colors(grid, &views))
}

/// Assign each occupied voxel the alpha-weighted mean color over its views.
///
/// Only views where the voxel projects in front of the camera, is the first
/// occupied cell along the camera ray, and samples alpha above
/// [`MIN_SAMPLE_ALPHA`] contribute. Voxels with zero total weight are black.
pub fn sample_colors(grid: &mut VoxelGrid, views: &[View<'_>]) -> PaintStats {
    info!("Sampling colors from {} views...", views.len());

    let geometry = grid.geometry();
    let frozen: &VoxelGrid = grid;

    // Occupancy is fixed during painting, so every voxel's color can be
    // computed independently against the same grid.
    let colors: Vec<Option<(Color, bool)>> = frozen
        .voxels()
        .par_iter()
        .enumerate()
        .map(|(index, voxel)| {
            if !voxel.is_occupied() {
                return None;
            }
            let [ix, iy, iz] = geometry.coords(index);
            let center = geometry.position(ix, iy, iz);

            let (mut sum_r, mut sum_g, mut sum_b) = (0.0, 0.0, 0.0);
            let mut total_weight = 0.0;

            for view in views {
                let Some(pixel) = view.sample_point(&center) else {
                    continue;
                };
                let sample = view.image.sample(pixel.x, pixel.y);
                if sample.a <= MIN_SAMPLE_ALPHA {
                    continue;
                }
                if !frozen.is_visible_from(ix, iy, iz, &view.camera.position()) {
                    continue;
                }
                sum_r += sample.r * sample.a;
                sum_g += sample.g * sample.a;
                sum_b += sample.b * sample.a;
                total_weight += sample.a;
            }

            if total_weight > 0.0 {
                let color = Color::rgb(
                    sum_r / total_weight,
                    sum_g / total_weight,
                    sum_b / total_weight,
                );
                Some((color, true))
            } else {
                Some((Color::BLACK, false))
            }
        })
        .collect();

    let mut stats = PaintStats::default();
    for (voxel, color) in grid.voxels_mut().iter_mut().zip(colors) {
        let Some((color, seen)) = color else {
            continue;
        };
        if seen {
            stats.painted += 1;
        } else {
            stats.unseen += 1;
        }
        voxel.color = color;
    }

    info!(
        "  Colored {} voxels ({} not visible from any view)",
        stats.painted, stats.unseen
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec3;
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};

    fn camera(yaw: f64) -> Camera {
        let position = crate::core::camera::compute_position(yaw, 0.0, 5.0);
        let forward = (-position).normalize();
        let up = Vec3::new(0.0, 0.0, 1.0);
        let right = forward.cross(&up);
        Camera::orthographic(yaw, 0.0, up, right, 16, 16, 1.0, 5.0).unwrap()
    }

    fn solid(rgba: [u8; 4]) -> SpriteImage {
        SpriteImage::new(RgbaImage::from_pixel(16, 16, Rgba(rgba)), 0.5)
    }

    #[test]
    fn test_single_view_paints_visible_face() {
        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let cameras = vec![camera(0.0)];
        let images = vec![solid([0, 0, 255, 255])];
        let stats = paint_grid(&mut grid, &cameras, &images, false).unwrap();

        // Only the ix = 0 layer faces the camera at -X
        assert_eq!(stats.painted, 16);
        assert_eq!(stats.unseen, 48);
        let c = grid.voxel(0, 2, 1).color;
        assert_relative_eq!(c.b, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.r, 0.0, epsilon = 1e-12);
        assert_eq!(grid.voxel(3, 2, 1).color, Color::BLACK);
    }

    #[test]
    fn test_occluded_views_do_not_bleed() {
        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let cameras = vec![camera(0.0), camera(180.0)];
        let images = vec![solid([0, 0, 255, 255]), solid([255, 0, 0, 255])];
        paint_grid(&mut grid, &cameras, &images, false).unwrap();

        let rear = grid.voxel(0, 1, 2).color;
        assert_relative_eq!(rear.b, 1.0, epsilon = 1e-12);
        assert_relative_eq!(rear.r, 0.0, epsilon = 1e-12);

        let front = grid.voxel(3, 1, 2).color;
        assert_relative_eq!(front.r, 1.0, epsilon = 1e-12);
        assert_relative_eq!(front.b, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_alpha_weighted_mean() {
        // Single voxel seen by two views from the same side with different alpha.
        let mut grid = VoxelGrid::new_empty(1, 1.0).unwrap();
        grid.set_opacity(0, 0, 0, 1.0);
        let cameras = vec![camera(0.0), camera(0.0)];
        let images = vec![solid([255, 0, 0, 255]), solid([0, 255, 0, 51])];
        paint_grid(&mut grid, &cameras, &images, false).unwrap();

        // weights 1.0 and 0.2 => r = 1/1.2, g = 0.2/1.2
        let c = grid.voxel(0, 0, 0).color;
        assert_relative_eq!(c.r, 1.0 / 1.2, epsilon = 1e-9);
        assert_relative_eq!(c.g, 0.2 / 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_faint_sample_keeps_its_8bit_color() {
        let mut grid = VoxelGrid::new_empty(1, 1.0).unwrap();
        grid.set_opacity(0, 0, 0, 1.0);
        let cameras = vec![camera(0.0)];
        let images = vec![solid([3, 3, 3, 3])];
        let stats = paint_grid(&mut grid, &cameras, &images, false).unwrap();

        assert_eq!(stats.painted, 1);
        assert_eq!(grid.voxel(0, 0, 0).color.to_rgb8(), [3, 3, 3]);
    }

    #[test]
    fn test_transparent_views_leave_black() {
        let mut grid = VoxelGrid::new(2, 1.0).unwrap();
        let cameras = vec![camera(0.0)];
        let images = vec![solid([255, 255, 255, 2])];
        let stats = paint_grid(&mut grid, &cameras, &images, false).unwrap();
        assert_eq!(stats.painted, 0);
        assert_eq!(stats.unseen, 8);
    }

    #[test]
    fn test_carved_voxels_are_skipped() {
        let mut grid = VoxelGrid::new_empty(2, 1.0).unwrap();
        let cameras = vec![camera(0.0)];
        let images = vec![solid([255, 255, 255, 255])];
        let stats = paint_grid(&mut grid, &cameras, &images, false).unwrap();
        assert_eq!(stats, PaintStats::default());
    }
}
