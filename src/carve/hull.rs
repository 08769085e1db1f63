//! Vote-thresholded visual hull carving.
//!
//! Every view casts a "carve vote" against each occupied voxel whose center
//! projects outside its silhouette (sampled alpha below the image threshold).
//! A voxel is carved once all views are tallied and its vote count reaches
//! `min_votes`:
//! - `min_votes = 1` is the strict visual hull (any dissenting view removes it)
//! - larger values tolerate per-view noise and misalignment
//!
//! Carving is one-way; running the pass again with the same inputs carves
//! nothing new.

use crate::carve::views::{build_views, View};
use crate::carve::CarveError;
use crate::core::{Camera, SpriteImage, VoxelGrid};
use log::{debug, info};
use rayon::prelude::*;

/// Carving parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarveOptions {
    /// Also carve with every view mirrored across Y=0
    pub symmetry: bool,

    /// Number of dissenting views required to carve a voxel
    pub min_votes: usize,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            symmetry: false,
            min_votes: 1,
        }
    }
}

/// Summary of a carving pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CarveStats {
    /// Number of effective views (mirrors included)
    pub views: usize,

    /// Carve votes cast by each view
    pub votes_per_view: Vec<usize>,

    /// Voxels carved by this pass
    pub carved: usize,

    /// Occupied voxels remaining
    pub remaining: usize,
}

/// Carve the visual hull of `grid` from sprite views.
pub fn carve_visual_hull(
    grid: &mut VoxelGrid,
    cameras: &[Camera],
    images: &[SpriteImage],
    options: &CarveOptions,
) -> Result<CarveStats, CarveError> {
    let views = build_views(cameras, images, options.symmetry)?;
    info!(
        "Carving with {} views (symmetry={}, min_votes={})",
        views.len(),
        options.symmetry,
        options.min_votes
    );
    carve_with_views(grid, &views, options.min_votes)
}

/// Per-thread tally: voxels to carve and votes cast by each view.
struct Tally {
    to_carve: Vec<usize>,
    votes_per_view: Vec<usize>,
}

impl Tally {
    fn new(num_views: usize) -> Self {
        Self {
            to_carve: Vec::new(),
            votes_per_view: vec![0; num_views],
        }
    }

    fn merge(mut self, other: Tally) -> Self {
        self.to_carve.extend(other.to_carve);
        for (a, b) in self.votes_per_view.iter_mut().zip(other.votes_per_view) {
            *a += b;
        }
        self
    }
}

/// Carve `grid` with an explicit view list.
pub fn carve_with_views(
    grid: &mut VoxelGrid,
    views: &[View<'_>],
    min_votes: usize,
) -> Result<CarveStats, CarveError> {
    if min_votes == 0 {
        return Err(CarveError::InvalidMinVotes(min_votes));
    }

    let geometry = grid.geometry();
    let num_views = views.len();

    // Votes only depend on voxel centers and the views, so every voxel is
    // tallied independently; carving is applied once the tally is complete.
    let tally = grid
        .voxels()
        .par_iter()
        .enumerate()
        .fold(
            || Tally::new(num_views),
            |mut local, (index, voxel)| {
                if !voxel.is_occupied() {
                    return local;
                }
                let [ix, iy, iz] = geometry.coords(index);
                let center = geometry.position(ix, iy, iz);

                let mut votes = 0;
                for (view_idx, view) in views.iter().enumerate() {
                    let Some(pixel) = view.sample_point(&center) else {
                        continue;
                    };
                    if view.image.is_background(pixel.x, pixel.y) {
                        votes += 1;
                        local.votes_per_view[view_idx] += 1;
                    }
                }
                if votes >= min_votes {
                    local.to_carve.push(index);
                }
                local
            },
        )
        .reduce(|| Tally::new(num_views), Tally::merge);

    let voxels = grid.voxels_mut();
    for &index in &tally.to_carve {
        voxels[index].opacity = 0.0;
    }

    for (view_idx, votes) in tally.votes_per_view.iter().enumerate() {
        debug!(
            "  View {}{}: {} carve votes",
            view_idx,
            if views[view_idx].mirrored { " (mirrored)" } else { "" },
            votes
        );
    }

    let stats = CarveStats {
        views: num_views,
        votes_per_view: tally.votes_per_view,
        carved: tally.to_carve.len(),
        remaining: grid.occupied_count(),
    };
    info!(
        "Visual hull: carved {} voxels, {} remain occupied",
        stats.carved, stats.remaining
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec3;
    use image::{Rgba, RgbaImage};

    /// Camera at -X looking toward +X.
    fn rear_camera(size: u32) -> Camera {
        Camera::orthographic(
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
            size,
            size,
            1.0,
            5.0,
        )
        .unwrap()
    }

    fn filled(size: u32, alpha: u8) -> SpriteImage {
        SpriteImage::new(RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, alpha])), 0.5)
    }

    #[test]
    fn test_opaque_views_carve_nothing() {
        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let stats = carve_visual_hull(
            &mut grid,
            &[rear_camera(16)],
            &[filled(16, 255)],
            &CarveOptions::default(),
        )
        .unwrap();
        assert_eq!(stats.carved, 0);
        assert_eq!(stats.remaining, 64);
        assert_eq!(stats.votes_per_view, vec![0]);
    }

    #[test]
    fn test_transparent_view_carves_everything() {
        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let stats = carve_visual_hull(
            &mut grid,
            &[rear_camera(16)],
            &[filled(16, 0)],
            &CarveOptions::default(),
        )
        .unwrap();
        assert_eq!(stats.carved, 64);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_min_votes_threshold_is_inclusive() {
        let cameras = vec![rear_camera(16), rear_camera(16), rear_camera(16)];
        // Two dissenting views, one agreeing view
        let images = vec![filled(16, 0), filled(16, 0), filled(16, 255)];

        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let options = CarveOptions {
            symmetry: false,
            min_votes: 3,
        };
        let stats = carve_visual_hull(&mut grid, &cameras, &images, &options).unwrap();
        assert_eq!(stats.carved, 0);

        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let options = CarveOptions {
            symmetry: false,
            min_votes: 2,
        };
        let stats = carve_visual_hull(&mut grid, &cameras, &images, &options).unwrap();
        assert_eq!(stats.carved, 64);
    }

    #[test]
    fn test_symmetry_doubles_votes() {
        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let options = CarveOptions {
            symmetry: true,
            min_votes: 2,
        };
        let stats =
            carve_visual_hull(&mut grid, &[rear_camera(16)], &[filled(16, 0)], &options).unwrap();
        assert_eq!(stats.views, 2);
        assert_eq!(stats.votes_per_view, vec![64, 64]);
        assert_eq!(stats.carved, 64);
    }

    #[test]
    fn test_zero_min_votes_rejected() {
        let mut grid = VoxelGrid::new(2, 1.0).unwrap();
        let options = CarveOptions {
            symmetry: false,
            min_votes: 0,
        };
        assert!(matches!(
            carve_visual_hull(&mut grid, &[rear_camera(8)], &[filled(8, 255)], &options),
            Err(CarveError::InvalidMinVotes(0))
        ));
    }

    #[test]
    fn test_points_behind_perspective_camera_cast_no_votes() {
        // Camera 0.5 units from the origin: half the grid is behind it.
        let cam = Camera::perspective(
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
            16,
            16,
            170.0,
            0.5,
        )
        .unwrap();
        let mut grid = VoxelGrid::new(4, 1.0).unwrap();
        let stats =
            carve_visual_hull(&mut grid, &[cam], &[filled(16, 0)], &CarveOptions::default())
                .unwrap();

        // Only layers with x > -0.5 are in front of the camera
        assert_eq!(stats.carved, 48);
        for iy in 0..4 {
            for iz in 0..4 {
                assert!(grid.is_occupied(0, iy, iz));
                assert!(!grid.is_occupied(1, iy, iz));
            }
        }
    }
}
