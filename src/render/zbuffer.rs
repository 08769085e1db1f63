//! Z-buffered voxel splatting.
//!
//! Each occupied voxel is drawn as an axis-aligned pixel rectangle the size of
//! its projected footprint, with a per-pixel depth test. No shading: the
//! voxel color is written fully opaque.

use crate::core::{Camera, ColoredPoint, VoxelGrid};
use image::{Rgba, RgbaImage};

/// Simple CPU voxel renderer.
#[derive(Clone, Debug)]
pub struct ZBufferRenderer {
    /// Color of pixels no voxel covers
    pub background: Rgba<u8>,
}

impl Default for ZBufferRenderer {
    fn default() -> Self {
        Self {
            background: Rgba([0, 0, 0, 0]),
        }
    }
}

impl ZBufferRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render every occupied voxel of `grid` as seen by `camera`.
    pub fn render(&self, grid: &VoxelGrid, camera: &Camera) -> RgbaImage {
        self.render_points(&grid.occupied_points(), grid.voxel_size(), camera)
    }

    /// Render voxel centers of side `voxel_size`.
    pub fn render_points(
        &self,
        points: &[ColoredPoint],
        voxel_size: f64,
        camera: &Camera,
    ) -> RgbaImage {
        let width = camera.width();
        let height = camera.height();
        let base = camera.base();

        let mut img = RgbaImage::from_pixel(width, height, self.background);
        let mut depth = vec![f64::INFINITY; width as usize * height as usize];

        let half_w = (voxel_size / 2.0) * base.fx;
        let half_h = (voxel_size / 2.0) * base.fy;

        for point in points {
            let Some((pixel, z)) = camera.project_with_depth(&point.position) else {
                continue;
            };
            if !(pixel.x.is_finite() && pixel.y.is_finite() && z.is_finite()) {
                continue;
            }

            // Perspective footprint shrinks with distance
            let (hw, hh) = if camera.is_perspective() {
                (half_w / z, half_h / z)
            } else {
                (half_w, half_h)
            };

            let min_x = (pixel.x - hw).floor().max(0.0) as u32;
            let max_x = (pixel.x + hw).ceil().min(width as f64).max(0.0) as u32;
            let min_y = (pixel.y - hh).floor().max(0.0) as u32;
            let max_y = (pixel.y + hh).ceil().min(height as f64).max(0.0) as u32;

            let color = Rgba([point.rgb[0], point.rgb[1], point.rgb[2], 255]);
            for py in min_y..max_y {
                for px in min_x..max_x {
                    let idx = py as usize * width as usize + px as usize;
                    if z < depth[idx] {
                        depth[idx] = z;
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }

        img
    }
}
