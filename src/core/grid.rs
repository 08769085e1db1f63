//! Dense voxel grid (opacity + color) over a cube centered at the origin.
//!
//! Voxels live in a single flattened buffer of `resolution³` entries indexed
//! as `ix·res² + iy·res + iz`. The grid covers `[-extent, extent]³`; voxel
//! `(ix, iy, iz)` is the axis-aligned box of side `voxel_size` centered at
//! [`GridGeometry::position`].

use crate::core::color::Color;
use crate::core::math::{normalize_or_zero, Vec3};
use thiserror::Error;

/// Opacity above which a voxel counts as occupied.
pub const OCCUPANCY_THRESHOLD: f64 = 0.5;

/// Direction components smaller than this are treated as parallel to an axis.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Boundary crossings closer than this along a ray count as simultaneous.
const DDA_TIE_EPSILON: f64 = 1e-9;

/// Errors raised while creating a grid.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid resolution must be at least 1")]
    ZeroResolution,

    #[error("grid extent must be positive and finite (got {0})")]
    InvalidExtent(f64),
}

/// A single voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voxel {
    /// Opacity in [0, 1]
    pub opacity: f64,

    /// RGB color in [0, 1] (alpha unused)
    pub color: Color,
}

impl Voxel {
    pub fn is_occupied(&self) -> bool {
        self.opacity > OCCUPANCY_THRESHOLD
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            color: Color::BLACK,
        }
    }
}

/// Voxel center with an 8-bit color, produced at export/render time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColoredPoint {
    pub position: Vec3,
    pub rgb: [u8; 3],
}

/// Index/position mapping of a grid, independent of the voxel storage.
///
/// Copyable so parallel passes can map indices while the voxel buffer is
/// mutably borrowed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub resolution: usize,
    pub extent: f64,
    pub voxel_size: f64,
}

impl GridGeometry {
    pub fn new(resolution: usize, extent: f64) -> Result<Self, GridError> {
        if resolution == 0 {
            return Err(GridError::ZeroResolution);
        }
        if !(extent.is_finite() && extent > 0.0) {
            return Err(GridError::InvalidExtent(extent));
        }
        Ok(Self {
            resolution,
            extent,
            voxel_size: (2.0 * extent) / resolution as f64,
        })
    }

    /// Total number of voxels.
    pub fn len(&self) -> usize {
        self.resolution * self.resolution * self.resolution
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index for 3D coordinates.
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix * self.resolution * self.resolution + iy * self.resolution + iz
    }

    /// 3D coordinates for a flat index (inverse of [`GridGeometry::index`]).
    pub fn coords(&self, index: usize) -> [usize; 3] {
        let res = self.resolution;
        [index / (res * res), (index / res) % res, index % res]
    }

    /// World position of a voxel center.
    pub fn position(&self, ix: usize, iy: usize, iz: usize) -> Vec3 {
        Vec3::new(
            self.axis_center(ix),
            self.axis_center(iy),
            self.axis_center(iz),
        )
    }

    fn axis_center(&self, i: usize) -> f64 {
        -self.extent + (i as f64 + 0.5) * self.voxel_size
    }

    /// Check signed coordinates against the grid bounds.
    pub fn in_bounds(&self, ix: i64, iy: i64, iz: i64) -> bool {
        let res = self.resolution as i64;
        (0..res).contains(&ix) && (0..res).contains(&iy) && (0..res).contains(&iz)
    }

    /// Cell containing a world point, or None if the point is outside the grid.
    pub fn cell_of(&self, point: &Vec3) -> Option<[usize; 3]> {
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let c = point[axis];
            if !(c >= -self.extent && c <= self.extent) {
                return None;
            }
            let i = ((c + self.extent) / self.voxel_size).floor() as usize;
            cell[axis] = i.min(self.resolution - 1);
        }
        Some(cell)
    }

    /// Intersect a ray with the grid's bounding box (slab method).
    ///
    /// Returns the parametric `(t_enter, t_exit)` along `dir`, or None if the
    /// ray misses the box entirely or the box lies behind the origin. Axes
    /// where the direction is (near) zero are treated as parallel: the ray
    /// misses unless the origin lies within that slab.
    pub fn intersect_ray(&self, origin: &Vec3, dir: &Vec3) -> Option<(f64, f64)> {
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            if d.abs() < PARALLEL_EPSILON {
                if o < -self.extent || o > self.extent {
                    return None;
                }
                continue;
            }
            let t0 = (-self.extent - o) / d;
            let t1 = (self.extent - o) / d;
            let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_enter = t_enter.max(near);
            t_exit = t_exit.min(far);
        }

        if t_enter > t_exit || t_exit < 0.0 {
            return None;
        }
        Some((t_enter, t_exit))
    }
}

/// Dense opacity + color volume.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    geometry: GridGeometry,
    voxels: Vec<Voxel>,
}

impl VoxelGrid {
    /// Create a grid with every voxel fully opaque and black.
    pub fn new(resolution: usize, extent: f64) -> Result<Self, GridError> {
        let geometry = GridGeometry::new(resolution, extent)?;
        Ok(Self {
            voxels: vec![Voxel::default(); geometry.len()],
            geometry,
        })
    }

    /// Create a grid with every voxel empty.
    pub fn new_empty(resolution: usize, extent: f64) -> Result<Self, GridError> {
        let mut grid = Self::new(resolution, extent)?;
        for v in &mut grid.voxels {
            v.opacity = 0.0;
        }
        Ok(grid)
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn resolution(&self) -> usize {
        self.geometry.resolution
    }

    pub fn extent(&self) -> f64 {
        self.geometry.extent
    }

    pub fn voxel_size(&self) -> f64 {
        self.geometry.voxel_size
    }

    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        self.geometry.index(ix, iy, iz)
    }

    pub fn position(&self, ix: usize, iy: usize, iz: usize) -> Vec3 {
        self.geometry.position(ix, iy, iz)
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn voxels_mut(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }

    pub fn voxel(&self, ix: usize, iy: usize, iz: usize) -> &Voxel {
        &self.voxels[self.geometry.index(ix, iy, iz)]
    }

    pub fn voxel_mut(&mut self, ix: usize, iy: usize, iz: usize) -> &mut Voxel {
        let idx = self.geometry.index(ix, iy, iz);
        &mut self.voxels[idx]
    }

    pub fn opacity(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.voxel(ix, iy, iz).opacity
    }

    pub fn is_occupied(&self, ix: usize, iy: usize, iz: usize) -> bool {
        self.voxel(ix, iy, iz).is_occupied()
    }

    /// Set opacity, clamped to [0, 1].
    pub fn set_opacity(&mut self, ix: usize, iy: usize, iz: usize, opacity: f64) {
        self.voxel_mut(ix, iy, iz).opacity = opacity.clamp(0.0, 1.0);
    }

    /// Mark a voxel as carved away.
    pub fn carve(&mut self, ix: usize, iy: usize, iz: usize) {
        self.voxel_mut(ix, iy, iz).opacity = 0.0;
    }

    pub fn set_color(&mut self, ix: usize, iy: usize, iz: usize, color: Color) {
        self.voxel_mut(ix, iy, iz).color = color;
    }

    /// Occupancy of signed coordinates; out-of-bounds counts as empty.
    fn occupied_signed(&self, ix: i64, iy: i64, iz: i64) -> bool {
        self.geometry.in_bounds(ix, iy, iz)
            && self.is_occupied(ix as usize, iy as usize, iz as usize)
    }

    /// True if the voxel is occupied and at least one of its 6 face
    /// neighbours is empty or outside the grid.
    pub fn is_surface(&self, ix: usize, iy: usize, iz: usize) -> bool {
        if !self.is_occupied(ix, iy, iz) {
            return false;
        }
        let (x, y, z) = (ix as i64, iy as i64, iz as i64);
        const NEIGHBOURS: [(i64, i64, i64); 6] = [
            (-1, 0, 0),
            (1, 0, 0),
            (0, -1, 0),
            (0, 1, 0),
            (0, 0, -1),
            (0, 0, 1),
        ];
        NEIGHBOURS
            .iter()
            .any(|&(dx, dy, dz)| !self.occupied_signed(x + dx, y + dy, z + dz))
    }

    pub fn occupied_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_occupied()).count()
    }

    pub fn surface_count(&self) -> usize {
        self.surface_cells().count()
    }

    /// Coordinates of all surface voxels in `ix, iy, iz` order.
    pub fn surface_cells(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (0..self.voxels.len())
            .map(move |i| self.geometry.coords(i))
            .filter(move |&[ix, iy, iz]| self.is_surface(ix, iy, iz))
    }

    /// Coordinates of all occupied voxels in `ix, iy, iz` order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_occupied())
            .map(move |(i, _)| self.geometry.coords(i))
    }

    /// Surface voxel centers with their 8-bit colors.
    pub fn surface_points(&self) -> Vec<ColoredPoint> {
        self.surface_cells()
            .map(|[ix, iy, iz]| self.colored_point(ix, iy, iz))
            .collect()
    }

    /// Occupied voxel centers with their 8-bit colors.
    pub fn occupied_points(&self) -> Vec<ColoredPoint> {
        self.occupied_cells()
            .map(|[ix, iy, iz]| self.colored_point(ix, iy, iz))
            .collect()
    }

    fn colored_point(&self, ix: usize, iy: usize, iz: usize) -> ColoredPoint {
        ColoredPoint {
            position: self.position(ix, iy, iz),
            rgb: self.voxel(ix, iy, iz).color.to_rgb8(),
        }
    }

    /// Check whether a voxel is the first occupied cell seen from `camera_position`.
    ///
    /// Casts a ray from the camera toward the voxel center, clips it to the
    /// grid box and walks cells with a 3D DDA. Returns true only if the first
    /// occupied cell hit is the queried voxel. An unoccupied target is never
    /// visible.
    pub fn is_visible_from(&self, ix: usize, iy: usize, iz: usize, camera_position: &Vec3) -> bool {
        if !self.is_occupied(ix, iy, iz) {
            return false;
        }
        let target = [ix, iy, iz];
        let center = self.position(ix, iy, iz);
        let dir = normalize_or_zero(&(center - camera_position));
        if dir == Vec3::zeros() {
            // Camera sits exactly at the voxel center
            return true;
        }

        let Some((t_enter, _)) = self.geometry.intersect_ray(camera_position, &dir) else {
            return false;
        };
        let t_start = t_enter.max(0.0);
        let entry = camera_position + dir * t_start;

        let res = self.geometry.resolution as i64;
        let size = self.geometry.voxel_size;
        let extent = self.geometry.extent;

        // Starting cell, clamped so rounding at the box surface stays inside
        let mut cell = [0i64; 3];
        for axis in 0..3 {
            let i = ((entry[axis] + extent) / size).floor() as i64;
            cell[axis] = i.clamp(0, res - 1);
        }

        let mut step = [0i64; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        for axis in 0..3 {
            let d = dir[axis];
            if d.abs() < PARALLEL_EPSILON {
                continue;
            }
            step[axis] = if d > 0.0 { 1 } else { -1 };
            let boundary_index = if d > 0.0 { cell[axis] + 1 } else { cell[axis] };
            let boundary = -extent + boundary_index as f64 * size;
            t_max[axis] = (boundary - camera_position[axis]) / d;
            t_delta[axis] = size / d.abs();
        }

        let max_steps = 3 * self.geometry.resolution + 3;
        for _ in 0..max_steps {
            let [cx, cy, cz] = cell;
            if self.is_occupied(cx as usize, cy as usize, cz as usize) {
                return [cx as usize, cy as usize, cz as usize] == target;
            }

            // Advance along the nearest boundary. Axes tied with it are
            // crossed together so cells touched only at an edge or corner
            // are skipped.
            let t_next = t_max[0].min(t_max[1]).min(t_max[2]);
            if !t_next.is_finite() {
                // All axes parallel; nothing left to traverse
                return false;
            }
            for axis in 0..3 {
                if step[axis] == 0 || t_max[axis] - t_next > DDA_TIE_EPSILON {
                    continue;
                }
                cell[axis] += step[axis];
                if cell[axis] < 0 || cell[axis] >= res {
                    return false;
                }
                t_max[axis] += t_delta[axis];
            }
        }
        false
    }
}
