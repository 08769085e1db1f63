//! ASCII PLY export for carved voxel grids.
//!
//! PLY (Polygon File Format) is used to:
//! - Export surface voxel centers as a point cloud (optionally colored)
//! - Export surface voxels as a cube mesh (8 vertices, 6 quads per voxel)
//!
//! Coordinates are written with 6 decimals; colors are 8-bit, truncated.

use crate::core::{ColoredPoint, VoxelGrid};
use crate::io::{write_atomically, ExportError};
use log::info;
use std::io::Write;
use std::path::Path;

/// Cube corner sign pattern, indexed as referenced by [`CUBE_FACES`].
const CUBE_CORNERS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Quads with outward (counter-clockwise) winding.
const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // bottom (-Z)
    [4, 5, 6, 7], // top (+Z)
    [0, 1, 5, 4], // back (-Y)
    [2, 3, 7, 6], // front (+Y)
    [0, 4, 7, 3], // left (-X)
    [1, 2, 6, 5], // right (+X)
];

fn write_vertex_header<W: Write>(w: &mut W, count: usize, with_color: bool) -> std::io::Result<()> {
    writeln!(w, "ply")?;
    writeln!(w, "format ascii 1.0")?;
    writeln!(w, "element vertex {}", count)?;
    writeln!(w, "property float x")?;
    writeln!(w, "property float y")?;
    writeln!(w, "property float z")?;
    if with_color {
        writeln!(w, "property uchar red")?;
        writeln!(w, "property uchar green")?;
        writeln!(w, "property uchar blue")?;
    }
    Ok(())
}

fn write_point<W: Write>(w: &mut W, x: f64, y: f64, z: f64, rgb: Option<[u8; 3]>) -> std::io::Result<()> {
    match rgb {
        Some([r, g, b]) => writeln!(w, "{:.6} {:.6} {:.6} {} {} {}", x, y, z, r, g, b),
        None => writeln!(w, "{:.6} {:.6} {:.6}", x, y, z),
    }
}

/// Write surface voxel centers as an ASCII PLY point cloud.
///
/// Returns the number of points written.
pub fn write_point_cloud<W: Write>(
    w: &mut W,
    grid: &VoxelGrid,
    with_color: bool,
) -> std::io::Result<usize> {
    let points = grid.surface_points();

    write_vertex_header(w, points.len(), with_color)?;
    writeln!(w, "end_header")?;

    for ColoredPoint { position, rgb } in &points {
        let color = with_color.then_some(*rgb);
        write_point(w, position.x, position.y, position.z, color)?;
    }

    Ok(points.len())
}

/// Write surface voxels as an ASCII PLY cube mesh.
///
/// Returns the number of cubes written.
pub fn write_mesh<W: Write>(w: &mut W, grid: &VoxelGrid) -> std::io::Result<usize> {
    let points = grid.surface_points();
    let half = grid.voxel_size() / 2.0;

    write_vertex_header(w, points.len() * 8, true)?;
    writeln!(w, "element face {}", points.len() * 6)?;
    writeln!(w, "property list uchar int vertex_indices")?;
    writeln!(w, "end_header")?;

    for point in &points {
        for corner in &CUBE_CORNERS {
            write_point(
                w,
                point.position.x + corner[0] * half,
                point.position.y + corner[1] * half,
                point.position.z + corner[2] * half,
                Some(point.rgb),
            )?;
        }
    }

    for ordinal in 0..points.len() {
        let base = ordinal * 8;
        for face in &CUBE_FACES {
            writeln!(
                w,
                "4 {} {} {} {}",
                base + face[0],
                base + face[1],
                base + face[2],
                base + face[3]
            )?;
        }
    }

    Ok(points.len())
}

/// Save surface voxels to a PLY point cloud file.
pub fn save_point_cloud_ply(grid: &VoxelGrid, path: &Path, with_color: bool) -> Result<(), ExportError> {
    let count = write_atomically(path, |w| Ok(write_point_cloud(w, grid, with_color)?))?;

    info!("Wrote {} surface points to {}", count, path.display());
    Ok(())
}

/// Save surface voxels to a PLY cube mesh file.
pub fn save_mesh_ply(grid: &VoxelGrid, path: &Path) -> Result<(), ExportError> {
    let count = write_atomically(path, |w| Ok(write_mesh(w, grid)?))?;

    info!(
        "Wrote mesh with {} cubes ({} vertices, {} faces) to {}",
        count,
        count * 8,
        count * 6,
        path.display()
    );
    Ok(())
}
