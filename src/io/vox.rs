//! Chunked binary voxel export (MagicaVoxel `.vox`, version 150).
//!
//! File layout (all integers little-endian i32):
//! - `"VOX "`, version
//! - `"MAIN"` chunk: content size 0, children size = sum of the child chunks
//! - `"SIZE"`: resolution for x, y, z
//! - `"XYZI"`: voxel count, then `x, y, z, color_index` bytes per voxel
//! - `"RGBA"`: 256 palette entries, unused entries `{0, 0, 0, 255}`
//!
//! Each child chunk header is id, content size, children size (always 0).

use crate::core::VoxelGrid;
use crate::io::palette::{build_palette, Palette};
use crate::io::{write_atomically, ExportError};
use byteorder::{LittleEndian, WriteBytesExt};
use log::info;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Largest grid resolution representable with byte coordinates.
pub const MAX_VOX_RESOLUTION: usize = 256;

const VOX_VERSION: i32 = 150;
const CHUNK_HEADER_SIZE: usize = 12;
const PALETTE_SLOTS: usize = 256;
const UNUSED_PALETTE_ENTRY: [u8; 4] = [0, 0, 0, 255];

/// Surface voxels as `(x, y, z, rgb)`, in grid order.
fn collect_surface(grid: &VoxelGrid) -> Vec<([u8; 3], [u8; 3])> {
    grid.surface_cells()
        .map(|[ix, iy, iz]| {
            let rgb = grid.voxel(ix, iy, iz).color.to_rgb8();
            ([ix as u8, iy as u8, iz as u8], rgb)
        })
        .collect()
}

fn write_chunk_header<W: Write>(
    w: &mut W,
    id: &[u8; 4],
    content_size: usize,
    children_size: usize,
) -> std::io::Result<()> {
    w.write_all(id)?;
    w.write_i32::<LittleEndian>(content_size as i32)?;
    w.write_i32::<LittleEndian>(children_size as i32)?;
    Ok(())
}

/// Serialize the surface voxels of `grid` as a `.vox` stream.
///
/// Returns the palette used, so callers can report quantization.
pub fn write_vox<W: Write>(w: &mut W, grid: &VoxelGrid) -> Result<Palette, ExportError> {
    let resolution = grid.resolution();
    if resolution > MAX_VOX_RESOLUTION {
        return Err(ExportError::ResolutionTooLarge {
            resolution,
            max: MAX_VOX_RESOLUTION,
        });
    }

    let voxels = collect_surface(grid);

    let mut frequencies: HashMap<[u8; 3], usize> = HashMap::new();
    for (_, rgb) in &voxels {
        *frequencies.entry(*rgb).or_insert(0) += 1;
    }
    let palette = build_palette(&frequencies);

    let size_content = 3 * 4;
    let xyzi_content = 4 + 4 * voxels.len();
    let rgba_content = 4 * PALETTE_SLOTS;
    let children = 3 * CHUNK_HEADER_SIZE + size_content + xyzi_content + rgba_content;

    w.write_all(b"VOX ")?;
    w.write_i32::<LittleEndian>(VOX_VERSION)?;
    write_chunk_header(w, b"MAIN", 0, children)?;

    write_chunk_header(w, b"SIZE", size_content, 0)?;
    for _ in 0..3 {
        w.write_i32::<LittleEndian>(resolution as i32)?;
    }

    write_chunk_header(w, b"XYZI", xyzi_content, 0)?;
    w.write_i32::<LittleEndian>(voxels.len() as i32)?;
    for (xyz, rgb) in &voxels {
        // Every surface color is in the frequency table, so it always maps.
        let index = palette.index_of(*rgb).unwrap_or(1);
        w.write_all(&[xyz[0], xyz[1], xyz[2], index])?;
    }

    write_chunk_header(w, b"RGBA", rgba_content, 0)?;
    let entries = palette.to_rgba();
    for slot in 0..PALETTE_SLOTS {
        w.write_all(entries.get(slot).unwrap_or(&UNUSED_PALETTE_ENTRY))?;
    }

    Ok(palette)
}

/// Save the surface voxels of `grid` to a `.vox` file.
pub fn save_vox(grid: &VoxelGrid, path: &Path) -> Result<(), ExportError> {
    // Checked before the file is created so no partial output is left behind.
    if grid.resolution() > MAX_VOX_RESOLUTION {
        return Err(ExportError::ResolutionTooLarge {
            resolution: grid.resolution(),
            max: MAX_VOX_RESOLUTION,
        });
    }

    let palette = write_atomically(path, |w| write_vox(w, grid))?;

    info!(
        "Wrote {} surface voxels with {} palette colors to {}",
        grid.surface_count(),
        palette.len(),
        path.display()
    );
    Ok(())
}
