//! Side-by-side comparison images (original sprite | voxel render).

use crate::core::{Camera, Sprite, VoxelGrid};
use crate::io::load_rgba;
use crate::render::{RenderError, ZBufferRenderer};
use image::{imageops, RgbaImage};
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// A view whose comparison image could not be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewFailure {
    pub view: usize,
    pub reason: String,
}

/// Outcome of a comparison run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComparisonReport {
    /// Comparison images written, in view order
    pub written: Vec<PathBuf>,

    /// Views that were skipped
    pub failures: Vec<ViewFailure>,
}

impl ComparisonReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Place `original` and `rendered` next to each other.
///
/// The result is `w1 + w2` wide and `max(h1, h2)` tall; uncovered pixels are
/// transparent.
pub fn side_by_side(original: &RgbaImage, rendered: &RgbaImage) -> RgbaImage {
    let width = original.width() + rendered.width();
    let height = original.height().max(rendered.height());

    let mut combined = RgbaImage::new(width, height);
    imageops::replace(&mut combined, original, 0, 0);
    imageops::replace(&mut combined, rendered, original.width() as i64, 0);
    combined
}

/// File name of the comparison image for view `index`.
pub fn comparison_file_name(index: usize) -> String {
    format!("view_{:02}_comparison.png", index)
}

fn render_one(
    renderer: &ZBufferRenderer,
    grid: &VoxelGrid,
    camera: &Camera,
    original_path: &Path,
    output_path: &Path,
) -> Result<(), String> {
    let original = load_rgba(original_path).map_err(|e| e.to_string())?;
    let rendered = renderer.render(grid, camera);
    let comparison = side_by_side(&original, &rendered);
    comparison
        .save(output_path)
        .map_err(|e| format!("failed to save {}: {}", output_path.display(), e))
}

/// Render every (unmirrored) camera and save it next to its original sprite.
///
/// Failures are logged and collected in the report. If `out_dir` cannot be
/// created, every view is reported as failed.
pub fn render_comparisons(
    grid: &VoxelGrid,
    cameras: &[Camera],
    sprites: &[Sprite],
    images_dir: &Path,
    out_dir: &Path,
) -> Result<ComparisonReport, RenderError> {
    if cameras.len() != sprites.len() {
        return Err(RenderError::ViewCountMismatch {
            cameras: cameras.len(),
            sprites: sprites.len(),
        });
    }

    if let Err(e) = std::fs::create_dir_all(out_dir) {
        let reason = format!("failed to create output directory {}: {}", out_dir.display(), e);
        warn!("Skipping comparison renders: {}", reason);
        return Ok(ComparisonReport {
            written: Vec::new(),
            failures: (0..cameras.len())
                .map(|view| ViewFailure {
                    view,
                    reason: reason.clone(),
                })
                .collect(),
        });
    }

    info!("Rendering {} views to {}...", cameras.len(), out_dir.display());

    let renderer = ZBufferRenderer::new();
    let results: Vec<(usize, PathBuf, Result<(), String>)> = cameras
        .par_iter()
        .zip(sprites.par_iter())
        .enumerate()
        .map(|(index, (camera, sprite))| {
            let output_path = out_dir.join(comparison_file_name(index));
            let original_path = images_dir.join(&sprite.filename);
            let result = render_one(&renderer, grid, camera, &original_path, &output_path);
            (index, output_path, result)
        })
        .collect();

    let mut report = ComparisonReport::default();
    for (index, output_path, result) in results {
        match result {
            Ok(()) => {
                info!("  View {}: {}", index, output_path.display());
                report.written.push(output_path);
            }
            Err(reason) => {
                warn!("  View {}: skipped ({})", index, reason);
                report.failures.push(ViewFailure {
                    view: index,
                    reason,
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_side_by_side_layout() {
        let left = RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 255]));
        let right = RgbaImage::from_pixel(4, 5, Rgba([0, 0, 255, 255]));
        let combined = side_by_side(&left, &right);

        assert_eq!(combined.dimensions(), (7, 5));
        assert_eq!(*combined.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*combined.get_pixel(3, 4), Rgba([0, 0, 255, 255]));
        // Below the shorter original
        assert_eq!(combined.get_pixel(1, 3).0[3], 0);
    }

    #[test]
    fn test_comparison_file_name() {
        assert_eq!(comparison_file_name(3), "view_03_comparison.png");
        assert_eq!(comparison_file_name(123), "view_123_comparison.png");
    }
}
