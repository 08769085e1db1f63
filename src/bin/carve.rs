//! carve: Reconstruct a voxel model from sprite views
//!
//! Usage:
//!   carve --camera orthographic --json sprites.json --images images/ --output model.ply
//!   carve --camera perspective --fov 45 --vox --symmetry --render
//!   carve --config run.json --resolution 64

use anyhow::Context;
use carve_rs::config::{CameraKind, OutputFormat, ReconstructionConfig};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CameraArg {
    Orthographic,
    Perspective,
}

impl From<CameraArg> for CameraKind {
    fn from(arg: CameraArg) -> Self {
        match arg {
            CameraArg::Orthographic => CameraKind::Orthographic,
            CameraArg::Perspective => CameraKind::Perspective,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum FormatArg {
    PointCloud,
    Mesh,
    Vox,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::PointCloud => OutputFormat::PointCloud,
            FormatArg::Mesh => OutputFormat::Mesh,
            FormatArg::Vox => OutputFormat::Vox,
        }
    }
}

/// Options left unset fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "carve", version, about = "Visual-hull voxel reconstruction from sprite views")]
struct Cli {
    /// JSON run configuration (command-line flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sprite metadata JSON [default: ship_sprites_centered.json]
    #[arg(long)]
    json: Option<PathBuf>,

    /// Directory containing the sprite images [default: centered_images]
    #[arg(long)]
    images: Option<PathBuf>,

    /// Output file [default: model.ply, or model.vox with --vox]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Voxels per axis [default: 128]
    #[arg(long)]
    resolution: Option<usize>,

    /// Half-size of the reconstruction cube [default: 1.5]
    #[arg(long)]
    extent: Option<f64>,

    /// Orthographic half-height covered by a sprite [default: 2.0]
    #[arg(long)]
    ortho: Option<f64>,

    /// Camera distance from the origin [default: 5.0]
    #[arg(long)]
    distance: Option<f64>,

    /// Alpha below which a sprite pixel is background [default: 0.5]
    #[arg(long)]
    alpha: Option<f64>,

    /// Also carve and paint with every view mirrored across Y=0
    #[arg(long)]
    symmetry: bool,

    /// Dissenting views required to carve a voxel [default: 2]
    #[arg(long = "min-votes")]
    min_votes: Option<usize>,

    /// Output format [default: point-cloud]
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Shorthand for --format mesh
    #[arg(long, conflicts_with_all = ["format", "vox"])]
    mesh: bool,

    /// Shorthand for --format vox
    #[arg(long, conflicts_with = "format")]
    vox: bool,

    /// Write point clouds without vertex colors
    #[arg(long = "no-color")]
    no_color: bool,

    /// Render side-by-side comparison images
    #[arg(long)]
    render: bool,

    /// Directory for comparison images (implies --render) [default: renders]
    #[arg(long = "render-dir")]
    render_dir: Option<PathBuf>,

    /// Only use axis-aligned views (pitch ±90, or pitch 0 and yaw a multiple of 90)
    #[arg(long)]
    cardinal: bool,

    /// Camera projection
    #[arg(long, value_enum)]
    camera: Option<CameraArg>,

    /// Vertical field of view for perspective cameras, in degrees [default: 60]
    #[arg(long)]
    fov: Option<f64>,
}

impl Cli {
    /// Layer command-line flags over a base configuration.
    fn apply(self, mut cfg: ReconstructionConfig) -> ReconstructionConfig {
        if let Some(path) = self.json {
            cfg.sprites_path = path;
        }
        if let Some(dir) = self.images {
            cfg.images_dir = dir;
        }
        if self.output.is_some() {
            cfg.output_path = self.output;
        }
        if let Some(resolution) = self.resolution {
            cfg.resolution = resolution;
        }
        if let Some(extent) = self.extent {
            cfg.extent = extent;
        }
        if let Some(scale) = self.ortho {
            cfg.ortho_scale = scale;
        }
        if let Some(distance) = self.distance {
            cfg.distance = distance;
        }
        if let Some(alpha) = self.alpha {
            cfg.alpha_threshold = alpha;
        }
        if let Some(min_votes) = self.min_votes {
            cfg.min_votes = min_votes;
        }
        if let Some(fov) = self.fov {
            cfg.fov_y_deg = fov;
        }
        if let Some(camera) = self.camera {
            cfg.camera = Some(camera.into());
        }

        cfg.symmetry |= self.symmetry;
        cfg.cardinal_only |= self.cardinal;
        if self.no_color {
            cfg.color = false;
        }

        if let Some(format) = self.format {
            cfg.format = format.into();
        } else if self.mesh {
            cfg.format = OutputFormat::Mesh;
        } else if self.vox {
            cfg.format = OutputFormat::Vox;
        }

        match (self.render_dir, self.render) {
            (Some(dir), _) => cfg.render = Some(dir),
            (None, true) if cfg.render.is_none() => cfg.render = Some(PathBuf::from("renders")),
            _ => {}
        }

        cfg
    }
}

fn init_logging() {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    info!("carve v{}", carve_rs::VERSION);

    let base = match &cli.config {
        Some(path) => ReconstructionConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReconstructionConfig::default(),
    };
    let cfg = cli.apply(base);
    cfg.validate().context("invalid configuration")?;

    let projection = cfg.projection()?;
    info!("Sprites:    {}", cfg.sprites_path.display());
    info!("Images:     {}", cfg.images_dir.display());
    info!("Camera:     {:?}, distance {}", projection, cfg.distance);
    info!(
        "Carving:    alpha < {}, min votes {}, symmetry {}",
        cfg.alpha_threshold, cfg.min_votes, cfg.symmetry
    );

    let outputs = carve_rs::run(&cfg).context("reconstruction failed")?;

    info!(
        "Done: {} surface voxels written to {}",
        outputs.surface_voxels,
        outputs.output_path.display()
    );
    if let Some(report) = &outputs.comparison {
        info!(
            "Comparisons: {} written, {} skipped",
            report.written.len(),
            report.failures.len()
        );
    }

    Ok(())
}
