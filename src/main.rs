//! Command-line export: load a model, frame it, and write the capture archive.
//!
//! Usage:
//!   turntable model.glb [--settings export.json] [--hdri studio.hdr]
//!       [--background transparent|environment|#rrggbb] [--yaw 45] [--pitch 30]
//!       [--zoom 1.0] [--output renders.zip]
//!
//! Set `RUST_LOG=turntable=debug` to log every captured shot.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use turntable::capture::geometry::camera_position_from_spherical;
use turntable::rendering::hdri::load_hdri;
use turntable::{
    export, BackgroundMode, CaptureExecutor, CaptureRequest, CaptureSettings, Color,
    EnvironmentMap, EnvironmentPreset, HeadlessViewer, RendererHost,
};

#[derive(Parser, Debug)]
#[command(name = "turntable")]
#[command(about = "Render a grid of model snapshots into a zip archive", long_about = None)]
struct Cli {
    /// glTF or GLB model
    model: PathBuf,

    /// JSON export settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// HDRI file, or a preset name (neutral, venice, footprint, cathedral, park)
    #[arg(long)]
    hdri: Option<String>,

    /// Background override: transparent, environment or #rrggbb
    #[arg(long)]
    background: Option<String>,

    /// Starting camera heading in degrees
    #[arg(long)]
    yaw: Option<f64>,

    /// Starting camera angle above the horizon in degrees [default: 30]
    #[arg(long)]
    pitch: Option<f64>,

    /// Starting camera zoom (distance divisor) [default: 1.0]
    #[arg(long)]
    zoom: Option<f64>,

    /// Viewport size the export starts from and returns to
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,

    #[arg(long, default_value_t = 720)]
    viewport_height: u32,

    /// Archive path (defaults to the settings' archive name)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Camera pose requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StartingPose {
    yaw: f64,
    pitch: f64,
    zoom: f64,
}

impl StartingPose {
    /// `None` when none of yaw, pitch or zoom was given; the fitted framing
    /// is kept as is.
    fn from_cli(cli: &Cli) -> Option<Self> {
        if cli.yaw.is_none() && cli.pitch.is_none() && cli.zoom.is_none() {
            return None;
        }
        Some(Self {
            yaw: cli.yaw.unwrap_or(45.0),
            pitch: cli.pitch.unwrap_or(30.0),
            zoom: cli.zoom.unwrap_or(1.0).max(1e-3),
        })
    }
}

type BoxError = Box<dyn std::error::Error>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("turntable=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoxError> {
    let mut settings = match &cli.settings {
        Some(path) => CaptureSettings::from_json_file(path)?,
        None => CaptureSettings::default(),
    };
    if let Some(bg) = &cli.background {
        settings.background = parse_background(bg)?;
    }

    let mut viewer = HeadlessViewer::new(cli.viewport_width, cli.viewport_height);

    let t = Instant::now();
    let bounds = load_bounds(&cli.model)?;
    viewer.load_model(bounds);
    info!(
        "Loaded {} in {:.1}ms (radius {:.3})",
        cli.model.display(),
        t.elapsed().as_secs_f64() * 1000.0,
        viewer.model_radius()
    );

    if let Some(hdri) = &cli.hdri {
        viewer.set_environment(load_environment(hdri)?);
    }
    viewer.set_background_mode(settings.background);

    if let Some(pose) = StartingPose::from_cli(&cli) {
        let distance = viewer.camera_position().length() / pose.zoom;
        viewer.set_camera_position(camera_position_from_spherical(
            pose.yaw,
            90.0 - pose.pitch,
            distance,
        ));
        viewer.look_at(viewer.controls_target());
    }

    info!("Exporting {} images", settings.total_images());

    let executor = CaptureExecutor::new();
    let request = CaptureRequest::from_settings(&settings);
    let t = Instant::now();
    let archive = export(&executor, &mut viewer, &request, |done, total| {
        info!("[{}/{}]", done, total);
    })?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&archive.name));
    std::fs::write(&output, &archive.bytes)?;
    info!(
        "Wrote {} images to {} ({} bytes) in {:.2}s",
        archive.image_count,
        output.display(),
        archive.bytes.len(),
        t.elapsed().as_secs_f64()
    );
    Ok(())
}

fn parse_background(value: &str) -> Result<BackgroundMode, BoxError> {
    match value {
        "transparent" => Ok(BackgroundMode::Transparent),
        "environment" => Ok(BackgroundMode::Environment),
        color => Ok(BackgroundMode::SolidColor {
            color: color.parse::<Color>()?,
        }),
    }
}

fn load_environment(value: &str) -> Result<EnvironmentMap, BoxError> {
    if Path::new(value).exists() {
        return Ok(load_hdri(value)?);
    }
    let preset: EnvironmentPreset = value.parse()?;
    warn!(
        "HDRI preset '{}' is not downloaded; fetch it from {} and pass the file path. Using a flat environment.",
        preset,
        preset.url()
    );
    Ok(EnvironmentMap::uniform(0.5, 0.5, 0.5))
}

#[cfg(feature = "gltf")]
fn load_bounds(path: &Path) -> Result<turntable::ModelBounds, BoxError> {
    Ok(turntable::model::load_model_bounds(path)?)
}

#[cfg(not(feature = "gltf"))]
fn load_bounds(path: &Path) -> Result<turntable::ModelBounds, BoxError> {
    Err(format!(
        "cannot load {}: built without the `gltf` feature",
        path.display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("turntable").chain(args.iter().copied()))
    }

    #[test]
    fn no_pose_flags_keep_fitted_view() {
        assert_eq!(StartingPose::from_cli(&parse(&["m.glb"])), None);
    }

    #[test]
    fn pitch_alone_sets_pose() {
        let pose = StartingPose::from_cli(&parse(&["m.glb", "--pitch", "60"])).unwrap();
        assert_eq!(
            pose,
            StartingPose {
                yaw: 45.0,
                pitch: 60.0,
                zoom: 1.0
            }
        );
    }

    #[test]
    fn zoom_and_yaw_set_pose() {
        let pose = StartingPose::from_cli(&parse(&["m.glb", "--zoom", "2", "--yaw", "10"])).unwrap();
        assert_eq!((pose.yaw, pose.pitch, pose.zoom), (10.0, 30.0, 2.0));
    }
}
