//! End-to-end export: request → plan → capture → archive.

use tracing::info;

use super::archive::assemble;
use super::executor::{CaptureExecutor, ExportSetup};
use super::geometry::current_heading_from_position;
use super::plan::{build_plan, BandSettings, DistanceSettings};
use super::{CaptureError, Result};
use crate::config::{BackgroundMode, CaptureSettings};
use crate::host::RendererHost;

/// Everything the application hands the pipeline for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub bands: BandSettings,
    pub distances: DistanceSettings,
    pub background: BackgroundMode,
    pub export_width: u32,
    pub export_height: u32,
    pub archive_folder: String,
    pub archive_name: String,
    /// Heading the bands are centered on. When `None`, the host camera's live
    /// heading is read at export time.
    pub reference_heading: Option<f64>,
}

impl CaptureRequest {
    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self {
            bands: settings.bands.clone(),
            distances: settings.distances,
            background: settings.background,
            export_width: settings.export_width,
            export_height: settings.export_height,
            archive_folder: settings.archive_folder.clone(),
            archive_name: settings.archive_name.clone(),
            reference_heading: None,
        }
    }

    pub fn with_reference_heading(mut self, degrees: f64) -> Self {
        self.reference_heading = Some(degrees);
        self
    }

    /// Renderer state for the run, resolving the environment from the host.
    fn export_setup<H: RendererHost + ?Sized>(&self, host: &H) -> ExportSetup {
        let (alpha, background) = self.background.resolve(host.environment_map());
        ExportSetup {
            width: self.export_width,
            height: self.export_height,
            alpha,
            background,
        }
    }
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self::from_settings(&CaptureSettings::default())
    }
}

/// A finished archive ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArchive {
    /// Suggested file name.
    pub name: String,
    pub bytes: Vec<u8>,
    pub image_count: usize,
}

/// Run a full export against `host`.
///
/// The close distance is the camera's live distance to the model center and
/// the reference heading is the camera's live heading, both read before
/// anything on the host is touched. No host state changes when the request
/// is rejected up front (`RunAlreadyInProgress`, `NoModelLoaded`,
/// `InvalidParameter`, `EmptyPlan`).
pub fn export<H, F>(
    executor: &CaptureExecutor,
    host: &mut H,
    request: &CaptureRequest,
    on_progress: F,
) -> Result<ExportArchive>
where
    H: RendererHost + ?Sized,
    F: FnMut(usize, usize),
{
    let run = executor.begin()?;

    if !host.has_model() {
        return Err(CaptureError::NoModelLoaded);
    }

    let camera = host.camera_position();
    let reference_heading = request
        .reference_heading
        .unwrap_or_else(|| current_heading_from_position(camera));
    let close_distance = camera.distance(host.model_center());
    if !(close_distance.is_finite() && close_distance > 0.0) {
        return Err(CaptureError::InvalidParameter(format!(
            "camera distance to model center must be positive and finite, got {}",
            close_distance
        )));
    }

    let distances = request.distances.resolve(close_distance);
    let plan = build_plan(&request.bands, reference_heading, &distances)?;

    info!(
        images = plan.len(),
        reference_heading,
        close_distance,
        "Starting capture export"
    );

    let setup = request.export_setup(host);
    let images = run.execute(host, &plan, &setup, on_progress)?;
    let bytes = assemble(&images, &request.archive_folder)?;

    Ok(ExportArchive {
        name: request.archive_name.clone(),
        bytes,
        image_count: images.len(),
    })
}
