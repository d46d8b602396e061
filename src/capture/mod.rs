//! Multi-angle capture pipeline.
//!
//! Turns a handful of user-facing parameters (enabled elevation bands, images
//! per band, angular spread, distance tiers) into an ordered list of camera
//! poses, renders each pose through a [`RendererHost`](crate::host::RendererHost),
//! and bundles the PNGs into a single zip archive.
//!
//! ```ignore
//! use turntable::capture::{export, CaptureExecutor, CaptureRequest};
//! use turntable::config::CaptureSettings;
//!
//! let executor = CaptureExecutor::new();
//! let request = CaptureRequest::from_settings(&CaptureSettings::default());
//! let archive = export(&executor, &mut viewer, &request, |done, total| {
//!     println!("{done}/{total}");
//! })?;
//! std::fs::write(&archive.name, &archive.bytes)?;
//! ```
//!
//! # Pipeline
//!
//! 1. [`geometry`] — heading spread and spherical camera placement.
//! 2. [`plan`] — bands × indices × distance tiers into a [`CapturePlan`].
//! 3. [`snapshot`] — viewer state saved before a run and restored after it.
//! 4. [`executor`] — sequential render of each planned shot.
//! 5. [`archive`] — named PNGs into one compressed zip.
//!
//! Viewer state is restored on every exit path once rendering has begun.

pub mod archive;
pub mod executor;
pub mod export;
pub mod geometry;
pub mod plan;
pub mod snapshot;

pub use archive::{assemble, DEFAULT_ARCHIVE_FOLDER, DEFAULT_ARCHIVE_NAME};
pub use executor::{capture_filename, CaptureExecutor, CaptureRun, CapturedImage, ExportSetup, RunPhase};
pub use export::{export, CaptureRequest, ExportArchive};
pub use geometry::{
    camera_position_from_spherical, compute_heading, current_heading_from_position,
    normalize_degrees,
};
pub use plan::{
    build_plan, Band, BandConfig, BandSettings, CaptureDescriptor, CapturePlan, DistanceSettings,
    DistanceTier, ResolvedDistance, MAX_BAND_COUNT,
};
pub use snapshot::ViewerSnapshot;

use crate::host::HostError;

/// Error type for capture runs.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No model loaded; load a model before exporting")]
    NoModelLoaded,
    #[error("Nothing to capture: enable at least one band with a non-zero count and at least one distance")]
    EmptyPlan,
    #[error("A capture run is already in progress")]
    RunAlreadyInProgress,
    #[error("Invalid capture parameter: {0}")]
    InvalidParameter(String),
    #[error("Render step failed for {descriptor}: {source}")]
    RenderStepFailed {
        descriptor: Box<CaptureDescriptor>,
        #[source]
        source: HostError,
    },
    #[error("Duplicate archive entry: {0}")]
    ArchiveConflict(String),
    #[error("Capture cancelled after {completed} of {total} images")]
    Cancelled { completed: usize, total: usize },
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
