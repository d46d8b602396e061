//! Turntable: multi-angle capture export for 3D model viewers.
//!
//! Turns a handful of export settings (elevation bands, shots per band,
//! angular spread, distance tiers) into an ordered camera plan, renders each
//! shot through a [`RendererHost`], and packs the PNGs into one zip archive.
//! The viewer's camera, output size and background are restored afterwards.
//!
//! ```no_run
//! use turntable::{export, CaptureExecutor, CaptureRequest, HeadlessViewer, ModelBounds};
//! use glam::DVec3;
//!
//! let mut viewer = HeadlessViewer::new(800, 600);
//! viewer.load_model(ModelBounds::from_size(DVec3::new(2.0, 1.0, 1.0)));
//!
//! let executor = CaptureExecutor::new();
//! let archive = export(&executor, &mut viewer, &CaptureRequest::default(), |done, total| {
//!     println!("{}/{}", done, total);
//! })?;
//! std::fs::write(&archive.name, &archive.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod capture;
pub mod config;
pub mod host;
pub mod model;
pub mod rendering;
pub mod viewer;

pub use capture::{
    assemble, capture_filename, export, CaptureError, CaptureExecutor, CaptureRequest,
    CapturedImage, ExportArchive, RunPhase, ViewerSnapshot,
};
pub use capture::plan::{
    build_plan, Band, BandConfig, BandSettings, CaptureDescriptor, CapturePlan, DistanceSettings,
    DistanceTier, MAX_BAND_COUNT,
};
pub use config::{BackgroundMode, CaptureSettings, ConfigError};
pub use host::{Background, Color, HostError, RendererHost};
pub use model::{ModelBounds, ModelError};
pub use rendering::{EnvironmentMap, EnvironmentPreset, RenderError};
pub use viewer::HeadlessViewer;
