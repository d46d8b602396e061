//! Sequential capture of a plan against a live host.
//!
//! The host's camera and framebuffer are one shared resource, so shots are
//! taken strictly one after another and only one run may be active per
//! executor. A run moves through `Idle → RunningStep(i) → Restoring → Idle`;
//! the viewer snapshot taken on entry is written back on every exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use glam::DVec3;
use tracing::{debug, info, warn};

use super::plan::{CaptureDescriptor, CapturePlan};
use super::snapshot::ViewerSnapshot;
use super::{CaptureError, Result};
use crate::host::{Background, RendererHost};

/// Lifecycle of a capture run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    /// Processing the plan entry at this index.
    RunningStep(usize),
    Restoring,
}

/// A rendered shot and its archive file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Renderer configuration applied for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSetup {
    pub width: u32,
    pub height: u32,
    pub alpha: bool,
    pub background: Background,
}

impl ExportSetup {
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    fn apply<H: RendererHost + ?Sized>(&self, host: &mut H) {
        host.set_renderer_size(self.width, self.height);
        host.set_camera_aspect(self.aspect());
        host.set_alpha(self.alpha);
        host.set_background(self.background.clone());
    }
}

/// `{band}_{tag}_{heading}deg_{distance}.png`, with the heading rounded to the
/// nearest whole degree.
pub fn capture_filename(descriptor: &CaptureDescriptor) -> String {
    format!(
        "{}_{}_{}deg_{}.png",
        descriptor.band.name(),
        descriptor.position_tag(),
        descriptor.heading_degrees.round() as i64,
        descriptor.distance.label()
    )
}

/// Owns the run state and rejects overlapping runs.
#[derive(Debug, Default)]
pub struct CaptureExecutor {
    phase: Mutex<RunPhase>,
    cancel: AtomicBool,
}

impl CaptureExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        *self.lock_phase()
    }

    pub fn is_running(&self) -> bool {
        self.phase() != RunPhase::Idle
    }

    /// Ask the active run to stop after its current shot. The run still
    /// restores viewer state and then fails with [`CaptureError::Cancelled`].
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Claim the executor for one run.
    ///
    /// Fails with [`CaptureError::RunAlreadyInProgress`] while another run
    /// holds it. The claim is released when the returned [`CaptureRun`] drops.
    pub fn begin(&self) -> Result<CaptureRun<'_>> {
        let mut phase = self.lock_phase();
        if *phase != RunPhase::Idle {
            return Err(CaptureError::RunAlreadyInProgress);
        }
        *phase = RunPhase::RunningStep(0);
        self.cancel.store(false, Ordering::SeqCst);
        Ok(CaptureRun { executor: self })
    }

    fn set_phase(&self, next: RunPhase) {
        *self.lock_phase() = next;
    }

    // A poisoned lock only means a host panicked mid-run; the phase value is
    // still meaningful.
    fn lock_phase(&self) -> MutexGuard<'_, RunPhase> {
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An active claim on a [`CaptureExecutor`].
#[derive(Debug)]
pub struct CaptureRun<'a> {
    executor: &'a CaptureExecutor,
}

impl CaptureRun<'_> {
    /// Render every shot of `plan`, in order, and return the named PNGs in
    /// plan order.
    ///
    /// The host's state is snapshotted first and restored before returning,
    /// whether the run succeeds, fails or is cancelled. `on_progress` is
    /// called once per shot with `(completed, total)`.
    pub fn execute<H, F>(
        self,
        host: &mut H,
        plan: &CapturePlan,
        setup: &ExportSetup,
        mut on_progress: F,
    ) -> Result<Vec<CapturedImage>>
    where
        H: RendererHost + ?Sized,
        F: FnMut(usize, usize),
    {
        if plan.is_empty() {
            return Err(CaptureError::EmptyPlan);
        }

        let snapshot = ViewerSnapshot::capture(host);
        setup.apply(host);

        let outcome = self.run_steps(host, plan, setup, &mut on_progress);

        self.executor.set_phase(RunPhase::Restoring);
        if let Err(e) = snapshot.restore(host) {
            warn!("Re-render after restoring viewer state failed: {}", e);
        }

        outcome
    }

    fn run_steps<H, F>(
        &self,
        host: &mut H,
        plan: &CapturePlan,
        setup: &ExportSetup,
        on_progress: &mut F,
    ) -> Result<Vec<CapturedImage>>
    where
        H: RendererHost + ?Sized,
        F: FnMut(usize, usize),
    {
        let total = plan.len();
        let mut images = Vec::with_capacity(total);

        // Start from a known framing so no leftover interaction state leaks in.
        host.fit_model_in_view();

        for (index, descriptor) in plan.iter().enumerate() {
            if self.executor.cancel.load(Ordering::SeqCst) {
                info!(completed = index, total, "Capture cancelled");
                return Err(CaptureError::Cancelled {
                    completed: index,
                    total,
                });
            }
            self.executor.set_phase(RunPhase::RunningStep(index));

            if host.renderer_size() != (setup.width, setup.height) {
                warn!(
                    "Renderer size changed during capture; re-applying {}x{}",
                    setup.width, setup.height
                );
                host.set_renderer_size(setup.width, setup.height);
                host.set_camera_aspect(setup.aspect());
            }

            host.set_camera_position(descriptor.camera_position());
            host.look_at(DVec3::ZERO);

            let bytes = host
                .render()
                .and_then(|()| host.capture_png())
                .map_err(|source| CaptureError::RenderStepFailed {
                    descriptor: Box::new(descriptor.clone()),
                    source,
                })?;

            let filename = capture_filename(descriptor);
            debug!(step = index + 1, total, %filename, "Captured");
            images.push(CapturedImage { filename, bytes });

            on_progress(index + 1, total);
        }

        Ok(images)
    }
}

impl Drop for CaptureRun<'_> {
    fn drop(&mut self) {
        self.executor.set_phase(RunPhase::Idle);
    }
}
