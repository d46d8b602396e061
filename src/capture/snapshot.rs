//! Viewer state saved around a capture run.

use glam::DVec3;
use tracing::debug;

use crate::host::{Background, HostError, RendererHost};

/// Everything a capture run mutates on the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSnapshot {
    pub camera_position: DVec3,
    pub controls_target: DVec3,
    pub camera_aspect: f64,
    pub renderer_size: (u32, u32),
    pub alpha: bool,
    pub background: Background,
}

impl ViewerSnapshot {
    /// Read the host's current state without mutating it.
    pub fn capture<H: RendererHost + ?Sized>(host: &H) -> Self {
        Self {
            camera_position: host.camera_position(),
            controls_target: host.controls_target(),
            camera_aspect: host.camera_aspect(),
            renderer_size: host.renderer_size(),
            alpha: host.alpha(),
            background: host.background(),
        }
    }

    /// Write every field back, then re-render once at the original size so the
    /// live view shows the pre-export state.
    ///
    /// All fields are written even if the final render fails.
    pub fn restore<H: RendererHost + ?Sized>(self, host: &mut H) -> Result<(), HostError> {
        let (width, height) = self.renderer_size;
        host.set_renderer_size(width, height);
        host.set_camera_aspect(self.camera_aspect);
        host.set_camera_position(self.camera_position);
        host.set_controls_target(self.controls_target);
        host.look_at(self.controls_target);
        host.set_alpha(self.alpha);
        host.set_background(self.background);

        debug!(width, height, "Restored viewer state");
        host.render()
    }
}
