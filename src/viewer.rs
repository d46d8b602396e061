//! A windowless viewer implementing [`RendererHost`].
//!
//! Holds the same state an interactive viewer would (camera, orbit pivot,
//! output size, alpha and background) and draws with the CPU raycaster, so
//! exports can run from the command line or in tests.

use std::sync::Arc;

use glam::DVec3;
use tracing::debug;

use crate::config::BackgroundMode;
use crate::host::{Background, HostError, RendererHost};
use crate::model::ModelBounds;
use crate::rendering::camera::{fit_position, CameraRig};
use crate::rendering::hdri::EnvironmentMap;
use crate::rendering::raycast::{render_frame, FrameView};
use crate::rendering::Frame;

#[derive(Debug)]
pub struct HeadlessViewer {
    bounds: Option<ModelBounds>,
    camera: CameraRig,
    controls_target: DVec3,
    width: u32,
    height: u32,
    alpha: bool,
    background: Background,
    environment: Option<Arc<EnvironmentMap>>,
    last_frame: Option<Frame>,
}

impl HeadlessViewer {
    pub fn new(width: u32, height: u32) -> Self {
        let camera = CameraRig {
            aspect: f64::from(width) / f64::from(height.max(1)),
            ..CameraRig::default()
        };
        Self {
            bounds: None,
            camera,
            controls_target: DVec3::ZERO,
            width,
            height,
            alpha: true,
            background: Background::None,
            environment: None,
            last_frame: None,
        }
    }

    /// Replace the model. The bounds are recentered on the origin and the
    /// camera reframed.
    pub fn load_model(&mut self, bounds: ModelBounds) {
        let centered = bounds.centered();
        debug!(
            size = ?centered.size(),
            offset = ?bounds.center(),
            "Model loaded"
        );
        self.bounds = Some(centered);
        self.fit_model_in_view();
    }

    pub fn clear_model(&mut self) {
        self.bounds = None;
    }

    pub fn model_bounds(&self) -> Option<&ModelBounds> {
        self.bounds.as_ref()
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Install a new environment map. A background currently showing the
    /// environment switches to the new one.
    pub fn set_environment(&mut self, environment: EnvironmentMap) {
        let environment = Arc::new(environment);
        if matches!(self.background, Background::Environment(_)) {
            self.background = Background::Environment(Arc::clone(&environment));
        }
        self.environment = Some(environment);
    }

    /// Apply a background choice to the live view.
    pub fn set_background_mode(&mut self, mode: BackgroundMode) {
        let (alpha, background) = mode.resolve(self.environment.clone());
        self.alpha = alpha;
        self.background = background;
    }

    /// Window resize: new output size and matching aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.camera.aspect = f64::from(width) / f64::from(height.max(1));
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }
}

impl Default for HeadlessViewer {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

impl RendererHost for HeadlessViewer {
    fn has_model(&self) -> bool {
        self.bounds.is_some()
    }

    fn model_center(&self) -> DVec3 {
        self.bounds.map(|b| b.center()).unwrap_or(DVec3::ZERO)
    }

    fn model_radius(&self) -> f64 {
        self.bounds.map(|b| b.radius()).unwrap_or(1.0)
    }

    fn camera_position(&self) -> DVec3 {
        self.camera.position
    }

    fn set_camera_position(&mut self, position: DVec3) {
        self.camera.position = position;
    }

    fn look_at(&mut self, target: DVec3) {
        self.camera.look_target = target;
    }

    fn controls_target(&self) -> DVec3 {
        self.controls_target
    }

    fn set_controls_target(&mut self, target: DVec3) {
        self.controls_target = target;
    }

    fn camera_aspect(&self) -> f64 {
        self.camera.aspect
    }

    fn set_camera_aspect(&mut self, aspect: f64) {
        self.camera.aspect = aspect;
    }

    fn renderer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_renderer_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn alpha(&self) -> bool {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: bool) {
        self.alpha = alpha;
    }

    fn background(&self) -> Background {
        self.background.clone()
    }

    fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    fn environment_map(&self) -> Option<Arc<EnvironmentMap>> {
        self.environment.clone()
    }

    fn fit_model_in_view(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        self.camera.position = fit_position(bounds.size(), self.camera.fov_deg, self.camera.aspect);
        self.camera.look_target = DVec3::ZERO;
        self.controls_target = DVec3::ZERO;
    }

    fn render(&mut self) -> Result<(), HostError> {
        if self.width == 0 || self.height == 0 {
            return Err(HostError::Render(format!(
                "cannot render a {}x{} frame",
                self.width, self.height
            )));
        }
        let view = FrameView {
            camera: &self.camera,
            bounds: self.bounds.as_ref(),
            width: self.width,
            height: self.height,
            alpha: self.alpha,
            background: &self.background,
        };
        self.last_frame = Some(render_frame(&view));
        Ok(())
    }

    fn capture_png(&mut self) -> Result<Vec<u8>, HostError> {
        let frame = self
            .last_frame
            .as_ref()
            .ok_or_else(|| HostError::Encode("no frame has been rendered".into()))?;
        frame.to_png().map_err(|e| HostError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Color;

    #[test]
    fn new_viewer_is_empty_and_transparent() {
        let viewer = HeadlessViewer::new(800, 400);
        assert!(!viewer.has_model());
        assert_eq!(viewer.model_radius(), 1.0);
        assert_eq!(viewer.camera_aspect(), 2.0);
        assert!(viewer.alpha());
        assert_eq!(viewer.background(), Background::None);
    }

    #[test]
    fn load_model_centers_and_frames() {
        let mut viewer = HeadlessViewer::new(64, 64);
        viewer.load_model(ModelBounds::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(12.0, 4.0, 2.0)));

        assert_eq!(viewer.model_center(), DVec3::ZERO);
        assert_eq!(viewer.model_radius(), 2.0);
        let p = viewer.camera_position();
        assert!(p.x > 0.0 && p.x == p.z);
        assert_eq!(viewer.controls_target(), DVec3::ZERO);
    }

    #[test]
    fn capture_requires_a_rendered_frame() {
        let mut viewer = HeadlessViewer::new(8, 8);
        assert!(matches!(viewer.capture_png(), Err(HostError::Encode(_))));
        viewer.render().unwrap();
        let png = viewer.capture_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn zero_size_render_fails() {
        let mut viewer = HeadlessViewer::new(8, 8);
        viewer.set_renderer_size(0, 8);
        assert!(matches!(viewer.render(), Err(HostError::Render(_))));
    }

    #[test]
    fn environment_background_follows_new_map() {
        let mut viewer = HeadlessViewer::new(8, 8);
        viewer.set_background_mode(BackgroundMode::Environment);
        assert_eq!(viewer.background(), Background::None);

        viewer.set_environment(EnvironmentMap::uniform(1.0, 1.0, 1.0));
        assert!(matches!(viewer.background(), Background::None));

        viewer.set_background_mode(BackgroundMode::Environment);
        let first = viewer.environment_map().unwrap();
        assert_eq!(viewer.background(), Background::Environment(first));

        viewer.set_environment(EnvironmentMap::uniform(0.0, 0.0, 0.0));
        let second = viewer.environment_map().unwrap();
        assert_eq!(viewer.background(), Background::Environment(second));
        assert!(!viewer.alpha());
    }

    #[test]
    fn solid_background_mode_disables_alpha() {
        let mut viewer = HeadlessViewer::new(8, 8);
        viewer.set_background_mode(BackgroundMode::SolidColor { color: Color::BLACK });
        assert!(!viewer.alpha());
        assert_eq!(viewer.background(), Background::Color(Color::BLACK));
    }

    #[test]
    fn resize_updates_aspect() {
        let mut viewer = HeadlessViewer::new(8, 8);
        viewer.resize(300, 100);
        assert_eq!(viewer.renderer_size(), (300, 100));
        assert_eq!(viewer.camera_aspect(), 3.0);
    }
}
