//! The narrow capability interface a viewer exposes to the capture pipeline.
//!
//! The pipeline never touches a viewer's fields directly. Anything that can
//! move a camera, render a frame and hand back PNG bytes can be captured,
//! whether that is the bundled [`HeadlessViewer`](crate::viewer::HeadlessViewer)
//! or a GPU-backed application.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::rendering::hdri::EnvironmentMap;

/// Error reported by a host for a failed frame.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Frame render failed: {0}")]
    Render(String),
    #[error("Frame encode failed: {0}")]
    Encode(String),
}

/// 8-bit sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("Invalid color '{}': expected #rrggbb", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| format!("Invalid color '{}': expected #rrggbb", s))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// What the renderer draws behind the model.
#[derive(Debug, Clone, Default)]
pub enum Background {
    /// Nothing; the clear color shows (transparent when alpha is on).
    #[default]
    None,
    Color(Color),
    Environment(Arc<EnvironmentMap>),
}

/// Environment backgrounds compare by identity, not by pixel content.
impl PartialEq for Background {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Background::None, Background::None) => true,
            (Background::Color(a), Background::Color(b)) => a == b,
            (Background::Environment(a), Background::Environment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Renderer/scene host driven by the capture pipeline.
///
/// Positions are in world space with the loaded model centered on the origin.
pub trait RendererHost {
    fn has_model(&self) -> bool;

    /// Center of the model's bounding box.
    fn model_center(&self) -> DVec3;

    /// Half the largest bounding-box dimension, or 1.0 with no model loaded.
    fn model_radius(&self) -> f64;

    fn camera_position(&self) -> DVec3;
    fn set_camera_position(&mut self, position: DVec3);

    /// Orient the camera towards `target`.
    fn look_at(&mut self, target: DVec3);

    /// Orbit-control pivot.
    fn controls_target(&self) -> DVec3;
    fn set_controls_target(&mut self, target: DVec3);

    fn camera_aspect(&self) -> f64;
    fn set_camera_aspect(&mut self, aspect: f64);

    /// Renderer output size in pixels.
    fn renderer_size(&self) -> (u32, u32);
    fn set_renderer_size(&mut self, width: u32, height: u32);

    /// Whether the output carries an alpha channel.
    fn alpha(&self) -> bool;
    fn set_alpha(&mut self, alpha: bool);

    fn background(&self) -> Background;
    fn set_background(&mut self, background: Background);

    /// Currently loaded environment map, if any.
    fn environment_map(&self) -> Option<Arc<EnvironmentMap>>;

    /// Reset the camera to a framing that shows the whole model.
    fn fit_model_in_view(&mut self);

    /// Render one frame synchronously at the current renderer size.
    fn render(&mut self) -> Result<(), HostError>;

    /// The most recently rendered frame, PNG encoded.
    fn capture_png(&mut self) -> Result<Vec<u8>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_hex() {
        assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::new(255, 128, 0));
        assert_eq!("00FF7f".parse::<Color>().unwrap(), Color::new(0, 255, 127));
    }

    #[test]
    fn color_rejects_malformed_input() {
        assert!("#fff".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn color_displays_as_hex() {
        assert_eq!(Color::new(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn environment_backgrounds_compare_by_identity() {
        let map = Arc::new(EnvironmentMap::uniform(1.0, 1.0, 1.0));
        let same = Background::Environment(Arc::clone(&map));
        let other = Background::Environment(Arc::new(EnvironmentMap::uniform(1.0, 1.0, 1.0)));
        assert_eq!(Background::Environment(map), same);
        assert_ne!(same, other);
        assert_ne!(Background::None, Background::Color(Color::BLACK));
    }
}
