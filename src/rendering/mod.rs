//! Offscreen rendering for the headless viewer.
//!
//! Produces RGBA frames of a model's bounding volume on the CPU and encodes
//! them as PNG. Supports a transparent, solid-color or HDRI environment
//! background.
//!
//! # Coordinates
//! World space is Y-up with the model centered on the origin. Headings are
//! measured in the x/z plane as `atan2(z, x)`.

pub mod camera;
pub mod hdri;
pub mod overlay;
pub mod raycast;

pub use camera::CameraRig;
pub use hdri::{EnvironmentMap, EnvironmentPreset};
pub use overlay::{normalization_square, SquareOverlay};
pub use raycast::{render_frame, FrameView};

/// Errors that can occur during rendering.
#[derive(Debug)]
pub enum RenderError {
    /// PNG encoding failed.
    PngEncode(String),
    /// Environment image could not be decoded.
    HdriDecode(String),
    /// Pixel buffer does not match the frame size.
    InvalidFrame(String),
    /// I/O error.
    Io(std::io::Error),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PngEncode(e) => write!(f, "PNG encoding failed: {}", e),
            Self::HdriDecode(e) => write!(f, "HDRI decoding failed: {}", e),
            Self::InvalidFrame(e) => write!(f, "Invalid frame: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A rendered RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, 4 bytes per pixel.
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels
            .get(i..i + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.pixels, self.width, self.height)
    }
}

/// Encode RGBA pixels to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(RenderError::InvalidFrame(format!(
            "expected {} bytes for {}x{}, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }
    let img = image::RgbaImage::from_raw(width, height, pixels.to_vec())
        .ok_or_else(|| RenderError::PngEncode("Failed to create image from pixels".into()))?;
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    Ok(buf.into_inner())
}
