//! HDRI environment map loading and sampling.

use std::f64::consts::PI;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glam::DVec3;

use super::RenderError;

/// Equirectangular environment map (RGBA f32 pixels).
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    /// RGBA f32 pixel data (4 floats per pixel)
    pub pixels_rgba32f: Vec<f32>,
}

impl fmt::Debug for EnvironmentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentMap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl EnvironmentMap {
    /// A 1×1 map of a single radiance value.
    pub fn uniform(r: f32, g: f32, b: f32) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels_rgba32f: vec![r, g, b, 1.0],
        }
    }

    /// Radiance seen along `direction` (nearest texel).
    ///
    /// Longitude follows the same x/z heading convention as the capture
    /// cameras; the top row of the image is straight up.
    pub fn sample(&self, direction: DVec3) -> [f32; 3] {
        let d = direction.try_normalize().unwrap_or(DVec3::Y);
        let u = 0.5 + d.z.atan2(d.x) / (2.0 * PI);
        let v = d.y.clamp(-1.0, 1.0).acos() / PI;

        let x = ((u * f64::from(self.width)) as u32).min(self.width.saturating_sub(1));
        let y = ((v * f64::from(self.height)) as u32).min(self.height.saturating_sub(1));
        let i = ((y * self.width + x) * 4) as usize;

        match self.pixels_rgba32f.get(i..i + 3) {
            Some(rgb) => [rgb[0], rgb[1], rgb[2]],
            None => [0.0; 3],
        }
    }
}

/// Load an HDRI environment map from a file path.
pub fn load_hdri<P: AsRef<Path>>(path: P) -> Result<EnvironmentMap, RenderError> {
    let data = std::fs::read(path)?;
    load_hdri_from_bytes(&data)
}

/// Load an HDRI environment map from bytes.
pub fn load_hdri_from_bytes(data: &[u8]) -> Result<EnvironmentMap, RenderError> {
    let img = image::load_from_memory(data).map_err(|e| RenderError::HdriDecode(e.to_string()))?;
    let rgb32f = img.to_rgb32f();
    let (w, h) = (rgb32f.width(), rgb32f.height());

    // Convert RGB32F → RGBA32F (add alpha=1.0)
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for pixel in rgb32f.pixels() {
        rgba.push(pixel[0]);
        rgba.push(pixel[1]);
        rgba.push(pixel[2]);
        rgba.push(1.0);
    }

    Ok(EnvironmentMap {
        width: w,
        height: h,
        pixels_rgba32f: rgba,
    })
}

/// Named studio/outdoor environments offered by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnvironmentPreset {
    #[default]
    Neutral,
    Venice,
    Footprint,
    Cathedral,
    Park,
}

impl EnvironmentPreset {
    pub const ALL: [EnvironmentPreset; 5] = [
        EnvironmentPreset::Neutral,
        EnvironmentPreset::Venice,
        EnvironmentPreset::Footprint,
        EnvironmentPreset::Cathedral,
        EnvironmentPreset::Park,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnvironmentPreset::Neutral => "neutral",
            EnvironmentPreset::Venice => "venice",
            EnvironmentPreset::Footprint => "footprint",
            EnvironmentPreset::Cathedral => "cathedral",
            EnvironmentPreset::Park => "park",
        }
    }

    /// Source of the 1k `.hdr` file for this preset.
    pub fn url(self) -> &'static str {
        match self {
            EnvironmentPreset::Neutral => {
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/studio_small_03_1k.hdr"
            }
            EnvironmentPreset::Venice => {
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/venice_sunset_1k.hdr"
            }
            EnvironmentPreset::Footprint => {
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/concrete_tunnel_02_1k.hdr"
            }
            EnvironmentPreset::Cathedral => {
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/immenstadter_horn_1k.hdr"
            }
            EnvironmentPreset::Park => {
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/kloppenheim_06_1k.hdr"
            }
        }
    }
}

impl FromStr for EnvironmentPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                format!("Unknown environment '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

impl fmt::Display for EnvironmentPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_one() -> EnvironmentMap {
        // Left texel red, right texel blue.
        EnvironmentMap {
            width: 2,
            height: 1,
            pixels_rgba32f: vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0],
        }
    }

    #[test]
    fn uniform_map_samples_everywhere() {
        let map = EnvironmentMap::uniform(0.25, 0.5, 0.75);
        for dir in [DVec3::X, DVec3::NEG_Y, DVec3::new(1.0, 1.0, -1.0)] {
            assert_eq!(map.sample(dir), [0.25, 0.5, 0.75]);
        }
    }

    #[test]
    fn sample_splits_by_longitude() {
        let map = two_by_one();
        // atan2(z, x) < 0 lands in the left half, > 0 in the right half.
        assert_eq!(map.sample(DVec3::new(0.0, 0.0, -1.0)), [1.0, 0.0, 0.0]);
        assert_eq!(map.sample(DVec3::new(0.0, 0.0, 1.0)), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn decodes_png_as_environment() {
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 0]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();

        let map = load_hdri_from_bytes(buf.get_ref()).unwrap();
        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.pixels_rgba32f.len(), 4 * 2 * 4);
        assert_eq!(map.sample(DVec3::X), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            load_hdri_from_bytes(&[1, 2, 3]),
            Err(RenderError::HdriDecode(_))
        ));
    }

    #[test]
    fn presets_parse_by_name() {
        assert_eq!("Venice".parse::<EnvironmentPreset>().unwrap(), EnvironmentPreset::Venice);
        assert!("moon".parse::<EnvironmentPreset>().is_err());
        for preset in EnvironmentPreset::ALL {
            assert!(preset.url().ends_with(".hdr"));
        }
    }
}
