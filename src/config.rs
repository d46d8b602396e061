//! Export settings.
//!
//! Every field has a default, so a settings file only needs to name what it
//! changes:
//!
//! ```json
//! {
//!   "bands": { "bottom": { "enabled": false }, "top": { "count": 5 } },
//!   "distances": { "close": true, "far": true },
//!   "background": { "type": "solid-color", "color": "#20232a" }
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capture::archive::{DEFAULT_ARCHIVE_FOLDER, DEFAULT_ARCHIVE_NAME};
use crate::capture::plan::{
    Band, BandConfig, BandSettings, DistanceSettings, DistanceTier, MAX_BAND_COUNT,
};
use crate::host::{Background, Color};
use crate::rendering::hdri::EnvironmentMap;

pub const DEFAULT_EXPORT_SIZE: u32 = 1024;

/// Error type for loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Background used for exported images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackgroundMode {
    #[default]
    Transparent,
    SolidColor {
        color: Color,
    },
    /// The host's loaded environment map.
    Environment,
}

impl BackgroundMode {
    /// Renderer `(alpha, background)` for this mode. `Environment` falls back
    /// to an empty background while no environment map is loaded.
    pub fn resolve(self, environment: Option<Arc<EnvironmentMap>>) -> (bool, Background) {
        match self {
            BackgroundMode::Transparent => (true, Background::None),
            BackgroundMode::SolidColor { color } => (false, Background::Color(color)),
            BackgroundMode::Environment => (
                false,
                environment.map(Background::Environment).unwrap_or_default(),
            ),
        }
    }
}

/// All user-facing export parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub bands: BandSettings,
    pub distances: DistanceSettings,
    pub background: BackgroundMode,
    pub export_width: u32,
    pub export_height: u32,
    pub archive_folder: String,
    pub archive_name: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            bands: BandSettings::default(),
            distances: DistanceSettings::default(),
            background: BackgroundMode::default(),
            export_width: DEFAULT_EXPORT_SIZE,
            export_height: DEFAULT_EXPORT_SIZE,
            archive_folder: DEFAULT_ARCHIVE_FOLDER.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl CaptureSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.export_width == 0 || self.export_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "export size must be non-zero, got {}x{}",
                self.export_width, self.export_height
            )));
        }
        for (band, config) in self.bands.iter() {
            if config.count > MAX_BAND_COUNT {
                return Err(ConfigError::Invalid(format!(
                    "{} band count {} exceeds {}",
                    band, config.count, MAX_BAND_COUNT
                )));
            }
            if !config.rotation_range_degrees.is_finite() || !config.elevation_degrees.is_finite()
            {
                return Err(ConfigError::Invalid(format!(
                    "{} band angles must be finite",
                    band
                )));
            }
        }
        Ok(())
    }

    /// Number of images an export with these settings produces.
    pub fn total_images(&self) -> u64 {
        self.bands.enabled_count() * self.distances.enabled_count() as u64
    }

    pub fn with_band(mut self, band: Band, config: BandConfig) -> Self {
        self.bands = self.bands.with_band(band, config);
        self
    }

    pub fn with_distance(mut self, tier: DistanceTier, enabled: bool) -> Self {
        self.distances = self.distances.with_tier(tier, enabled);
        self
    }

    pub fn with_background(mut self, background: BackgroundMode) -> Self {
        self.background = background;
        self
    }

    pub fn with_export_size(mut self, width: u32, height: u32) -> Self {
        self.export_width = width;
        self.export_height = height;
        self
    }

    pub fn with_archive_folder(mut self, folder: impl Into<String>) -> Self {
        self.archive_folder = folder.into();
        self
    }
}
