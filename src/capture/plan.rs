//! Capture plan building.
//!
//! A plan is the ordered list of camera poses for one export run. Ordering is
//! band (top, middle, bottom), then index within the band, then distance tier
//! (close, medium, far). The same inputs always produce the same plan.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::geometry::{camera_position_from_spherical, compute_heading, normalize_degrees};
use super::{CaptureError, Result};

/// Elevation bands in their declared capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Top,
    Middle,
    Bottom,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Top, Band::Middle, Band::Bottom];

    pub fn name(self) -> &'static str {
        match self {
            Band::Top => "top",
            Band::Middle => "middle",
            Band::Bottom => "bottom",
        }
    }

    /// Elevation used when a band is not configured explicitly.
    pub fn default_elevation(self) -> f64 {
        match self {
            Band::Top => 45.0,
            Band::Middle => 90.0,
            Band::Bottom => 135.0,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for one elevation band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub enabled: bool,
    /// Number of images in this band.
    pub count: u32,
    /// Total angular spread, centered on the reference heading.
    pub rotation_range_degrees: f64,
    /// Polar angle measured from the vertical axis.
    pub elevation_degrees: f64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 3,
            rotation_range_degrees: 120.0,
            elevation_degrees: 90.0,
        }
    }
}

impl BandConfig {
    pub fn new(elevation_degrees: f64) -> Self {
        Self {
            elevation_degrees,
            ..Default::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_rotation_range(mut self, degrees: f64) -> Self {
        self.rotation_range_degrees = degrees;
        self
    }

    pub fn with_elevation(mut self, degrees: f64) -> Self {
        self.elevation_degrees = degrees;
        self
    }

    /// Number of shots this band contributes per distance tier.
    pub fn effective_count(&self) -> u32 {
        if self.enabled {
            self.count
        } else {
            0
        }
    }
}

/// The three elevation bands of a capture.
///
/// Fields omitted when deserializing fall back to that band's defaults, so a
/// partially specified `top` still keeps the top elevation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BandSettingsPatch")]
pub struct BandSettings {
    pub top: BandConfig,
    pub middle: BandConfig,
    pub bottom: BandConfig,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self {
            top: BandConfig::new(Band::Top.default_elevation()),
            middle: BandConfig::new(Band::Middle.default_elevation()),
            bottom: BandConfig::new(Band::Bottom.default_elevation()),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BandConfigPatch {
    enabled: Option<bool>,
    count: Option<u32>,
    rotation_range_degrees: Option<f64>,
    elevation_degrees: Option<f64>,
}

impl BandConfigPatch {
    fn apply(self, band: Band) -> BandConfig {
        let base = BandConfig::new(band.default_elevation());
        BandConfig {
            enabled: self.enabled.unwrap_or(base.enabled),
            count: self.count.unwrap_or(base.count),
            rotation_range_degrees: self
                .rotation_range_degrees
                .unwrap_or(base.rotation_range_degrees),
            elevation_degrees: self.elevation_degrees.unwrap_or(base.elevation_degrees),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BandSettingsPatch {
    top: BandConfigPatch,
    middle: BandConfigPatch,
    bottom: BandConfigPatch,
}

impl From<BandSettingsPatch> for BandSettings {
    fn from(patch: BandSettingsPatch) -> Self {
        Self {
            top: patch.top.apply(Band::Top),
            middle: patch.middle.apply(Band::Middle),
            bottom: patch.bottom.apply(Band::Bottom),
        }
    }
}

impl BandSettings {
    /// All bands disabled, keeping their default elevations.
    pub fn none() -> Self {
        let mut settings = Self::default();
        for band in Band::ALL {
            settings.get_mut(band).enabled = false;
        }
        settings
    }

    pub fn get(&self, band: Band) -> &BandConfig {
        match band {
            Band::Top => &self.top,
            Band::Middle => &self.middle,
            Band::Bottom => &self.bottom,
        }
    }

    pub fn get_mut(&mut self, band: Band) -> &mut BandConfig {
        match band {
            Band::Top => &mut self.top,
            Band::Middle => &mut self.middle,
            Band::Bottom => &mut self.bottom,
        }
    }

    pub fn with_band(mut self, band: Band, config: BandConfig) -> Self {
        *self.get_mut(band) = config;
        self
    }

    /// Bands in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Band, &BandConfig)> {
        Band::ALL.into_iter().map(move |band| (band, self.get(band)))
    }

    /// Sum of image counts over enabled bands.
    pub fn enabled_count(&self) -> u64 {
        self.iter()
            .map(|(_, config)| u64::from(config.effective_count()))
            .sum()
    }
}

/// Camera distance tiers in their declared capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceTier {
    Close,
    Medium,
    Far,
}

impl DistanceTier {
    pub const ALL: [DistanceTier; 3] = [DistanceTier::Close, DistanceTier::Medium, DistanceTier::Far];

    pub fn label(self) -> &'static str {
        match self {
            DistanceTier::Close => "close",
            DistanceTier::Medium => "medium",
            DistanceTier::Far => "far",
        }
    }

    /// Factor applied to the close distance.
    pub fn multiplier(self) -> f64 {
        match self {
            DistanceTier::Close => 1.0,
            DistanceTier::Medium => 1.75,
            DistanceTier::Far => 3.0,
        }
    }

    pub fn resolve(self, close_distance: f64) -> ResolvedDistance {
        ResolvedDistance {
            tier: self,
            value: close_distance * self.multiplier(),
        }
    }
}

impl fmt::Display for DistanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which distance tiers to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceSettings {
    pub close: bool,
    pub medium: bool,
    pub far: bool,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self {
            close: true,
            medium: false,
            far: false,
        }
    }
}

impl DistanceSettings {
    pub fn all() -> Self {
        Self {
            close: true,
            medium: true,
            far: true,
        }
    }

    pub fn none() -> Self {
        Self {
            close: false,
            medium: false,
            far: false,
        }
    }

    pub fn is_enabled(&self, tier: DistanceTier) -> bool {
        match tier {
            DistanceTier::Close => self.close,
            DistanceTier::Medium => self.medium,
            DistanceTier::Far => self.far,
        }
    }

    pub fn with_tier(mut self, tier: DistanceTier, enabled: bool) -> Self {
        match tier {
            DistanceTier::Close => self.close = enabled,
            DistanceTier::Medium => self.medium = enabled,
            DistanceTier::Far => self.far = enabled,
        }
        self
    }

    pub fn enabled_count(&self) -> usize {
        DistanceTier::ALL
            .into_iter()
            .filter(|tier| self.is_enabled(*tier))
            .count()
    }

    /// Enabled tiers in declared order, scaled from `close_distance`.
    ///
    /// `close_distance` is the viewer's live camera-to-model distance at the
    /// moment the export starts.
    pub fn resolve(&self, close_distance: f64) -> Vec<ResolvedDistance> {
        DistanceTier::ALL
            .into_iter()
            .filter(|tier| self.is_enabled(*tier))
            .map(|tier| tier.resolve(close_distance))
            .collect()
    }
}

/// A distance tier with its concrete camera distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDistance {
    pub tier: DistanceTier,
    pub value: f64,
}

/// One planned shot.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureDescriptor {
    pub band: Band,
    pub index_in_band: u32,
    pub total_in_band: u32,
    /// Always within `[0, 360)`.
    pub heading_degrees: f64,
    pub elevation_degrees: f64,
    pub distance: DistanceTier,
    pub distance_value: f64,
}

impl CaptureDescriptor {
    pub fn camera_position(&self) -> DVec3 {
        camera_position_from_spherical(
            self.heading_degrees,
            self.elevation_degrees,
            self.distance_value,
        )
    }

    /// Where this shot sits in its band: `center` for single-shot bands,
    /// `start`/`end` for the endpoints, else the index.
    pub fn position_tag(&self) -> String {
        if self.total_in_band == 1 {
            "center".to_string()
        } else if self.index_in_band == 0 {
            "start".to_string()
        } else if self.index_in_band + 1 == self.total_in_band {
            "end".to_string()
        } else {
            self.index_in_band.to_string()
        }
    }
}

impl fmt::Display for CaptureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} at {:.1}° ({} {:.3})",
            self.band,
            self.index_in_band + 1,
            self.total_in_band,
            self.heading_degrees,
            self.distance,
            self.distance_value
        )
    }
}

/// Ordered list of shots for one export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapturePlan {
    descriptors: Vec<CaptureDescriptor>,
}

impl CapturePlan {
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaptureDescriptor> {
        self.descriptors.iter()
    }

    pub fn descriptors(&self) -> &[CaptureDescriptor] {
        &self.descriptors
    }
}

impl<'a> IntoIterator for &'a CapturePlan {
    type Item = &'a CaptureDescriptor;
    type IntoIter = std::slice::Iter<'a, CaptureDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

/// Upper bound on shots per band.
pub const MAX_BAND_COUNT: u32 = 3600;

fn check_inputs(
    bands: &BandSettings,
    reference_heading_degrees: f64,
    distances: &[ResolvedDistance],
) -> Result<()> {
    let invalid = |msg: String| Err(CaptureError::InvalidParameter(msg));

    if !reference_heading_degrees.is_finite() {
        return invalid(format!(
            "reference heading must be finite, got {}",
            reference_heading_degrees
        ));
    }
    for (band, config) in bands.iter().filter(|(_, c)| c.effective_count() > 0) {
        if config.count > MAX_BAND_COUNT {
            return invalid(format!(
                "{} band count {} exceeds {}",
                band, config.count, MAX_BAND_COUNT
            ));
        }
        if !config.rotation_range_degrees.is_finite() {
            return invalid(format!(
                "{} band rotation range must be finite, got {}",
                band, config.rotation_range_degrees
            ));
        }
        if !config.elevation_degrees.is_finite() {
            return invalid(format!(
                "{} band elevation must be finite, got {}",
                band, config.elevation_degrees
            ));
        }
    }
    for distance in distances {
        if !(distance.value.is_finite() && distance.value > 0.0) {
            return invalid(format!(
                "{} distance must be positive and finite, got {}",
                distance.tier, distance.value
            ));
        }
    }
    Ok(())
}

/// Expand band and distance settings into an ordered capture plan.
///
/// Returns [`CaptureError::EmptyPlan`] when no band contributes an image or
/// no distance tier is enabled, and [`CaptureError::InvalidParameter`] for a
/// non-finite angle, a non-positive distance or a band count above
/// [`MAX_BAND_COUNT`].
pub fn build_plan(
    bands: &BandSettings,
    reference_heading_degrees: f64,
    distances: &[ResolvedDistance],
) -> Result<CapturePlan> {
    let total = bands.enabled_count() * distances.len() as u64;
    if total == 0 {
        return Err(CaptureError::EmptyPlan);
    }
    check_inputs(bands, reference_heading_degrees, distances)?;

    let reference = normalize_degrees(reference_heading_degrees);
    let mut descriptors = Vec::with_capacity(total as usize);

    for (band, config) in bands.iter() {
        let count = config.effective_count();
        for index in 0..count {
            let heading = compute_heading(reference, count, index, config.rotation_range_degrees);
            for distance in distances {
                descriptors.push(CaptureDescriptor {
                    band,
                    index_in_band: index,
                    total_in_band: count,
                    heading_degrees: heading,
                    elevation_degrees: config.elevation_degrees,
                    distance: distance.tier,
                    distance_value: distance.value,
                });
            }
        }
    }

    Ok(CapturePlan { descriptors })
}
