//! Heading and orbit-position math for capture planning.
//!
//! Angles are in degrees at the API boundary. Elevation is measured from the
//! vertical axis: 0° looks straight down from above, 90° is level with the
//! horizon and 180° looks straight up from below.

use glam::DVec3;

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // Tiny negative inputs round up to exactly 360.0 above.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Heading of shot `index_in_band` out of `band_count` shots spread evenly
/// across `rotation_range_degrees`, centered on `reference_heading_degrees`.
///
/// A single-shot band has no spread and returns the reference heading as is.
pub fn compute_heading(
    reference_heading_degrees: f64,
    band_count: u32,
    index_in_band: u32,
    rotation_range_degrees: f64,
) -> f64 {
    if band_count <= 1 {
        return reference_heading_degrees;
    }

    let half_range = rotation_range_degrees / 2.0;
    let step = rotation_range_degrees / f64::from(band_count - 1);
    let offset = -half_range + f64::from(index_in_band) * step;
    normalize_degrees(reference_heading_degrees + offset)
}

/// Spherical-to-Cartesian conversion around the origin.
pub fn camera_position_from_spherical(
    heading_degrees: f64,
    elevation_degrees: f64,
    distance: f64,
) -> DVec3 {
    let heading = heading_degrees.to_radians();
    let elevation = elevation_degrees.to_radians();

    DVec3::new(
        distance * elevation.sin() * heading.cos(),
        distance * elevation.cos(),
        distance * elevation.sin() * heading.sin(),
    )
}

/// Heading of a camera position around the vertical axis, in `[0, 360)`.
///
/// Only the horizontal (x, z) components are used.
pub fn current_heading_from_position(position: DVec3) -> f64 {
    normalize_degrees(position.z.atan2(position.x).to_degrees())
}
