//! Perspective camera and model framing.

use glam::DVec3;

/// Vertical field of view used by the viewer. Kept narrow to limit
/// perspective distortion in exported shots.
pub const DEFAULT_FOV_DEG: f64 = 35.0;

/// Extra distance applied when framing a model so it does not touch the edges.
pub const FIT_MARGIN: f64 = 2.5;

/// A perspective camera aimed at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub position: DVec3,
    /// Point the camera looks at.
    pub look_target: DVec3,
    pub fov_deg: f64,
    /// Width over height of the projection.
    pub aspect: f64,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: DVec3::new(5.0, 2.0, 5.0),
            look_target: DVec3::ZERO,
            fov_deg: DEFAULT_FOV_DEG,
            aspect: 1.0,
        }
    }
}

impl CameraRig {
    /// Orthonormal `(forward, right, up)` basis with world Y as up.
    ///
    /// Looking straight along the vertical axis falls back to world X as the
    /// right vector.
    pub fn basis(&self) -> (DVec3, DVec3, DVec3) {
        let forward = (self.look_target - self.position)
            .try_normalize()
            .unwrap_or(DVec3::NEG_Z);
        let right = forward.cross(DVec3::Y).try_normalize().unwrap_or(DVec3::X);
        let up = right.cross(forward);
        (forward, right, up)
    }

    /// Direction of the ray through the center of pixel `(x, y)` of a
    /// `width × height` image.
    pub fn ray_direction(&self, x: u32, y: u32, width: u32, height: u32) -> DVec3 {
        let (forward, right, up) = self.basis();
        let half_height = (self.fov_deg.to_radians() * 0.5).tan();
        let half_width = half_height * self.aspect;

        let ndc_x = (2.0 * (f64::from(x) + 0.5) / f64::from(width.max(1))) - 1.0;
        let ndc_y = 1.0 - (2.0 * (f64::from(y) + 0.5) / f64::from(height.max(1)));

        (forward + right * (ndc_x * half_width) + up * (ndc_y * half_height)).normalize()
    }
}

/// Camera distance at which a model of `size` fits the view, including
/// [`FIT_MARGIN`].
pub fn fit_distance(size: DVec3, fov_deg: f64, aspect: f64) -> f64 {
    let half_tan = (fov_deg.to_radians() * 0.5).tan();
    let vertical = size.y / (2.0 * half_tan);
    let horizontal = size.x / (2.0 * half_tan * aspect);
    let depth = size.z / (2.0 * half_tan);
    vertical.max(horizontal).max(depth) * FIT_MARGIN
}

/// Framing position for a model centered on the origin: slightly raised,
/// looking in along the diagonal.
pub fn fit_position(size: DVec3, fov_deg: f64, aspect: f64) -> DVec3 {
    let distance = fit_distance(size, fov_deg, aspect);
    DVec3::new(distance, distance * 0.5, distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_orthonormal() {
        let camera = CameraRig::default();
        let (f, r, u) = camera.basis();
        assert!((f.length() - 1.0).abs() < 1e-9);
        assert!((r.length() - 1.0).abs() < 1e-9);
        assert!((u.length() - 1.0).abs() < 1e-9);
        assert!(f.dot(r).abs() < 1e-9);
        assert!(f.dot(u).abs() < 1e-9);
        assert!(u.y > 0.0);
    }

    #[test]
    fn basis_handles_top_down_view() {
        let camera = CameraRig {
            position: DVec3::new(0.0, 10.0, 0.0),
            ..Default::default()
        };
        let (f, r, u) = camera.basis();
        assert!((f - DVec3::NEG_Y).length() < 1e-9);
        assert_eq!(r, DVec3::X);
        assert!((u.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = CameraRig {
            position: DVec3::new(0.0, 0.0, 10.0),
            ..Default::default()
        };
        // Even-sized image: average the two central pixels.
        let a = camera.ray_direction(49, 49, 100, 100);
        let b = camera.ray_direction(50, 50, 100, 100);
        let center = (a + b).normalize();
        assert!((center - DVec3::NEG_Z).length() < 1e-9);
    }

    #[test]
    fn fit_distance_uses_largest_extent() {
        let half_tan = (DEFAULT_FOV_DEG.to_radians() * 0.5).tan();
        let tall = fit_distance(DVec3::new(1.0, 4.0, 1.0), DEFAULT_FOV_DEG, 1.0);
        assert!((tall - 4.0 / (2.0 * half_tan) * FIT_MARGIN).abs() < 1e-9);

        let wide = fit_distance(DVec3::new(4.0, 1.0, 1.0), DEFAULT_FOV_DEG, 2.0);
        assert!((wide - 4.0 / (2.0 * half_tan * 2.0) * FIT_MARGIN).abs() < 1e-9);
    }

    #[test]
    fn fit_position_is_raised_diagonal() {
        let p = fit_position(DVec3::ONE, DEFAULT_FOV_DEG, 1.0);
        assert_eq!(p.x, p.z);
        assert!((p.y - p.x * 0.5).abs() < 1e-12);
    }
}
