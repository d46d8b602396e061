//! CPU raycaster for the headless viewer.
//!
//! The model is drawn as its shaded bounding box, which is enough to frame
//! and verify exported shots without a GPU.

use glam::DVec3;
use rayon::prelude::*;

use super::camera::CameraRig;
use super::hdri::EnvironmentMap;
use super::Frame;
use crate::host::Background;
use crate::model::ModelBounds;

const LIGHT_DIR: DVec3 = DVec3::new(5.0, 10.0, 7.5);
const AMBIENT: f64 = 0.3;
const BASE_COLOR: [f64; 3] = [0.78, 0.78, 0.8];

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub camera: &'a CameraRig,
    pub bounds: Option<&'a ModelBounds>,
    pub width: u32,
    pub height: u32,
    pub alpha: bool,
    pub background: &'a Background,
}

/// Slab test. Returns the distance along the ray to the first hit in front of
/// the origin, or `None`.
pub fn intersect_aabb(origin: DVec3, dir: DVec3, box_min: DVec3, box_max: DVec3) -> Option<f64> {
    const EPSILON: f64 = 1e-12;

    let inv = |d: f64| {
        if d.abs() < EPSILON {
            1.0 / EPSILON.copysign(d)
        } else {
            1.0 / d
        }
    };
    let inv_dir = DVec3::new(inv(dir.x), inv(dir.y), inv(dir.z));

    let t0 = (box_min - origin) * inv_dir;
    let t1 = (box_max - origin) * inv_dir;

    let t_near = t0.min(t1).max_element();
    let t_far = t0.max(t1).min_element();

    if t_near > t_far || t_far < 0.0 {
        return None;
    }
    if t_near < 0.0 {
        // Origin inside the box.
        return (t_far > 1e-6).then_some(t_far);
    }
    Some(t_near)
}

/// Outward face normal of `bounds` at a point on its surface.
fn face_normal(bounds: &ModelBounds, point: DVec3) -> DVec3 {
    let half = (bounds.size() * 0.5).max(DVec3::splat(1e-9));
    let local = (point - bounds.center()) / half;
    let abs = local.abs();
    if abs.x >= abs.y && abs.x >= abs.z {
        DVec3::new(local.x.signum(), 0.0, 0.0)
    } else if abs.y >= abs.z {
        DVec3::new(0.0, local.y.signum(), 0.0)
    } else {
        DVec3::new(0.0, 0.0, local.z.signum())
    }
}

fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Reinhard tone map followed by sRGB-ish gamma.
fn tone_map(radiance: [f32; 3]) -> [u8; 3] {
    radiance.map(|c| {
        let c = f64::from(c.max(0.0));
        to_u8((c / (1.0 + c)).powf(1.0 / 2.2))
    })
}

fn background_pixel(view: &FrameView<'_>, dir: DVec3) -> [u8; 4] {
    match view.background {
        Background::None if view.alpha => [0, 0, 0, 0],
        Background::None => [0, 0, 0, 255],
        Background::Color(c) => [c.r, c.g, c.b, 255],
        Background::Environment(map) => environment_pixel(map, dir),
    }
}

fn environment_pixel(map: &EnvironmentMap, dir: DVec3) -> [u8; 4] {
    let [r, g, b] = tone_map(map.sample(dir));
    [r, g, b, 255]
}

fn shade(bounds: &ModelBounds, point: DVec3) -> [u8; 4] {
    let n = face_normal(bounds, point);
    let diffuse = n.dot(LIGHT_DIR.normalize()).max(0.0);
    let k = AMBIENT + (1.0 - AMBIENT) * diffuse;
    [
        to_u8(BASE_COLOR[0] * k),
        to_u8(BASE_COLOR[1] * k),
        to_u8(BASE_COLOR[2] * k),
        255,
    ]
}

/// Render `view` to an RGBA frame. Rows are traced in parallel.
pub fn render_frame(view: &FrameView<'_>) -> Frame {
    let (width, height) = (view.width, view.height);
    let row_len = width as usize * 4;
    let mut pixels = vec![0u8; row_len * height as usize];

    if row_len > 0 {
        pixels
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let dir = view.camera.ray_direction(x, y as u32, width, height);
                    let hit = view.bounds.and_then(|b| {
                        intersect_aabb(view.camera.position, dir, b.min, b.max).map(|t| (b, t))
                    });
                    let px = match hit {
                        Some((bounds, t)) => shade(bounds, view.camera.position + dir * t),
                        None => background_pixel(view, dir),
                    };
                    let i = x as usize * 4;
                    row[i..i + 4].copy_from_slice(&px);
                }
            });
    }

    Frame {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::host::Color;

    fn unit_box() -> ModelBounds {
        ModelBounds::from_size(DVec3::ONE)
    }

    #[test]
    fn ray_hits_box_in_front() {
        let t = intersect_aabb(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z, -DVec3::ONE, DVec3::ONE);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn ray_misses_box_behind_or_beside() {
        assert_eq!(
            intersect_aabb(DVec3::new(0.0, 0.0, 5.0), DVec3::Z, -DVec3::ONE, DVec3::ONE),
            None
        );
        assert_eq!(
            intersect_aabb(DVec3::new(3.0, 0.0, 5.0), DVec3::NEG_Z, -DVec3::ONE, DVec3::ONE),
            None
        );
    }

    #[test]
    fn ray_from_inside_exits() {
        let t = intersect_aabb(DVec3::ZERO, DVec3::X, -DVec3::ONE, DVec3::ONE);
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn face_normals_follow_dominant_axis() {
        let b = unit_box();
        assert_eq!(face_normal(&b, DVec3::new(0.5, 0.1, -0.2)), DVec3::X);
        assert_eq!(face_normal(&b, DVec3::new(0.1, -0.5, 0.2)), DVec3::NEG_Y);
    }

    fn view_of<'a>(
        camera: &'a CameraRig,
        bounds: Option<&'a ModelBounds>,
        alpha: bool,
        background: &'a Background,
    ) -> FrameView<'a> {
        FrameView {
            camera,
            bounds,
            width: 16,
            height: 16,
            alpha,
            background,
        }
    }

    #[test]
    fn transparent_background_with_opaque_model() {
        let camera = CameraRig::default();
        let bounds = unit_box();
        let frame = render_frame(&view_of(&camera, Some(&bounds), true, &Background::None));

        assert_eq!(frame.pixels.len(), 16 * 16 * 4);
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(frame.pixel(8, 8).map(|p| p[3]), Some(255));
    }

    #[test]
    fn solid_background_fills_misses() {
        let camera = CameraRig::default();
        let bg = Background::Color(Color::new(10, 20, 30));
        let frame = render_frame(&view_of(&camera, None, false, &bg));
        assert!(frame.pixels.chunks(4).all(|p| p == [10, 20, 30, 255]));
    }

    #[test]
    fn environment_background_is_tone_mapped() {
        let camera = CameraRig::default();
        let bg = Background::Environment(Arc::new(EnvironmentMap::uniform(1.0, 0.0, 0.0)));
        let frame = render_frame(&view_of(&camera, None, false, &bg));
        // 1 / (1 + 1) = 0.5, then gamma.
        let expected = to_u8(0.5f64.powf(1.0 / 2.2));
        assert_eq!(frame.pixel(3, 3), Some([expected, 0, 0, 255]));
    }

    #[test]
    fn zero_sized_frame_is_empty() {
        let camera = CameraRig::default();
        let view = FrameView {
            width: 0,
            height: 0,
            ..view_of(&camera, None, true, &Background::None)
        };
        assert!(render_frame(&view).pixels.is_empty());
    }
}
