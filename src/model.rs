//! Model bounds and loading.
//!
//! The capture pipeline only needs to know where a model is and how big it is,
//! so a loaded model is reduced to its world-space bounding box. glTF/GLB
//! files are read with the `gltf` crate (feature `gltf`, on by default).

use glam::DVec3;

/// Error type for model loading.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("Model has no geometry")]
    NoGeometry,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Axis-aligned bounding box of a model in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl ModelBounds {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of the given size centered on the origin.
    pub fn from_size(size: DVec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(-half, half)
    }

    /// Smallest box containing all `points`, or `None` if there are none.
    pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self { min: p, max: p }),
            Some(b) => Some(Self {
                min: b.min.min(p),
                max: b.max.max(p),
            }),
        })
    }

    pub fn union(&self, other: &ModelBounds) -> ModelBounds {
        ModelBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f64 {
        self.size().max_element()
    }

    /// Half the largest dimension.
    pub fn radius(&self) -> f64 {
        self.max_dimension() / 2.0
    }

    /// The same box translated so its center sits on the origin.
    pub fn centered(&self) -> ModelBounds {
        let center = self.center();
        ModelBounds {
            min: self.min - center,
            max: self.max - center,
        }
    }
}

#[cfg(feature = "gltf")]
pub use gltf_bounds::{load_model_bounds, model_bounds_from_slice};

#[cfg(feature = "gltf")]
mod gltf_bounds {
    use std::path::Path;

    use glam::{DMat4, DVec3, Mat4};
    use tracing::debug;

    use super::{ModelBounds, ModelError, Result};

    /// Load a `.gltf` or `.glb` file and return its world-space bounds.
    pub fn load_model_bounds<P: AsRef<Path>>(path: P) -> Result<ModelBounds> {
        let data = std::fs::read(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = data.len(), "Loading model");
        model_bounds_from_slice(&data)
    }

    /// Bounds of a glTF/GLB document held in memory.
    ///
    /// Uses each primitive's POSITION accessor min/max, transformed by its
    /// node's world matrix. Buffers are not decoded.
    pub fn model_bounds_from_slice(data: &[u8]) -> Result<ModelBounds> {
        let document = gltf::Gltf::from_slice(data)?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(ModelError::NoGeometry)?;

        let mut bounds: Option<ModelBounds> = None;
        for node in scene.nodes() {
            process_node(&node, &DMat4::IDENTITY, &mut bounds);
        }

        bounds.ok_or(ModelError::NoGeometry)
    }

    fn process_node(node: &gltf::Node, parent_transform: &DMat4, bounds: &mut Option<ModelBounds>) {
        let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix()).as_dmat4();
        let global_transform = *parent_transform * local_transform;

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.get(&gltf::Semantic::Positions).is_none() {
                    continue;
                }
                let b = primitive.bounding_box();
                let (min, max) = (DVec3::from(b.min.map(f64::from)), DVec3::from(b.max.map(f64::from)));
                let corners = (0..8).map(|i| {
                    DVec3::new(
                        if i & 1 == 0 { min.x } else { max.x },
                        if i & 2 == 0 { min.y } else { max.y },
                        if i & 4 == 0 { min.z } else { max.z },
                    )
                });
                let world = ModelBounds::from_points(
                    corners.map(|c| global_transform.transform_point3(c)),
                );
                if let Some(world) = world {
                    *bounds = Some(match bounds.take() {
                        Some(existing) => existing.union(&world),
                        None => world,
                    });
                }
            }
        }

        for child in node.children() {
            process_node(&child, &global_transform, bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_size_and_radius() {
        let b = ModelBounds::new(DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(b.center(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.size(), DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(b.max_dimension(), 6.0);
        assert_eq!(b.radius(), 3.0);
    }

    #[test]
    fn new_orders_corners() {
        let b = ModelBounds::new(DVec3::new(1.0, -1.0, 5.0), DVec3::new(-1.0, 1.0, 0.0));
        assert_eq!(b.min, DVec3::new(-1.0, -1.0, 0.0));
        assert_eq!(b.max, DVec3::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn centered_moves_center_to_origin() {
        let b = ModelBounds::new(DVec3::new(10.0, 20.0, 30.0), DVec3::new(12.0, 24.0, 36.0));
        let c = b.centered();
        assert_eq!(c.center(), DVec3::ZERO);
        assert_eq!(c.size(), b.size());
    }

    #[test]
    fn from_points_and_union() {
        assert!(ModelBounds::from_points(std::iter::empty()).is_none());
        let b = ModelBounds::from_points([DVec3::new(1.0, 2.0, 3.0), DVec3::new(-1.0, 5.0, 0.0)])
            .unwrap();
        assert_eq!(b.min, DVec3::new(-1.0, 2.0, 0.0));
        assert_eq!(b.max, DVec3::new(1.0, 5.0, 3.0));

        let u = b.union(&ModelBounds::from_size(DVec3::splat(10.0)));
        assert_eq!(u.min, DVec3::splat(-5.0));
        assert_eq!(u.max, DVec3::new(5.0, 5.0, 5.0));
    }
}
