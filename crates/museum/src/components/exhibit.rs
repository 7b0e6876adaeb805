use crate::prelude::*;
use crate::utils::raycast::{ray_aabb_intersection, ray_sphere_intersection};

/// Catalog entry shown in the detail window when the piece is selected
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Exhibit {
    pub title: String,
    pub origin: String,
    pub era: String,
    pub description: String,
}

/// Pick volume, centred on the entity's transform position
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bounds {
    Sphere { radius: f32 },
    /// Axis-aligned; the transform's rotation is not applied.
    Box { half_extents: Vector3<f32> },
}

/// Marks an entity the view ray can hover and select
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Interactable {
    pub bounds: Bounds,
}

impl Interactable {
    pub fn sphere(radius: f32) -> Self {
        Self {
            bounds: Bounds::Sphere { radius },
        }
    }

    pub fn cuboid(half_extents: Vector3<f32>) -> Self {
        Self {
            bounds: Bounds::Box { half_extents },
        }
    }

    /// Distance along `ray` to the first hit on the world-space volume.
    pub fn intersect(&self, transform: &Transform, ray: &Ray) -> Option<f32> {
        match self.bounds {
            Bounds::Sphere { radius } => {
                let scale = transform.scale.abs().max();
                ray_sphere_intersection(ray, transform.position, radius * scale)
            }
            Bounds::Box { half_extents } => {
                let half_extents = half_extents.component_mul(&transform.scale.abs());
                ray_aabb_intersection(
                    ray,
                    transform.position - half_extents,
                    transform.position + half_extents,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_bounds_follow_transform_scale() {
        let interactable = Interactable::sphere(0.5);
        let transform =
            Transform::from_position(Point3::new(0.0, 0.0, -5.0)).with_scale(Vector3::repeat(2.0));
        let ray = Ray::new(Point3::origin(), -Vector3::z());

        let distance = interactable.intersect(&transform, &ray).unwrap();
        assert!((distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn box_bounds_are_offset_by_position() {
        let interactable = Interactable::cuboid(Vector3::new(0.5, 0.5, 0.5));
        let transform = Transform::from_position(Point3::new(3.0, 0.0, -5.0));

        let straight = Ray::new(Point3::origin(), -Vector3::z());
        assert!(interactable.intersect(&transform, &straight).is_none());

        let aimed = Ray::new(Point3::new(3.0, 0.0, 0.0), -Vector3::z());
        let distance = interactable.intersect(&transform, &aimed).unwrap();
        assert!((distance - 4.5).abs() < 1e-4);
    }
}
