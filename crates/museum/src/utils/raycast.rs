use crate::prelude::*;

/// Represents a ray in 3D space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>, // Should be normalized
}

impl Ray {
    /// Create a new ray with a normalized direction
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
}

/// Test if a ray intersects a sphere
/// Returns the distance along the ray to the nearest hit (if any)
pub fn ray_sphere_intersection(
    ray: &Ray,
    sphere_center: Point3<f32>,
    sphere_radius: f32,
) -> Option<f32> {
    // Vector from ray origin to sphere center
    let oc = ray.origin - sphere_center;

    // Quadratic equation coefficients: at^2 + bt + c = 0
    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * oc.dot(&ray.direction);
    let c = oc.dot(&oc) - sphere_radius * sphere_radius;

    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let t1 = (-b - sqrt_discriminant) / (2.0 * a);
    let t2 = (-b + sqrt_discriminant) / (2.0 * a);

    // Nearest positive t; inside the sphere the far root is the exit point
    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}

/// Slab test against an axis-aligned box. Returns the entry distance, or the
/// exit distance when the ray starts inside the box.
pub fn ray_aabb_intersection(ray: &Ray, min: Point3<f32>, max: Point3<f32>) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];

        if direction.abs() < f32::EPSILON {
            // Parallel to this slab, must already be between its planes
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let inverse = 1.0 / direction;
        let mut t0 = (min[axis] - origin) * inverse;
        let mut t1 = (max[axis] - origin) * inverse;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }

    Some(if t_near > 0.0 { t_near } else { t_far })
}

/// Nearest target hit by `ray` no further than `max_distance` away.
pub fn pick_nearest<'a, I>(ray: &Ray, targets: I, max_distance: f32) -> Option<(Entity, f32)>
where
    I: IntoIterator<Item = (Entity, &'a Interactable, &'a Transform)>,
{
    targets
        .into_iter()
        .filter_map(|(entity, interactable, transform)| {
            interactable
                .intersect(transform, ray)
                .map(|distance| (entity, distance))
        })
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_sphere_hit() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let sphere_center = Point3::origin();
        let sphere_radius = 1.0;

        let distance = ray_sphere_intersection(&ray, sphere_center, sphere_radius);
        assert!((distance.unwrap() - 4.0).abs() < 0.001); // Should hit at t=4 (5 - 1)
    }

    #[test]
    fn test_ray_sphere_from_inside() {
        // Inside the sphere only the exit point is ahead
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.5), -Vector3::z());
        let distance = ray_sphere_intersection(&ray, Point3::origin(), 1.0);
        assert!((distance.unwrap() - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_ray_sphere_miss() {
        let ray = Ray::new(Point3::new(0.0, 5.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let sphere_center = Point3::origin();
        let sphere_radius = 1.0;

        let hit = ray_sphere_intersection(&ray, sphere_center, sphere_radius);
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_sphere_behind() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(ray_sphere_intersection(&ray, Point3::origin(), 1.0).is_none());
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Point3::new(0.0, 0.5, 5.0), -Vector3::z());
        let distance =
            ray_aabb_intersection(&ray, Point3::new(-1.0, 0.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert!((distance.unwrap() - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_ray_aabb_parallel_miss() {
        // Parallel to the y slab and above it
        let ray = Ray::new(Point3::new(0.0, 2.0, 5.0), -Vector3::z());
        let distance =
            ray_aabb_intersection(&ray, Point3::new(-1.0, 0.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(distance.is_none());
    }

    #[test]
    fn test_ray_aabb_from_inside() {
        let ray = Ray::new(Point3::origin(), Vector3::x());
        let distance =
            ray_aabb_intersection(&ray, Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0));
        assert!((distance.unwrap() - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_pick_nearest_prefers_closer_target() {
        let mut world = World::new();
        let near = world.spawn_empty().id();
        let far = world.spawn_empty().id();

        let interactable = Interactable::sphere(0.5);
        let near_transform = Transform::from_position(Point3::new(0.0, 0.0, -3.0));
        let far_transform = Transform::from_position(Point3::new(0.0, 0.0, -6.0));

        let ray = Ray::new(Point3::origin(), -Vector3::z());
        let targets = [
            (far, &interactable, &far_transform),
            (near, &interactable, &near_transform),
        ];

        let (entity, distance) = pick_nearest(&ray, targets, 10.0).unwrap();
        assert_eq!(entity, near);
        assert!((distance - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_pick_nearest_respects_max_distance() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let interactable = Interactable::sphere(0.5);
        let transform = Transform::from_position(Point3::new(0.0, 0.0, -20.0));

        let ray = Ray::new(Point3::origin(), -Vector3::z());
        assert!(pick_nearest(&ray, [(entity, &interactable, &transform)], 8.0).is_none());
    }
}
