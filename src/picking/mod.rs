//! # Ray Picking Primitives
//!
//! This module provides the geometric half of mouse selection: a world-space
//! [`Ray`] and an axis-aligned bounding box ([`Aabb`]) stored in a node's
//! local space.
//!
//! ## How it works
//!
//! 1. **Mouse to ray**: the embedding application unprojects the cursor into
//!    a ray (outside this crate).
//! 2. **Ray to local space**: the node supplies the inverse of its full
//!    camera-and-model transform, and the ray is mapped through it.
//! 3. **Slab test**: the local ray is intersected with the box one axis at a
//!    time; the three parametric intervals are intersected to find the hit.
//!
//! The ray direction is deliberately *not* renormalized after the local-space
//! transform, so the returned `t` stays in the caller's parameterization and
//! hit distances are comparable across nodes with different scales.

use cgmath::{InnerSpace, Matrix4, Vector3};

/// Direction vectors shorter than this are considered degenerate.
const DIRECTION_EPSILON: f32 = 1e-6;

/// Slab denominators smaller than this are treated as a ray parallel to the
/// slab planes.
const SLAB_EPSILON: f32 = 1e-9;

/// A ray for intersection testing.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point.
    pub origin: Vector3<f32>,
    /// Ray direction (normalized).
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a new ray with a normalized direction.
    ///
    /// Returns `None` for a near-zero direction, which arises from a
    /// degenerate unprojection; callers treat that as a non-hit rather than
    /// letting NaN propagate.
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Option<Self> {
        if direction.magnitude2() < DIRECTION_EPSILON * DIRECTION_EPSILON {
            return None;
        }
        Some(Self {
            origin,
            direction: direction.normalize(),
        })
    }

    /// Point along the ray at parameter `t`.
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box in a node's local space.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vector3<f32>,
    /// Maximum corner.
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Creates a box from two opposite corners, normalizing so that `min`
    /// holds the component-wise minimum. The hit parameter is therefore the
    /// same whether the box is expressed min-first or max-first.
    pub fn new(a: Vector3<f32>, b: Vector3<f32>) -> Self {
        Self {
            min: Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// The default node proxy box: a unit cube centered at the origin.
    pub fn unit() -> Self {
        Self::new(
            Vector3::new(-0.5, -0.5, -0.5),
            Vector3::new(0.5, 0.5, 0.5),
        )
    }

    /// Tests a ray against this box after mapping it into local space.
    ///
    /// `world_to_local` is the inverse of the node's composed
    /// camera-and-model transform. Returns the nearest hit parameter along
    /// the original ray, or `None` on a miss. The box must not be entirely
    /// behind the ray origin: a hit requires the near edge of the slab
    /// interval to be at or past `t = 0`.
    pub fn ray_hit(&self, ray: &Ray, world_to_local: &Matrix4<f32>) -> Option<f32> {
        let origin = (world_to_local * ray.origin.extend(1.0)).truncate();
        let direction = (world_to_local * ray.direction.extend(0.0)).truncate();

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < SLAB_EPSILON {
                // Parallel to these slab planes: hit only if already inside.
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let mut t0 = (self.min[axis] - o) / d;
            let mut t1 = (self.max[axis] - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_near >= 0.0 {
            Some(t_near)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    fn ray(origin: [f32; 3], direction: [f32; 3]) -> Ray {
        Ray::new(origin.into(), direction.into()).unwrap()
    }

    #[test]
    fn ray_rejects_degenerate_direction() {
        assert!(Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn ray_hits_unit_box_head_on() {
        let aabb = Aabb::unit();
        let r = ray([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]);
        let t = aabb.ray_hit(&r, &Matrix4::identity()).unwrap();
        assert!((t - 4.5).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_offset_box() {
        let aabb = Aabb::unit();
        let r = ray([5.0, 0.0, -5.0], [0.0, 0.0, 1.0]);
        assert!(aabb.ray_hit(&r, &Matrix4::identity()).is_none());
    }

    #[test]
    fn box_behind_origin_is_a_miss() {
        let aabb = Aabb::unit();
        let r = ray([0.0, 0.0, 5.0], [0.0, 0.0, 1.0]);
        assert!(aabb.ray_hit(&r, &Matrix4::identity()).is_none());
    }

    #[test]
    fn corner_order_does_not_change_the_hit() {
        let a = Vector3::new(-1.0, -1.0, -1.0);
        let b = Vector3::new(1.0, 1.0, 1.0);
        let r = ray([0.0, 0.0, -4.0], [0.0, 0.0, 1.0]);
        let forward = Aabb::new(a, b).ray_hit(&r, &Matrix4::identity()).unwrap();
        let reversed = Aabb::new(b, a).ray_hit(&r, &Matrix4::identity()).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn hit_parameter_is_symmetric_under_axis_permutation() {
        let aabb = Aabb::unit();
        let along_z = ray([0.0, 0.0, -3.0], [0.0, 0.0, 1.0]);
        let along_x = ray([-3.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let along_y = ray([0.0, -3.0, 0.0], [0.0, 1.0, 0.0]);
        let identity = Matrix4::identity();
        let tz = aabb.ray_hit(&along_z, &identity).unwrap();
        let tx = aabb.ray_hit(&along_x, &identity).unwrap();
        let ty = aabb.ray_hit(&along_y, &identity).unwrap();
        assert!((tz - tx).abs() < 1e-6);
        assert!((tz - ty).abs() < 1e-6);
    }

    #[test]
    fn transformed_box_is_tested_in_local_space() {
        // Box translated to x = 10 in world space; the inverse maps the ray
        // into its local frame.
        let aabb = Aabb::unit();
        let world = Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0));
        let world_to_local = world.invert().unwrap();
        let r = ray([10.0, 0.0, -5.0], [0.0, 0.0, 1.0]);
        assert!(aabb.ray_hit(&r, &world_to_local).is_some());

        let miss = ray([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]);
        assert!(aabb.ray_hit(&miss, &world_to_local).is_none());
    }

    #[test]
    fn parallel_ray_inside_slab_still_hits() {
        let aabb = Aabb::unit();
        // Direction has no y component but the origin is inside the y slab.
        let r = ray([0.0, 0.25, -5.0], [0.0, 0.0, 1.0]);
        assert!(aabb.ray_hit(&r, &Matrix4::identity()).is_some());
    }
}
