//! Small matrix and intersection helpers used throughout the scene graph.
//!
//! All transforms are 4x4 affine matrices (`cgmath::Matrix4<f32>`) with the
//! bottom row `[0, 0, 0, 1]`. Node transforms are composed from the three
//! constructors here; nothing else ever writes raw matrix elements.

use cgmath::{Matrix4, Rad, Vector3};

/// Tolerance below which a ray direction component is treated as parallel
/// to a plane.
pub const PLANE_EPSILON: f32 = 1e-6;

/// Translation matrix for the given offset.
pub fn translation(offset: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(offset)
}

/// Uniform scaling matrix.
pub fn scaling(factor: f32) -> Matrix4<f32> {
    Matrix4::from_scale(factor)
}

/// Rotation about the world Y axis, angle in radians.
pub fn rotation_y(angle: f32) -> Matrix4<f32> {
    Matrix4::from_angle_y(Rad(angle))
}

/// Translation component of an affine matrix, i.e. where the node's local
/// origin sits in the parent frame.
pub fn world_position(matrix: &Matrix4<f32>) -> Vector3<f32> {
    matrix.w.truncate()
}

/// Intersects a ray with the world ground plane `y = 0`.
///
/// Returns `None` when the ray is parallel to the plane or the intersection
/// lies behind the ray origin.
pub fn intersect_ground_plane(
    origin: Vector3<f32>,
    direction: Vector3<f32>,
) -> Option<Vector3<f32>> {
    if direction.y.abs() < PLANE_EPSILON {
        return None;
    }
    let t = -origin.y / direction.y;
    if t < 0.0 {
        return None;
    }
    Some(origin + direction * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn ground_plane_hit_from_above() {
        let hit = intersect_ground_plane(
            Vector3::new(2.0, 10.0, 3.0),
            Vector3::new(0.0, -1.0, 0.0),
        )
        .unwrap();
        assert!((hit - Vector3::new(2.0, 0.0, 3.0)).magnitude() < 1e-6);
    }

    #[test]
    fn ground_plane_parallel_ray_misses() {
        let hit = intersect_ground_plane(
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn ground_plane_behind_origin_misses() {
        // Pointing up from above the plane: the intersection is behind us.
        let hit = intersect_ground_plane(
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn rotation_y_quarter_turn_maps_z_to_x() {
        let m = rotation_y(std::f32::consts::FRAC_PI_2);
        let v = (m * Vector3::new(0.0, 0.0, 1.0).extend(0.0)).truncate();
        assert!((v - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn world_position_reads_translation_column() {
        let m = translation(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(world_position(&m), Vector3::new(1.0, 2.0, 3.0));
    }
}
