//! # Primitive Shape Generation
//!
//! Functions to generate the primitive shapes used by the scene. All shapes
//! are generated with proper normals, in a Y-up coordinate system with the
//! board lying in the XZ plane.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a unit cube centered at the origin.
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes and per-face
/// normals pointing outward.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    let positions = [
        // Front face
        [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5],
        // Right face
        [0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5],
        // Top face
        [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5],
    ];

    let normals = [
        [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = normals.to_vec();

    // Two counter-clockwise triangles per face.
    data.indices = vec![
        0, 1, 2, 2, 3, 0,
        4, 5, 6, 6, 7, 4,
        8, 9, 10, 10, 11, 8,
        12, 13, 14, 14, 15, 12,
        16, 17, 18, 18, 19, 16,
        20, 21, 22, 22, 23, 20,
    ];

    data
}

/// Generate a UV sphere of radius 0.5 centered at the origin.
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);
    let radius = 0.5;

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();

            // Spherical to Cartesian coordinates, Y up
            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            data.vertices.push([x * radius, y * radius, z * radius]);
            data.normals.push([x, y, z]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.push(first);
            data.indices.push(second);
            data.indices.push(first + 1);

            data.indices.push(second);
            data.indices.push(second + 1);
            data.indices.push(first + 1);
        }
    }

    data
}

/// Generate a flat plane in the XZ plane with the given subdivisions.
///
/// Returns a plane centered at the origin with the normal pointing up
/// (positive Y).
pub fn generate_plane(
    width: f32,
    depth: f32,
    width_segments: u32,
    depth_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for z in 0..=d_segs {
        let v = z as f32 / d_segs as f32;
        let pos_z = (v - 0.5) * depth;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    for z in 0..d_segs {
        for x in 0..w_segs {
            let i = z * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.push(i);
            data.indices.push(next_row);
            data.indices.push(i + 1);

            data.indices.push(next_row);
            data.indices.push(next_row + 1);
            data.indices.push(i + 1);
        }
    }

    data
}

/// Generate the reference ground grid: a 20x20 world-unit plane with one
/// subdivision per half unit, matching the modeller's fixed floor grid.
pub fn generate_grid_plane() -> GeometryData {
    generate_plane(20.0, 20.0, 40, 40)
}

/// Generate the forward-direction arrow marker.
///
/// A flat arrow hovering half a unit above the origin, pointing along
/// negative Z: a shaft one unit long plus two barbs. Built from thin quads
/// so backends without a line topology can still draw it.
pub fn generate_direction_marker() -> GeometryData {
    let mut data = GeometryData::new();

    let segments: [([f32; 3], [f32; 3]); 3] = [
        ([0.0, 0.5, 0.0], [0.0, 0.5, -1.0]),
        ([0.0, 0.5, -1.0], [0.2, 0.5, -0.8]),
        ([0.0, 0.5, -1.0], [-0.2, 0.5, -0.8]),
    ];
    let half_width = 0.02;

    for (a, b) in segments {
        let base = data.vertices.len() as u32;
        data.vertices.push([a[0] - half_width, a[1], a[2]]);
        data.vertices.push([a[0] + half_width, a[1], a[2]]);
        data.vertices.push([b[0] + half_width, b[1], b[2]]);
        data.vertices.push([b[0] - half_width, b[1], b[2]]);
        for _ in 0..4 {
            data.normals.push([0.0, 1.0, 0.0]);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert!(sphere.vertex_count() > 0);
        assert!(sphere.triangle_count() > 0);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());

        // Radius 0.5: every vertex sits on the half-unit sphere.
        for v in &sphere.vertices {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((len - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        for v in &plane.vertices {
            assert_eq!(v[1], 0.0);
        }
    }

    #[test]
    fn test_direction_marker_generation() {
        let marker = generate_direction_marker();
        assert_eq!(marker.vertices.len(), 12); // 3 segments * 4 corners
        assert_eq!(marker.triangle_count(), 6);
    }
}
