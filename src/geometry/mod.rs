//! # Procedural Geometry and the Shared Geometry Table
//!
//! This module provides generators for the handful of primitive shapes the
//! scene uses, plus the [`GeometryTable`]: an immutable arena built once at
//! startup that owns every piece of geometry. Nodes never own geometry
//! themselves; they store a copyable [`GeometryHandle`] that the rendering
//! backend resolves at draw time.
//!
//! ## Usage
//!
//! ```rust
//! use boardcraft::geometry::{GeometryHandle, GeometryTable};
//!
//! let table = GeometryTable::standard();
//! let sphere = table.get(GeometryHandle::SPHERE).unwrap();
//! assert!(sphere.triangle_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

/// Opaque identifier for an entry in the [`GeometryTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(usize);

impl GeometryHandle {
    /// The line-grid ground plane.
    pub const PLANE: GeometryHandle = GeometryHandle(0);
    /// A sphere of radius 0.5.
    pub const SPHERE: GeometryHandle = GeometryHandle(1);
    /// A unit cube.
    pub const CUBE: GeometryHandle = GeometryHandle(2);
    /// The forward-direction arrow marker.
    pub const DIRECTION: GeometryHandle = GeometryHandle(3);

    /// Raw arena index, for backends that keep parallel GPU resources.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Generated geometry ready for upload by a rendering backend.
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z).
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z).
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding).
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Number of vertices in this geometry.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles in this geometry.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable arena of shared geometry, built once at startup.
///
/// The four standard entries occupy the well-known handles on
/// [`GeometryHandle`]; further entries can be registered before the table is
/// handed to the renderer.
pub struct GeometryTable {
    entries: Vec<GeometryData>,
}

impl GeometryTable {
    /// Builds the table with the four standard shapes in handle order.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                generate_grid_plane(),
                generate_sphere(30, 30),
                generate_cube(),
                generate_direction_marker(),
            ],
        }
    }

    /// Registers an additional geometry entry and returns its handle.
    pub fn register(&mut self, data: GeometryData) -> GeometryHandle {
        let handle = GeometryHandle(self.entries.len());
        self.entries.push(data);
        handle
    }

    /// Looks up the geometry for a handle.
    pub fn get(&self, handle: GeometryHandle) -> Option<&GeometryData> {
        self.entries.get(handle.0)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_fills_well_known_handles() {
        let table = GeometryTable::standard();
        for handle in [
            GeometryHandle::PLANE,
            GeometryHandle::SPHERE,
            GeometryHandle::CUBE,
            GeometryHandle::DIRECTION,
        ] {
            let data = table.get(handle).unwrap();
            assert!(data.vertex_count() > 0);
        }
    }

    #[test]
    fn registered_entries_get_fresh_handles() {
        let mut table = GeometryTable::standard();
        let before = table.len();
        let handle = table.register(generate_cube());
        assert_eq!(handle.index(), before);
        assert!(table.get(handle).is_some());
    }
}
