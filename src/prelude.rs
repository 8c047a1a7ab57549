//! # Boardcraft Prelude
//!
//! A convenient way to import the commonly used types in one line. Designed
//! to reduce boilerplate imports in typical hosts of the scene kernel.
//!
//! ## Usage
//!
//! ```rust
//! use boardcraft::prelude::*;
//!
//! let mut scene = Scene::new();
//! scene.add_node(Node::cube());
//! let camera = Trackball::new(640.0, 480.0);
//! assert_eq!(scene.nodes().len(), 1);
//! let _ = camera.matrix();
//! ```

// Re-export the scene graph
pub use crate::scene::{
    Board, BoardCell, BoardMapError, Marker, MoveDirection, Node, NodeKind, Scene, ShapeKind,
    TurnDirection,
};

// Re-export picking and camera types
pub use crate::camera::Trackball;
pub use crate::picking::{Aabb, Ray};

// Re-export geometry and rendering boundary types
pub use crate::geometry::{GeometryData, GeometryHandle, GeometryTable};
pub use crate::render::{DrawCall, RecordingBackend, RenderBackend};

// Re-export color utilities
pub use crate::color::{COLORS, MAX_COLOR, MIN_COLOR};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Matrix4, Rad, SquareMatrix, Vector3};
