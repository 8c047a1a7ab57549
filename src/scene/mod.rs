//! # Scene Graph
//!
//! The retained scene: a forest of [`Node`]s, each carrying its own
//! translation and scaling matrices, an axis-aligned pick box, and a kind
//! (shared primitive, composite of children, or an animated board). The
//! [`Scene`] wraps the forest with the operations the input layer drives.

mod board;
mod node;
#[allow(clippy::module_inception)]
mod scene;

pub use board::{Board, BoardCell, BoardMapError, Marker, MoveDirection, TurnDirection};
pub use node::{Node, NodeKind, ShapeKind};
pub use scene::Scene;
