//! # Scene
//!
//! The scene owns the root set of nodes and resolves every user-facing
//! request against it: picking, placing new shapes on the ground plane,
//! dragging the selection, recoloring and scaling, and the board movement
//! plumbing. Selection state lives on the nodes themselves; the scene
//! enforces the invariant that at most one node is selected at a time.
//!
//! All ray arguments arrive in view space, paired with the camera matrix
//! (for picking) or its inverse (for ground-plane placement). The matrices
//! are threaded in as data by the frame orchestrator; nothing here reads
//! ambient render state.

use cgmath::{Matrix4, Vector3};
use log::debug;

use crate::math;
use crate::picking::Ray;
use crate::render::RenderBackend;
use crate::scene::board::{MoveDirection, TurnDirection};
use crate::scene::node::{Node, NodeKind, ShapeKind};

/// The node forest and the operations the input layer calls into.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root node to the forest.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// The root nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to the root nodes.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Resolves a pick ray against the whole forest.
    ///
    /// Scans depth-first, keeps the globally nearest hit, deselects the
    /// previous selection and selects the winner. When nothing is hit the
    /// current selection is left unchanged. Returns the winning hit
    /// parameter.
    pub fn pick(
        &mut self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        camera: &Matrix4<f32>,
    ) -> Option<f32> {
        let ray = Ray::new(origin, direction)?;

        let mut best: Option<(f32, Vec<usize>)> = None;
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some((t, mut path)) = node.pick_recursive(&ray, camera) {
                if best.as_ref().map_or(true, |(bt, _)| t < *bt) {
                    path.insert(0, index);
                    best = Some((t, path));
                }
            }
        }

        let (t, path) = best?;
        self.clear_selection();
        if let Some(winner) = self.node_at_path_mut(&path) {
            winner.select(Some(true));
            debug!("picked node at t = {t:.3}");
        }
        Some(t)
    }

    /// Places a new shape where the ray meets the ground plane.
    ///
    /// The ray is unprojected into world space through `inverse_camera`
    /// first. The new node becomes the selection. Returns `false` when the
    /// ray never reaches the ground.
    pub fn place(
        &mut self,
        shape: ShapeKind,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        inverse_camera: &Matrix4<f32>,
    ) -> bool {
        let Some(point) = Self::ground_point(origin, direction, inverse_camera) else {
            return false;
        };
        let mut node = Node::from_shape(shape);
        node.translate(point.x, point.y, point.z);
        self.clear_selection();
        node.select(Some(true));
        debug!("placed {shape:?} at {point:?}");
        self.nodes.push(node);
        true
    }

    /// Drags the selected node so its origin tracks the ray's ground-plane
    /// intersection. A no-op when nothing is selected, the ray misses the
    /// ground, or the selection is a board cell (cells are fixed to their
    /// grid and only the board as a whole moves).
    pub fn move_selected(
        &mut self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        inverse_camera: &Matrix4<f32>,
    ) -> bool {
        let Some(point) = Self::ground_point(origin, direction, inverse_camera) else {
            return false;
        };
        let Some(node) = self.selected_node_mut() else {
            return false;
        };
        if matches!(node.kind, NodeKind::BoardCell(_)) {
            return false;
        }
        let delta = point - node.world_position();
        node.translate_world(delta);
        true
    }

    /// Rotates the selected node's color. A no-op without a selection.
    pub fn rotate_selected_color(&mut self, forward: bool) {
        if let Some(node) = self.selected_node_mut() {
            node.rotate_color(forward);
        }
    }

    /// Scales the selected node. A no-op without a selection.
    pub fn scale_selected(&mut self, up: bool) {
        if let Some(node) = self.selected_node_mut() {
            node.scale(up, None);
        }
    }

    /// Requests a slide of the first board in the forest.
    pub fn move_board(&mut self, direction: MoveDirection) -> bool {
        self.board_node_mut()
            .map_or(false, |node| node.request_board_move(direction))
    }

    /// Requests a turn of the first board in the forest.
    pub fn rotate_board(&mut self, direction: TurnDirection) -> bool {
        self.board_node_mut()
            .map_or(false, |node| node.request_board_turn(direction))
    }

    /// Advances every animating node one step. Returns `true` while another
    /// tick should be scheduled.
    pub fn tick(&mut self) -> bool {
        let mut active = false;
        for node in &mut self.nodes {
            active |= node.tick();
        }
        active
    }

    /// Emits the whole forest to the backend under the camera matrix.
    pub fn render(&self, backend: &mut dyn RenderBackend, camera: &Matrix4<f32>) {
        for node in &self.nodes {
            node.render(backend, camera, false);
        }
    }

    /// The currently selected node, if any.
    pub fn selected_node(&self) -> Option<&Node> {
        self.nodes.iter().find_map(Node::find_selected)
    }

    /// Mutable access to the currently selected node.
    pub fn selected_node_mut(&mut self) -> Option<&mut Node> {
        self.nodes.iter_mut().find_map(Node::find_selected_mut)
    }

    /// Clears every selection flag in the forest.
    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.clear_selection();
        }
    }

    fn board_node_mut(&mut self) -> Option<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|node| matches!(node.kind, NodeKind::Board(_)))
    }

    fn ground_point(
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        inverse_camera: &Matrix4<f32>,
    ) -> Option<Vector3<f32>> {
        let world_origin = (inverse_camera * origin.extend(1.0)).truncate();
        let world_direction = (inverse_camera * direction.extend(0.0)).truncate();
        math::intersect_ground_plane(world_origin, world_direction)
    }

    fn node_at_path_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.nodes.get_mut(*first)?;
        for &index in rest {
            node = node.child_mut(index)?;
        }
        Some(node)
    }
}
