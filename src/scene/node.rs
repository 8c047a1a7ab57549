//! # Scene Graph Nodes
//!
//! Every element in the scene is a [`Node`]: an accumulated translation
//! matrix, an accumulated scaling matrix, a palette color index, a selection
//! flag and a local-space bounding box, plus a [`NodeKind`] saying what the
//! node actually is. The kinds form a closed set (primitive leaf, composite,
//! board, board cell) behind one capability surface instead of a class
//! hierarchy.
//!
//! Transform composition rules:
//! - `translate` right-composes, so translations accumulate in the node's
//!   own local frame;
//! - `rotate_y` left-composes, so rotation is applied in world space ahead
//!   of the accumulated translation and pivots the node's position around
//!   the world Y axis;
//! - `translate_world` left-composes a translation, moving the node's world
//!   origin by exactly the given delta regardless of prior rotation.

use cgmath::{Matrix4, SquareMatrix, Vector3};
use rand::Rng;

use crate::color;
use crate::geometry::GeometryHandle;
use crate::math;
use crate::picking::{Aabb, Ray};
use crate::render::RenderBackend;
use crate::scene::board::{Board, BoardCell};

/// Default growth factor for [`Node::scale`].
const SCALE_UP: f32 = 1.1;

/// Default shrink factor; the exact inverse of [`SCALE_UP`] so a grow
/// followed by a shrink round-trips.
const SCALE_DOWN: f32 = 1.0 / 1.1;

/// The shapes the input layer can ask the scene to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Sphere,
    Cube,
    /// The compound snow figure: three stacked spheres.
    Figure,
}

/// What a node is, beyond its shared transform state.
#[derive(Debug)]
pub enum NodeKind {
    /// A renderable leaf referencing shared geometry by handle.
    Primitive(GeometryHandle),
    /// An ordered collection of exclusively owned children.
    Composite(Vec<Node>),
    /// The scrollable cell grid with orientation and animation state.
    Board(Board),
    /// One cell of a board. Only ever appears inside a `Board`.
    BoardCell(BoardCell),
}

/// A scene element.
#[derive(Debug)]
pub struct Node {
    /// Accumulated affine translation (and world rotation) matrix.
    pub translation: Matrix4<f32>,
    /// Accumulated scaling matrix; diagonal by construction but stored as a
    /// general matrix.
    pub scaling: Matrix4<f32>,
    /// Index into the shared palette.
    pub color_index: usize,
    /// Whether this node is the current selection.
    pub selected: bool,
    /// Local-space picking proxy.
    pub aabb: Aabb,
    /// What this node is.
    pub kind: NodeKind,
}

impl Node {
    fn base(kind: NodeKind) -> Self {
        Self {
            translation: Matrix4::identity(),
            scaling: Matrix4::identity(),
            color_index: rand::rng().random_range(color::MIN_COLOR..=color::MAX_COLOR),
            selected: false,
            aabb: Aabb::unit(),
            kind,
        }
    }

    /// A sphere primitive of radius 0.5.
    pub fn sphere() -> Self {
        Self::base(NodeKind::Primitive(GeometryHandle::SPHERE))
    }

    /// A sphere primitive with an initial uniform scale applied.
    pub fn sphere_scaled(factor: f32) -> Self {
        let mut node = Self::sphere();
        node.scale(true, Some(factor));
        node
    }

    /// A unit cube primitive.
    pub fn cube() -> Self {
        Self::base(NodeKind::Primitive(GeometryHandle::CUBE))
    }

    /// The snow figure: three stacked spheres of decreasing size, white,
    /// with an aggregate bounding box covering the whole stack.
    pub fn figure() -> Self {
        let mut bottom = Self::sphere();
        bottom.translate(0.0, -0.6, 0.0);
        let mut middle = Self::sphere();
        middle.translate(0.0, 0.1, 0.0);
        middle.scaling = math::scaling(0.8);
        let mut top = Self::sphere();
        top.translate(0.0, 0.75, 0.0);
        top.scaling = math::scaling(0.7);

        let mut children = vec![bottom, middle, top];
        for child in &mut children {
            child.color_index = color::MIN_COLOR;
        }

        let mut node = Self::base(NodeKind::Composite(children));
        node.aabb = Aabb::new(
            Vector3::new(-0.5, -1.1, -0.5),
            Vector3::new(0.5, 1.1, 0.5),
        );
        node
    }

    /// Constructs the node for a placement request.
    pub fn from_shape(shape: ShapeKind) -> Self {
        match shape {
            ShapeKind::Sphere => Self::sphere(),
            ShapeKind::Cube => Self::cube(),
            ShapeKind::Figure => Self::figure(),
        }
    }

    /// Wraps a board in a node. The node's bounding box spans the board
    /// footprint, though picking always resolves to individual cells.
    pub fn board(board: Board) -> Self {
        let (n_i, n_j) = board.board_size();
        let half_x = board.cell_size() * n_i as f32 / 2.0;
        let half_z = board.cell_size() * n_j as f32 / 2.0;
        let mut node = Self::base(NodeKind::Board(board));
        node.aabb = Aabb::new(
            Vector3::new(-half_x, -0.1, -half_z),
            Vector3::new(half_x, 0.1, half_z),
        );
        node
    }

    /// Wraps a cell in a node with a thin box over the cell footprint, so a
    /// top-down pick ray lands on it.
    pub(crate) fn cell(state: BoardCell) -> Self {
        let aabb = Aabb::new(
            Vector3::new(state.x_start, -0.1, state.z_start),
            Vector3::new(state.x_start + state.size, 0.1, state.z_start + state.size),
        );
        let mut node = Self::base(NodeKind::BoardCell(state));
        node.color_index = color::MIN_COLOR;
        node.aabb = aabb;
        node
    }

    /// Accumulates a translation in the node's local frame.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.translation = self.translation * math::translation(Vector3::new(x, y, z));
    }

    /// Moves the node's world origin by exactly `delta`.
    pub fn translate_world(&mut self, delta: Vector3<f32>) {
        self.translation = math::translation(delta) * self.translation;
    }

    /// Rotates the node about the world Y axis, angle in radians. Repeated
    /// rotation pivots the accumulated position around the world origin,
    /// not the node's local origin.
    pub fn rotate_y(&mut self, angle: f32) {
        self.translation = math::rotation_y(angle) * self.translation;
    }

    /// Steps the color index through the palette, wrapping at both ends.
    pub fn rotate_color(&mut self, forward: bool) {
        self.color_index = color::rotated(self.color_index, forward);
    }

    /// Accumulates a uniform scale. The default factor is 1.1 growing and
    /// its inverse shrinking; an explicit factor overrides the default.
    pub fn scale(&mut self, up: bool, custom: Option<f32>) {
        let factor = custom.unwrap_or(if up { SCALE_UP } else { SCALE_DOWN });
        self.scaling = self.scaling * math::scaling(factor);
    }

    /// Sets or toggles the selection flag.
    pub fn select(&mut self, select: Option<bool>) {
        self.selected = select.unwrap_or(!self.selected);
    }

    /// Where the node's local origin sits in world space.
    pub fn world_position(&self) -> Vector3<f32> {
        math::world_position(&self.translation)
    }

    /// Tests the ray against this node's own bounding box.
    ///
    /// `base` is the composed transform above this node (the camera matrix
    /// for roots). The ray is mapped into local space through the inverse of
    /// `base * translation * scaling`; a non-invertible transform (scaled to
    /// nothing) is a miss.
    pub fn pick(&self, ray: &Ray, base: &Matrix4<f32>) -> Option<f32> {
        let to_local = (base * self.translation * self.scaling).invert()?;
        self.aabb.ray_hit(ray, &to_local)
    }

    /// Depth-first pick resolution.
    ///
    /// Returns the nearest hit parameter and the child-index path (relative
    /// to this node; empty means this node itself) of the winner.
    /// Composites try their children first and fall back to their own
    /// aggregate box; boards resolve to individual cells only.
    pub(crate) fn pick_recursive(
        &self,
        ray: &Ray,
        base: &Matrix4<f32>,
    ) -> Option<(f32, Vec<usize>)> {
        match &self.kind {
            NodeKind::Primitive(_) | NodeKind::BoardCell(_) => {
                self.pick(ray, base).map(|t| (t, Vec::new()))
            }
            NodeKind::Composite(children) => {
                let local = base * self.translation * self.scaling;
                let mut best: Option<(f32, Vec<usize>)> = None;
                for (index, child) in children.iter().enumerate() {
                    if let Some((t, mut path)) = child.pick_recursive(ray, &local) {
                        if best.as_ref().map_or(true, |(bt, _)| t < *bt) {
                            path.insert(0, index);
                            best = Some((t, path));
                        }
                    }
                }
                best.or_else(|| self.pick(ray, base).map(|t| (t, Vec::new())))
            }
            NodeKind::Board(board) => {
                let local = base * self.translation * self.scaling;
                board
                    .pick_cell(ray, &local)
                    .map(|(t, index)| (t, vec![index]))
            }
        }
    }

    /// Child at `index`, for path navigation after a pick.
    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
        match &mut self.kind {
            NodeKind::Composite(children) => children.get_mut(index),
            NodeKind::Board(board) => board.cell_node_mut(index),
            _ => None,
        }
    }

    /// Immutable view of this node's children, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Composite(children) => children,
            NodeKind::Board(board) => board.cells(),
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> &mut [Node] {
        match &mut self.kind {
            NodeKind::Composite(children) => children,
            NodeKind::Board(board) => board.cells_mut(),
            _ => &mut [],
        }
    }

    /// Clears the selection flag on this node and every descendant.
    pub(crate) fn clear_selection(&mut self) {
        self.selected = false;
        for child in self.children_mut() {
            child.clear_selection();
        }
    }

    /// Finds the selected node in this subtree, if any.
    pub(crate) fn find_selected(&self) -> Option<&Node> {
        if self.selected {
            return Some(self);
        }
        self.children().iter().find_map(Node::find_selected)
    }

    /// Mutable variant of [`find_selected`](Self::find_selected).
    pub(crate) fn find_selected_mut(&mut self) -> Option<&mut Node> {
        if self.selected {
            return Some(self);
        }
        self.children_mut()
            .iter_mut()
            .find_map(Node::find_selected_mut)
    }

    /// Advances this node's animation state, if it has any. Returns `true`
    /// while more ticks are wanted.
    pub fn tick(&mut self) -> bool {
        let Node {
            translation, kind, ..
        } = self;
        match kind {
            NodeKind::Board(board) => board.tick(translation),
            _ => false,
        }
    }

    /// Forwards a slide request to a board node. `false` on non-boards.
    pub fn request_board_move(&mut self, direction: crate::scene::board::MoveDirection) -> bool {
        let Node {
            translation, kind, ..
        } = self;
        match kind {
            NodeKind::Board(board) => board.request_move(direction, translation),
            _ => false,
        }
    }

    /// Forwards a turn request to a board node. `false` on non-boards.
    pub fn request_board_turn(&mut self, direction: crate::scene::board::TurnDirection) -> bool {
        let Node {
            translation, kind, ..
        } = self;
        match kind {
            NodeKind::Board(board) => board.request_turn(direction, translation),
            _ => false,
        }
    }

    /// Emits this node's geometry under the composed parent matrix.
    ///
    /// `highlight` is set when an ancestor is selected, so composite
    /// selection lights the whole subtree.
    pub fn render(&self, backend: &mut dyn RenderBackend, parent: &Matrix4<f32>, highlight: bool) {
        let current = parent * self.translation * self.scaling;
        let lit = highlight || self.selected;
        match &self.kind {
            NodeKind::Primitive(handle) => {
                backend.draw_geometry(*handle, &current, color::COLORS[self.color_index], lit);
            }
            NodeKind::Composite(children) => {
                for child in children {
                    child.render(backend, &current, lit);
                }
            }
            NodeKind::Board(board) => {
                // The board composes each cell itself; it needs its center
                // for culling and surface curvature.
                board.render(backend, &current, lit);
            }
            NodeKind::BoardCell(_) => {
                // Cells are drawn by their owning board, which knows the
                // board center. A detached cell has nothing to draw.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picking::Ray;
    use cgmath::{InnerSpace, Matrix4};

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vector3::new(x, 5.0, z), Vector3::new(0.0, -1.0, 0.0)).unwrap()
    }

    #[test]
    fn translate_then_pick_hits_at_new_origin() {
        let mut node = Node::cube();
        node.translate(3.0, 0.0, 0.0);
        let identity = Matrix4::identity();
        assert!(node.pick(&down_ray(3.0, 0.0), &identity).is_some());
        // The old origin no longer hits.
        assert!(node.pick(&down_ray(0.0, 0.0), &identity).is_none());
    }

    #[test]
    fn translating_away_turns_a_hit_into_a_miss() {
        let mut node = Node::cube();
        let identity = Matrix4::identity();
        assert!(node.pick(&down_ray(0.0, 0.0), &identity).is_some());
        node.translate(10.0, 0.0, 0.0);
        assert!(node.pick(&down_ray(0.0, 0.0), &identity).is_none());
    }

    #[test]
    fn scaling_widens_the_pick_target() {
        let mut node = Node::cube();
        let identity = Matrix4::identity();
        assert!(node.pick(&down_ray(0.9, 0.0), &identity).is_none());
        node.scale(true, Some(3.0));
        assert!(node.pick(&down_ray(0.9, 0.0), &identity).is_some());
    }

    #[test]
    fn default_scale_factors_round_trip() {
        let mut node = Node::cube();
        node.scale(true, None);
        node.scale(false, None);
        assert!((node.scaling[0][0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_y_pivots_position_around_world_axis() {
        let mut node = Node::cube();
        node.translate(1.0, 0.0, 0.0);
        node.rotate_y(std::f32::consts::FRAC_PI_2);
        let pos = node.world_position();
        assert!((pos - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
    }

    #[test]
    fn translate_world_tracks_exactly_after_rotation() {
        let mut node = Node::cube();
        node.translate(1.0, 0.0, 0.0);
        node.rotate_y(1.2);
        let before = node.world_position();
        node.translate_world(Vector3::new(2.0, 0.0, -1.0));
        let moved = node.world_position() - before;
        assert!((moved - Vector3::new(2.0, 0.0, -1.0)).magnitude() < 1e-6);
    }

    #[test]
    fn select_toggles_without_an_argument() {
        let mut node = Node::sphere();
        node.select(None);
        assert!(node.selected);
        node.select(None);
        assert!(!node.selected);
        node.select(Some(true));
        node.select(Some(true));
        assert!(node.selected);
    }

    #[test]
    fn figure_pick_resolves_to_a_child_sphere() {
        let figure = Node::figure();
        let identity = Matrix4::identity();
        let (_, path) = figure.pick_recursive(&down_ray(0.0, 0.0), &identity).unwrap();
        // The ray through the stack axis lands on one of the spheres.
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn figure_aggregate_box_catches_rays_between_children() {
        let figure = Node::figure();
        let identity = Matrix4::identity();
        // A sideways ray inside the aggregate box but wide of the top
        // sphere's own box and above the middle sphere's.
        let ray = Ray::new(
            Vector3::new(0.45, 0.75, -5.0),
            Vector3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        let (_, path) = figure.pick_recursive(&ray, &identity).unwrap();
        assert!(path.is_empty(), "expected the composite itself to win");
    }

    #[test]
    fn camera_matrix_participates_in_picking() {
        let node = Node::cube();
        // Camera shifted so the world origin appears at x = -2.
        let camera = Matrix4::from_translation(Vector3::new(-2.0, 0.0, 0.0));
        assert!(node.pick(&down_ray(-2.0, 0.0), &camera).is_some());
        assert!(node.pick(&down_ray(0.0, 0.0), &camera).is_none());
    }

    #[test]
    fn render_emits_one_draw_per_figure_sphere() {
        use crate::render::{DrawCall, RecordingBackend};
        let figure = Node::figure();
        let mut backend = RecordingBackend::new();
        figure.render(&mut backend, &Matrix4::identity(), false);
        assert_eq!(backend.calls.len(), 3);
        assert!(backend
            .calls
            .iter()
            .all(|c| matches!(c, DrawCall::Geometry { .. })));
    }

    #[test]
    fn selection_highlight_reaches_children() {
        use crate::render::{DrawCall, RecordingBackend};
        let mut figure = Node::figure();
        figure.select(Some(true));
        let mut backend = RecordingBackend::new();
        figure.render(&mut backend, &Matrix4::identity(), false);
        assert!(backend.calls.iter().all(|c| matches!(
            c,
            DrawCall::Geometry { highlighted: true, .. }
        )));
    }
}
