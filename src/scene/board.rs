//! # Board, Cells and the Board Animation State Machine
//!
//! The board is a specialized composite node: a 2D grid of [`BoardCell`]
//! nodes laid out in the XZ plane, plus orientation state (a discrete
//! forward-direction index) and a logical center point that tracks the
//! board's cumulative translation. Moving the board slides the whole grid
//! under a fixed camera point while the center bookkeeping keeps
//! cell-to-center distances correct, which drives both the render-time
//! culling and the automatic marker promotion.
//!
//! Slides and turns animate incrementally through [`StepAnimation`]: a
//! request starts (or merges into) an animation and applies the first step;
//! the embedding loop then calls `tick` until it returns `false`.

use cgmath::{InnerSpace, Matrix4, Vector3};
use log::{debug, trace};
use std::f32::consts::FRAC_PI_2;
use std::path::Path;
use thiserror::Error;

use crate::animation::{StepAnimation, DEFAULT_STEP_RATIO};
use crate::math;
use crate::picking::Ray;
use crate::render::RenderBackend;
use crate::scene::node::{Node, NodeKind};

/// Planar distance at or under which an unmarked token is promoted.
pub const MARKER_ARRIVAL_DISTANCE: f32 = 0.1;

/// Cells farther than this from the board center are not rendered.
pub const VISIBLE_RADIUS: f32 = 8.0;

/// Quadratic droop applied to cell corners by distance from center.
const CURVATURE: f32 = -0.04;

/// Height of a marker sphere above its cell.
const MARKER_LIFT: f32 = 0.15;

/// Base color of cells where `(i + j)` is even.
pub const MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];

/// Base color of cells where `(i + j)` is odd.
pub const CYAN: [f32; 3] = [0.0, 1.0, 1.0];

/// Direction of a board slide request, relative to the board's current
/// forward direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
}

/// Direction of a 90-degree board turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Token state of a cell that carries a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Placed but not yet reached by the board center.
    Unmarked,
    /// Reached; terminal state.
    Marked,
}

/// Errors rejected while parsing a textual board map.
#[derive(Debug, Error)]
pub enum BoardMapError {
    #[error("board map is empty")]
    Empty,
    #[error("board map must have odd width and height, got {width}x{height}")]
    EvenDimensions { width: usize, height: usize },
    #[error("board map row {row} has length {len}, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("board map row {row} contains non-digit character {found:?}")]
    InvalidDigit { row: usize, found: char },
}

/// One grid cell. Lives inside a board node as `NodeKind::BoardCell`.
#[derive(Debug, Clone)]
pub struct BoardCell {
    /// Grid column.
    pub i: usize,
    /// Grid row.
    pub j: usize,
    /// Checkerboard color, fixed at construction by `(i + j)` parity.
    pub base_color: [f32; 3],
    /// X of the cell's anchor corner, in board-local space.
    pub x_start: f32,
    /// Z of the cell's anchor corner, in board-local space.
    pub z_start: f32,
    /// Edge length.
    pub size: f32,
    /// Optional token on this cell.
    pub marker: Option<Marker>,
}

impl BoardCell {
    /// Center of the cell projected to the XZ plane.
    pub fn center_of_mass(&self) -> Vector3<f32> {
        Vector3::new(
            self.x_start + self.size / 2.0,
            0.0,
            self.z_start + self.size / 2.0,
        )
    }

    /// The anchor corner, which is what the marker promotion rule measures.
    pub fn anchor(&self) -> Vector3<f32> {
        Vector3::new(self.x_start, 0.0, self.z_start)
    }

    /// Distance from the cell center to the given board center, projected
    /// to the XZ plane.
    pub fn distance_to(&self, center: Vector3<f32>) -> f32 {
        (self.center_of_mass() - center).magnitude()
    }

    /// The flat base corners of the cell, before curvature is applied.
    /// The last point is the anchor corner.
    fn corner_points(&self) -> [Vector3<f32>; 4] {
        let (x, z, s) = (self.x_start, self.z_start, self.size);
        [
            Vector3::new(x, 0.0, z + s),
            Vector3::new(x + s, 0.0, z + s),
            Vector3::new(x + s, 0.0, z),
            Vector3::new(x, 0.0, z),
        ]
    }
}

/// An in-flight slide along the board's local forward axis. Merged requests
/// extend the same outstanding target.
#[derive(Debug)]
struct Slide {
    anim: StepAnimation,
}

/// An in-flight 90-degree turn.
#[derive(Debug)]
struct Turn {
    anim: StepAnimation,
}

/// The board: grid dimensions, cells, orientation and animation state.
///
/// The board itself holds no transform; it lives inside a [`Node`] whose
/// translation matrix the animation methods mutate.
#[derive(Debug)]
pub struct Board {
    board_size: (usize, usize),
    cell_size: f32,
    dir_idx: u8,
    center: Vector3<f32>,
    cells: Vec<Node>,
    slide: Option<Slide>,
    turn: Option<Turn>,
}

impl Board {
    /// Builds a board with the given cell grid dimensions and no markers.
    pub fn new(board_size: (usize, usize), cell_size: f32) -> Self {
        Self::build(board_size, cell_size, None)
    }

    /// Parses a textual marker map and builds the board it describes.
    ///
    /// The map is rows of digits, one row per line; nonzero digits place an
    /// unmarked token. Width and height must both be odd and every row must
    /// have the same length. The cell grid is one larger than the map in
    /// each dimension.
    pub fn from_map(text: &str, cell_size: f32) -> Result<Self, BoardMapError> {
        let mut rows: Vec<Vec<u8>> = Vec::new();
        for (row, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let mut digits = Vec::with_capacity(line.len());
            for c in line.chars() {
                let digit = c
                    .to_digit(10)
                    .ok_or(BoardMapError::InvalidDigit { row, found: c })?;
                digits.push(digit as u8);
            }
            rows.push(digits);
        }

        let height = rows.len();
        if height == 0 {
            return Err(BoardMapError::Empty);
        }
        let width = rows[0].len();
        for (row, digits) in rows.iter().enumerate() {
            if digits.len() != width {
                return Err(BoardMapError::RaggedRow {
                    row,
                    len: digits.len(),
                    expected: width,
                });
            }
        }
        if width % 2 == 0 || height % 2 == 0 {
            return Err(BoardMapError::EvenDimensions { width, height });
        }

        Ok(Self::build((width + 1, height + 1), cell_size, Some(&rows)))
    }

    /// Reads a marker map from disk and builds the board.
    pub fn from_map_file<P: AsRef<Path>>(path: P, cell_size: f32) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading board map {}", path.display()))?;
        let board = Self::from_map(&text, cell_size)
            .with_context(|| format!("parsing board map {}", path.display()))?;
        Ok(board)
    }

    fn build(board_size: (usize, usize), cell_size: f32, map: Option<&[Vec<u8>]>) -> Self {
        let (n_i, n_j) = board_size;
        let mut cells = Vec::with_capacity(n_i * n_j);

        for i in 0..n_i {
            for j in 0..n_j {
                let base_color = if (i + j) % 2 == 0 { MAGENTA } else { CYAN };
                let x_start = -(cell_size * n_i as f32) / 2.0 + i as f32 * cell_size;
                let z_start = -(cell_size * n_j as f32) / 2.0 + j as f32 * cell_size;

                // The map denotes markers at grid line crossings, so the
                // first cell row and column in each axis carry none.
                let marker = match map {
                    Some(rows) if i > 1 && j > 1 && rows[j - 1][i - 1] != 0 => {
                        Some(Marker::Unmarked)
                    }
                    _ => None,
                };

                cells.push(Node::cell(BoardCell {
                    i,
                    j,
                    base_color,
                    x_start,
                    z_start,
                    size: cell_size,
                    marker,
                }));
            }
        }

        let mut board = Self {
            board_size,
            cell_size,
            dir_idx: 0,
            center: Vector3::new(0.0, 0.0, 0.0),
            cells,
            slide: None,
            turn: None,
        };
        board.refresh_markers();
        board
    }

    /// Cell grid dimensions.
    pub fn board_size(&self) -> (usize, usize) {
        self.board_size
    }

    /// Edge length of one cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Discrete orientation index, 0..=3.
    pub fn dir_idx(&self) -> u8 {
        self.dir_idx
    }

    /// The board's logical center in board-local space. Starts at the
    /// origin and is decremented by every applied slide delta.
    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    /// All cell nodes, row-major by column index.
    pub fn cells(&self) -> &[Node] {
        &self.cells
    }

    /// The cell node at grid coordinates `(i, j)`.
    pub fn cell_at(&self, i: usize, j: usize) -> Option<&Node> {
        if i >= self.board_size.0 || j >= self.board_size.1 {
            return None;
        }
        self.cells.get(i * self.board_size.1 + j)
    }

    pub(crate) fn cell_node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.cells.get_mut(index)
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Node] {
        &mut self.cells
    }

    /// World direction the board currently calls forward.
    pub fn forward_direction(&self) -> Vector3<f32> {
        match self.dir_idx {
            0 => Vector3::new(0.0, 0.0, 1.0),
            1 => Vector3::new(1.0, 0.0, 0.0),
            2 => Vector3::new(0.0, 0.0, -1.0),
            _ => Vector3::new(-1.0, 0.0, 0.0),
        }
    }

    /// Opposite of [`forward_direction`](Self::forward_direction).
    pub fn backward_direction(&self) -> Vector3<f32> {
        -self.forward_direction()
    }

    /// Whether any slide or turn is in flight.
    pub fn is_animating(&self) -> bool {
        self.slide.is_some() || self.turn.is_some()
    }

    /// Full target of the active slide, if one is in flight.
    pub fn slide_target(&self) -> Option<f32> {
        self.slide.as_ref().map(|s| s.anim.target())
    }

    /// Full target angle of the active turn, if one is in flight.
    pub fn turn_target(&self) -> Option<f32> {
        self.turn.as_ref().map(|t| t.anim.target())
    }

    /// Requests a one-cell slide along the current forward direction.
    ///
    /// While a slide is already in flight the new request merges into its
    /// outstanding target, extending the same animation session. Otherwise a
    /// session starts and the first step is applied immediately.
    ///
    /// Returns `true` when a slide is active afterwards.
    pub fn request_move(&mut self, direction: MoveDirection, transform: &mut Matrix4<f32>) -> bool {
        let signed = match direction {
            MoveDirection::Forward => self.cell_size,
            MoveDirection::Backward => -self.cell_size,
        };

        if let Some(slide) = &mut self.slide {
            slide.anim.extend(signed);
            debug!("merged slide request, target now {}", slide.anim.target());
            return true;
        }

        match StepAnimation::new(signed, DEFAULT_STEP_RATIO) {
            Some(anim) => {
                debug!("starting board slide, target {signed}");
                self.slide = Some(Slide { anim });
                self.step_slide(transform);
                true
            }
            None => false,
        }
    }

    /// Requests a 90-degree turn about the world Y axis.
    ///
    /// Turn targets are exact quarter turns and are never perturbed
    /// mid-flight: a request arriving while a turn is active is ignored.
    /// The orientation index is committed when the request is accepted,
    /// before the visual animation completes.
    ///
    /// Returns `true` when the request was accepted.
    pub fn request_turn(&mut self, direction: TurnDirection, transform: &mut Matrix4<f32>) -> bool {
        if self.turn.is_some() {
            trace!("ignoring turn request while a turn is in flight");
            return false;
        }

        let angle = match direction {
            TurnDirection::Right => FRAC_PI_2,
            TurnDirection::Left => -FRAC_PI_2,
        };
        self.dir_idx = match direction {
            TurnDirection::Right => (self.dir_idx + 1) % 4,
            TurnDirection::Left => (self.dir_idx + 3) % 4,
        };
        debug!("starting board turn, dir_idx now {}", self.dir_idx);

        // A quarter turn is never zero, so construction cannot fail.
        if let Some(anim) = StepAnimation::new(angle, DEFAULT_STEP_RATIO) {
            self.turn = Some(Turn { anim });
            self.step_turn(transform);
        }
        true
    }

    /// Advances both animation channels one step. Returns `true` while
    /// anything is still animating, so the caller reschedules exactly one
    /// more tick.
    pub fn tick(&mut self, transform: &mut Matrix4<f32>) -> bool {
        self.step_slide(transform);
        self.step_turn(transform);
        self.is_animating()
    }

    fn step_slide(&mut self, transform: &mut Matrix4<f32>) {
        let Some(slide) = &mut self.slide else {
            return;
        };
        let step = slide.anim.advance();
        // Slides compose in the board's local frame, so the delta stays
        // aligned with the cell grid however the board has turned, and the
        // same vector keeps the center bookkeeping in that frame.
        let delta = Vector3::new(0.0, 0.0, step.delta());

        // The board moves through the world while the camera point stays
        // fixed, so the logical center moves the opposite way.
        *transform = *transform * math::translation(delta);
        self.center -= delta;

        if step.is_finished() {
            debug!("board slide animation complete");
            self.slide = None;
        }
        self.refresh_markers();
    }

    fn step_turn(&mut self, transform: &mut Matrix4<f32>) {
        let Some(turn) = &mut self.turn else {
            return;
        };
        let step = turn.anim.advance();
        *transform = math::rotation_y(step.delta()) * *transform;

        if step.is_finished() {
            debug!("board turn animation complete");
            self.turn = None;
        }
    }

    /// Promotes unmarked tokens whose cell has scrolled within
    /// [`MARKER_ARRIVAL_DISTANCE`] of the board center.
    pub fn refresh_markers(&mut self) {
        let center = self.center;
        for cell in &mut self.cells {
            if let NodeKind::BoardCell(state) = &mut cell.kind {
                if state.marker == Some(Marker::Unmarked)
                    && (state.anchor() - center).magnitude() <= MARKER_ARRIVAL_DISTANCE
                {
                    debug!("marker at cell ({}, {}) arrived", state.i, state.j);
                    state.marker = Some(Marker::Marked);
                }
            }
        }
    }

    /// Tests the ray against every cell, returning the nearest hit and the
    /// index of the winning cell. The board itself is not selectable.
    pub(crate) fn pick_cell(&self, ray: &Ray, board_matrix: &Matrix4<f32>) -> Option<(f32, usize)> {
        let mut best: Option<(f32, usize)> = None;
        for (index, cell) in self.cells.iter().enumerate() {
            if let Some(t) = cell.pick(ray, board_matrix) {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, index));
                }
            }
        }
        best
    }

    /// Draws every visible cell: the curved checkerboard quad plus a marker
    /// sphere where a token sits.
    pub(crate) fn render(
        &self,
        backend: &mut dyn RenderBackend,
        board_matrix: &Matrix4<f32>,
        highlight: bool,
    ) {
        for cell in &self.cells {
            let NodeKind::BoardCell(state) = &cell.kind else {
                continue;
            };
            if state.distance_to(self.center) >= VISIBLE_RADIUS {
                continue;
            }

            let cell_matrix = board_matrix * cell.translation * cell.scaling;
            let lit = highlight || cell.selected;

            // Curve the surface downward by distance from the center, then
            // move the corners into view space.
            let mut points = state.corner_points();
            for point in &mut points {
                let d = (*point - self.center).magnitude();
                point.y = CURVATURE * d * d;
                *point = (cell_matrix * point.extend(1.0)).truncate();
            }
            backend.draw_quad(points, state.base_color);

            if let Some(marker) = state.marker {
                let color = match marker {
                    Marker::Unmarked => crate::color::COLORS[crate::color::MIN_COLOR],
                    Marker::Marked => crate::color::COLORS[8],
                };
                // The token rides the anchor corner of its cell.
                let mut anchor = state.anchor();
                let d = (anchor - self.center).magnitude();
                anchor.y = CURVATURE * d * d + MARKER_LIFT;
                let sphere = cell_matrix * math::translation(anchor) * math::scaling(0.5);
                backend.draw_geometry(crate::geometry::GeometryHandle::SPHERE, &sphere, color, lit);
            }
        }
    }
}
