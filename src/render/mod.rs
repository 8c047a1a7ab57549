//! # Rendering Backend Boundary
//!
//! The scene graph never issues draw primitives itself. Each frame it walks
//! the node forest and emits calls on a [`RenderBackend`]: immediate-mode
//! draws keyed by opaque geometry handles, with the composed modelview
//! matrix threaded in as data. Selection highlighting is a pure side effect
//! on the backend (an emissive term around the draw), not scene state.
//!
//! [`RecordingBackend`] is a backend that records every call instead of
//! drawing, used by the tests and handy for debugging frame content.

use cgmath::{Matrix4, Vector3};

use crate::geometry::GeometryHandle;

/// Receiver for the scene's draw calls.
pub trait RenderBackend {
    /// Draws shared geometry under the given composed modelview matrix.
    ///
    /// `highlighted` asks for an emissive highlight around the draw; it is
    /// set while the node (or an ancestor) is selected.
    fn draw_geometry(
        &mut self,
        handle: GeometryHandle,
        modelview: &Matrix4<f32>,
        color: [f32; 3],
        highlighted: bool,
    );

    /// Draws a single unlit quad whose corners are already transformed.
    /// Board cells use this for their curved surface.
    fn draw_quad(&mut self, points: [Vector3<f32>; 4], color: [f32; 3]);
}

/// One recorded draw call.
#[derive(Debug, Clone)]
pub enum DrawCall {
    Geometry {
        handle: GeometryHandle,
        modelview: Matrix4<f32>,
        color: [f32; 3],
        highlighted: bool,
    },
    Quad {
        points: [Vector3<f32>; 4],
        color: [f32; 3],
    },
}

/// Backend that records calls for inspection instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Every call received, in emission order.
    pub calls: Vec<DrawCall>,
}

impl RecordingBackend {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded geometry draws for the given handle.
    pub fn geometry_calls(&self, handle: GeometryHandle) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Geometry { handle: h, .. } if *h == handle))
            .collect()
    }

    /// Number of quad draws recorded.
    pub fn quad_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Quad { .. }))
            .count()
    }

    /// Drops everything recorded so far.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn draw_geometry(
        &mut self,
        handle: GeometryHandle,
        modelview: &Matrix4<f32>,
        color: [f32; 3],
        highlighted: bool,
    ) {
        self.calls.push(DrawCall::Geometry {
            handle,
            modelview: *modelview,
            color,
            highlighted,
        });
    }

    fn draw_quad(&mut self, points: [Vector3<f32>; 4], color: [f32; 3]) {
        self.calls.push(DrawCall::Quad { points, color });
    }
}
