//! # Trackball Camera Controller
//!
//! Maps 2D screen drags onto a rotation of a virtual sphere centered in the
//! viewport, so the camera orbits a fixed world pivot (the origin). The
//! accumulated rotation persists across gestures; releasing the button only
//! ends the gesture, it never resets the rotation, and dragging never
//! produces a translation component.
//!
//! The drag points are projected onto a sphere blended with a hyperbolic
//! sheet away from the center, which keeps the mapping well behaved when the
//! cursor leaves the sphere's silhouette.

use cgmath::{InnerSpace, Matrix4, Quaternion, Rad, Rotation3, Vector3};

/// Radius of the virtual sphere in normalized viewport units.
const TRACKBALL_SIZE: f32 = 0.8;

/// Cross products smaller than this are treated as a degenerate drag.
const AXIS_EPSILON: f32 = 1e-12;

/// Accumulating arcball rotation controller.
#[derive(Debug, Clone)]
pub struct Trackball {
    rotation: Quaternion<f32>,
    viewport: (f32, f32),
    anchor: Option<(f32, f32)>,
}

impl Trackball {
    /// Creates a controller with the identity rotation.
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            viewport: (viewport_width, viewport_height),
            anchor: None,
        }
    }

    /// Creates a controller pre-tilted about the X axis, for viewers that
    /// start looking down at the board.
    pub fn with_pitch(viewport_width: f32, viewport_height: f32, pitch: Rad<f32>) -> Self {
        let mut ball = Self::new(viewport_width, viewport_height);
        ball.rotation = Quaternion::from_angle_x(pitch);
        ball
    }

    /// Updates the viewport dimensions used to normalize drag coordinates.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    /// Records the screen position where a drag gesture starts.
    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.anchor = Some((x, y));
    }

    /// Composes the rotation increment from the anchor to the new position
    /// into the accumulated rotation, then advances the anchor.
    ///
    /// A no-op unless a drag is in progress. Degenerate increments (the two
    /// projected points coincide) only advance the anchor.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        let Some((ax, ay)) = self.anchor else {
            return;
        };
        let p1 = self.surface_point(ax, ay);
        let p2 = self.surface_point(x, y);
        self.anchor = Some((x, y));

        let axis = p1.cross(p2);
        if axis.magnitude2() < AXIS_EPSILON {
            return;
        }
        let spread = ((p1 - p2).magnitude() / (2.0 * TRACKBALL_SIZE)).clamp(-1.0, 1.0);
        let angle = Rad(2.0 * spread.asin());
        let increment = Quaternion::from_axis_angle(axis.normalize(), angle);
        self.rotation = (increment * self.rotation).normalize();
    }

    /// Ends the gesture. The accumulated rotation is kept.
    pub fn end_drag(&mut self) {
        self.anchor = None;
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    /// The accumulated rotation as a matrix, for composing into the view.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation)
    }

    /// The accumulated rotation as a quaternion.
    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    /// Projects a screen point onto the sphere, falling back to a hyperbolic
    /// sheet once the point is far from the center.
    fn surface_point(&self, x: f32, y: f32) -> Vector3<f32> {
        let (w, h) = self.viewport;
        let nx = (2.0 * x - w) / w;
        let ny = (2.0 * y - h) / h;
        let d = (nx * nx + ny * ny).sqrt();

        let z = if d < TRACKBALL_SIZE * std::f32::consts::FRAC_1_SQRT_2 {
            // Inside the sphere silhouette.
            (TRACKBALL_SIZE * TRACKBALL_SIZE - d * d).sqrt()
        } else {
            // On the hyperbola.
            let t = TRACKBALL_SIZE / std::f32::consts::SQRT_2;
            t * t / d
        };

        Vector3::new(nx, ny, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix, SquareMatrix};

    fn assert_matrix_eq(a: &Matrix4<f32>, b: &Matrix4<f32>, eps: f32) {
        for col in 0..4 {
            for row in 0..4 {
                assert!(
                    (a[col][row] - b[col][row]).abs() < eps,
                    "matrices differ at [{col}][{row}]: {} vs {}",
                    a[col][row],
                    b[col][row]
                );
            }
        }
    }

    #[test]
    fn starts_at_identity() {
        let ball = Trackball::new(640.0, 480.0);
        assert_matrix_eq(&ball.matrix(), &Matrix4::identity(), 1e-6);
    }

    #[test]
    fn drag_produces_a_pure_rotation() {
        let mut ball = Trackball::new(640.0, 480.0);
        ball.begin_drag(320.0, 240.0);
        ball.drag_to(400.0, 240.0);
        ball.end_drag();

        let m = ball.matrix();
        // Orthonormal: M * M^T = I, and no translation appears.
        assert_matrix_eq(&(m * m.transpose()), &Matrix4::identity(), 1e-5);
        assert_eq!(m.w.truncate(), Vector3::new(0.0, 0.0, 0.0));
        // And it actually rotated away from identity.
        assert!((m[0][0] - 1.0).abs() > 1e-4 || (m[2][2] - 1.0).abs() > 1e-4);
    }

    #[test]
    fn rotation_accumulates_across_gestures() {
        let mut once = Trackball::new(640.0, 480.0);
        once.begin_drag(300.0, 240.0);
        once.drag_to(340.0, 240.0);
        once.end_drag();

        let mut twice = once.clone();
        twice.begin_drag(300.0, 240.0);
        twice.drag_to(340.0, 240.0);
        twice.end_drag();

        let single = once.matrix();
        let double = twice.matrix();
        let mut diff = 0.0;
        for col in 0..4 {
            for row in 0..4 {
                diff += (single[col][row] - double[col][row]).abs();
            }
        }
        assert!(diff > 1e-4, "second gesture did not add rotation");
    }

    #[test]
    fn moves_without_begin_are_ignored() {
        let mut ball = Trackball::new(640.0, 480.0);
        ball.drag_to(500.0, 100.0);
        assert_matrix_eq(&ball.matrix(), &Matrix4::identity(), 1e-6);
        assert!(!ball.is_dragging());
    }

    #[test]
    fn zero_length_drag_keeps_rotation() {
        let mut ball = Trackball::new(640.0, 480.0);
        ball.begin_drag(320.0, 240.0);
        ball.drag_to(320.0, 240.0);
        assert_matrix_eq(&ball.matrix(), &Matrix4::identity(), 1e-6);
    }

    #[test]
    fn release_keeps_rotation() {
        let mut ball = Trackball::new(640.0, 480.0);
        ball.begin_drag(320.0, 240.0);
        ball.drag_to(380.0, 260.0);
        let before = ball.matrix();
        ball.end_drag();
        assert_matrix_eq(&ball.matrix(), &before, 1e-6);
    }
}
