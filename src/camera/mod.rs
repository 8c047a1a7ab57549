//! Camera rotation control.

pub mod trackball;

pub use trackball::Trackball;
