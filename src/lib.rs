// src/lib.rs
//! Boardcraft Scene Kernel
//!
//! A retained scene graph with ray picking, a trackball camera, and an
//! incrementally animated board, built on cgmath. The crate stays backend
//! agnostic: rendering is a trait boundary the host implements, and input
//! arrives as plain rays and drag coordinates.

pub mod animation;
pub mod camera;
pub mod color;
pub mod geometry;
pub mod math;
pub mod picking;
pub mod prelude;
pub mod render;
pub mod scene;

// Re-export main types for convenience
pub use scene::{Node, Scene};
