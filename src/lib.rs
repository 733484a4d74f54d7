//! flow-scenes
//!
//! Small animated 3D scenes on top of a frame loop. Scenes are plain data
//! (an arena scene graph of transforms with meshes, lights, cameras and point
//! clouds attached); animation comes from tweens, simplex noise and random
//! particle drift. Drawing is delegated to a [`render::Renderer`] so the
//! whole loop can run headless and deterministically.
//!
//! High-level modules
//! - `animation`: easing curves, tweens, simplex noise and random sources
//! - `context`: run configuration and logging setup
//! - `data_structures`: scene graph, transforms, scene models and particles
//! - `flow`: the `GraphicsFlow` trait and the frame loop
//! - `render`: render submissions and the headless renderer
//! - `scenes`: the camera rig and snow scenes
//! - `time`: clocks and frame scheduling
//!

pub mod animation;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod render;
pub mod scenes;
pub mod time;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use instant::Duration;
