//! Engine data structures: transforms, renderables, particles and the scene graph.
//!
//! - `instance` holds the per-node transformation (position, Euler rotation, scale)
//! - `model` describes what a node renders: meshes, points, cameras, lights, fog
//! - `particles` is a flat point buffer with per-frame drift and wraparound
//! - `scene_graph` enables hierarchical scene organization and name lookup

pub mod instance;
pub mod model;
pub mod particles;
pub mod scene_graph;
