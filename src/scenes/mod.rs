//! Ready-made animated scenes.
//!
//! - `camera_rig`: box grid waving with noise, seen through a tweened camera rig
//! - `snow`: a spinning point cloud drifting with wraparound

use crate::data_structures::{
    instance::Property,
    scene_graph::{NodeId, SceneGraph},
};

pub mod camera_rig;
pub mod snow;

/// Tween callback writing the value into one transform component of `node`.
pub fn drive(node: NodeId, property: Property) -> impl FnMut(&mut SceneGraph, f32) + 'static {
    move |graph: &mut SceneGraph, value: f32| {
        // Nodes are never removed, so only a handle from another graph can miss.
        let local = graph.local_mut(node);
        debug_assert!(local.is_ok(), "tween target {:?} is not in this graph", node);
        if let Ok(local) = local {
            local.set(property, value);
        }
    }
}
