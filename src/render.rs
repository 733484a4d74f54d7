//! Render submission and the renderer capability.
//!
//! Flows describe what to draw with a [`Render`]; the frame loop hands it to
//! whatever [`Renderer`] the host provides. [`HeadlessRenderer`] is the
//! built-in implementation: it does everything a GPU backend would need to do
//! on the CPU side (camera matrices, culling of hidden nodes, buffer uploads
//! for changed particle data) and records the result as [`FrameStats`].

use std::collections::HashMap;

use cgmath::{InnerSpace, Matrix4};
use log::{debug, trace};
use thiserror::Error;

use crate::data_structures::{
    model::Attachment,
    scene_graph::{NodeId, SceneError, SceneGraph},
};

/// Specifies what a flow wants drawn this frame.
///
/// - `None` renders nothing
/// - `Scene` renders a whole graph as seen from the camera node
/// - `Composed` renders several submissions in order
pub enum Render<'a> {
    None,
    Scene {
        graph: &'a SceneGraph,
        camera: NodeId,
    },
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub fn scene(graph: &'a SceneGraph, camera: NodeId) -> Self {
        Render::Scene { graph, camera }
    }

    /// Flattens compositions into the scenes they contain, in draw order.
    pub fn scenes(self) -> Vec<(&'a SceneGraph, NodeId)> {
        match self {
            Render::None => Vec::new(),
            Render::Scene { graph, camera } => vec![(graph, camera)],
            Render::Composed(renders) => renders.into_iter().flat_map(Render::scenes).collect(),
        }
    }
}

/// Draws one frame. Called once per flow per tick, after all updates.
pub trait Renderer {
    fn render(&mut self, render: Render<'_>) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("camera node is not part of the scene: {0}")]
    MissingCamera(#[from] SceneError),
    #[error("node {0:?} has no camera attached")]
    NotACamera(NodeId),
    #[error("camera {0:?} has a singular world transform")]
    SingularCamera(NodeId),
}

/// What the headless renderer did in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub scenes: usize,
    pub meshes: usize,
    pub lights: usize,
    /// Number of points across all visible particle buffers.
    pub points: usize,
    /// Particle buffers whose data changed since the last upload.
    pub uploads: usize,
    pub uploaded_bytes: usize,
    /// Meshes hidden almost entirely by fog.
    pub fogged: usize,
    pub view_proj: Option<Matrix4<f32>>,
}

/// Upload bookkeeping of graphs not drawn for this many render calls is dropped.
pub const FORGET_AFTER: u64 = 600;

#[derive(Debug, Default)]
struct Uploads {
    /// Render call that last drew the graph.
    last_seen: u64,
    versions: HashMap<NodeId, u64>,
}

/// A renderer that performs no rasterization.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    /// Last uploaded buffer version per graph id and node.
    uploaded: HashMap<u64, Uploads>,
    last: FrameStats,
    total_uploads: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `render` calls, i.e. frames times flows.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> &FrameStats {
        &self.last
    }

    pub fn total_uploads(&self) -> u64 {
        self.total_uploads
    }

    /// Number of graphs whose uploaded buffers are still tracked.
    pub fn tracked_graphs(&self) -> usize {
        self.uploaded.len()
    }

    fn draw_scene(
        &mut self,
        graph: &SceneGraph,
        camera: NodeId,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let projection = match &graph.node(camera)?.attachment {
            Some(Attachment::Camera(projection)) => *projection,
            _ => return Err(RenderError::NotACamera(camera)),
        };
        let camera_world = graph.world_matrix(camera)?;
        let view_proj = projection
            .view_proj(camera_world)
            .ok_or(RenderError::SingularCamera(camera))?;
        let eye = camera_world.w.truncate();
        let frame = self.frames;
        let uploads = self.uploaded.entry(graph.id()).or_default();
        uploads.last_seen = frame;
        stats.view_proj = Some(view_proj);
        stats.scenes += 1;

        for (id, world) in graph.world_matrices() {
            let node = graph.node(id)?;
            let Some(attachment) = &node.attachment else {
                continue;
            };
            if !graph.is_visible(id) {
                continue;
            }
            match attachment {
                Attachment::Mesh(_) => {
                    stats.meshes += 1;
                    if let Some(fog) = graph.fog {
                        let distance = (world.w.truncate() - eye).magnitude();
                        if fog.factor(distance) > 0.99 {
                            stats.fogged += 1;
                        }
                    }
                }
                Attachment::Points(points) => {
                    stats.points += points.buffer.len();
                    let version = points.buffer.version();
                    let seen = uploads.versions.insert(id, version);
                    if seen != Some(version) {
                        stats.uploads += 1;
                        stats.uploaded_bytes += points.buffer.as_bytes().len();
                        trace!(
                            "uploading {} bytes of points for {:?} (version {})",
                            points.buffer.as_bytes().len(),
                            id,
                            version
                        );
                    }
                }
                Attachment::Light(_) => stats.lights += 1,
                Attachment::Camera(_) => (),
            }
        }
        Ok(())
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, render: Render<'_>) -> anyhow::Result<()> {
        let mut stats = FrameStats {
            frame: self.frames,
            ..Default::default()
        };
        for (graph, camera) in render.scenes() {
            self.draw_scene(graph, camera, &mut stats)?;
        }
        debug!(
            "frame {}: {} meshes ({} fogged), {} lights, {} points, {} uploads",
            stats.frame, stats.meshes, stats.fogged, stats.lights, stats.points, stats.uploads
        );
        self.total_uploads += stats.uploads as u64;
        let frame = self.frames;
        self.uploaded
            .retain(|_, uploads| frame - uploads.last_seen <= FORGET_AFTER);
        self.frames += 1;
        self.last = stats;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{
        model::{Mesh, Geometry, Material, Colour, PerspectiveCamera, Points, PointsMaterial},
        particles::ParticleBuffer,
        scene_graph::SceneNode,
    };

    /// A graph with a camera, one box and `points` particles.
    fn scene(points: usize) -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let camera = graph
            .add(root, SceneNode::with_attachment(PerspectiveCamera::default()))
            .unwrap();
        let cube = Mesh::new(
            Geometry::Box { width: 1.0, height: 1.0, depth: 1.0 },
            Material::basic(Colour::WHITE),
        );
        graph.add(root, SceneNode::with_attachment(cube)).unwrap();
        let points = Points {
            buffer: ParticleBuffer::at_origin(points),
            material: PointsMaterial::default(),
        };
        graph.add(root, SceneNode::with_attachment(points)).unwrap();
        (graph, camera)
    }

    #[test]
    fn composed_submission_draws_every_scene() {
        let (background, back_camera) = scene(10);
        let (foreground, front_camera) = scene(5);
        let mut renderer = HeadlessRenderer::new();

        renderer
            .render(Render::Composed(vec![
                Render::scene(&background, back_camera),
                Render::None,
                Render::Composed(vec![Render::scene(&foreground, front_camera)]),
            ]))
            .unwrap();

        let stats = renderer.last_frame();
        assert_eq!(stats.scenes, 2);
        assert_eq!(stats.meshes, 2);
        assert_eq!(stats.points, 15);
        assert_eq!(stats.uploads, 2);
        assert_eq!(renderer.frames(), 1);
        assert_eq!(renderer.tracked_graphs(), 2);
    }

    #[test]
    fn replacement_graph_is_uploaded_again() {
        let mut renderer = HeadlessRenderer::new();
        let (first, camera) = scene(3);
        renderer.render(Render::scene(&first, camera)).unwrap();
        renderer.render(Render::scene(&first, camera)).unwrap();
        assert_eq!(renderer.total_uploads(), 1);
        drop(first);

        // same node handles and buffer version, different graph
        let (second, camera) = scene(3);
        renderer.render(Render::scene(&second, camera)).unwrap();
        assert_eq!(renderer.total_uploads(), 2);
    }

    #[test]
    fn graphs_no_longer_drawn_are_forgotten() {
        let mut renderer = HeadlessRenderer::new();
        let (old, old_camera) = scene(1);
        let (current, camera) = scene(1);
        renderer.render(Render::scene(&old, old_camera)).unwrap();
        for _ in 0..=FORGET_AFTER {
            renderer.render(Render::scene(&current, camera)).unwrap();
        }
        assert_eq!(renderer.tracked_graphs(), 1);
    }

    #[test]
    fn camera_node_must_carry_a_camera() {
        let (graph, _) = scene(1);
        let mut renderer = HeadlessRenderer::new();
        let err = renderer.render(Render::scene(&graph, graph.root())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::NotACamera(_))
        ));
    }
}
