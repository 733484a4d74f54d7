//! A spinning cloud of snow particles.

use cgmath::Vector3;
use instant::Duration;
use log::{debug, info};

use crate::{
    animation::random::{RandomSource, StdRandom},
    context::Context,
    data_structures::{
        model::{Attachment, Blending, Colour, PerspectiveCamera, Points, PointsMaterial},
        particles::{DEFAULT_BOUND, ParticleBuffer},
        scene_graph::{NodeId, SceneGraph, SceneNode},
    },
    flow::{GraphicsFlow, Out},
    render::Render,
};

pub const PARTICLE_SYSTEM: &str = "particleSystem";
pub const CAMERA: &str = "camera";

/// Mixed into the run seed for the initial scatter, so the starting positions
/// and the per-frame drift come from different streams.
pub const SCATTER_SALT: u64 = 0x5eed_5a17_c0de_f00d;

#[derive(Debug, Clone)]
pub struct SnowConfig {
    pub count: usize,
    /// Edge length of the cube the particles start in.
    pub distance: f32,
    /// Wraparound bound per axis.
    pub bound: f32,
    /// Radians added to the system's y rotation each frame.
    pub spin: f32,
    pub texture: String,
    pub background: Colour,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            count: 20_000,
            distance: 100.0,
            bound: DEFAULT_BOUND,
            spin: 0.005,
            texture: "assets/textures/particle.jpg".to_string(),
            background: Colour::from_rgb8(20, 20, 20),
        }
    }
}

pub struct Snow {
    graph: SceneGraph,
    system: NodeId,
    camera: NodeId,
    spin: f32,
    background: Colour,
}

impl Snow {
    /// Scatters the particles with a generator derived from the run seed.
    pub fn from_context(ctx: &Context) -> anyhow::Result<Self> {
        let mut rng = StdRandom::seeded(ctx.seed_or_random() ^ SCATTER_SALT);
        Self::new(ctx, &mut rng)
    }

    pub fn new(ctx: &Context, rng: &mut dyn RandomSource) -> anyhow::Result<Self> {
        Self::with_config(ctx, SnowConfig::default(), rng)
    }

    pub fn with_config(ctx: &Context, config: SnowConfig, rng: &mut dyn RandomSource) -> anyhow::Result<Self> {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph.background = config.background;

        let buffer = ParticleBuffer::scattered(config.count, config.distance, rng).with_bound(config.bound);
        let material = PointsMaterial {
            colour: Colour::WHITE,
            size: 1.0,
            map: Some(config.texture.clone()),
            transparent: true,
            blending: Blending::Additive,
            depth_write: true,
        };
        graph.add(
            root,
            SceneNode::with_attachment(Points { buffer, material }).named(PARTICLE_SYSTEM),
        )?;

        // Placed above the origin and pitched down to look at it.
        let mut camera = SceneNode::with_attachment(PerspectiveCamera::new(
            cgmath::Deg(45.0),
            ctx.aspect,
            1.0,
            1000.0,
        ))
        .named(CAMERA)
        .at(Vector3::new(0.0, 1.0, 0.0));
        camera.local.rotation.x = -std::f32::consts::FRAC_PI_2;
        graph.add(root, camera)?;

        let system = graph.find(PARTICLE_SYSTEM)?;
        let camera = graph.find(CAMERA)?;
        info!("snow ready: {} particles within +/-{}", config.count, config.bound);
        Ok(Self {
            graph,
            system,
            camera,
            spin: config.spin,
            background: config.background,
        })
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn system(&self) -> NodeId {
        self.system
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    pub fn buffer(&self) -> anyhow::Result<&ParticleBuffer> {
        match &self.graph.node(self.system)?.attachment {
            Some(Attachment::Points(points)) => Ok(&points.buffer),
            _ => anyhow::bail!("{} carries no points", PARTICLE_SYSTEM),
        }
    }

    /// One frame: spin the whole system, then drift every particle.
    pub fn update(&mut self, rng: &mut dyn RandomSource) -> anyhow::Result<()> {
        let node = self.graph.node_mut(self.system)?;
        node.local.rotation.y += self.spin;
        let Some(Attachment::Points(points)) = &mut node.attachment else {
            anyhow::bail!("{} carries no points", PARTICLE_SYSTEM);
        };
        points.buffer.update(rng);
        debug!(
            "snow spun to {:.3} rad, buffer version {}",
            node.local.rotation.y,
            points.buffer.version()
        );
        Ok(())
    }
}

impl GraphicsFlow for Snow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut dyn RandomSource) -> anyhow::Result<Out> {
        ctx.clear_colour = self.background;
        Ok(Out::Empty)
    }

    fn on_update(
        &mut self,
        _: &Context,
        _: Duration,
        rng: &mut dyn RandomSource,
    ) -> anyhow::Result<Out> {
        self.update(rng)?;
        Ok(Out::Empty)
    }

    fn on_render(&self) -> Render<'_> {
        Render::scene(&self.graph, self.camera)
    }

    fn name(&self) -> &str {
        "snow"
    }
}
