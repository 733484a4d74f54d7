//! A grid of boxes whose heights wave with noise, filmed by a tweened camera rig.
//!
//! The camera hangs at the end of a chain of groups, one per degree of
//! freedom, so each tween or noise signal writes a single component of a
//! single node and the rotations compose through the hierarchy:
//!
//! ```text
//! cameraYRotation -> cameraXRotation -> cameraZPosition -> cameraYPosition -> cameraZRotation -> camera
//! ```

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Deg, Vector3};
use instant::Duration;
use log::{debug, info};

use crate::{
    animation::{
        easing::Easing,
        noise::Simplex,
        random::RandomSource,
        tween::{Tween, TweenEngine},
    },
    context::Context,
    data_structures::{
        instance::Property,
        model::{Colour, Fog, Geometry, Light, LightKind, Material, Mesh, PerspectiveCamera, Shadow},
        scene_graph::{NodeId, SceneError, SceneGraph, SceneNode},
    },
    flow::{GraphicsFlow, Out},
    render::Render,
    scenes::drive,
};

pub const PLANE: &str = "plane-1";
pub const BOX_GRID: &str = "boxGrid";
pub const LIGHT: &str = "directionalLight";
pub const CAMERA: &str = "camera";
pub const CAMERA_Y_ROTATION: &str = "cameraYRotation";
pub const CAMERA_X_ROTATION: &str = "cameraXRotation";
pub const CAMERA_Z_POSITION: &str = "cameraZPosition";
pub const CAMERA_Y_POSITION: &str = "cameraYPosition";
pub const CAMERA_Z_ROTATION: &str = "cameraZRotation";

/// Keeps grid boxes from collapsing to zero height.
pub const MIN_HEIGHT: f32 = 0.001;
/// Amplitude of the camera roll, in radians.
pub const SWAY_AMPLITUDE: f32 = 0.02;
pub const SWAY_SPEED: f32 = 1.5;

#[derive(Debug, Clone)]
pub struct CameraRigConfig {
    /// Boxes per grid row and column.
    pub amount: usize,
    pub separation: f32,
    pub fog: Option<Fog>,
    pub background: Colour,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            amount: 20,
            separation: 2.5,
            fog: Some(Fog::exp2(Colour::from_hex(0xffffff), 0.01)),
            background: Colour::from_rgb8(120, 120, 120),
        }
    }
}

/// Handles of the rig groups, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rig {
    pub y_rotation: NodeId,
    pub x_rotation: NodeId,
    pub z_position: NodeId,
    pub y_position: NodeId,
    pub z_rotation: NodeId,
    pub camera: NodeId,
}

impl Rig {
    fn resolve(graph: &SceneGraph) -> Result<Self, SceneError> {
        Ok(Self {
            y_rotation: graph.find(CAMERA_Y_ROTATION)?,
            x_rotation: graph.find(CAMERA_X_ROTATION)?,
            z_position: graph.find(CAMERA_Z_POSITION)?,
            y_position: graph.find(CAMERA_Y_POSITION)?,
            z_rotation: graph.find(CAMERA_Z_ROTATION)?,
            camera: graph.find(CAMERA)?,
        })
    }
}

pub struct CameraRig {
    graph: SceneGraph,
    tweens: TweenEngine<SceneGraph>,
    noise: Simplex,
    rig: Rig,
    box_grid: NodeId,
    background: Colour,
}

impl CameraRig {
    pub fn new(ctx: &Context) -> anyhow::Result<Self> {
        Self::with_config(ctx, CameraRigConfig::default(), Simplex::new(ctx.seed_or_random()))
    }

    pub fn with_config(ctx: &Context, config: CameraRigConfig, noise: Simplex) -> anyhow::Result<Self> {
        let graph = build_scene(&config, ctx.aspect)?;
        Self::from_graph(graph, noise, config.background)
    }

    /**
     * Takes over a graph that already contains the rig and grid nodes by name
     * and starts the camera tweens on it.
     *
     * Fails with [`SceneError::NodeNotFound`] if one of the named nodes is missing.
     */
    pub fn from_graph(graph: SceneGraph, noise: Simplex, background: Colour) -> anyhow::Result<Self> {
        let rig = Rig::resolve(&graph)?;
        let box_grid = graph.find(BOX_GRID)?;
        let mut tweens = TweenEngine::new();
        start_camera_tweens(&mut tweens, &rig)?;
        info!(
            "camera rig ready: {} nodes, {} boxes, noise seed {}",
            graph.len(),
            graph.children(box_grid)?.len(),
            noise.seed()
        );
        Ok(Self {
            graph,
            tweens,
            noise,
            rig,
            box_grid,
            background,
        })
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn rig(&self) -> Rig {
        self.rig
    }

    pub fn box_grid(&self) -> NodeId {
        self.box_grid
    }

    pub fn tweens(&self) -> &TweenEngine<SceneGraph> {
        &self.tweens
    }

    pub fn noise(&self) -> &Simplex {
        &self.noise
    }

    /// One frame of animation at scene time `elapsed`.
    pub fn update(&mut self, elapsed: Duration) -> Result<(), SceneError> {
        self.tweens.advance(elapsed, &mut self.graph);

        let t = elapsed.as_secs_f32();
        let sway = self.noise.simplex2(t * SWAY_SPEED, t * SWAY_SPEED) * SWAY_AMPLITUDE;
        self.graph.local_mut(self.rig.z_rotation)?.rotation.z = sway;

        let boxes = self.graph.children(self.box_grid)?.to_vec();
        for (index, child) in boxes.into_iter().enumerate() {
            let height = box_height(&self.noise, t, index);
            let local = self.graph.local_mut(child)?;
            local.scale.y = height;
            local.position.y = height / 2.0;
        }
        debug!("camera rig at {:.3}s, sway {:.5}", t, sway);
        Ok(())
    }
}

/// Vertical scale of the grid box at `index` at time `t` (seconds).
pub fn box_height(noise: &Simplex, t: f32, index: usize) -> f32 {
    let x = t + index as f32;
    (noise.simplex2(x, x) + 1.0) / 2.0 + MIN_HEIGHT
}

impl GraphicsFlow for CameraRig {
    fn on_init(&mut self, ctx: &mut Context, _: &mut dyn RandomSource) -> anyhow::Result<Out> {
        ctx.clear_colour = self.background;
        Ok(Out::Empty)
    }

    fn on_update(
        &mut self,
        _: &Context,
        elapsed: Duration,
        _: &mut dyn RandomSource,
    ) -> anyhow::Result<Out> {
        self.update(elapsed)?;
        Ok(Out::Empty)
    }

    fn on_render(&self) -> Render<'_> {
        Render::scene(&self.graph, self.rig.camera)
    }

    fn name(&self) -> &str {
        "camera rig"
    }
}

/**
 * Three tweens, each driving one rig component:
 *
 * - dolly `cameraZPosition.z` from 100 to -50 over 12s, linear
 * - pitch `cameraXRotation.x` from -pi/2 to 0 over 6s after 1s, quadratic in-out
 * - yaw `cameraYRotation.y` from 0 to pi/2 over 6s after 1s, quadratic in-out
 */
pub fn start_camera_tweens(tweens: &mut TweenEngine<SceneGraph>, rig: &Rig) -> anyhow::Result<()> {
    Tween::new(100.0, -50.0, Duration::from_secs(12))
        .on_update(drive(rig.z_position, Property::PositionZ))
        .start(tweens)?;
    Tween::new(-FRAC_PI_2, 0.0, Duration::from_secs(6))
        .delay(Duration::from_secs(1))
        .easing(Easing::QuadraticInOut)
        .on_update(drive(rig.x_rotation, Property::RotationX))
        .start(tweens)?;
    Tween::new(0.0, FRAC_PI_2, Duration::from_secs(6))
        .delay(Duration::from_secs(1))
        .easing(Easing::QuadraticInOut)
        .on_update(drive(rig.y_rotation, Property::RotationY))
        .start(tweens)?;
    Ok(())
}

/// Builds the full scene: fog, ground plane, light with a marker sphere, box grid and camera rig.
pub fn build_scene(config: &CameraRigConfig, aspect: f32) -> Result<SceneGraph, SceneError> {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    graph.fog = config.fog;
    graph.background = config.background;

    let grey = Colour::from_rgb8(120, 120, 120);

    let mut plane = Mesh::new(
        Geometry::Plane {
            width: 100.0,
            height: 100.0,
        },
        Material::phong(grey).double_sided(),
    );
    plane.receive_shadow = true;
    let mut plane = SceneNode::with_attachment(plane).named(PLANE);
    plane.local.rotation.x = PI / 2.0;
    graph.add(root, plane)?;

    let light = Light::new(LightKind::Directional, Colour::WHITE, 2.0).with_shadow(Shadow {
        extent: 40.0,
        map_size: 4096,
        bias: 0.0,
    });
    let light = graph.add(
        root,
        SceneNode::with_attachment(light)
            .named(LIGHT)
            .at(Vector3::new(13.0, 10.0, 10.0)),
    )?;
    let sphere = Mesh::new(
        Geometry::Sphere {
            radius: 0.05,
            width_segments: 24,
            height_segments: 24,
        },
        Material::basic(Colour::WHITE),
    );
    graph.add(light, SceneNode::with_attachment(sphere))?;

    let grid = build_box_grid(&mut graph, config.amount, config.separation)?;
    graph.add_child(root, grid)?;

    build_rig(&mut graph, aspect)?;
    Ok(graph)
}

/// A group of `amount` x `amount` boxes standing on the ground, centred on the origin.
pub fn build_box_grid(graph: &mut SceneGraph, amount: usize, separation: f32) -> Result<NodeId, SceneError> {
    let offset = -(separation * (amount.saturating_sub(1)) as f32) / 2.0;
    let group = graph.add_node(
        SceneNode::group()
            .named(BOX_GRID)
            .at(Vector3::new(offset, 0.0, offset)),
    );
    let geometry = Geometry::Box {
        width: 1.0,
        height: 3.0,
        depth: 1.0,
    };
    for i in 0..amount {
        for j in 0..amount {
            let mut mesh = Mesh::new(geometry.clone(), Material::phong(Colour::from_rgb8(120, 120, 120)));
            mesh.cast_shadow = true;
            let position = Vector3::new(
                i as f32 * separation,
                geometry.height() / 2.0,
                j as f32 * separation,
            );
            graph.add(group, SceneNode::with_attachment(mesh).at(position))?;
        }
    }
    Ok(group)
}

fn build_rig(graph: &mut SceneGraph, aspect: f32) -> Result<(), SceneError> {
    let root = graph.root();
    let y_rotation = graph.add(root, SceneNode::group().named(CAMERA_Y_ROTATION))?;

    let mut x_rotation = SceneNode::group().named(CAMERA_X_ROTATION);
    x_rotation.local.rotation.x = -FRAC_PI_2;
    let x_rotation = graph.add(y_rotation, x_rotation)?;

    let z_position = graph.add(
        x_rotation,
        SceneNode::group()
            .named(CAMERA_Z_POSITION)
            .at(Vector3::new(0.0, 0.0, 100.0)),
    )?;
    let y_position = graph.add(
        z_position,
        SceneNode::group()
            .named(CAMERA_Y_POSITION)
            .at(Vector3::new(0.0, 1.0, 0.0)),
    )?;
    let z_rotation = graph.add(y_position, SceneNode::group().named(CAMERA_Z_ROTATION))?;

    let camera = PerspectiveCamera::new(Deg(45.0), aspect, 1.0, 1000.0);
    graph.add(z_rotation, SceneNode::with_attachment(camera).named(CAMERA))?;
    Ok(())
}
