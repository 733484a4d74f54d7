//! Renderable data attached to scene nodes.
//!
//! Everything in here is descriptive: geometry parameters, material settings,
//! camera and light properties. Turning them into GPU resources is up to the
//! [`Renderer`](crate::render::Renderer) the scene is handed to.

use cgmath::{Deg, Matrix4, SquareMatrix};

use crate::data_structures::particles::ParticleBuffer;

/// An RGBA colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Colour = Colour::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Colour from 8-bit channels, e.g. `rgb(120, 120, 120)`.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Colour from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Plane { width: f32, height: f32 },
    Sphere { radius: f32, width_segments: u32, height_segments: u32 },
}

impl Geometry {
    /// Vertical extent of the untransformed geometry.
    pub fn height(&self) -> f32 {
        match self {
            Geometry::Box { height, .. } => *height,
            Geometry::Plane { height, .. } => *height,
            Geometry::Sphere { radius, .. } => radius * 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Unlit, flat colour.
    Basic,
    /// Lit with specular highlights.
    Phong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub colour: Colour,
    pub side: Side,
}

impl Material {
    pub fn basic(colour: Colour) -> Self {
        Self {
            shading: Shading::Basic,
            colour,
            side: Side::Front,
        }
    }

    pub fn phong(colour: Colour) -> Self {
        Self {
            shading: Shading::Phong,
            colour,
            side: Side::Front,
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blending {
    Normal,
    Additive,
}

/// Material for point clouds. `map` is a texture path; loading it is left to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct PointsMaterial {
    pub colour: Colour,
    pub size: f32,
    pub map: Option<String>,
    pub transparent: bool,
    pub blending: Blending,
    pub depth_write: bool,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            colour: Colour::WHITE,
            size: 1.0,
            map: None,
            transparent: false,
            blending: Blending::Normal,
            depth_write: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Points {
    pub buffer: ParticleBuffer,
    pub material: PointsMaterial,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub fovy: Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl PerspectiveCamera {
    pub fn new(fovy: Deg<f32>, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            fovy,
            aspect,
            znear,
            zfar,
        }
    }

    pub fn projection(&self) -> Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Projection times view, where the view is the inverse of the camera's world matrix.
    ///
    /// Returns `None` if the world matrix is singular (e.g. a zero scale somewhere up the rig).
    pub fn view_proj(&self, world: Matrix4<f32>) -> Option<Matrix4<f32>> {
        world.invert().map(|view| self.projection() * view)
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(Deg(45.0), 16.0 / 9.0, 1.0, 1000.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Half extent of the orthographic shadow camera.
    pub extent: f32,
    pub map_size: u32,
    pub bias: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            extent: 5.0,
            map_size: 512,
            bias: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot { penumbra: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub colour: Colour,
    pub intensity: f32,
    pub shadow: Option<Shadow>,
}

impl Light {
    pub fn new(kind: LightKind, colour: Colour, intensity: f32) -> Self {
        Self {
            kind,
            colour,
            intensity,
            shadow: None,
        }
    }

    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

/// Exponential squared fog: `factor = 1 - exp(-(density * distance)^2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub colour: Colour,
    pub density: f32,
}

impl Fog {
    pub fn exp2(colour: Colour, density: f32) -> Self {
        Self { colour, density }
    }

    pub fn factor(&self, distance: f32) -> f32 {
        let d = self.density * distance;
        (1.0 - (-d * d).exp()).clamp(0.0, 1.0)
    }
}

/// What a scene node carries besides its transform.
#[derive(Clone, Debug)]
pub enum Attachment {
    Mesh(Mesh),
    Points(Points),
    Camera(PerspectiveCamera),
    Light(Light),
}

impl From<Mesh> for Attachment {
    fn from(mesh: Mesh) -> Self {
        Attachment::Mesh(mesh)
    }
}

impl From<Points> for Attachment {
    fn from(points: Points) -> Self {
        Attachment::Points(points)
    }
}

impl From<PerspectiveCamera> for Attachment {
    fn from(camera: PerspectiveCamera) -> Self {
        Attachment::Camera(camera)
    }
}

impl From<Light> for Attachment {
    fn from(light: Light) -> Self {
        Attachment::Light(light)
    }
}
