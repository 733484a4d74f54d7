//! Local transformation data for scene nodes.
//!
//! Position, rotation and scale are kept as plain vectors so animations can
//! write a single axis (`rotation.x`, `scale.y`, ...) without touching the
//! others. Matrices are only built when a world transform is requested.

use std::ops::Mul;

use cgmath::{Matrix4, Quaternion, Rad, Rotation3, Vector3};

/// Per-node transformation: position, Euler rotation and scale.
///
/// The rotation holds radians around X, Y and Z, applied in `XYZ` order
/// (the rotation matrix is `Rx * Ry * Rz`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// The Euler rotation as a quaternion (`qx * qy * qz`).
    pub fn quaternion(&self) -> Quaternion<f32> {
        Quaternion::from_angle_x(Rad(self.rotation.x))
            * Quaternion::from_angle_y(Rad(self.rotation.y))
            * Quaternion::from_angle_z(Rad(self.rotation.z))
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.quaternion())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// A single scalar component of an [`Instance`], for animations that drive one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl Instance {
    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::PositionX => self.position.x,
            Property::PositionY => self.position.y,
            Property::PositionZ => self.position.z,
            Property::RotationX => self.rotation.x,
            Property::RotationY => self.rotation.y,
            Property::RotationZ => self.rotation.z,
            Property::ScaleX => self.scale.x,
            Property::ScaleY => self.scale.y,
            Property::ScaleZ => self.scale.z,
        }
    }

    pub fn set(&mut self, property: Property, value: f32) {
        let slot = match property {
            Property::PositionX => &mut self.position.x,
            Property::PositionY => &mut self.position.y,
            Property::PositionZ => &mut self.position.z,
            Property::RotationX => &mut self.rotation.x,
            Property::RotationY => &mut self.rotation.y,
            Property::RotationZ => &mut self.rotation.z,
            Property::ScaleX => &mut self.scale.x,
            Property::ScaleY => &mut self.scale.y,
            Property::ScaleZ => &mut self.scale.z,
        };
        *slot = value;
    }
}

/**
 * Composes a parent transform with a child's local transform.
 *
 * The result is a matrix: a parent with non-uniform scale and a rotated child
 * produce a shear that an `Instance` cannot represent.
 */
impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Matrix4<f32>;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        self.to_matrix() * rhs.to_matrix()
    }
}

impl From<Vector3<f32>> for Instance {
    fn from(position: Vector3<f32>) -> Self {
        Instance::at(position)
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}
