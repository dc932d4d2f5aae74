//! Physical body seam.
//!
//! The engine never simulates rigid bodies itself. Every creature owns one
//! [`Body`] produced by a [`BodyProvider`]; the provider can wrap a real physics
//! engine or the in-process [`KinematicBodies`] backend.

mod kinematic;

use glam::Vec3;
use std::fmt;

pub use kinematic::{KinematicBodies, KinematicBody};

/// Operations the engine consumes from a physical body.
pub trait Body: fmt::Debug + Send + Sync {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Rotate a body-local vector into world space using the body's orientation.
    fn direction(&self, local: Vec3) -> Vec3;

    /// Apply an instantaneous impulse at a world-space point.
    fn apply_impulse(&mut self, impulse: Vec3, at: Vec3);

    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, velocity: Vec3);

    fn mass(&self) -> f32;
    fn set_mass(&mut self, mass: f32);

    /// Linear scale applied on top of the body's base shape.
    fn scaling(&self) -> Vec3;
    fn set_scaling(&mut self, scaling: Vec3);

    /// World-space half extents of the collider, scaling included.
    fn half_extents(&self) -> Vec3;

    fn intersects(&self, other: &dyn Body) -> bool;

    /// Integrate one engine tick. Backends stepped by their own engine leave this empty.
    fn advance(&mut self, _dt: f32) {}

    /// Release backend resources. The body is not used afterwards.
    fn dispose(&mut self);
}

/// Collider geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Cylinder { diameter: f32, height: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

impl BodyShape {
    /// Half extents of the shape's bounding box.
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            BodyShape::Cylinder { diameter, height } => {
                Vec3::new(diameter / 2.0, height / 2.0, diameter / 2.0)
            }
            BodyShape::Box {
                width,
                height,
                depth,
            } => Vec3::new(width / 2.0, height / 2.0, depth / 2.0),
        }
    }
}

/// Everything a provider needs to build a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDescriptor {
    pub name: String,
    pub shape: BodyShape,
    pub position: Vec3,
    /// Rotation around the vertical axis, radians.
    pub yaw: f32,
    /// Zero mass means static.
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl BodyDescriptor {
    /// Dynamic body with the bounce/friction used for creatures.
    pub fn dynamic(name: impl Into<String>, shape: BodyShape, position: Vec3, mass: f32) -> Self {
        Self {
            name: name.into(),
            shape,
            position,
            yaw: 0.0,
            mass,
            friction: 0.05,
            restitution: 0.9,
        }
    }

    /// Static collider (mass 0).
    pub fn fixed(name: impl Into<String>, shape: BodyShape, position: Vec3) -> Self {
        Self {
            name: name.into(),
            shape,
            position,
            yaw: 0.0,
            mass: 0.0,
            friction: 0.01,
            restitution: 0.5,
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }
}

/// Factory for bodies, owned by the world.
pub trait BodyProvider: Send + Sync {
    fn create_body(&mut self, descriptor: &BodyDescriptor) -> Box<dyn Body>;
}
