use super::{Body, BodyDescriptor, BodyProvider, BodyShape};
use glam::{Quat, Vec3};
use tracing::trace;

/// Point-mass body moving on the ground plane with yaw-only rotation.
///
/// Impulses change velocity by `impulse / mass`; the off-centre part of an
/// impulse changes the yaw rate by `(r x p).y / inertia`. There is no collision
/// response, only overlap tests.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    position: Vec3,
    yaw: f32,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    mass: f32,
    scaling: Vec3,
    base_half_extents: Vec3,
    friction: f32,
    disposed: bool,
}

impl KinematicBody {
    pub fn new(shape: BodyShape, position: Vec3, mass: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            scaling: Vec3::ONE,
            base_half_extents: shape.half_extents(),
            friction: 0.05,
            disposed: false,
        }
    }

    pub fn from_descriptor(descriptor: &BodyDescriptor) -> Self {
        let mut body = Self::new(descriptor.shape, descriptor.position, descriptor.mass);
        body.yaw = descriptor.yaw;
        body.friction = descriptor.friction;
        body
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    /// Moment of inertia of a flat box around the vertical axis.
    fn yaw_inertia(&self) -> f32 {
        let extents = self.half_extents() * 2.0;
        (self.mass * (extents.x * extents.x + extents.z * extents.z) / 12.0).max(f32::EPSILON)
    }
}

impl Body for KinematicBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn direction(&self, local: Vec3) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * local
    }

    fn apply_impulse(&mut self, impulse: Vec3, at: Vec3) {
        if self.disposed || self.is_static() {
            return;
        }
        self.linear_velocity += impulse / self.mass;
        let lever = at - self.position;
        let angular_impulse = lever.cross(impulse);
        self.angular_velocity.y += angular_impulse.y / self.yaw_inertia();
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
    }

    fn scaling(&self) -> Vec3 {
        self.scaling
    }

    fn set_scaling(&mut self, scaling: Vec3) {
        self.scaling = scaling;
    }

    fn half_extents(&self) -> Vec3 {
        self.base_half_extents * self.scaling.abs()
    }

    fn intersects(&self, other: &dyn Body) -> bool {
        if self.disposed {
            return false;
        }
        let gap = (self.position - other.position()).abs();
        let reach = self.half_extents() + other.half_extents();
        gap.cmple(reach).all()
    }

    fn advance(&mut self, dt: f32) {
        if self.disposed || self.is_static() {
            return;
        }
        self.position += self.linear_velocity * dt;
        self.yaw += self.angular_velocity.y * dt;

        let retain = (1.0 - self.friction).clamp(0.0, 1.0);
        self.linear_velocity *= retain;
        self.angular_velocity *= retain;
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}

/// Provider handing out [`KinematicBody`] instances.
#[derive(Debug, Default)]
pub struct KinematicBodies {
    created: usize,
}

impl KinematicBodies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bodies built so far, static colliders included.
    pub fn created(&self) -> usize {
        self.created
    }
}

impl BodyProvider for KinematicBodies {
    fn create_body(&mut self, descriptor: &BodyDescriptor) -> Box<dyn Body> {
        self.created += 1;
        trace!("[PHYSICS] body #{} '{}'", self.created, descriptor.name);
        Box::new(KinematicBody::from_descriptor(descriptor))
    }
}
