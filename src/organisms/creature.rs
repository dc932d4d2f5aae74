use crate::organisms::components::{CreatureConfiguration, CreatureId, CreatureKind, KinematicLimits};
use crate::physics::Body;
use crate::world::Population;
use glam::Vec3;
use smallvec::SmallVec;
use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI, TAU};

/// Simulated time that passes in one tick, independent of wall-clock frame time.
pub const TICK: f32 = 1.0 / 30.0;

/// Body-local forward axis; headings are measured against it.
pub const FORWARD: Vec3 = Vec3::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2);

/// Energy fraction above which a creature may breed.
pub const REPRODUCTION_ENERGY_RATIO: f32 = 0.60;

/// Fraction of `max_age` that must pass between two reproductions.
pub const REPRODUCTION_PERIOD_RATIO: f32 = 0.3;

/// Default incapacitation inflicted by a predator bite.
pub const DEFAULT_PARALYSIS: f32 = 2.0;

/// Share of the taker's initial energy transferred by any contact feeding.
const GUARANTEED_BITE_RATIO: f32 = 0.1;

/// Energy spent per unit of mass gained.
const GROWTH_ENERGY_COST: f32 = 10.0;

/// Heading extrapolation horizon used by [`Creature::turn_to`].
const TURN_LOOKAHEAD: f32 = 1.0 / 15.0;

/// Gain from angular error to desired angular velocity.
const TURN_GAIN: f32 = 10.0;

/// `force^2 / (900 * 2 * mass)`: kinetic energy of an impulse over one 1/30 tick.
const MOTION_COST_DIVISOR: f32 = 900.0 * 2.0;

/// Smallest factor a plant shrinks to after being bitten.
const MIN_BITE_SHRINK: f32 = 0.01;

/// Physical presence of a creature.
///
/// Every movement and growth primitive matches on this, so operations on a
/// destroyed creature are explicit no-ops.
#[derive(Debug)]
pub enum Embodiment {
    Alive(Box<dyn Body>),
    Destroyed,
}

impl Embodiment {
    pub fn body(&self) -> Option<&dyn Body> {
        match self {
            Embodiment::Alive(body) => Some(body.as_ref()),
            Embodiment::Destroyed => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut (dyn Body + 'static)> {
        match self {
            Embodiment::Alive(body) => Some(body.as_mut()),
            Embodiment::Destroyed => None,
        }
    }
}

/// Why a creature left the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Starved,
    OldAge,
    Consumed,
}

/// Shared agent state for every variant.
#[derive(Debug)]
pub struct Creature {
    kind: CreatureKind,
    embodiment: Embodiment,
    /// Creatures inside this one's sensor radius, rebuilt every tick
    pub(crate) nearby: SmallVec<[CreatureId; 8]>,
    /// Creatures whose bodies intersect this one's, rebuilt every tick
    pub(crate) touching: SmallVec<[CreatureId; 4]>,

    pub age: f32,
    /// Time since the last reproduction
    pub reproduction_time: f32,
    pub paralyzation_timer: f32,
    pub energy: f32,
    pub initial_energy: f32,
    pub initial_size: f32,
    pub initial_mass: f32,
    pub sensor_size: f32,
    pub max_age: f32,
    pub growth_rate: f32,
    pub mutation_rate: f32,
    pub reproduction_time_threshold: f32,
    pub limits: KinematicLimits,
    forward: Vec3,
}

impl Creature {
    /// Build a creature around an already created body.
    pub fn new(
        kind: CreatureKind,
        config: &CreatureConfiguration,
        body: Box<dyn Body>,
        limits: KinematicLimits,
    ) -> Self {
        let initial_mass = body.mass();
        Self {
            kind,
            embodiment: Embodiment::Alive(body),
            nearby: SmallVec::new(),
            touching: SmallVec::new(),
            age: 0.0,
            reproduction_time: 0.0,
            paralyzation_timer: 0.0,
            energy: config.energy,
            initial_energy: config.energy,
            initial_size: config.size,
            initial_mass,
            sensor_size: config.sensor_size,
            max_age: config.max_age,
            growth_rate: config.growth_rate,
            mutation_rate: config.mutation_rate,
            reproduction_time_threshold: REPRODUCTION_PERIOD_RATIO * config.max_age,
            limits,
            forward: FORWARD,
        }
    }

    pub fn kind(&self) -> CreatureKind {
        self.kind
    }

    pub fn embodiment(&self) -> &Embodiment {
        &self.embodiment
    }

    pub fn body(&self) -> Option<&dyn Body> {
        self.embodiment.body()
    }

    pub fn body_mut(&mut self) -> Option<&mut (dyn Body + 'static)> {
        self.embodiment.body_mut()
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.embodiment, Embodiment::Destroyed)
    }

    pub fn nearby(&self) -> &[CreatureId] {
        &self.nearby
    }

    pub fn touching(&self) -> &[CreatureId] {
        &self.touching
    }

    pub fn position(&self) -> Option<Vec3> {
        self.body().map(|body| body.position())
    }

    /// Body mass, zero once destroyed.
    pub fn mass(&self) -> f32 {
        self.body().map_or(0.0, |body| body.mass())
    }

    pub fn speed(&self) -> f32 {
        self.body().map_or(0.0, |body| body.linear_velocity().length())
    }

    /// Current linear size: initial size times the body's growth scaling.
    pub fn size(&self) -> f32 {
        self.body()
            .map_or(self.initial_size, |body| self.initial_size * body.scaling().x)
    }

    pub fn energy_percentage(&self) -> f32 {
        self.energy / self.initial_energy
    }

    /// Energy percentage clamped to `[0, 1]`, used for transparency.
    pub fn opacity(&self) -> f32 {
        self.energy_percentage().clamp(0.0, 1.0)
    }

    pub fn is_dead(&self) -> bool {
        self.energy <= 0.0 || self.age >= self.max_age
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        if self.energy <= 0.0 {
            Some(if self.is_destroyed() {
                DeathCause::Consumed
            } else {
                DeathCause::Starved
            })
        } else if self.age >= self.max_age {
            Some(DeathCause::OldAge)
        } else {
            None
        }
    }

    pub fn is_paralyzed(&self) -> bool {
        self.paralyzation_timer > 0.0
    }

    pub fn can_reproduce(&self) -> bool {
        self.reproduction_time > self.reproduction_time_threshold
            && self.energy_percentage() > REPRODUCTION_ENERGY_RATIO
            && !self.is_paralyzed()
    }

    /// Incapacitate for `duration`, overwriting any remaining paralysis.
    pub fn paralyze(&mut self, duration: f32) {
        self.paralyzation_timer = duration;
    }

    /// Unit heading in world space.
    pub fn heading(&self) -> Vec3 {
        match self.body() {
            Some(body) => {
                let direction = body.direction(self.forward).normalize_or_zero();
                if direction == Vec3::ZERO {
                    self.forward
                } else {
                    direction
                }
            }
            None => self.forward,
        }
    }

    /// Signed heading angle around the vertical axis, relative to [`FORWARD`].
    pub fn heading_angle(&self) -> f32 {
        signed_angle(FORWARD, self.heading())
    }

    /// Heading angle that would point straight at `target`.
    pub fn bearing_to(&self, target: Vec3) -> Option<f32> {
        let offset = target - self.position()?;
        if offset.x == 0.0 && offset.z == 0.0 {
            return None;
        }
        Some(signed_angle(FORWARD, offset))
    }

    /// Nearest sensed creature of `kind`.
    pub fn closest_visible(&self, kind: CreatureKind, population: &Population) -> Option<CreatureId> {
        self.closest_visible_where(kind, population, |_| true)
    }

    /// Nearest sensed creature of `kind` that also passes `filter`.
    pub fn closest_visible_where<F>(
        &self,
        kind: CreatureKind,
        population: &Population,
        filter: F,
    ) -> Option<CreatureId>
    where
        F: Fn(&Creature) -> bool,
    {
        let origin = self.position()?;
        self.nearby
            .iter()
            .filter_map(|&id| {
                let other = population.get(id)?;
                if other.kind != kind || !filter(other) {
                    return None;
                }
                Some((id, other.position()?.distance(origin)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Rotate in place with a pair of opposing impulses.
    ///
    /// Refuses torque that would push the spin further past `max_angular_speed`
    /// in the same direction.
    pub fn turn(&mut self, torque: f32) {
        if self.is_paralyzed() {
            return;
        }
        let max_spin = self.limits.max_angular_speed;
        let Some(body) = self.embodiment.body_mut() else {
            return;
        };

        let spin = body.angular_velocity().y;
        if (torque > 0.0 && spin >= max_spin) || (torque < 0.0 && spin <= -max_spin) {
            return;
        }

        let centre = body.position();
        body.apply_impulse(Vec3::new(torque / 2.0, 0.0, 0.0), centre + Vec3::Z);
        body.apply_impulse(Vec3::new(-torque / 2.0, 0.0, 0.0), centre - Vec3::Z);
    }

    /// Steer towards an absolute heading angle.
    pub fn turn_to(&mut self, angle: f32) {
        if self.is_paralyzed() {
            return;
        }
        let heading = self.heading_angle();
        let size = self.size();
        let Some(body) = self.body() else {
            return;
        };

        let spin = body.angular_velocity().y;
        let projected = heading + spin * TURN_LOOKAHEAD;
        let error = wrap_angle(angle - projected);

        // L = m * w * r and I = L / w, so the spin cancels out
        let inertia = body.mass() * size;
        let desired_spin = error * TURN_GAIN;
        let max_torque = self.limits.max_torque;
        let torque = (inertia * desired_spin).clamp(-max_torque, max_torque);

        self.turn(torque);
    }

    /// Push forward along the heading and pay for it.
    ///
    /// At or above `max_speed` only impulses that oppose the current motion are
    /// allowed.
    pub fn go(&mut self, force: f32) {
        if self.is_paralyzed() {
            return;
        }
        let direction = self.heading();
        let max_speed = self.limits.max_speed;
        let Some(body) = self.embodiment.body_mut() else {
            return;
        };

        let velocity = body.linear_velocity();
        if velocity.length() >= max_speed && direction.angle_between(velocity) < FRAC_PI_2 {
            return;
        }

        let at = body.position();
        body.apply_impulse(direction * force, at);

        let mass = if body.mass() > 0.0 { body.mass() } else { 1.0 };
        self.energy -= force * force / MOTION_COST_DIVISOR / mass;
    }

    /// Growth rate used when none is given: the compounding part fades with age.
    pub fn damped_growth_rate(&self) -> f32 {
        let damp = if self.age > 1.0 {
            self.age.sqrt() / 10.0
        } else {
            1.0
        };
        1.0 + (self.growth_rate - 1.0) / damp
    }

    /// Scale the body and its mass by `rate`, paying energy for gained mass.
    ///
    /// Velocities survive the mass change. Losing mass gives energy back.
    pub fn grow(&mut self, rate: Option<f32>) {
        let rate = rate.unwrap_or_else(|| self.damped_growth_rate());
        let Some(body) = self.embodiment.body_mut() else {
            return;
        };

        let old_mass = body.mass();
        if rate <= 0.0 && old_mass <= 0.0 {
            return;
        }

        let linear = body.linear_velocity();
        let angular = body.angular_velocity();
        body.set_scaling(body.scaling() * rate);
        body.set_mass(old_mass * rate);
        body.set_linear_velocity(linear);
        body.set_angular_velocity(angular);

        self.energy -= GROWTH_ENERGY_COST * (body.mass() - old_mass);
    }

    /// Grow by a factor below one; defaults to `(2 - growth_rate)^2`.
    pub fn shrink(&mut self, rate: Option<f32>) {
        let rate = rate.unwrap_or_else(|| (2.0 - self.growth_rate).powi(2));
        self.grow(Some(rate));
    }

    /// Per-tick bookkeeping common to every variant.
    pub fn advance_lifecycle(&mut self) {
        self.grow(None);

        self.age += TICK;
        self.reproduction_time += TICK;

        if self.is_paralyzed() {
            self.paralyzation_timer -= TICK;
        }
    }

    /// Plants derive their energy from how much of their mass is left.
    pub fn refresh_plant_energy(&mut self) {
        if self.kind != CreatureKind::Plant || self.initial_mass <= 0.0 {
            return;
        }
        if let Some(body) = self.body() {
            self.energy = body.mass() / self.initial_mass * self.initial_energy;
        }
    }

    /// Move energy from `self` to `taker` and return the amount.
    ///
    /// The transfer itself is zero-sum. A plant then either dies or shrinks by the
    /// share of its initial energy it just lost.
    pub fn take_energy(&mut self, taker: &mut Creature) -> f32 {
        let amount = taker.mass() * taker.speed() + GUARANTEED_BITE_RATIO * taker.initial_energy;
        self.energy -= amount;
        taker.energy += amount;

        if self.kind == CreatureKind::Plant {
            if self.energy <= 0.0 {
                self.destroy();
            } else {
                let retained = (1.0 - amount / self.initial_energy).max(MIN_BITE_SHRINK);
                self.shrink(Some(retained));
            }
        }

        amount
    }

    /// Release the body. Returns whether a body was actually released.
    pub fn destroy(&mut self) -> bool {
        match std::mem::replace(&mut self.embodiment, Embodiment::Destroyed) {
            Embodiment::Alive(mut body) => {
                body.dispose();
                self.nearby.clear();
                self.touching.clear();
                true
            }
            Embodiment::Destroyed => false,
        }
    }

    pub(crate) fn clear_relations(&mut self) {
        self.nearby.clear();
        self.touching.clear();
    }
}

/// Signed angle from `from` to `to` around +Y, ignoring the vertical component.
pub fn signed_angle(from: Vec3, to: Vec3) -> f32 {
    let cross = from.z * to.x - from.x * to.z;
    let dot = from.x * to.x + from.z * to.z;
    cross.atan2(dot)
}

/// Wrap into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
