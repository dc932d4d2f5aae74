use crate::config::ConfigError;
use crate::organisms::creature::TICK;
use crate::physics::BodyShape;
use crate::utils::Mutate;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of a creature inside the world's population arena.
    pub struct CreatureId;
}

/// The three concrete creature variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    Plant,     // Primary producer, never moves
    Herbivore, // Grazes plants, flees predators
    Predator,  // Hunts herbivores
}

impl CreatureKind {
    pub const ALL: [CreatureKind; 3] = [
        CreatureKind::Plant,
        CreatureKind::Herbivore,
        CreatureKind::Predator,
    ];

    /// Numeric type tag used in statistics records.
    pub fn tag(self) -> u8 {
        match self {
            CreatureKind::Plant => 0,
            CreatureKind::Herbivore => 1,
            CreatureKind::Predator => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CreatureKind::Plant => "plant",
            CreatureKind::Herbivore => "herbivore",
            CreatureKind::Predator => "predator",
        }
    }

    /// Collider used for a freshly created body of this kind.
    pub fn body_shape(self, size: f32) -> BodyShape {
        match self {
            CreatureKind::Plant => BodyShape::Cylinder {
                diameter: size * 0.5,
                height: 0.1,
            },
            CreatureKind::Herbivore | CreatureKind::Predator => BodyShape::Box {
                width: size,
                height: 0.1,
                depth: size,
            },
        }
    }

    pub fn is_animal(self) -> bool {
        !matches!(self, CreatureKind::Plant)
    }
}

/// Smallest size, growth rate and energy a randomly generated configuration keeps
pub const MIN_GENERATED_TRAIT: f32 = 0.01;

/// Immutable creation parameters of a creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreatureConfiguration {
    /// Multiplicative per-tick size factor
    pub growth_rate: f32,
    /// Lifespan in simulated time units
    pub max_age: f32,
    /// Initial linear scale
    pub size: f32,
    /// Perception radius
    pub sensor_size: f32,
    /// Initial and reference energy
    pub energy: f32,
    /// Fractional perturbation magnitude used when breeding
    pub mutation_rate: f32,
    pub position: Vec3,
}

impl CreatureConfiguration {
    /// Check the creation constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("growth_rate", self.growth_rate)?;
        positive("max_age", self.max_age)?;
        positive("size", self.size)?;
        non_negative("sensor_size", self.sensor_size)?;
        positive("energy", self.energy)?;
        non_negative("mutation_rate", self.mutation_rate)?;
        if !self.position.is_finite() {
            return Err(ConfigError::NonFinitePosition);
        }
        Ok(())
    }

    /// Pull mutated traits back inside the creation constraints.
    ///
    /// Lifespan is floored at one tick; sensor and mutation rate at zero.
    pub fn clamped(self) -> Self {
        Self {
            growth_rate: self.growth_rate.max(MIN_GENERATED_TRAIT),
            max_age: self.max_age.max(TICK),
            size: self.size.max(MIN_GENERATED_TRAIT),
            sensor_size: self.sensor_size.max(0.0),
            energy: self.energy.max(MIN_GENERATED_TRAIT),
            mutation_rate: self.mutation_rate.max(0.0),
            position: self.position,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Composite mutation: numeric fields jitter proportionally to their own value,
/// the position keeps the raw rate.
impl Mutate for CreatureConfiguration {
    fn mutate<R: Rng + ?Sized>(&self, rate: f32, rng: &mut R) -> Self {
        Self {
            growth_rate: self.growth_rate.mutate(self.growth_rate * rate, rng),
            max_age: self.max_age.mutate(self.max_age * rate, rng),
            size: self.size.mutate(self.size * rate, rng),
            sensor_size: self.sensor_size.mutate(self.sensor_size * rate, rng),
            energy: self.energy.mutate(self.energy * rate, rng),
            mutation_rate: self.mutation_rate.mutate(self.mutation_rate * rate, rng),
            position: self.position.mutate(rate, rng),
        }
    }
}

/// Kinematic ceilings shared by every creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicLimits {
    pub max_force: f32,
    pub max_torque: f32,
    pub max_angular_speed: f32,
    pub max_speed: f32,
}

impl Default for KinematicLimits {
    fn default() -> Self {
        Self {
            max_force: 0.5,
            max_torque: 0.1,
            max_angular_speed: 5.0,
            max_speed: 5.0,
        }
    }
}
