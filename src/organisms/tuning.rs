use crate::organisms::components::{CreatureKind, KinematicLimits};
use crate::organisms::creature::DEFAULT_PARALYSIS;
use serde::{Deserialize, Serialize};

/// Ecosystem tuning parameters - behavior thresholds and rates in one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcosystemTuning {
    // Movement ceilings shared by every creature
    pub limits: KinematicLimits,

    // Decision thresholds
    /// Energy percentage under which animals look for food
    pub hunger_threshold: f32,
    /// Herbivores only graze below this energy percentage
    pub herbivore_feeding_cap: f32,
    /// Predators only bite below this energy percentage
    pub predator_feeding_cap: f32,

    // Contact interactions
    pub bite_shrink: f32,
    pub paralysis_duration: f32,

    // Locomotion
    pub explore_turn_chance: f64,
    pub explore_go_chance: f64,
    pub explore_force: f32,
    pub pursuit_force: f32,

    // Reproduction
    /// Probability a ready plant actually seeds; a miss still resets its cooldown
    pub plant_seed_chance: f64,

    // Spawn parameters
    pub herbivore_sensor_multiplier: f32,
    pub predator_sensor_multiplier: f32,
    pub initial_mass: f32,
}

impl Default for EcosystemTuning {
    fn default() -> Self {
        Self {
            limits: KinematicLimits::default(),

            hunger_threshold: 0.5,
            herbivore_feeding_cap: 2.0,
            predator_feeding_cap: 1.2,

            bite_shrink: 0.98,
            paralysis_duration: DEFAULT_PARALYSIS,

            explore_turn_chance: 0.1, // 1 in 10 ticks
            explore_go_chance: 0.1,
            explore_force: 1.0,
            pursuit_force: 1.0,

            plant_seed_chance: 0.5,

            herbivore_sensor_multiplier: 5.0,
            predator_sensor_multiplier: 8.0,
            initial_mass: 1.0,
        }
    }
}

impl EcosystemTuning {
    /// Create balanced preset for a stable ecosystem
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Create preset for fast turnover (plants seed reliably, animals roam more)
    pub fn fast_evolution() -> Self {
        Self {
            plant_seed_chance: 0.9,
            explore_go_chance: 0.2,
            pursuit_force: 1.5,
            ..Self::default()
        }
    }

    /// Create preset for a scarce ecosystem (plants rarely seed, predators see further)
    pub fn scarce() -> Self {
        Self {
            plant_seed_chance: 0.2,
            hunger_threshold: 0.6,
            predator_sensor_multiplier: 10.0,
            ..Self::default()
        }
    }

    /// Perception radius for a creature of `kind` and linear `size`.
    pub fn sensor_size(&self, kind: CreatureKind, size: f32) -> f32 {
        match kind {
            CreatureKind::Plant => 0.0,
            CreatureKind::Herbivore => size * self.herbivore_sensor_multiplier,
            CreatureKind::Predator => size * self.predator_sensor_multiplier,
        }
    }

    /// Energy percentage under which `kind` will eat on contact.
    pub fn feeding_cap(&self, kind: CreatureKind) -> f32 {
        match kind {
            CreatureKind::Plant => 0.0,
            CreatureKind::Herbivore => self.herbivore_feeding_cap,
            CreatureKind::Predator => self.predator_feeding_cap,
        }
    }
}
