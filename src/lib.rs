//! Closed-ecosystem simulation engine.
//!
//! Plants, herbivores and predators age, grow, sense each other, move through
//! an external body backend and breed with mutation. The host drives
//! [`World::step`] once per tick and reads statistics snapshots and events.

pub mod config;
pub mod organisms;
pub mod physics;
pub mod utils;
pub mod world;

pub use config::{CohortSettings, ConfigError, SimulationConfig, SimulationError};
pub use organisms::{
    Creature, CreatureConfiguration, CreatureId, CreatureKind, EcosystemTuning, StatisticsSnapshot,
    TICK,
};
pub use physics::{Body, BodyDescriptor, BodyProvider, BodyShape, KinematicBodies, KinematicBody};
pub use world::{Population, SimEvent, World};
