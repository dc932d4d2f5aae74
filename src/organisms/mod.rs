mod behavior;
mod components;
mod creature;
mod ecosystem_stats;
mod genetics;
mod systems;
mod tuning;

pub use behavior::{contact_action, decide, explore, BehaviorState, ContactAction, Decision, Steering};
pub use components::{CreatureConfiguration, CreatureId, CreatureKind, KinematicLimits};
pub use creature::{
    signed_angle, wrap_angle, Creature, DeathCause, Embodiment, DEFAULT_PARALYSIS, FORWARD,
    REPRODUCTION_ENERGY_RATIO, REPRODUCTION_PERIOD_RATIO, TICK,
};
pub use ecosystem_stats::{CreatureStats, KindSummary, PopulationSummary, StatisticsSnapshot};
pub use genetics::{reproduce, reproduce_alone, Offspring, MIN_OFFSPRING_SIZE};
pub use systems::{apply_contact, step_creature, ContactOutcome, Litter};
pub use tuning::EcosystemTuning;
