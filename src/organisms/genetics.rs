use crate::organisms::components::{CreatureConfiguration, CreatureKind, MIN_GENERATED_TRAIT};
use crate::organisms::creature::Creature;
use crate::utils::Mutate;
use glam::Vec3;
use rand::Rng;

/// Smallest linear size a newborn can have
pub const MIN_OFFSPRING_SIZE: f32 = MIN_GENERATED_TRAIT;

/// Growth rate compounds every tick, so it only gets `mutation_rate^10` jitter.
const GROWTH_RATE_MUTATION_EXPONENT: i32 = 10;

/// A child waiting to be embodied by the world.
///
/// Reproduction is variant-agnostic; the world's factory turns this into a
/// creature of `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct Offspring {
    pub kind: CreatureKind,
    /// Mutated creation parameters; `config.energy` becomes the child's reference energy
    pub config: CreatureConfiguration,
    /// Starting energy: the unmutated parental average
    pub energy: f32,
    pub reproduction_time_threshold: f32,
}

/// Two-parent reproduction.
///
/// Mutation magnitudes derive from `parent`'s own mutation rate. Both parents
/// pay half their energy and restart their reproduction cooldown.
pub fn reproduce<R: Rng + ?Sized>(
    parent: &mut Creature,
    partner: &mut Creature,
    rng: &mut R,
) -> Option<Offspring> {
    let child = blend(parent, partner, rng)?;

    parent.energy /= 2.0;
    partner.energy /= 2.0;
    parent.reproduction_time = 0.0;
    partner.reproduction_time = 0.0;

    Some(child)
}

/// Self-reproduction: the creature is both parents.
///
/// Halving is applied once per parent role, so the parent keeps a quarter of
/// its energy.
pub fn reproduce_alone<R: Rng + ?Sized>(parent: &mut Creature, rng: &mut R) -> Option<Offspring> {
    let view: &Creature = parent;
    let child = blend(view, view, rng)?;

    parent.energy /= 2.0;
    parent.energy /= 2.0;
    parent.reproduction_time = 0.0;

    Some(child)
}

fn blend<R: Rng + ?Sized>(this: &Creature, other: &Creature, rng: &mut R) -> Option<Offspring> {
    let midpoint = (this.position()? + other.position()?) * 0.5;
    let rate = this.mutation_rate;

    let position = midpoint.mutate(this.initial_size * rate, rng);
    let position = Vec3::new(position.x, midpoint.y, position.z);

    let size = average(this.initial_size, other.initial_size);
    let size = size.mutate(size * rate, rng);

    let growth_rate = average(this.growth_rate, other.growth_rate);
    let max_age = average(this.max_age, other.max_age);
    let sensor_size = average(this.sensor_size, other.sensor_size);
    let threshold = average(
        this.reproduction_time_threshold,
        other.reproduction_time_threshold,
    );
    let mutation_rate = average(this.mutation_rate, other.mutation_rate);
    let energy = average(capped_energy(this), capped_energy(other));

    let config = CreatureConfiguration {
        growth_rate: growth_rate.mutate(growth_rate * rate.powi(GROWTH_RATE_MUTATION_EXPONENT), rng),
        max_age: max_age.mutate(max_age * rate, rng),
        size,
        sensor_size: sensor_size.mutate(sensor_size * rate, rng),
        energy: energy.mutate(energy * rate, rng),
        mutation_rate: mutation_rate.mutate(mutation_rate * rate, rng),
        position,
    }
    .clamped();

    Some(Offspring {
        kind: this.kind(),
        config,
        energy,
        reproduction_time_threshold: threshold.mutate(threshold * rate, rng).max(0.0),
    })
}

fn average(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}

/// Surplus above the reference energy is not inherited.
fn capped_energy(creature: &Creature) -> f32 {
    creature.energy.min(creature.initial_energy)
}
