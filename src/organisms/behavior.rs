use crate::organisms::components::{CreatureId, CreatureKind};
use crate::organisms::creature::Creature;
use crate::organisms::tuning::EcosystemTuning;
use crate::world::Population;
use glam::Vec3;
use rand::Rng;

/// Behavior state machine - what a creature decided to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorState {
    /// No sensed reason to move; explores at random
    Wandering,
    /// Running from the nearest predator
    Fleeing,
    /// Closing in on food (plants for herbivores, herbivores for predators)
    Chasing,
    /// Approaching a ready partner of the same kind
    Mating,
    /// Plants never move
    Rooted,
}

/// Motion requested by a decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    Hold,
    Toward(Vec3),
    AwayFrom(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub state: BehaviorState,
    pub target: Option<CreatureId>,
    pub steering: Steering,
}

impl Decision {
    fn idle(state: BehaviorState) -> Self {
        Self {
            state,
            target: None,
            steering: Steering::Hold,
        }
    }

    fn toward(state: BehaviorState, target: CreatureId, population: &Population) -> Option<Self> {
        let position = population.get(target)?.position()?;
        Some(Self {
            state,
            target: Some(target),
            steering: Steering::Toward(position),
        })
    }

    fn away_from(target: CreatureId, population: &Population) -> Option<Self> {
        let position = population.get(target)?.position()?;
        Some(Self {
            state: BehaviorState::Fleeing,
            target: Some(target),
            steering: Steering::AwayFrom(position),
        })
    }

    /// Whether the decision issues a motion command
    pub fn is_busy(&self) -> bool {
        !matches!(self.steering, Steering::Hold)
    }
}

/// Pick this tick's sensing-driven motion, in priority order.
///
/// Only the first matching branch moves the creature.
pub fn decide(creature: &Creature, population: &Population, tuning: &EcosystemTuning) -> Decision {
    match creature.kind() {
        CreatureKind::Plant => Decision::idle(BehaviorState::Rooted),
        CreatureKind::Herbivore => decide_herbivore(creature, population, tuning),
        CreatureKind::Predator => decide_predator(creature, population, tuning),
    }
}

fn decide_herbivore(creature: &Creature, population: &Population, tuning: &EcosystemTuning) -> Decision {
    if let Some(decision) = creature
        .closest_visible(CreatureKind::Predator, population)
        .and_then(|predator| Decision::away_from(predator, population))
    {
        return decision;
    }

    forage_or_court(creature, CreatureKind::Plant, population, tuning)
        .unwrap_or_else(|| Decision::idle(BehaviorState::Wandering))
}

fn decide_predator(creature: &Creature, population: &Population, tuning: &EcosystemTuning) -> Decision {
    forage_or_court(creature, CreatureKind::Herbivore, population, tuning)
        .unwrap_or_else(|| Decision::idle(BehaviorState::Wandering))
}

fn forage_or_court(
    creature: &Creature,
    food: CreatureKind,
    population: &Population,
    tuning: &EcosystemTuning,
) -> Option<Decision> {
    if creature.energy_percentage() < tuning.hunger_threshold {
        if let Some(decision) = creature
            .closest_visible(food, population)
            .and_then(|prey| Decision::toward(BehaviorState::Chasing, prey, population))
        {
            return Some(decision);
        }
    }

    if creature.can_reproduce() {
        let partner = creature.closest_visible_where(creature.kind(), population, Creature::can_reproduce)?;
        return Decision::toward(BehaviorState::Mating, partner, population);
    }

    None
}

/// What happens when a creature touches another one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAction {
    /// Two ready creatures of the same animal kind breed
    Mate,
    /// A herbivore bites a plant
    Graze,
    /// A predator paralyzes and bites a herbivore
    Hunt,
}

/// Evaluated against live state, so earlier contacts in the same tick count.
pub fn contact_action(actor: &Creature, other: &Creature, tuning: &EcosystemTuning) -> Option<ContactAction> {
    if actor.is_destroyed() || other.is_destroyed() {
        return None;
    }

    match (actor.kind(), other.kind()) {
        (CreatureKind::Herbivore, CreatureKind::Herbivore)
        | (CreatureKind::Predator, CreatureKind::Predator) => {
            (actor.can_reproduce() && other.can_reproduce()).then_some(ContactAction::Mate)
        }
        (CreatureKind::Herbivore, CreatureKind::Plant) => {
            (actor.energy_percentage() < tuning.feeding_cap(CreatureKind::Herbivore))
                .then_some(ContactAction::Graze)
        }
        (CreatureKind::Predator, CreatureKind::Herbivore) => {
            (actor.energy_percentage() < tuning.feeding_cap(CreatureKind::Predator))
                .then_some(ContactAction::Hunt)
        }
        _ => None,
    }
}

/// Random wandering: a chance to turn either way, and an independent chance to push on.
pub fn explore<R: Rng + ?Sized>(creature: &mut Creature, tuning: &EcosystemTuning, rng: &mut R) {
    let torque = tuning.explore_force * creature.mass();

    if rng.gen::<f64>() < tuning.explore_turn_chance {
        let torque = if rng.gen_bool(0.5) { torque } else { -torque };
        creature.turn(torque);
    }
    if rng.gen::<f64>() < tuning.explore_go_chance {
        creature.go(tuning.explore_force);
    }
}
