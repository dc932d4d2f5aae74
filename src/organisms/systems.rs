use crate::organisms::behavior::{contact_action, decide, explore, ContactAction, Steering};
use crate::organisms::components::CreatureId;
use crate::organisms::creature::{wrap_angle, Creature};
use crate::organisms::genetics::{reproduce, reproduce_alone, Offspring};
use crate::organisms::tuning::EcosystemTuning;
use crate::world::{Population, SimEvent};
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::PI;
use tracing::debug;

/// Children produced by one creature in one tick
pub type Litter = SmallVec<[Offspring; 2]>;

/// Run one creature's tick: lifecycle, decision, steering, contacts, exploring.
///
/// Offspring are returned, not inserted; the world embodies them.
pub fn step_creature<R: Rng + ?Sized>(
    population: &mut Population,
    id: CreatureId,
    tuning: &EcosystemTuning,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
) -> Litter {
    let mut litter = Litter::new();

    let Some(creature) = population.get_mut(id) else {
        return litter;
    };
    // killed by another creature since its last turn: the world buries it now
    if creature.is_destroyed() || creature.is_dead() {
        return litter;
    }
    creature.advance_lifecycle();

    if !creature.kind().is_animal() {
        step_plant(creature, id, tuning, rng, events, &mut litter);
        return litter;
    }

    let busy = match population.get(id) {
        Some(creature) => {
            let decision = decide(creature, population, tuning);
            if let Some(creature) = population.get_mut(id) {
                steer(creature, decision.steering, tuning);
            }
            decision.is_busy()
        }
        None => false,
    };

    let contacted = resolve_contacts(population, id, tuning, rng, events, &mut litter);

    if !busy && !contacted {
        if let Some(creature) = population.get_mut(id) {
            explore(creature, tuning, rng);
        }
    }

    litter
}

fn step_plant<R: Rng + ?Sized>(
    plant: &mut Creature,
    id: CreatureId,
    tuning: &EcosystemTuning,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
    litter: &mut Litter,
) {
    plant.refresh_plant_energy();
    if !plant.can_reproduce() {
        return;
    }

    if rng.gen::<f64>() < tuning.plant_seed_chance {
        if let Some(seedling) = reproduce_alone(plant, rng) {
            litter.push(seedling);
        }
    } else {
        // a failed attempt still spends the cooldown
        plant.reproduction_time = 0.0;
        debug!("[POPULATION] plant {:?} failed to seed", id);
        events.push(SimEvent::SeedFailed { id });
    }
}

fn steer(creature: &mut Creature, steering: Steering, tuning: &EcosystemTuning) {
    let bearing = match steering {
        Steering::Hold => return,
        Steering::Toward(target) => creature.bearing_to(target),
        Steering::AwayFrom(threat) => creature.bearing_to(threat).map(|angle| wrap_angle(angle + PI)),
    };
    if let Some(angle) = bearing {
        creature.turn_to(angle);
    }
    creature.go(tuning.pursuit_force);
}

/// Result of one contact interaction
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactOutcome {
    /// Energy moved from the target to the actor
    pub transferred: f32,
    pub offspring: Option<Offspring>,
}

/// Carry out `action` between `actor` and the creature it touches.
pub fn apply_contact<R: Rng + ?Sized>(
    actor: &mut Creature,
    target: &mut Creature,
    action: ContactAction,
    tuning: &EcosystemTuning,
    rng: &mut R,
) -> ContactOutcome {
    match action {
        ContactAction::Mate => ContactOutcome {
            transferred: 0.0,
            offspring: reproduce(actor, target, rng),
        },
        ContactAction::Graze => {
            target.shrink(Some(tuning.bite_shrink));
            ContactOutcome {
                transferred: target.take_energy(actor),
                offspring: None,
            }
        }
        ContactAction::Hunt => {
            target.paralyze(tuning.paralysis_duration);
            target.shrink(Some(tuning.bite_shrink));
            ContactOutcome {
                transferred: target.take_energy(actor),
                offspring: None,
            }
        }
    }
}

fn resolve_contacts<R: Rng + ?Sized>(
    population: &mut Population,
    id: CreatureId,
    tuning: &EcosystemTuning,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
    litter: &mut Litter,
) -> bool {
    let touching: SmallVec<[CreatureId; 4]> = match population.get(id) {
        Some(creature) => SmallVec::from_slice(creature.touching()),
        None => return false,
    };

    let mut acted = false;
    for other in touching {
        let Some((actor, target)) = population.pair_mut(id, other) else {
            continue;
        };
        let Some(action) = contact_action(actor, target, tuning) else {
            continue;
        };
        acted = true;

        if action == ContactAction::Hunt {
            events.push(SimEvent::Paralyzed {
                victim: other,
                by: id,
                duration: tuning.paralysis_duration,
            });
        }

        let outcome = apply_contact(actor, target, action, tuning, rng);
        match action {
            ContactAction::Mate => {
                if let Some(child) = outcome.offspring {
                    debug!("[POPULATION] {:?} mated with {:?}", id, other);
                    events.push(SimEvent::Mated {
                        kind: actor.kind(),
                        parents: (id, other),
                    });
                    litter.push(child);
                }
            }
            ContactAction::Graze | ContactAction::Hunt => {
                events.push(SimEvent::Ate {
                    eater: id,
                    food: other,
                    amount: outcome.transferred,
                });
            }
        }
    }
    acted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organisms::components::{CreatureConfiguration, CreatureKind, KinematicLimits};
    use crate::physics::KinematicBody;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn creature(kind: CreatureKind, position: Vec3) -> Creature {
        let config = CreatureConfiguration {
            growth_rate: 1.0,
            max_age: 70.0,
            size: 2.0,
            sensor_size: 10.0,
            energy: 100.0,
            mutation_rate: 0.1,
            position,
        };
        let body = KinematicBody::new(kind.body_shape(2.0), position, 1.0);
        Creature::new(kind, &config, Box::new(body), KinematicLimits::default())
    }

    #[test]
    fn herbivore_grazes_touching_plant() {
        let tuning = EcosystemTuning::default();
        let mut rng = StdRng::seed_from_u64(8);
        let mut population = Population::new();
        let herbivore = population.insert(creature(CreatureKind::Herbivore, Vec3::ZERO));
        let plant = population.insert(creature(CreatureKind::Plant, Vec3::new(0.5, 0.0, 0.0)));
        population.rebuild_proximity();

        let mut events = Vec::new();
        step_creature(&mut population, herbivore, &tuning, &mut rng, &mut events);

        assert!(events
            .iter()
            .any(|event| matches!(event, SimEvent::Ate { eater, food, .. } if *eater == herbivore && *food == plant)));
        let plant_mass = population.get(plant).map(Creature::mass).unwrap_or_default();
        assert!(plant_mass < 1.0);
    }

    #[test]
    fn dead_creature_takes_no_turn() {
        let tuning = EcosystemTuning::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut population = Population::new();
        let mut starved = creature(CreatureKind::Herbivore, Vec3::ZERO);
        starved.energy = -8.0;
        let herbivore = population.insert(starved);
        population.insert(creature(CreatureKind::Plant, Vec3::new(0.5, 0.0, 0.0)));
        population.rebuild_proximity();

        let mut events = Vec::new();
        let litter = step_creature(&mut population, herbivore, &tuning, &mut rng, &mut events);

        assert!(litter.is_empty());
        assert!(events.is_empty());
        let after = population.get(herbivore).expect("left for the world to bury");
        assert_eq!(after.energy, -8.0);
        assert_eq!(after.age, 0.0);
        assert!(after.is_dead());
    }

    #[test]
    fn ready_plant_either_seeds_or_resets() {
        let tuning = EcosystemTuning::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut seeded = 0;
        let mut failed = 0;
        for _ in 0..40 {
            let mut population = Population::new();
            let mut plant = creature(CreatureKind::Plant, Vec3::ZERO);
            plant.reproduction_time = 50.0;
            let id = population.insert(plant);

            let mut events = Vec::new();
            let litter = step_creature(&mut population, id, &tuning, &mut rng, &mut events);
            let reproduction_time = population.get(id).map_or(-1.0, |plant| plant.reproduction_time);
            assert_eq!(reproduction_time, 0.0);
            if litter.is_empty() {
                assert!(matches!(events.as_slice(), [SimEvent::SeedFailed { .. }]));
                failed += 1;
            } else {
                assert_eq!(litter[0].kind, CreatureKind::Plant);
                seeded += 1;
            }
        }
        assert!(seeded > 0 && failed > 0);
    }

    #[test]
    fn fleeing_herbivore_moves_away() {
        let tuning = EcosystemTuning::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut population = Population::new();
        let herbivore = population.insert(creature(CreatureKind::Herbivore, Vec3::ZERO));
        population.insert(creature(CreatureKind::Predator, Vec3::new(-6.0, 0.0, -6.0)));
        population.rebuild_proximity();

        let mut events = Vec::new();
        step_creature(&mut population, herbivore, &tuning, &mut rng, &mut events);

        let velocity = population
            .get(herbivore)
            .and_then(Creature::body)
            .map(|body| body.linear_velocity())
            .unwrap_or_default();
        // heading starts pointing away from the threat
        assert!(velocity.x > 0.0 && velocity.z > 0.0);
    }

    #[test]
    fn hunt_paralyzes_and_transfers() {
        let tuning = EcosystemTuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut predator = creature(CreatureKind::Predator, Vec3::ZERO);
        let mut herbivore = creature(CreatureKind::Herbivore, Vec3::ZERO);

        let outcome = apply_contact(&mut predator, &mut herbivore, ContactAction::Hunt, &tuning, &mut rng);

        assert_eq!(herbivore.paralyzation_timer, 2.0);
        assert!(herbivore.mass() < 1.0);
        assert!((predator.energy - (100.0 + outcome.transferred)).abs() < 1e-4);
        assert!((outcome.transferred - 10.0).abs() < 1e-5);
    }
}
