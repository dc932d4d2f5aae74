use ecosystem_sim::organisms::{
    apply_contact, reproduce, ContactAction, EcosystemTuning, KinematicLimits, DEFAULT_PARALYSIS,
};
use ecosystem_sim::{
    Creature, CreatureConfiguration, CreatureKind, KinematicBodies, KinematicBody, SimEvent, World,
};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn configuration(energy: f32, position: Vec3) -> CreatureConfiguration {
    CreatureConfiguration {
        growth_rate: 1.0,
        max_age: 70.0,
        size: 2.0,
        sensor_size: 0.0,
        energy,
        mutation_rate: 0.1,
        position,
    }
}

fn make_creature(kind: CreatureKind, initial_energy: f32, energy: f32, position: Vec3) -> Creature {
    let body = KinematicBody::new(kind.body_shape(2.0), position, 1.0);
    let mut creature = Creature::new(
        kind,
        &configuration(initial_energy, position),
        Box::new(body),
        KinematicLimits::default(),
    );
    creature.energy = energy;
    creature
}

#[test]
fn reproduction_splits_parent_energy() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut first = make_creature(CreatureKind::Herbivore, 100.0, 100.0, Vec3::ZERO);
    let mut second = make_creature(CreatureKind::Herbivore, 100.0, 80.0, Vec3::new(1.0, 0.0, 0.0));
    first.reproduction_time = 25.0;
    second.reproduction_time = 25.0;

    let child = reproduce(&mut first, &mut second, &mut rng).expect("both parents embodied");

    assert_eq!(first.energy, 50.0);
    assert_eq!(second.energy, 40.0);
    assert_eq!(first.reproduction_time, 0.0);
    assert_eq!(second.reproduction_time, 0.0);
    assert_eq!(child.energy, 90.0);
    // mutated reference energy stays within the parent's mutation rate
    assert!((child.config.energy - 90.0).abs() <= 9.0);
}

#[test]
fn predator_bite_paralyzes_shrinks_and_transfers() {
    let tuning = EcosystemTuning::default();
    let mut rng = StdRng::seed_from_u64(5);
    let mut predator = make_creature(CreatureKind::Predator, 100.0, 100.0, Vec3::ZERO);
    let mut herbivore = make_creature(CreatureKind::Herbivore, 100.0, 100.0, Vec3::ZERO);
    assert!(predator.energy_percentage() < tuning.predator_feeding_cap);

    let mass_before = herbivore.mass();
    let outcome = apply_contact(&mut predator, &mut herbivore, ContactAction::Hunt, &tuning, &mut rng);

    assert_eq!(herbivore.paralyzation_timer, DEFAULT_PARALYSIS);
    assert!(herbivore.is_paralyzed());
    assert!(herbivore.mass() < mass_before);

    let refund = 10.0 * (mass_before - herbivore.mass());
    assert!((predator.energy - (100.0 + outcome.transferred)).abs() < 1e-4);
    assert!((herbivore.energy - (100.0 + refund - outcome.transferred)).abs() < 1e-4);
}

#[test]
fn take_energy_is_zero_sum() {
    let mut predator = make_creature(CreatureKind::Predator, 200.0, 50.0, Vec3::ZERO);
    let mut herbivore = make_creature(CreatureKind::Herbivore, 100.0, 70.0, Vec3::ZERO);
    if let Some(body) = predator.body_mut() {
        body.set_linear_velocity(Vec3::new(3.0, 0.0, 4.0));
    }

    let total_before = predator.energy + herbivore.energy;
    let taken = herbivore.take_energy(&mut predator);

    // mass 1 at speed 5 plus a tenth of the taker's initial energy
    assert!((taken - 25.0).abs() < 1e-4);
    assert!((predator.energy + herbivore.energy - total_before).abs() < 1e-4);
    assert!(!herbivore.is_destroyed());
}

#[test]
fn touching_predator_bites_within_a_tick() {
    let mut world = World::kinematic(Some(11));
    world.create_border(50.0, 50.0);
    let herbivore = world
        .spawn(CreatureKind::Herbivore, &configuration(100.0, Vec3::ZERO))
        .expect("valid herbivore");
    let predator = world
        .spawn(CreatureKind::Predator, &configuration(100.0, Vec3::new(1.0, 0.0, 0.0)))
        .expect("valid predator");
    world.drain_events();

    world.step();

    let victim = world.get(herbivore).expect("herbivore survives one bite");
    assert_eq!(victim.paralyzation_timer, DEFAULT_PARALYSIS);
    assert!(victim.energy < 100.0);
    assert!(world.get(predator).expect("predator").energy > 100.0);

    let events = world.drain_events();
    assert!(events.contains(&SimEvent::Paralyzed {
        victim: herbivore,
        by: predator,
        duration: DEFAULT_PARALYSIS,
    }));
}

#[test]
fn ready_partners_breed_on_contact() {
    let calm = EcosystemTuning {
        explore_turn_chance: 0.0,
        explore_go_chance: 0.0,
        ..EcosystemTuning::default()
    };
    let mut world = World::new(Box::new(KinematicBodies::new()), calm, Some(12));
    world.create_border(50.0, 50.0);
    let first = world
        .spawn(CreatureKind::Herbivore, &configuration(100.0, Vec3::ZERO))
        .expect("valid herbivore");
    let second = world
        .spawn(CreatureKind::Herbivore, &configuration(100.0, Vec3::new(1.0, 0.0, 0.0)))
        .expect("valid herbivore");
    for id in [first, second] {
        if let Some(creature) = world.get_mut(id) {
            creature.reproduction_time = 30.0;
        }
    }
    world.drain_events();

    world.step();

    assert_eq!(world.population().len(), 3);
    let child_id = world.population().ids()[2];
    let child = world.get(child_id).expect("child");
    assert_eq!(child.kind(), CreatureKind::Herbivore);
    assert_eq!(child.energy, 100.0);
    assert_eq!(child.age, 0.0, "newborns act from the next tick on");

    assert_eq!(world.get(first).expect("first").energy, 50.0);
    assert_eq!(world.get(second).expect("second").energy, 50.0);

    let events = world.drain_events();
    assert!(events.contains(&SimEvent::Mated {
        kind: CreatureKind::Herbivore,
        parents: (first, second),
    }));
    assert!(events.contains(&SimEvent::Born {
        id: child_id,
        kind: CreatureKind::Herbivore,
    }));
}

#[test]
fn plant_seeding_quarters_the_parent() {
    let tuning = EcosystemTuning {
        plant_seed_chance: 1.0,
        ..EcosystemTuning::default()
    };
    let mut world = World::new(Box::new(KinematicBodies::new()), tuning, Some(13));
    world.create_border(50.0, 50.0);
    let plant = world
        .spawn(CreatureKind::Plant, &configuration(100.0, Vec3::new(0.0, 0.1, 0.0)))
        .expect("valid plant");
    if let Some(creature) = world.get_mut(plant) {
        creature.reproduction_time = 30.0;
    }

    world.step();

    assert_eq!(world.population().len(), 2);
    let parent = world.get(plant).expect("parent plant");
    assert_eq!(parent.energy, 25.0);
    assert_eq!(parent.reproduction_time, 0.0);
    let seedling = world.population().ids()[1];
    assert_eq!(world.get(seedling).expect("seedling").kind(), CreatureKind::Plant);
}
