mod border;
mod events;
mod population;

use crate::config::{CohortSettings, ConfigError, SimulationConfig};
use crate::organisms::{
    step_creature, Creature, CreatureConfiguration, CreatureId, CreatureKind, CreatureStats,
    DeathCause, EcosystemTuning, Offspring, StatisticsSnapshot, TICK,
};
use crate::physics::{BodyDescriptor, BodyProvider, KinematicBodies};
use crate::utils::Mutate;
use bevy_ecs::system::Resource;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::{debug, info, warn};

pub use border::{Border, WALL_HEIGHT, WALL_THICKNESS};
pub use events::SimEvent;
pub use population::{Population, ProximityStats};

/// Height at which creature bodies rest on the ground
pub const SPAWN_HEIGHT: f32 = 0.1;

/// Absorbs float drift when the statistics timer is compared to its interval
const TIMER_SLACK: f32 = 1e-4;

/// Growth rate compounds every tick, so cohorts only jitter it by `rate^10`.
const COHORT_GROWTH_EXPONENT: i32 = 10;

/// Callback receiving periodic statistics snapshots.
pub type StatisticsSink = Box<dyn FnMut(&StatisticsSnapshot) + Send + Sync>;

/// The simulated arena: population, boundary, tick orchestration and statistics.
#[derive(Resource)]
pub struct World {
    population: Population,
    provider: Box<dyn BodyProvider>,
    border: Option<Border>,
    ceiling: bool,
    /// Paused worlds ignore `step` entirely
    pub should_run_simulation: bool,
    /// Simulated time between two statistics snapshots
    pub statistics_interval: f32,
    statistics_timer: f32,
    statistics_sink: Option<StatisticsSink>,
    tuning: EcosystemTuning,
    rng: StdRng,
    events: Vec<SimEvent>,
    tick: u64,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("population", &self.population.len())
            .field("border", &self.border.as_ref().map(Border::size))
            .field("should_run_simulation", &self.should_run_simulation)
            .field("statistics_interval", &self.statistics_interval)
            .field("has_statistics_sink", &self.statistics_sink.is_some())
            .field("tick", &self.tick)
            .finish()
    }
}

impl World {
    /// Empty world without a border. A seed makes every random draw reproducible.
    pub fn new(provider: Box<dyn BodyProvider>, tuning: EcosystemTuning, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            population: Population::new(),
            provider,
            border: None,
            ceiling: false,
            should_run_simulation: true,
            statistics_interval: 0.5,
            statistics_timer: 0.0,
            statistics_sink: None,
            tuning,
            rng,
            events: Vec::new(),
            tick: 0,
        }
    }

    /// World over the in-process kinematic body backend.
    pub fn kinematic(seed: Option<u64>) -> Self {
        Self::new(Box::new(KinematicBodies::new()), EcosystemTuning::default(), seed)
    }

    /// Validated world with its border built; cohorts are spawned by [`World::populate`].
    pub fn from_config(config: &SimulationConfig, provider: Box<dyn BodyProvider>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut world = Self::new(provider, config.tuning.clone(), config.rng_seed);
        world.statistics_interval = config.statistics_interval;
        world.ceiling = config.ceiling;
        world.create_border(config.width, config.height);
        Ok(world)
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.population.get(id)
    }

    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.population.get_mut(id)
    }

    pub fn border(&self) -> Option<&Border> {
        self.border.as_ref()
    }

    pub fn tuning(&self) -> &EcosystemTuning {
        &self.tuning
    }

    /// Executed (non-paused) ticks so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn sim_time(&self) -> f32 {
        self.tick as f32 * TICK
    }

    pub fn set_ceiling(&mut self, ceiling: bool) {
        self.ceiling = ceiling;
    }

    /// Rebuild the boundary colliders, disposing the previous ones first.
    pub fn create_border(&mut self, width: f32, height: f32) {
        if let Some(previous) = self.border.take() {
            previous.dispose();
        }
        self.border = Some(Border::build(self.provider.as_mut(), width, height, self.ceiling));
        info!("[WORLD] border set to {}x{}", width, height);
    }

    /// Register an already embodied creature; insertion order is stepping order.
    pub fn add_creature(&mut self, creature: Creature) -> CreatureId {
        let kind = creature.kind();
        let id = self.population.insert(creature);
        self.events.push(SimEvent::Born { id, kind });
        id
    }

    /// Variant factory: allocate a body of `kind` and register the creature.
    pub fn spawn(&mut self, kind: CreatureKind, config: &CreatureConfiguration) -> Result<CreatureId, ConfigError> {
        config.validate()?;
        let descriptor = BodyDescriptor::dynamic(
            kind.label(),
            kind.body_shape(config.size),
            config.position,
            self.tuning.initial_mass,
        );
        let body = self.provider.create_body(&descriptor);
        let creature = Creature::new(kind, config, body, self.tuning.limits);
        let id = self.add_creature(creature);
        debug!("[POPULATION] {} {:?} born at {:?}", kind.label(), id, config.position);
        Ok(id)
    }

    /// Spawn `settings.count` creatures at random positions inside the border.
    ///
    /// Every member gets the cohort configuration mutated by the cohort's
    /// mutation rate, clamped back into the creation constraints. Either the
    /// whole cohort is spawned or none of it.
    pub fn spawn_cohort(&mut self, kind: CreatureKind, settings: &CohortSettings) -> Result<Vec<CreatureId>, ConfigError> {
        let template = settings.configuration(kind, &self.tuning, Vec3::ZERO);
        template.validate()?;

        let (width, height) = self.border.as_ref().map_or((0.0, 0.0), Border::size);
        let reach_x = (width / 2.0 - settings.size).max(0.0);
        let reach_z = (height / 2.0 - settings.size).max(0.0);
        let rate = settings.mutation_rate;

        // every member is drawn and checked before the first body is created
        let mut members = Vec::with_capacity(settings.count);
        for _ in 0..settings.count {
            let position = Vec3::new(
                self.rng.gen_range(-reach_x..=reach_x),
                SPAWN_HEIGHT,
                self.rng.gen_range(-reach_z..=reach_z),
            );
            let base = CreatureConfiguration { position, ..template };
            let mut config = base.mutate(rate, &mut self.rng);
            config.growth_rate = base
                .growth_rate
                .mutate(base.growth_rate * rate.powi(COHORT_GROWTH_EXPONENT), &mut self.rng);
            config.position.y = SPAWN_HEIGHT;
            let config = config.clamped();
            config.validate()?;
            members.push(config);
        }

        let mut spawned = Vec::with_capacity(members.len());
        for config in &members {
            spawned.push(self.spawn(kind, config)?);
        }

        info!("[POPULATION] spawned {} {}s", spawned.len(), kind.label());
        Ok(spawned)
    }

    /// Spawn every cohort of `config` in plant, herbivore, predator order.
    pub fn populate(&mut self, config: &SimulationConfig) -> Result<usize, ConfigError> {
        let mut total = 0;
        for kind in CreatureKind::ALL {
            total += self.spawn_cohort(kind, config.cohort(kind))?.len();
        }
        Ok(total)
    }

    /// Destroy every creature, releasing its body.
    pub fn clear_inhabitants(&mut self) -> usize {
        let removed = self.population.clear();
        info!("[WORLD] cleared {} inhabitants", removed);
        removed
    }

    /// Rebuild every creature's `nearby` and `touching` relations.
    pub fn update_nearby(&mut self) -> ProximityStats {
        self.population.rebuild_proximity()
    }

    /// Advance the simulation by one tick.
    ///
    /// Proximity is rebuilt once before any creature acts. Creatures dead after
    /// their own step are removed in place; children born this tick are appended
    /// and first act on the next tick. Events left over from earlier ticks are
    /// discarded.
    pub fn step(&mut self) {
        if !self.should_run_simulation {
            return;
        }
        self.events.clear();

        if self.statistics_sink.is_some() {
            self.statistics_timer += TICK;
            if self.statistics_timer + TIMER_SLACK >= self.statistics_interval {
                self.statistics_timer = 0.0;
                self.emit_statistics();
            }
        }

        self.update_nearby();

        let mut index = 0;
        let mut remaining = self.population.len();
        while index < remaining {
            let Some(id) = self.population.id_at(index) else {
                break;
            };
            let litter = step_creature(
                &mut self.population,
                id,
                &self.tuning,
                &mut self.rng,
                &mut self.events,
            );
            for child in litter {
                self.embody(child);
            }

            if self.population.get(id).map_or(false, Creature::is_dead) {
                self.bury(index);
                remaining -= 1;
            } else {
                index += 1;
            }
        }

        // eaten before their own turn came, or already stepped when eaten
        for (id, creature) in self.population.sweep_destroyed() {
            self.record_death(id, &creature);
        }

        for creature in self.population.creatures_mut() {
            if let Some(body) = creature.body_mut() {
                body.advance(TICK);
            }
        }

        self.tick += 1;
    }

    fn embody(&mut self, child: Offspring) {
        match self.spawn(child.kind, &child.config) {
            Ok(id) => {
                if let Some(creature) = self.population.get_mut(id) {
                    creature.energy = child.energy;
                    creature.reproduction_time_threshold = child.reproduction_time_threshold;
                }
            }
            Err(err) => warn!("[POPULATION] offspring of {} rejected: {}", child.kind.label(), err),
        }
    }

    fn bury(&mut self, index: usize) {
        if let Some((id, mut creature)) = self.population.remove_at(index) {
            self.record_death(id, &creature);
            creature.destroy();
        }
    }

    fn record_death(&mut self, id: CreatureId, creature: &Creature) {
        let cause = creature.death_cause().unwrap_or(DeathCause::Consumed);
        debug!(
            "[POPULATION] {} {:?} died ({:?}) at age {:.2}",
            creature.kind().label(),
            id,
            cause,
            creature.age
        );
        self.events.push(SimEvent::Died {
            id,
            kind: creature.kind(),
            cause,
        });
    }

    /// Per-creature trait and state records. Never mutates the world.
    pub fn statistics_snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            tick: self.tick,
            sim_time: self.sim_time(),
            creatures: self
                .population
                .iter()
                .filter(|(_, creature)| !creature.is_destroyed())
                .map(|(_, creature)| CreatureStats::of(creature))
                .collect(),
        }
    }

    /// Register the periodic snapshot callback, replacing any previous one.
    pub fn on_statistics<F>(&mut self, sink: F)
    where
        F: FnMut(&StatisticsSnapshot) + Send + Sync + 'static,
    {
        self.statistics_sink = Some(Box::new(sink));
        self.statistics_timer = 0.0;
    }

    pub fn clear_statistics_sink(&mut self) {
        self.statistics_sink = None;
    }

    fn emit_statistics(&mut self) {
        let snapshot = self.statistics_snapshot();
        info!(
            "[STATS] t={:.2} {}",
            snapshot.sim_time,
            snapshot.summary().log_line()
        );
        if let Some(sink) = self.statistics_sink.as_mut() {
            sink(&snapshot);
        }
    }

    /// Events of the last executed tick, plus any spawned since
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Body, KinematicBody};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Kinematic body that reports its disposal to a shared counter
    #[derive(Debug)]
    struct TrackedBody {
        inner: KinematicBody,
        disposed: Arc<AtomicUsize>,
    }

    impl Body for TrackedBody {
        fn position(&self) -> Vec3 {
            self.inner.position()
        }
        fn set_position(&mut self, position: Vec3) {
            self.inner.set_position(position);
        }
        fn direction(&self, local: Vec3) -> Vec3 {
            self.inner.direction(local)
        }
        fn apply_impulse(&mut self, impulse: Vec3, at: Vec3) {
            self.inner.apply_impulse(impulse, at);
        }
        fn linear_velocity(&self) -> Vec3 {
            self.inner.linear_velocity()
        }
        fn set_linear_velocity(&mut self, velocity: Vec3) {
            self.inner.set_linear_velocity(velocity);
        }
        fn angular_velocity(&self) -> Vec3 {
            self.inner.angular_velocity()
        }
        fn set_angular_velocity(&mut self, velocity: Vec3) {
            self.inner.set_angular_velocity(velocity);
        }
        fn mass(&self) -> f32 {
            self.inner.mass()
        }
        fn set_mass(&mut self, mass: f32) {
            self.inner.set_mass(mass);
        }
        fn scaling(&self) -> Vec3 {
            self.inner.scaling()
        }
        fn set_scaling(&mut self, scaling: Vec3) {
            self.inner.set_scaling(scaling);
        }
        fn half_extents(&self) -> Vec3 {
            self.inner.half_extents()
        }
        fn intersects(&self, other: &dyn Body) -> bool {
            self.inner.intersects(other)
        }
        fn advance(&mut self, dt: f32) {
            self.inner.advance(dt);
        }
        fn dispose(&mut self) {
            if !self.inner.is_disposed() {
                self.disposed.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.dispose();
        }
    }

    #[derive(Default)]
    struct TrackedBodies {
        disposed: Arc<AtomicUsize>,
    }

    impl BodyProvider for TrackedBodies {
        fn create_body(&mut self, descriptor: &BodyDescriptor) -> Box<dyn Body> {
            Box::new(TrackedBody {
                inner: KinematicBody::from_descriptor(descriptor),
                disposed: Arc::clone(&self.disposed),
            })
        }
    }

    fn tracked_world() -> (World, Arc<AtomicUsize>) {
        let provider = TrackedBodies::default();
        let disposed = Arc::clone(&provider.disposed);
        let world = World::new(Box::new(provider), EcosystemTuning::default(), Some(7));
        (world, disposed)
    }

    fn config(energy: f32, position: Vec3) -> CreatureConfiguration {
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

    #[test]
    fn spawn_rejects_invalid_configuration() {
        let mut world = World::kinematic(Some(1));
        let result = world.spawn(CreatureKind::Herbivore, &config(-5.0, Vec3::ZERO));
        assert!(matches!(result, Err(ConfigError::NotPositive { field: "energy", .. })));
        assert!(world.population().is_empty());
    }

    #[test]
    fn statistics_follow_the_interval() {
        let mut world = World::kinematic(Some(2));
        world.create_border(50.0, 50.0);
        world
            .spawn(CreatureKind::Plant, &config(100.0, Vec3::ZERO))
            .expect("valid plant");

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        world.on_statistics(move |snapshot| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(snapshot.creatures.len());
            }
        });

        for _ in 0..30 {
            world.step();
        }
        let seen = received.lock().map(|seen| seen.clone()).unwrap_or_default();
        assert_eq!(seen, vec![1, 1]);
    }

    #[test]
    fn cohort_lands_inside_the_border() {
        let mut world = World::kinematic(Some(3));
        world.create_border(40.0, 20.0);
        let settings = CohortSettings {
            count: 25,
            ..CohortSettings::default()
        };
        let ids = world
            .spawn_cohort(CreatureKind::Herbivore, &settings)
            .expect("default cohort is valid");
        assert_eq!(ids.len(), 25);

        let border = world.border().expect("border built");
        for id in ids {
            let creature = world.get(id).expect("spawned");
            let position = creature.position().expect("embodied");
            assert!(border.contains(position));
            assert!((creature.initial_energy - 500.0).abs() <= 100.0);
            assert!((creature.sensor_size - 10.0).abs() <= 2.0);
        }
    }

    #[test]
    fn border_rebuild_replaces_colliders() {
        let (mut world, disposed) = tracked_world();
        world.set_ceiling(true);
        world.create_border(20.0, 20.0);
        let first = world.border().map_or(0, Border::collider_count);
        assert_eq!(first, 10);
        assert_eq!(disposed.load(Ordering::SeqCst), 0);

        world.create_border(30.0, 10.0);
        assert_eq!(disposed.load(Ordering::SeqCst), first);
        let border = world.border().expect("border built");
        assert_eq!(border.size(), (30.0, 10.0));
        assert!(border.has_ceiling());
    }

    #[test]
    fn spawning_emits_born_events() {
        let mut world = World::kinematic(Some(4));
        let id = world
            .spawn(CreatureKind::Predator, &config(100.0, Vec3::ZERO))
            .expect("valid predator");
        let events = world.drain_events();
        assert_eq!(
            events,
            vec![SimEvent::Born {
                id,
                kind: CreatureKind::Predator
            }]
        );
        assert!(world.events().is_empty());
    }

    #[test]
    fn clearing_releases_every_body() {
        let (mut world, disposed) = tracked_world();
        world.create_border(50.0, 50.0);
        let colliders = world.border().map_or(0, Border::collider_count);
        for x in [-10.0, 0.0, 10.0] {
            world
                .spawn(CreatureKind::Herbivore, &config(100.0, Vec3::new(x, SPAWN_HEIGHT, 0.0)))
                .expect("valid herbivore");
        }

        assert_eq!(world.clear_inhabitants(), 3);
        assert!(world.population().is_empty());
        // creature bodies only; the border keeps its colliders
        assert_eq!(disposed.load(Ordering::SeqCst), 3);
        assert_eq!(world.border().map_or(0, Border::collider_count), colliders);
    }

    #[test]
    fn events_only_cover_the_latest_tick() {
        let tuning = EcosystemTuning {
            plant_seed_chance: 1.0,
            ..EcosystemTuning::default()
        };
        let mut world = World::new(Box::new(KinematicBodies::new()), tuning, Some(8));
        world.create_border(50.0, 50.0);
        let plant = world
            .spawn(CreatureKind::Plant, &config(100.0, Vec3::new(0.0, SPAWN_HEIGHT, 0.0)))
            .expect("valid plant");
        if let Some(creature) = world.get_mut(plant) {
            creature.reproduction_time = 30.0;
        }

        world.step();
        assert!(matches!(world.events(), [SimEvent::Born { kind: CreatureKind::Plant, .. }]));

        for _ in 0..10 {
            world.step();
        }
        assert!(world.events().is_empty());
    }

    #[test]
    fn wild_cohort_is_clamped_into_valid_members() {
        let mut world = World::kinematic(Some(9));
        world.create_border(60.0, 60.0);
        let settings = CohortSettings {
            count: 40,
            mutation_rate: 1.5,
            ..CohortSettings::default()
        };

        let ids = world
            .spawn_cohort(CreatureKind::Herbivore, &settings)
            .expect("clamped members always validate");
        assert_eq!(ids.len(), 40);
        for id in ids {
            let creature = world.get(id).expect("spawned");
            assert!(creature.growth_rate > 0.0);
            assert!(creature.initial_size > 0.0);
            assert!(creature.initial_energy > 0.0);
        }
    }

    #[test]
    fn failing_cohort_spawns_nothing() {
        let mut world = World::kinematic(Some(10));
        world.create_border(60.0, 60.0);
        let settings = CohortSettings {
            count: 5,
            energy: -1.0,
            ..CohortSettings::default()
        };
        assert!(world.spawn_cohort(CreatureKind::Plant, &settings).is_err());
        assert!(world.population().is_empty());
        assert!(world.events().is_empty());
    }

    #[test]
    fn clearing_empties_the_population() {
        let mut world = World::kinematic(Some(5));
        world
            .spawn(CreatureKind::Plant, &config(100.0, Vec3::ZERO))
            .expect("valid plant");
        world
            .spawn(CreatureKind::Herbivore, &config(100.0, Vec3::X))
            .expect("valid herbivore");
        assert_eq!(world.clear_inhabitants(), 2);
        assert!(world.population().is_empty());
    }
}
