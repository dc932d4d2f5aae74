use bevy_ecs::prelude::*;
use ecosystem_sim::{
    KinematicBodies, SimEvent, SimulationConfig, SimulationError, StatisticsSnapshot,
    World as Ecosystem,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Snapshots handed over by the world's statistics callback
#[derive(Resource, Default, Clone)]
struct SnapshotInbox(Arc<Mutex<Vec<StatisticsSnapshot>>>);

/// JSON-lines statistics file; `None` when it could not be created
#[derive(Resource)]
struct StatisticsLog {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    written: usize,
}

/// Running totals of engine events
#[derive(Resource, Default)]
struct EventTally {
    births: usize,
    deaths: usize,
    meals: usize,
    matings: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        error!("[WORLD] simulation aborted: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), SimulationError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("[WORLD] loading configuration from {}", path);
            SimulationConfig::load(path)?
        }
        None => SimulationConfig::default(),
    };

    let mut ecosystem = Ecosystem::from_config(&config, Box::new(KinematicBodies::new()))?;
    let spawned = ecosystem.populate(&config)?;
    info!(
        "[WORLD] {}x{} arena with {} creatures, running {} ticks",
        config.width, config.height, spawned, config.ticks
    );

    let inbox = SnapshotInbox::default();
    let sink = Arc::clone(&inbox.0);
    ecosystem.on_statistics(move |snapshot| {
        if let Ok(mut pending) = sink.lock() {
            pending.push(snapshot.clone());
        }
    });
    // the first snapshot is taken right away so the log has a starting point
    if let Ok(mut pending) = inbox.0.lock() {
        pending.push(ecosystem.statistics_snapshot());
    }

    let mut ecs = World::new();
    ecs.insert_resource(ecosystem);
    ecs.insert_resource(inbox);
    ecs.insert_resource(open_statistics_log());
    ecs.init_resource::<EventTally>();

    let mut schedule = Schedule::default();
    schedule.add_systems((step_ecosystem, tally_events, write_statistics).chain());

    for _ in 0..config.ticks {
        schedule.run(&mut ecs);
    }

    if let Some(mut log) = ecs.get_resource_mut::<StatisticsLog>() {
        if let Some(writer) = log.writer.as_mut() {
            writer.flush()?;
        }
        info!("[STATS] wrote {} snapshots to {}", log.written, log.path.display());
    }
    if let Some(ecosystem) = ecs.get_resource::<Ecosystem>() {
        let summary = ecosystem.statistics_snapshot().summary();
        info!("[WORLD] finished at tick {}: {}", ecosystem.tick(), summary.log_line());
    }
    if let Some(tally) = ecs.get_resource::<EventTally>() {
        info!(
            "[WORLD] births={} deaths={} meals={} matings={}",
            tally.births, tally.deaths, tally.meals, tally.matings
        );
    }
    Ok(())
}

fn open_statistics_log() -> StatisticsLog {
    let logs_dir = PathBuf::from("data/logs");
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let path = logs_dir.join(format!("statistics_{}.jsonl", timestamp));

    let writer = std::fs::create_dir_all(&logs_dir)
        .and_then(|_| File::create(&path))
        .map(BufWriter::new);
    match writer {
        Ok(writer) => StatisticsLog {
            writer: Some(writer),
            path,
            written: 0,
        },
        Err(err) => {
            warn!("[STATS] statistics log disabled, cannot create {}: {}", path.display(), err);
            StatisticsLog {
                writer: None,
                path,
                written: 0,
            }
        }
    }
}

fn step_ecosystem(mut ecosystem: ResMut<Ecosystem>) {
    ecosystem.step();
}

fn tally_events(mut ecosystem: ResMut<Ecosystem>, mut tally: ResMut<EventTally>) {
    for event in ecosystem.drain_events() {
        match event {
            SimEvent::Born { .. } => tally.births += 1,
            SimEvent::Died { .. } => tally.deaths += 1,
            SimEvent::Ate { .. } => tally.meals += 1,
            SimEvent::Mated { .. } => tally.matings += 1,
            SimEvent::Paralyzed { .. } | SimEvent::SeedFailed { .. } => {}
        }
    }
}

fn write_statistics(inbox: Res<SnapshotInbox>, mut log: ResMut<StatisticsLog>) {
    let pending = match inbox.0.lock() {
        Ok(mut pending) => std::mem::take(&mut *pending),
        Err(_) => return,
    };

    for snapshot in pending {
        let Some(writer) = log.writer.as_mut() else {
            continue;
        };
        let line = serde_json::to_string(&snapshot).map_err(SimulationError::from);
        let result = line.and_then(|line| writeln!(writer, "{}", line).map_err(SimulationError::from));
        match result {
            Ok(()) => log.written += 1,
            Err(err) => {
                warn!("[STATS] dropping statistics log: {}", err);
                log.writer = None;
            }
        }
    }
}
