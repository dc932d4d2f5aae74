use crate::organisms::components::{CreatureKind, KinematicLimits};
use crate::organisms::creature::Creature;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scalar traits and state of one creature at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureStats {
    pub kind: CreatureKind,
    /// Numeric type tag: 0 plant, 1 herbivore, 2 predator
    pub type_tag: u8,
    pub age: f32,
    pub energy: f32,
    pub energy_percentage: f32,
    pub opacity: f32,
    pub growth_rate: f32,
    pub mutation_rate: f32,
    pub initial_size: f32,
    pub size: f32,
    pub sensor_size: f32,
    pub max_age: f32,
    pub reproduction_time_threshold: f32,
    pub limits: KinematicLimits,
    pub paralyzed: bool,
}

impl CreatureStats {
    pub fn of(creature: &Creature) -> Self {
        Self {
            kind: creature.kind(),
            type_tag: creature.kind().tag(),
            age: creature.age,
            energy: creature.energy,
            energy_percentage: creature.energy_percentage(),
            opacity: creature.opacity(),
            growth_rate: creature.growth_rate,
            mutation_rate: creature.mutation_rate,
            initial_size: creature.initial_size,
            size: creature.size(),
            sensor_size: creature.sensor_size,
            max_age: creature.max_age,
            reproduction_time_threshold: creature.reproduction_time_threshold,
            limits: creature.limits,
            paralyzed: creature.is_paralyzed(),
        }
    }
}

/// Read-only view of the population handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub tick: u64,
    /// Simulated time, `tick` times the tick quantum
    pub sim_time: f32,
    pub creatures: Vec<CreatureStats>,
}

impl StatisticsSnapshot {
    pub fn summary(&self) -> PopulationSummary {
        PopulationSummary::from_records(&self.creatures)
    }
}

/// Averages for one creature kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KindSummary {
    pub count: u32,
    pub avg_energy: f32,
    pub avg_size: f32,
    pub avg_age: f32,
}

/// Population counts and trait averages per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub total: u32,
    pub by_kind: HashMap<CreatureKind, KindSummary>,
}

impl PopulationSummary {
    pub fn from_records(records: &[CreatureStats]) -> Self {
        let mut sums: HashMap<CreatureKind, (f32, f32, f32, u32)> = HashMap::new();
        for record in records {
            let entry = sums.entry(record.kind).or_insert((0.0, 0.0, 0.0, 0));
            entry.0 += record.energy;
            entry.1 += record.size;
            entry.2 += record.age;
            entry.3 += 1;
        }

        let by_kind = sums
            .into_iter()
            .map(|(kind, (energy, size, age, count))| {
                let n = count as f32;
                (
                    kind,
                    KindSummary {
                        count,
                        avg_energy: energy / n,
                        avg_size: size / n,
                        avg_age: age / n,
                    },
                )
            })
            .collect();

        Self {
            total: records.len() as u32,
            by_kind,
        }
    }

    pub fn count(&self, kind: CreatureKind) -> u32 {
        self.by_kind.get(&kind).map_or(0, |summary| summary.count)
    }

    /// One-line rendering for logs: `plants=.. herbivores=.. predators=..`
    pub fn log_line(&self) -> String {
        format!(
            "total={} plants={} herbivores={} predators={}",
            self.total,
            self.count(CreatureKind::Plant),
            self.count(CreatureKind::Herbivore),
            self.count(CreatureKind::Predator)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: CreatureKind, energy: f32, size: f32) -> CreatureStats {
        CreatureStats {
            kind,
            type_tag: kind.tag(),
            age: 1.0,
            energy,
            energy_percentage: energy / 100.0,
            opacity: (energy / 100.0).clamp(0.0, 1.0),
            growth_rate: 1.0,
            mutation_rate: 0.1,
            initial_size: 2.0,
            size,
            sensor_size: 10.0,
            max_age: 70.0,
            reproduction_time_threshold: 21.0,
            limits: KinematicLimits::default(),
            paralyzed: false,
        }
    }

    #[test]
    fn summary_averages_per_kind() {
        let records = vec![
            record(CreatureKind::Herbivore, 100.0, 2.0),
            record(CreatureKind::Herbivore, 50.0, 4.0),
            record(CreatureKind::Predator, 80.0, 3.0),
        ];
        let summary = PopulationSummary::from_records(&records);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.count(CreatureKind::Plant), 0);
        let herbivores = summary.by_kind[&CreatureKind::Herbivore];
        assert_eq!(herbivores.count, 2);
        assert_eq!(herbivores.avg_energy, 75.0);
        assert_eq!(herbivores.avg_size, 3.0);
        assert_eq!(summary.log_line(), "total=3 plants=0 herbivores=2 predators=1");
    }

    #[test]
    fn snapshot_serializes_type_tags() {
        let snapshot = StatisticsSnapshot {
            tick: 15,
            sim_time: 0.5,
            creatures: vec![record(CreatureKind::Predator, 80.0, 3.0)],
        };
        let json = serde_json::to_value(&snapshot).expect("serializable");
        assert_eq!(json["creatures"][0]["type_tag"], 2);
        assert_eq!(json["creatures"][0]["kind"], "Predator");
    }
}
