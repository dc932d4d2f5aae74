//! Simulation configuration: arena, statistics cadence, tuning and the
//! per-variant cohorts spawned at start-up.

use crate::organisms::{CreatureConfiguration, CreatureKind, EcosystemTuning};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Rejected creation or simulation parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be non-negative and finite, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("creature position must be finite")]
    NonFinitePosition,
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Failures of the host around the engine.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read or write simulation data: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed simulation data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Values of the spawn form for one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortSettings {
    pub count: usize,
    pub size: f32,
    pub growth_rate: f32,
    pub mutation_rate: f32,
    pub max_age: f32,
    pub energy: f32,
}

impl Default for CohortSettings {
    fn default() -> Self {
        Self {
            count: 30,
            size: 2.0,
            growth_rate: 1.0001,
            mutation_rate: 0.2,
            max_age: 70.0,
            energy: 500.0,
        }
    }
}

impl CohortSettings {
    /// Creation parameters for one member; the sensor radius is derived from size.
    pub fn configuration(
        &self,
        kind: CreatureKind,
        tuning: &EcosystemTuning,
        position: Vec3,
    ) -> CreatureConfiguration {
        CreatureConfiguration {
            growth_rate: self.growth_rate,
            max_age: self.max_age,
            size: self.size,
            sensor_size: tuning.sensor_size(kind, self.size),
            energy: self.energy,
            mutation_rate: self.mutation_rate,
            position,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: f32,
    pub height: f32,
    pub ceiling: bool,
    /// Simulated time between two statistics snapshots
    pub statistics_interval: f32,
    pub rng_seed: Option<u64>,
    /// Ticks the headless host runs before exiting
    pub ticks: u64,
    pub tuning: EcosystemTuning,
    pub plants: CohortSettings,
    pub herbivores: CohortSettings,
    pub predators: CohortSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 200.0,
            ceiling: false,
            statistics_interval: 0.5,
            rng_seed: None,
            ticks: 3000,
            tuning: EcosystemTuning::default(),
            plants: CohortSettings::default(),
            herbivores: CohortSettings::default(),
            predators: CohortSettings::default(),
        }
    }
}

impl SimulationConfig {
    pub fn cohort(&self, kind: CreatureKind) -> &CohortSettings {
        match kind {
            CreatureKind::Plant => &self.plants,
            CreatureKind::Herbivore => &self.herbivores,
            CreatureKind::Predator => &self.predators,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "width",
                value: self.width,
            });
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "height",
                value: self.height,
            });
        }
        if !(self.statistics_interval.is_finite() && self.statistics_interval > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "statistics_interval",
                value: self.statistics_interval,
            });
        }
        let chances = [
            self.tuning.plant_seed_chance,
            self.tuning.explore_turn_chance,
            self.tuning.explore_go_chance,
        ];
        if chances.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(ConfigError::Invalid("probabilities must lie in [0, 1]"));
        }

        for kind in CreatureKind::ALL {
            self.cohort(kind)
                .configuration(kind, &self.tuning, Vec3::ZERO)
                .validate()?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
