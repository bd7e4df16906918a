//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest edge length whose cell count still fits in an `i32` index
pub const MAX_GRID_SIZE: i32 = 46_340;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Edge length of the square toroidal grid
    pub size: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { size: 50 }
    }
}

/// Predator parameters, inherited unchanged by offspring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredatorParams {
    /// Age period (in cycles) between two births
    pub spawn_cycle: u32,
    /// Cycles a predator survives without eating. Zero means it starves on its first turn.
    pub max_starving: u32,
}

impl Default for PredatorParams {
    fn default() -> Self {
        Self {
            spawn_cycle: 10,
            max_starving: 3,
        }
    }
}

/// Prey parameters, inherited unchanged by offspring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreyParams {
    /// Age period (in cycles) between two births
    pub spawn_cycle: u32,
}

impl Default for PreyParams {
    fn default() -> Self {
        Self { spawn_cycle: 4 }
    }
}

/// Number of agents seeded at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialCounts {
    pub predators: usize,
    pub prey: usize,
}

impl Default for InitialCounts {
    fn default() -> Self {
        Self {
            predators: 60,
            prey: 500,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of cycles `run` performs
    pub num_cycles: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Stop `run` early once either species has died out
    #[serde(default)]
    pub stop_on_extinction: bool,
    /// Cycles between two population log lines (0 disables them)
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
    pub world: WorldConfig,
    pub predator: PredatorParams,
    pub prey: PreyParams,
    pub initial: InitialCounts,
}

fn default_report_interval() -> u64 {
    100
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_cycles: 1_000,
            seed: 0,
            stop_on_extinction: true,
            report_interval: default_report_interval(),
            world: WorldConfig::default(),
            predator: PredatorParams::default(),
            prey: PreyParams::default(),
            initial: InitialCounts::default(),
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot start from
    pub fn validate(&self) -> Result<()> {
        if self.world.size <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid size must be positive, got {}",
                self.world.size
            )));
        }
        if self.world.size > MAX_GRID_SIZE {
            return Err(Error::InvalidConfig(format!(
                "grid size must be at most {}, got {}",
                MAX_GRID_SIZE, self.world.size
            )));
        }
        if self.predator.spawn_cycle == 0 {
            return Err(Error::InvalidConfig(
                "predator spawn_cycle must be at least 1".to_string(),
            ));
        }
        if self.prey.spawn_cycle == 0 {
            return Err(Error::InvalidConfig(
                "prey spawn_cycle must be at least 1".to_string(),
            ));
        }

        let cells = self.cell_count();
        let requested = self.initial.predators.saturating_add(self.initial.prey);
        if requested > cells {
            return Err(Error::InvalidConfig(format!(
                "{} initial agents do not fit on {} cells",
                requested, cells
            )));
        }

        Ok(())
    }

    /// Number of cells on the grid
    pub fn cell_count(&self) -> usize {
        let size = self.world.size.max(0) as usize;
        size * size
    }
}
