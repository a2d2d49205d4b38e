//! Simulation configuration
//!
//! A [`SimulationConfig`] fully determines a run: the farm population, the
//! seed farms, kernel and cost parameters, the RNG seed and the initial
//! control strategy. It is validated once, in [`SimulationConfig::validate`],
//! before any simulation state is built.
//!
//! The JSON shape follows the historical input files:
//!
//! ```json
//! {
//!   "parameters": { "beta": 0.0005, "kernelOffset": 1.0, "kernelPower": 2.0,
//!                   "restrictedKernelPower": 4.0, "suspectedTestDelay": 2,
//!                   "costOfFarmVisit": 100.0, "costOfCullingAnimal": 50.0 },
//!   "farms": [ { "id": 1, "x": 0.0, "y": 0.0, "herdSize": 120 } ],
//!   "seedFarms": [ { "id": 1 } ],
//!   "rngSeed": 42
//! }
//! ```

use crate::control::ControlStrategy;
use crate::costs::CostRates;
use crate::error::SimulationError;
use crate::events::MAX_LEAD_DAYS;
use crate::models::farm::{Farm, FarmId};
use crate::rng::RngManager;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Hard bound on the number of simulated days
pub const DEFAULT_MAX_DAYS: usize = 1000;

/// Herd size range used when a farm entry omits it
pub const MIN_HERD_SIZE: u32 = 50;
pub const MAX_HERD_SIZE: u32 = 150;

/// Simulation-wide constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// Transmission coefficient
    pub beta: f64,

    /// Distance scale of the kernel; must be positive
    pub kernel_offset: f64,

    pub kernel_power: f64,

    /// Kernel power used when either endpoint is under movement restriction
    pub restricted_kernel_power: f64,

    /// Days from suspicion to the confirmation test
    pub suspected_test_delay: usize,

    #[serde(flatten)]
    pub costs: CostRates,

    /// Optional planning horizon in days; runs stop here if it comes before
    /// the hard day bound
    #[serde(default)]
    pub end_time: Option<usize>,

    /// Where a front end writes run artifacts
    #[serde(default, alias = "directory")]
    pub output_directory: Option<String>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            beta: 0.0005,
            kernel_offset: 1.0,
            kernel_power: 2.0,
            restricted_kernel_power: 4.0,
            suspected_test_delay: 2,
            costs: CostRates::default(),
            end_time: None,
            output_directory: None,
        }
    }
}

/// One farm of the initial population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmConfig {
    pub id: FarmId,
    pub x: f64,
    pub y: f64,

    /// Drawn uniformly from [`MIN_HERD_SIZE`]..=[`MAX_HERD_SIZE`] with the
    /// run's RNG when absent
    #[serde(default)]
    pub herd_size: Option<u32>,

    #[serde(default = "default_farm_radius")]
    pub radius: u32,
}

fn default_farm_radius() -> u32 {
    1
}

impl FarmConfig {
    pub fn new(id: u32, x: f64, y: f64, herd_size: u32) -> Self {
        Self {
            id: FarmId(id),
            x,
            y,
            herd_size: Some(herd_size),
            radius: default_farm_radius(),
        }
    }
}

/// Complete description of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub parameters: Parameters,

    pub farms: Vec<FarmConfig>,

    /// Farms forced into SUSPECTED at day 0; accepts bare ids or `{"id": n}`
    #[serde(default, deserialize_with = "deserialize_seed_farms")]
    pub seed_farms: Vec<FarmId>,

    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,

    #[serde(default = "default_max_days")]
    pub max_days: usize,

    #[serde(default)]
    pub control_strategy: ControlStrategy,
}

fn default_rng_seed() -> u64 {
    1
}

fn default_max_days() -> usize {
    DEFAULT_MAX_DAYS
}

fn deserialize_seed_farms<'de, D>(deserializer: D) -> Result<Vec<FarmId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedRef {
        Id(FarmId),
        Farm { id: FarmId },
    }

    let refs = Vec::<SeedRef>::deserialize(deserializer)?;
    Ok(refs
        .into_iter()
        .map(|r| match r {
            SeedRef::Id(id) | SeedRef::Farm { id } => id,
        })
        .collect())
}

impl SimulationConfig {
    /// Parse a configuration document (not yet validated)
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::config(format!("invalid configuration document: {}", e)))
    }

    /// Check every parameter range and cross-reference
    pub fn validate(&self) -> Result<(), SimulationError> {
        let p = &self.parameters;

        check_non_negative("beta", p.beta)?;
        check_non_negative("kernel_power", p.kernel_power)?;
        check_non_negative("restricted_kernel_power", p.restricted_kernel_power)?;
        if !(p.kernel_offset.is_finite() && p.kernel_offset > 0.0) {
            return Err(SimulationError::config(format!(
                "kernel_offset must be finite and > 0, got {}",
                p.kernel_offset
            )));
        }
        for (name, value) in p.costs.entries() {
            check_non_negative(name, value)?;
        }
        if p.suspected_test_delay > MAX_LEAD_DAYS {
            return Err(SimulationError::config(format!(
                "suspected_test_delay must be <= {}, got {}",
                MAX_LEAD_DAYS, p.suspected_test_delay
            )));
        }
        if p.end_time == Some(0) {
            return Err(SimulationError::config("end_time must be > 0"));
        }
        if self.max_days == 0 {
            return Err(SimulationError::config("max_days must be > 0"));
        }

        if self.farms.is_empty() {
            return Err(SimulationError::config("must have at least one farm"));
        }
        let mut ids = HashSet::new();
        for farm in &self.farms {
            if !ids.insert(farm.id) {
                return Err(SimulationError::config(format!("duplicate farm id: {}", farm.id)));
            }
            if !(farm.x.is_finite() && farm.y.is_finite()) {
                return Err(SimulationError::config(format!(
                    "farm {} has a non-finite location ({}, {})",
                    farm.id, farm.x, farm.y
                )));
            }
        }

        let mut seeds = HashSet::new();
        for seed in &self.seed_farms {
            if !ids.contains(seed) {
                return Err(SimulationError::config(format!("seed farm {} does not exist", seed)));
            }
            if !seeds.insert(*seed) {
                return Err(SimulationError::config(format!("seed farm {} listed twice", seed)));
            }
        }

        self.control_strategy.validate(|id| ids.contains(&id))
    }

    /// Materialize the farm population, drawing missing herd sizes from `rng`
    pub(crate) fn build_farms(&self, rng: &mut RngManager) -> Vec<Farm> {
        self.farms
            .iter()
            .map(|fc| {
                let herd_size = match fc.herd_size {
                    Some(size) => size,
                    None => rng.range(i64::from(MIN_HERD_SIZE), i64::from(MAX_HERD_SIZE) + 1) as u32,
                };
                Farm::new(fc.id, fc.x, fc.y, herd_size, fc.radius)
            })
            .collect()
    }

    /// Copy used for config hashing; the output directory may change over
    /// the life of a run and is left out
    pub(crate) fn hashable(&self) -> SimulationConfig {
        let mut copy = self.clone();
        copy.parameters.output_directory = None;
        copy
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::config(format!(
            "{} must be finite and >= 0, got {}",
            name, value
        )))
    }
}
