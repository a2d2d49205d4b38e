//! Checkpoint - Save/Load Simulation State
//!
//! Serializes the complete orchestrator state so a run can be paused and
//! resumed. Restoring a snapshot and stepping yields exactly the trajectory
//! the original would have produced.
//!
//! # Critical Invariants
//!
//! - **Determinism**: the RNG state travels with the snapshot
//! - **Referential Integrity**: every farm referenced by the schedule or the
//!   restriction set exists
//! - **Config Matching**: state can only be loaded with a matching config
//!
//! The event history is a diagnostic log and is not part of a snapshot.

use crate::config::SimulationConfig;
use crate::control::ControlStrategy;
use crate::core::time::TimeManager;
use crate::error::SimulationError;
use crate::events::DailySchedule;
use crate::models::farm::{DiseaseState, Farm, FarmId};
use crate::orchestrator::engine::Orchestrator;
use crate::rng::RngManager;
use crate::stats::Statistics;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete orchestrator state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub session_id: Uuid,

    pub current_day: usize,

    /// Continuous engine clock
    pub current_time: f64,

    /// xorshift state at time of snapshot (CRITICAL for determinism)
    pub rng_state: u64,

    pub farms: Vec<FarmSnapshot>,

    pub restricted_farms: Vec<FarmId>,

    pub schedule: DailySchedule,

    pub statistics: Statistics,

    /// Active strategy, including its once-only bookkeeping
    pub control_strategy: ControlStrategy,

    /// SHA256 hash of the config (output directory excluded)
    pub config_hash: String,
}

/// Farm state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSnapshot {
    pub id: FarmId,
    pub x: f64,
    pub y: f64,
    pub herd_size: u32,
    pub radius: u32,
    pub status: DiseaseState,
    pub day_infected: Option<usize>,
    pub day_culled: Option<usize>,
    pub day_vaccinated: Option<usize>,
    pub infection_source: Option<FarmId>,
}

impl From<&Farm> for FarmSnapshot {
    fn from(farm: &Farm) -> Self {
        FarmSnapshot {
            id: farm.id(),
            x: farm.x(),
            y: farm.y(),
            herd_size: farm.herd_size(),
            radius: farm.radius(),
            status: farm.status(),
            day_infected: farm.day_infected(),
            day_culled: farm.day_culled(),
            day_vaccinated: farm.day_vaccinated(),
            infection_source: farm.infection_source(),
        }
    }
}

impl From<FarmSnapshot> for Farm {
    fn from(snapshot: FarmSnapshot) -> Self {
        Farm::from_snapshot(
            snapshot.id,
            snapshot.x,
            snapshot.y,
            snapshot.herd_size,
            snapshot.radius,
            snapshot.status,
            snapshot.day_infected,
            snapshot.day_culled,
            snapshot.day_vaccinated,
            snapshot.infection_source,
        )
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Object keys are sorted before hashing so the result does not depend on
/// field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate snapshot integrity against the config it is being restored with
///
/// Checks:
/// - the farm population matches the config one-for-one
/// - restricted and scheduled farms exist
/// - the clock lies within the current day
pub fn validate_snapshot(
    snapshot: &StateSnapshot,
    config: &SimulationConfig,
) -> Result<(), SimulationError> {
    let mut ids = BTreeSet::new();
    for farm in &snapshot.farms {
        if !ids.insert(farm.id) {
            return Err(SimulationError::StateValidation(format!(
                "Duplicate farm {} in snapshot",
                farm.id
            )));
        }
    }

    let expected: BTreeSet<FarmId> = config.farms.iter().map(|f| f.id).collect();
    if ids != expected {
        return Err(SimulationError::StateValidation(format!(
            "Snapshot holds {} farms, config defines {} (or ids differ)",
            ids.len(),
            expected.len()
        )));
    }

    for farm in &snapshot.restricted_farms {
        if !ids.contains(farm) {
            return Err(SimulationError::StateValidation(format!(
                "Restricted farm {} does not exist",
                farm
            )));
        }
    }

    for farm in snapshot.schedule.referenced_farms() {
        if !ids.contains(&farm) {
            return Err(SimulationError::StateValidation(format!(
                "Schedule references unknown farm {}",
                farm
            )));
        }
    }

    let day_start = snapshot.current_day as f64;
    if !(snapshot.current_time >= day_start && snapshot.current_time <= day_start + 1.0) {
        return Err(SimulationError::StateValidation(format!(
            "Clock {} lies outside day {}",
            snapshot.current_time, snapshot.current_day
        )));
    }

    Ok(())
}

// ============================================================================
// Orchestrator save/restore
// ============================================================================

impl Orchestrator {
    /// Capture the complete simulation state
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            session_id: self.session_id(),
            current_day: self.current_day(),
            current_time: self.current_time(),
            rng_state: self.rng_state(),
            farms: self.farms().iter().map(FarmSnapshot::from).collect(),
            restricted_farms: self.restricted_farms().iter().copied().collect(),
            schedule: self.schedule().clone(),
            statistics: self.statistics().clone(),
            control_strategy: self.control_strategy().clone(),
            config_hash: self.config_hash().to_string(),
        }
    }

    /// Rebuild a simulation from a snapshot taken under `config`
    ///
    /// The restored simulation keeps the snapshot's session id and starts
    /// with an empty event history.
    pub fn from_snapshot(
        config: SimulationConfig,
        snapshot: StateSnapshot,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let actual = compute_config_hash(&config.hashable())?;
        if actual != snapshot.config_hash {
            return Err(SimulationError::ConfigMismatch {
                expected: snapshot.config_hash,
                actual,
            });
        }

        validate_snapshot(&snapshot, &config)?;

        let time_manager = TimeManager::from_parts(snapshot.current_day, snapshot.current_time)
            .ok_or_else(|| {
                SimulationError::StateValidation(format!(
                    "Invalid clock {} for day {}",
                    snapshot.current_time, snapshot.current_day
                ))
            })?;

        info!(
            session = %snapshot.session_id,
            day = snapshot.current_day,
            "simulation restored from snapshot"
        );

        Ok(Orchestrator::from_parts(
            config,
            actual,
            snapshot.session_id,
            snapshot.farms.into_iter().map(Farm::from).collect(),
            snapshot.restricted_farms.into_iter().collect(),
            time_manager,
            RngManager::from_state(snapshot.rng_state),
            snapshot.schedule,
            snapshot.control_strategy,
            snapshot.statistics,
        ))
    }

    /// Snapshot serialized as JSON
    pub fn save_state(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Restore from [`save_state`](Self::save_state) output
    pub fn load_state(config: SimulationConfig, json: &str) -> Result<Self, SimulationError> {
        let snapshot: StateSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(config, snapshot)
    }
}
