//! Simulation error taxonomy

use crate::models::farm::{FarmError, FarmId};
use thiserror::Error;

/// Errors surfaced by the simulation core
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    /// Missing or out-of-range parameter, or a reference to an unknown farm.
    /// Raised before anything is built.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Farm not found: {0}")]
    FarmNotFound(FarmId),

    /// Negative or non-finite propensity; the day-step was abandoned
    #[error("Stochastic engine invariant violated: propensity {propensity} for {source_farm} -> {target_farm}")]
    EngineInvariant {
        source_farm: FarmId,
        target_farm: FarmId,
        propensity: f64,
    },

    /// The simulation hit an engine invariant earlier and refuses to continue
    #[error("Simulation is unusable: {0}")]
    SimulationUnusable(String),

    /// An entry was scheduled for a day whose queue has already been consumed
    #[error("Scheduling error: entry for day {scheduled_day} arrived on day {current_day}")]
    Scheduling {
        scheduled_day: usize,
        current_day: usize,
    },

    #[error(transparent)]
    InvalidTransition(#[from] FarmError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("State validation error: {0}")]
    StateValidation(String),

    #[error("Config mismatch: snapshot was taken with config {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },

    /// The background worker could not be started or died
    #[error("Worker error: {0}")]
    Worker(String),
}

impl SimulationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SimulationError::Configuration(message.into())
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        SimulationError::Serialization(err.to_string())
    }
}
