//! Outbreak Simulator Core - Rust Engine
//!
//! Stochastic simulation of an infectious disease spreading between
//! livestock farms, with culling, vaccination and movement-restriction
//! control strategies and cost accounting.
//!
//! # Architecture
//!
//! - **core**: Day/continuous clock
//! - **models**: Domain types (Farm, FarmRegistry, Event, EventHistory)
//! - **kernel**: Spatial transmission kernel (pairwise propensities)
//! - **engine**: Gillespie direct-method sampler
//! - **events**: Deferred confirmation tests and restriction lifts
//! - **control**: Control strategies
//! - **costs**: Cost rates and per-day breakdowns
//! - **stats**: Daily statistics and the infection tree
//! - **orchestrator**: Main simulation loop, checkpoints, background worker
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG)
//! 2. Farm state only moves along allowed transitions
//! 3. The continuous clock never crosses the end of the current day

// Module declarations
pub mod config;
pub mod control;
pub mod core;
pub mod costs;
pub mod engine;
pub mod error;
pub mod events;
pub mod kernel;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod spatial;
pub mod stats;

// Re-exports for convenience
pub use config::{FarmConfig, Parameters, SimulationConfig};
pub use control::{ControlStrategy, StrategyDescriptor};
pub use core::time::TimeManager;
pub use costs::{CostBreakdown, CostRates};
pub use error::SimulationError;
pub use models::{
    event::{Event, EventKind},
    farm::{DiseaseState, Farm, FarmError, FarmId},
    history::{EventHistory, HistoryEvent},
    registry::{FarmRegistry, StatusCounts},
};
pub use orchestrator::{
    DayResult, Orchestrator, RunMode, RunSummary, SimulationWorker, StateSnapshot, WorkerReport,
};
pub use rng::RngManager;
pub use stats::{DailyRecord, Statistics};
