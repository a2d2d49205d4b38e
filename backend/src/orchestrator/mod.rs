//! Orchestrator - main simulation loop
//!
//! Owns the simulation state and drives the day-step. See `engine.rs` for
//! the loop itself, `checkpoint.rs` for save/restore and `worker.rs` for
//! running a simulation on a background thread.

pub mod checkpoint;
pub mod engine;
pub mod worker;

pub use engine::{DayResult, Orchestrator, RunMode, RunSummary};

pub use checkpoint::{FarmSnapshot, StateSnapshot};
pub use worker::{SimulationWorker, WorkerReport};
