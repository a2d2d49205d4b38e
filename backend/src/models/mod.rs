//! Domain models for the outbreak simulator

pub mod event;
pub mod farm;
pub mod history;
pub mod registry;

// Re-exports
pub use event::{Event, EventKind};
pub use farm::{DiseaseState, Farm, FarmError, FarmId};
pub use history::{EventHistory, HistoryEvent};
pub use registry::{FarmRegistry, StatusCounts};
