//! Deferred deterministic events
//!
//! Confirmation tests and movement-restriction lifts are not sampled; they
//! are queued against the day on which they must happen and consumed by the
//! day-step.

pub mod schedule;

pub use schedule::{day_after, DailySchedule, MAX_LEAD_DAYS};
