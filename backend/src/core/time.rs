//! Time management for the simulation
//!
//! Two clocks run side by side. The integer `day` is authoritative and only
//! the orchestrator advances it. The continuous clock `t` belongs to the
//! stochastic engine: it is reset to `day` at the start of each day-step and
//! moves forward by sampled waiting times, never past `day + 1`.

use serde::{Deserialize, Serialize};

/// Manages the simulation day and the continuous intra-day clock
///
/// # Example
/// ```
/// use outbreak_simulator_core_rs::TimeManager;
///
/// let mut time = TimeManager::new();
/// assert_eq!(time.current_day(), 0);
///
/// time.advance_time_to(0.4);
/// assert_eq!(time.current_time(), 0.4);
///
/// time.advance_day();
/// assert_eq!(time.current_day(), 1);
/// assert_eq!(time.current_time(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeManager {
    /// Whole days elapsed since the start of the outbreak
    day: usize,
    /// Continuous clock, always within `[day, day + 1]`
    time: f64,
}

impl TimeManager {
    pub fn new() -> Self {
        Self { day: 0, time: 0.0 }
    }

    /// Rebuild a clock from checkpointed values
    ///
    /// Returns `None` if `time` lies outside `[day, day + 1]`.
    pub fn from_parts(day: usize, time: f64) -> Option<Self> {
        let start = day as f64;
        if time.is_finite() && time >= start && time <= start + 1.0 {
            Some(Self { day, time })
        } else {
            None
        }
    }

    pub fn current_day(&self) -> usize {
        self.day
    }

    pub fn current_time(&self) -> f64 {
        self.time
    }

    /// Boundary of the current day (`day + 1`)
    pub fn day_end(&self) -> f64 {
        (self.day + 1) as f64
    }

    /// Put the continuous clock back at the start of the current day
    pub fn reset_to_day_start(&mut self) {
        self.time = self.day as f64;
    }

    /// Move the continuous clock forward to `t`
    ///
    /// The engine only calls this with `t` inside the current day.
    pub fn advance_time_to(&mut self, t: f64) {
        debug_assert!(t >= self.time, "clock moved backwards: {} -> {}", self.time, t);
        debug_assert!(t <= self.day_end(), "clock crossed day boundary: {}", t);
        self.time = t;
    }

    /// Advance to the next day; the continuous clock follows to its start
    pub fn advance_day(&mut self) {
        self.day += 1;
        self.time = self.day as f64;
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}
