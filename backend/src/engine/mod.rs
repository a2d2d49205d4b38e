//! Stochastic Event Engine
//!
//! Gillespie direct-method sampler over a [`TransmissionKernel`]. Each call
//! to [`StochasticEngine::next_event`] either fires one infection inside the
//! current day or reports that the day is exhausted:
//!
//! ```text
//! AwaitingEvent --(total = 0 or t + tau > day + 1)--> DayExhausted
//!       ^   |
//!       +---+ fire: t += tau, pick event on [0, total)
//! ```
//!
//! The caller applies the fired event and patches the kernel before asking
//! for the next one.

use crate::core::time::TimeManager;
use crate::kernel::TransmissionKernel;
use crate::models::event::Event;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    AwaitingEvent,
    DayExhausted,
}

/// A sampled infection and the time it fired
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredEvent {
    pub event: Event,
    pub time: f64,
    /// Total propensity the event was drawn against
    pub total_propensity: f64,
}

#[derive(Debug, Clone)]
pub struct StochasticEngine {
    state: EngineState,
}

impl StochasticEngine {
    pub fn new() -> Self {
        Self {
            state: EngineState::DayExhausted,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Rewind the continuous clock to the start of the day and re-arm
    pub fn begin_day(&mut self, clock: &mut TimeManager) {
        clock.reset_to_day_start();
        self.state = EngineState::AwaitingEvent;
    }

    /// Sample the next infection of the current day
    ///
    /// Returns `None` once the day is exhausted; the clock is never moved
    /// past the day boundary. Draw order per firing is waiting time first,
    /// then the selection draw.
    pub fn next_event(
        &mut self,
        kernel: &TransmissionKernel,
        clock: &mut TimeManager,
        rng: &mut RngManager,
    ) -> Option<FiredEvent> {
        if self.state == EngineState::DayExhausted {
            return None;
        }

        let total = kernel.total();
        if total <= 0.0 {
            self.state = EngineState::DayExhausted;
            return None;
        }

        let tau = rng.next_exponential(total);
        let t = clock.current_time() + tau;
        if t > clock.day_end() {
            self.state = EngineState::DayExhausted;
            return None;
        }
        clock.advance_time_to(t);

        let draw = rng.next_uniform(total);
        match kernel.select(draw) {
            Some(event) => Some(FiredEvent {
                event,
                time: t,
                total_propensity: total,
            }),
            None => {
                self.state = EngineState::DayExhausted;
                None
            }
        }
    }
}

impl Default for StochasticEngine {
    fn default() -> Self {
        Self::new()
    }
}
