//! Event history for auditing a run.
//!
//! Every observable change a day-step makes is appended to the
//! [`EventHistory`] in the order it happened. The history is an audit trail
//! for front ends and tests; it is not needed to resume a run and is not part
//! of a checkpoint.
//!
//! # Example
//!
//! ```rust
//! use outbreak_simulator_core_rs::models::{EventHistory, HistoryEvent};
//! use outbreak_simulator_core_rs::FarmId;
//!
//! let mut history = EventHistory::new();
//! history.log(HistoryEvent::Infection {
//!     day: 2,
//!     time: 2.31,
//!     source: FarmId(1),
//!     target: FarmId(9),
//! });
//! assert_eq!(history.events_on_day(2).len(), 1);
//! assert_eq!(history.events_for_farm(FarmId(9)).len(), 1);
//! ```

use crate::models::event::EventKind;
use crate::models::farm::FarmId;
use serde::Serialize;

/// A recorded state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    /// Stochastic infection fired at continuous time `time`
    Infection {
        day: usize,
        time: f64,
        source: FarmId,
        target: FarmId,
    },

    /// Scheduled test processed; `confirmed` is false when the farm had
    /// already left the suspected state
    TestPerformed {
        day: usize,
        farm: FarmId,
        confirmed: bool,
        cost: f64,
    },

    FarmCulled {
        day: usize,
        farm: FarmId,
        cost: f64,
    },

    FarmVaccinated {
        day: usize,
        farm: FarmId,
        cost: f64,
    },

    /// Farm placed under movement restriction; `lift_day` is `None` for an
    /// open-ended ban
    RestrictionImposed {
        day: usize,
        farm: FarmId,
        lift_day: Option<usize>,
    },

    RestrictionLifted {
        day: usize,
        farm: FarmId,
    },

    /// A schedule entry for a day that had already passed was dropped
    ScheduleEntryDiscarded {
        day: usize,
        scheduled_day: usize,
        farm: FarmId,
        kind: Option<EventKind>,
    },

    StrategyChanged {
        day: usize,
        strategy: String,
    },

    /// Standing charges plus per-day summary
    EndOfDay {
        day: usize,
        infections: usize,
        day_cost: f64,
    },
}

impl HistoryEvent {
    pub fn day(&self) -> usize {
        match self {
            HistoryEvent::Infection { day, .. }
            | HistoryEvent::TestPerformed { day, .. }
            | HistoryEvent::FarmCulled { day, .. }
            | HistoryEvent::FarmVaccinated { day, .. }
            | HistoryEvent::RestrictionImposed { day, .. }
            | HistoryEvent::RestrictionLifted { day, .. }
            | HistoryEvent::ScheduleEntryDiscarded { day, .. }
            | HistoryEvent::StrategyChanged { day, .. }
            | HistoryEvent::EndOfDay { day, .. } => *day,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            HistoryEvent::Infection { .. } => "Infection",
            HistoryEvent::TestPerformed { .. } => "TestPerformed",
            HistoryEvent::FarmCulled { .. } => "FarmCulled",
            HistoryEvent::FarmVaccinated { .. } => "FarmVaccinated",
            HistoryEvent::RestrictionImposed { .. } => "RestrictionImposed",
            HistoryEvent::RestrictionLifted { .. } => "RestrictionLifted",
            HistoryEvent::ScheduleEntryDiscarded { .. } => "ScheduleEntryDiscarded",
            HistoryEvent::StrategyChanged { .. } => "StrategyChanged",
            HistoryEvent::EndOfDay { .. } => "EndOfDay",
        }
    }

    /// Whether the event concerns `farm` (as actor or subject)
    pub fn involves(&self, farm: FarmId) -> bool {
        match self {
            HistoryEvent::Infection { source, target, .. } => *source == farm || *target == farm,
            HistoryEvent::TestPerformed { farm: f, .. }
            | HistoryEvent::FarmCulled { farm: f, .. }
            | HistoryEvent::FarmVaccinated { farm: f, .. }
            | HistoryEvent::RestrictionImposed { farm: f, .. }
            | HistoryEvent::RestrictionLifted { farm: f, .. }
            | HistoryEvent::ScheduleEntryDiscarded { farm: f, .. } => *f == farm,
            HistoryEvent::StrategyChanged { .. } | HistoryEvent::EndOfDay { .. } => false,
        }
    }
}

/// Append-only log of [`HistoryEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventHistory {
    events: Vec<HistoryEvent>,
}

impl EventHistory {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: HistoryEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn events_on_day(&self, day: usize) -> Vec<&HistoryEvent> {
        self.events.iter().filter(|e| e.day() == day).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&HistoryEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_farm(&self, farm: FarmId) -> Vec<&HistoryEvent> {
        self.events.iter().filter(|e| e.involves(farm)).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
