//! Day-indexed queues of tests and restriction lifts
//!
//! # Design Principles
//!
//! 1. **Consume once**: a day's tests (and separately its lifts) are taken
//!    out of the schedule exactly once; after that, scheduling into that day
//!    or any earlier one is a [`SimulationError::Scheduling`] error
//! 2. **Ordered**: entries for a day come out in ascending order, so
//!    processing order never depends on insertion order
//! 3. **Stale entries surface**: anything left for a day that has already
//!    passed (possible only with a hand-edited checkpoint) is handed back
//!    separately so the caller can log and drop it

use crate::error::SimulationError;
use crate::models::event::Event;
use crate::models::farm::FarmId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Furthest ahead of the current day an entry may be placed
pub const MAX_LEAD_DAYS: usize = 1_000_000;

/// Day `lead` days after `day`
///
/// Leads beyond [`MAX_LEAD_DAYS`] are refused with a
/// [`SimulationError::Scheduling`] error instead of wrapping around.
pub fn day_after(day: usize, lead: usize) -> Result<usize, SimulationError> {
    if lead > MAX_LEAD_DAYS {
        return Err(SimulationError::Scheduling {
            scheduled_day: usize::MAX,
            current_day: day,
        });
    }
    day.checked_add(lead).ok_or(SimulationError::Scheduling {
        scheduled_day: usize::MAX,
        current_day: day,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    tests: BTreeMap<usize, BTreeSet<Event>>,
    lifts: BTreeMap<usize, BTreeSet<FarmId>>,
    tests_consumed_through: Option<usize>,
    lifts_consumed_through: Option<usize>,
}

fn check_open(day: usize, consumed_through: Option<usize>) -> Result<(), SimulationError> {
    match consumed_through {
        Some(done) if day <= done => Err(SimulationError::Scheduling {
            scheduled_day: day,
            current_day: done,
        }),
        _ => Ok(()),
    }
}

impl DailySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a confirmation test for `day`
    pub fn schedule_test(&mut self, day: usize, event: Event) -> Result<(), SimulationError> {
        check_open(day, self.tests_consumed_through)?;
        self.tests.entry(day).or_default().insert(event);
        Ok(())
    }

    /// Queue the lift of `farm`'s movement restriction for `day`
    pub fn schedule_lift(&mut self, day: usize, farm: FarmId) -> Result<(), SimulationError> {
        check_open(day, self.lifts_consumed_through)?;
        self.lifts.entry(day).or_default().insert(farm);
        Ok(())
    }

    /// Remove and return the tests due on `day`
    pub fn take_tests(&mut self, day: usize) -> Vec<Event> {
        self.tests_consumed_through = Some(day);
        self.tests
            .remove(&day)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default()
    }

    /// Remove and return the lifts due on `day`
    pub fn take_lifts(&mut self, day: usize) -> Vec<FarmId> {
        self.lifts_consumed_through = Some(day);
        self.lifts
            .remove(&day)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default()
    }

    /// Remove and return tests left over for days before `day`
    pub fn take_stale_tests(&mut self, day: usize) -> Vec<(usize, Event)> {
        let current = self.tests.split_off(&day);
        let stale = std::mem::replace(&mut self.tests, current);
        stale
            .into_iter()
            .flat_map(|(d, set)| set.into_iter().map(move |e| (d, e)))
            .collect()
    }

    /// Remove and return lifts left over for days before `day`
    pub fn take_stale_lifts(&mut self, day: usize) -> Vec<(usize, FarmId)> {
        let current = self.lifts.split_off(&day);
        let stale = std::mem::replace(&mut self.lifts, current);
        stale
            .into_iter()
            .flat_map(|(d, set)| set.into_iter().map(move |f| (d, f)))
            .collect()
    }

    pub fn tests_on(&self, day: usize) -> Vec<Event> {
        self.tests
            .get(&day)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn lifts_on(&self, day: usize) -> Vec<FarmId> {
        self.lifts
            .get(&day)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Day on which `farm`'s restriction is scheduled to lift, if any
    pub fn lift_day_of(&self, farm: FarmId) -> Option<usize> {
        self.lifts
            .iter()
            .find(|(_, farms)| farms.contains(&farm))
            .map(|(day, _)| *day)
    }

    pub fn pending_tests(&self) -> usize {
        self.tests.values().map(BTreeSet::len).sum()
    }

    pub fn pending_lifts(&self) -> usize {
        self.lifts.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_tests() == 0 && self.pending_lifts() == 0
    }

    /// Earliest day with anything pending
    pub fn next_scheduled_day(&self) -> Option<usize> {
        let next_test = self.tests.keys().next().copied();
        let next_lift = self.lifts.keys().next().copied();
        match (next_test, next_lift) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Every farm id referenced by a pending entry
    pub(crate) fn referenced_farms(&self) -> impl Iterator<Item = FarmId> + '_ {
        self.tests
            .values()
            .flat_map(|set| set.iter().flat_map(|e| [e.source, e.target]))
            .chain(self.lifts.values().flat_map(|set| set.iter().copied()))
    }
}
