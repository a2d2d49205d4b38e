//! Mutable views handed to a control strategy, and the shared actions
//! (cull, vaccinate, restrict) every strategy is built from.

use crate::costs::{CostBreakdown, CostRates};
use crate::error::SimulationError;
use crate::events::{day_after, DailySchedule};
use crate::models::farm::{DiseaseState, FarmId};
use crate::models::history::{EventHistory, HistoryEvent};
use crate::models::registry::FarmRegistry;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Which farms set off an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    #[default]
    Never,
    /// SUSPECTED or CONFIRMED farms
    OnSuspicion,
    /// CONFIRMED farms only
    OnConfirmation,
}

impl Trigger {
    pub fn selects(self, status: DiseaseState) -> bool {
        match self {
            Trigger::Never => false,
            Trigger::OnSuspicion => status.is_infectious(),
            Trigger::OnConfirmation => status == DiseaseState::Confirmed,
        }
    }

    /// Numeric mode used by the combined descriptor: 0 never, 1 on
    /// suspicion, 2 on confirmation
    pub fn from_code(code: u64) -> Result<Self, SimulationError> {
        match code {
            0 => Ok(Trigger::Never),
            1 => Ok(Trigger::OnSuspicion),
            2 => Ok(Trigger::OnConfirmation),
            other => Err(SimulationError::config(format!(
                "trigger mode must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }
}

/// Farms a strategy acted on during one application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlOutcome {
    pub culled: Vec<FarmId>,
    pub vaccinated: Vec<FarmId>,
    pub restricted: Vec<FarmId>,
}

impl ControlOutcome {
    pub fn is_empty(&self) -> bool {
        self.culled.is_empty() && self.vaccinated.is_empty() && self.restricted.is_empty()
    }
}

/// Everything a strategy may touch during one day-step
pub struct ControlContext<'a> {
    pub day: usize,
    pub registry: &'a mut FarmRegistry,
    pub restricted: &'a mut BTreeSet<FarmId>,
    /// Only used to schedule restriction lifts
    pub schedule: &'a mut DailySchedule,
    pub costs: &'a mut CostBreakdown,
    pub rates: &'a CostRates,
    pub history: &'a mut EventHistory,
}

impl ControlContext<'_> {
    /// Farms currently selected by `trigger`
    pub fn triggered(&self, trigger: Trigger) -> Vec<FarmId> {
        self.registry.select(|f| trigger.selects(f.status()))
    }

    /// Union of the farms within `radius` of each center
    pub fn ring_around(&self, centers: &[FarmId], radius: f64) -> Result<BTreeSet<FarmId>, SimulationError> {
        let mut ring = BTreeSet::new();
        for &center in centers {
            let within = self
                .registry
                .farms_within(center, radius)
                .ok_or_else(|| SimulationError::config(format!("strategy references unknown farm {}", center)))?;
            ring.extend(within);
        }
        Ok(ring)
    }

    pub fn require_farm(&self, id: FarmId) -> Result<(), SimulationError> {
        if self.registry.contains(id) {
            Ok(())
        } else {
            Err(SimulationError::config(format!("strategy references unknown farm {}", id)))
        }
    }

    /// Cull every non-terminal farm in `candidates`
    pub fn cull(&mut self, candidates: &BTreeSet<FarmId>) -> Result<Vec<FarmId>, SimulationError> {
        let mut culled = Vec::new();
        for &id in candidates {
            let farm = self.registry.get_mut(id).ok_or(SimulationError::FarmNotFound(id))?;
            if farm.is_terminal() {
                continue;
            }
            let cost = self.rates.cull_cost(farm.herd_size());
            farm.cull(self.day)?;
            self.costs.culling += cost;
            self.history.log(HistoryEvent::FarmCulled {
                day: self.day,
                farm: id,
                cost,
            });
            culled.push(id);
        }
        if !culled.is_empty() {
            debug!(day = self.day, count = culled.len(), "culled farms");
        }
        Ok(culled)
    }

    /// Vaccinate every farm in `candidates` that passes `eligible`;
    /// terminal farms are always skipped
    pub fn vaccinate<P>(&mut self, candidates: &BTreeSet<FarmId>, eligible: P) -> Result<Vec<FarmId>, SimulationError>
    where
        P: Fn(DiseaseState) -> bool,
    {
        let mut vaccinated = Vec::new();
        for &id in candidates {
            let farm = self.registry.get_mut(id).ok_or(SimulationError::FarmNotFound(id))?;
            if farm.is_terminal() || !eligible(farm.status()) {
                continue;
            }
            let cost = self.rates.vaccination_cost(farm.herd_size());
            farm.vaccinate(self.day)?;
            self.costs.vaccination += cost;
            self.history.log(HistoryEvent::FarmVaccinated {
                day: self.day,
                farm: id,
                cost,
            });
            vaccinated.push(id);
        }
        if !vaccinated.is_empty() {
            debug!(day = self.day, count = vaccinated.len(), "vaccinated farms");
        }
        Ok(vaccinated)
    }

    /// Place every not-yet-restricted farm in `candidates` under movement
    /// restriction, lifting after `days` when given
    ///
    /// The daily standing charge is booked by the day-step, not here. A
    /// lift day that cannot be represented fails before any farm is touched.
    pub fn restrict(
        &mut self,
        candidates: &BTreeSet<FarmId>,
        days: Option<usize>,
    ) -> Result<Vec<FarmId>, SimulationError> {
        let lift_day = days.map(|n| day_after(self.day, n)).transpose()?;
        let mut restricted = Vec::new();
        for &id in candidates {
            if !self.restricted.insert(id) {
                continue;
            }
            if let Some(lift) = lift_day {
                if let Err(err) = self.schedule.schedule_lift(lift, id) {
                    warn!(farm = %id, error = %err, "restriction lift could not be scheduled");
                }
            }
            self.history.log(HistoryEvent::RestrictionImposed {
                day: self.day,
                farm: id,
                lift_day,
            });
            restricted.push(id);
        }
        if !restricted.is_empty() {
            debug!(day = self.day, count = restricted.len(), ?lift_day, "movement restrictions imposed");
        }
        Ok(restricted)
    }
}
