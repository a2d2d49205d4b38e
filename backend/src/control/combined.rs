//! Combined movement, vaccination and culling
//!
//! Runs movement restriction, then vaccination, then culling. Culling last
//! keeps the triggering farms in place while the rings around them are
//! worked out. Vaccination here only protects farms that are still
//! susceptible.

use super::{ControlContext, ControlOutcome, Trigger};
use crate::error::SimulationError;
use crate::models::farm::DiseaseState;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedPlan {
    pub movement: Trigger,
    pub movement_radius: f64,
    pub movement_days: Option<usize>,
    pub vaccination: Trigger,
    pub vaccination_radius: f64,
    pub culling: Trigger,
}

pub fn apply(ctx: &mut ControlContext<'_>, plan: CombinedPlan) -> Result<ControlOutcome, SimulationError> {
    let mut outcome = ControlOutcome::default();

    if plan.movement != Trigger::Never {
        let triggered = ctx.triggered(plan.movement);
        let zone = ctx.ring_around(&triggered, plan.movement_radius)?;
        outcome.restricted = ctx.restrict(&zone, plan.movement_days)?;
    }

    if plan.vaccination != Trigger::Never {
        let triggered = ctx.triggered(plan.vaccination);
        let ring = ctx.ring_around(&triggered, plan.vaccination_radius)?;
        outcome.vaccinated = ctx.vaccinate(&ring, |status| status == DiseaseState::Susceptible)?;
    }

    if plan.culling != Trigger::Never {
        let triggered: BTreeSet<_> = ctx.triggered(plan.culling).into_iter().collect();
        outcome.culled = ctx.cull(&triggered)?;
    }

    Ok(outcome)
}
