//! Vaccination strategies

use super::{ControlContext, ControlOutcome, RingSpec, Trigger};
use crate::error::SimulationError;
use crate::models::farm::FarmId;
use std::collections::BTreeSet;

/// Vaccinate every live farm within `radius` of a triggered farm
///
/// Triggered farms sit inside their own ring and are vaccinated too.
pub fn apply_around_trigger(
    ctx: &mut ControlContext<'_>,
    trigger: Trigger,
    radius: f64,
) -> Result<ControlOutcome, SimulationError> {
    let triggered = ctx.triggered(trigger);
    let candidates = ctx.ring_around(&triggered, radius)?;
    Ok(ControlOutcome {
        vaccinated: ctx.vaccinate(&candidates, |_| true)?,
        ..Default::default()
    })
}

/// Vaccinate every confirmed farm plus everything around each listed farm
pub fn apply_rings(ctx: &mut ControlContext<'_>, rings: &[RingSpec]) -> Result<ControlOutcome, SimulationError> {
    for ring in rings {
        ctx.require_farm(ring.farm_id)?;
    }

    let mut candidates: BTreeSet<FarmId> = ctx.triggered(Trigger::OnConfirmation).into_iter().collect();
    for ring in rings {
        candidates.extend(ctx.ring_around(&[ring.farm_id], ring.radius)?);
    }
    Ok(ControlOutcome {
        vaccinated: ctx.vaccinate(&candidates, |_| true)?,
        ..Default::default()
    })
}
