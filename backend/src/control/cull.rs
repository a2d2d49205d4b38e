//! Culling strategies
//!
//! Cull the triggered farms, or, with a ring radius, every farm within that
//! radius of a triggered farm (the triggered farm included).

use super::{ControlContext, ControlOutcome, Trigger};
use crate::error::SimulationError;
use std::collections::BTreeSet;

pub fn apply(
    ctx: &mut ControlContext<'_>,
    trigger: Trigger,
    ring_radius: Option<f64>,
) -> Result<ControlOutcome, SimulationError> {
    let triggered = ctx.triggered(trigger);
    let candidates: BTreeSet<_> = match ring_radius {
        Some(radius) => ctx.ring_around(&triggered, radius)?,
        None => triggered.into_iter().collect(),
    };
    Ok(ControlOutcome {
        culled: ctx.cull(&candidates)?,
        ..Default::default()
    })
}
