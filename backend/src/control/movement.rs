//! Movement restriction strategies
//!
//! Both variants fire once: the first day they run they restrict their
//! farms, schedule the lifts and record the day in `applied_on`. Restricted
//! farms pay the daily standing charge until lifted.

use super::{ControlContext, ControlOutcome, RestrictionSpec};
use crate::error::SimulationError;
use std::collections::BTreeSet;
use tracing::info;

pub fn apply_local(
    ctx: &mut ControlContext<'_>,
    restrictions: &[RestrictionSpec],
    applied_on: &mut Option<usize>,
) -> Result<ControlOutcome, SimulationError> {
    if applied_on.is_some() {
        return Ok(ControlOutcome::default());
    }
    for r in restrictions {
        ctx.require_farm(r.farm_id)?;
    }

    let mut outcome = ControlOutcome::default();
    for r in restrictions {
        let zone = ctx.ring_around(&[r.farm_id], r.radius)?;
        outcome.restricted.extend(ctx.restrict(&zone, r.days)?);
    }
    *applied_on = Some(ctx.day);
    Ok(outcome)
}

pub fn apply_global(
    ctx: &mut ControlContext<'_>,
    days: Option<usize>,
    applied_on: &mut Option<usize>,
) -> Result<ControlOutcome, SimulationError> {
    if applied_on.is_some() {
        return Ok(ControlOutcome::default());
    }
    let everyone: BTreeSet<_> = ctx.registry.ids().collect();
    let restricted = ctx.restrict(&everyone, days)?;
    info!(day = ctx.day, farms = restricted.len(), ?days, "global movement restriction imposed");
    *applied_on = Some(ctx.day);
    Ok(ControlOutcome {
        restricted,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use crate::control::test_support::Harness;
    use crate::control::{ControlStrategy, RestrictionSpec};
    use crate::error::SimulationError;
    use crate::models::farm::FarmId;

    #[test]
    fn test_local_restriction_schedules_lift() {
        let mut h = Harness::on_a_line(5);
        let mut strategy = ControlStrategy::MovementRestriction {
            restrictions: vec![RestrictionSpec {
                farm_id: FarmId(2),
                radius: 1.0,
                days: Some(4),
            }],
            applied_on: None,
        };
        let outcome = h.apply(&mut strategy).unwrap();
        assert_eq!(outcome.restricted, vec![FarmId(1), FarmId(2), FarmId(3)]);
        assert_eq!(h.schedule.lifts_on(7), vec![FarmId(1), FarmId(2), FarmId(3)]);
        assert_eq!(h.costs.total(), 0.0, "bans are charged per day by the day-step");
        assert!(matches!(
            strategy,
            ControlStrategy::MovementRestriction {
                applied_on: Some(3),
                ..
            }
        ));

        h.day = 4;
        assert!(h.apply(&mut strategy).unwrap().is_empty(), "fires once");
    }

    #[test]
    fn test_open_ended_restriction_has_no_lift() {
        let mut h = Harness::on_a_line(2);
        let mut strategy = ControlStrategy::MovementRestriction {
            restrictions: vec![RestrictionSpec {
                farm_id: FarmId(1),
                radius: 0.0,
                days: None,
            }],
            applied_on: None,
        };
        h.apply(&mut strategy).unwrap();
        assert!(h.restricted.contains(&FarmId(1)));
        assert!(h.schedule.is_empty());
    }

    #[test]
    fn test_global_restriction_covers_every_farm() {
        let mut h = Harness::on_a_line(4);
        h.registry.get_mut(FarmId(4)).unwrap().cull(0).unwrap();
        let mut strategy = ControlStrategy::GlobalMovementRestriction {
            days: Some(2),
            applied_on: None,
        };
        let outcome = h.apply(&mut strategy).unwrap();
        assert_eq!(outcome.restricted.len(), 4);
        assert_eq!(h.schedule.pending_lifts(), 4);
        assert_eq!(h.schedule.next_scheduled_day(), Some(5));
    }

    #[test]
    fn test_already_restricted_farm_keeps_its_lift() {
        let mut h = Harness::on_a_line(2);
        h.restricted.insert(FarmId(1));
        let mut strategy = ControlStrategy::GlobalMovementRestriction {
            days: Some(2),
            applied_on: None,
        };
        let outcome = h.apply(&mut strategy).unwrap();
        assert_eq!(outcome.restricted, vec![FarmId(2)]);
        assert_eq!(h.schedule.lift_day_of(FarmId(1)), None);
    }

    #[test]
    fn test_unrepresentable_lift_day_fails_without_restricting() {
        let mut h = Harness::on_a_line(3);
        let mut strategy = ControlStrategy::GlobalMovementRestriction {
            days: Some(usize::MAX),
            applied_on: None,
        };
        assert!(matches!(
            h.apply(&mut strategy),
            Err(SimulationError::Scheduling { .. })
        ));
        assert!(h.restricted.is_empty());
        assert!(h.schedule.is_empty());
        assert!(h.history.is_empty());
    }
}
