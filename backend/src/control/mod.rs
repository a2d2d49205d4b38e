//! Control Strategy Module
//!
//! Once per day-step the active [`ControlStrategy`] looks at the farm
//! population and culls, vaccinates or restricts farms, booking the cost of
//! each action.
//!
//! # Overview
//!
//! Strategies are a closed set of variants dispatched by
//! [`ControlStrategy::apply`]. Every action follows the same recipe:
//!
//! 1. select candidates by status ([`Trigger`]) and optionally a radius
//! 2. drop farms whose state makes the action meaningless (terminal farms)
//! 3. change status and day-stamp
//! 4. book the cost
//!
//! Strategies can be swapped at any day boundary. The two movement
//! restriction variants applied from an explicit list remember the day they
//! fired and do not re-impose their bans.
//!
//! # Example
//!
//! ```rust
//! use outbreak_simulator_core_rs::control::ControlStrategy;
//!
//! let strategy = ControlStrategy::from_descriptor_json(
//!     r#"{"strategy": "Cull_on_confirmation_with_ring", "radius": 2.5}"#,
//! ).unwrap();
//! assert_eq!(strategy, ControlStrategy::CullOnConfirmationWithRing { radius: 2.5 });
//!
//! // unknown names fall back to doing nothing
//! let fallback = ControlStrategy::from_descriptor_json(r#"{"strategy": "Cull_evrything"}"#).unwrap();
//! assert_eq!(fallback, ControlStrategy::NoControl);
//! ```

pub mod combined;
pub mod context;
pub mod cull;
pub mod descriptor;
pub mod movement;
pub mod vaccinate;

pub use context::{ControlContext, ControlOutcome, Trigger};
pub use descriptor::StrategyDescriptor;

use crate::error::SimulationError;
use crate::events::MAX_LEAD_DAYS;
use crate::models::farm::FarmId;
use serde::{Deserialize, Serialize};

/// Default ban length for explicit movement restrictions
pub const DEFAULT_RESTRICTION_DAYS: usize = 1000;

fn default_restriction_days() -> Option<usize> {
    Some(DEFAULT_RESTRICTION_DAYS)
}

/// Vaccinate everything within `radius` of `farm_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingSpec {
    pub farm_id: FarmId,
    pub radius: f64,
}

/// Restrict everything within `radius` of `farm_id` for `days` (open-ended
/// when `None`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionSpec {
    pub farm_id: FarmId,
    pub radius: f64,
    #[serde(default = "default_restriction_days")]
    pub days: Option<usize>,
}

/// The active outbreak control policy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlStrategy {
    /// Let the outbreak run
    #[default]
    NoControl,

    CullOnSuspicion,

    CullOnConfirmation,

    /// Cull suspected and confirmed farms and every farm within `radius` of them
    CullOnSuspicionWithRing { radius: f64 },

    CullOnConfirmationWithRing { radius: f64 },

    /// Vaccinate every live farm within `radius` of a suspected or confirmed farm
    VaccinateOnSuspicion { radius: f64 },

    VaccinateOnConfirmation { radius: f64 },

    /// Vaccinate around an explicit list of farms
    RingVaccination { rings: Vec<RingSpec> },

    /// Restrict movement around an explicit list of farms, once
    MovementRestriction {
        restrictions: Vec<RestrictionSpec>,
        #[serde(default)]
        applied_on: Option<usize>,
    },

    /// Restrict movement on every farm, once
    GlobalMovementRestriction {
        #[serde(default)]
        days: Option<usize>,
        #[serde(default)]
        applied_on: Option<usize>,
    },

    /// Movement restriction, then vaccination of susceptible farms, then culling
    Combined {
        movement: Trigger,
        movement_radius: f64,
        #[serde(default)]
        movement_days: Option<usize>,
        vaccination: Trigger,
        vaccination_radius: f64,
        culling: Trigger,
    },
}

impl ControlStrategy {
    /// Descriptor name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            ControlStrategy::NoControl => descriptor::NO_STRATEGY,
            ControlStrategy::CullOnSuspicion => descriptor::CULL_ON_SUSPICION,
            ControlStrategy::CullOnConfirmation => descriptor::CULL_ON_CONFIRMATION,
            ControlStrategy::CullOnSuspicionWithRing { .. } => descriptor::CULL_ON_SUSPICION_WITH_RING,
            ControlStrategy::CullOnConfirmationWithRing { .. } => descriptor::CULL_ON_CONFIRMATION_WITH_RING,
            ControlStrategy::VaccinateOnSuspicion { .. } => descriptor::VACCINATE_ON_SUSPICION,
            ControlStrategy::VaccinateOnConfirmation { .. } => descriptor::VACCINATE_ON_CONFIRMATION,
            ControlStrategy::RingVaccination { .. } => descriptor::RING_VACCINATION,
            ControlStrategy::MovementRestriction { .. } => descriptor::MOVEMENT_RESTRICTION,
            ControlStrategy::GlobalMovementRestriction { .. } => descriptor::GLOBAL_MOVEMENT_RESTRICTION,
            ControlStrategy::Combined { .. } => descriptor::COMBINED,
        }
    }

    /// Parse a `{"strategy": name, ...}` descriptor document
    pub fn from_descriptor_json(json: &str) -> Result<Self, SimulationError> {
        StrategyDescriptor::from_json(json)?.resolve()
    }

    /// Build the combined strategy from numeric trigger modes
    /// (0 never, 1 on suspicion, 2 on confirmation)
    pub fn combined_from_codes(
        culling: u64,
        vaccination: u64,
        vaccination_radius: f64,
        movement: u64,
        movement_radius: f64,
    ) -> Result<Self, SimulationError> {
        Ok(ControlStrategy::Combined {
            movement: Trigger::from_code(movement)?,
            movement_radius,
            movement_days: None,
            vaccination: Trigger::from_code(vaccination)?,
            vaccination_radius,
            culling: Trigger::from_code(culling)?,
        })
    }

    /// Check radii, restriction lengths and that every referenced farm exists
    pub fn validate<F>(&self, farm_exists: F) -> Result<(), SimulationError>
    where
        F: Fn(FarmId) -> bool,
    {
        let check_radius = |radius: f64| {
            if radius.is_finite() && radius >= 0.0 {
                Ok(())
            } else {
                Err(SimulationError::config(format!(
                    "{}: radius must be finite and >= 0, got {}",
                    self.name(),
                    radius
                )))
            }
        };
        let check_days = |days: Option<usize>| match days {
            Some(n) if n > MAX_LEAD_DAYS => Err(SimulationError::config(format!(
                "{}: restriction length must be <= {} days, got {}",
                self.name(),
                MAX_LEAD_DAYS,
                n
            ))),
            _ => Ok(()),
        };
        let check_farm = |id: FarmId| {
            if farm_exists(id) {
                Ok(())
            } else {
                Err(SimulationError::config(format!(
                    "{}: unknown farm {}",
                    self.name(),
                    id
                )))
            }
        };

        match self {
            ControlStrategy::NoControl
            | ControlStrategy::CullOnSuspicion
            | ControlStrategy::CullOnConfirmation => Ok(()),
            ControlStrategy::GlobalMovementRestriction { days, .. } => check_days(*days),
            ControlStrategy::CullOnSuspicionWithRing { radius }
            | ControlStrategy::CullOnConfirmationWithRing { radius }
            | ControlStrategy::VaccinateOnSuspicion { radius }
            | ControlStrategy::VaccinateOnConfirmation { radius } => check_radius(*radius),
            ControlStrategy::RingVaccination { rings } => rings.iter().try_for_each(|ring| {
                check_radius(ring.radius)?;
                check_farm(ring.farm_id)
            }),
            ControlStrategy::MovementRestriction { restrictions, .. } => {
                restrictions.iter().try_for_each(|r| {
                    check_radius(r.radius)?;
                    check_days(r.days)?;
                    check_farm(r.farm_id)
                })
            }
            ControlStrategy::Combined {
                movement_radius,
                movement_days,
                vaccination_radius,
                ..
            } => {
                check_radius(*movement_radius)?;
                check_days(*movement_days)?;
                check_radius(*vaccination_radius)
            }
        }
    }

    /// Run one day's worth of control
    pub fn apply(&mut self, ctx: &mut ControlContext<'_>) -> Result<ControlOutcome, SimulationError> {
        match self {
            ControlStrategy::NoControl => Ok(ControlOutcome::default()),
            ControlStrategy::CullOnSuspicion => cull::apply(ctx, Trigger::OnSuspicion, None),
            ControlStrategy::CullOnConfirmation => cull::apply(ctx, Trigger::OnConfirmation, None),
            ControlStrategy::CullOnSuspicionWithRing { radius } => {
                cull::apply(ctx, Trigger::OnSuspicion, Some(*radius))
            }
            ControlStrategy::CullOnConfirmationWithRing { radius } => {
                cull::apply(ctx, Trigger::OnConfirmation, Some(*radius))
            }
            ControlStrategy::VaccinateOnSuspicion { radius } => {
                vaccinate::apply_around_trigger(ctx, Trigger::OnSuspicion, *radius)
            }
            ControlStrategy::VaccinateOnConfirmation { radius } => {
                vaccinate::apply_around_trigger(ctx, Trigger::OnConfirmation, *radius)
            }
            ControlStrategy::RingVaccination { rings } => vaccinate::apply_rings(ctx, rings),
            ControlStrategy::MovementRestriction {
                restrictions,
                applied_on,
            } => movement::apply_local(ctx, restrictions, applied_on),
            ControlStrategy::GlobalMovementRestriction { days, applied_on } => {
                movement::apply_global(ctx, *days, applied_on)
            }
            ControlStrategy::Combined {
                movement,
                movement_radius,
                movement_days,
                vaccination,
                vaccination_radius,
                culling,
            } => combined::apply(
                ctx,
                combined::CombinedPlan {
                    movement: *movement,
                    movement_radius: *movement_radius,
                    movement_days: *movement_days,
                    vaccination: *vaccination,
                    vaccination_radius: *vaccination_radius,
                    culling: *culling,
                },
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::costs::{CostBreakdown, CostRates};
    use crate::events::DailySchedule;
    use crate::models::farm::Farm;
    use crate::models::history::EventHistory;
    use crate::models::registry::FarmRegistry;
    use std::collections::BTreeSet;

    /// Owned state a [`ControlContext`] can borrow from
    pub struct Harness {
        pub day: usize,
        pub registry: FarmRegistry,
        pub restricted: BTreeSet<FarmId>,
        pub schedule: DailySchedule,
        pub costs: CostBreakdown,
        pub rates: CostRates,
        pub history: EventHistory,
    }

    impl Harness {
        /// Farms on a line at x = 0, 1, 2, ... with herd size 10
        pub fn on_a_line(n: u32) -> Self {
            let farms = (1..=n)
                .map(|id| Farm::new(FarmId(id), f64::from(id - 1), 0.0, 10, 1))
                .collect();
            Self {
                day: 3,
                registry: FarmRegistry::new(farms),
                restricted: BTreeSet::new(),
                schedule: DailySchedule::new(),
                costs: CostBreakdown::default(),
                rates: CostRates {
                    farm_visit: 100.0,
                    test_per_animal: 1.0,
                    culling_per_animal: 20.0,
                    vaccinating_per_animal: 5.0,
                    movement_ban_per_day: 7.0,
                    infected_farm_per_day: 9.0,
                },
                history: EventHistory::new(),
            }
        }

        pub fn suspect(&mut self, id: u32) {
            self.registry
                .get_mut(FarmId(id))
                .unwrap()
                .mark_suspected(0, None)
                .unwrap();
        }

        pub fn confirm(&mut self, id: u32) {
            self.suspect(id);
            self.registry.get_mut(FarmId(id)).unwrap().confirm().unwrap();
        }

        pub fn status(&self, id: u32) -> crate::models::farm::DiseaseState {
            self.registry.get(FarmId(id)).unwrap().status()
        }

        pub fn apply(&mut self, strategy: &mut ControlStrategy) -> Result<ControlOutcome, SimulationError> {
            let mut ctx = ControlContext {
                day: self.day,
                registry: &mut self.registry,
                restricted: &mut self.restricted,
                schedule: &mut self.schedule,
                costs: &mut self.costs,
                rates: &self.rates,
                history: &mut self.history,
            };
            strategy.apply(&mut ctx)
        }
    }
}
