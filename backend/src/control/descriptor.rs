//! Strategy descriptors
//!
//! Front ends describe a strategy as a name plus loose parameters:
//!
//! ```json
//! {"strategy": "Movement_restriction",
//!  "parameters": [{"farmId": 4, "radius": 2.0, "days": 14}]}
//! ```
//!
//! Names that are not recognised resolve to [`ControlStrategy::NoControl`]
//! with a warning, so a typo disables control rather than failing the run.
//! Malformed parameters for a recognised name are a configuration error.

use super::{ControlStrategy, RestrictionSpec, RingSpec, Trigger};
use crate::error::SimulationError;
use crate::events::MAX_LEAD_DAYS;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

pub const NO_STRATEGY: &str = "No_strategy";
pub const CULL_ON_SUSPICION: &str = "Cull_on_suspicion";
pub const CULL_ON_CONFIRMATION: &str = "Cull_on_confirmation";
pub const CULL_ON_SUSPICION_WITH_RING: &str = "Cull_on_suspicion_with_ring";
pub const CULL_ON_CONFIRMATION_WITH_RING: &str = "Cull_on_confirmation_with_ring";
pub const VACCINATE_ON_SUSPICION: &str = "Vaccinate_on_suspicion";
pub const VACCINATE_ON_CONFIRMATION: &str = "Vaccinate_on_confirmation";
pub const RING_VACCINATION: &str = "Ring_vaccination";
pub const MOVEMENT_RESTRICTION: &str = "Movement_restriction";
pub const GLOBAL_MOVEMENT_RESTRICTION: &str = "Global_movement_restriction";
pub const COMBINED: &str = "Combined";
/// Older name of [`COMBINED`], still accepted
pub const COMBINED_LEGACY: &str = "Cull_and_vaccinate_and_movement_restrict";

/// Radius used when a ring strategy omits one
pub const DEFAULT_RADIUS: f64 = 1.0;

/// A strategy name with its raw parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrategyDescriptor {
    /// Missing name means no control
    #[serde(default)]
    pub strategy: Option<String>,

    #[serde(flatten)]
    pub params: serde_json::Map<String, Value>,
}

impl StrategyDescriptor {
    pub fn new(strategy: &str, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            strategy: Some(strategy.to_string()),
            params,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::config(format!("invalid strategy descriptor: {}", e)))
    }

    /// Turn the descriptor into a strategy
    pub fn resolve(&self) -> Result<ControlStrategy, SimulationError> {
        let Some(name) = self.strategy.as_deref() else {
            return Ok(ControlStrategy::NoControl);
        };

        let strategy = match name {
            NO_STRATEGY => ControlStrategy::NoControl,
            CULL_ON_SUSPICION => ControlStrategy::CullOnSuspicion,
            CULL_ON_CONFIRMATION => ControlStrategy::CullOnConfirmation,
            CULL_ON_SUSPICION_WITH_RING => ControlStrategy::CullOnSuspicionWithRing {
                radius: self.number("radius")?.unwrap_or(DEFAULT_RADIUS),
            },
            CULL_ON_CONFIRMATION_WITH_RING => ControlStrategy::CullOnConfirmationWithRing {
                radius: self.number("radius")?.unwrap_or(DEFAULT_RADIUS),
            },
            VACCINATE_ON_SUSPICION => ControlStrategy::VaccinateOnSuspicion {
                radius: self.number("radius")?.unwrap_or(DEFAULT_RADIUS),
            },
            VACCINATE_ON_CONFIRMATION => ControlStrategy::VaccinateOnConfirmation {
                radius: self.number("radius")?.unwrap_or(DEFAULT_RADIUS),
            },
            RING_VACCINATION => ControlStrategy::RingVaccination {
                rings: self.list("parameters")?,
            },
            MOVEMENT_RESTRICTION => ControlStrategy::MovementRestriction {
                restrictions: self.list::<RestrictionSpec>("parameters")?,
                applied_on: None,
            },
            GLOBAL_MOVEMENT_RESTRICTION => ControlStrategy::GlobalMovementRestriction {
                days: self.count("days")?,
                applied_on: None,
            },
            COMBINED | COMBINED_LEGACY => ControlStrategy::Combined {
                movement: self.trigger("movement")?,
                movement_radius: self.number("movementRadius")?.unwrap_or(DEFAULT_RADIUS),
                movement_days: self.count("movementDays")?,
                vaccination: self.trigger("vaccination")?,
                vaccination_radius: self.number("vaccinationRadius")?.unwrap_or(DEFAULT_RADIUS),
                culling: self.trigger("culling")?,
            },
            unknown => {
                warn!(strategy = unknown, "unknown control strategy, falling back to no control");
                ControlStrategy::NoControl
            }
        };
        // farm references are checked when the strategy is installed
        strategy.validate(|_| true)?;
        Ok(strategy)
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|v| !v.is_null())
    }

    fn malformed(&self, key: &str, expected: &str) -> SimulationError {
        SimulationError::config(format!(
            "{}: parameter '{}' must be {}",
            self.strategy.as_deref().unwrap_or(NO_STRATEGY),
            key,
            expected
        ))
    }

    fn number(&self, key: &str) -> Result<Option<f64>, SimulationError> {
        match self.field(key) {
            None => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| self.malformed(key, "a number")),
        }
    }

    fn count(&self, key: &str) -> Result<Option<usize>, SimulationError> {
        match self.field(key) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .filter(|&n| n <= MAX_LEAD_DAYS)
                .map(Some)
                .ok_or_else(|| {
                    self.malformed(key, &format!("an integer between 0 and {}", MAX_LEAD_DAYS))
                }),
        }
    }

    fn trigger(&self, key: &str) -> Result<Trigger, SimulationError> {
        match self.field(key) {
            None => Ok(Trigger::Never),
            Some(v) => {
                let code = v
                    .as_u64()
                    .ok_or_else(|| self.malformed(key, "0, 1 or 2"))?;
                Trigger::from_code(code)
            }
        }
    }

    fn list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, SimulationError> {
        match self.field(key) {
            None => Ok(Vec::new()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| SimulationError::config(format!("{}: bad '{}': {}", self.strategy.as_deref().unwrap_or(NO_STRATEGY), key, e))),
        }
    }
}
