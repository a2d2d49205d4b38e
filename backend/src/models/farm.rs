//! Farm model
//!
//! A farm is the unit of infection. Its identity never changes; location,
//! herd size and radius may be edited, and its disease status only moves
//! forward:
//!
//! ```text
//! SUSCEPTIBLE -> SUSPECTED -> CONFIRMED
//!      \              \            \
//!       +--------------+------------+--> CULLED | VACCINATED (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Stable farm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FarmId(pub u32);

impl fmt::Display for FarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FarmId {
    fn from(id: u32) -> Self {
        FarmId(id)
    }
}

/// Disease status of a farm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiseaseState {
    Susceptible,
    Suspected,
    Confirmed,
    Culled,
    Vaccinated,
}

impl DiseaseState {
    /// All states in ledger order
    pub const ALL: [DiseaseState; 5] = [
        DiseaseState::Susceptible,
        DiseaseState::Suspected,
        DiseaseState::Confirmed,
        DiseaseState::Culled,
        DiseaseState::Vaccinated,
    ];

    /// Suspected and confirmed farms act as sources in the kernel
    pub fn is_infectious(self) -> bool {
        matches!(self, DiseaseState::Suspected | DiseaseState::Confirmed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DiseaseState::Culled | DiseaseState::Vaccinated)
    }

    /// Whether the monotone lifecycle permits moving from `self` to `next`
    pub fn can_transition_to(self, next: DiseaseState) -> bool {
        use DiseaseState::*;
        match (self, next) {
            (Susceptible, Suspected) | (Suspected, Confirmed) => true,
            (from, Culled | Vaccinated) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for DiseaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiseaseState::Susceptible => "SUSCEPTIBLE",
            DiseaseState::Suspected => "SUSPECTED",
            DiseaseState::Confirmed => "CONFIRMED",
            DiseaseState::Culled => "CULLED",
            DiseaseState::Vaccinated => "VACCINATED",
        };
        f.write_str(name)
    }
}

/// Errors raised by farm status changes
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FarmError {
    #[error("Farm {farm}: illegal status transition {from} -> {to}")]
    InvalidTransition {
        farm: FarmId,
        from: DiseaseState,
        to: DiseaseState,
    },
}

/// A livestock holding
///
/// Equality and hashing use the id only.
///
/// # Example
/// ```
/// use outbreak_simulator_core_rs::{DiseaseState, Farm, FarmId};
///
/// let mut farm = Farm::new(FarmId(7), 1.0, 2.0, 120, 1);
/// assert_eq!(farm.status(), DiseaseState::Susceptible);
///
/// farm.mark_suspected(3, Some(FarmId(2))).unwrap();
/// assert!(farm.is_infectious());
/// assert_eq!(farm.day_infected(), Some(3));
/// assert_eq!(farm.infection_source(), Some(FarmId(2)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farm {
    id: FarmId,
    x: f64,
    y: f64,
    herd_size: u32,
    radius: u32,
    status: DiseaseState,
    day_infected: Option<usize>,
    day_culled: Option<usize>,
    day_vaccinated: Option<usize>,
    infection_source: Option<FarmId>,
}

impl Farm {
    pub fn new(id: FarmId, x: f64, y: f64, herd_size: u32, radius: u32) -> Self {
        Self {
            id,
            x,
            y,
            herd_size,
            radius,
            status: DiseaseState::Susceptible,
            day_infected: None,
            day_culled: None,
            day_vaccinated: None,
            infection_source: None,
        }
    }

    pub fn id(&self) -> FarmId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn herd_size(&self) -> u32 {
        self.herd_size
    }

    /// Display radius of the holding (not used by the kernel)
    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn status(&self) -> DiseaseState {
        self.status
    }

    pub fn day_infected(&self) -> Option<usize> {
        self.day_infected
    }

    pub fn day_culled(&self) -> Option<usize> {
        self.day_culled
    }

    pub fn day_vaccinated(&self) -> Option<usize> {
        self.day_vaccinated
    }

    pub fn infection_source(&self) -> Option<FarmId> {
        self.infection_source
    }

    pub fn is_infectious(&self) -> bool {
        self.status.is_infectious()
    }

    pub fn is_susceptible(&self) -> bool {
        self.status == DiseaseState::Susceptible
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn set_location(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_herd_size(&mut self, herd_size: u32) {
        self.herd_size = herd_size;
    }

    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius;
    }

    fn transition(&mut self, to: DiseaseState) -> Result<(), FarmError> {
        if !self.status.can_transition_to(to) {
            return Err(FarmError::InvalidTransition {
                farm: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// SUSCEPTIBLE -> SUSPECTED. `source` is `None` for seed farms.
    pub fn mark_suspected(&mut self, day: usize, source: Option<FarmId>) -> Result<(), FarmError> {
        self.transition(DiseaseState::Suspected)?;
        self.day_infected = Some(day);
        self.infection_source = source;
        Ok(())
    }

    /// SUSPECTED -> CONFIRMED
    pub fn confirm(&mut self) -> Result<(), FarmError> {
        self.transition(DiseaseState::Confirmed)
    }

    pub fn cull(&mut self, day: usize) -> Result<(), FarmError> {
        self.transition(DiseaseState::Culled)?;
        self.day_culled = Some(day);
        Ok(())
    }

    pub fn vaccinate(&mut self, day: usize) -> Result<(), FarmError> {
        self.transition(DiseaseState::Vaccinated)?;
        self.day_vaccinated = Some(day);
        Ok(())
    }

    /// Rebuild a farm exactly as checkpointed, bypassing transition checks
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_snapshot(
        id: FarmId,
        x: f64,
        y: f64,
        herd_size: u32,
        radius: u32,
        status: DiseaseState,
        day_infected: Option<usize>,
        day_culled: Option<usize>,
        day_vaccinated: Option<usize>,
        infection_source: Option<FarmId>,
    ) -> Self {
        Self {
            id,
            x,
            y,
            herd_size,
            radius,
            status,
            day_infected,
            day_culled,
            day_vaccinated,
            infection_source,
        }
    }
}

impl PartialEq for Farm {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Farm {}

impl Hash for Farm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
