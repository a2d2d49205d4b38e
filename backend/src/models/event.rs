//! Outbreak events
//!
//! An [`Event`] is a directed `(source, target, kind)` triple. Infections are
//! sampled by the stochastic engine; tests are deterministic and sit in the
//! daily schedule until their day comes up.

use crate::models::farm::FarmId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Infection,
    Test,
}

/// A directed event between two farms
///
/// Ordering is by `(source, target, kind)`, which keeps schedule sets and
/// kernel entries in a reproducible order.
///
/// # Example
///
/// ```rust
/// use outbreak_simulator_core_rs::models::{Event, EventKind};
/// use outbreak_simulator_core_rs::FarmId;
///
/// let infection = Event::infection(FarmId(1), FarmId(2));
/// assert_eq!(infection.kind, EventKind::Infection);
///
/// // tests are self-directed: the suspected farm is both source and target
/// let test = Event::test(FarmId(2));
/// assert_eq!(test.source, test.target);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Event {
    pub source: FarmId,
    pub target: FarmId,
    pub kind: EventKind,
}

impl Event {
    pub fn infection(source: FarmId, target: FarmId) -> Self {
        Self {
            source,
            target,
            kind: EventKind::Infection,
        }
    }

    /// Confirmation test against a suspected farm
    pub fn test(farm: FarmId) -> Self {
        Self {
            source: farm,
            target: farm,
            kind: EventKind::Test,
        }
    }
}
