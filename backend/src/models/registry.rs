//! Farm Registry
//!
//! Owns every farm of a simulation and answers status queries.
//!
//! # Critical Invariants
//!
//! 1. **Fixed population**: farms are registered once at construction;
//!    ids are unique and never added or removed afterwards
//! 2. **Deterministic order**: iteration is always by ascending farm id,
//!    so everything derived from the registry (kernel order, candidate
//!    sets, snapshots) is reproducible

use crate::models::farm::{DiseaseState, Farm, FarmId};
use crate::spatial;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-status farm counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub susceptible: usize,
    pub suspected: usize,
    pub confirmed: usize,
    pub culled: usize,
    pub vaccinated: usize,
}

impl StatusCounts {
    pub fn get(&self, status: DiseaseState) -> usize {
        match status {
            DiseaseState::Susceptible => self.susceptible,
            DiseaseState::Suspected => self.suspected,
            DiseaseState::Confirmed => self.confirmed,
            DiseaseState::Culled => self.culled,
            DiseaseState::Vaccinated => self.vaccinated,
        }
    }

    fn bump(&mut self, status: DiseaseState) {
        match status {
            DiseaseState::Susceptible => self.susceptible += 1,
            DiseaseState::Suspected => self.suspected += 1,
            DiseaseState::Confirmed => self.confirmed += 1,
            DiseaseState::Culled => self.culled += 1,
            DiseaseState::Vaccinated => self.vaccinated += 1,
        }
    }

    pub fn infectious(&self) -> usize {
        self.suspected + self.confirmed
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.suspected + self.confirmed + self.culled + self.vaccinated
    }
}

/// All farms of one simulation, indexed by id
///
/// # Example
///
/// ```rust
/// use outbreak_simulator_core_rs::{DiseaseState, Farm, FarmId, FarmRegistry};
///
/// let registry = FarmRegistry::new(vec![
///     Farm::new(FarmId(1), 0.0, 0.0, 100, 1),
///     Farm::new(FarmId(2), 3.0, 4.0, 80, 1),
/// ]);
/// assert_eq!(registry.num_farms(), 2);
/// assert_eq!(registry.count(DiseaseState::Susceptible), 2);
/// assert_eq!(registry.farms_within(FarmId(1), 5.0).unwrap(), vec![FarmId(1), FarmId(2)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FarmRegistry {
    farms: BTreeMap<FarmId, Farm>,
}

impl FarmRegistry {
    /// Build a registry; a later farm with a duplicate id replaces the earlier one
    /// (configuration validation rejects duplicates before this point)
    pub fn new(farms: Vec<Farm>) -> Self {
        let farms = farms.into_iter().map(|farm| (farm.id(), farm)).collect();
        Self { farms }
    }

    pub fn get(&self, id: FarmId) -> Option<&Farm> {
        self.farms.get(&id)
    }

    pub fn get_mut(&mut self, id: FarmId) -> Option<&mut Farm> {
        self.farms.get_mut(&id)
    }

    pub fn contains(&self, id: FarmId) -> bool {
        self.farms.contains_key(&id)
    }

    /// Farms in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Farm> {
        self.farms.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = FarmId> + '_ {
        self.farms.keys().copied()
    }

    pub fn num_farms(&self) -> usize {
        self.farms.len()
    }

    pub fn count(&self, status: DiseaseState) -> usize {
        self.farms.values().filter(|f| f.status() == status).count()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for farm in self.farms.values() {
            counts.bump(farm.status());
        }
        counts
    }

    pub fn with_status(&self, status: DiseaseState) -> Vec<FarmId> {
        self.select(|f| f.status() == status)
    }

    /// Suspected or confirmed farms
    pub fn infectious(&self) -> Vec<FarmId> {
        self.select(Farm::is_infectious)
    }

    pub fn susceptible(&self) -> Vec<FarmId> {
        self.select(Farm::is_susceptible)
    }

    pub fn has_infectious(&self) -> bool {
        self.farms.values().any(Farm::is_infectious)
    }

    /// Ids of farms matching `predicate`, ascending
    pub fn select<P>(&self, predicate: P) -> Vec<FarmId>
    where
        P: Fn(&Farm) -> bool,
    {
        self.farms
            .values()
            .filter(|&f| predicate(f))
            .map(Farm::id)
            .collect()
    }

    /// Every farm within `radius` of `center`, the center included
    ///
    /// Returns `None` if `center` is not registered.
    pub fn farms_within(&self, center: FarmId, radius: f64) -> Option<Vec<FarmId>> {
        let center = self.farms.get(&center)?;
        Some(spatial::farms_within(self.farms.values(), center, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FarmRegistry {
        let mut suspected = Farm::new(FarmId(2), 1.0, 0.0, 50, 1);
        suspected.mark_suspected(0, None).unwrap();
        let mut confirmed = Farm::new(FarmId(3), 2.0, 0.0, 50, 1);
        confirmed.mark_suspected(0, None).unwrap();
        confirmed.confirm().unwrap();
        FarmRegistry::new(vec![
            confirmed,
            Farm::new(FarmId(1), 0.0, 0.0, 50, 1),
            suspected,
            Farm::new(FarmId(4), 10.0, 0.0, 50, 1),
        ])
    }

    #[test]
    fn test_counts_cover_every_farm() {
        let registry = registry();
        let counts = registry.counts();
        assert_eq!(counts.susceptible, 2);
        assert_eq!(counts.suspected, 1);
        assert_eq!(counts.confirmed, 1);
        assert_eq!(counts.total(), registry.num_farms());
        assert_eq!(counts.get(DiseaseState::Confirmed), registry.count(DiseaseState::Confirmed));
    }

    #[test]
    fn test_queries_are_id_ordered() {
        let registry = registry();
        assert_eq!(registry.infectious(), vec![FarmId(2), FarmId(3)]);
        assert_eq!(registry.susceptible(), vec![FarmId(1), FarmId(4)]);
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec![FarmId(1), FarmId(2), FarmId(3), FarmId(4)]);
    }

    #[test]
    fn test_farms_within_unknown_center() {
        assert!(registry().farms_within(FarmId(99), 1.0).is_none());
    }

    #[test]
    fn test_farms_within_radius_is_inclusive() {
        let registry = registry();
        assert_eq!(
            registry.farms_within(FarmId(1), 2.0).unwrap(),
            vec![FarmId(1), FarmId(2), FarmId(3)]
        );
    }
}
