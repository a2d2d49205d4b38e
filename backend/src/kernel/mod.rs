//! Transmission Kernel
//!
//! Pairwise infection propensities between every infectious source
//! (SUSPECTED or CONFIRMED) and every SUSCEPTIBLE target:
//!
//! ```text
//! propensity(i, j) = (1 + d(i, j) / offset)^(-power) * herd(i) * herd(j) * beta
//! ```
//!
//! `power` is the restricted kernel power when either farm is under movement
//! restriction. Zero propensities are left out, so every entry can fire.
//!
//! # Critical Invariants
//!
//! 1. Every stored propensity is finite and strictly positive
//! 2. The running total is finite
//! 3. Entries are in a reproducible order: a rebuild walks sources then
//!    targets by ascending id, a patch appends the new source's entries

use crate::config::Parameters;
use crate::error::SimulationError;
use crate::models::event::Event;
use crate::models::farm::{Farm, FarmId};
use crate::models::registry::FarmRegistry;
use crate::spatial;
use std::collections::BTreeSet;

/// Propensity of `source` infecting `target`
pub fn propensity(source: &Farm, target: &Farm, restricted: bool, params: &Parameters) -> f64 {
    let power = if restricted {
        params.restricted_kernel_power
    } else {
        params.kernel_power
    };
    let d = spatial::distance(source, target);
    (1.0 + d / params.kernel_offset).powf(-power)
        * f64::from(source.herd_size())
        * f64::from(target.herd_size())
        * params.beta
}

/// One firable infection and its rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelEntry {
    pub event: Event,
    pub propensity: f64,
}

/// Current set of possible infections
#[derive(Debug, Clone, Default)]
pub struct TransmissionKernel {
    entries: Vec<KernelEntry>,
    total: f64,
}

impl TransmissionKernel {
    /// Compute every propensity from scratch
    pub fn rebuild(
        registry: &FarmRegistry,
        restricted: &BTreeSet<FarmId>,
        params: &Parameters,
    ) -> Result<Self, SimulationError> {
        let sources: Vec<&Farm> = registry.iter().filter(|f| f.is_infectious()).collect();
        let targets: Vec<&Farm> = registry.iter().filter(|f| f.is_susceptible()).collect();

        let mut kernel = Self::default();
        for source in &sources {
            kernel.add_source(source, &targets, restricted, params)?;
        }
        kernel.recompute_total()?;
        Ok(kernel)
    }

    /// Update after `infected` turned SUSPECTED: it stops being a target and
    /// becomes a source against every remaining susceptible farm
    ///
    /// The registry must already show `infected` as SUSPECTED. The resulting
    /// propensities equal those of a full rebuild.
    pub fn patch_infection(
        &mut self,
        infected: FarmId,
        registry: &FarmRegistry,
        restricted: &BTreeSet<FarmId>,
        params: &Parameters,
    ) -> Result<(), SimulationError> {
        let source = registry
            .get(infected)
            .ok_or(SimulationError::FarmNotFound(infected))?;

        self.entries.retain(|e| e.event.target != infected);

        let targets: Vec<&Farm> = registry.iter().filter(|f| f.is_susceptible()).collect();
        self.add_source(source, &targets, restricted, params)?;
        self.recompute_total()
    }

    fn add_source(
        &mut self,
        source: &Farm,
        targets: &[&Farm],
        restricted: &BTreeSet<FarmId>,
        params: &Parameters,
    ) -> Result<(), SimulationError> {
        let source_restricted = restricted.contains(&source.id());
        for target in targets {
            let is_restricted = source_restricted || restricted.contains(&target.id());
            let p = propensity(source, target, is_restricted, params);
            if !p.is_finite() || p < 0.0 {
                return Err(SimulationError::EngineInvariant {
                    source_farm: source.id(),
                    target_farm: target.id(),
                    propensity: p,
                });
            }
            if p > 0.0 {
                self.entries.push(KernelEntry {
                    event: Event::infection(source.id(), target.id()),
                    propensity: p,
                });
            }
        }
        Ok(())
    }

    fn recompute_total(&mut self) -> Result<(), SimulationError> {
        let mut total = 0.0;
        for entry in &self.entries {
            total += entry.propensity;
            if !total.is_finite() {
                return Err(SimulationError::EngineInvariant {
                    source_farm: entry.event.source,
                    target_farm: entry.event.target,
                    propensity: total,
                });
            }
        }
        self.total = total;
        Ok(())
    }

    /// Sum of all propensities
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[KernelEntry] {
        &self.entries
    }

    pub fn propensity_of(&self, event: &Event) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.event == *event)
            .map(|e| e.propensity)
    }

    /// First entry whose cumulative propensity exceeds `draw`
    ///
    /// `draw` is expected in `[0, total)`; rounding at the top end falls back
    /// to the last entry.
    pub fn select(&self, draw: f64) -> Option<Event> {
        let mut cumulative = 0.0;
        for entry in &self.entries {
            cumulative += entry.propensity;
            if cumulative > draw {
                return Some(entry.event);
            }
        }
        self.entries.last().map(|e| e.event)
    }
}
