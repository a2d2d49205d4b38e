//! Statistics and cost ledger
//!
//! One [`DailyRecord`] per completed day-step, plus the infection tree of
//! who-infected-whom. Both are append-only.

use crate::costs::CostBreakdown;
use crate::models::farm::FarmId;
use crate::models::registry::StatusCounts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Header line of [`Statistics::to_csv`]
pub const CSV_HEADER: &str =
    "day,susceptible,suspected,confirmed,culled,vaccinated,restricted,cost,cumulative_cost";

/// End-of-day measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub counts: StatusCounts,
    /// Farms under movement restriction at the end of the day
    pub restricted: usize,
    /// Infections fired during the day
    pub infections: usize,
    pub costs: CostBreakdown,
}

impl DailyRecord {
    /// Cost incurred on this day
    pub fn cost(&self) -> f64 {
        self.costs.total()
    }
}

/// Ordered, duplicate-free list of `(source, infected)` pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfectionTree {
    edges: Vec<(FarmId, FarmId)>,
}

impl InfectionTree {
    /// Append an edge; returns false if it was already present
    pub fn record(&mut self, source: FarmId, infected: FarmId) -> bool {
        if self.edges.contains(&(source, infected)) {
            return false;
        }
        self.edges.push((source, infected));
        true
    }

    pub fn edges(&self) -> &[(FarmId, FarmId)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Farms infected directly by `source`, in infection order
    pub fn infected_by(&self, source: FarmId) -> Vec<FarmId> {
        self.edges
            .iter()
            .filter(|(s, _)| *s == source)
            .map(|(_, t)| *t)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    days: BTreeMap<usize, DailyRecord>,
    infection_tree: InfectionTree,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_day(&mut self, day: usize, record: DailyRecord) {
        self.days.insert(day, record);
    }

    pub fn record_infection(&mut self, source: FarmId, infected: FarmId) -> bool {
        self.infection_tree.record(source, infected)
    }

    pub fn day(&self, day: usize) -> Option<&DailyRecord> {
        self.days.get(&day)
    }

    pub fn days(&self) -> impl Iterator<Item = (usize, &DailyRecord)> {
        self.days.iter().map(|(d, r)| (*d, r))
    }

    pub fn last_day(&self) -> Option<usize> {
        self.days.keys().next_back().copied()
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    /// Cost of every day up to and including `day`
    pub fn cumulative_cost(&self, day: usize) -> f64 {
        self.days.range(..=day).map(|(_, r)| r.cost()).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.days.values().map(DailyRecord::cost).sum()
    }

    /// Cost breakdown summed over all recorded days
    pub fn total_breakdown(&self) -> CostBreakdown {
        let mut total = CostBreakdown::default();
        for record in self.days.values() {
            total.add(&record.costs);
        }
        total
    }

    pub fn infection_tree(&self) -> &InfectionTree {
        &self.infection_tree
    }

    /// One line per recorded day, preceded by [`CSV_HEADER`]
    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        let mut cumulative = 0.0;
        for (day, r) in &self.days {
            cumulative += r.cost();
            let c = &r.counts;
            // writing to a String cannot fail
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{},{}",
                day,
                c.susceptible,
                c.suspected,
                c.confirmed,
                c.culled,
                c.vaccinated,
                r.restricted,
                r.cost(),
                cumulative
            );
        }
        out
    }
}
