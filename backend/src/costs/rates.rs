//! Cost rate configuration and pricing

use serde::{Deserialize, Serialize};

/// Per-unit costs of outbreak control
///
/// Per-animal rates multiply the herd size of the farm acted on. A farm visit
/// is charged once for every test, cull and vaccination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostRates {
    /// One visit by an inspection or control team
    #[serde(alias = "costOfFarmVisit")]
    pub farm_visit: f64,

    /// Laboratory test, per animal
    #[serde(alias = "costOfTestPerAnimal")]
    pub test_per_animal: f64,

    /// Slaughter and compensation, per animal
    #[serde(alias = "costOfCullingAnimal")]
    pub culling_per_animal: f64,

    /// Vaccine and administration, per animal
    #[serde(alias = "costOfVaccinatingAnimal")]
    pub vaccinating_per_animal: f64,

    /// Standing charge for each day a farm is under movement restriction
    #[serde(alias = "costOfMvmtBanPerDay")]
    pub movement_ban_per_day: f64,

    /// Standing charge for each day a farm is a confirmed infected premises
    #[serde(alias = "costOfInfectedFarmPerDay")]
    pub infected_farm_per_day: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            farm_visit: 100.0,
            test_per_animal: 5.0,
            culling_per_animal: 50.0,
            vaccinating_per_animal: 10.0,
            movement_ban_per_day: 200.0,
            infected_farm_per_day: 500.0,
        }
    }
}

impl CostRates {
    pub fn test_cost(&self, herd_size: u32) -> f64 {
        self.farm_visit + self.test_per_animal * f64::from(herd_size)
    }

    pub fn cull_cost(&self, herd_size: u32) -> f64 {
        self.culling_per_animal * f64::from(herd_size) + self.farm_visit
    }

    pub fn vaccination_cost(&self, herd_size: u32) -> f64 {
        self.vaccinating_per_animal * f64::from(herd_size) + self.farm_visit
    }

    /// Name and value of every rate, for validation
    pub(crate) fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("farm_visit", self.farm_visit),
            ("test_per_animal", self.test_per_animal),
            ("culling_per_animal", self.culling_per_animal),
            ("vaccinating_per_animal", self.vaccinating_per_animal),
            ("movement_ban_per_day", self.movement_ban_per_day),
            ("infected_farm_per_day", self.infected_farm_per_day),
        ]
    }
}

/// Costs incurred on a single day, by category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub testing: f64,
    pub culling: f64,
    pub vaccination: f64,
    /// Standing charge for restricted farms
    pub movement_restriction: f64,
    /// Standing charge for confirmed farms
    pub infected_farms: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.testing + self.culling + self.vaccination + self.movement_restriction + self.infected_farms
    }

    pub fn add(&mut self, other: &CostBreakdown) {
        self.testing += other.testing;
        self.culling += other.culling;
        self.vaccination += other.vaccination;
        self.movement_restriction += other.movement_restriction;
        self.infected_farms += other.infected_farms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_pricing() {
        let rates = CostRates {
            farm_visit: 100.0,
            test_per_animal: 2.0,
            culling_per_animal: 30.0,
            vaccinating_per_animal: 4.0,
            movement_ban_per_day: 0.0,
            infected_farm_per_day: 0.0,
        };
        assert_eq!(rates.test_cost(50), 200.0);
        assert_eq!(rates.cull_cost(50), 1_600.0);
        assert_eq!(rates.vaccination_cost(50), 300.0);
        assert_eq!(rates.cull_cost(0), 100.0, "empty herd still costs a visit");
    }

    #[test]
    fn test_breakdown_total_and_add() {
        let mut day = CostBreakdown {
            testing: 1.0,
            culling: 2.0,
            ..Default::default()
        };
        day.add(&CostBreakdown {
            vaccination: 3.0,
            movement_restriction: 4.0,
            infected_farms: 5.0,
            ..Default::default()
        });
        assert_eq!(day.total(), 15.0);
    }

    #[test]
    fn test_rates_accept_historical_key_names() {
        let rates: CostRates = serde_json::from_str(
            r#"{"costOfFarmVisit": 10.0, "costOfCullingAnimal": 2.5}"#,
        )
        .unwrap();
        assert_eq!(rates.farm_visit, 10.0);
        assert_eq!(rates.culling_per_animal, 2.5);
        assert_eq!(rates.test_per_animal, CostRates::default().test_per_animal);
    }
}
