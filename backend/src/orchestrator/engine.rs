//! Orchestrator Engine
//!
//! Owns every piece of simulation state and runs the day-step loop.
//!
//! # Architecture
//!
//! ```text
//! For each day d:
//! 1. Rebuild the transmission kernel and sample infections until the
//!    continuous clock would cross d + 1
//! 2. Apply the control strategy
//! 3. Process confirmation tests due on d
//! 4. Lift movement restrictions due on d
//! 5. Charge standing costs (confirmed farms, restricted farms)
//! 6. Record the day's statistics
//! 7. Advance to d + 1
//! ```
//!
//! The control strategy runs before test processing, so farms that became
//! suspected during sampling are visible to it on the same day.
//!
//! # Example
//!
//! ```rust
//! use outbreak_simulator_core_rs::config::{FarmConfig, Parameters, SimulationConfig};
//! use outbreak_simulator_core_rs::control::ControlStrategy;
//! use outbreak_simulator_core_rs::{DiseaseState, FarmId, Orchestrator};
//!
//! let config = SimulationConfig {
//!     parameters: Parameters::default(),
//!     farms: vec![
//!         FarmConfig::new(1, 0.0, 0.0, 100),
//!         FarmConfig::new(2, 0.5, 0.5, 120),
//!     ],
//!     seed_farms: vec![FarmId(1)],
//!     rng_seed: 12345,
//!     max_days: 60,
//!     control_strategy: ControlStrategy::CullOnConfirmation,
//! };
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! let summary = orchestrator.run_to_completion().unwrap();
//! assert!(summary.days_run > 0);
//! assert_eq!(orchestrator.count_farms(DiseaseState::Suspected), 0);
//! ```

use crate::config::{Parameters, SimulationConfig};
use crate::control::{ControlContext, ControlOutcome, ControlStrategy, StrategyDescriptor};
use crate::core::time::TimeManager;
use crate::costs::CostBreakdown;
use crate::engine::{FiredEvent, StochasticEngine};
use crate::error::SimulationError;
use crate::events::{day_after, DailySchedule};
use crate::kernel::TransmissionKernel;
use crate::models::event::{Event, EventKind};
use crate::models::farm::{DiseaseState, Farm, FarmId};
use crate::models::history::{EventHistory, HistoryEvent};
use crate::models::registry::{FarmRegistry, StatusCounts};
use crate::orchestrator::checkpoint::{compute_config_hash, FarmSnapshot};
use crate::rng::RngManager;
use crate::stats::{DailyRecord, Statistics};
use serde_json::json;
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

// ============================================================================
// Results
// ============================================================================

/// Outcome of a single day-step
#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    /// Day that was processed
    pub day: usize,

    /// Day the simulation now stands at (`day + 1`)
    pub next_day: usize,

    /// Infections fired by the stochastic engine
    pub infections: usize,

    /// Scheduled tests processed (each one is charged)
    pub tests_performed: usize,

    /// Tests that moved a farm from SUSPECTED to CONFIRMED
    pub confirmations: usize,

    pub culled: usize,

    pub vaccinated: usize,

    /// Farms newly placed under movement restriction
    pub restrictions_imposed: usize,

    pub restrictions_lifted: usize,

    /// Status counts at the end of the day
    pub counts: StatusCounts,

    /// Farms under restriction at the end of the day
    pub restricted: usize,

    pub day_cost: f64,

    pub cumulative_cost: f64,

    /// Whether anything at all happened during the day
    pub had_events: bool,
}

/// How far [`Orchestrator::run`] should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Exactly one day-step
    SingleDay,
    /// Day-steps until one has events (or the day limit is reached)
    UntilNextEvent,
    /// Day-steps until the outbreak is over or the day limit is reached
    ToCompletion,
}

/// Summary of a multi-day run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub days_run: usize,
    pub final_day: usize,
    pub cumulative_cost: f64,
    /// The caller stopped the run between day-steps
    pub cancelled: bool,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// A single outbreak simulation
///
/// # Determinism
///
/// All randomness comes from one seeded xorshift64* stream, and every
/// collection that drives sampling or control is iterated in farm-id order.
/// Same config and seed give the same trajectory.
pub struct Orchestrator {
    /// Run configuration (only the output directory may change)
    config: SimulationConfig,

    /// Hash of the configuration, stamped into checkpoints
    config_hash: String,

    session_id: Uuid,

    farms: FarmRegistry,

    /// Farms currently under movement restriction
    restricted: BTreeSet<FarmId>,

    time_manager: TimeManager,

    rng_manager: RngManager,

    engine: StochasticEngine,

    /// Pending confirmation tests and restriction lifts
    schedule: DailySchedule,

    control_strategy: ControlStrategy,

    statistics: Statistics,

    history: EventHistory,

    /// Set when a day-step failed; the simulation refuses to continue
    unusable: Option<String>,
}

impl Orchestrator {
    /// Create a simulation from a configuration
    ///
    /// Validates the configuration, builds the farm population, forces the
    /// seed farms into SUSPECTED and schedules their confirmation tests.
    /// Nothing is built if validation fails.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let config_hash = compute_config_hash(&config.hashable())?;
        let mut rng_manager = RngManager::new(config.rng_seed);
        let mut farms = FarmRegistry::new(config.build_farms(&mut rng_manager));
        let mut schedule = DailySchedule::new();
        let mut history = EventHistory::new();

        let test_day = config.parameters.suspected_test_delay;
        for &seed in &config.seed_farms {
            let farm = farms.get_mut(seed).ok_or(SimulationError::FarmNotFound(seed))?;
            farm.mark_suspected(0, None)?;
            schedule.schedule_test(test_day, Event::test(seed))?;
        }

        let session_id = Uuid::new_v4();
        let control_strategy = config.control_strategy.clone();
        history.log(HistoryEvent::StrategyChanged {
            day: 0,
            strategy: control_strategy.name().to_string(),
        });

        info!(
            session = %session_id,
            farms = farms.num_farms(),
            seeds = config.seed_farms.len(),
            strategy = control_strategy.name(),
            "simulation created"
        );

        Ok(Self {
            config,
            config_hash,
            session_id,
            farms,
            restricted: BTreeSet::new(),
            time_manager: TimeManager::new(),
            rng_manager,
            engine: StochasticEngine::new(),
            schedule,
            control_strategy,
            statistics: Statistics::new(),
            history,
            unusable: None,
        })
    }

    /// Reassemble a simulation from checkpointed parts (see `checkpoint`)
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config: SimulationConfig,
        config_hash: String,
        session_id: Uuid,
        farms: Vec<Farm>,
        restricted: BTreeSet<FarmId>,
        time_manager: TimeManager,
        rng_manager: RngManager,
        schedule: DailySchedule,
        control_strategy: ControlStrategy,
        statistics: Statistics,
    ) -> Self {
        Self {
            config,
            config_hash,
            session_id,
            farms: FarmRegistry::new(farms),
            restricted,
            time_manager,
            rng_manager,
            engine: StochasticEngine::new(),
            schedule,
            control_strategy,
            statistics,
            history: EventHistory::new(),
            unusable: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn current_day(&self) -> usize {
        self.time_manager.current_day()
    }

    /// Continuous engine clock
    pub fn current_time(&self) -> f64 {
        self.time_manager.current_time()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn parameters(&self) -> &Parameters {
        &self.config.parameters
    }

    /// The one parameter that may change during a run
    pub fn set_output_directory(&mut self, directory: Option<String>) {
        self.config.parameters.output_directory = directory;
    }

    pub fn farms(&self) -> &FarmRegistry {
        &self.farms
    }

    /// Direct mutable access to the farm population (testing and operator
    /// intervention)
    pub fn farms_mut(&mut self) -> &mut FarmRegistry {
        &mut self.farms
    }

    /// Look up one farm
    pub fn farm(&self, id: FarmId) -> Result<&Farm, SimulationError> {
        self.farms.get(id).ok_or(SimulationError::FarmNotFound(id))
    }

    pub fn count_farms(&self, status: DiseaseState) -> usize {
        self.farms.count(status)
    }

    pub fn counts(&self) -> StatusCounts {
        self.farms.counts()
    }

    pub fn suspected_farms(&self) -> Vec<FarmId> {
        self.farms.with_status(DiseaseState::Suspected)
    }

    pub fn confirmed_farms(&self) -> Vec<FarmId> {
        self.farms.with_status(DiseaseState::Confirmed)
    }

    /// Suspected or confirmed farms
    pub fn infectious_farms(&self) -> Vec<FarmId> {
        self.farms.infectious()
    }

    pub fn restricted_farms(&self) -> &BTreeSet<FarmId> {
        &self.restricted
    }

    pub fn schedule(&self) -> &DailySchedule {
        &self.schedule
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    pub fn control_strategy(&self) -> &ControlStrategy {
        &self.control_strategy
    }

    pub(crate) fn rng_state(&self) -> u64 {
        self.rng_manager.get_state()
    }

    pub fn is_usable(&self) -> bool {
        self.unusable.is_none()
    }

    /// Last day a run may reach: `max_days`, or `end_time` if it is earlier
    pub fn day_limit(&self) -> usize {
        match self.config.parameters.end_time {
            Some(end) => end.min(self.config.max_days),
            None => self.config.max_days,
        }
    }

    /// No infectious farm and nothing scheduled, or the day limit reached
    pub fn is_finished(&self) -> bool {
        let burnt_out = !self.farms.has_infectious() && self.schedule.is_empty();
        burnt_out || self.current_day() >= self.day_limit()
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Replace the active control strategy from the next day-step on
    ///
    /// Fails with a configuration error, leaving the current strategy in
    /// place, if the strategy references a farm that does not exist.
    pub fn set_control_strategy(&mut self, strategy: ControlStrategy) -> Result<(), SimulationError> {
        strategy.validate(|id| self.farms.contains(id))?;
        info!(
            day = self.current_day(),
            from = self.control_strategy.name(),
            to = strategy.name(),
            "control strategy replaced"
        );
        self.history.log(HistoryEvent::StrategyChanged {
            day: self.current_day(),
            strategy: strategy.name().to_string(),
        });
        self.control_strategy = strategy;
        Ok(())
    }

    /// Resolve a descriptor (unknown names become no control) and install it
    pub fn set_control_strategy_descriptor(
        &mut self,
        descriptor: &StrategyDescriptor,
    ) -> Result<(), SimulationError> {
        let strategy = descriptor.resolve()?;
        self.set_control_strategy(strategy)
    }

    // ========================================================================
    // Day-step
    // ========================================================================

    /// Execute exactly one day-step
    ///
    /// Any failure part-way through leaves the simulation unusable: a
    /// day-step's effects cannot be rolled back.
    pub fn step_one_day(&mut self) -> Result<DayResult, SimulationError> {
        if let Some(reason) = &self.unusable {
            return Err(SimulationError::SimulationUnusable(reason.clone()));
        }

        match self.run_day_step() {
            Ok(result) => Ok(result),
            Err(err) => {
                if matches!(err, SimulationError::EngineInvariant { .. }) {
                    error!(day = self.current_day(), error = %err, "stochastic engine invariant violated");
                } else {
                    error!(day = self.current_day(), error = %err, "day-step failed");
                }
                self.unusable = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn run_day_step(&mut self) -> Result<DayResult, SimulationError> {
        let day = self.current_day();
        let mut day_costs = CostBreakdown::default();

        self.discard_stale_entries(day);

        // STEP 1: STOCHASTIC INFECTIONS
        let infections = self.sample_infections(day)?;

        // STEP 2: CONTROL STRATEGY
        let outcome = self.apply_control(day, &mut day_costs)?;

        // STEP 3: CONFIRMATION TESTS
        let (tests_performed, confirmations) = self.process_tests(day, &mut day_costs)?;

        // STEP 4: RESTRICTION LIFTS
        let restrictions_lifted = self.process_lifts(day);

        // STEP 5: STANDING COSTS
        self.accrue_standing_costs(&mut day_costs);

        // STEP 6: STATISTICS
        let counts = self.farms.counts();
        let day_cost = day_costs.total();
        self.statistics.record_day(
            day,
            DailyRecord {
                counts,
                restricted: self.restricted.len(),
                infections,
                costs: day_costs,
            },
        );
        self.history.log(HistoryEvent::EndOfDay {
            day,
            infections,
            day_cost,
        });

        // STEP 7: ADVANCE DAY
        self.time_manager.advance_day();

        let had_events =
            infections > 0 || tests_performed > 0 || restrictions_lifted > 0 || !outcome.is_empty();
        let result = DayResult {
            day,
            next_day: self.current_day(),
            infections,
            tests_performed,
            confirmations,
            culled: outcome.culled.len(),
            vaccinated: outcome.vaccinated.len(),
            restrictions_imposed: outcome.restricted.len(),
            restrictions_lifted,
            counts,
            restricted: self.restricted.len(),
            day_cost,
            cumulative_cost: self.statistics.cumulative_cost(day),
            had_events,
        };

        debug!(
            day,
            infections,
            confirmations,
            culled = result.culled,
            vaccinated = result.vaccinated,
            infectious = counts.infectious(),
            day_cost,
            "day-step complete"
        );

        Ok(result)
    }

    /// Drop schedule entries for days that have already passed
    fn discard_stale_entries(&mut self, day: usize) {
        for (scheduled_day, event) in self.schedule.take_stale_tests(day) {
            warn!(scheduled_day, day, farm = %event.target, "discarding overdue test");
            self.history.log(HistoryEvent::ScheduleEntryDiscarded {
                day,
                scheduled_day,
                farm: event.target,
                kind: Some(EventKind::Test),
            });
        }
        for (scheduled_day, farm) in self.schedule.take_stale_lifts(day) {
            warn!(scheduled_day, day, farm = %farm, "discarding overdue restriction lift");
            self.history.log(HistoryEvent::ScheduleEntryDiscarded {
                day,
                scheduled_day,
                farm,
                kind: None,
            });
        }
    }

    /// Run the Gillespie sampler over the day
    fn sample_infections(&mut self, day: usize) -> Result<usize, SimulationError> {
        let params = &self.config.parameters;
        let mut kernel = TransmissionKernel::rebuild(&self.farms, &self.restricted, params)?;
        self.engine.begin_day(&mut self.time_manager);

        let mut fired = 0;
        while let Some(event) = self
            .engine
            .next_event(&kernel, &mut self.time_manager, &mut self.rng_manager)
        {
            self.apply_infection(day, event)?;
            kernel.patch_infection(event.event.target, &self.farms, &self.restricted, &self.config.parameters)?;
            fired += 1;
        }
        Ok(fired)
    }

    fn apply_infection(&mut self, day: usize, fired: FiredEvent) -> Result<(), SimulationError> {
        let Event { source, target, .. } = fired.event;
        self.farms
            .get_mut(target)
            .ok_or(SimulationError::FarmNotFound(target))?
            .mark_suspected(day, Some(source))?;

        self.statistics.record_infection(source, target);

        let test_day = day_after(day, self.config.parameters.suspected_test_delay)?;
        if let Err(err) = self.schedule.schedule_test(test_day, Event::test(target)) {
            warn!(farm = %target, error = %err, "confirmation test could not be scheduled");
        }

        trace!(
            time = fired.time,
            source = %source,
            target = %target,
            total_propensity = fired.total_propensity,
            "infection"
        );
        self.history.log(HistoryEvent::Infection {
            day,
            time: fired.time,
            source,
            target,
        });
        Ok(())
    }

    fn apply_control(
        &mut self,
        day: usize,
        day_costs: &mut CostBreakdown,
    ) -> Result<ControlOutcome, SimulationError> {
        let mut ctx = ControlContext {
            day,
            registry: &mut self.farms,
            restricted: &mut self.restricted,
            schedule: &mut self.schedule,
            costs: day_costs,
            rates: &self.config.parameters.costs,
            history: &mut self.history,
        };
        self.control_strategy.apply(&mut ctx)
    }

    /// Returns (tests performed, confirmations)
    fn process_tests(
        &mut self,
        day: usize,
        day_costs: &mut CostBreakdown,
    ) -> Result<(usize, usize), SimulationError> {
        let rates = &self.config.parameters.costs;
        let mut performed = 0;
        let mut confirmed = 0;

        for event in self.schedule.take_tests(day) {
            let Some(farm) = self.farms.get_mut(event.target) else {
                warn!(farm = %event.target, "test scheduled for unknown farm");
                continue;
            };
            let cost = rates.test_cost(farm.herd_size());
            let still_suspected = farm.status() == DiseaseState::Suspected;
            if still_suspected {
                farm.confirm()?;
                confirmed += 1;
                debug!(day, farm = %event.target, "farm confirmed");
            }
            day_costs.testing += cost;
            performed += 1;
            self.history.log(HistoryEvent::TestPerformed {
                day,
                farm: event.target,
                confirmed: still_suspected,
                cost,
            });
        }
        Ok((performed, confirmed))
    }

    fn process_lifts(&mut self, day: usize) -> usize {
        let mut lifted = 0;
        for farm in self.schedule.take_lifts(day) {
            if self.restricted.remove(&farm) {
                lifted += 1;
                self.history.log(HistoryEvent::RestrictionLifted { day, farm });
            }
        }
        if lifted > 0 {
            debug!(day, lifted, "movement restrictions lifted");
        }
        lifted
    }

    fn accrue_standing_costs(&self, day_costs: &mut CostBreakdown) {
        let rates = &self.config.parameters.costs;
        let confirmed = self.farms.count(DiseaseState::Confirmed) as f64;
        day_costs.infected_farms += confirmed * rates.infected_farm_per_day;
        day_costs.movement_restriction += self.restricted.len() as f64 * rates.movement_ban_per_day;
    }

    // ========================================================================
    // Runs
    // ========================================================================

    pub fn run(&mut self, mode: RunMode) -> Result<RunSummary, SimulationError> {
        match mode {
            RunMode::SingleDay => {
                let result = self.step_one_day()?;
                Ok(self.summary(1, false, result.cumulative_cost))
            }
            RunMode::UntilNextEvent => self.run_until_next_event(),
            RunMode::ToCompletion => self.run_to_completion(),
        }
    }

    /// Day-steps until the outbreak is over or the day limit is reached
    pub fn run_to_completion(&mut self) -> Result<RunSummary, SimulationError> {
        self.run_with(|_| ControlFlow::Continue(()))
    }

    /// [`run_to_completion`](Self::run_to_completion) with a callback after
    /// every day-step; returning `Break` stops the run between day-steps
    pub fn run_with<F>(&mut self, mut on_day: F) -> Result<RunSummary, SimulationError>
    where
        F: FnMut(&DayResult) -> ControlFlow<()>,
    {
        let mut days_run = 0;
        let mut cancelled = false;
        while !self.is_finished() {
            let result = self.step_one_day()?;
            days_run += 1;
            if on_day(&result).is_break() {
                cancelled = true;
                break;
            }
        }

        let summary = self.summary(days_run, cancelled, self.statistics.total_cost());
        info!(
            days_run,
            final_day = summary.final_day,
            cancelled,
            cumulative_cost = summary.cumulative_cost,
            "run finished"
        );
        Ok(summary)
    }

    /// Day-steps until a day has events, bounded by the day limit
    ///
    /// Always runs at least one day-step.
    pub fn run_until_next_event(&mut self) -> Result<RunSummary, SimulationError> {
        let mut days_run = 0;
        loop {
            let result = self.step_one_day()?;
            days_run += 1;
            if result.had_events || self.current_day() >= self.day_limit() {
                break;
            }
        }
        Ok(self.summary(days_run, false, self.statistics.total_cost()))
    }

    fn summary(&self, days_run: usize, cancelled: bool, cumulative_cost: f64) -> RunSummary {
        RunSummary {
            days_run,
            final_day: self.current_day(),
            cumulative_cost,
            cancelled,
        }
    }

    // ========================================================================
    // State view
    // ========================================================================

    /// JSON view of the current state for a front end
    pub fn state_json(&self) -> serde_json::Value {
        let counts = self.farms.counts();
        let farms: Vec<FarmSnapshot> = self.farms.iter().map(FarmSnapshot::from).collect();
        json!({
            "sessionId": self.session_id.to_string(),
            "day": self.current_day(),
            "time": self.current_time(),
            "nextScheduledDay": self.schedule.next_scheduled_day(),
            "strategy": self.control_strategy.name(),
            "counts": counts,
            "restrictedFarms": self.restricted,
            "cumulativeCost": self.statistics.total_cost(),
            "finished": self.is_finished(),
            "farms": farms,
        })
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("session_id", &self.session_id)
            .field("current_day", &self.current_day())
            .field("num_farms", &self.farms.num_farms())
            .field("restricted", &self.restricted.len())
            .field("strategy", &self.control_strategy.name())
            .field("usable", &self.is_usable())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FarmConfig;

    fn create_test_config() -> SimulationConfig {
        SimulationConfig {
            parameters: Parameters {
                beta: 0.0,
                suspected_test_delay: 2,
                ..Parameters::default()
            },
            farms: vec![
                FarmConfig::new(1, 0.0, 0.0, 100),
                FarmConfig::new(2, 1.0, 0.0, 50),
                FarmConfig::new(3, 5.0, 5.0, 80),
            ],
            seed_farms: vec![FarmId(1)],
            rng_seed: 12345,
            max_days: 30,
            control_strategy: ControlStrategy::NoControl,
        }
    }

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = Orchestrator::new(create_test_config()).unwrap();

        assert_eq!(orchestrator.current_day(), 0);
        assert_eq!(orchestrator.current_time(), 0.0);
        assert_eq!(orchestrator.suspected_farms(), vec![FarmId(1)]);
        assert_eq!(orchestrator.farm(FarmId(1)).unwrap().day_infected(), Some(0));
        assert_eq!(orchestrator.schedule().tests_on(2), vec![Event::test(FarmId(1))]);
        assert!(orchestrator.is_usable());
        assert!(!orchestrator.is_finished());
    }

    #[test]
    fn test_invalid_config_builds_nothing() {
        let mut config = create_test_config();
        config.seed_farms = vec![FarmId(77)];
        assert!(matches!(
            Orchestrator::new(config),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn test_farm_lookup_error() {
        let orchestrator = Orchestrator::new(create_test_config()).unwrap();
        assert_eq!(
            orchestrator.farm(FarmId(99)).unwrap_err(),
            SimulationError::FarmNotFound(FarmId(99))
        );
    }

    #[test]
    fn test_test_cost_and_standing_costs() {
        let mut config = create_test_config();
        config.parameters.suspected_test_delay = 0;
        let rates = config.parameters.costs.clone();
        let mut orchestrator = Orchestrator::new(config).unwrap();

        let day0 = orchestrator.step_one_day().unwrap();
        assert_eq!(day0.confirmations, 1);
        let expected = rates.test_cost(100) + rates.infected_farm_per_day;
        assert!((day0.day_cost - expected).abs() < 1e-9);

        let day1 = orchestrator.step_one_day().unwrap();
        assert!((day1.day_cost - rates.infected_farm_per_day).abs() < 1e-9);
        assert!((day1.cumulative_cost - (expected + rates.infected_farm_per_day)).abs() < 1e-9);
    }

    #[test]
    fn test_set_control_strategy_rejects_unknown_farm() {
        let mut orchestrator = Orchestrator::new(create_test_config()).unwrap();
        let bad = ControlStrategy::RingVaccination {
            rings: vec![crate::control::RingSpec {
                farm_id: FarmId(42),
                radius: 1.0,
            }],
        };
        assert!(orchestrator.set_control_strategy(bad).is_err());
        assert_eq!(orchestrator.control_strategy(), &ControlStrategy::NoControl);
    }

    #[test]
    fn test_overlong_restriction_rejected_before_install() {
        let mut orchestrator = Orchestrator::new(create_test_config()).unwrap();
        let descriptor = StrategyDescriptor::new(
            crate::control::descriptor::GLOBAL_MOVEMENT_RESTRICTION,
            json!({ "days": u64::MAX }),
        );
        assert!(matches!(
            orchestrator.set_control_strategy_descriptor(&descriptor),
            Err(SimulationError::Configuration(_))
        ));

        let local = ControlStrategy::MovementRestriction {
            restrictions: vec![crate::control::RestrictionSpec {
                farm_id: FarmId(2),
                radius: 1.0,
                days: Some(usize::MAX),
            }],
            applied_on: None,
        };
        assert!(matches!(
            orchestrator.set_control_strategy(local),
            Err(SimulationError::Configuration(_))
        ));

        assert_eq!(orchestrator.control_strategy(), &ControlStrategy::NoControl);
        orchestrator.step_one_day().unwrap();
        assert!(orchestrator.is_usable());
    }

    #[test]
    fn test_engine_invariant_marks_simulation_unusable() {
        let mut config = create_test_config();
        config.parameters.beta = 0.01;
        let mut orchestrator = Orchestrator::new(config).unwrap();
        orchestrator
            .farms_mut()
            .get_mut(FarmId(3))
            .unwrap()
            .set_location(f64::NAN, 0.0);

        let err = orchestrator.step_one_day().unwrap_err();
        assert!(matches!(err, SimulationError::EngineInvariant { .. }));
        assert!(!orchestrator.is_usable());
        assert!(matches!(
            orchestrator.step_one_day(),
            Err(SimulationError::SimulationUnusable(_))
        ));
    }

    #[test]
    fn test_day_limit_prefers_earlier_end_time() {
        let mut config = create_test_config();
        config.parameters.end_time = Some(5);
        let mut orchestrator = Orchestrator::new(config).unwrap();
        assert_eq!(orchestrator.day_limit(), 5);
        let summary = orchestrator.run_to_completion().unwrap();
        assert_eq!(summary.final_day, 5);
        assert_eq!(summary.days_run, 5);
    }

    #[test]
    fn test_run_with_can_cancel_between_days() {
        let mut orchestrator = Orchestrator::new(create_test_config()).unwrap();
        let summary = orchestrator
            .run_with(|result| {
                if result.day == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.days_run, 3);
        assert_eq!(orchestrator.current_day(), 3);
    }

    #[test]
    fn test_state_json_view() {
        let orchestrator = Orchestrator::new(create_test_config()).unwrap();
        let view = orchestrator.state_json();
        assert_eq!(view["day"], 0);
        assert_eq!(view["nextScheduledDay"], 2);
        assert_eq!(view["counts"]["suspected"], 1);
        assert_eq!(view["farms"].as_array().unwrap().len(), 3);
        assert_eq!(view["sessionId"], orchestrator.session_id().to_string());
    }
}
