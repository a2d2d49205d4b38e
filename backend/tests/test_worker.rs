//! Background worker tests
//!
//! The worker owns the orchestrator while running and hands it back on
//! join; cancellation stops the run at a day boundary.

use outbreak_simulator_core_rs::config::{FarmConfig, Parameters, SimulationConfig};
use outbreak_simulator_core_rs::{ControlStrategy, FarmId, Orchestrator, SimulationWorker};

fn config(max_days: usize) -> SimulationConfig {
    let farms = (0..16u32)
        .map(|i| FarmConfig::new(i + 1, f64::from(i % 4), f64::from(i / 4), 100))
        .collect();
    SimulationConfig {
        parameters: Parameters {
            beta: 0.0003,
            ..Parameters::default()
        },
        farms,
        seed_farms: vec![FarmId(6)],
        rng_seed: 808,
        max_days,
        control_strategy: ControlStrategy::NoControl,
    }
}

#[test]
fn test_worker_matches_foreground_run() {
    let mut foreground = Orchestrator::new(config(30)).unwrap();
    let expected = foreground.run_to_completion().unwrap();

    let worker = SimulationWorker::spawn(Orchestrator::new(config(30)).unwrap()).unwrap();
    let report = worker.join().unwrap();
    let summary = report.outcome.unwrap();

    assert_eq!(summary.final_day, expected.final_day);
    assert_eq!(summary.days_run, expected.days_run);
    assert_eq!(report.orchestrator.statistics(), foreground.statistics());
}

#[test]
fn test_progress_reports_every_day() {
    let worker = SimulationWorker::spawn(Orchestrator::new(config(20)).unwrap()).unwrap();
    let progress = worker.progress().clone();
    let report = worker.join().unwrap();
    let summary = report.outcome.unwrap();

    let results: Vec<_> = progress.try_iter().collect();
    assert_eq!(results.len(), summary.days_run);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.day, i);
    }
    assert_eq!(
        results.last().unwrap().cumulative_cost,
        report.orchestrator.statistics().total_cost()
    );
}

#[test]
fn test_cancelled_worker_returns_resumable_simulation() {
    let worker = SimulationWorker::spawn(Orchestrator::new(config(200_000)).unwrap()).unwrap();
    worker.cancel();
    let report = worker.join().unwrap();
    let summary = report.outcome.unwrap();
    assert!(summary.cancelled);

    let mut orchestrator = report.orchestrator;
    let day = orchestrator.current_day();
    assert_eq!(orchestrator.current_time(), day as f64);
    let next = orchestrator.step_one_day().unwrap();
    assert_eq!(next.day, day);
}
