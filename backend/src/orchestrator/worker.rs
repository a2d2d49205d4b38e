//! Background simulation worker
//!
//! Runs an [`Orchestrator`] to completion on its own thread. Each finished
//! day is published on a channel; cancellation is cooperative and only
//! takes effect between day-steps, so a cancelled run is always left at a
//! day boundary and can be snapshotted or resumed.

use crate::error::SimulationError;
use crate::orchestrator::engine::{DayResult, Orchestrator, RunSummary};
use crossbeam_channel::{Receiver, TryRecvError};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// What the worker thread hands back
#[derive(Debug)]
pub struct WorkerReport {
    /// The simulation, at whatever day the run stopped
    pub orchestrator: Orchestrator,
    /// Run summary, or the error that stopped the run
    pub outcome: Result<RunSummary, SimulationError>,
}

/// Handle to a simulation running on a background thread
pub struct SimulationWorker {
    cancel: Arc<AtomicBool>,
    progress: Receiver<DayResult>,
    handle: Option<JoinHandle<WorkerReport>>,
}

impl SimulationWorker {
    /// Move `orchestrator` onto a new thread and start running it
    pub fn spawn(mut orchestrator: Orchestrator) -> Result<Self, SimulationError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = crossbeam_channel::unbounded();
        let flag = Arc::clone(&cancel);
        let name = format!("outbreak-sim-{}", orchestrator.session_id());

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                if flag.load(Ordering::Acquire) {
                    return WorkerReport {
                        outcome: Ok(RunSummary {
                            days_run: 0,
                            final_day: orchestrator.current_day(),
                            cumulative_cost: orchestrator.statistics().total_cost(),
                            cancelled: true,
                        }),
                        orchestrator,
                    };
                }

                let outcome = orchestrator.run_with(|result| {
                    // Receiver gone means nobody is listening; keep running.
                    let _ = tx.send(result.clone());
                    if flag.load(Ordering::Acquire) {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                });
                if let Err(err) = &outcome {
                    warn!(error = %err, "background run stopped on error");
                }
                WorkerReport {
                    orchestrator,
                    outcome,
                }
            })
            .map_err(|e| SimulationError::Worker(format!("failed to spawn worker thread: {}", e)))?;

        Ok(Self {
            cancel,
            progress: rx,
            handle: Some(handle),
        })
    }

    /// Ask the run to stop after the current day-step
    pub fn cancel(&self) {
        debug!("cancellation requested");
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Channel of per-day results, in day order
    pub fn progress(&self) -> &Receiver<DayResult> {
        &self.progress
    }

    /// Drain whatever day results are available right now
    pub fn try_progress(&self) -> Vec<DayResult> {
        let mut results = Vec::new();
        loop {
            match self.progress.try_recv() {
                Ok(result) => results.push(result),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        results
    }

    /// Wait for the worker to exit and take the simulation back
    pub fn join(mut self) -> Result<WorkerReport, SimulationError> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| SimulationError::Worker("worker already joined".to_string()))?;
        handle
            .join()
            .map_err(|_| SimulationError::Worker("worker thread panicked".to_string()))
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        // A dropped handle detaches the thread; stop it at the next boundary.
        if self.handle.is_some() {
            self.cancel.store(true, Ordering::Release);
        }
    }
}

impl std::fmt::Debug for SimulationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationWorker")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}
