use super::log::{LogEntry, LogValues};
use super::stopwatch::Stopwatch;
use crate::error::{EvoResult, EvolveError};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    MaxGenerations,
    MaxTime,
    MaxEvaluations,
    Stagnation,
    /// Too many all-infeasible generations were discarded over the run.
    InfeasibleSafetyValve,
    /// The caller raised the cancellation flag.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::MaxGenerations => "the maximum number of generations was reached",
            StopReason::MaxTime => "the time limit was reached",
            StopReason::MaxEvaluations => "the maximum number of evaluations was reached",
            StopReason::Stagnation => "the best objective value stagnated",
            StopReason::InfeasibleSafetyValve => {
                "too many generations without any feasible individual"
            }
            StopReason::Cancelled => "the run was cancelled",
        };
        f.write_str(text)
    }
}

/// Result of one generation step, as seen by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The generation counts towards limits and statistics.
    Recorded,
    /// Single-objective generation without a feasible individual; forgotten.
    SkippedInfeasible,
}

/// Lifecycle of an evolution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Uninitialized,
    Initialized,
    Evolving,
    Terminated,
}

/// Counters read by termination checks and by the caller after a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlgorithmState {
    /// Recorded generations.
    pub generation: usize,
    /// Evaluated individuals.
    pub evaluations: usize,
    /// Search time, excluding logging and callbacks.
    pub elapsed: Duration,
    /// Consecutive recorded generations without best-value improvement.
    pub stagnation: usize,
    /// Forgotten all-infeasible generations.
    pub forgotten: usize,
    pub stop_reason: Option<StopReason>,
}

/// Termination limits. At least one of the first three must be set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Limits {
    pub max_generations: Option<usize>,
    pub max_time: Option<Duration>,
    pub max_evaluations: Option<usize>,
    /// Single-objective only.
    pub max_stagnation: Option<usize>,
    pub stagnation_tolerance: f64,
}

impl Limits {
    fn has_hard_limit(&self) -> bool {
        self.max_generations.is_some() || self.max_time.is_some() || self.max_evaluations.is_some()
    }
}

/// Statistics and termination bookkeeping for one run.
#[derive(Debug, Clone)]
pub struct Tracker {
    limits: Limits,
    single_objective: bool,
    log_period: usize,
    verbose: bool,
    stopwatch: Stopwatch,
    state: AlgorithmState,
    previous_best: Option<f64>,
    log: Option<Vec<LogEntry>>,
    last_logged: Option<usize>,
}

impl Tracker {
    pub fn new(limits: Limits, single_objective: bool, log_period: usize, verbose: bool) -> Self {
        Self {
            limits,
            single_objective,
            log_period,
            verbose,
            stopwatch: Stopwatch::new(),
            state: AlgorithmState::default(),
            previous_best: None,
            log: None,
            last_logged: None,
        }
    }

    /// Resets every counter, allocates the log and starts the clock.
    pub fn start(&mut self) {
        self.state = AlgorithmState::default();
        self.previous_best = None;
        self.last_logged = None;
        self.log = (self.log_period > 0).then(Vec::new);
        self.stopwatch = Stopwatch::start();
    }

    pub fn add_evaluations(&mut self, count: usize) {
        self.state.evaluations += count;
    }

    /// Books a finished generation step.
    ///
    /// `best` is the best-ever feasible objective (minimization space) in
    /// single-objective mode and drives the stagnation counter.
    pub fn record(&mut self, outcome: GenerationOutcome, best: Option<f64>) {
        match outcome {
            GenerationOutcome::Recorded => {
                self.state.generation += 1;
                if self.single_objective {
                    self.update_stagnation(best);
                }
            }
            GenerationOutcome::SkippedInfeasible => {
                self.state.forgotten += 1;
            }
        }
        self.state.elapsed = self.stopwatch.elapsed();
    }

    fn update_stagnation(&mut self, best: Option<f64>) {
        match (self.previous_best, best) {
            (Some(prev), Some(now)) if (now - prev).abs() < self.limits.stagnation_tolerance => {
                self.state.stagnation += 1;
            }
            _ => self.state.stagnation = 0,
        }
        self.previous_best = best;
    }

    /// Returns true when the latest recorded generation is due a log row.
    pub fn log_due(&self) -> bool {
        self.log.is_some()
            && self.state.generation > 0
            && (self.state.generation - 1) % self.log_period == 0
            && self.last_logged != Some(self.state.generation)
    }

    /// Returns true when the latest recorded generation has no log row yet.
    pub fn log_pending(&self) -> bool {
        self.log.is_some()
            && self.state.generation > 0
            && self.last_logged != Some(self.state.generation)
    }

    /// Appends a log row for the current generation. The clock is paused
    /// while `compute` runs.
    pub fn log_with(&mut self, compute: impl FnOnce() -> LogValues) {
        if self.log.is_none() {
            return;
        }
        let values = self.stopwatch.excluding(compute);
        let entry = LogEntry {
            generation: self.state.generation,
            evaluations: self.state.evaluations,
            values,
        };
        if self.verbose {
            info!("{entry}");
        }
        self.last_logged = Some(entry.generation);
        if let Some(log) = self.log.as_mut() {
            log.push(entry);
        }
    }

    /// Runs `action` with the clock paused.
    pub fn excluding<R>(&mut self, action: impl FnOnce() -> R) -> R {
        self.stopwatch.excluding(action)
    }

    /// Decides termination.
    ///
    /// # Errors
    /// [`EvolveError::MissingTerminationLimit`] if no generation, time or
    /// evaluation limit is configured.
    pub fn check(&mut self) -> EvoResult<Option<StopReason>> {
        if !self.limits.has_hard_limit() {
            return Err(EvolveError::MissingTerminationLimit);
        }
        self.state.elapsed = self.stopwatch.elapsed();
        let state = &self.state;
        let limits = &self.limits;

        let reason = if limits.max_generations.is_some_and(|g| state.generation >= g) {
            Some(StopReason::MaxGenerations)
        } else if limits.max_time.is_some_and(|t| state.elapsed >= t) {
            Some(StopReason::MaxTime)
        } else if limits.max_evaluations.is_some_and(|e| state.evaluations >= e) {
            Some(StopReason::MaxEvaluations)
        } else if self.single_objective
            && limits.max_stagnation.is_some_and(|s| state.stagnation >= s)
        {
            Some(StopReason::Stagnation)
        } else if self.single_objective
            && limits
                .max_generations
                .is_some_and(|g| state.forgotten > g.saturating_mul(10))
        {
            warn!(
                forgotten = state.forgotten,
                "no feasible individual in too many generations, stopping"
            );
            Some(StopReason::InfeasibleSafetyValve)
        } else {
            None
        };

        if let Some(reason) = reason {
            self.stopwatch.pause();
            self.state.stop_reason = Some(reason);
        }
        Ok(reason)
    }

    /// Stops the run for a reason decided outside the tracker.
    pub fn stop(&mut self, reason: StopReason) {
        self.state.elapsed = self.stopwatch.elapsed();
        self.stopwatch.pause();
        self.state.stop_reason = Some(reason);
    }

    pub fn state(&self) -> &AlgorithmState {
        &self.state
    }

    /// The log, `None` when logging is disabled.
    pub fn log(&self) -> Option<&[LogEntry]> {
        self.log.as_deref()
    }

    pub fn take_log(&mut self) -> Option<Vec<LogEntry>> {
        self.log.take()
    }

    pub fn is_single_objective(&self) -> bool {
        self.single_objective
    }
}
