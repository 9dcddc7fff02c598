//! Run results and the one-call driver.

use super::evolution::EvolutionLoop;
use crate::error::EvoResult;
use crate::population::Population;
use crate::problem::Problem;
use crate::stats::{LogEntry, LogValues, StopReason};
use ndarray::Array2;
use std::time::Duration;
use tracing::info;

/// Outcome of a finished run.
///
/// `success` is false when no feasible solution was found. `optimal` is then
/// empty, so check it before indexing.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// True when at least one feasible solution was found.
    pub success: bool,
    pub stop_reason: StopReason,
    /// Feasible non-dominated set (multi-objective) or best-ever individual
    /// (single-objective).
    pub optimal: Population,
    /// The population of the final generation.
    pub last: Population,
    /// Decoded variables of `optimal`.
    pub variables: Array2<f64>,
    /// Objectives of `optimal`, in the problem's own direction.
    pub objectives: Array2<f64>,
    /// Constraint violations of `optimal`.
    pub constraint_violation: Array2<f64>,
    /// Search time, excluding logging and callbacks.
    pub elapsed: Duration,
    pub evaluations: usize,
    /// Recorded generations.
    pub generations: usize,
    /// The run log, `None` when logging was disabled.
    pub log: Option<Vec<LogEntry>>,
    /// Indicators of `optimal` (multi-objective only).
    pub indicators: Option<LogValues>,
}

/// Per-call overrides for [`optimize`].
#[derive(Debug, Clone, Default)]
pub struct OptimizeOptions {
    /// Seed overriding the configured one.
    pub seed: Option<u64>,
    /// Chromosomes injected into the initial population.
    pub prior_knowledge: Option<Array2<f64>>,
    /// Overrides the configured per-row log output.
    pub verbose: Option<bool>,
}

impl OptimizeOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_prior_knowledge(mut self, prior: Array2<f64>) -> Self {
        self.prior_knowledge = Some(prior);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
}

/// Runs `algorithm` once with the given overrides and reports a summary
/// through `tracing`.
///
/// # Example
///
/// ```
/// use u_evolve::algorithm::{optimize, AlgorithmConfig, OptimizeOptions, Sega};
/// use u_evolve::codec::{Encoding, Variable};
/// use u_evolve::problem::{Evaluation, FnProblem, ProblemDescriptor};
/// use ndarray::{Array2, Axis};
///
/// let descriptor = ProblemDescriptor::new("sphere", 1, vec![Variable::continuous(-1.0, 1.0); 2]);
/// let problem = FnProblem::new(descriptor, |x: &Array2<f64>| {
///     Ok(Evaluation::new(x.map_axis(Axis(1), |r| r.dot(&r)).insert_axis(Axis(1))))
/// });
/// let mut algorithm = Sega::new(problem, Encoding::RealInteger, AlgorithmConfig::fast()).unwrap();
///
/// let result = optimize(&mut algorithm, OptimizeOptions::default().with_seed(1)).unwrap();
/// assert!(result.success);
/// ```
pub fn optimize<P: Problem>(
    algorithm: &mut EvolutionLoop<P>,
    options: OptimizeOptions,
) -> EvoResult<RunResult> {
    if let Some(seed) = options.seed {
        algorithm.set_seed(seed);
    }
    if let Some(verbose) = options.verbose {
        algorithm.set_verbose(verbose);
    }
    let result = algorithm.run(options.prior_knowledge.as_ref())?;

    info!(
        algorithm = algorithm.name(),
        problem = %algorithm.problem().descriptor().name,
        evaluations = result.evaluations,
        generations = result.generations,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "finished: {}",
        result.stop_reason
    );
    if result.success {
        if let Some(LogValues::Multi { hv, .. }) = &result.indicators {
            info!(solutions = result.optimal.len(), hv, "non-dominated set");
        } else if result.objectives.nrows() > 0 {
            info!(best = ?result.objectives.row(0).to_vec(), "best objective");
        }
    }
    Ok(result)
}
