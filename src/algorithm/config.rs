//! Algorithm configuration.
//!
//! [`AlgorithmConfig`] holds all parameters that control the evolutionary loop.

use crate::codec::BinaryOptions;
use crate::error::{EvoResult, EvolveError};
use crate::operators::Selection;
use crate::stats::Limits;
use std::time::Duration;

/// Configuration shared by every algorithm template.
///
/// At least one of `max_generations`, `max_time` and `max_evaluations` must
/// be set; this is checked when the loop first decides termination.
///
/// # Defaults
///
/// ```
/// use u_evolve::algorithm::AlgorithmConfig;
///
/// let config = AlgorithmConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_generations, Some(100));
/// assert_eq!(config.archive_capacity(), 500);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use std::time::Duration;
/// use u_evolve::algorithm::AlgorithmConfig;
/// use u_evolve::operators::Selection;
///
/// let config = AlgorithmConfig::default()
///     .with_population_size(100)
///     .with_max_time(Duration::from_secs(5))
///     .with_selection(Selection::Tournament(3))
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct AlgorithmConfig {
    /// Number of individuals kept between generations.
    pub population_size: usize,

    /// Stop after this many recorded generations (the initial population
    /// counts as the first).
    pub max_generations: Option<usize>,

    /// Stop once this much search time has elapsed. Logging and callbacks
    /// are not charged.
    pub max_time: Option<Duration>,

    /// Stop once this many individuals have been evaluated.
    pub max_evaluations: Option<usize>,

    /// Single-objective only: stop after this many consecutive generations
    /// whose best value moved less than `stagnation_tolerance`.
    pub max_stagnation: Option<usize>,

    /// Minimum change of the best value that resets the stagnation counter.
    pub stagnation_tolerance: f64,

    /// Log every `log_period` generations. 0 disables the log.
    pub log_period: usize,

    /// Mating selection.
    pub selection: Selection,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to evaluate through [`Problem::evaluate_par`](crate::problem::Problem::evaluate_par).
    pub parallel: bool,

    /// Emit every log row through `tracing::info!`.
    pub verbose: bool,

    /// Archive capacity for archive-based templates. `None` means ten times
    /// the population size.
    pub archive_size: Option<usize>,

    /// Codec options for binary/Gray encodings.
    pub binary: BinaryOptions,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: Some(100),
            max_time: None,
            max_evaluations: None,
            max_stagnation: None,
            stagnation_tolerance: 1e-6,
            log_period: 1,
            selection: Selection::default(),
            seed: None,
            parallel: false,
            verbose: false,
            archive_size: None,
            binary: BinaryOptions::default(),
        }
    }
}

impl AlgorithmConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    /// Sets the time limit.
    pub fn with_max_time(mut self, limit: Duration) -> Self {
        self.max_time = Some(limit);
        self
    }

    /// Sets the evaluation budget.
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = Some(n);
        self
    }

    /// Sets the stagnation limit and tolerance.
    pub fn with_stagnation(mut self, generations: usize, tolerance: f64) -> Self {
        self.max_stagnation = Some(generations);
        self.stagnation_tolerance = tolerance.max(0.0);
        self
    }

    /// Clears every termination limit.
    pub fn without_limits(mut self) -> Self {
        self.max_generations = None;
        self.max_time = None;
        self.max_evaluations = None;
        self.max_stagnation = None;
        self
    }

    /// Sets the log period (0 disables logging).
    pub fn with_log_period(mut self, period: usize) -> Self {
        self.log_period = period;
        self
    }

    /// Sets the mating selection.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables or disables per-row log output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the archive capacity.
    pub fn with_archive_size(mut self, n: usize) -> Self {
        self.archive_size = Some(n);
        self
    }

    /// Sets the binary/Gray codec options.
    pub fn with_binary(mut self, binary: BinaryOptions) -> Self {
        self.binary = binary;
        self
    }

    /// Effective archive capacity.
    pub fn archive_capacity(&self) -> usize {
        self.archive_size
            .unwrap_or_else(|| self.population_size.saturating_mul(10))
    }

    /// Termination limits for the tracker.
    pub fn limits(&self) -> Limits {
        Limits {
            max_generations: self.max_generations,
            max_time: self.max_time,
            max_evaluations: self.max_evaluations,
            max_stagnation: self.max_stagnation,
            stagnation_tolerance: self.stagnation_tolerance,
        }
    }

    /// Preset for fast runs: small population, 100 generations, 10s.
    pub fn fast() -> Self {
        Self {
            population_size: 30,
            max_generations: Some(100),
            max_time: Some(Duration::from_secs(10)),
            ..Self::default()
        }
    }

    /// Preset balancing quality and time: 100 individuals, 300 generations, 30s.
    pub fn balanced() -> Self {
        Self {
            population_size: 100,
            max_generations: Some(300),
            max_time: Some(Duration::from_secs(30)),
            ..Self::default()
        }
    }

    /// Preset for quality: 200 individuals, 500 generations, 60s.
    pub fn quality() -> Self {
        Self {
            population_size: 200,
            max_generations: Some(500),
            max_time: Some(Duration::from_secs(60)),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Termination-limit presence is deliberately not checked here.
    pub fn validate(&self) -> EvoResult<()> {
        let invalid = |msg: &str| Err(EvolveError::InvalidConfiguration(msg.into()));
        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if self.max_generations == Some(0) {
            return invalid("max_generations must be at least 1 or None");
        }
        if self.max_time == Some(Duration::ZERO) {
            return invalid("max_time must be positive or None");
        }
        if self.max_evaluations == Some(0) {
            return invalid("max_evaluations must be at least 1 or None");
        }
        if !(self.stagnation_tolerance >= 0.0) {
            return invalid("stagnation_tolerance must be non-negative");
        }
        if self.archive_size == Some(0) {
            return invalid("archive_size must be positive or None");
        }
        if let Selection::Tournament(0) = self.selection {
            return invalid("tournament size must be at least 1");
        }
        Ok(())
    }
}
