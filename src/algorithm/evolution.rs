//! The generational loop shared by every template.
//!
//! [`EvolutionLoop`] orchestrates the complete process:
//! initialization → evaluation → fitness → selection → variation →
//! evaluation → merge → survivor selection → repeat.

use super::config::AlgorithmConfig;
use super::fitness::FitnessStrategy;
use super::result::RunResult;
use crate::codec::{DecodeField, Encoding};
use crate::error::{EvoResult, EvolveError};
use crate::operators::{Selection, Survivor, Variation};
use crate::population::Population;
use crate::problem::{validate_evaluation, Problem};
use crate::random::{rng_from_seed, EvoRng};
use crate::ranking::{non_dominated_set, to_minimization, NdArchive, Sense};
use crate::stats::{
    AlgorithmState, GenerationOutcome, LogEntry, LogValues, LoopState, StopReason, Tracker,
};
use ndarray::{Array2, Axis};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a per-generation callback sees.
#[derive(Debug)]
pub struct GenerationView<'a> {
    /// Counters after the generation was booked.
    pub state: &'a AlgorithmState,
    /// The current population, evaluated and with fitness assigned.
    pub population: &'a Population,
    /// Whether the generation counted.
    pub outcome: GenerationOutcome,
    /// The log row written for this generation, if any.
    pub log: Option<&'a LogEntry>,
}

/// Callback invoked once per generation before the termination decision.
///
/// Returning an error aborts the run with that error.
pub type GenerationCallback = Box<dyn FnMut(&GenerationView<'_>) -> EvoResult<()> + Send>;

/// A configurable evolutionary loop.
///
/// Templates such as [`Nsga2`](super::Nsga2) only pick the fitness strategy
/// and operators; the loop itself is the same for all of them.
///
/// # Usage
///
/// ```
/// use u_evolve::algorithm::{AlgorithmConfig, Nsga2};
/// use u_evolve::codec::{Encoding, Variable};
/// use u_evolve::problem::{Evaluation, FnProblem, ProblemDescriptor};
/// use ndarray::{Array2, Axis};
///
/// let descriptor = ProblemDescriptor::new("schaffer", 2, vec![Variable::continuous(-10.0, 10.0)]);
/// let problem = FnProblem::new(descriptor, |x: &Array2<f64>| {
///     let x = x.column(0);
///     let f1 = x.mapv(|v| v * v);
///     let f2 = x.mapv(|v| (v - 2.0).powi(2));
///     Ok(Evaluation::new(ndarray::stack(Axis(1), &[f1.view(), f2.view()])?))
/// });
///
/// let config = AlgorithmConfig::default()
///     .with_population_size(20)
///     .with_max_generations(10)
///     .with_seed(42);
/// let mut algorithm = Nsga2::new(problem, Encoding::RealInteger, config).unwrap();
/// let result = algorithm.run(None).unwrap();
///
/// assert!(result.success);
/// assert_eq!(result.generations, 10);
/// ```
pub struct EvolutionLoop<P> {
    name: String,
    problem: P,
    config: AlgorithmConfig,
    encoding: Encoding,
    field: Arc<DecodeField>,
    senses: Vec<Sense>,
    single_objective: bool,
    reference: Option<Array2<f64>>,
    fitness: Box<dyn FitnessStrategy>,
    selection: Option<Selection>,
    variation: Variation,
    survivor: Survivor,
    archive: Option<NdArchive>,
    use_archive: bool,
    callback: Option<GenerationCallback>,
    cancel: Option<Arc<AtomicBool>>,
    lifecycle: LoopState,
    tracker: Tracker,
    rng: EvoRng,
    /// Best-ever feasible individual and its minimization-space value.
    best: Option<(Population, f64)>,
}

impl<P: Problem> EvolutionLoop<P> {
    /// Creates a loop with the configured mating selection, the default
    /// operators for `encoding` and truncation survivors.
    ///
    /// # Errors
    ///
    /// Invalid problem descriptor, invalid configuration, or variables that
    /// `encoding` cannot represent.
    pub fn new(
        name: impl Into<String>,
        problem: P,
        encoding: Encoding,
        config: AlgorithmConfig,
        fitness: impl FitnessStrategy + 'static,
    ) -> EvoResult<Self> {
        let descriptor = problem.descriptor();
        descriptor.validate()?;
        config.validate()?;

        let field = Arc::new(DecodeField::new(
            encoding,
            descriptor.variables.clone(),
            &config.binary,
        )?);
        let senses = descriptor.senses.clone();
        let single_objective = descriptor.is_single_objective();
        let reference = problem
            .reference_front()
            .map(|front| to_minimization(&front, &senses))
            .transpose()?;
        let tracker = Tracker::new(
            config.limits(),
            single_objective,
            config.log_period,
            config.verbose,
        );
        let rng = rng_from_seed(config.seed);

        Ok(Self {
            name: name.into(),
            problem,
            selection: Some(config.selection),
            config,
            encoding,
            field,
            senses,
            single_objective,
            reference,
            fitness: Box::new(fitness),
            variation: Variation::for_encoding(encoding),
            survivor: Survivor::Truncation,
            archive: None,
            use_archive: false,
            callback: None,
            cancel: None,
            lifecycle: LoopState::Uninitialized,
            tracker,
            rng,
            best: None,
        })
    }

    /// Replaces the mating selection.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Uses the population itself, in order, as the mating pool.
    pub fn without_mating_selection(mut self) -> Self {
        self.selection = None;
        self
    }

    /// Replaces the recombination/mutation pipeline.
    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variation = variation;
        self
    }

    /// Replaces environmental selection.
    pub fn with_survivor(mut self, survivor: Survivor) -> Self {
        self.survivor = survivor;
        self
    }

    /// Keeps a non-dominated archive of capacity
    /// [`AlgorithmConfig::archive_capacity`] and reports it as the result.
    pub fn with_archive(mut self) -> Self {
        self.use_archive = true;
        self
    }

    /// Registers a per-generation callback. Time spent inside it does not
    /// count towards the time limit.
    pub fn on_generation<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&GenerationView<'_>) -> EvoResult<()> + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Stops the run at the next generation boundary once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Overrides the seed for subsequent runs.
    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
    }

    /// Overrides per-row log output for subsequent runs.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn config(&self) -> &AlgorithmConfig {
        &self.config
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn field(&self) -> &DecodeField {
        &self.field
    }

    /// Counters of the current or last run.
    pub fn state(&self) -> &AlgorithmState {
        self.tracker.state()
    }

    pub fn lifecycle(&self) -> LoopState {
        self.lifecycle
    }

    /// The archive of the current or last run, if this loop keeps one.
    pub fn archive(&self) -> Option<&NdArchive> {
        self.archive.as_ref()
    }

    /// Runs to termination.
    ///
    /// `prior` rows are used as the first individuals of the initial
    /// population (as chromosomes); extra rows are dropped.
    ///
    /// # Errors
    ///
    /// Configuration errors, malformed or failed evaluations, and callback
    /// failures. A run without any feasible solution is not an error: it
    /// returns a result with `success == false`.
    pub fn run(&mut self, prior: Option<&Array2<f64>>) -> EvoResult<RunResult> {
        self.initialization()?;
        let mut population = self.initial_population(prior)?;
        self.lifecycle = LoopState::Evolving;

        loop {
            if let Some(reason) = self.terminated(&population)? {
                return self.finish(population, reason);
            }
            population = self.generation(population)?;
        }
    }

    fn initialization(&mut self) -> EvoResult<()> {
        self.tracker = Tracker::new(
            self.config.limits(),
            self.single_objective,
            self.config.log_period,
            self.config.verbose,
        );
        self.rng = rng_from_seed(self.config.seed);
        self.best = None;
        self.archive = if self.use_archive {
            Some(NdArchive::new(
                self.config.archive_capacity(),
                self.senses.clone(),
            )?)
        } else {
            None
        };
        info!(
            algorithm = %self.name,
            problem = %self.problem.descriptor().name,
            encoding = %self.encoding,
            population = self.config.population_size,
            "starting evolution"
        );
        self.tracker.start();
        self.lifecycle = LoopState::Initialized;
        Ok(())
    }

    fn initial_population(&mut self, prior: Option<&Array2<f64>>) -> EvoResult<Population> {
        let mut pop = Population::new(
            self.encoding,
            Arc::clone(&self.field),
            self.config.population_size,
        )?;
        match prior {
            Some(prior) => pop.initialize_with_prior(prior, &mut self.rng)?,
            None => pop.initialize(None, &mut self.rng)?,
        }
        self.evaluate(&mut pop)?;
        self.fitness.assign(&mut pop, &self.senses, None)?;
        Ok(pop)
    }

    fn evaluate(&mut self, pop: &mut Population) -> EvoResult<()> {
        let phenotype = pop.phenotype().ok_or(EvolveError::MissingChromosome)?;
        let evaluation = if self.config.parallel {
            self.problem.evaluate_par(phenotype)?
        } else {
            self.problem.evaluate(phenotype)?
        };
        validate_evaluation(
            &evaluation,
            pop.len(),
            self.problem.descriptor().n_objectives,
        )?;
        pop.set_evaluation(evaluation.objectives, evaluation.constraint_violation)?;
        self.tracker.add_evaluations(pop.len());
        debug!(rows = pop.len(), "population evaluated");
        Ok(())
    }

    fn generation(&mut self, pop: Population) -> EvoResult<Population> {
        let n = self.config.population_size;
        let chromosome = pop.chromosome().ok_or(EvolveError::MissingChromosome)?;

        let pool = match self.selection {
            Some(selection) => {
                let parents = selection.select(pop.fitness(), n, &mut self.rng)?;
                chromosome.select(Axis(0), &parents)
            }
            None => chromosome.to_owned(),
        };
        debug!(pool = pool.nrows(), "mating pool selected");

        let offspring = self.variation.apply(&pool, &self.field, &mut self.rng)?;
        let mut offspring =
            Population::from_chromosome(self.encoding, Arc::clone(&self.field), offspring)?;
        debug!(offspring = offspring.len(), "offspring created");
        self.evaluate(&mut offspring)?;

        let mut merged = pop.concat(&offspring)?;
        self.fitness.assign(&mut merged, &self.senses, Some(n))?;
        let survivors = self.survivor.select(merged.fitness(), n)?;
        let next = merged.subset(&survivors)?;
        debug!(size = next.len(), "survivors selected");
        Ok(next)
    }

    /// Books the generation, logs, runs the callback and decides termination.
    fn terminated(&mut self, pop: &Population) -> EvoResult<Option<StopReason>> {
        let outcome = self.record(pop)?;

        if outcome == GenerationOutcome::Recorded {
            if let Some(archive) = self.archive.as_mut() {
                archive.update(pop)?;
            }
            if self.tracker.log_due() {
                self.write_log(pop)?;
            }
        }
        self.notify(pop, outcome)?;

        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            self.tracker.stop(StopReason::Cancelled);
            info!(algorithm = %self.name, "evolution cancelled");
            return Ok(Some(StopReason::Cancelled));
        }

        let reason = self.tracker.check()?;
        if let Some(reason) = reason {
            let state = self.tracker.state();
            info!(
                algorithm = %self.name,
                generations = state.generation,
                evaluations = state.evaluations,
                "stopping: {reason}"
            );
        }
        Ok(reason)
    }

    fn record(&mut self, pop: &Population) -> EvoResult<GenerationOutcome> {
        if !self.single_objective {
            self.tracker.record(GenerationOutcome::Recorded, None);
            return Ok(GenerationOutcome::Recorded);
        }

        let objectives = pop.objectives().ok_or(EvolveError::MissingObjectives)?;
        let totals = pop.total_violation();
        let sign = self.senses.first().copied().unwrap_or_default().sign();
        let value = |i: usize| objectives[[i, 0]] * sign;
        let generation_best = (0..pop.len())
            .filter(|&i| totals[i] <= 0.0)
            .min_by(|&a, &b| value(a).total_cmp(&value(b)));

        let Some(i) = generation_best else {
            debug!("no feasible individual, generation forgotten");
            self.tracker
                .record(GenerationOutcome::SkippedInfeasible, None);
            return Ok(GenerationOutcome::SkippedInfeasible);
        };

        let candidate = value(i);
        if self.best.as_ref().map_or(true, |(_, best)| candidate < *best) {
            self.best = Some((pop.subset(&[i])?, candidate));
        }
        let best = self.best.as_ref().map(|(_, best)| *best);
        self.tracker.record(GenerationOutcome::Recorded, best);
        Ok(GenerationOutcome::Recorded)
    }

    fn write_log(&mut self, pop: &Population) -> EvoResult<()> {
        if self.single_objective {
            let sign = self.senses.first().copied().unwrap_or_default().sign();
            let objectives = pop.objectives().ok_or(EvolveError::MissingObjectives)?;
            let feasible: Vec<f64> = objectives
                .column(0)
                .iter()
                .zip(pop.feasible_mask())
                .filter(|(_, ok)| *ok)
                .map(|(&v, _)| v)
                .collect();
            let best = self.best.as_ref().map(|(_, best)| best * sign);
            self.tracker
                .log_with(|| LogValues::single(&feasible, best));
        } else {
            let front = self.current_front(pop)?;
            let reference = self.reference.as_ref();
            self.tracker.log_with(|| LogValues::multi(&front, reference));
        }
        Ok(())
    }

    /// Minimization-space objectives of the best-known front.
    fn current_front(&self, pop: &Population) -> EvoResult<Array2<f64>> {
        let front = match self.archive.as_ref().and_then(NdArchive::members) {
            Some(members) => members.clone(),
            None => non_dominated_set(pop, &self.senses)?,
        };
        minimized_objectives(&front, &self.senses)
    }

    fn notify(&mut self, pop: &Population, outcome: GenerationOutcome) -> EvoResult<()> {
        let Some(callback) = self.callback.as_mut() else {
            return Ok(());
        };
        let state = self.tracker.state().clone();
        let recorded = outcome == GenerationOutcome::Recorded;
        let log = self
            .tracker
            .log()
            .and_then(<[LogEntry]>::last)
            .filter(|entry| recorded && entry.generation == state.generation)
            .cloned();
        let view = GenerationView {
            state: &state,
            population: pop,
            outcome,
            log: log.as_ref(),
        };
        self.tracker.excluding(|| callback(&view))
    }

    fn finish(&mut self, last: Population, reason: StopReason) -> EvoResult<RunResult> {
        if self.tracker.log_pending() {
            self.write_log(&last)?;
        }

        let optimal = if self.single_objective {
            match &self.best {
                Some((individual, _)) => individual.clone(),
                None => last.subset(&[])?,
            }
        } else {
            match self.archive.as_ref().and_then(NdArchive::members) {
                Some(members) => members.clone(),
                None => non_dominated_set(&last, &self.senses)?,
            }
        };

        let success = !optimal.is_empty();
        if !success {
            warn!(algorithm = %self.name, "no feasible solution found");
        }
        let indicators = if self.single_objective {
            None
        } else {
            let front = minimized_objectives(&optimal, &self.senses)?;
            Some(LogValues::multi(&front, self.reference.as_ref()))
        };

        let n_vars = self.field.n_vars();
        let n_objectives = self.senses.len();
        let variables = optimal
            .phenotype()
            .cloned()
            .unwrap_or_else(|| Array2::zeros((0, n_vars)));
        let objectives = optimal
            .objectives()
            .cloned()
            .unwrap_or_else(|| Array2::zeros((0, n_objectives)));
        let constraint_violation = optimal.constraint_violation().clone();

        self.lifecycle = LoopState::Terminated;
        let state = self.tracker.state().clone();
        info!(
            algorithm = %self.name,
            success,
            solutions = optimal.len(),
            elapsed_ms = state.elapsed.as_millis() as u64,
            "evolution finished"
        );

        Ok(RunResult {
            success,
            stop_reason: reason,
            optimal,
            last,
            variables,
            objectives,
            constraint_violation,
            elapsed: state.elapsed,
            evaluations: state.evaluations,
            generations: state.generation,
            log: self.tracker.take_log(),
            indicators,
        })
    }
}

fn minimized_objectives(pop: &Population, senses: &[Sense]) -> EvoResult<Array2<f64>> {
    match pop.objectives() {
        Some(objectives) => to_minimization(objectives, senses),
        None => Ok(Array2::zeros((0, senses.len()))),
    }
}

impl<P> fmt::Debug for EvolutionLoop<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvolutionLoop")
            .field("name", &self.name)
            .field("encoding", &self.encoding)
            .field("config", &self.config)
            .field("fitness", &self.fitness)
            .field("selection", &self.selection)
            .field("variation", &self.variation)
            .field("survivor", &self.survivor)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}
