//! Ready-made algorithm templates.
//!
//! Each template is a constructor that wires a fitness strategy and
//! operators into an [`EvolutionLoop`]. The returned loop can still be
//! customized with its `with_*` methods.

use super::config::AlgorithmConfig;
use super::evolution::EvolutionLoop;
use super::fitness::{ParetoFitness, ScaledFitness};
use crate::codec::Encoding;
use crate::error::{EvoResult, EvolveError};
use crate::operators::{DeRand1Bin, PolynomialMutation, Survivor, Variation};
use crate::problem::Problem;

/// NSGA-II: non-domination level plus crowding distance, elitist
/// truncation of parents and offspring.
///
/// Reference: Deb et al. (2002), "A fast and elitist multiobjective genetic
/// algorithm: NSGA-II"
#[derive(Debug, Clone, Copy)]
pub struct Nsga2;

impl Nsga2 {
    pub fn new<P: Problem>(
        problem: P,
        encoding: Encoding,
        config: AlgorithmConfig,
    ) -> EvoResult<EvolutionLoop<P>> {
        EvolutionLoop::new("NSGA-II", problem, encoding, config, ParetoFitness)
    }
}

/// NSGA-II that also keeps a bounded archive of every non-dominated
/// solution seen, reported as the final result.
///
/// The archive capacity is [`AlgorithmConfig::archive_capacity`]; overflow
/// removes the most crowded members first.
#[derive(Debug, Clone, Copy)]
pub struct Nsga2Archive;

impl Nsga2Archive {
    pub fn new<P: Problem>(
        problem: P,
        encoding: Encoding,
        config: AlgorithmConfig,
    ) -> EvoResult<EvolutionLoop<P>> {
        Ok(EvolutionLoop::new("NSGA-II-archive", problem, encoding, config, ParetoFitness)?
            .with_archive())
    }
}

/// Strengthened elitist GA for single-objective problems.
///
/// Offspring compete with their parents; the best `N` of the merged set
/// survive, so the best individual is never lost.
#[derive(Debug, Clone, Copy)]
pub struct Sega;

impl Sega {
    /// # Errors
    ///
    /// [`EvolveError::InvalidConfiguration`] for multi-objective problems.
    pub fn new<P: Problem>(
        problem: P,
        encoding: Encoding,
        config: AlgorithmConfig,
    ) -> EvoResult<EvolutionLoop<P>> {
        require_single_objective("SEGA", &problem)?;
        EvolutionLoop::new("SEGA", problem, encoding, config, ScaledFitness)
    }
}

/// DE/rand/1/bin for real-valued single-objective problems.
///
/// Every individual produces one trial vector, which replaces it when at
/// least as fit.
///
/// Reference: Storn & Price (1997), "Differential Evolution: A Simple and
/// Efficient Heuristic for Global Optimization over Continuous Spaces"
#[derive(Debug, Clone, Copy)]
pub struct DifferentialEvolution;

impl DifferentialEvolution {
    /// Uses `F = 0.5` and `CR = 0.5`.
    pub fn new<P: Problem>(
        problem: P,
        encoding: Encoding,
        config: AlgorithmConfig,
    ) -> EvoResult<EvolutionLoop<P>> {
        Self::with_parameters(problem, encoding, config, DeRand1Bin::default())
    }

    /// # Errors
    ///
    /// [`EvolveError::UnsupportedEncoding`] unless `encoding` is real/integer,
    /// [`EvolveError::InvalidConfiguration`] for multi-objective problems.
    pub fn with_parameters<P: Problem>(
        problem: P,
        encoding: Encoding,
        config: AlgorithmConfig,
        operator: DeRand1Bin,
    ) -> EvoResult<EvolutionLoop<P>> {
        if encoding != Encoding::RealInteger {
            return Err(EvolveError::UnsupportedEncoding(format!(
                "differential evolution needs {}, got {encoding}",
                Encoding::RealInteger
            )));
        }
        require_single_objective("DE/rand/1/bin", &problem)?;
        Ok(
            EvolutionLoop::new("DE/rand/1/bin", problem, encoding, config, ScaledFitness)?
                .without_mating_selection()
                .with_variation(Variation::new(operator))
                .with_survivor(Survivor::OneToOne),
        )
    }

    /// DE followed by polynomial mutation, useful on discrete variables.
    pub fn with_mutation<P: Problem>(
        problem: P,
        config: AlgorithmConfig,
        mutation: PolynomialMutation,
    ) -> EvoResult<EvolutionLoop<P>> {
        require_single_objective("DE/rand/1/bin", &problem)?;
        Ok(EvolutionLoop::new(
            "DE/rand/1/bin",
            problem,
            Encoding::RealInteger,
            config,
            ScaledFitness,
        )?
        .without_mating_selection()
        .with_variation(Variation::new(DeRand1Bin::default()).with_mutation(mutation))
        .with_survivor(Survivor::OneToOne))
    }
}

fn require_single_objective<P: Problem>(template: &str, problem: &P) -> EvoResult<()> {
    let m = problem.descriptor().n_objectives;
    if m != 1 {
        return Err(EvolveError::InvalidConfiguration(format!(
            "{template} handles exactly one objective, problem has {m}"
        )));
    }
    Ok(())
}
