//! Evolutionary algorithm templates.
//!
//! Every template is the same [`EvolutionLoop`] with a different
//! [`FitnessStrategy`], mating selection, variation pipeline and survivor
//! rule. Multi- and single-objective modes differ only in the fitness
//! strategy and in what is reported at the end.
//!
//! # Key Types
//!
//! - [`AlgorithmConfig`]: population size, termination limits, logging, presets
//! - [`EvolutionLoop`]: the generational loop and its state machine
//! - [`Nsga2`], [`Nsga2Archive`], [`Sega`], [`DifferentialEvolution`]: templates
//! - [`RunResult`], [`optimize`]: results and the one-call driver
//!
//! # References
//!
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*
//! - Storn & Price (1997), *Differential Evolution*

mod config;
mod evolution;
mod fitness;
mod result;
mod templates;

pub use config::AlgorithmConfig;
pub use evolution::{EvolutionLoop, GenerationCallback, GenerationView};
pub use fitness::{FitnessStrategy, ParetoFitness, ScaledFitness};
pub use result::{optimize, OptimizeOptions, RunResult};
pub use templates::{DifferentialEvolution, Nsga2, Nsga2Archive, Sega};
