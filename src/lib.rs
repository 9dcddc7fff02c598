//! Evolutionary computation toolbox.
//!
//! Provides the building blocks of population-based optimization and a
//! shared generational loop on top of them:
//!
//! - **Codec**: binary/Gray, real/integer and permutation chromosomes,
//!   decoded onto bounded decision variables.
//! - **Population**: row-aligned chromosome, phenotype, objective,
//!   constraint-violation and fitness matrices with slicing and merging.
//! - **Ranking**: feasibility-aware Pareto dominance, fast non-dominated
//!   sorting with early cutoff, crowding distance and a bounded archive.
//! - **Operators**: mating selection, recombination, mutation and survivor
//!   rules, all pure functions of their input matrix.
//! - **Algorithms**: NSGA-II (with and without archive), an elitist
//!   single-objective GA and DE/rand/1/bin, with generation, time,
//!   evaluation and stagnation limits.
//! - **Indicators**: GD, IGD, hypervolume and spacing.
//!
//! # Architecture
//!
//! Problems plug in through the [`problem::Problem`] trait and never see the
//! population. Everything stochastic takes an explicit [`random::EvoRng`],
//! so a run is reproducible from its seed. Diagnostics go through `tracing`;
//! the crate never installs a subscriber.
//!
//! # Example
//!
//! ```
//! use u_evolve::algorithm::{optimize, AlgorithmConfig, Nsga2, OptimizeOptions};
//! use u_evolve::codec::{Encoding, Variable};
//! use u_evolve::problem::{Evaluation, FnProblem, ProblemDescriptor};
//! use ndarray::{Array2, Axis};
//!
//! let descriptor = ProblemDescriptor::new("schaffer", 2, vec![Variable::continuous(-10.0, 10.0)]);
//! let problem = FnProblem::new(descriptor, |x: &Array2<f64>| {
//!     let x = x.column(0);
//!     let objectives = ndarray::stack(
//!         Axis(1),
//!         &[x.mapv(|v| v * v).view(), x.mapv(|v| (v - 2.0).powi(2)).view()],
//!     )?;
//!     Ok(Evaluation::new(objectives))
//! });
//!
//! let config = AlgorithmConfig::default().with_population_size(20).with_max_generations(30);
//! let mut algorithm = Nsga2::new(problem, Encoding::RealInteger, config).unwrap();
//! let result = optimize(&mut algorithm, OptimizeOptions::default().with_seed(42)).unwrap();
//!
//! assert!(result.success);
//! for &x in result.variables.column(0) {
//!     assert!((-0.1..=2.1).contains(&x));
//! }
//! ```

pub mod algorithm;
pub mod codec;
pub mod error;
pub mod indicators;
pub mod operators;
pub mod population;
pub mod problem;
pub mod random;
pub mod ranking;
pub mod stats;
