//! Problem evaluator interface.
//!
//! The engine hands a phenotype matrix (rows = individuals) to a problem and
//! expects an objective matrix back, optionally with a constraint-violation
//! matrix whose entries `<= 0` mean satisfied.
//!
//! # Calling conventions
//!
//! - [`Problem`]: whole-population form, one call per generation step
//! - [`RowProblem`]: single-individual form, wrapped by [`RowWise`] which
//!   calls it once per row (in parallel with the `parallel` feature) and
//!   stacks the results in row order
//!
//! [`FnProblem`] wraps a closure for quick setups.

mod evaluator;
mod types;
mod validate;

pub use evaluator::{FnProblem, Problem, RowProblem, RowWise};
pub use types::{Evaluation, ProblemDescriptor, RowEvaluation};
pub use validate::validate_evaluation;
