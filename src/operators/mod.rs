//! Variation and selection operators.
//!
//! Every operator is a pure function of its input matrix: it returns a new
//! chromosome and never mutates the one it was given. Operators are keyed by
//! encoding and reject fields they cannot handle.
//!
//! # Key Types
//!
//! - [`Selection`]: mating selection over fitness (higher is better)
//! - [`Recombination`], [`Mutation`]: object-safe operator traits
//! - [`Variation`]: a recombination followed by an optional mutation
//! - [`Survivor`]: environmental selection after parents and offspring merge

mod mutation;
mod permutation;
mod recombination;
mod selection;
mod survivor;
mod variation;

pub use mutation::{BitFlip, GaussianMutation, InversionMutation, PolynomialMutation, SwapMutation};
pub use recombination::{
    DeRand1Bin, OrderCrossover, PmxCrossover, SbxCrossover, TwoPointCrossover, UniformCrossover,
};
pub use selection::Selection;
pub use survivor::Survivor;
pub use variation::Variation;

use crate::codec::{DecodeField, Encoding};
use crate::error::{EvoResult, EvolveError};
use crate::random::EvoRng;
use ndarray::Array2;

/// Produces offspring rows from a mating pool.
///
/// The output row count may differ from the input (see `half` modes).
pub trait Recombination: Send + Sync + std::fmt::Debug {
    /// Operator name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Recombines the rows of `chromosome`.
    fn recombine(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>>;
}

/// Perturbs offspring rows.
pub trait Mutation: Send + Sync + std::fmt::Debug {
    /// Operator name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Returns a mutated copy of `chromosome`.
    fn mutate(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>>;
}

pub(crate) fn ensure_encoding(
    operator: &str,
    supported: &[Encoding],
    field: &DecodeField,
) -> EvoResult<()> {
    if supported.contains(&field.encoding()) {
        Ok(())
    } else {
        Err(EvolveError::UnsupportedEncoding(format!(
            "{operator} does not support {}",
            field.encoding()
        )))
    }
}

/// Clamps real-integer genes into bounds and rounds discrete ones.
pub(crate) fn repair_real(chromosome: &mut Array2<f64>, field: &DecodeField) {
    if field.encoding() != Encoding::RealInteger {
        return;
    }
    for mut row in chromosome.rows_mut() {
        for (x, var) in row.iter_mut().zip(field.variables()) {
            *x = var.repair(*x);
        }
    }
}
