//! Population data model.
//!
//! A [`Population`] owns the per-individual matrices of a fixed-size group of
//! candidate solutions: chromosome, decoded phenotype, objective values,
//! constraint violations, and fitness. All matrices share the same row
//! order; slicing, concatenation and shuffling always move whole rows.
//!
//! Evaluation state is explicit: `phenotype` and `objectives` are `None`
//! until computed, and every chromosome change clears them again.

mod matrix;
#[allow(clippy::module_inception)]
mod population;

pub use matrix::resolve_indices;
pub use population::Population;
