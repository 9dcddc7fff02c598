//! Dominance and ranking engine.
//!
//! Domain-agnostic Pareto machinery used by the multi-objective templates.
//!
//! # Algorithms
//!
//! - [`non_dominated_sort`]: feasibility-aware efficient non-dominated sort
//!   with optional cutoff ([`SortLimit`])
//! - [`crowding_distance`]: per-front crowding distance for diversity
//! - [`total_order`]: level first, crowding second; the truncation order
//! - [`NdArchive`]: running non-dominated archive (NDSet)
//!
//! # Conventions
//!
//! All comparisons are made on minimization-normalized objectives: columns
//! declared [`Sense::Maximize`] are multiplied by −1 first. A row is feasible
//! when its total positive constraint violation is zero. Rows containing NaN
//! (objective or violation) are treated as infeasible with infinite
//! violation, so they rank behind every row without NaN.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Zhang et al. (2015), "An Efficient Approach to Nondominated Sorting for
//!   Evolutionary Multiobjective Optimization"

mod archive;
mod crowding;
mod dominance;
mod sort;

pub use archive::{non_dominated_set, NdArchive};
pub use crowding::{crowding_distance, front_crowding_distance, order_fitness, total_order};
pub use dominance::{
    constrained_dominance, dominance_cmp, dominates, to_minimization, violation_totals,
    Dominance, Sense,
};
pub use sort::{non_dominated_sort, NdSortResult, SortLimit};
