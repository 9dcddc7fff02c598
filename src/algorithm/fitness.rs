//! Fitness assignment strategies.
//!
//! Fitness is a non-negative scalar per individual, higher is better, used
//! by mating selection and by environmental selection.

use crate::error::{EvoResult, EvolveError};
use crate::population::Population;
use crate::ranking::{
    crowding_distance, non_dominated_sort, order_fitness, to_minimization, total_order, Sense,
    SortLimit,
};
use ndarray::Array1;
use std::fmt::Debug;

/// Turns evaluated objectives and constraint violations into fitness.
pub trait FitnessStrategy: Send + Sync + Debug {
    /// Assigns fitness to every individual of `pop`.
    ///
    /// `keep` is a hint: when only the best `keep` individuals will survive,
    /// strategies may stop ranking early. Individuals left unranked must
    /// still receive fitness strictly lower than every ranked one.
    ///
    /// # Errors
    ///
    /// [`EvolveError::MissingObjectives`] if `pop` has not been evaluated.
    fn assign(&self, pop: &mut Population, senses: &[Sense], keep: Option<usize>)
        -> EvoResult<()>;
}

/// Non-domination level first, crowding distance second.
///
/// The resulting total order is converted to fitness `n - 1` (best) down to
/// 0, so truncation keeps whole fronts and breaks the critical front by
/// crowding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParetoFitness;

impl FitnessStrategy for ParetoFitness {
    fn assign(
        &self,
        pop: &mut Population,
        senses: &[Sense],
        keep: Option<usize>,
    ) -> EvoResult<()> {
        let objectives = pop.objectives().ok_or(EvolveError::MissingObjectives)?;
        let limit = keep.map_or(SortLimit::All, SortLimit::Count);
        let sorted = non_dominated_sort(
            objectives,
            Some(pop.constraint_violation()),
            senses,
            limit,
        )?;
        let minimized = to_minimization(objectives, senses)?;
        let distances = crowding_distance(&minimized, &sorted.levels);
        let order = total_order(&sorted.levels, &distances);
        pop.set_fitness(order_fitness(&order))
    }
}

/// Single-objective scaling.
///
/// - feasible: `1 + (worst - f) / (worst - best)`, in `[1, 2]`, or 2 for
///   every feasible individual when they all share one value
/// - infeasible with finite violation `v`: `0.5 / (1 + v / v_max)`, in
///   `[0.25, 0.5)`, so strictly below every feasible individual
/// - infinite violation (including NaN rows): 0
///
/// `f` is measured after mapping the objective onto minimization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaledFitness;

impl FitnessStrategy for ScaledFitness {
    fn assign(
        &self,
        pop: &mut Population,
        senses: &[Sense],
        _keep: Option<usize>,
    ) -> EvoResult<()> {
        let objectives = pop.objectives().ok_or(EvolveError::MissingObjectives)?;
        if objectives.ncols() != 1 {
            return Err(EvolveError::InvalidConfiguration(format!(
                "scaled fitness needs exactly one objective, got {}",
                objectives.ncols()
            )));
        }
        let sign = senses.first().copied().unwrap_or_default().sign();
        let values: Vec<f64> = objectives.column(0).iter().map(|v| v * sign).collect();
        let totals = pop.total_violation();

        let (mut best, mut worst) = (f64::INFINITY, f64::NEG_INFINITY);
        let mut worst_violation = 0.0f64;
        for (&f, &v) in values.iter().zip(totals.iter()) {
            if v <= 0.0 {
                best = best.min(f);
                worst = worst.max(f);
            } else if v.is_finite() {
                worst_violation = worst_violation.max(v);
            }
        }
        let range = worst - best;

        let fitness: Array1<f64> = values
            .iter()
            .zip(totals.iter())
            .map(|(&f, &v)| {
                if v <= 0.0 {
                    if range > 0.0 && range.is_finite() {
                        1.0 + (worst - f) / range
                    } else {
                        2.0
                    }
                } else if v.is_finite() && worst_violation > 0.0 {
                    // (0.25, 0.5): below every feasible row, above infinite violation.
                    0.5 / (1.0 + v / worst_violation)
                } else {
                    0.0
                }
            })
            .collect();
        pop.set_fitness(fitness)
    }
}
