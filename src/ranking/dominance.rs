//! Pareto dominance relations.

use crate::error::{EvoResult, EvolveError};
use ndarray::{Array1, Array2, Axis};

/// Optimization direction of one objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

impl Sense {
    /// Multiplier mapping the objective onto minimization.
    pub fn sign(self) -> f64 {
        match self {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        }
    }
}

/// Returns `objectives` with maximized columns negated.
///
/// An empty `senses` slice means every objective is minimized.
pub fn to_minimization(objectives: &Array2<f64>, senses: &[Sense]) -> EvoResult<Array2<f64>> {
    if senses.is_empty() {
        return Ok(objectives.to_owned());
    }
    if senses.len() != objectives.ncols() {
        return Err(EvolveError::SizeMismatch {
            expected: objectives.ncols(),
            actual: senses.len(),
        });
    }
    let mut out = objectives.to_owned();
    for (mut col, sense) in out.columns_mut().into_iter().zip(senses) {
        col *= sense.sign();
    }
    Ok(out)
}

/// Total positive constraint violation per row.
///
/// NaN anywhere in a row's violations, or in its objectives when given,
/// yields `f64::INFINITY`.
pub fn violation_totals(
    objectives: Option<&Array2<f64>>,
    constraint_violation: &Array2<f64>,
) -> Array1<f64> {
    let mut totals = constraint_violation.map_axis(Axis(1), |row| {
        if row.iter().any(|v| v.is_nan()) {
            f64::INFINITY
        } else {
            row.iter().filter(|&&v| v > 0.0).sum()
        }
    });
    if let Some(objv) = objectives {
        for (total, row) in totals.iter_mut().zip(objv.rows()) {
            if row.iter().any(|v| v.is_nan()) {
                *total = f64::INFINITY;
            }
        }
    }
    totals
}

/// Dominance comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compares two objective vectors for Pareto dominance (minimization).
pub fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
        if a_better_in_some && b_better_in_some {
            return Dominance::Neither;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Returns true if `a` dominates `b` (minimization).
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

/// Feasibility-aware dominance.
///
/// - both feasible: plain Pareto dominance
/// - one feasible: the feasible one dominates
/// - both infeasible: the smaller total violation dominates
pub fn constrained_dominance(a: &[f64], va: f64, b: &[f64], vb: f64) -> Dominance {
    match (va <= 0.0, vb <= 0.0) {
        (true, true) => dominance_cmp(a, b),
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        (false, false) => {
            if va < vb {
                Dominance::Left
            } else if vb < va {
                Dominance::Right
            } else {
                Dominance::Neither
            }
        }
    }
}
