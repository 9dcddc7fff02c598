//! Evaluator output validation.

use super::types::Evaluation;
use crate::error::{EvoResult, EvolveError};
use ndarray::Array2;
use tracing::warn;

/// Checks an evaluation against the expected shape.
///
/// Objectives must have `rows` rows and `n_objectives` columns, and the
/// constraint-violation matrix (if any) `rows` rows. Shape problems are
/// fatal. Non-finite values are only warned about; ranking then treats the
/// affected rows as infeasible.
pub fn validate_evaluation(
    evaluation: &Evaluation,
    rows: usize,
    n_objectives: usize,
) -> EvoResult<()> {
    let (n, m) = evaluation.objectives.dim();
    if n != rows || m != n_objectives {
        return Err(EvolveError::MalformedEvaluation(format!(
            "objectives must be {rows}x{n_objectives}, got {n}x{m}"
        )));
    }
    if let Some(cv) = &evaluation.constraint_violation {
        if cv.nrows() != rows {
            return Err(EvolveError::MalformedEvaluation(format!(
                "constraint violation must have {rows} rows, got {}",
                cv.nrows()
            )));
        }
    }

    let bad_objectives = count_non_finite(&evaluation.objectives);
    if bad_objectives > 0 {
        warn!(count = bad_objectives, "non-finite values in objectives");
    }
    if let Some(cv) = &evaluation.constraint_violation {
        let bad_constraints = count_non_finite(cv);
        if bad_constraints > 0 {
            warn!(count = bad_constraints, "non-finite values in constraint violations");
        }
    }
    Ok(())
}

fn count_non_finite(m: &Array2<f64>) -> usize {
    m.iter().filter(|v| !v.is_finite()).count()
}
