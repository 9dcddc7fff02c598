//! Evaluator traits and adapters.

use super::types::{Evaluation, ProblemDescriptor, RowEvaluation};
use crate::error::{EvoResult, EvolveError};
use ndarray::{Array2, ArrayView1};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A problem evaluated over the whole phenotype matrix at once.
///
/// `Problem` must be `Send + Sync` because row-wise adapters may evaluate
/// individuals in parallel using rayon.
///
/// # Implementing
///
/// ```
/// use ndarray::{Array2, Axis};
/// use u_evolve::codec::Variable;
/// use u_evolve::error::EvoResult;
/// use u_evolve::problem::{Evaluation, Problem, ProblemDescriptor};
///
/// struct Sphere(ProblemDescriptor);
///
/// impl Problem for Sphere {
///     fn descriptor(&self) -> &ProblemDescriptor {
///         &self.0
///     }
///
///     fn evaluate(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation> {
///         let f = phenotype.map_axis(Axis(1), |x| x.dot(&x));
///         Ok(Evaluation::new(f.insert_axis(Axis(1))))
///     }
/// }
///
/// let p = Sphere(ProblemDescriptor::new("sphere", 1, vec![Variable::continuous(-1.0, 1.0); 3]));
/// let eval = p.evaluate(&ndarray::array![[1.0, 1.0, 0.0]]).unwrap();
/// assert_eq!(eval.objectives[[0, 0]], 2.0);
/// ```
pub trait Problem: Send + Sync {
    /// Static metadata: objective count, senses, variables.
    fn descriptor(&self) -> &ProblemDescriptor;

    /// Evaluates every row of `phenotype`.
    ///
    /// Errors propagate unchanged and abort the run.
    fn evaluate(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation>;

    /// Evaluates with parallelism where the implementation supports it.
    ///
    /// Called instead of [`evaluate`](Self::evaluate) when the algorithm is
    /// configured for parallel evaluation.
    fn evaluate_par(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation> {
        self.evaluate(phenotype)
    }

    /// Known Pareto front (or optimum) in objective space, if any.
    fn reference_front(&self) -> Option<Array2<f64>> {
        None
    }
}

impl<P: Problem + ?Sized> Problem for Box<P> {
    fn descriptor(&self) -> &ProblemDescriptor {
        (**self).descriptor()
    }

    fn evaluate(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation> {
        (**self).evaluate(phenotype)
    }

    fn evaluate_par(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation> {
        (**self).evaluate_par(phenotype)
    }

    fn reference_front(&self) -> Option<Array2<f64>> {
        (**self).reference_front()
    }
}

/// A problem that can only evaluate one individual at a time.
pub trait RowProblem: Send + Sync {
    /// Static metadata.
    fn descriptor(&self) -> &ProblemDescriptor;

    /// Evaluates one decision vector.
    fn evaluate_row(&self, x: ArrayView1<f64>) -> EvoResult<RowEvaluation>;

    /// Known Pareto front (or optimum) in objective space, if any.
    fn reference_front(&self) -> Option<Array2<f64>> {
        None
    }
}

/// Adapts a [`RowProblem`] to the whole-population [`Problem`] interface.
///
/// Rows are evaluated one by one and stacked in row order. With the
/// `parallel` feature, [`Problem::evaluate_par`] spreads rows over the rayon
/// pool; results are still written back in original order.
#[derive(Debug, Clone)]
pub struct RowWise<P> {
    inner: P,
}

impl<P: RowProblem> RowWise<P> {
    /// Wraps a row problem.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// The wrapped problem.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn stack(&self, rows: Vec<RowEvaluation>) -> EvoResult<Evaluation> {
        let m = self.inner.descriptor().n_objectives;
        let n = rows.len();
        let n_constraints = rows.first().map_or(0, |r| r.constraint_violation.len());

        let mut objectives = Vec::with_capacity(n * m);
        let mut violations = Vec::with_capacity(n * n_constraints);
        for (i, row) in rows.into_iter().enumerate() {
            if row.objectives.len() != m {
                return Err(EvolveError::MalformedEvaluation(format!(
                    "row {i}: expected {m} objectives, got {}",
                    row.objectives.len()
                )));
            }
            if row.constraint_violation.len() != n_constraints {
                return Err(EvolveError::MalformedEvaluation(format!(
                    "row {i}: expected {n_constraints} constraints, got {}",
                    row.constraint_violation.len()
                )));
            }
            objectives.extend(row.objectives);
            violations.extend(row.constraint_violation);
        }

        let evaluation = Evaluation::new(Array2::from_shape_vec((n, m), objectives)?);
        if n_constraints == 0 {
            return Ok(evaluation);
        }
        Ok(evaluation.with_constraints(Array2::from_shape_vec((n, n_constraints), violations)?))
    }
}

impl<P: RowProblem> Problem for RowWise<P> {
    fn descriptor(&self) -> &ProblemDescriptor {
        self.inner.descriptor()
    }

    fn evaluate(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation> {
        let rows = phenotype
            .rows()
            .into_iter()
            .map(|x| self.inner.evaluate_row(x))
            .collect::<EvoResult<Vec<_>>>()?;
        self.stack(rows)
    }

    #[cfg(feature = "parallel")]
    fn evaluate_par(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation> {
        let rows = (0..phenotype.nrows())
            .into_par_iter()
            .map(|i| self.inner.evaluate_row(phenotype.row(i)))
            .collect::<EvoResult<Vec<_>>>()?;
        self.stack(rows)
    }

    fn reference_front(&self) -> Option<Array2<f64>> {
        self.inner.reference_front()
    }
}

/// A problem backed by a closure over the phenotype matrix.
///
/// ```
/// use ndarray::{array, Axis};
/// use u_evolve::codec::Variable;
/// use u_evolve::problem::{Evaluation, FnProblem, Problem, ProblemDescriptor};
///
/// let descriptor = ProblemDescriptor::new("shift", 1, vec![Variable::continuous(0.0, 1.0)]);
/// let p = FnProblem::new(descriptor, |x| Ok(Evaluation::new(x + 1.0)));
/// assert_eq!(p.evaluate(&array![[0.5]]).unwrap().objectives, array![[1.5]]);
/// ```
pub struct FnProblem<F> {
    descriptor: ProblemDescriptor,
    func: F,
    reference: Option<Array2<f64>>,
}

impl<F> FnProblem<F>
where
    F: Fn(&Array2<f64>) -> EvoResult<Evaluation> + Send + Sync,
{
    /// Wraps `func` with the given metadata.
    pub fn new(descriptor: ProblemDescriptor, func: F) -> Self {
        Self {
            descriptor,
            func,
            reference: None,
        }
    }

    /// Attaches a known reference front.
    pub fn with_reference_front(mut self, front: Array2<f64>) -> Self {
        self.reference = Some(front);
        self
    }
}

impl<F> Problem for FnProblem<F>
where
    F: Fn(&Array2<f64>) -> EvoResult<Evaluation> + Send + Sync,
{
    fn descriptor(&self) -> &ProblemDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, phenotype: &Array2<f64>) -> EvoResult<Evaluation> {
        (self.func)(phenotype)
    }

    fn reference_front(&self) -> Option<Array2<f64>> {
        self.reference.clone()
    }
}

impl<F> std::fmt::Debug for FnProblem<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProblem")
            .field("descriptor", &self.descriptor)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}
