//! Environmental selection.

use crate::error::{EvoResult, EvolveError};
use ndarray::Array1;

/// How the merged parent + offspring set is reduced back to size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Survivor {
    /// Keep the `n` fittest, ties broken by position.
    #[default]
    Truncation,
    /// Parent `i` competes only with offspring `i` (the row at `n + i`);
    /// the offspring wins ties.
    OneToOne,
}

impl Survivor {
    /// Returns the surviving indices into the merged set.
    ///
    /// # Errors
    ///
    /// [`EvolveError::SizeMismatch`] when fewer than `n` candidates exist, or
    /// for [`Survivor::OneToOne`] when the merged set is not exactly `2n`.
    pub fn select(&self, fitness: &Array1<f64>, n: usize) -> EvoResult<Vec<usize>> {
        match self {
            Survivor::Truncation => {
                if fitness.len() < n {
                    return Err(EvolveError::SizeMismatch {
                        expected: n,
                        actual: fitness.len(),
                    });
                }
                let mut order: Vec<usize> = (0..fitness.len()).collect();
                order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]).then(a.cmp(&b)));
                order.truncate(n);
                Ok(order)
            }
            Survivor::OneToOne => {
                if fitness.len() != 2 * n {
                    return Err(EvolveError::SizeMismatch {
                        expected: 2 * n,
                        actual: fitness.len(),
                    });
                }
                Ok((0..n)
                    .map(|i| if fitness[n + i] >= fitness[i] { n + i } else { i })
                    .collect())
            }
        }
    }
}
