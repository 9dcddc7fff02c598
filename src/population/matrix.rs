//! Row-wise matrix helpers shared by population operations.

use crate::error::{EvoResult, EvolveError};
use ndarray::{concatenate, s, Array2, Axis};

/// Resolves possibly negative indices against a length.
///
/// Negative values count from the end (`-1` is the last row). Duplicates are
/// kept so that selection with replacement works.
///
/// ```
/// use u_evolve::population::resolve_indices;
///
/// assert_eq!(resolve_indices(&[0, -1, 2, 2], 4).unwrap(), vec![0, 3, 2, 2]);
/// assert!(resolve_indices(&[4], 4).is_err());
/// ```
pub fn resolve_indices(indices: &[isize], len: usize) -> EvoResult<Vec<usize>> {
    indices
        .iter()
        .map(|&i| {
            let resolved = if i < 0 { len as isize + i } else { i };
            if resolved < 0 || resolved as usize >= len {
                Err(EvolveError::InvalidConfiguration(format!(
                    "index {i} out of range for {len} individuals"
                )))
            } else {
                Ok(resolved as usize)
            }
        })
        .collect()
}

/// Widens `m` with zero columns up to `cols`.
pub(crate) fn pad_columns(m: &Array2<f64>, cols: usize) -> Array2<f64> {
    if m.ncols() >= cols {
        return m.to_owned();
    }
    let mut out = Array2::zeros((m.nrows(), cols));
    out.slice_mut(s![.., ..m.ncols()]).assign(m);
    out
}

/// Stacks `a` on top of `b`, zero-padding the narrower one.
pub(crate) fn stack_padded(a: &Array2<f64>, b: &Array2<f64>) -> EvoResult<Array2<f64>> {
    let cols = a.ncols().max(b.ncols());
    let a = pad_columns(a, cols);
    let b = pad_columns(b, cols);
    Ok(concatenate(Axis(0), &[a.view(), b.view()])?)
}

/// Stacks two matrices that must already agree on width.
pub(crate) fn stack(a: &Array2<f64>, b: &Array2<f64>) -> EvoResult<Array2<f64>> {
    Ok(concatenate(Axis(0), &[a.view(), b.view()])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_negative_indices() {
        assert_eq!(resolve_indices(&[-1, -3], 3).unwrap(), vec![2, 0]);
        assert!(resolve_indices(&[-4], 3).is_err());
    }

    #[test]
    fn test_empty_indices() {
        assert!(resolve_indices(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_pad_columns() {
        let m = array![[1.0], [2.0]];
        let p = pad_columns(&m, 3);
        assert_eq!(p, array![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_stack_padded() {
        let a = Array2::<f64>::zeros((2, 0));
        let b = array![[0.5, 1.0]];
        let s = stack_padded(&a, &b).unwrap();
        assert_eq!(s.dim(), (3, 2));
        assert_eq!(s.row(2).to_vec(), vec![0.5, 1.0]);
    }

    #[test]
    fn test_stack_width_mismatch() {
        let a = array![[1.0, 2.0]];
        let b = array![[1.0]];
        assert!(stack(&a, &b).is_err());
    }
}
