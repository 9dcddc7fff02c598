//! Quality indicators for approximation sets.
//!
//! All functions expect minimization-normalized objectives (see
//! [`to_minimization`](crate::ranking::to_minimization)), one row per point.
//!
//! - [`gd`]: generational distance, set → reference
//! - [`igd`]: inverted generational distance, reference → set
//! - [`hypervolume`]: exact dominated volume on normalized objectives
//! - [`spacing`]: Schott's spacing metric
//!
//! # References
//!
//! - Van Veldhuizen & Lamont (1998), "Evolutionary Computation and Convergence
//!   to a Pareto Front"
//! - While et al. (2006), "A Faster Algorithm for Calculating Hypervolume"
//! - Schott (1995), "Fault Tolerant Design Using Single and Multicriteria
//!   Genetic Algorithm Optimization"

use ndarray::{Array2, ArrayView1, Axis};
use std::cmp::Ordering;

/// Reference point coordinate on every normalized axis.
pub const HV_REFERENCE: f64 = 1.1;

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn mean_nearest(from: &Array2<f64>, to: &Array2<f64>) -> Option<f64> {
    if from.nrows() == 0 || to.nrows() == 0 || from.ncols() != to.ncols() {
        return None;
    }
    let total: f64 = from
        .rows()
        .into_iter()
        .map(|p| {
            to.rows()
                .into_iter()
                .map(|q| euclidean(p, q))
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    Some(total / from.nrows() as f64)
}

/// Mean distance from each point of `set` to its nearest reference point.
///
/// `None` when either matrix is empty or widths differ.
pub fn gd(set: &Array2<f64>, reference: &Array2<f64>) -> Option<f64> {
    mean_nearest(set, reference)
}

/// Mean distance from each reference point to its nearest point of `set`.
///
/// `None` when either matrix is empty or widths differ.
pub fn igd(set: &Array2<f64>, reference: &Array2<f64>) -> Option<f64> {
    mean_nearest(reference, set)
}

/// Hypervolume of `set` after normalization.
///
/// Objectives are scaled to `[0, 1]` using the bounds of `reference` when
/// given (and non-empty), else the bounds of `set` itself. The volume is
/// measured against the point `(1.1, ..., 1.1)`; points beyond it in any
/// objective contribute nothing. An empty set has volume 0.
///
/// ```
/// use ndarray::array;
/// use u_evolve::indicators::hypervolume;
///
/// let set = array![[0.0, 1.0], [1.0, 0.0]];
/// // 1.1² minus the unreachable 1×1 corner.
/// assert!((hypervolume(&set, None) - 0.21).abs() < 1e-12);
/// ```
pub fn hypervolume(set: &Array2<f64>, reference: Option<&Array2<f64>>) -> f64 {
    if set.nrows() == 0 || set.ncols() == 0 {
        return 0.0;
    }
    let bounds_source = match reference {
        Some(r) if r.nrows() > 0 && r.ncols() == set.ncols() => r,
        _ => set,
    };
    let lo = bounds_source.fold_axis(Axis(0), f64::INFINITY, |&a, &b| a.min(b));
    let hi = bounds_source.fold_axis(Axis(0), f64::NEG_INFINITY, |&a, &b| a.max(b));

    let points: Vec<Vec<f64>> = set
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, &x)| {
                    let span = hi[j] - lo[j];
                    if span > 0.0 {
                        (x - lo[j]) / span
                    } else {
                        x - lo[j]
                    }
                })
                .collect::<Vec<f64>>()
        })
        .filter(|p| p.iter().all(|&v| v.is_finite() && v < HV_REFERENCE))
        .collect();

    slice_volume(points, set.ncols())
}

/// Exact union volume by slicing along the last objective.
fn slice_volume(mut points: Vec<Vec<f64>>, dims: usize) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    if dims == 1 {
        let best = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        return HV_REFERENCE - best;
    }

    let last = dims - 1;
    points.sort_by(|a, b| a[last].partial_cmp(&b[last]).unwrap_or(Ordering::Equal));

    if dims == 2 {
        // Sweep: keep the running minimum of the first objective.
        let mut volume = 0.0;
        let mut best_x = f64::INFINITY;
        for (i, p) in points.iter().enumerate() {
            best_x = best_x.min(p[0]);
            let next = points.get(i + 1).map_or(HV_REFERENCE, |q| q[1]);
            volume += (HV_REFERENCE - best_x) * (next - p[1]);
        }
        return volume;
    }

    let mut volume = 0.0;
    for i in 0..points.len() {
        let next = points.get(i + 1).map_or(HV_REFERENCE, |q| q[last]);
        let depth = next - points[i][last];
        if depth <= 0.0 {
            continue;
        }
        let projected: Vec<Vec<f64>> = points[..=i].iter().map(|p| p[..last].to_vec()).collect();
        volume += slice_volume(projected, last) * depth;
    }
    volume
}

/// Schott's spacing: standard deviation of nearest-neighbour L1 distances.
///
/// `None` for fewer than two points. Zero means perfectly even spacing.
pub fn spacing(set: &Array2<f64>) -> Option<f64> {
    let n = set.nrows();
    if n < 2 {
        return None;
    }
    let nearest: Vec<f64> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i)
                .map(|j| {
                    set.row(i)
                        .iter()
                        .zip(set.row(j).iter())
                        .map(|(a, b)| (a - b).abs())
                        .sum::<f64>()
                })
                .fold(f64::INFINITY, f64::min)
        })
        .collect();
    let mean = nearest.iter().sum::<f64>() / n as f64;
    let var = nearest.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gd_igd_on_reference() {
        let front = array![[0.0, 1.0], [0.5, 0.5], [1.0, 0.0]];
        assert_eq!(gd(&front, &front), Some(0.0));
        assert_eq!(igd(&front, &front), Some(0.0));
    }

    #[test]
    fn test_gd_igd_asymmetric() {
        let reference = array![[0.0, 1.0], [0.5, 0.5], [1.0, 0.0]];
        let set = array![[0.0, 1.0]];
        assert_eq!(gd(&set, &reference), Some(0.0));
        let expected = (0.0 + 0.5f64.sqrt() + 2.0f64.sqrt()) / 3.0;
        assert!((igd(&set, &reference).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_gd_empty() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert_eq!(gd(&empty, &array![[0.0, 0.0]]), None);
        assert_eq!(igd(&array![[0.0, 0.0]], &empty), None);
    }

    #[test]
    fn test_hypervolume_single_point() {
        // A lone point normalizes to the origin.
        let hv = hypervolume(&array![[3.0, 7.0]], None);
        assert!((hv - 1.21).abs() < 1e-12);
    }

    #[test]
    fn test_hypervolume_with_reference_bounds() {
        let reference = array![[0.0, 2.0], [2.0, 0.0]];
        let set = array![[1.0, 1.0]];
        // Normalized to (0.5, 0.5): (1.1 - 0.5)².
        assert!((hypervolume(&set, Some(&reference)) - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_hypervolume_three_objectives() {
        let set = array![[0.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
        // Box A: 1.1 × 1.1 × 0.1; box B: 0.1 × 0.1 × 1.1; overlap 0.1 × 0.1 × 0.1.
        let expected = 1.1 * 1.1 * 0.1 + 0.1 * 0.1 * 1.1 - 0.1 * 0.1 * 0.1;
        assert!((hypervolume(&set, None) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_hypervolume_ignores_dominated() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![[0.0, 1.0], [1.0, 0.0], [0.9, 0.9]];
        assert!((hypervolume(&a, None) - hypervolume(&b, None)).abs() < 1e-12);
    }

    #[test]
    fn test_hypervolume_empty() {
        assert_eq!(hypervolume(&Array2::zeros((0, 2)), None), 0.0);
    }

    #[test]
    fn test_spacing() {
        let even = array![[0.0, 2.0], [1.0, 1.0], [2.0, 0.0]];
        assert!(spacing(&even).unwrap().abs() < 1e-12);

        let uneven = array![[0.0, 3.0], [0.5, 2.5], [3.0, 0.0]];
        assert!(spacing(&uneven).unwrap() > 0.0);
        assert_eq!(spacing(&array![[1.0, 1.0]]), None);
    }
}
