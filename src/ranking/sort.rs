//! Non-dominated sorting.

use super::dominance::{dominates, to_minimization, violation_totals, Sense};
use crate::error::{EvoResult, EvolveError};
use ndarray::Array2;
use std::cmp::Ordering;

/// How much of the population needs a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortLimit {
    /// Rank every individual.
    #[default]
    All,
    /// Only identify level 1.
    FirstFront,
    /// Stop once complete levels hold at least this many individuals.
    Count(usize),
}

/// Result of non-dominated sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct NdSortResult {
    /// Level per individual, 1 = non-dominated. `None` when the cutoff
    /// stopped before the individual was ranked.
    pub levels: Vec<Option<usize>>,

    /// Indices grouped by level: `fronts[0]` holds level 1, ascending.
    pub fronts: Vec<Vec<usize>>,

    /// Last level produced; with [`SortLimit::Count`] this is the level at
    /// which the requested count was reached.
    pub critical_level: usize,
}

impl NdSortResult {
    /// Indices of level 1.
    pub fn first_front(&self) -> &[usize] {
        self.fronts.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of individuals that received a level.
    pub fn ranked(&self) -> usize {
        self.fronts.iter().map(Vec::len).sum()
    }
}

/// Feasibility-aware non-dominated sort.
///
/// Feasible rows are sorted with the efficient non-dominated sort using
/// sequential search: rows are pre-sorted lexicographically, so a row can
/// only be dominated by rows before it, and each row joins the first level
/// holding none of its dominators. Infeasible rows follow every feasible
/// level, one level per distinct total violation in ascending order.
///
/// # Arguments
///
/// - `objectives`: one row per individual
/// - `constraint_violation`: optional, one row per individual, `<= 0` satisfied
/// - `senses`: per-objective direction, empty for all-minimize
/// - `limit`: cutoff, see [`SortLimit`]
///
/// # Complexity
///
/// O(m · n²) worst case, O(m · n · √n) typical for the feasible part.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use u_evolve::ranking::{non_dominated_sort, SortLimit};
///
/// let objv = array![[1.0, 4.0], [2.0, 3.0], [3.0, 2.0], [4.0, 1.0], [2.0, 2.0]];
/// let result = non_dominated_sort(&objv, None, &[], SortLimit::All).unwrap();
///
/// assert_eq!(result.fronts, vec![vec![0, 3, 4], vec![1, 2]]);
/// assert_eq!(result.levels[4], Some(1));
/// ```
pub fn non_dominated_sort(
    objectives: &Array2<f64>,
    constraint_violation: Option<&Array2<f64>>,
    senses: &[Sense],
    limit: SortLimit,
) -> EvoResult<NdSortResult> {
    let n = objectives.nrows();
    if let Some(cv) = constraint_violation {
        if cv.nrows() != n {
            return Err(EvolveError::SizeMismatch {
                expected: n,
                actual: cv.nrows(),
            });
        }
    }

    let minimized = to_minimization(objectives, senses)?;
    let rows: Vec<Vec<f64>> = minimized.rows().into_iter().map(|r| r.to_vec()).collect();
    let no_constraints = Array2::zeros((n, 0));
    let totals = violation_totals(
        Some(objectives),
        constraint_violation.unwrap_or(&no_constraints),
    );

    let (feasible, infeasible): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| totals[i] <= 0.0);

    let (max_fronts, needed) = match limit {
        SortLimit::All => (None, None),
        SortLimit::FirstFront => (Some(1), None),
        SortLimit::Count(needed) => (None, Some(needed)),
    };
    let mut fronts = efficient_sort(&rows, feasible, max_fronts, needed);

    let ranked: usize = fronts.iter().map(Vec::len).sum();
    let wants_infeasible = match limit {
        SortLimit::All => true,
        SortLimit::FirstFront => fronts.is_empty(),
        SortLimit::Count(needed) => ranked < needed,
    };
    if wants_infeasible && !infeasible.is_empty() {
        let mut groups = violation_groups(infeasible, totals.as_slice().unwrap_or(&[]));
        match limit {
            SortLimit::All => fronts.append(&mut groups),
            SortLimit::FirstFront => fronts.extend(groups.into_iter().take(1)),
            SortLimit::Count(needed) => {
                let mut count = ranked;
                for group in groups {
                    if count >= needed {
                        break;
                    }
                    count += group.len();
                    fronts.push(group);
                }
            }
        }
    }

    let mut levels = vec![None; n];
    for (k, front) in fronts.iter_mut().enumerate() {
        front.sort_unstable();
        for &i in front.iter() {
            levels[i] = Some(k + 1);
        }
    }

    Ok(NdSortResult {
        critical_level: fronts.len(),
        levels,
        fronts,
    })
}

/// ENS-SS over the `candidates` subset of `rows`.
///
/// Levels past `max_fronts` are never opened. With `needed`, the level cap
/// shrinks to the first level at which complete levels hold `needed` rows;
/// front sizes only grow, so the cap never has to widen again and rows
/// belonging past it are skipped without further dominance checks.
fn efficient_sort(
    rows: &[Vec<f64>],
    mut candidates: Vec<usize>,
    max_fronts: Option<usize>,
    needed: Option<usize>,
) -> Vec<Vec<usize>> {
    candidates.sort_by(|&a, &b| lexicographic(&rows[a], &rows[b]));

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut cap = max_fronts;
    for p in candidates {
        let open = cap.map_or(fronts.len(), |m| m.min(fronts.len()));
        // Members added last are the most likely dominators.
        let level = fronts[..open].iter().position(|front| {
            !front
                .iter()
                .rev()
                .any(|&q| dominates(&rows[q], &rows[p]))
        });
        match level {
            Some(k) => fronts[k].push(p),
            None if cap.is_some_and(|m| fronts.len() >= m) => continue,
            None => fronts.push(vec![p]),
        }
        if let Some(k) = needed.and_then(|n| levels_holding(&fronts, n)) {
            cap = Some(cap.map_or(k, |m| m.min(k)));
        }
    }
    if let Some(m) = cap {
        fronts.truncate(m);
    }
    fronts
}

/// Smallest number of leading levels holding at least `needed` rows.
fn levels_holding(fronts: &[Vec<usize>], needed: usize) -> Option<usize> {
    let mut count = 0;
    for (k, front) in fronts.iter().enumerate() {
        count += front.len();
        if count >= needed {
            return Some(k + 1);
        }
    }
    None
}

fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.partial_cmp(y) {
            Some(Ordering::Equal) | None => continue,
            Some(ord) => return ord,
        }
    }
    Ordering::Equal
}

/// Groups infeasible rows by equal total violation, smallest first.
fn violation_groups(mut infeasible: Vec<usize>, totals: &[f64]) -> Vec<Vec<usize>> {
    infeasible.sort_by(|&a, &b| {
        totals[a]
            .partial_cmp(&totals[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut last: Option<f64> = None;
    for i in infeasible {
        match (last, groups.last_mut()) {
            (Some(v), Some(group)) if v == totals[i] => group.push(i),
            _ => groups.push(vec![i]),
        }
        last = Some(totals[i]);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::dominance::{constrained_dominance, Dominance};
    use ndarray::array;

    fn sort_all(objv: &Array2<f64>) -> NdSortResult {
        non_dominated_sort(objv, None, &[], SortLimit::All).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let objv = Array2::<f64>::zeros((0, 2));
        let result = sort_all(&objv);
        assert!(result.levels.is_empty());
        assert!(result.fronts.is_empty());
        assert_eq!(result.critical_level, 0);
    }

    #[test]
    fn test_single_solution() {
        let result = sort_all(&array![[1.0, 2.0]]);
        assert_eq!(result.levels, vec![Some(1)]);
        assert_eq!(result.fronts, vec![vec![0]]);
    }

    #[test]
    fn test_known_front() {
        let objv = array![[1.0, 4.0], [2.0, 3.0], [3.0, 2.0], [4.0, 1.0], [2.0, 2.0]];
        let result = sort_all(&objv);
        assert_eq!(
            result.levels,
            vec![Some(1), Some(2), Some(2), Some(1), Some(1)]
        );
        assert_eq!(result.critical_level, 2);
    }

    #[test]
    fn test_clear_dominance_chain() {
        let objv = array![[3.0, 3.0], [1.0, 1.0], [2.0, 2.0]];
        let result = sort_all(&objv);
        assert_eq!(result.levels, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_mixed_fronts() {
        let objv = array![[1.0, 5.0], [3.0, 3.0], [5.0, 1.0], [4.0, 4.0], [6.0, 6.0]];
        let result = sort_all(&objv);
        assert_eq!(
            result.levels,
            vec![Some(1), Some(1), Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn test_all_equal_share_level() {
        let objv = array![[2.0, 2.0], [2.0, 2.0], [2.0, 2.0]];
        let result = sort_all(&objv);
        assert!(result.levels.iter().all(|&l| l == Some(1)));
    }

    #[test]
    fn test_three_objectives() {
        let objv = array![
            [1.0, 5.0, 3.0],
            [3.0, 1.0, 5.0],
            [5.0, 3.0, 1.0],
            [4.0, 4.0, 4.0],
        ];
        let result = sort_all(&objv);
        assert!(result.levels.iter().all(|&l| l == Some(1)));
    }

    #[test]
    fn test_maximization_flips() {
        let objv = array![[1.0, 1.0], [2.0, 2.0]];
        let result = non_dominated_sort(
            &objv,
            None,
            &[Sense::Maximize, Sense::Maximize],
            SortLimit::All,
        )
        .unwrap();
        assert_eq!(result.levels, vec![Some(2), Some(1)]);
    }

    #[test]
    fn test_first_front_only() {
        let objv = array![[1.0, 5.0], [3.0, 3.0], [5.0, 1.0], [4.0, 4.0], [6.0, 6.0]];
        let result = non_dominated_sort(&objv, None, &[], SortLimit::FirstFront).unwrap();
        assert_eq!(result.first_front(), &[0, 1, 2]);
        assert_eq!(result.levels[3], None);
        assert_eq!(result.levels[4], None);
        assert_eq!(result.critical_level, 1);
    }

    #[test]
    fn test_count_cutoff() {
        let objv = array![[1.0, 5.0], [3.0, 3.0], [5.0, 1.0], [4.0, 4.0], [6.0, 6.0]];
        let result = non_dominated_sort(&objv, None, &[], SortLimit::Count(4)).unwrap();
        assert_eq!(result.critical_level, 2);
        assert_eq!(result.ranked(), 4);
        assert_eq!(result.levels[4], None);

        let exact = non_dominated_sort(&objv, None, &[], SortLimit::Count(3)).unwrap();
        assert_eq!(exact.critical_level, 1);
        assert_eq!(exact.ranked(), 3);
    }

    #[test]
    fn test_count_stops_long_chain_early() {
        let objv = Array2::from_shape_fn((12, 2), |(i, _)| (11 - i) as f64);
        let result = non_dominated_sort(&objv, None, &[], SortLimit::Count(3)).unwrap();
        assert_eq!(result.fronts.len(), 3);
        assert_eq!(result.critical_level, 3);
        assert_eq!(result.ranked(), 3);
        assert_eq!(result.levels[11], Some(1));
        assert_eq!(result.levels[9], Some(3));
        assert!(result.levels[..9].iter().all(Option::is_none));
    }

    #[test]
    fn test_count_cap_tightens_as_front_grows() {
        // Presorted order ranks the chain [0, 0.5]..[2, 2] before the
        // front members, so the cap first sits at level 3 and then drops.
        let objv = array![
            [0.0, 0.5],
            [1.0, 1.0],
            [2.0, 2.0],
            [3.0, 0.0],
            [4.0, -1.0],
            [5.0, -2.0],
        ];
        let result = non_dominated_sort(&objv, None, &[], SortLimit::Count(3)).unwrap();
        assert_eq!(result.fronts, vec![vec![0, 3, 4, 5]]);
        assert_eq!(result.critical_level, 1);
        assert_eq!(result.levels[1], None);
        assert_eq!(result.levels[2], None);
    }

    #[test]
    fn test_count_larger_than_population() {
        let objv = array![[1.0, 2.0], [2.0, 1.0]];
        let result = non_dominated_sort(&objv, None, &[], SortLimit::Count(10)).unwrap();
        assert_eq!(result.ranked(), 2);
    }

    #[test]
    fn test_constraint_violation_ordering() {
        let objv = array![[0.0, 0.0], [0.0, 0.0]];
        let cv = array![[3.0], [0.5]];
        let result = non_dominated_sort(&objv, Some(&cv), &[], SortLimit::All).unwrap();
        assert_eq!(result.levels, vec![Some(2), Some(1)]);
    }

    #[test]
    fn test_feasible_ahead_of_infeasible() {
        let objv = array![[0.0, 0.0], [9.0, 9.0], [5.0, 5.0]];
        let cv = array![[1.0], [0.0], [-2.0]];
        let result = non_dominated_sort(&objv, Some(&cv), &[], SortLimit::All).unwrap();
        // [2] dominates [1]; both feasible rank ahead of the infeasible [0].
        assert_eq!(result.levels, vec![Some(3), Some(2), Some(1)]);
    }

    #[test]
    fn test_equal_violation_shares_level() {
        let objv = array![[1.0], [2.0], [3.0]];
        let cv = array![[2.0], [1.0], [2.0]];
        let result = non_dominated_sort(&objv, Some(&cv), &[], SortLimit::All).unwrap();
        assert_eq!(result.levels, vec![Some(2), Some(1), Some(2)]);
    }

    #[test]
    fn test_first_front_all_infeasible() {
        let objv = array![[1.0], [2.0], [3.0]];
        let cv = array![[2.0], [1.0], [1.0]];
        let result = non_dominated_sort(&objv, Some(&cv), &[], SortLimit::FirstFront).unwrap();
        assert_eq!(result.levels, vec![None, Some(1), Some(1)]);
    }

    #[test]
    fn test_nan_rows_rank_last() {
        let objv = array![[f64::NAN, 0.0], [5.0, 5.0], [1.0, 1.0]];
        let result = sort_all(&objv);
        assert_eq!(result.levels, vec![Some(3), Some(2), Some(1)]);
    }

    #[test]
    fn test_cv_row_mismatch() {
        let objv = array![[1.0], [2.0]];
        let cv = array![[0.0]];
        assert!(non_dominated_sort(&objv, Some(&cv), &[], SortLimit::All).is_err());
    }

    #[test]
    fn test_partition_is_consistent_with_dominance() {
        let objv = array![
            [0.2, 0.9],
            [0.4, 0.4],
            [0.9, 0.1],
            [0.5, 0.6],
            [0.6, 0.5],
            [0.95, 0.95],
            [0.3, 0.7],
        ];
        let cv = array![[0.0], [0.0], [0.0], [0.0], [0.2], [0.0], [0.0]];
        let totals = violation_totals(None, &cv);
        let result = non_dominated_sort(&objv, Some(&cv), &[], SortLimit::All).unwrap();
        let row = |i: usize| objv.row(i).to_vec();

        for k in 1..result.fronts.len() {
            for &b in &result.fronts[k] {
                assert!(result.fronts[k - 1].iter().any(|&a| {
                    constrained_dominance(&row(a), totals[a], &row(b), totals[b])
                        == Dominance::Left
                }));
            }
        }
    }
}
