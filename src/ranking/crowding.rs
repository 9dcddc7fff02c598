//! Crowding distance and the level/crowding total order.

use ndarray::{Array1, Array2};
use std::cmp::Ordering;

/// Crowding distance of every individual, computed front by front.
///
/// Individuals sharing a level form one front. Unranked individuals
/// (`None`) receive 0. Distances are only comparable within a front.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use u_evolve::ranking::crowding_distance;
///
/// let objv = array![[1.0, 5.0], [3.0, 3.0], [5.0, 1.0], [4.0, 4.0]];
/// let levels = [Some(1), Some(1), Some(1), Some(2)];
/// let d = crowding_distance(&objv, &levels);
///
/// assert!(d[0].is_infinite() && d[2].is_infinite());
/// assert!(d[1].is_finite());
/// // A front of one member is always maximally isolated.
/// assert!(d[3].is_infinite());
/// ```
pub fn crowding_distance(objectives: &Array2<f64>, levels: &[Option<usize>]) -> Array1<f64> {
    let mut distances = Array1::zeros(levels.len());
    let max_level = levels.iter().flatten().copied().max().unwrap_or(0);

    for level in 1..=max_level {
        let members: Vec<usize> = (0..levels.len())
            .filter(|&i| levels[i] == Some(level))
            .collect();
        if members.is_empty() {
            continue;
        }
        let front: Vec<Vec<f64>> = members
            .iter()
            .map(|&i| objectives.row(i).to_vec())
            .collect();
        for (&i, d) in members.iter().zip(front_crowding_distance(&front)) {
            distances[i] = d;
        }
    }
    distances
}

/// Crowding distance within a single front.
///
/// Boundary solutions (min/max for any objective) receive `f64::INFINITY`,
/// as does every member of a front with two or fewer solutions. An
/// objective with zero range contributes nothing.
///
/// # Complexity
///
/// O(m · n log n) where m = number of objectives, n = front size
pub fn front_crowding_distance(front: &[Vec<f64>]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = front[0].len();
    let mut distances = vec![0.0f64; n];

    #[allow(clippy::needless_range_loop)] // obj_idx is a column index into 2D data
    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            front[a][obj_idx]
                .partial_cmp(&front[b][obj_idx])
                .unwrap_or(Ordering::Equal)
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let range = front[indices[n - 1]][obj_idx] - front[indices[0]][obj_idx];
        if range > 0.0 {
            for i in 1..(n - 1) {
                let prev = front[indices[i - 1]][obj_idx];
                let next = front[indices[i + 1]][obj_idx];
                distances[indices[i]] += (next - prev) / range;
            }
        }
    }

    distances
}

/// Indices ordered best-first: ascending level, then descending crowding
/// distance. Unranked individuals come last. Ties keep index order.
pub fn total_order(levels: &[Option<usize>], distances: &Array1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    order.sort_by(|&a, &b| {
        let la = levels[a].unwrap_or(usize::MAX);
        let lb = levels[b].unwrap_or(usize::MAX);
        la.cmp(&lb).then_with(|| {
            distances[b]
                .partial_cmp(&distances[a])
                .unwrap_or(Ordering::Equal)
        })
    });
    order
}

/// Converts a best-first order into fitness: best gets `n - 1`, worst 0.
pub fn order_fitness(order: &[usize]) -> Array1<f64> {
    let n = order.len();
    let mut fitness = Array1::zeros(n);
    for (pos, &i) in order.iter().enumerate() {
        fitness[i] = (n - 1 - pos) as f64;
    }
    fitness
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_front_crowding_two_solutions() {
        let front = vec![vec![1.0, 3.0], vec![3.0, 1.0]];
        let d = front_crowding_distance(&front);
        assert!(d.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn test_front_crowding_interior() {
        let front = vec![
            vec![0.0, 4.0],
            vec![1.0, 3.0],
            vec![2.0, 2.0],
            vec![3.0, 1.0],
            vec![4.0, 0.0],
        ];
        let d = front_crowding_distance(&front);
        assert!(d[0].is_infinite());
        assert!(d[4].is_infinite());
        // Evenly spaced: (2/4) per objective, two objectives.
        for &v in &d[1..4] {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_front_crowding_zero_range() {
        let front = vec![vec![1.0, 5.0], vec![2.0, 5.0], vec![3.0, 5.0]];
        let d = front_crowding_distance(&front);
        assert!(d[0].is_infinite());
        assert!(d[2].is_infinite());
        assert!((d[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_crowding_unranked_zero() {
        let objv = array![[1.0, 2.0], [2.0, 1.0], [3.0, 3.0]];
        let d = crowding_distance(&objv, &[Some(1), Some(1), None]);
        assert!(d[0].is_infinite());
        assert_eq!(d[2], 0.0);
    }

    #[test]
    fn test_crowding_per_front() {
        let objv = array![
            [0.0, 2.0],
            [1.0, 1.0],
            [2.0, 0.0],
            [1.0, 3.0],
            [2.0, 2.0],
            [3.0, 1.0],
        ];
        let levels = [Some(1), Some(1), Some(1), Some(2), Some(2), Some(2)];
        let d = crowding_distance(&objv, &levels);
        assert!((d[1] - 2.0).abs() < 1e-12);
        assert!((d[4] - 2.0).abs() < 1e-12);
        assert!(d[3].is_infinite());
    }

    #[test]
    fn test_total_order() {
        let levels = [Some(2), Some(1), None, Some(1)];
        let distances = array![f64::INFINITY, 0.5, 0.0, 1.5];
        assert_eq!(total_order(&levels, &distances), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_order_fitness() {
        let fitness = order_fitness(&[2, 0, 1]);
        assert_eq!(fitness, array![1.0, 0.0, 2.0]);
        assert!(order_fitness(&[]).is_empty());
    }
}
