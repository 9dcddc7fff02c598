//! Mating selection.
//!
//! Selection determines which individuals are chosen as parents for
//! recombination. Different strategies provide different selection pressure.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use crate::error::{EvoResult, EvolveError};
use crate::random::EvoRng;
use ndarray::Array1;
use rand::Rng;

/// Selection strategy for choosing parents.
///
/// All strategies work on fitness where **higher is better**, the
/// convention every [`FitnessStrategy`](crate::algorithm::FitnessStrategy)
/// produces.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use u_evolve::operators::Selection;
/// use u_evolve::random::create_rng;
///
/// let fitness = array![0.0, 3.0, 1.0];
/// let parents = Selection::Tournament(2).select(&fitness, 6, &mut create_rng(42)).unwrap();
/// assert_eq!(parents.len(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, select the best.
    ///
    /// Higher `k` = stronger selection pressure.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// **Warning**: Susceptible to super-individual dominance when
    /// fitness variance is high.
    ///
    /// # Complexity
    /// O(n) per selection (linear scan)
    Roulette,

    /// Linear rank-based selection: the best of `n` gets weight `n`, the
    /// worst weight 1.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) per call (sort), O(n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(2)
    }
}

impl Selection {
    /// Selects `count` parent indices with replacement.
    ///
    /// # Errors
    /// [`EvolveError::InvalidConfiguration`] when `count > 0` and `fitness`
    /// is empty.
    pub fn select(
        &self,
        fitness: &Array1<f64>,
        count: usize,
        rng: &mut EvoRng,
    ) -> EvoResult<Vec<usize>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if fitness.is_empty() {
            return Err(EvolveError::InvalidConfiguration(
                "cannot select from empty population".into(),
            ));
        }
        let fitness = fitness.to_vec();

        Ok(match self {
            Selection::Tournament(k) => (0..count).map(|_| tournament(&fitness, *k, rng)).collect(),
            Selection::Roulette => {
                let weights: Vec<f64> = fitness
                    .iter()
                    .map(|&f| if f.is_finite() && f > 0.0 { f } else { 0.0 })
                    .collect();
                (0..count).map(|_| spin(&weights, rng)).collect()
            }
            Selection::Rank => {
                let n = fitness.len();
                let mut order: Vec<usize> = (0..n).collect();
                // Best first.
                order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
                let mut weights = vec![0.0; n];
                for (rank, &i) in order.iter().enumerate() {
                    weights[i] = (n - rank) as f64;
                }
                (0..count).map(|_| spin(&weights, rng)).collect()
            }
        })
    }
}

/// Tournament selection: pick k random individuals, return best.
fn tournament(fitness: &[f64], k: usize, rng: &mut EvoRng) -> usize {
    let k = k.max(1);
    let n = fitness.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if fitness[idx] > fitness[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette wheel over non-negative weights; uniform if they sum to zero.
fn spin(weights: &[f64], rng: &mut EvoRng) -> usize {
    let n = weights.len();
    if n == 1 {
        return 0;
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use ndarray::array;

    fn counts(sel: Selection, fitness: &Array1<f64>, n: usize) -> Vec<usize> {
        let mut rng = create_rng(42);
        let mut counts = vec![0; fitness.len()];
        for i in sel.select(fitness, n, &mut rng).unwrap() {
            counts[i] += 1;
        }
        counts
    }

    #[test]
    fn test_tournament_favors_best() {
        let fitness = array![1.0, 5.0, 10.0, 2.0];
        let c = counts(Selection::Tournament(4), &fitness, 10000);
        assert!(c[2] > 6000, "expected best to be selected >60% of the time, got {c:?}");
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let fitness = array![1.0, 5.0, 10.0, 2.0];
        let c = counts(Selection::Tournament(1), &fitness, 10000);
        for &v in &c {
            assert!(v > 1500, "expected uniform, got counts: {c:?}");
        }
    }

    #[test]
    fn test_roulette_proportional() {
        let fitness = array![1.0, 3.0, 0.0];
        let c = counts(Selection::Roulette, &fitness, 10000);
        assert_eq!(c[2], 0);
        assert!(c[1] > c[0] * 2, "got {c:?}");
    }

    #[test]
    fn test_roulette_all_zero_is_uniform() {
        let fitness = array![0.0, 0.0, 0.0];
        let c = counts(Selection::Roulette, &fitness, 3000);
        assert!(c.iter().all(|&v| v > 800), "got {c:?}");
    }

    #[test]
    fn test_rank_favors_best() {
        let fitness = array![0.1, 100.0, 0.2, 0.3];
        let c = counts(Selection::Rank, &fitness, 10000);
        let best = c[1];
        assert!(c.iter().all(|&v| v <= best), "got {c:?}");
        // Rank ignores magnitudes: weight 4 of 10.
        assert!(best > 3500 && best < 4500, "got {c:?}");
    }

    #[test]
    fn test_single_individual() {
        let fitness = array![7.0];
        for sel in [Selection::Tournament(3), Selection::Roulette, Selection::Rank] {
            assert_eq!(
                sel.select(&fitness, 3, &mut create_rng(42)).unwrap(),
                vec![0, 0, 0]
            );
        }
    }

    #[test]
    fn test_empty_population() {
        let fitness = Array1::<f64>::zeros(0);
        let mut rng = create_rng(42);
        assert!(Selection::Roulette.select(&fitness, 1, &mut rng).is_err());
        assert!(Selection::Roulette.select(&fitness, 0, &mut rng).unwrap().is_empty());
    }
}
