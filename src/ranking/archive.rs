//! Running non-dominated archive.

use super::crowding::front_crowding_distance;
use super::dominance::{to_minimization, Sense};
use super::sort::{non_dominated_sort, SortLimit};
use crate::error::{EvoResult, EvolveError};
use crate::population::Population;
use std::collections::HashSet;

/// Extracts the feasible, duplicate-free first front of `pop`.
///
/// Two individuals are duplicates when their objective vectors are
/// bitwise identical; the first occurrence is kept.
///
/// # Errors
///
/// [`EvolveError::MissingObjectives`] if `pop` has not been evaluated.
pub fn non_dominated_set(pop: &Population, senses: &[Sense]) -> EvoResult<Population> {
    let objectives = pop.objectives().ok_or(EvolveError::MissingObjectives)?;
    let totals = pop.total_violation();
    let sorted = non_dominated_sort(
        objectives,
        Some(pop.constraint_violation()),
        senses,
        SortLimit::FirstFront,
    )?;

    let mut seen = HashSet::new();
    let keep: Vec<usize> = sorted
        .first_front()
        .iter()
        .copied()
        .filter(|&i| totals[i] <= 0.0)
        .filter(|&i| {
            let key: Vec<u64> = objectives.row(i).iter().map(|v| v.to_bits()).collect();
            seen.insert(key)
        })
        .collect();
    pop.subset(&keep)
}

/// Best-known Pareto front across generations.
///
/// Every member is feasible, mutually non-dominated and unique in objective
/// space. When an update would exceed `max_size`, the most crowded member is
/// removed repeatedly, recomputing distances after each removal.
#[derive(Debug, Clone)]
pub struct NdArchive {
    max_size: usize,
    senses: Vec<Sense>,
    members: Option<Population>,
}

impl NdArchive {
    /// Creates an empty archive.
    ///
    /// # Errors
    ///
    /// [`EvolveError::InvalidConfiguration`] if `max_size` is 0.
    pub fn new(max_size: usize, senses: Vec<Sense>) -> EvoResult<Self> {
        if max_size == 0 {
            return Err(EvolveError::InvalidConfiguration(
                "archive size must be > 0".into(),
            ));
        }
        Ok(Self {
            max_size,
            senses,
            members: None,
        })
    }

    /// Merges the evaluated `pop` into the archive and re-filters it.
    pub fn update(&mut self, pop: &Population) -> EvoResult<()> {
        let merged = match self.members.take() {
            Some(members) => members.concat(pop)?,
            None => pop.clone(),
        };
        let front = non_dominated_set(&merged, &self.senses)?;
        let front = self.truncate(front)?;
        tracing::debug!(size = front.len(), "archive updated");
        self.members = Some(front);
        Ok(())
    }

    fn truncate(&self, front: Population) -> EvoResult<Population> {
        if front.len() <= self.max_size {
            return Ok(front);
        }
        let objectives = front.objectives().ok_or(EvolveError::MissingObjectives)?;
        let minimized = to_minimization(objectives, &self.senses)?;
        let mut kept: Vec<usize> = (0..front.len()).collect();

        while kept.len() > self.max_size {
            let rows: Vec<Vec<f64>> = kept.iter().map(|&i| minimized.row(i).to_vec()).collect();
            let distances = front_crowding_distance(&rows);
            let most_crowded = distances
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(pos, _)| pos)
                .unwrap_or(0);
            kept.remove(most_crowded);
        }
        front.subset(&kept)
    }

    /// Current members, `None` before the first update.
    pub fn members(&self) -> Option<&Population> {
        self.members.as_ref()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.as_ref().map_or(0, Population::len)
    }

    /// Returns true if the archive holds no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DecodeField, Encoding, Variable};
    use crate::ranking::dominates;
    use ndarray::{array, Array2};
    use std::sync::Arc;

    fn field() -> Arc<DecodeField> {
        Arc::new(DecodeField::real_integer(vec![Variable::continuous(-10.0, 10.0)]).unwrap())
    }

    fn evaluated(
        field: &Arc<DecodeField>,
        objv: Array2<f64>,
        cv: Option<Array2<f64>>,
    ) -> Population {
        let n = objv.nrows();
        let chrom = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let mut pop =
            Population::from_chromosome(Encoding::RealInteger, Arc::clone(field), chrom).unwrap();
        pop.set_evaluation(objv, cv).unwrap();
        pop
    }

    #[test]
    fn test_non_dominated_set_filters() {
        let f = field();
        let pop = evaluated(
            &f,
            array![[1.0, 4.0], [2.0, 3.0], [1.0, 4.0], [0.0, 0.0], [3.0, 1.0]],
            Some(array![[0.0], [0.0], [0.0], [5.0], [0.0]]),
        );
        let nd = non_dominated_set(&pop, &[]).unwrap();
        // Infeasible [3] dropped, duplicate [2] dropped.
        assert_eq!(nd.len(), 3);
        assert_eq!(
            nd.chromosome().unwrap().column(0).to_vec(),
            vec![0.0, 1.0, 4.0]
        );
    }

    #[test]
    fn test_non_dominated_set_all_infeasible() {
        let f = field();
        let pop = evaluated(&f, array![[1.0], [2.0]], Some(array![[1.0], [2.0]]));
        let nd = non_dominated_set(&pop, &[]).unwrap();
        assert!(nd.is_empty());
    }

    #[test]
    fn test_non_dominated_set_requires_objectives() {
        let f = field();
        let pop =
            Population::from_chromosome(Encoding::RealInteger, f, array![[0.0], [1.0]]).unwrap();
        assert_eq!(
            non_dominated_set(&pop, &[]).unwrap_err(),
            EvolveError::MissingObjectives
        );
    }

    #[test]
    fn test_archive_merges_generations() {
        let f = field();
        let mut archive = NdArchive::new(10, vec![]).unwrap();
        assert!(archive.is_empty());

        archive
            .update(&evaluated(&f, array![[2.0, 2.0], [3.0, 3.0]], None))
            .unwrap();
        assert_eq!(archive.len(), 1);

        archive
            .update(&evaluated(&f, array![[1.0, 3.0], [1.0, 1.0]], None))
            .unwrap();
        let members = archive.members().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members.objectives().unwrap().row(0).to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_archive_truncates_crowded() {
        let f = field();
        let mut archive = NdArchive::new(3, vec![]).unwrap();
        let pop = evaluated(
            &f,
            array![[0.0, 4.0], [1.0, 3.0], [1.1, 2.9], [3.0, 1.0], [4.0, 0.0]],
            None,
        );
        archive.update(&pop).unwrap();
        let members = archive.members().unwrap();
        assert_eq!(members.len(), 3);

        let objv = members.objectives().unwrap();
        let rows: Vec<Vec<f64>> = objv.rows().into_iter().map(|r| r.to_vec()).collect();
        assert!(rows.contains(&vec![0.0, 4.0]));
        assert!(rows.contains(&vec![4.0, 0.0]));
        for a in &rows {
            for b in &rows {
                assert!(!dominates(a, b));
            }
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(NdArchive::new(0, vec![]).is_err());
    }
}
