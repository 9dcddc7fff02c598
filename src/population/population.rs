//! The [`Population`] type.

use super::matrix::{pad_columns, resolve_indices, stack, stack_padded};
use crate::codec::{decode, random_chromosome, DecodeField, Encoding};
use crate::error::{EvoResult, EvolveError};
use crate::random::EvoRng;
use crate::ranking::violation_totals;
use ndarray::{concatenate, s, Array1, Array2, Axis};
use rand::seq::SliceRandom;
use std::sync::Arc;

/// A fixed-size group of candidate solutions.
///
/// # Invariants
///
/// - every present matrix has exactly [`len`](Self::len) rows
/// - `phenotype` is recomputed whenever `chromosome` changes
/// - `fitness` is all ones until a fitness strategy assigns it
/// - `constraint_violation` has zero columns (everything feasible) until an
///   evaluation reports constraints
///
/// # Example
///
/// ```
/// use u_evolve::codec::{DecodeField, Encoding, Variable};
/// use u_evolve::population::Population;
/// use u_evolve::random::create_rng;
///
/// let field = DecodeField::real_integer(vec![Variable::continuous(0.0, 1.0); 3]).unwrap();
/// let mut pop = Population::new(Encoding::RealInteger, field, 10).unwrap();
/// assert!(pop.chromosome().is_none());
///
/// pop.initialize(None, &mut create_rng(42)).unwrap();
/// assert_eq!(pop.phenotype().unwrap().dim(), (10, 3));
/// assert!(pop.objectives().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Population {
    encoding: Encoding,
    field: Arc<DecodeField>,
    size: usize,
    chromosome: Option<Array2<f64>>,
    phenotype: Option<Array2<f64>>,
    objectives: Option<Array2<f64>>,
    constraint_violation: Array2<f64>,
    fitness: Array1<f64>,
}

impl Population {
    /// Creates a shell population of `size` individuals without a chromosome.
    ///
    /// # Errors
    ///
    /// [`EvolveError::EncodingMismatch`] if `field` was built for another encoding.
    pub fn new(
        encoding: Encoding,
        field: impl Into<Arc<DecodeField>>,
        size: usize,
    ) -> EvoResult<Self> {
        let field = field.into();
        if field.encoding() != encoding {
            return Err(EvolveError::EncodingMismatch {
                expected: encoding.to_string(),
                actual: field.encoding().to_string(),
            });
        }
        Ok(Self {
            encoding,
            field,
            size,
            chromosome: None,
            phenotype: None,
            objectives: None,
            constraint_violation: Array2::zeros((size, 0)),
            fitness: Array1::ones(size),
        })
    }

    /// Creates a population from an existing chromosome and decodes it.
    pub fn from_chromosome(
        encoding: Encoding,
        field: impl Into<Arc<DecodeField>>,
        chromosome: Array2<f64>,
    ) -> EvoResult<Self> {
        let mut pop = Self::new(encoding, field, chromosome.nrows())?;
        pop.set_chromosome(chromosome)?;
        Ok(pop)
    }

    /// Generates a fresh random chromosome, optionally resizing first.
    ///
    /// Objectives are cleared, fitness reset to ones, constraint violations
    /// reset to zero and the phenotype recomputed.
    pub fn initialize(&mut self, size: Option<usize>, rng: &mut EvoRng) -> EvoResult<()> {
        let size = size.unwrap_or(self.size);
        let chromosome = random_chromosome(&self.field, size, rng);
        self.set_chromosome(chromosome)
    }

    /// Initializes with `prior` rows first, then random rows up to the size.
    ///
    /// Extra prior rows beyond the target size are dropped.
    pub fn initialize_with_prior(&mut self, prior: &Array2<f64>, rng: &mut EvoRng) -> EvoResult<()> {
        let expected = self.field.chromosome_len();
        if prior.ncols() != expected {
            return Err(EvolveError::SizeMismatch {
                expected,
                actual: prior.ncols(),
            });
        }
        let keep = prior.nrows().min(self.size);
        let fill = random_chromosome(&self.field, self.size - keep, rng);
        let seeded = prior.slice(s![..keep, ..]).to_owned();
        let chromosome = concatenate(Axis(0), &[seeded.view(), fill.view()])?;
        self.set_chromosome(chromosome)
    }

    /// Replaces the chromosome, re-decodes and clears evaluation results.
    pub fn set_chromosome(&mut self, chromosome: Array2<f64>) -> EvoResult<()> {
        let phenotype = decode(&chromosome, &self.field, self.encoding)?;
        self.size = chromosome.nrows();
        self.chromosome = Some(chromosome);
        self.phenotype = Some(phenotype);
        self.reset_evaluation();
        Ok(())
    }

    /// Recomputes the phenotype from the current chromosome.
    pub fn decode(&mut self) -> EvoResult<&Array2<f64>> {
        let chromosome = self
            .chromosome
            .as_ref()
            .ok_or(EvolveError::MissingChromosome)?;
        let phenotype = decode(chromosome, &self.field, self.encoding)?;
        Ok(&*self.phenotype.insert(phenotype))
    }

    /// Stores evaluation results.
    ///
    /// A missing constraint matrix means the problem declares no constraints.
    pub fn set_evaluation(
        &mut self,
        objectives: Array2<f64>,
        constraint_violation: Option<Array2<f64>>,
    ) -> EvoResult<()> {
        if objectives.nrows() != self.size {
            return Err(EvolveError::SizeMismatch {
                expected: self.size,
                actual: objectives.nrows(),
            });
        }
        let cv = constraint_violation.unwrap_or_else(|| Array2::zeros((self.size, 0)));
        if cv.nrows() != self.size {
            return Err(EvolveError::SizeMismatch {
                expected: self.size,
                actual: cv.nrows(),
            });
        }
        self.objectives = Some(objectives);
        self.constraint_violation = cv;
        Ok(())
    }

    /// Replaces the fitness vector.
    pub fn set_fitness(&mut self, fitness: Array1<f64>) -> EvoResult<()> {
        if fitness.len() != self.size {
            return Err(EvolveError::SizeMismatch {
                expected: self.size,
                actual: fitness.len(),
            });
        }
        self.fitness = fitness;
        Ok(())
    }

    fn reset_evaluation(&mut self) {
        self.objectives = None;
        self.constraint_violation = Array2::zeros((self.size, 0));
        self.fitness = Array1::ones(self.size);
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the population has no individuals.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The decode field.
    pub fn field(&self) -> &DecodeField {
        &self.field
    }

    /// Shared handle to the decode field.
    pub fn field_arc(&self) -> Arc<DecodeField> {
        Arc::clone(&self.field)
    }

    /// The chromosome, `None` for a shell population.
    pub fn chromosome(&self) -> Option<&Array2<f64>> {
        self.chromosome.as_ref()
    }

    /// The decoded phenotype, `None` until decoded.
    pub fn phenotype(&self) -> Option<&Array2<f64>> {
        self.phenotype.as_ref()
    }

    /// Objective values, `None` until evaluated.
    pub fn objectives(&self) -> Option<&Array2<f64>> {
        self.objectives.as_ref()
    }

    /// Constraint violations; entries `<= 0` are satisfied.
    pub fn constraint_violation(&self) -> &Array2<f64> {
        &self.constraint_violation
    }

    /// Fitness, one non-negative scalar per individual (higher is better).
    pub fn fitness(&self) -> &Array1<f64> {
        &self.fitness
    }

    /// Total positive violation per individual.
    pub fn total_violation(&self) -> Array1<f64> {
        violation_totals(self.objectives.as_ref(), &self.constraint_violation)
    }

    /// Feasibility flag per individual.
    pub fn feasible_mask(&self) -> Vec<bool> {
        self.total_violation().iter().map(|&v| v <= 0.0).collect()
    }

    /// Returns a new population made of the rows at `indices`.
    ///
    /// Negative and duplicate indices are allowed. Row correspondence is kept
    /// across every matrix, fitness included.
    ///
    /// # Errors
    ///
    /// [`EvolveError::MissingChromosome`] for a shell population, or an
    /// out-of-range index.
    pub fn select(&self, indices: &[isize]) -> EvoResult<Population> {
        let resolved = resolve_indices(indices, self.size)?;
        self.subset(&resolved)
    }

    /// [`select`](Self::select) for already resolved indices.
    pub fn subset(&self, indices: &[usize]) -> EvoResult<Population> {
        let chromosome = self
            .chromosome
            .as_ref()
            .ok_or(EvolveError::MissingChromosome)?;
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.size) {
            return Err(EvolveError::InvalidConfiguration(format!(
                "index {bad} out of range for {} individuals",
                self.size
            )));
        }
        Ok(Population {
            encoding: self.encoding,
            field: Arc::clone(&self.field),
            size: indices.len(),
            chromosome: Some(chromosome.select(Axis(0), indices)),
            phenotype: self.phenotype.as_ref().map(|m| m.select(Axis(0), indices)),
            objectives: self.objectives.as_ref().map(|m| m.select(Axis(0), indices)),
            constraint_violation: self.constraint_violation.select(Axis(0), indices),
            fitness: self.fitness.select(Axis(0), indices),
        })
    }

    /// Overwrites the rows at `indices` with the individuals of `other`.
    ///
    /// Fitness of the whole population is reset to ones because relative
    /// ordering is no longer valid.
    pub fn assign(&mut self, indices: &[isize], other: &Population) -> EvoResult<()> {
        self.ensure_compatible(other)?;
        if indices.len() != other.size {
            return Err(EvolveError::SizeMismatch {
                expected: indices.len(),
                actual: other.size,
            });
        }
        let resolved = resolve_indices(indices, self.size)?;
        let (Some(dst), Some(src)) = (self.chromosome.as_mut(), other.chromosome.as_ref()) else {
            return Err(EvolveError::MissingChromosome);
        };
        for (k, &row) in resolved.iter().enumerate() {
            dst.row_mut(row).assign(&src.row(k));
        }

        let copied = match (self.phenotype.as_mut(), other.phenotype.as_ref()) {
            (Some(dst), Some(src)) => {
                for (k, &row) in resolved.iter().enumerate() {
                    dst.row_mut(row).assign(&src.row(k));
                }
                true
            }
            _ => false,
        };
        if !copied {
            self.decode()?;
        }

        self.objectives = match (self.objectives.take(), other.objectives.as_ref()) {
            (Some(mut dst), Some(src)) if dst.ncols() == src.ncols() => {
                for (k, &row) in resolved.iter().enumerate() {
                    dst.row_mut(row).assign(&src.row(k));
                }
                Some(dst)
            }
            _ => None,
        };

        let cols = self
            .constraint_violation
            .ncols()
            .max(other.constraint_violation.ncols());
        let mut cv = pad_columns(&self.constraint_violation, cols);
        let src_cv = pad_columns(&other.constraint_violation, cols);
        for (k, &row) in resolved.iter().enumerate() {
            cv.row_mut(row).assign(&src_cv.row(k));
        }
        self.constraint_violation = cv;
        self.fitness = Array1::ones(self.size);
        Ok(())
    }

    /// Concatenates `self` and `other` into a new population.
    ///
    /// The result has `self.len() + other.len()` rows in order, stacked
    /// objectives when both sides have them, and uniform fitness.
    ///
    /// # Errors
    ///
    /// Encoding or field mismatch, or a shell population on either side.
    pub fn concat(&self, other: &Population) -> EvoResult<Population> {
        self.ensure_compatible(other)?;
        let (Some(a), Some(b)) = (self.chromosome.as_ref(), other.chromosome.as_ref()) else {
            return Err(EvolveError::MissingChromosome);
        };
        let chromosome = stack(a, b)?;
        let phenotype = match (self.phenotype.as_ref(), other.phenotype.as_ref()) {
            (Some(a), Some(b)) => stack(a, b)?,
            _ => decode(&chromosome, &self.field, self.encoding)?,
        };
        let objectives = match (self.objectives.as_ref(), other.objectives.as_ref()) {
            (Some(a), Some(b)) => Some(stack(a, b)?),
            _ => None,
        };
        let size = self.size + other.size;
        Ok(Population {
            encoding: self.encoding,
            field: Arc::clone(&self.field),
            size,
            chromosome: Some(chromosome),
            phenotype: Some(phenotype),
            objectives,
            constraint_violation: stack_padded(
                &self.constraint_violation,
                &other.constraint_violation,
            )?,
            fitness: Array1::ones(size),
        })
    }

    /// Randomly permutes the individuals in place, keeping rows aligned.
    pub fn shuffle(&mut self, rng: &mut EvoRng) -> EvoResult<()> {
        let mut order: Vec<usize> = (0..self.size).collect();
        order.shuffle(rng);
        *self = self.subset(&order)?;
        Ok(())
    }

    fn ensure_compatible(&self, other: &Population) -> EvoResult<()> {
        if self.encoding != other.encoding {
            return Err(EvolveError::EncodingMismatch {
                expected: self.encoding.to_string(),
                actual: other.encoding.to_string(),
            });
        }
        if !Arc::ptr_eq(&self.field, &other.field) && *self.field != *other.field {
            return Err(EvolveError::FieldMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BinaryOptions, Variable};
    use crate::random::create_rng;
    use ndarray::array;

    fn ri_field() -> Arc<DecodeField> {
        Arc::new(DecodeField::real_integer(vec![Variable::continuous(0.0, 10.0); 2]).unwrap())
    }

    fn evaluated(chrom: Array2<f64>, field: &Arc<DecodeField>) -> Population {
        let mut pop =
            Population::from_chromosome(Encoding::RealInteger, Arc::clone(field), chrom).unwrap();
        let objv = pop.phenotype().unwrap().map_axis(Axis(1), |r| r.sum());
        let objv = objv.insert_axis(Axis(1));
        pop.set_evaluation(objv, None).unwrap();
        pop
    }

    #[test]
    fn test_shell_population() {
        let pop = Population::new(Encoding::RealInteger, ri_field(), 5).unwrap();
        assert_eq!(pop.len(), 5);
        assert!(pop.chromosome().is_none());
        assert_eq!(pop.fitness(), &Array1::<f64>::ones(5));
        assert_eq!(pop.constraint_violation().dim(), (5, 0));
        assert_eq!(pop.feasible_mask(), vec![true; 5]);
        assert_eq!(
            pop.select(&[0]).unwrap_err(),
            EvolveError::MissingChromosome
        );
    }

    #[test]
    fn test_field_encoding_mismatch() {
        let result = Population::new(Encoding::Permutation, ri_field(), 5);
        assert!(matches!(result, Err(EvolveError::EncodingMismatch { .. })));
    }

    #[test]
    fn test_initialize_resizes() {
        let mut rng = create_rng(42);
        let mut pop = Population::new(Encoding::RealInteger, ri_field(), 5).unwrap();
        pop.initialize(Some(8), &mut rng).unwrap();
        assert_eq!(pop.len(), 8);
        assert_eq!(pop.chromosome().unwrap().dim(), (8, 2));
        assert_eq!(pop.phenotype().unwrap().dim(), (8, 2));
        assert_eq!(pop.fitness().len(), 8);
    }

    #[test]
    fn test_initialize_with_prior() {
        let mut rng = create_rng(42);
        let mut pop = Population::new(Encoding::RealInteger, ri_field(), 4).unwrap();
        let prior = array![[1.0, 2.0], [3.0, 4.0]];
        pop.initialize_with_prior(&prior, &mut rng).unwrap();
        let chrom = pop.chromosome().unwrap();
        assert_eq!(chrom.nrows(), 4);
        assert_eq!(chrom.row(0).to_vec(), vec![1.0, 2.0]);
        assert_eq!(chrom.row(1).to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_prior_truncated_to_size() {
        let mut rng = create_rng(42);
        let mut pop = Population::new(Encoding::RealInteger, ri_field(), 1).unwrap();
        let prior = array![[1.0, 2.0], [3.0, 4.0]];
        pop.initialize_with_prior(&prior, &mut rng).unwrap();
        assert_eq!(pop.chromosome().unwrap(), &array![[1.0, 2.0]]);
    }

    #[test]
    fn test_set_chromosome_clears_evaluation() {
        let field = ri_field();
        let mut pop = evaluated(array![[1.0, 1.0]], &field);
        assert!(pop.objectives().is_some());
        pop.set_chromosome(array![[2.0, 2.0]]).unwrap();
        assert!(pop.objectives().is_none());
        assert_eq!(pop.phenotype().unwrap(), &array![[2.0, 2.0]]);
    }

    #[test]
    fn test_set_evaluation_row_check() {
        let field = ri_field();
        let mut pop =
            Population::from_chromosome(Encoding::RealInteger, field, array![[1.0, 1.0]]).unwrap();
        let err = pop.set_evaluation(array![[1.0], [2.0]], None).unwrap_err();
        assert_eq!(
            err,
            EvolveError::SizeMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_select_preserves_rows() {
        let field = ri_field();
        let mut pop = evaluated(array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]], &field);
        pop.set_fitness(array![0.1, 0.2, 0.3]).unwrap();

        let sub = pop.select(&[2, -3, 2]).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.objectives().unwrap().column(0).to_vec(), vec![3.0, 1.0, 3.0]);
        assert_eq!(sub.fitness().to_vec(), vec![0.3, 0.1, 0.3]);
        assert_eq!(sub.phenotype().unwrap().column(0).to_vec(), vec![3.0, 1.0, 3.0]);
    }

    #[test]
    fn test_select_is_a_copy() {
        let field = ri_field();
        let pop = evaluated(array![[1.0, 0.0], [2.0, 0.0]], &field);
        let mut sub = pop.select(&[0]).unwrap();
        sub.set_chromosome(array![[9.0, 9.0]]).unwrap();
        assert_eq!(pop.chromosome().unwrap()[[0, 0]], 1.0);
    }

    #[test]
    fn test_concat_size_law() {
        let field = ri_field();
        let a = evaluated(array![[1.0, 0.0], [2.0, 0.0]], &field);
        let b = evaluated(array![[5.0, 0.0]], &field);
        let c = a.concat(&b).unwrap();
        assert_eq!(c.len(), a.len() + b.len());
        assert_eq!(
            c.objectives().unwrap().column(0).to_vec(),
            vec![1.0, 2.0, 5.0]
        );
        assert_eq!(c.fitness(), &Array1::<f64>::ones(3));
    }

    #[test]
    fn test_concat_drops_partial_objectives() {
        let field = ri_field();
        let a = evaluated(array![[1.0, 0.0]], &field);
        let b = Population::from_chromosome(Encoding::RealInteger, Arc::clone(&field), array![[2.0, 0.0]])
            .unwrap();
        let c = a.concat(&b).unwrap();
        assert!(c.objectives().is_none());
        assert_eq!(c.phenotype().unwrap().nrows(), 2);
    }

    #[test]
    fn test_concat_pads_constraints() {
        let field = ri_field();
        let mut a = evaluated(array![[1.0, 0.0]], &field);
        a.set_evaluation(array![[1.0]], Some(array![[0.5, -1.0]])).unwrap();
        let b = evaluated(array![[2.0, 0.0]], &field);
        let c = a.concat(&b).unwrap();
        assert_eq!(c.constraint_violation(), &array![[0.5, -1.0], [0.0, 0.0]]);
        assert_eq!(c.feasible_mask(), vec![false, true]);
    }

    #[test]
    fn test_concat_field_mismatch() {
        let a = evaluated(array![[1.0, 0.0]], &ri_field());
        let other_field =
            DecodeField::real_integer(vec![Variable::continuous(0.0, 5.0); 2]).unwrap();
        let b = Population::from_chromosome(Encoding::RealInteger, other_field, array![[1.0, 1.0]])
            .unwrap();
        assert_eq!(a.concat(&b).unwrap_err(), EvolveError::FieldMismatch);
    }

    #[test]
    fn test_concat_equal_fields_by_value() {
        let a = evaluated(array![[1.0, 0.0]], &ri_field());
        let b = evaluated(array![[2.0, 0.0]], &ri_field());
        assert!(a.concat(&b).is_ok());
    }

    #[test]
    fn test_concat_encoding_mismatch() {
        let a = evaluated(array![[1.0, 0.0]], &ri_field());
        let bg = DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::discrete(0.0, 1.0)],
            &BinaryOptions::default(),
        )
        .unwrap();
        let b = Population::from_chromosome(Encoding::BinaryGray, bg, array![[1.0]]).unwrap();
        assert!(matches!(
            a.concat(&b),
            Err(EvolveError::EncodingMismatch { .. })
        ));
    }

    #[test]
    fn test_concat_shell_fails() {
        let field = ri_field();
        let a = evaluated(array![[1.0, 0.0]], &field);
        let shell = Population::new(Encoding::RealInteger, Arc::clone(&field), 3).unwrap();
        assert_eq!(a.concat(&shell).unwrap_err(), EvolveError::MissingChromosome);
    }

    #[test]
    fn test_assign_rows_and_reset_fitness() {
        let field = ri_field();
        let mut pop = evaluated(array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]], &field);
        pop.set_fitness(array![3.0, 2.0, 1.0]).unwrap();
        let other = evaluated(array![[7.0, 0.0]], &field);

        pop.assign(&[-1], &other).unwrap();
        assert_eq!(pop.chromosome().unwrap().row(2).to_vec(), vec![7.0, 0.0]);
        assert_eq!(pop.objectives().unwrap()[[2, 0]], 7.0);
        assert_eq!(pop.fitness(), &Array1::<f64>::ones(3));
    }

    #[test]
    fn test_assign_size_mismatch() {
        let field = ri_field();
        let mut pop = evaluated(array![[1.0, 0.0], [2.0, 0.0]], &field);
        let other = evaluated(array![[7.0, 0.0]], &field);
        assert!(matches!(
            pop.assign(&[0, 1], &other),
            Err(EvolveError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_shuffle_keeps_rows_aligned() {
        let mut rng = create_rng(42);
        let field = ri_field();
        let chrom = Array2::from_shape_fn((20, 2), |(i, j)| (i * 10 + j) as f64);
        let mut pop = evaluated(chrom, &field);
        pop.set_fitness(Array1::from_shape_fn(20, |i| i as f64)).unwrap();

        pop.shuffle(&mut rng).unwrap();
        let chrom = pop.chromosome().unwrap();
        for i in 0..20 {
            let original = chrom[[i, 0]] / 10.0;
            assert_eq!(pop.fitness()[i], original);
            assert_eq!(pop.objectives().unwrap()[[i, 0]], chrom[[i, 0]] + chrom[[i, 1]]);
        }
    }

    #[test]
    fn test_decode_twice_identical() {
        let mut rng = create_rng(42);
        let field = DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::continuous(-1.0, 1.0); 2],
            &BinaryOptions::default(),
        )
        .unwrap();
        let mut pop = Population::new(Encoding::BinaryGray, field, 6).unwrap();
        pop.initialize(None, &mut rng).unwrap();
        let first = pop.decode().unwrap().clone();
        let second = pop.decode().unwrap().clone();
        assert_eq!(first, second);
    }
}
