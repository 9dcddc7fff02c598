//! Decoding and random chromosome generation.

use super::field::{BitSegment, DecodeField};
use super::types::{BitCode, BitScale, Encoding, Variable};
use crate::error::{EvoResult, EvolveError};
use crate::random::EvoRng;
use ndarray::{Array2, ArrayView1};
use rand::seq::index::sample;
use rand::Rng;

/// Decodes a chromosome matrix into its phenotype matrix.
///
/// Binary/Gray rows are mapped segment by segment onto the variable bounds;
/// real-integer and permutation chromosomes are copied. The result is a pure
/// function of the inputs.
///
/// # Errors
///
/// - [`EvolveError::InvalidField`] if `field` was built for another encoding
/// - [`EvolveError::SizeMismatch`] if the column count is not
///   [`DecodeField::chromosome_len`]
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use u_evolve::codec::{decode, BinaryOptions, BitCode, DecodeField, Encoding, Variable};
///
/// let field = DecodeField::new(
///     Encoding::BinaryGray,
///     vec![Variable::discrete(0.0, 7.0)],
///     &BinaryOptions::default().with_code(BitCode::Binary),
/// )
/// .unwrap();
///
/// let phen = decode(&array![[1.0, 0.0, 1.0]], &field, Encoding::BinaryGray).unwrap();
/// assert_eq!(phen[[0, 0]], 5.0);
/// ```
pub fn decode(
    chromosome: &Array2<f64>,
    field: &DecodeField,
    encoding: Encoding,
) -> EvoResult<Array2<f64>> {
    if field.encoding() != encoding {
        return Err(EvolveError::InvalidField(format!(
            "field built for {} cannot decode {encoding}",
            field.encoding()
        )));
    }
    if chromosome.ncols() != field.chromosome_len() {
        return Err(EvolveError::SizeMismatch {
            expected: field.chromosome_len(),
            actual: chromosome.ncols(),
        });
    }

    match encoding {
        Encoding::RealInteger | Encoding::Permutation => Ok(chromosome.to_owned()),
        Encoding::BinaryGray => {
            let n_vars = field.n_vars();
            let mut phenotype = Array2::zeros((chromosome.nrows(), n_vars));
            for (row_idx, row) in chromosome.rows().into_iter().enumerate() {
                let mut offset = 0;
                for (var_idx, (segment, var)) in field
                    .segments()
                    .iter()
                    .zip(field.variables())
                    .enumerate()
                {
                    let k = segment_value(row, offset, segment);
                    phenotype[[row_idx, var_idx]] = map_segment(k, segment, var);
                    offset += segment.bits;
                }
            }
            Ok(phenotype)
        }
    }
}

/// Reads the unsigned integer held by one bit segment. Genes `>= 0.5` are ones.
fn segment_value(row: ArrayView1<f64>, offset: usize, segment: &BitSegment) -> u64 {
    let mut value = 0u64;
    let mut prev = 0u64;
    for i in 0..segment.bits {
        let bit = u64::from(row[offset + i] >= 0.5);
        let b = match segment.code {
            BitCode::Binary => bit,
            // Gray -> binary: b_i = b_{i-1} xor g_i
            BitCode::Gray => prev ^ bit,
        };
        prev = b;
        value = (value << 1) | b;
    }
    value
}

fn map_segment(k: u64, segment: &BitSegment, var: &Variable) -> f64 {
    if var.is_discrete() {
        return (var.lb + k as f64).min(var.ub);
    }

    let o_lb = if var.include_lb { 0.0 } else { 1.0 };
    let o_ub = if var.include_ub { 0.0 } else { 1.0 };
    let max_k = ((1u128 << segment.bits) - 1) as f64;
    let t = (k as f64 + o_lb) / (max_k + o_lb + o_ub);

    match segment.scale {
        BitScale::Arithmetic => var.lb + t * (var.ub - var.lb),
        BitScale::Logarithmic => var.lb * (var.ub / var.lb).powf(t),
    }
}

/// Generates `rows` random chromosome rows valid for `field`.
///
/// - binary/Gray: uniform bits
/// - real-integer: uniform reals on `[lb, ub]`, uniform integers for discrete
///   variables
/// - permutation: `n` distinct integers sampled from the shared range
pub fn random_chromosome(field: &DecodeField, rows: usize, rng: &mut EvoRng) -> Array2<f64> {
    let cols = field.chromosome_len();
    match field.encoding() {
        Encoding::BinaryGray => {
            Array2::from_shape_fn((rows, cols), |_| if rng.random_bool(0.5) { 1.0 } else { 0.0 })
        }
        Encoding::RealInteger => {
            let vars = field.variables();
            Array2::from_shape_fn((rows, cols), |(_, j)| random_gene(&vars[j], rng))
        }
        Encoding::Permutation => {
            let (lb, ub) = field.permutation_range();
            let available = (ub - lb) as usize + 1;
            let mut chrom = Array2::zeros((rows, cols));
            for mut row in chrom.rows_mut() {
                for (gene, idx) in row.iter_mut().zip(sample(rng, available, cols).into_iter()) {
                    *gene = (lb + idx as i64) as f64;
                }
            }
            chrom
        }
    }
}

fn random_gene(var: &Variable, rng: &mut EvoRng) -> f64 {
    if var.lb == var.ub {
        return var.lb;
    }
    if var.is_discrete() {
        rng.random_range(var.lb as i64..=var.ub as i64) as f64
    } else {
        rng.random_range(var.lb..=var.ub)
    }
}
