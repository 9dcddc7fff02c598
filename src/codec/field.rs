//! Decode fields: the per-variable codec parameters of one encoding.

use super::types::{BinaryOptions, BitCode, BitScale, Encoding, Variable};
use crate::error::{EvoResult, EvolveError};

/// Largest segment that still decodes into an exact `u64`.
const MAX_SEGMENT_BITS: usize = 63;

/// Layout of one variable inside a binary/Gray chromosome.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitSegment {
    /// Number of genes used by this variable.
    pub bits: usize,
    /// Bit code.
    pub code: BitCode,
    /// Scale applied to continuous variables.
    pub scale: BitScale,
}

/// Codec parameters shared by every individual of a population.
///
/// Two populations can only be combined when their fields compare equal.
///
/// # Examples
///
/// ```
/// use u_evolve::codec::{BinaryOptions, DecodeField, Encoding, Variable};
///
/// let vars = vec![Variable::continuous(0.0, 1.0), Variable::discrete(0.0, 7.0)];
/// let field = DecodeField::new(
///     Encoding::BinaryGray,
///     vars,
///     &BinaryOptions::default().with_precision(2),
/// )
/// .unwrap();
///
/// // 0..1 at two decimals needs 7 bits, 0..7 needs 3.
/// assert_eq!(field.chromosome_len(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeField {
    encoding: Encoding,
    variables: Vec<Variable>,
    segments: Vec<BitSegment>,
}

impl DecodeField {
    /// Builds a field for `encoding` over `variables`.
    ///
    /// `options` is only consulted for [`Encoding::BinaryGray`].
    pub fn new(
        encoding: Encoding,
        variables: Vec<Variable>,
        options: &BinaryOptions,
    ) -> EvoResult<Self> {
        if variables.is_empty() {
            return Err(EvolveError::InvalidField(
                "at least one decision variable is required".into(),
            ));
        }
        for (i, v) in variables.iter().enumerate() {
            v.validate(i)?;
        }

        let segments = match encoding {
            Encoding::BinaryGray => variables
                .iter()
                .enumerate()
                .map(|(i, v)| segment_for(i, v, options))
                .collect::<EvoResult<Vec<_>>>()?,
            Encoding::RealInteger => Vec::new(),
            Encoding::Permutation => {
                validate_permutation(&variables)?;
                Vec::new()
            }
        };

        Ok(Self {
            encoding,
            variables,
            segments,
        })
    }

    /// Real/integer field with default options.
    pub fn real_integer(variables: Vec<Variable>) -> EvoResult<Self> {
        Self::new(Encoding::RealInteger, variables, &BinaryOptions::default())
    }

    /// Permutation field over `n` distinct integers taken from `[lb, ub]`.
    pub fn permutation(n: usize, lb: i64, ub: i64) -> EvoResult<Self> {
        let var = Variable::discrete(lb as f64, ub as f64);
        Self::new(Encoding::Permutation, vec![var; n], &BinaryOptions::default())
    }

    /// The encoding this field was built for.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Decision variables, one per phenotype column.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Bit segments; empty unless the encoding is binary/Gray.
    pub fn segments(&self) -> &[BitSegment] {
        &self.segments
    }

    /// Number of decision variables.
    pub fn n_vars(&self) -> usize {
        self.variables.len()
    }

    /// Number of genes per chromosome row.
    pub fn chromosome_len(&self) -> usize {
        match self.encoding {
            Encoding::BinaryGray => self.segments.iter().map(|s| s.bits).sum(),
            Encoding::RealInteger | Encoding::Permutation => self.variables.len(),
        }
    }

    /// Integer range `[lb, ub]` shared by permutation genes.
    pub(crate) fn permutation_range(&self) -> (i64, i64) {
        let v = &self.variables[0];
        (v.lb as i64, v.ub as i64)
    }
}

fn segment_for(idx: usize, var: &Variable, options: &BinaryOptions) -> EvoResult<BitSegment> {
    let bits = match options.bits {
        Some(bits) => bits,
        None if var.is_discrete() => {
            let span = var.ub - var.lb + 1.0;
            span.log2().ceil() as usize
        }
        None => {
            let steps = (var.ub - var.lb) * 10f64.powi(options.precision as i32) + 1.0;
            steps.log2().ceil() as usize
        }
    }
    .max(1);

    if bits > MAX_SEGMENT_BITS {
        return Err(EvolveError::InvalidField(format!(
            "variable {idx}: {bits} bits exceed the {MAX_SEGMENT_BITS}-bit segment limit"
        )));
    }
    if options.scale == BitScale::Logarithmic && !var.is_discrete() && var.lb <= 0.0 {
        return Err(EvolveError::InvalidField(format!(
            "variable {idx}: logarithmic scale needs a positive lower bound"
        )));
    }

    Ok(BitSegment {
        bits,
        code: options.code,
        scale: options.scale,
    })
}

fn validate_permutation(variables: &[Variable]) -> EvoResult<()> {
    let first = &variables[0];
    if variables
        .iter()
        .any(|v| !v.is_discrete() || v.lb != first.lb || v.ub != first.ub)
    {
        return Err(EvolveError::InvalidField(
            "permutation variables must be discrete and share one range".into(),
        ));
    }
    let available = (first.ub - first.lb) as usize + 1;
    if available < variables.len() {
        return Err(EvolveError::InvalidField(format!(
            "permutation of {} elements cannot be drawn from {available} values",
            variables.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_bits_from_precision() {
        let field = DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::continuous(-10.0, 10.0)],
            &BinaryOptions::default(),
        )
        .unwrap();
        // 20 * 10^4 + 1 = 200001 steps -> 18 bits
        assert_eq!(field.segments()[0].bits, 18);
        assert_eq!(field.chromosome_len(), 18);
    }

    #[test]
    fn test_binary_bits_discrete() {
        let field = DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::discrete(0.0, 9.0), Variable::discrete(3.0, 3.0)],
            &BinaryOptions::default(),
        )
        .unwrap();
        assert_eq!(field.segments()[0].bits, 4);
        assert_eq!(field.segments()[1].bits, 1);
    }

    #[test]
    fn test_fixed_bits_override() {
        let field = DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::continuous(0.0, 1.0); 3],
            &BinaryOptions::default().with_bits(8),
        )
        .unwrap();
        assert_eq!(field.chromosome_len(), 24);
    }

    #[test]
    fn test_too_many_bits() {
        let result = DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::continuous(0.0, 1.0)],
            &BinaryOptions::default().with_bits(64),
        );
        assert!(matches!(result, Err(EvolveError::InvalidField(_))));
    }

    #[test]
    fn test_log_scale_requires_positive_lb() {
        let opts = BinaryOptions::default().with_scale(BitScale::Logarithmic);
        assert!(DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::continuous(0.0, 10.0)],
            &opts
        )
        .is_err());
        assert!(DecodeField::new(
            Encoding::BinaryGray,
            vec![Variable::continuous(1.0, 10.0)],
            &opts
        )
        .is_ok());
    }

    #[test]
    fn test_real_integer_len() {
        let field = DecodeField::real_integer(vec![
            Variable::continuous(0.0, 1.0),
            Variable::discrete(0.0, 4.0),
        ])
        .unwrap();
        assert_eq!(field.chromosome_len(), 2);
        assert!(field.segments().is_empty());
    }

    #[test]
    fn test_permutation_validation() {
        assert!(DecodeField::permutation(5, 0, 4).is_ok());
        assert!(DecodeField::permutation(3, 0, 9).is_ok());
        assert!(DecodeField::permutation(6, 0, 4).is_err());

        let mixed = vec![Variable::discrete(0.0, 4.0), Variable::discrete(1.0, 4.0)];
        assert!(DecodeField::new(Encoding::Permutation, mixed, &BinaryOptions::default()).is_err());
    }

    #[test]
    fn test_empty_variables() {
        assert!(DecodeField::real_integer(vec![]).is_err());
    }
}
