//! Encoding and variable descriptors.

use crate::error::{EvoResult, EvolveError};
use std::fmt;
use std::str::FromStr;

/// Chromosome representation.
///
/// Parsed from the short codes `"BG"`, `"RI"`, `"P"` (or their long names,
/// case-insensitive). Anything else is [`EvolveError::UnsupportedEncoding`].
///
/// ```
/// use u_evolve::codec::Encoding;
///
/// let enc: Encoding = "ri".parse().unwrap();
/// assert_eq!(enc, Encoding::RealInteger);
/// assert!("xyz".parse::<Encoding>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    /// Binary or Gray coded bit strings.
    BinaryGray,
    /// Real and integer valued genes.
    RealInteger,
    /// Permutations of distinct integers.
    Permutation,
}

impl Encoding {
    /// Short code used in descriptors and logs.
    pub fn code(self) -> &'static str {
        match self {
            Encoding::BinaryGray => "BG",
            Encoding::RealInteger => "RI",
            Encoding::Permutation => "P",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Encoding {
    type Err = EvolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "BG" | "BINARYGRAY" | "BINARY" | "GRAY" => Ok(Encoding::BinaryGray),
            "RI" | "REALINTEGER" => Ok(Encoding::RealInteger),
            "P" | "PERMUTATION" => Ok(Encoding::Permutation),
            _ => Err(EvolveError::UnsupportedEncoding(s.to_string())),
        }
    }
}

/// Whether a decision variable is continuous or integer valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    Continuous,
    Discrete,
}

/// Bounds and kind of a single decision variable.
///
/// # Examples
///
/// ```
/// use u_evolve::codec::{VarKind, Variable};
///
/// let x = Variable::continuous(-10.0, 10.0).exclude_ub();
/// assert_eq!(x.kind, VarKind::Continuous);
/// assert!(x.include_lb && !x.include_ub);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    /// Lower bound.
    pub lb: f64,
    /// Upper bound.
    pub ub: f64,
    /// Continuous or discrete.
    pub kind: VarKind,
    /// Whether `lb` itself is reachable by binary decoding.
    pub include_lb: bool,
    /// Whether `ub` itself is reachable by binary decoding.
    pub include_ub: bool,
}

impl Variable {
    /// A continuous variable on `[lb, ub]`.
    pub fn continuous(lb: f64, ub: f64) -> Self {
        Self {
            lb,
            ub,
            kind: VarKind::Continuous,
            include_lb: true,
            include_ub: true,
        }
    }

    /// An integer variable on `[lb, ub]`.
    pub fn discrete(lb: f64, ub: f64) -> Self {
        Self {
            kind: VarKind::Discrete,
            ..Self::continuous(lb, ub)
        }
    }

    /// Makes the lower bound unreachable for binary decoding.
    pub fn exclude_lb(mut self) -> Self {
        self.include_lb = false;
        self
    }

    /// Makes the upper bound unreachable for binary decoding.
    pub fn exclude_ub(mut self) -> Self {
        self.include_ub = false;
        self
    }

    /// Returns true for integer valued variables.
    pub fn is_discrete(&self) -> bool {
        self.kind == VarKind::Discrete
    }

    /// Clamps `value` into the bounds, rounding discrete variables.
    pub fn repair(&self, value: f64) -> f64 {
        let v = value.clamp(self.lb, self.ub);
        if self.is_discrete() {
            v.round().clamp(self.lb, self.ub)
        } else {
            v
        }
    }

    pub(crate) fn validate(&self, idx: usize) -> EvoResult<()> {
        if !self.lb.is_finite() || !self.ub.is_finite() {
            return Err(EvolveError::InvalidField(format!(
                "variable {idx}: bounds must be finite"
            )));
        }
        if self.lb > self.ub {
            return Err(EvolveError::InvalidField(format!(
                "variable {idx}: lb {} exceeds ub {}",
                self.lb, self.ub
            )));
        }
        if self.is_discrete() && (self.lb.fract() != 0.0 || self.ub.fract() != 0.0) {
            return Err(EvolveError::InvalidField(format!(
                "variable {idx}: discrete bounds must be integral"
            )));
        }
        Ok(())
    }
}

/// Bit-to-integer code of a binary segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitCode {
    /// Standard binary, most significant bit first.
    Binary,
    /// Reflected Gray code, most significant bit first.
    #[default]
    Gray,
}

/// Mapping of a decoded fraction onto a continuous variable's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitScale {
    /// `lb + t (ub - lb)`.
    #[default]
    Arithmetic,
    /// `lb (ub / lb)^t`; requires a positive lower bound.
    Logarithmic,
}

/// Parameters used when building a binary/Gray [`DecodeField`](super::DecodeField).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryOptions {
    /// Bit code for every segment.
    pub code: BitCode,
    /// Scale for continuous segments.
    pub scale: BitScale,
    /// Decimal digits resolved for continuous variables.
    pub precision: u32,
    /// Fixed bit count per variable, overriding `precision`.
    pub bits: Option<usize>,
}

impl Default for BinaryOptions {
    fn default() -> Self {
        Self {
            code: BitCode::Gray,
            scale: BitScale::Arithmetic,
            precision: 4,
            bits: None,
        }
    }
}

impl BinaryOptions {
    /// Sets the bit code.
    pub fn with_code(mut self, code: BitCode) -> Self {
        self.code = code;
        self
    }

    /// Sets the scale.
    pub fn with_scale(mut self, scale: BitScale) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the decimal precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Fixes the number of bits per variable.
    pub fn with_bits(mut self, bits: usize) -> Self {
        self.bits = Some(bits);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encodings() {
        assert_eq!("BG".parse::<Encoding>().unwrap(), Encoding::BinaryGray);
        assert_eq!("binary-gray".parse::<Encoding>().unwrap(), Encoding::BinaryGray);
        assert_eq!("RI".parse::<Encoding>().unwrap(), Encoding::RealInteger);
        assert_eq!("real_integer".parse::<Encoding>().unwrap(), Encoding::RealInteger);
        assert_eq!("p".parse::<Encoding>().unwrap(), Encoding::Permutation);
        assert_eq!(
            "Permutation".parse::<Encoding>().unwrap(),
            Encoding::Permutation
        );
    }

    #[test]
    fn test_parse_unsupported() {
        let err = "tree".parse::<Encoding>().unwrap_err();
        assert_eq!(err, EvolveError::UnsupportedEncoding("tree".to_string()));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_display_roundtrip() {
        for enc in [
            Encoding::BinaryGray,
            Encoding::RealInteger,
            Encoding::Permutation,
        ] {
            assert_eq!(enc.to_string().parse::<Encoding>().unwrap(), enc);
        }
    }

    #[test]
    fn test_variable_repair() {
        let x = Variable::continuous(-1.0, 1.0);
        assert_eq!(x.repair(3.0), 1.0);
        assert_eq!(x.repair(-0.25), -0.25);

        let k = Variable::discrete(0.0, 5.0);
        assert_eq!(k.repair(2.6), 3.0);
        assert_eq!(k.repair(9.0), 5.0);
    }

    #[test]
    fn test_variable_validation() {
        assert!(Variable::continuous(0.0, 1.0).validate(0).is_ok());
        assert!(Variable::continuous(2.0, 1.0).validate(0).is_err());
        assert!(Variable::continuous(0.0, f64::INFINITY).validate(0).is_err());
        assert!(Variable::discrete(0.5, 3.0).validate(0).is_err());
    }

    #[test]
    fn test_binary_options_builder() {
        let opts = BinaryOptions::default()
            .with_code(BitCode::Binary)
            .with_scale(BitScale::Logarithmic)
            .with_precision(6)
            .with_bits(12);
        assert_eq!(opts.code, BitCode::Binary);
        assert_eq!(opts.scale, BitScale::Logarithmic);
        assert_eq!(opts.precision, 6);
        assert_eq!(opts.bits, Some(12));
    }
}
