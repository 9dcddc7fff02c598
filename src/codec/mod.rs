//! Chromosome codec.
//!
//! Translates between the three supported genetic encodings and real-valued
//! decision variables.
//!
//! # Encodings
//!
//! - [`Encoding::BinaryGray`]: each variable is a bit segment, decoded through
//!   plain binary or Gray code onto its bounds
//! - [`Encoding::RealInteger`]: genes are the decision variables themselves
//! - [`Encoding::Permutation`]: each row holds distinct integers drawn from a
//!   shared `[lb, ub]` range
//!
//! # Key Types
//!
//! - [`Variable`]: bounds and kind of one decision variable
//! - [`DecodeField`]: per-variable codec parameters for one encoding
//! - [`decode`]: chromosome matrix → phenotype matrix (pure)
//! - [`random_chromosome`]: random valid chromosome rows

mod decode;
mod field;
mod types;

pub use decode::{decode, random_chromosome};
pub use field::{BitSegment, DecodeField};
pub use types::{BinaryOptions, BitCode, BitScale, Encoding, VarKind, Variable};
