//! Error types for u-evolve.
//!
//! Configuration problems (bad encodings, mismatched populations, malformed
//! evaluator output, missing termination limits) are fatal and surface as
//! [`EvolveError`]. Numeric-quality issues are only warned about through
//! `tracing`, and a generation without feasible individuals is reported as a
//! [`GenerationOutcome`](crate::stats::GenerationOutcome), never as an error.

use thiserror::Error;

/// Top-level error type for evolution operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvolveError {
    /// None of the generation, time, or evaluation limits was configured.
    #[error(
        "no termination limit configured: set at least one of max_generations, max_time, max_evaluations"
    )]
    MissingTerminationLimit,

    /// Two populations with different encodings were combined.
    #[error("encoding mismatch: expected {expected}, got {actual}")]
    EncodingMismatch { expected: String, actual: String },

    /// Two populations with different decode fields were combined.
    #[error("decode field mismatch between populations")]
    FieldMismatch,

    /// An operation needed a chromosome but the population is still a shell.
    #[error("population has no chromosome")]
    MissingChromosome,

    /// An operation needed objective values but the population is unevaluated.
    #[error("population has not been evaluated")]
    MissingObjectives,

    /// Row counts disagree.
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The encoding string is not one of the supported values.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// The evaluator returned matrices of the wrong shape.
    #[error("malformed evaluation: {0}")]
    MalformedEvaluation(String),

    /// The decode field cannot describe the requested variables.
    #[error("invalid decode field: {0}")]
    InvalidField(String),

    /// Invalid algorithm or operator configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The problem's evaluation function failed.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// The per-generation user callback failed.
    #[error("generation callback failed: {0}")]
    Callback(String),
}

impl EvolveError {
    /// Returns true for the fatal configuration subset of errors.
    ///
    /// Evaluator and callback failures are propagated but originate outside
    /// the engine, so they are not classified as configuration errors.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Evaluation(_) | Self::Callback(_))
    }
}

impl From<ndarray::ShapeError> for EvolveError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::MalformedEvaluation(err.to_string())
    }
}

/// Result type alias for evolution operations.
pub type EvoResult<T> = Result<T, EvolveError>;
