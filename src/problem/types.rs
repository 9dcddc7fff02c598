//! Problem metadata and evaluation results.

use crate::codec::Variable;
use crate::error::{EvoResult, EvolveError};
use crate::ranking::Sense;
use ndarray::Array2;

/// Static description of a problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemDescriptor {
    /// Display name.
    pub name: String,

    /// Number of objectives (M).
    pub n_objectives: usize,

    /// Direction of each objective. Defaults to all minimize.
    pub senses: Vec<Sense>,

    /// Decision variables with their bounds.
    pub variables: Vec<Variable>,
}

impl ProblemDescriptor {
    /// Creates a descriptor with every objective minimized.
    pub fn new(name: impl Into<String>, n_objectives: usize, variables: Vec<Variable>) -> Self {
        Self {
            name: name.into(),
            n_objectives,
            senses: vec![Sense::Minimize; n_objectives],
            variables,
        }
    }

    /// Sets the direction of every objective.
    pub fn with_senses(mut self, senses: Vec<Sense>) -> Self {
        self.senses = senses;
        self
    }

    /// Marks objective `idx` as maximized.
    pub fn maximize(mut self, idx: usize) -> Self {
        if let Some(sense) = self.senses.get_mut(idx) {
            *sense = Sense::Maximize;
        }
        self
    }

    /// Number of decision variables.
    pub fn n_vars(&self) -> usize {
        self.variables.len()
    }

    /// Returns true for single-objective problems.
    pub fn is_single_objective(&self) -> bool {
        self.n_objectives == 1
    }

    /// Validates objective count, senses and variable bounds.
    pub fn validate(&self) -> EvoResult<()> {
        if self.n_objectives == 0 {
            return Err(EvolveError::InvalidConfiguration(
                "problem must declare at least one objective".into(),
            ));
        }
        if self.senses.len() != self.n_objectives {
            return Err(EvolveError::SizeMismatch {
                expected: self.n_objectives,
                actual: self.senses.len(),
            });
        }
        if self.variables.is_empty() {
            return Err(EvolveError::InvalidConfiguration(
                "problem must declare at least one variable".into(),
            ));
        }
        for (idx, var) in self.variables.iter().enumerate() {
            var.validate(idx)?;
        }
        Ok(())
    }
}

/// Output of a whole-population evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// One row per individual, one column per objective.
    pub objectives: Array2<f64>,

    /// One row per individual, one column per constraint. `None` when the
    /// problem has no constraints.
    pub constraint_violation: Option<Array2<f64>>,
}

impl Evaluation {
    /// An unconstrained evaluation.
    pub fn new(objectives: Array2<f64>) -> Self {
        Self {
            objectives,
            constraint_violation: None,
        }
    }

    /// Attaches a constraint-violation matrix.
    pub fn with_constraints(mut self, constraint_violation: Array2<f64>) -> Self {
        self.constraint_violation = Some(constraint_violation);
        self
    }
}

/// Output of a single-individual evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowEvaluation {
    /// Objective values.
    pub objectives: Vec<f64>,

    /// Constraint violations; empty when unconstrained.
    pub constraint_violation: Vec<f64>,
}

impl RowEvaluation {
    /// An unconstrained row.
    pub fn new(objectives: Vec<f64>) -> Self {
        Self {
            objectives,
            constraint_violation: Vec::new(),
        }
    }

    /// Attaches constraint violations.
    pub fn with_constraints(mut self, constraint_violation: Vec<f64>) -> Self {
        self.constraint_violation = constraint_violation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let d = ProblemDescriptor::new("demo", 2, vec![Variable::continuous(0.0, 1.0)]);
        assert_eq!(d.senses, vec![Sense::Minimize, Sense::Minimize]);
        assert!(!d.is_single_objective());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_descriptor_maximize() {
        let d = ProblemDescriptor::new("demo", 2, vec![Variable::continuous(0.0, 1.0)]).maximize(1);
        assert_eq!(d.senses, vec![Sense::Minimize, Sense::Maximize]);
    }

    #[test]
    fn test_descriptor_invalid() {
        let vars = vec![Variable::continuous(0.0, 1.0)];
        assert!(ProblemDescriptor::new("demo", 0, vars.clone()).validate().is_err());
        assert!(ProblemDescriptor::new("demo", 1, vec![]).validate().is_err());
        let bad = ProblemDescriptor::new("demo", 2, vars.clone()).with_senses(vec![Sense::Maximize]);
        assert!(bad.validate().is_err());
        let inverted = ProblemDescriptor::new("demo", 1, vec![Variable::continuous(1.0, 0.0)]);
        assert!(inverted.validate().is_err());
    }
}
