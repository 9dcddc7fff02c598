//! Recombination + mutation pipeline.

use super::{
    BitFlip, InversionMutation, Mutation, PmxCrossover, PolynomialMutation, Recombination,
    SbxCrossover, TwoPointCrossover,
};
use crate::codec::{DecodeField, Encoding};
use crate::error::EvoResult;
use crate::random::EvoRng;
use ndarray::Array2;

/// Recombination followed by an optional mutation.
#[derive(Debug)]
pub struct Variation {
    recombination: Box<dyn Recombination>,
    mutation: Option<Box<dyn Mutation>>,
}

impl Variation {
    /// Recombination only.
    pub fn new(recombination: impl Recombination + 'static) -> Self {
        Self {
            recombination: Box::new(recombination),
            mutation: None,
        }
    }

    /// Adds a mutation step.
    pub fn with_mutation(mut self, mutation: impl Mutation + 'static) -> Self {
        self.mutation = Some(Box::new(mutation));
        self
    }

    /// Default operators for an encoding:
    ///
    /// | Encoding | Recombination | Mutation |
    /// |---|---|---|
    /// | BG | two-point | bit flip (1/L) |
    /// | RI | SBX | polynomial (1/n) |
    /// | P | PMX | inversion |
    pub fn for_encoding(encoding: Encoding) -> Self {
        match encoding {
            Encoding::BinaryGray => {
                Self::new(TwoPointCrossover::default()).with_mutation(BitFlip::default())
            }
            Encoding::RealInteger => {
                Self::new(SbxCrossover::default()).with_mutation(PolynomialMutation::default())
            }
            Encoding::Permutation => {
                Self::new(PmxCrossover::default()).with_mutation(InversionMutation::default())
            }
        }
    }

    /// The recombination step.
    pub fn recombination(&self) -> &dyn Recombination {
        self.recombination.as_ref()
    }

    /// The mutation step, if any.
    pub fn mutation(&self) -> Option<&dyn Mutation> {
        self.mutation.as_deref()
    }

    /// Produces offspring from a mating pool.
    pub fn apply(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        let offspring = self.recombination.recombine(chromosome, field, rng)?;
        match &self.mutation {
            Some(mutation) => mutation.mutate(&offspring, field, rng),
            None => Ok(offspring),
        }
    }
}
