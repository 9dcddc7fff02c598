//! Mutation operators.
//!
//! Real-valued mutations repair out-of-range genes. The repair is
//! operator-specific: [`PolynomialMutation`] clips to the bounds,
//! [`GaussianMutation`] wraps around them. Discrete variables are rounded
//! afterwards in both cases.
//!
//! # References
//!
//! - Deb & Goyal (1996), "A Combined Genetic Adaptive Search (GeneAS) for
//!   Engineering Design"

use super::permutation::{invert, swap};
use super::{ensure_encoding, Mutation};
use crate::codec::{DecodeField, Encoding};
use crate::error::EvoResult;
use crate::random::EvoRng;
use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;

/// Per-gene probability: explicit, or `1 / genes` by default.
fn gene_rate(rate: Option<f64>, genes: usize) -> f64 {
    rate.unwrap_or(1.0 / genes.max(1) as f64)
}

/// Flips each bit with a small probability.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitFlip {
    /// Per-bit probability; `None` means `1 / chromosome length`.
    pub rate: Option<f64>,
}

impl BitFlip {
    pub fn new(rate: f64) -> Self {
        Self { rate: Some(rate) }
    }
}

impl Mutation for BitFlip {
    fn name(&self) -> &'static str {
        "bit flip"
    }

    fn mutate(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::BinaryGray], field)?;
        let rate = gene_rate(self.rate, chromosome.ncols());
        Ok(chromosome.mapv(|bit| {
            let bit = if bit >= 0.5 { 1.0 } else { 0.0 };
            if rng.random_range(0.0..1.0) < rate {
                1.0 - bit
            } else {
                bit
            }
        }))
    }
}

/// Polynomial mutation with clip repair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialMutation {
    /// Distribution index.
    pub eta: f64,
    /// Per-gene probability; `None` means `1 / variables`.
    pub rate: Option<f64>,
}

impl PolynomialMutation {
    pub fn new(eta: f64) -> Self {
        Self { eta, rate: None }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }
}

impl Default for PolynomialMutation {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl Mutation for PolynomialMutation {
    fn name(&self) -> &'static str {
        "polynomial mutation"
    }

    fn mutate(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::RealInteger], field)?;
        let rate = gene_rate(self.rate, field.n_vars());
        let power = 1.0 / (self.eta + 1.0);
        let mut out = chromosome.to_owned();

        for mut row in out.rows_mut() {
            for (x, var) in row.iter_mut().zip(field.variables()) {
                let span = var.ub - var.lb;
                if span <= 0.0 || rng.random_range(0.0..1.0) >= rate {
                    continue;
                }
                let d1 = (*x - var.lb) / span;
                let d2 = (var.ub - *x) / span;
                let u: f64 = rng.random_range(0.0..1.0);
                let dq = if u < 0.5 {
                    let v = 2.0 * u + (1.0 - 2.0 * u) * (1.0 - d1).powf(self.eta + 1.0);
                    v.powf(power) - 1.0
                } else {
                    let v = 2.0 * (1.0 - u) + 2.0 * (u - 0.5) * (1.0 - d2).powf(self.eta + 1.0);
                    1.0 - v.powf(power)
                };
                *x = var.repair(*x + dq * span);
            }
        }
        Ok(out)
    }
}

/// Gaussian mutation with wrap-around repair.
///
/// The step is drawn from `N(0, (sigma · (ub − lb))²)`; a gene leaving the
/// bounds re-enters from the opposite side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianMutation {
    /// Standard deviation as a fraction of each variable's range.
    pub sigma: f64,
    /// Per-gene probability; `None` means `1 / variables`.
    pub rate: Option<f64>,
}

impl GaussianMutation {
    pub fn new(sigma: f64) -> Self {
        Self { sigma, rate: None }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }
}

impl Default for GaussianMutation {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Mutation for GaussianMutation {
    fn name(&self) -> &'static str {
        "gaussian mutation"
    }

    fn mutate(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::RealInteger], field)?;
        let rate = gene_rate(self.rate, field.n_vars());
        let mut out = chromosome.to_owned();

        for mut row in out.rows_mut() {
            for (x, var) in row.iter_mut().zip(field.variables()) {
                if rng.random_range(0.0..1.0) >= rate {
                    continue;
                }
                let span = var.ub - var.lb;
                let z: f64 = rng.sample(StandardNormal);
                *x = var.repair(wrap(*x + z * self.sigma * span, var.lb, var.ub));
            }
        }
        Ok(out)
    }
}

fn wrap(x: f64, lb: f64, ub: f64) -> f64 {
    let span = ub - lb;
    if span <= 0.0 || !x.is_finite() {
        return lb;
    }
    if (lb..=ub).contains(&x) {
        x
    } else {
        lb + (x - lb).rem_euclid(span)
    }
}

/// Swaps two positions of a permutation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapMutation {
    /// Per-row probability.
    pub rate: f64,
}

impl SwapMutation {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Default for SwapMutation {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Mutation for SwapMutation {
    fn name(&self) -> &'static str {
        "swap mutation"
    }

    fn mutate(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::Permutation], field)?;
        Ok(per_row(chromosome, self.rate, rng, swap))
    }
}

/// Reverses a random segment of a permutation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InversionMutation {
    /// Per-row probability.
    pub rate: f64,
}

impl InversionMutation {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Default for InversionMutation {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Mutation for InversionMutation {
    fn name(&self) -> &'static str {
        "inversion mutation"
    }

    fn mutate(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::Permutation], field)?;
        Ok(per_row(chromosome, self.rate, rng, invert))
    }
}

fn per_row(
    chromosome: &Array2<f64>,
    rate: f64,
    rng: &mut EvoRng,
    kernel: fn(&mut [i64], &mut EvoRng),
) -> Array2<f64> {
    let mut out = chromosome.to_owned();
    for mut row in out.rows_mut() {
        if rng.random_range(0.0..1.0) >= rate {
            continue;
        }
        let mut perm: Vec<i64> = row.iter().map(|&v| v.round() as i64).collect();
        kernel(&mut perm, rng);
        for (x, v) in row.iter_mut().zip(perm) {
            *x = v as f64;
        }
    }
    out
}
