//! Recombination operators.
//!
//! Pair-based operators pair consecutive rows `(0, 1), (2, 3), ...`; an odd
//! last row passes through unchanged. In `half` mode each pair yields a
//! single child, so the output has `ceil(n / 2)` rows.
//!
//! # References
//!
//! - Deb & Agrawal (1995), "Simulated Binary Crossover for Continuous Search Space"
//! - Storn & Price (1997), "Differential Evolution: A Simple and Efficient
//!   Heuristic for Global Optimization over Continuous Spaces"

use super::permutation::{ox_child, pmx_child, random_segment};
use super::{ensure_encoding, repair_real, Recombination};
use crate::codec::{DecodeField, Encoding};
use crate::error::EvoResult;
use crate::random::EvoRng;
use ndarray::Array2;
use rand::seq::index::sample;
use rand::Rng;

type Children = (Vec<f64>, Vec<f64>);

/// Runs `cross` over consecutive row pairs with probability `rate`.
fn pairwise(
    chromosome: &Array2<f64>,
    rate: f64,
    half: bool,
    rng: &mut EvoRng,
    mut cross: impl FnMut(&[f64], &[f64], &mut EvoRng) -> Children,
) -> EvoResult<Array2<f64>> {
    let (n, cols) = chromosome.dim();
    let rows: Vec<Vec<f64>> = chromosome.rows().into_iter().map(|r| r.to_vec()).collect();
    let mut out = Vec::with_capacity(n * cols);
    let mut produced = 0;

    for pair in rows.chunks(2) {
        match pair {
            [a, b] => {
                let (c1, c2) = if rng.random_range(0.0..1.0) < rate {
                    cross(a.as_slice(), b.as_slice(), rng)
                } else {
                    (a.clone(), b.clone())
                };
                out.extend(c1);
                produced += 1;
                if !half {
                    out.extend(c2);
                    produced += 1;
                }
            }
            [a] => {
                out.extend_from_slice(a);
                produced += 1;
            }
            _ => {}
        }
    }
    Ok(Array2::from_shape_vec((produced, cols), out)?)
}

/// Two-point crossover: swaps the genes between two random cut points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoPointCrossover {
    /// Probability that a pair is recombined.
    pub rate: f64,
    /// One child per pair.
    pub half: bool,
}

impl TwoPointCrossover {
    pub fn new(rate: f64) -> Self {
        Self { rate, half: false }
    }

    pub fn half(mut self) -> Self {
        self.half = true;
        self
    }
}

impl Default for TwoPointCrossover {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl Recombination for TwoPointCrossover {
    fn name(&self) -> &'static str {
        "two-point crossover"
    }

    fn recombine(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::BinaryGray, Encoding::RealInteger], field)?;
        let mut out = pairwise(chromosome, self.rate, self.half, rng, |a, b, rng| {
            let len = a.len();
            let mut c1 = a.to_vec();
            let mut c2 = b.to_vec();
            let p = rng.random_range(0..=len);
            let q = rng.random_range(0..=len);
            let (lo, hi) = if p <= q { (p, q) } else { (q, p) };
            c1[lo..hi].copy_from_slice(&b[lo..hi]);
            c2[lo..hi].copy_from_slice(&a[lo..hi]);
            (c1, c2)
        })?;
        repair_real(&mut out, field);
        Ok(out)
    }
}

/// Uniform crossover: each gene comes from either parent with equal odds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformCrossover {
    pub rate: f64,
    pub half: bool,
}

impl UniformCrossover {
    pub fn new(rate: f64) -> Self {
        Self { rate, half: false }
    }

    pub fn half(mut self) -> Self {
        self.half = true;
        self
    }
}

impl Default for UniformCrossover {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl Recombination for UniformCrossover {
    fn name(&self) -> &'static str {
        "uniform crossover"
    }

    fn recombine(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::BinaryGray, Encoding::RealInteger], field)?;
        let mut out = pairwise(chromosome, self.rate, self.half, rng, |a, b, rng| {
            let mut c1 = a.to_vec();
            let mut c2 = b.to_vec();
            for j in 0..a.len() {
                if rng.random_bool(0.5) {
                    c1[j] = b[j];
                    c2[j] = a[j];
                }
            }
            (c1, c2)
        })?;
        repair_real(&mut out, field);
        Ok(out)
    }
}

/// Simulated binary crossover for real-valued genes.
///
/// Each gene is crossed with probability 0.5; children are clipped to the
/// variable bounds and discrete variables rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SbxCrossover {
    pub rate: f64,
    /// Distribution index; larger values keep children closer to parents.
    pub eta: f64,
    pub half: bool,
}

impl SbxCrossover {
    pub fn new(rate: f64, eta: f64) -> Self {
        Self {
            rate,
            eta,
            half: false,
        }
    }

    pub fn half(mut self) -> Self {
        self.half = true;
        self
    }
}

impl Default for SbxCrossover {
    fn default() -> Self {
        Self::new(0.9, 20.0)
    }
}

impl Recombination for SbxCrossover {
    fn name(&self) -> &'static str {
        "simulated binary crossover"
    }

    fn recombine(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::RealInteger], field)?;
        let exponent = 1.0 / (self.eta + 1.0);
        let mut out = pairwise(chromosome, self.rate, self.half, rng, |a, b, rng| {
            let mut c1 = a.to_vec();
            let mut c2 = b.to_vec();
            for j in 0..a.len() {
                if (a[j] - b[j]).abs() < 1e-14 || !rng.random_bool(0.5) {
                    continue;
                }
                let u: f64 = rng.random_range(0.0..1.0);
                let beta = if u <= 0.5 {
                    (2.0 * u).powf(exponent)
                } else {
                    (1.0 / (2.0 * (1.0 - u))).powf(exponent)
                };
                c1[j] = 0.5 * ((1.0 + beta) * a[j] + (1.0 - beta) * b[j]);
                c2[j] = 0.5 * ((1.0 - beta) * a[j] + (1.0 + beta) * b[j]);
            }
            (c1, c2)
        })?;
        repair_real(&mut out, field);
        Ok(out)
    }
}

/// Order crossover (OX) for permutation rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderCrossover {
    pub rate: f64,
    pub half: bool,
}

impl OrderCrossover {
    pub fn new(rate: f64) -> Self {
        Self { rate, half: false }
    }

    pub fn half(mut self) -> Self {
        self.half = true;
        self
    }
}

impl Default for OrderCrossover {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl Recombination for OrderCrossover {
    fn name(&self) -> &'static str {
        "order crossover"
    }

    fn recombine(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::Permutation], field)?;
        let range = field.permutation_range();
        pairwise(chromosome, self.rate, self.half, rng, |a, b, rng| {
            permutation_pair(a, b, rng, |t, d, s, e| ox_child(t, d, s, e, range))
        })
    }
}

/// Partially mapped crossover (PMX) for permutation rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PmxCrossover {
    pub rate: f64,
    pub half: bool,
}

impl PmxCrossover {
    pub fn new(rate: f64) -> Self {
        Self { rate, half: false }
    }

    pub fn half(mut self) -> Self {
        self.half = true;
        self
    }
}

impl Default for PmxCrossover {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl Recombination for PmxCrossover {
    fn name(&self) -> &'static str {
        "partially mapped crossover"
    }

    fn recombine(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::Permutation], field)?;
        let range = field.permutation_range();
        pairwise(chromosome, self.rate, self.half, rng, |a, b, rng| {
            permutation_pair(a, b, rng, |t, d, s, e| pmx_child(t, d, s, e, range))
        })
    }
}

fn permutation_pair(
    a: &[f64],
    b: &[f64],
    rng: &mut EvoRng,
    build: impl Fn(&[i64], &[i64], usize, usize) -> Vec<i64>,
) -> Children {
    if a.len() < 2 {
        return (a.to_vec(), b.to_vec());
    }
    let pa: Vec<i64> = a.iter().map(|&v| v.round() as i64).collect();
    let pb: Vec<i64> = b.iter().map(|&v| v.round() as i64).collect();
    let (start, end) = random_segment(pa.len(), rng);
    let to_genes = |p: Vec<i64>| p.into_iter().map(|v| v as f64).collect();
    (
        to_genes(build(&pa, &pb, start, end)),
        to_genes(build(&pb, &pa, start, end)),
    )
}

/// DE/rand/1/bin: for every row `i`, a mutant `x_r1 + f (x_r2 - x_r3)` is
/// built from three other rows and mixed with row `i` by binomial crossover.
///
/// The output has as many rows as the input, row `i` being the trial vector
/// of parent `i`, ready for one-to-one survivor selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeRand1Bin {
    /// Differential weight.
    pub f: f64,
    /// Crossover probability per gene.
    pub cr: f64,
}

impl DeRand1Bin {
    pub fn new(f: f64, cr: f64) -> Self {
        Self { f, cr }
    }
}

impl Default for DeRand1Bin {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

impl Recombination for DeRand1Bin {
    fn name(&self) -> &'static str {
        "DE/rand/1/bin"
    }

    fn recombine(
        &self,
        chromosome: &Array2<f64>,
        field: &DecodeField,
        rng: &mut EvoRng,
    ) -> EvoResult<Array2<f64>> {
        ensure_encoding(self.name(), &[Encoding::RealInteger], field)?;
        let (n, d) = chromosome.dim();
        let mut trial = chromosome.to_owned();
        if n == 0 || d == 0 {
            return Ok(trial);
        }

        for i in 0..n {
            let [r1, r2, r3] = donors(i, n, rng);
            let jrand = rng.random_range(0..d);
            for j in 0..d {
                if j == jrand || rng.random_range(0.0..1.0) < self.cr {
                    trial[[i, j]] = chromosome[[r1, j]]
                        + self.f * (chromosome[[r2, j]] - chromosome[[r3, j]]);
                }
            }
        }
        repair_real(&mut trial, field);
        Ok(trial)
    }
}

/// Three donor rows, distinct from each other and from `i` when possible.
fn donors(i: usize, n: usize, rng: &mut EvoRng) -> [usize; 3] {
    if n >= 4 {
        let picked = sample(rng, n - 1, 3);
        let shift = |j: usize| if j >= i { j + 1 } else { j };
        [shift(picked.index(0)), shift(picked.index(1)), shift(picked.index(2))]
    } else {
        [
            rng.random_range(0..n),
            rng.random_range(0..n),
            rng.random_range(0..n),
        ]
    }
}
