//! Random number generation.
//!
//! Every stochastic component takes an [`EvoRng`] so that a run is fully
//! reproducible from a single seed.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// The generator type threaded through codecs, operators and templates.
pub type EvoRng = StdRng;

/// Creates a seeded generator.
pub fn create_rng(seed: u64) -> EvoRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from an optional seed, drawing one from the thread
/// generator when `None`.
pub fn rng_from_seed(seed: Option<u64>) -> EvoRng {
    create_rng(seed.unwrap_or_else(rand::random))
}
