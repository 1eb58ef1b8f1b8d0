//! Normal-distribution sampling for the random-walk simulations.
//!
//! Simulations take a `&mut dyn NormalSampler` instead of reaching for a
//! global RNG, so tests can script exact draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

pub trait NormalSampler {
    /// Draw one value from N(mean, std_dev²).
    fn sample(&mut self, mean: f64, std_dev: f64) -> f64;
}

/// Sampler backed by any `rand` generator.
pub struct RngSampler<R: Rng> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Seeded when a seed is given, entropy-seeded otherwise.
    pub fn with_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> NormalSampler for RngSampler<R> {
    fn sample(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }
}

/// Replays a fixed cycle of standard-normal z-scores.
#[derive(Debug, Clone)]
pub struct SequenceSampler {
    z_scores: Vec<f64>,
    next: usize,
}

impl SequenceSampler {
    pub fn new(z_scores: Vec<f64>) -> Self {
        Self { z_scores, next: 0 }
    }

    /// Always returns the mean.
    pub fn constant() -> Self {
        Self::new(vec![0.0])
    }
}

impl NormalSampler for SequenceSampler {
    fn sample(&mut self, mean: f64, std_dev: f64) -> f64 {
        if self.z_scores.is_empty() {
            return mean;
        }
        let z = self.z_scores[self.next % self.z_scores.len()];
        self.next += 1;
        mean + std_dev * z
    }
}
