use rand::Rng;
use rand_distr::StandardNormal;

use super::config::ElecSimParams;

/// Adds electronics noise to a histogram of arrival electrons.
///
/// The width of the noise in a bin holding `n` electrons is
/// sqrt(p0^2 + p1^2 * n + p2^2 * n^2): a constant floor, a shot-noise term and a term
/// proportional to the signal.
#[derive(Debug, Clone)]
pub struct NoiseInjector {
    p0_sq: f64,
    p1_sq: f64,
    p2_sq: f64,
}

impl NoiseInjector {
    pub fn new(params: &ElecSimParams) -> Self {
        spdlog::debug!(
            "NoiseInjector - noise_param0={} noise_param1={} noise_param2={}",
            params.noise_param0,
            params.noise_param1,
            params.noise_param2
        );
        Self {
            p0_sq: params.noise_param0 * params.noise_param0,
            p1_sq: params.noise_param1 * params.noise_param1,
            p2_sq: params.noise_param2 * params.noise_param2,
        }
    }

    pub fn sigma(&self, count: f64) -> f64 {
        (self.p0_sq + self.p1_sq * count + self.p2_sq * count * count).sqrt()
    }

    /// One standard normal sample is drawn for every bin, signal or not
    pub fn process<R: Rng + ?Sized>(&self, histogram: &[u64], rng: &mut R) -> Vec<u64> {
        histogram
            .iter()
            .map(|&count| {
                let z: f64 = rng.sample(StandardNormal);
                let count = count as f64;
                (count + z * self.sigma(count)).floor().max(0.0) as u64
            })
            .collect()
    }
}
