use std::f64::consts::PI;

use super::config::ElecSimParams;
use super::error::ElectronicsError;

/// Analytic impulse response of the charge-sensitive preamp and shaper, as a function of
/// the time t relative to the arrival of the charge (ns).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseFunction {
    NormalizedGaussian { mu: f64, sigma: f64 },
    Gaussian { mu: f64, sigma: f64 },
    LogNormalGaussian { mu: f64, sigma: f64 },
    LogGaussian { mu: f64, sigma: f64 },
    /// Difference of two exponentials, peaking at t = 0 with unit amplitude.
    /// Note this is e^{-s/tau1} - e^{-s/tau2} rescaled to its peak, not the
    /// (tau1 e^{-s/tau1} - tau2 e^{-s/tau2}) / (tau1 - tau2) normalization.
    BiExponential { tau1: f64, tau2: f64 },
}

impl ResponseFunction {
    /// Select the response from the `preamp_func` flag
    pub fn new(params: &ElecSimParams) -> Result<Self, ElectronicsError> {
        let mu = params.preamp_mu;
        let sigma = params.preamp_sigma;
        if (0..=3).contains(&params.preamp_func) && !(sigma > 0.0) {
            return Err(ElectronicsError::InvalidParameter("preamp_sigma", sigma));
        }
        match params.preamp_func {
            0 => Ok(Self::NormalizedGaussian { mu, sigma }),
            1 => Ok(Self::Gaussian { mu, sigma }),
            2 => Ok(Self::LogNormalGaussian { mu, sigma }),
            3 => Ok(Self::LogGaussian { mu, sigma }),
            4 => {
                let (tau1, tau2) = (params.preamp_tau1, params.preamp_tau2);
                if !(tau1 > 0.0) {
                    return Err(ElectronicsError::InvalidParameter("preamp_tau1", tau1));
                }
                if !(tau2 > 0.0) || tau1 == tau2 {
                    return Err(ElectronicsError::InvalidParameter("preamp_tau2", tau2));
                }
                Ok(Self::BiExponential { tau1, tau2 })
            }
            other => Err(ElectronicsError::InvalidResponseFunction(other)),
        }
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        match *self {
            Self::NormalizedGaussian { mu, sigma } => {
                gauss(t, mu, sigma) / (2.0 * PI * sigma * sigma).sqrt()
            }
            Self::Gaussian { mu, sigma } => gauss(t, mu, sigma),
            Self::LogNormalGaussian { mu, sigma } => {
                if t <= 0.0 {
                    0.0
                } else {
                    gauss(t.ln(), mu, sigma) / (2.0 * PI * sigma * sigma).sqrt()
                }
            }
            Self::LogGaussian { mu, sigma } => {
                if t <= 0.0 {
                    0.0
                } else {
                    gauss(t.ln(), mu, sigma)
                }
            }
            Self::BiExponential { tau1, tau2 } => {
                let t_peak = bi_exp_peak_time(tau1, tau2);
                let s = t + t_peak;
                if s < 0.0 {
                    0.0
                } else {
                    bi_exp(s, tau1, tau2) / bi_exp(t_peak, tau1, tau2)
                }
            }
        }
    }
}

fn gauss(x: f64, mu: f64, sigma: f64) -> f64 {
    (-(x - mu) * (x - mu) / (2.0 * sigma * sigma)).exp()
}

fn bi_exp(s: f64, tau1: f64, tau2: f64) -> f64 {
    (-s / tau1).exp() - (-s / tau2).exp()
}

fn bi_exp_peak_time(tau1: f64, tau2: f64) -> f64 {
    tau1 * tau2 * (tau1 / tau2).ln() / (tau1 - tau2)
}

/// Convolves arrival histograms with the preamp impulse response and applies the gain.
///
/// The kernel is sampled once at the analog bin width: sample j sits at
/// t = (j - prior_bins) * timebin_width, covering [-preamp_prior_time, preamp_post_time).
#[derive(Debug, Clone)]
pub struct PulseShaper {
    kernel: Vec<f64>,
    prior_bins: usize,
    peak_delay_bins: i64,
    gain: f64,
}

impl PulseShaper {
    pub fn new(params: &ElecSimParams) -> Result<Self, ElectronicsError> {
        let width = params.timebin_width;
        if !(width > 0.0) {
            return Err(ElectronicsError::InvalidParameter("timebin_width", width));
        }
        if !(params.preamp_prior_time >= 0.0) {
            return Err(ElectronicsError::InvalidParameter(
                "preamp_prior_time",
                params.preamp_prior_time,
            ));
        }
        if !(params.preamp_post_time >= 0.0) {
            return Err(ElectronicsError::InvalidParameter(
                "preamp_post_time",
                params.preamp_post_time,
            ));
        }
        let response = ResponseFunction::new(params)?;

        let prior_bins = (params.preamp_prior_time / width).floor() as usize;
        let post_bins = (params.preamp_post_time / width).floor() as usize;
        if prior_bins + post_bins == 0 {
            return Err(ElectronicsError::InvalidParameter(
                "preamp_post_time",
                params.preamp_post_time,
            ));
        }
        let kernel: Vec<f64> = (0..(prior_bins + post_bins))
            .map(|j| response.evaluate((j as f64 - prior_bins as f64) * width))
            .collect();

        spdlog::debug!(
            "PulseShaper - {:?} kernel bins={} (prior={} post={}) gain={}",
            response,
            kernel.len(),
            prior_bins,
            post_bins,
            params.preamp_gain
        );

        Ok(Self {
            kernel,
            prior_bins,
            peak_delay_bins: (params.peak_delay / width).floor() as i64,
            gain: params.preamp_gain,
        })
    }

    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    /// Superpose one kernel per electron. Kernel samples which fall outside the waveform
    /// are dropped.
    pub fn convolute_response(&self, histogram: &[u64]) -> Vec<f64> {
        let n_bins = histogram.len() as i64;
        let kernel_len = self.kernel.len() as i64;
        let mut output = vec![0.0; histogram.len()];

        for (bin, &count) in histogram.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let start = bin as i64 + self.peak_delay_bins - self.prior_bins as i64;
            let j_min = (-start).max(0);
            let j_max = (n_bins - start).min(kernel_len);
            if j_max <= j_min {
                continue;
            }
            let count = count as f64;
            for j in j_min..j_max {
                output[(start + j) as usize] += count * self.kernel[j as usize];
            }
        }

        output.iter_mut().for_each(|sample| *sample *= self.gain);
        output
    }
}
