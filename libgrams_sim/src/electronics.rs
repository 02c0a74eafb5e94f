use rand::Rng;
use std::collections::BTreeSet;

use super::adc::ADConverter;
use super::cluster::{ClusterKey, ClusterStore};
use super::config::ElecSimParams;
use super::error::ElectronicsError;
use super::noise::NoiseInjector;
use super::preamp::PulseShaper;
use super::readout_id::ReadoutID;
use super::readout_map::ReadoutMap;
use super::waveform::{ReadoutWaveform, ReadoutWaveforms};

/// The front-end electronics of a readout channel.
///
/// For every channel of the ReadoutMap: bin the arrival times of its clusters, add noise,
/// shape with the preamp response and digitize. Channels are processed in ReadoutID order
/// so that the random numbers drawn per channel only depend on the event content.
#[derive(Debug, Clone)]
pub struct ElectronicsChain {
    timebin_width: f64,
    n_bins: usize,
    noise: NoiseInjector,
    shaper: PulseShaper,
    adc: ADConverter,
}

impl ElectronicsChain {
    pub fn new(params: &ElecSimParams) -> Result<Self, ElectronicsError> {
        if !(params.timebin_width > 0.0) {
            return Err(ElectronicsError::InvalidParameter(
                "timebin_width",
                params.timebin_width,
            ));
        }
        let n_bins = (params.time_window / params.timebin_width).floor();
        if !(n_bins >= 1.0) {
            return Err(ElectronicsError::InvalidParameter(
                "time_window",
                params.time_window,
            ));
        }

        let chain = Self {
            timebin_width: params.timebin_width,
            n_bins: n_bins as usize,
            noise: NoiseInjector::new(params),
            shaper: PulseShaper::new(params)?,
            adc: ADConverter::new(params)?,
        };
        spdlog::info!(
            "Electronics - {} analog bins of {} ns, {} digital samples per channel",
            chain.num_analog_bins(),
            chain.timebin_width,
            chain.num_digital_bins()
        );
        Ok(chain)
    }

    pub fn num_analog_bins(&self) -> usize {
        self.n_bins
    }

    pub fn num_digital_bins(&self) -> usize {
        self.n_bins / self.adc.ratio()
    }

    pub fn shaper(&self) -> &PulseShaper {
        &self.shaper
    }

    pub fn adc(&self) -> &ADConverter {
        &self.adc
    }

    /// Histogram the electrons of the given clusters by arrival time. Arrivals outside
    /// the readout window are put in the first or last bin.
    pub fn accumulate(
        &self,
        id: ReadoutID,
        keys: &BTreeSet<ClusterKey>,
        clusters: &ClusterStore,
    ) -> Result<Vec<u64>, ElectronicsError> {
        let mut histogram = vec![0u64; self.n_bins];
        let last_bin = (self.n_bins - 1) as f64;
        for key in keys {
            let cluster = clusters
                .get(key)
                .ok_or(ElectronicsError::DanglingCluster(id, *key))?;
            let bin = (cluster.t / self.timebin_width).floor().clamp(0.0, last_bin) as usize;
            histogram[bin] += cluster.num_electrons;
        }
        Ok(histogram)
    }

    pub fn process_channel<R: Rng + ?Sized>(
        &self,
        id: ReadoutID,
        keys: &BTreeSet<ClusterKey>,
        clusters: &ClusterStore,
        rng: &mut R,
    ) -> Result<ReadoutWaveform, ElectronicsError> {
        let histogram = self.accumulate(id, keys, clusters)?;
        let noisy = self.noise.process(&histogram, rng);
        let analog = self.shaper.convolute_response(&noisy);
        let digital = self.adc.process(&analog);
        Ok(ReadoutWaveform::new(id, analog, digital))
    }

    pub fn process_event<R: Rng + ?Sized>(
        &self,
        readout_map: &ReadoutMap,
        clusters: &ClusterStore,
        rng: &mut R,
    ) -> Result<ReadoutWaveforms, ElectronicsError> {
        let mut waveforms = ReadoutWaveforms::new();
        for (id, keys) in readout_map {
            waveforms.insert(self.process_channel(*id, keys, clusters, rng)?);
        }
        Ok(waveforms)
    }
}
