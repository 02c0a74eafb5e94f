use std::collections::btree_map::{BTreeMap, Iter};
use std::fmt::Display;

use super::readout_id::ReadoutID;

/// The simulated front-end output of one readout channel
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadoutWaveform {
    pub readout_id: ReadoutID,
    /// Shaped preamp output, one sample per analog time bin
    pub analog: Vec<f64>,
    /// ADC codes, one sample per ADC clock tick
    pub digital: Vec<u32>,
}

impl ReadoutWaveform {
    pub fn new(readout_id: ReadoutID, analog: Vec<f64>, digital: Vec<u32>) -> Self {
        Self {
            readout_id,
            analog,
            digital,
        }
    }

    /// Largest analog sample, or 0 for an empty waveform
    pub fn analog_peak(&self) -> f64 {
        self.analog.iter().copied().fold(0.0, f64::max)
    }

    /// Largest ADC code, or 0 for an empty waveform
    pub fn digital_peak(&self) -> u32 {
        self.digital.iter().copied().max().unwrap_or(0)
    }
}

impl Display for ReadoutWaveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} analog samples={} peak={:.3} digital samples={} peak={}",
            self.readout_id,
            self.analog.len(),
            self.analog_peak(),
            self.digital.len(),
            self.digital_peak()
        )
    }
}

/// The waveforms of all channels which saw charge in one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadoutWaveforms {
    waveforms: BTreeMap<ReadoutID, ReadoutWaveform>,
}

impl ReadoutWaveforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, waveform: ReadoutWaveform) {
        self.waveforms.insert(waveform.readout_id, waveform);
    }

    pub fn get(&self, id: &ReadoutID) -> Option<&ReadoutWaveform> {
        self.waveforms.get(id)
    }

    pub fn len(&self) -> usize {
        self.waveforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waveforms.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, ReadoutID, ReadoutWaveform> {
        self.waveforms.iter()
    }
}

impl<'a> IntoIterator for &'a ReadoutWaveforms {
    type Item = (&'a ReadoutID, &'a ReadoutWaveform);
    type IntoIter = Iter<'a, ReadoutID, ReadoutWaveform>;

    fn into_iter(self) -> Self::IntoIter {
        self.waveforms.iter()
    }
}

impl Display for ReadoutWaveforms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for waveform in self.waveforms.values() {
            writeln!(f, "{waveform}")?;
        }
        Ok(())
    }
}
