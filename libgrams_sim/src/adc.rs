use super::config::ElecSimParams;
use super::constants::NS_PER_MHZ_PERIOD;
use super::error::ElectronicsError;

/// Digitizes an analog waveform.
///
/// The ADC clock is slower than the analog binning: every ADC sample is the mean of
/// `ratio` consecutive analog samples, each clipped to the ADC input range first.
#[derive(Debug, Clone)]
pub struct ADConverter {
    ratio: usize,
    input_min: f64,
    input_max: f64,
    lsb: f64,
    max_code: u32,
}

impl ADConverter {
    pub fn new(params: &ElecSimParams) -> Result<Self, ElectronicsError> {
        if !(params.timebin_width > 0.0) {
            return Err(ElectronicsError::InvalidParameter(
                "timebin_width",
                params.timebin_width,
            ));
        }
        if !(params.sample_freq > 0.0) {
            return Err(ElectronicsError::InvalidParameter(
                "sample_freq",
                params.sample_freq,
            ));
        }
        let ratio = ((NS_PER_MHZ_PERIOD / params.sample_freq) / params.timebin_width).round();
        if !(ratio >= 1.0) {
            return Err(ElectronicsError::InvalidParameter(
                "sample_freq",
                params.sample_freq,
            ));
        }
        if !(1..=32).contains(&params.bit_resolution) {
            return Err(ElectronicsError::InvalidParameter(
                "bit_resolution",
                params.bit_resolution as f64,
            ));
        }
        if !(params.input_max > params.input_min) {
            return Err(ElectronicsError::InvalidParameter(
                "input_max",
                params.input_max,
            ));
        }

        let n_codes = 2.0f64.powi(params.bit_resolution);
        let adc = Self {
            ratio: ratio as usize,
            input_min: params.input_min,
            input_max: params.input_max,
            lsb: (params.input_max - params.input_min) / n_codes,
            max_code: ((1u64 << params.bit_resolution) - 1) as u32,
        };
        spdlog::debug!(
            "ADConverter - resolution={} bit LSB={} range=[{}, {}] decimation={}",
            params.bit_resolution,
            adc.lsb,
            adc.input_min,
            adc.input_max,
            adc.ratio
        );
        Ok(adc)
    }

    /// Number of analog samples per ADC sample
    pub fn ratio(&self) -> usize {
        self.ratio
    }

    pub fn lsb(&self) -> f64 {
        self.lsb
    }

    pub fn max_code(&self) -> u32 {
        self.max_code
    }

    /// ADC code for one (unclipped) analog value
    pub fn quantize(&self, value: f64) -> u32 {
        let clamped = value.clamp(self.input_min, self.input_max);
        let code = ((clamped - self.input_min) / self.lsb).floor();
        code.min(self.max_code as f64) as u32
    }

    /// Trailing analog samples which do not fill a whole ADC sample are dropped
    pub fn process(&self, analog: &[f64]) -> Vec<u32> {
        analog
            .chunks_exact(self.ratio)
            .map(|chunk| {
                let sum: f64 = chunk
                    .iter()
                    .map(|v| v.clamp(self.input_min, self.input_max))
                    .sum();
                self.quantize(sum / self.ratio as f64)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_params(bits: i32, sample_freq: f64) -> ElecSimParams {
        ElecSimParams {
            timebin_width: 10.0,
            bit_resolution: bits,
            input_min: 0.0,
            input_max: 1000.0,
            sample_freq,
            ..Default::default()
        }
    }

    #[test]
    fn test_decimation() {
        // 10 MHz -> 100 ns per sample -> 10 analog bins
        let adc = ADConverter::new(&make_params(10, 10.0)).unwrap();
        assert_eq!(adc.ratio(), 10);
        let analog = vec![500.0; 25];
        let digital = adc.process(&analog);
        assert_eq!(digital.len(), 2);
        assert_eq!(digital[0], 512);

        let adc = ADConverter::new(&make_params(10, 100.0)).unwrap();
        assert_eq!(adc.ratio(), 1);
        assert_eq!(adc.process(&analog).len(), 25);
    }

    #[test]
    fn test_clipping() {
        let adc = ADConverter::new(&make_params(10, 100.0)).unwrap();
        assert_eq!(adc.process(&[-50.0, 0.0, 1000.0, 5.0e6]), vec![0, 0, 1023, 1023]);

        // Each sample is clipped before averaging
        let adc = ADConverter::new(&make_params(10, 50.0)).unwrap();
        assert_eq!(adc.process(&[-1000.0, 200.0]), adc.process(&[0.0, 200.0]));
    }

    #[test]
    fn test_monotonic_and_in_range() {
        let adc = ADConverter::new(&make_params(4, 100.0)).unwrap();
        let mut last = 0;
        for step in -20..=120 {
            let code = adc.quantize(step as f64 * 10.0);
            assert!(code >= last);
            assert!(code <= 15);
            last = code;
        }
        assert_eq!(last, 15);
    }

    #[test]
    fn test_full_width() {
        let adc = ADConverter::new(&make_params(32, 100.0)).unwrap();
        assert_eq!(adc.max_code(), u32::MAX);
        assert_eq!(adc.quantize(1000.0), u32::MAX);
    }

    #[test]
    fn test_bad_parameters() {
        assert!(ADConverter::new(&make_params(0, 10.0)).is_err());
        assert!(ADConverter::new(&make_params(33, 10.0)).is_err());
        // ADC clock faster than the analog binning
        assert!(ADConverter::new(&make_params(10, 1000.0)).is_err());
        assert!(ADConverter::new(&make_params(10, 0.0)).is_err());
    }
}
