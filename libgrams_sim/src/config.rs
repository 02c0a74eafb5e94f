use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::DEFAULT_READOUT_VOLUME;
use super::error::ConfigError;

/// Parameters of the detector response (recombination, absorption, diffusion).
///
/// Field names in YAML follow the option names used throughout the GRAMS simulation
/// chain. Distances are in mm, times in ns, energies in MeV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetSimParams {
    pub recombination: bool,
    pub absorption: bool,
    pub diffusion: bool,
    /// Electron drift velocity (mm/ns)
    #[serde(rename = "DriftVel")]
    pub drift_velocity: f64,
    /// z coordinate of the anode (pixel) plane
    pub pixel_plane_offset: f64,
    #[serde(rename = "MeVToElectrons")]
    pub mev_to_electrons: f64,
    /// Longitudinal diffusion constant (mm^2/ms)
    #[serde(rename = "LongitudinalDiffusion")]
    pub longitudinal_diffusion: f64,
    /// Transverse diffusion constant (mm^2/ms)
    #[serde(rename = "TransverseDiffusion")]
    pub transverse_diffusion: f64,
    #[serde(rename = "ElectronClusterSize")]
    pub electron_cluster_size: f64,
    #[serde(rename = "MinNumberOfElCluster")]
    pub min_number_of_el_cluster: i32,
    /// Electron lifetime (ns)
    #[serde(rename = "ElectronLifeTimeCorr")]
    pub electron_lifetime: f64,
    /// 0: modified box, 1: Birks
    pub recom_model: i32,
    pub field: f64,
    pub a: f64,
    pub b: f64,
    pub rho: f64,
    #[serde(rename = "A_B")]
    pub birks_ab: f64,
    #[serde(rename = "kB")]
    pub birks_kb: f64,
}

impl Default for DetSimParams {
    fn default() -> Self {
        Self {
            recombination: true,
            absorption: true,
            diffusion: true,
            drift_velocity: 1.6e-3,
            pixel_plane_offset: 100.0,
            mev_to_electrons: 42370.0,
            longitudinal_diffusion: 0.62,
            transverse_diffusion: 1.63,
            electron_cluster_size: 20.0,
            min_number_of_el_cluster: 5,
            electron_lifetime: 3.0e6,
            recom_model: 0,
            field: 0.5,
            a: 0.93,
            b: 0.212,
            rho: 1.3954,
            birks_ab: 0.8,
            birks_kb: 0.0486,
        }
    }
}

/// Parameters of the pixel readout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadoutParams {
    /// Name of the geometry volume whose x-y extent is covered by the pixels
    pub readout_volume: String,
    /// Number of pixels along x
    pub x_resolution: i32,
    /// Number of pixels along y
    pub y_resolution: i32,
    pub readout_centerx: f64,
    pub readout_centery: f64,
}

impl Default for ReadoutParams {
    fn default() -> Self {
        Self {
            readout_volume: String::from(DEFAULT_READOUT_VOLUME),
            x_resolution: 100,
            y_resolution: 100,
            readout_centerx: 0.0,
            readout_centery: 0.0,
        }
    }
}

/// Parameters of the front-end electronics (noise, preamp, ADC)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElecSimParams {
    /// Width of an analog time bin (ns)
    pub timebin_width: f64,
    /// Length of the readout window (ns)
    pub time_window: f64,
    pub noise_param0: f64,
    pub noise_param1: f64,
    pub noise_param2: f64,
    /// 0: normalized Gaussian, 1: Gaussian, 2: log-normal Gaussian, 3: log-Gaussian,
    /// 4: bi-exponential
    pub preamp_func: i32,
    pub preamp_prior_time: f64,
    pub preamp_post_time: f64,
    pub peak_delay: f64,
    pub preamp_mu: f64,
    pub preamp_sigma: f64,
    pub preamp_tau1: f64,
    pub preamp_tau2: f64,
    pub preamp_gain: f64,
    pub bit_resolution: i32,
    pub input_min: f64,
    pub input_max: f64,
    /// ADC sampling frequency (MHz)
    pub sample_freq: f64,
}

impl Default for ElecSimParams {
    fn default() -> Self {
        Self {
            timebin_width: 10.0,
            time_window: 200_000.0,
            noise_param0: 100.0,
            noise_param1: 1.0,
            noise_param2: 0.0,
            preamp_func: 4,
            preamp_prior_time: 200.0,
            preamp_post_time: 3000.0,
            peak_delay: 0.0,
            preamp_mu: 0.0,
            preamp_sigma: 100.0,
            preamp_tau1: 200.0,
            preamp_tau2: 600.0,
            preamp_gain: 0.05,
            bit_resolution: 10,
            input_min: 0.0,
            input_max: 1000.0,
            sample_freq: 10.0,
        }
    }
}

/// Structure representing the application configuration. Contains pathing, run information
/// and the physics parameters of every simulation stage.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hit_path: PathBuf,
    pub output_path: PathBuf,
    pub geometry_path: Option<PathBuf>,
    pub first_run_number: i32,
    pub last_run_number: i32,
    pub n_threads: i32,
    pub rng_seed: u64,
    pub detsim: DetSimParams,
    pub readout: ReadoutParams,
    pub elecsim: ElecSimParams,
}

impl Default for Config {
    /// Generate a new Config object. Paths will be empty/invalid, physics parameters take
    /// their nominal values
    fn default() -> Self {
        Self {
            hit_path: PathBuf::from("None"),
            output_path: PathBuf::from("None"),
            geometry_path: None,
            first_run_number: 0,
            last_run_number: 0,
            n_threads: 1,
            rng_seed: 0,
            detsim: DetSimParams::default(),
            readout: ReadoutParams::default(),
            elecsim: ElecSimParams::default(),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Check if a specific run exists by evaluating the existance of its hit file
    pub fn does_run_exist(&self, run_number: i32) -> bool {
        self.hit_path
            .join(format!("{}.csv", self.get_run_str(run_number)))
            .exists()
    }

    /// Get the path to the hit table of a run
    pub fn get_hit_file_name(&self, run_number: i32) -> Result<PathBuf, ConfigError> {
        let hit_file_path = self
            .hit_path
            .join(format!("{}.csv", self.get_run_str(run_number)));
        if hit_file_path.exists() {
            Ok(hit_file_path)
        } else {
            Err(ConfigError::BadFilePath(hit_file_path))
        }
    }

    /// Get the path stem (no extension) shared by all output files of a run
    pub fn get_output_stem(&self, run_number: i32) -> Result<PathBuf, ConfigError> {
        if self.output_path.exists() {
            Ok(self.output_path.join(self.get_run_str(run_number)))
        } else {
            Err(ConfigError::BadFilePath(self.output_path.clone()))
        }
    }

    /// Construct the run string, zero padded to four digits
    fn get_run_str(&self, run_number: i32) -> String {
        format!("run_{run_number:0>4}")
    }

    pub fn is_n_threads_valid(&self) -> bool {
        self.n_threads >= 1
    }

    pub fn is_run_range_valid(&self) -> bool {
        self.first_run_number <= self.last_run_number
    }

    /// Check the fields a run cannot start without. Physics parameters are checked by the
    /// components that use them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_n_threads_valid() {
            return Err(ConfigError::InvalidParameter(
                "n_threads",
                self.n_threads.to_string(),
            ));
        }
        if !self.is_run_range_valid() {
            return Err(ConfigError::InvalidParameter(
                "last_run_number",
                self.last_run_number.to_string(),
            ));
        }
        Ok(())
    }
}
