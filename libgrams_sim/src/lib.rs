//! # grams_sim
//!
//! grams_sim is the detector response and readout electronics simulation of the GRAMS
//! liquid-argon time projection chamber, written in Rust. It takes the ionization energy
//! deposits produced by a particle transport simulation and turns them into the
//! digitized waveforms of the pixel readout:
//!
//! ```text
//! energy deposit -> recombination & absorption -> diffusion into electron clusters
//!     -> pixel assignment -> readout map -> noise -> preamp shaping -> ADC
//! ```
//!
//! ## Building & Install
//!
//! To build and install the CLI use `cargo install --path ./grams_sim_cli` from the top
//! level grams_sim repository. The binary will be installed to your cargo install
//! location (typically something like `~/.cargo/bin/`).
//!
//! ## Configuration
//!
//! Everything is controlled by a single YAML file. A template with the nominal values can
//! be made with `grams_sim_cli new -p config.yml`. The format is as follows:
//!
//! ```yml
//! hit_path: /path/to/hits
//! output_path: /path/to/output
//! geometry_path: null
//! first_run_number: 0
//! last_run_number: 0
//! n_threads: 1
//! rng_seed: 0
//! detsim:
//!   recombination: true
//!   absorption: true
//!   diffusion: true
//!   DriftVel: 0.0016
//!   pixel_plane_offset: 100.0
//!   MeVToElectrons: 42370.0
//!   LongitudinalDiffusion: 0.62
//!   TransverseDiffusion: 1.63
//!   ElectronClusterSize: 20.0
//!   MinNumberOfElCluster: 5
//!   ElectronLifeTimeCorr: 3000000.0
//!   recom_model: 0
//!   field: 0.5
//!   a: 0.93
//!   b: 0.212
//!   rho: 1.3954
//!   A_B: 0.8
//!   kB: 0.0486
//! readout:
//!   readout_volume: TPCActive
//!   x_resolution: 100
//!   y_resolution: 100
//!   readout_centerx: 0.0
//!   readout_centery: 0.0
//! elecsim:
//!   timebin_width: 10.0
//!   time_window: 200000.0
//!   noise_param0: 100.0
//!   noise_param1: 1.0
//!   noise_param2: 0.0
//!   preamp_func: 4
//!   preamp_prior_time: 200.0
//!   preamp_post_time: 3000.0
//!   peak_delay: 0.0
//!   preamp_mu: 0.0
//!   preamp_sigma: 100.0
//!   preamp_tau1: 200.0
//!   preamp_tau2: 600.0
//!   preamp_gain: 0.05
//!   bit_resolution: 10
//!   input_min: 0.0
//!   input_max: 1000.0
//!   sample_freq: 10.0
//! ```
//!
//! Units are mm, ns and MeV; `sample_freq` is in MHz. Runs are split among `n_threads`
//! workers. Every event is simulated with its own random number generator seeded from
//! `rng_seed` and the event's (run, event) pair, so the output does not depend on the
//! number of workers.
//!
//! If `geometry_path` is `null` the bundled geometry is used. A geometry file lists the
//! bounding-box half extents (x, y, z) of named volumes:
//!
//! ```yml
//! volumes:
//!   TPCActive: [150.0, 150.0, 100.0]
//! ```
//!
//! ### Hit Format
//!
//! The hits of run N are read from `hit_path/run_NNNN.csv`, a CSV file with one header
//! line and the columns
//!
//! ```csv
//! run,event,track_id,hit_id,pdg_code,energy,start_x,start_y,start_z,start_t,end_x,end_y,end_z,end_t
//! ```
//!
//! The rows of an event must be contiguous, and events must appear in increasing order.
//!
//! ## Output
//!
//! For each run the following files are written to `output_path`:
//!
//! ```text
//! run_NNNN_clusters.csv  - run, event, track_id, hit_id, cluster_id, energy, num_electrons, x, y, z, t
//! run_NNNN_readout.csv   - run, event, readout_index, x_index, y_index, track_id, hit_id, cluster_id
//! run_NNNN_waveforms.csv - run, event, readout_index, x_index, y_index, analog|digital, samples...
//! run_NNNN.yml           - format version, creation time, event count, pixel geometry and the config
//! ```
//!
//! A log file, `grams_sim.log`, is written in the working directory by the CLI.
pub mod absorption;
pub mod adc;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod detector_response;
pub mod diffusion;
pub mod electronics;
pub mod error;
pub mod event;
pub mod event_builder;
pub mod geometry;
pub mod hit;
pub mod hit_file;
pub mod noise;
pub mod pixel_map;
pub mod preamp;
pub mod process;
pub mod readout_id;
pub mod readout_map;
pub mod recombination;
pub mod result_writer;
pub mod simulator;
pub mod waveform;
pub mod worker_status;
