// Readout indexing
/// Multiplier applied to the y index when flattening a ReadoutID. Assumes no readout
/// geometry has more than this many divisions along x.
pub const READOUT_INDEX_STRIDE: i64 = 1_000_000;

// Detector response
/// Lower bound of the modified box recombination factor
pub const MIN_BOX_RECOMBINATION: f64 = 1.0e-6;
/// Converts sqrt(mm^2/ms * ns) into mm for the diffusion widths
pub const DIFFUSION_SIGMA_SCALE: f64 = 1.0e-3;

// Electronics
/// Sampling frequencies are given in MHz while time bins are in ns
pub const NS_PER_MHZ_PERIOD: f64 = 1000.0;

// Geometry
/// Name of the active LAr volume in the bundled geometry
pub const DEFAULT_READOUT_VOLUME: &str = "TPCActive";
