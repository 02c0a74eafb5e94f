use std::path::PathBuf;
use thiserror::Error;

use super::cluster::ClusterKey;
use super::event::EventID;
use super::readout_id::ReadoutID;
use super::worker_status::WorkerStatus;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config has an invalid value {1} for parameter {0}")]
    InvalidParameter(&'static str, String),
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Could not load geometry because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Geometry failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Geometry failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Geometry does not contain a volume named '{0}'")]
    VolumeNotFound(String),
}

#[derive(Debug, Error)]
pub enum PixelMapError {
    #[error("PixelMap failed due to geometry error: {0}")]
    GeometryError(#[from] GeometryError),
    #[error("PixelMap found a non-positive extent {1} along {0} for the readout volume")]
    NonPositiveExtent(char, f64),
    #[error("PixelMap found a non-positive channel count {1} along {0}")]
    NonPositiveResolution(char, i32),
    #[error("PixelMap x_resolution {0} is too large; the readout index requires it below {1}")]
    ResolutionTooLarge(i32, i64),
}

#[derive(Debug, Error)]
pub enum DetSimError {
    #[error("Invalid value {0} for the recombination model; expected 0 (modified box) or 1 (Birks)")]
    InvalidRecombinationModel(i32),
    #[error("Detector response has an invalid value {1} for parameter {0}")]
    InvalidParameter(&'static str, f64),
}

#[derive(Debug, Error)]
pub enum ReadoutError {
    #[error("ReadoutMap channel {0} refers to cluster {1} which does not exist in the event")]
    DanglingCluster(ReadoutID, ClusterKey),
}

#[derive(Debug, Error)]
pub enum ElectronicsError {
    #[error("Invalid value {0} for the preamp response function; expected 0 through 4")]
    InvalidResponseFunction(i32),
    #[error("Electronics simulation has an invalid value {1} for parameter {0}")]
    InvalidParameter(&'static str, f64),
    #[error("Electronics failed because channel {0} refers to cluster {1} which does not exist in the event")]
    DanglingCluster(ReadoutID, ClusterKey),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Simulation failed due to PixelMap error: {0}")]
    PixelMapError(#[from] PixelMapError),
    #[error("Simulation failed due to detector response error: {0}")]
    DetSimError(#[from] DetSimError),
    #[error("Simulation failed due to readout error: {0}")]
    ReadoutError(#[from] ReadoutError),
    #[error("Simulation failed due to electronics error: {0}")]
    ElectronicsError(#[from] ElectronicsError),
    #[error("Simulation failed due to geometry error: {0}")]
    GeometryError(#[from] GeometryError),
}

#[derive(Debug, Error)]
pub enum HitFileError {
    #[error("Could not open HitFile because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("HitFile failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("HitFile failed to parse an integer on line {0}: {1}")]
    ParseIntError(usize, std::num::ParseIntError),
    #[error("HitFile failed to parse a float on line {0}: {1}")]
    ParseFloatError(usize, std::num::ParseFloatError),
    #[error("HitFile line {0} has the incorrect format; expected {1} columns, found {2}")]
    BadFileFormat(usize, usize, usize),
}

#[derive(Debug, Error)]
pub enum EventBuilderError {
    #[error("EventBuilder failed due a hit that was out of order -- hit event: {0} event builder event: {1}")]
    EventOutOfOrder(EventID, EventID),
}

#[derive(Debug, Error)]
pub enum ResultWriterError {
    #[error("ResultWriter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("ResultWriter failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to HitFile error: {0}")]
    HitFileError(#[from] HitFileError),
    #[error("Processor failed due to EventBuilder error: {0}")]
    EVBError(#[from] EventBuilderError),
    #[error("Processor failed due to Simulation error: {0}")]
    SimulationError(#[from] SimulationError),
    #[error("Processor failed due to ResultWriter error: {0}")]
    WriterError(#[from] ResultWriterError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<WorkerStatus>),
}
