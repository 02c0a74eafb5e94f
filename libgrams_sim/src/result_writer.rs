use serde::Serialize;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::config::Config;
use super::error::ResultWriterError;
use super::event::SimulatedEvent;
use super::pixel_map::PixelMap;

const CLUSTERS_SUFFIX: &str = "_clusters.csv";
const READOUT_SUFFIX: &str = "_readout.csv";
const WAVEFORMS_SUFFIX: &str = "_waveforms.csv";
const HEADER_SUFFIX: &str = ".yml";

const CLUSTERS_COLUMNS: &str = "run,event,track_id,hit_id,cluster_id,energy,num_electrons,x,y,z,t";
const READOUT_COLUMNS: &str = "run,event,readout_index,x_index,y_index,track_id,hit_id,cluster_id";
const WAVEFORMS_COLUMNS: &str = "run,event,readout_index,x_index,y_index,kind,samples...";

/// This is the version of the output format
const FORMAT_VERSION: &str = "1.0";

/// Run level information, written next to the tables when the writer is closed
#[derive(Debug, Serialize)]
struct RunHeader<'a> {
    version: String,
    run_number: i32,
    created_unix_time: i64,
    n_events: u64,
    first_event: Option<i32>,
    last_event: Option<i32>,
    pixel_map: &'a PixelMap,
    config: &'a Config,
}

/// Append a suffix to a path stem (run_0001 -> run_0001_clusters.csv)
fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes the products of a run to disk.
///
/// Each run gets three CSV tables sharing a path stem: the electron clusters, the readout
/// map (one row per channel/cluster pair) and the waveforms (one analog and one digital row
/// per channel). A YAML header with the run metadata is written by [`ResultWriter::close`].
#[derive(Debug)]
pub struct ResultWriter {
    clusters: BufWriter<File>,
    readout: BufWriter<File>,
    waveforms: BufWriter<File>,
    header_path: PathBuf,
    run_number: i32,
    n_events: u64,
    first_event: Option<i32>,
    last_event: Option<i32>,
}

impl ResultWriter {
    /// Create the writer, opening the output tables at the given path stem
    pub fn new(stem: &Path, run_number: i32) -> Result<Self, ResultWriterError> {
        let mut clusters = BufWriter::new(File::create(with_suffix(stem, CLUSTERS_SUFFIX))?);
        let mut readout = BufWriter::new(File::create(with_suffix(stem, READOUT_SUFFIX))?);
        let mut waveforms = BufWriter::new(File::create(with_suffix(stem, WAVEFORMS_SUFFIX))?);
        writeln!(clusters, "{CLUSTERS_COLUMNS}")?;
        writeln!(readout, "{READOUT_COLUMNS}")?;
        writeln!(waveforms, "{WAVEFORMS_COLUMNS}")?;

        Ok(Self {
            clusters,
            readout,
            waveforms,
            header_path: with_suffix(stem, HEADER_SUFFIX),
            run_number,
            n_events: 0,
            first_event: None,
            last_event: None,
        })
    }

    pub fn write_event(&mut self, event: &SimulatedEvent) -> Result<(), ResultWriterError> {
        let (run, evt) = (event.id.run, event.id.event);
        if self.first_event.is_none() {
            self.first_event = Some(evt);
        }
        self.last_event = Some(evt);
        self.n_events += 1;

        for (key, cluster) in &event.clusters {
            writeln!(
                self.clusters,
                "{run},{evt},{},{},{},{},{},{},{},{},{}",
                key.track_id,
                key.hit_id,
                key.cluster_id,
                cluster.energy,
                cluster.num_electrons,
                cluster.x,
                cluster.y,
                cluster.z,
                cluster.t
            )?;
        }

        for (id, keys) in &event.readout_map {
            for key in keys {
                writeln!(
                    self.readout,
                    "{run},{evt},{},{},{},{},{},{}",
                    id.index(),
                    id.x_index,
                    id.y_index,
                    key.track_id,
                    key.hit_id,
                    key.cluster_id
                )?;
            }
        }

        for (id, waveform) in &event.waveforms {
            let prefix = format!("{run},{evt},{},{},{}", id.index(), id.x_index, id.y_index);
            write!(self.waveforms, "{prefix},analog")?;
            for sample in waveform.analog.iter() {
                write!(self.waveforms, ",{sample}")?;
            }
            writeln!(self.waveforms)?;
            write!(self.waveforms, "{prefix},digital")?;
            for sample in waveform.digital.iter() {
                write!(self.waveforms, ",{sample}")?;
            }
            writeln!(self.waveforms)?;
        }

        Ok(())
    }

    /// Write the run header and flush the tables, consume the writer
    pub fn close(mut self, config: &Config, pixel_map: &PixelMap) -> Result<(), ResultWriterError> {
        self.clusters.flush()?;
        self.readout.flush()?;
        self.waveforms.flush()?;

        let header = RunHeader {
            version: format!("{}:{}", env!("CARGO_PKG_NAME"), FORMAT_VERSION),
            run_number: self.run_number,
            created_unix_time: time::OffsetDateTime::now_utc().unix_timestamp(),
            n_events: self.n_events,
            first_event: self.first_event,
            last_event: self.last_event,
            pixel_map,
            config,
        };
        let mut header_file = File::create(&self.header_path)?;
        header_file.write_all(serde_yaml::to_string(&header)?.as_bytes())?;

        spdlog::info!(
            "{} events written for run {}.",
            self.n_events,
            self.run_number
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterKey, ClusterStore, ElectronCluster};
    use crate::event::EventID;
    use crate::geometry::VolumeTable;
    use crate::readout_id::ReadoutID;
    use crate::readout_map::ReadoutMap;
    use crate::waveform::{ReadoutWaveform, ReadoutWaveforms};

    fn make_event() -> SimulatedEvent {
        let key = ClusterKey::new(4, 2, 0);
        let mut clusters = ClusterStore::new();
        clusters.insert(ElectronCluster {
            key,
            energy: 0.5,
            num_electrons: 20,
            x: 1.0,
            y: 2.0,
            z: 3.0,
            t: 4.0,
        });
        let id = ReadoutID::new(3, 1);
        let mut readout_map = ReadoutMap::new();
        readout_map.insert(id, key);
        let mut waveforms = ReadoutWaveforms::new();
        waveforms.insert(ReadoutWaveform::new(id, vec![0.0, 1.5], vec![0, 7]));
        SimulatedEvent {
            id: EventID::new(9, 12),
            clusters,
            readout_map,
            waveforms,
        }
    }

    #[test]
    fn test_write_run() {
        let stem = std::env::temp_dir().join(format!("grams_sim_writer_{}", std::process::id()));
        let mut writer = ResultWriter::new(&stem, 9).unwrap();
        writer.write_event(&make_event()).unwrap();

        let config = Config::default();
        let pixel_map = PixelMap::new(&config.readout, &VolumeTable::new(None).unwrap()).unwrap();
        writer.close(&config, &pixel_map).unwrap();

        let clusters = std::fs::read_to_string(with_suffix(&stem, CLUSTERS_SUFFIX)).unwrap();
        let lines: Vec<&str> = clusters.lines().collect();
        assert_eq!(lines, vec![CLUSTERS_COLUMNS, "9,12,4,2,0,0.5,20,1,2,3,4"]);

        let readout = std::fs::read_to_string(with_suffix(&stem, READOUT_SUFFIX)).unwrap();
        assert_eq!(readout.lines().nth(1), Some("9,12,1000003,3,1,4,2,0"));

        let waveforms = std::fs::read_to_string(with_suffix(&stem, WAVEFORMS_SUFFIX)).unwrap();
        let lines: Vec<&str> = waveforms.lines().collect();
        assert_eq!(lines[1], "9,12,1000003,3,1,analog,0,1.5");
        assert_eq!(lines[2], "9,12,1000003,3,1,digital,0,7");

        let header = std::fs::read_to_string(with_suffix(&stem, HEADER_SUFFIX)).unwrap();
        assert!(header.contains("run_number: 9"));
        assert!(header.contains("n_events: 1"));
        assert!(header.contains("DriftVel:"));

        for suffix in [CLUSTERS_SUFFIX, READOUT_SUFFIX, WAVEFORMS_SUFFIX, HEADER_SUFFIX] {
            std::fs::remove_file(with_suffix(&stem, suffix)).unwrap();
        }
    }
}
