use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::HitFileError;
use super::event::EventID;
use super::hit::{EnergyDeposit, Position4};

/// Number of columns in a row of the hit table
pub const HIT_ENTRIES_PER_LINE: usize = 14;
/// Header written by the transport stage (and by us, in tests)
pub const HIT_FILE_HEADER: &str =
    "run,event,track_id,hit_id,pdg_code,energy,start_x,start_y,start_z,start_t,end_x,end_y,end_z,end_t";

/// One row of the hit table: an energy deposit tagged with the event it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub event_id: EventID,
    pub hit: EnergyDeposit,
}

/// A reader over the hit table of a single run.
///
/// The table is a CSV text file with a header line followed by one energy deposit per row.
/// Rows are handed out one at a time in file order. Blank lines and lines starting with
/// `#` are ignored.
#[derive(Debug)]
pub struct HitFile {
    reader: BufReader<File>,
    file_path: PathBuf,
    size_bytes: u64,
    bytes_read: u64,
    line_number: usize,
    line: String,
}

impl HitFile {
    /// Open a hit file and consume its header
    pub fn new(path: &Path) -> Result<Self, HitFileError> {
        if !path.exists() {
            return Err(HitFileError::BadFilePath(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let size_bytes = file.metadata()?.len();
        let mut hit_file = HitFile {
            reader: BufReader::new(file),
            file_path: path.to_path_buf(),
            size_bytes,
            bytes_read: 0,
            line_number: 0,
            line: String::new(),
        };
        hit_file.read_line()?;
        Ok(hit_file)
    }

    /// Get the next hit in the file
    ///
    /// Returns a `Result<Option<HitRecord>>`. The Option is None once the end of the file
    /// is reached.
    pub fn get_next_hit(&mut self) -> Result<Option<HitRecord>, HitFileError> {
        loop {
            if self.read_line()? == 0 {
                return Ok(None);
            }
            let line = self.line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(Some(parse_record(line, self.line_number)?));
        }
    }

    pub fn get_filename(&self) -> &Path {
        &self.file_path
    }

    pub fn get_size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Number of bytes consumed so far, header included
    pub fn get_bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn read_line(&mut self) -> Result<usize, HitFileError> {
        self.line.clear();
        let n_bytes = self.reader.read_line(&mut self.line)?;
        if n_bytes > 0 {
            self.line_number += 1;
            self.bytes_read += n_bytes as u64;
        }
        Ok(n_bytes)
    }
}

fn parse_int<T: FromStr<Err = std::num::ParseIntError>>(
    entry: &str,
    line: usize,
) -> Result<T, HitFileError> {
    entry
        .parse::<T>()
        .map_err(|e| HitFileError::ParseIntError(line, e))
}

fn parse_float(entry: &str, line: usize) -> Result<f64, HitFileError> {
    entry
        .parse::<f64>()
        .map_err(|e| HitFileError::ParseFloatError(line, e))
}

fn parse_position(entries: &[&str], line: usize) -> Result<Position4, HitFileError> {
    Ok(Position4::new(
        parse_float(entries[0], line)?,
        parse_float(entries[1], line)?,
        parse_float(entries[2], line)?,
        parse_float(entries[3], line)?,
    ))
}

fn parse_record(line: &str, line_number: usize) -> Result<HitRecord, HitFileError> {
    let entries: Vec<&str> = line.split(',').map(str::trim).collect();
    if entries.len() != HIT_ENTRIES_PER_LINE {
        return Err(HitFileError::BadFileFormat(
            line_number,
            HIT_ENTRIES_PER_LINE,
            entries.len(),
        ));
    }

    Ok(HitRecord {
        event_id: EventID::new(
            parse_int(entries[0], line_number)?,
            parse_int(entries[1], line_number)?,
        ),
        hit: EnergyDeposit {
            track_id: parse_int(entries[2], line_number)?,
            hit_id: parse_int(entries[3], line_number)?,
            pdg_code: parse_int(entries[4], line_number)?,
            energy: parse_float(entries[5], line_number)?,
            start: parse_position(&entries[6..10], line_number)?,
            end: parse_position(&entries[10..14], line_number)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "grams_sim_{}_{}.csv",
            name,
            std::process::id()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_hits() {
        let contents = format!(
            "{HIT_FILE_HEADER}\n\
             1,0,1,0,13,0.5,0,0,-1,0,0,0,1,0.1\n\
             \n\
             # comment\n\
             1, 1, 2, 5, 11, 0.25, 1.5, 2.5, 3.5, 1, 2, 3, 4, 2\n"
        );
        let path = write_temp_file("read_hits", &contents);
        let mut hit_file = HitFile::new(&path).unwrap();
        assert_eq!(hit_file.get_size_bytes(), contents.len() as u64);

        let first = hit_file.get_next_hit().unwrap().unwrap();
        assert_eq!(first.event_id, EventID::new(1, 0));
        assert_eq!(first.hit.pdg_code, 13);
        assert_eq!(first.hit.start, Position4::new(0.0, 0.0, -1.0, 0.0));
        assert_eq!(first.hit.end.t, 0.1);

        let second = hit_file.get_next_hit().unwrap().unwrap();
        assert_eq!(second.event_id, EventID::new(1, 1));
        assert_eq!((second.hit.track_id, second.hit.hit_id), (2, 5));
        assert_eq!(second.hit.energy, 0.25);
        assert_eq!(second.hit.start, Position4::new(1.5, 2.5, 3.5, 1.0));

        assert!(hit_file.get_next_hit().unwrap().is_none());
        assert_eq!(hit_file.get_bytes_read(), contents.len() as u64);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_bad_rows() {
        let path = write_temp_file(
            "bad_rows",
            &format!("{HIT_FILE_HEADER}\n1,0,1,0,13,0.5,0,0,-1,0\n1,0,x,0,13,0.5,0,0,-1,0,0,0,1,0\n"),
        );
        let mut hit_file = HitFile::new(&path).unwrap();
        assert!(matches!(
            hit_file.get_next_hit(),
            Err(HitFileError::BadFileFormat(2, 14, 10))
        ));
        assert!(matches!(
            hit_file.get_next_hit(),
            Err(HitFileError::ParseIntError(3, _))
        ));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            HitFile::new(Path::new("/not/a/real/run_0000.csv")),
            Err(HitFileError::BadFilePath(_))
        ));
    }
}
