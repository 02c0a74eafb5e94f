use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::GeometryError;

/// Load the bundled geometry
fn load_default_geometry() -> String {
    String::from(include_str!("data/default_geometry.yml"))
}

/// Anything that can tell us the size of a named detector volume.
///
/// Only the bounding box is needed here; the full geometry description lives upstream
/// with the transport simulation.
pub trait Geometry {
    /// Half extents (x, y, z) of the volume's bounding box, in mm
    fn half_extents(&self, volume: &str) -> Result<[f64; 3], GeometryError>;
}

/// A flat table of volume name -> bounding-box half extents.
///
/// Read from a YAML file with a single `volumes` mapping. If no file is given the table
/// bundled with the code base is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeTable {
    volumes: FxHashMap<String, [f64; 3]>,
}

impl VolumeTable {
    /// Create a new VolumeTable
    /// If the path is None, we load the default that is bundled with the simulation
    pub fn new(path: Option<&Path>) -> Result<Self, GeometryError> {
        let contents = if let Some(p) = path {
            if !p.exists() {
                return Err(GeometryError::BadFilePath(p.to_path_buf()));
            }
            std::fs::read_to_string(p)?
        } else {
            load_default_geometry()
        };

        Ok(serde_yaml::from_str::<Self>(&contents)?)
    }

    /// Add or replace a volume
    pub fn insert(&mut self, name: &str, half_extents: [f64; 3]) {
        self.volumes.insert(name.to_string(), half_extents);
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

impl Geometry for VolumeTable {
    fn half_extents(&self, volume: &str) -> Result<[f64; 3], GeometryError> {
        self.volumes
            .get(volume)
            .copied()
            .ok_or_else(|| GeometryError::VolumeNotFound(volume.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_READOUT_VOLUME;

    #[test]
    fn test_default_geometry() {
        let geo = match VolumeTable::new(None) {
            Ok(g) => g,
            Err(_) => panic!(),
        };
        assert_eq!(
            geo.half_extents(DEFAULT_READOUT_VOLUME).unwrap(),
            [150.0, 150.0, 100.0]
        );
    }

    #[test]
    fn test_missing_volume() {
        let mut geo = VolumeTable::default();
        geo.insert("Box", [1.0, 2.0, 3.0]);
        assert_eq!(geo.half_extents("Box").unwrap(), [1.0, 2.0, 3.0]);
        match geo.half_extents("NotABox") {
            Err(GeometryError::VolumeNotFound(name)) => assert_eq!(name, "NotABox"),
            _ => panic!(),
        }
    }
}
