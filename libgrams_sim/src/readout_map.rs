use std::collections::btree_map::{BTreeMap, Iter};
use std::collections::BTreeSet;
use std::fmt::Display;

use super::cluster::{ClusterKey, ClusterStore};
use super::error::ReadoutError;
use super::pixel_map::PixelMap;
use super::readout_id::ReadoutID;

/// The link between the detector response and the electronics: which clusters drifted
/// to which readout channel in one event.
///
/// Only cluster keys are stored, never the clusters themselves. Every key must resolve in
/// the ClusterStore of the same event, see [`ReadoutMap::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadoutMap {
    channels: BTreeMap<ReadoutID, BTreeSet<ClusterKey>>,
}

impl ReadoutMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for an event. Clusters without energy at the anode are skipped.
    pub fn build(clusters: &ClusterStore, pixel_map: &PixelMap) -> Self {
        let mut map = ReadoutMap::new();
        for (key, cluster) in clusters {
            if !(cluster.energy > 0.0) {
                continue;
            }
            map.insert(pixel_map.assign(cluster.x, cluster.y), *key);
        }
        map
    }

    /// Attach a cluster to a channel
    pub fn insert(&mut self, id: ReadoutID, key: ClusterKey) {
        self.channels.entry(id).or_default().insert(key);
    }

    /// Check that every cluster key in the map exists in the given store
    pub fn validate(&self, clusters: &ClusterStore) -> Result<(), ReadoutError> {
        for (id, keys) in self.channels.iter() {
            if let Some(key) = keys.iter().find(|k| !clusters.contains(k)) {
                return Err(ReadoutError::DanglingCluster(*id, *key));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &ReadoutID) -> Option<&BTreeSet<ClusterKey>> {
        self.channels.get(id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, ReadoutID, BTreeSet<ClusterKey>> {
        self.channels.iter()
    }
}

impl<'a> IntoIterator for &'a ReadoutMap {
    type Item = (&'a ReadoutID, &'a BTreeSet<ClusterKey>);
    type IntoIter = Iter<'a, ReadoutID, BTreeSet<ClusterKey>>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

impl Display for ReadoutMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, keys) in self.channels.iter() {
            write!(f, "{id} clusters:")?;
            for key in keys {
                write!(f, " {key}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
