use std::collections::btree_map::{BTreeMap, Iter};
use std::fmt::Display;

/// Content-addressed identifier of an ElectronCluster: (track, hit, cluster).
///
/// Unique within an event. Lets the readout and electronics stages backtrack to the
/// energy deposit that produced the charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterKey {
    pub track_id: i32,
    pub hit_id: i32,
    pub cluster_id: i32,
}

impl ClusterKey {
    pub fn new(track_id: i32, hit_id: i32, cluster_id: i32) -> Self {
        Self {
            track_id,
            hit_id,
            cluster_id,
        }
    }
}

impl Display for ClusterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(track={}, hit={}, cluster={})",
            self.track_id, self.hit_id, self.cluster_id
        )
    }
}

/// A packet of ionization electrons as it arrives at the anode.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectronCluster {
    pub key: ClusterKey,
    /// Energy carried to the anode, after all corrections
    pub energy: f64,
    pub num_electrons: u64,
    pub x: f64,
    pub y: f64,
    /// Not a position at the anode; the z used to compute the arrival time
    pub z: f64,
    /// Arrival time at the anode
    pub t: f64,
}

impl Display for ElectronCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Track ID={}, Hit ID={}, Cluster ID={}, #electrons={}, at anode: Energy={:.4} (x,y,z,t)=({:>8.3},{:>8.3},{:>8.3},{:>8.3})",
            self.key.track_id,
            self.key.hit_id,
            self.key.cluster_id,
            self.num_electrons,
            self.energy,
            self.x,
            self.y,
            self.z,
            self.t
        )
    }
}

/// All the ElectronClusters of one event, keyed by ClusterKey.
///
/// Clusters which carry no energy to the anode are never stored.
#[derive(Debug, Clone, Default)]
pub struct ClusterStore {
    clusters: BTreeMap<ClusterKey, ElectronCluster>,
}

impl ClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cluster. Returns false (and drops the cluster) if its energy is not
    /// positive.
    pub fn insert(&mut self, cluster: ElectronCluster) -> bool {
        if !(cluster.energy > 0.0) {
            return false;
        }
        self.clusters.insert(cluster.key, cluster);
        true
    }

    pub fn get(&self, key: &ClusterKey) -> Option<&ElectronCluster> {
        self.clusters.get(key)
    }

    pub fn contains(&self, key: &ClusterKey) -> bool {
        self.clusters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, ClusterKey, ElectronCluster> {
        self.clusters.iter()
    }

    pub fn total_electrons(&self) -> u64 {
        self.clusters.values().map(|c| c.num_electrons).sum()
    }

    pub fn total_energy(&self) -> f64 {
        self.clusters.values().map(|c| c.energy).sum()
    }
}

impl<'a> IntoIterator for &'a ClusterStore {
    type Item = (&'a ClusterKey, &'a ElectronCluster);
    type IntoIter = Iter<'a, ClusterKey, ElectronCluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

impl Display for ClusterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for cluster in self.clusters.values() {
            writeln!(f, "{cluster}")?;
        }
        Ok(())
    }
}
