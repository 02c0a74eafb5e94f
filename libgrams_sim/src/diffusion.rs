use rand::Rng;
use rand_distr::StandardNormal;

use super::cluster::{ClusterKey, ElectronCluster};
use super::config::DetSimParams;
use super::constants::DIFFUSION_SIGMA_SCALE;
use super::error::DetSimError;
use super::hit::EnergyDeposit;

/// Splits the ionization charge of one energy deposit into electron clusters and spreads
/// them out by longitudinal and transverse diffusion during the drift to the anode.
///
/// The spread grows with the square root of the drift time. When a diffusion width is
/// zero the corresponding coordinates are exact and no random numbers are drawn.
#[derive(Debug, Clone)]
pub struct DiffusionModel {
    anode_z: f64,
    recip_drift_velocity: f64,
    mev_to_electrons: f64,
    longitudinal_const: f64,
    transverse_const: f64,
    cluster_size: f64,
    min_clusters: i32,
}

impl DiffusionModel {
    pub fn new(params: &DetSimParams) -> Result<Self, DetSimError> {
        if !(params.drift_velocity > 0.0) {
            return Err(DetSimError::InvalidParameter(
                "DriftVel",
                params.drift_velocity,
            ));
        }
        if !(params.electron_cluster_size > 0.0) {
            return Err(DetSimError::InvalidParameter(
                "ElectronClusterSize",
                params.electron_cluster_size,
            ));
        }
        if !(params.longitudinal_diffusion >= 0.0) {
            return Err(DetSimError::InvalidParameter(
                "LongitudinalDiffusion",
                params.longitudinal_diffusion,
            ));
        }
        if !(params.transverse_diffusion >= 0.0) {
            return Err(DetSimError::InvalidParameter(
                "TransverseDiffusion",
                params.transverse_diffusion,
            ));
        }
        spdlog::debug!(
            "DiffusionModel - LongitudinalDiffusion={} TransverseDiffusion={} ElectronClusterSize={}",
            params.longitudinal_diffusion,
            params.transverse_diffusion,
            params.electron_cluster_size
        );

        Ok(Self {
            anode_z: params.pixel_plane_offset,
            recip_drift_velocity: 1.0 / params.drift_velocity,
            mev_to_electrons: params.mev_to_electrons,
            longitudinal_const: (2.0 * params.longitudinal_diffusion).sqrt(),
            transverse_const: (2.0 * params.transverse_diffusion).sqrt(),
            cluster_size: params.electron_cluster_size,
            min_clusters: params.min_number_of_el_cluster,
        })
    }

    /// Diffusion widths (longitudinal, transverse) for a given drift time
    pub fn sigmas(&self, drift_time: f64) -> (f64, f64) {
        let scale = DIFFUSION_SIGMA_SCALE * drift_time.sqrt();
        (scale * self.longitudinal_const, scale * self.transverse_const)
    }

    /// Number of clusters and the number of electrons in each full cluster.
    ///
    /// Short or low-energy deposits are split into at least `MinNumberOfElCluster` clusters,
    /// as long as that leaves at least one electron per cluster.
    pub fn cluster_split(&self, n_electrons: f64) -> (usize, f64) {
        let mut size = self.cluster_size;
        let mut n_clusters = (n_electrons / size).ceil() as usize;
        if self.min_clusters > 0 && n_clusters < self.min_clusters as usize {
            size = (n_electrons / self.min_clusters as f64).max(1.0);
            n_clusters = (n_electrons / size).ceil() as usize;
        }
        (n_clusters, size)
    }

    /// Produce the clusters for `energy` (already corrected for recombination and
    /// absorption) deposited by `hit`.
    ///
    /// Returns no clusters if there are no electrons to drift.
    pub fn calculate<R: Rng + ?Sized>(
        &self,
        energy: f64,
        hit: &EnergyDeposit,
        rng: &mut R,
    ) -> Vec<ElectronCluster> {
        let n_electrons = energy * self.mev_to_electrons;
        if !(n_electrons > 0.0) || !n_electrons.is_finite() {
            return Vec::new();
        }

        let mid = hit.midpoint();
        let drift_distance = self.anode_z - mid.z;
        let mean_drift_time = (drift_distance * self.recip_drift_velocity).abs();
        let (sigma_long, sigma_trans) = self.sigmas(mean_drift_time);

        let (n_clusters, size) = self.cluster_split(n_electrons);

        let mut clusters: Vec<ElectronCluster> = (0..n_clusters)
            .map(|idx| {
                // The last cluster takes whatever charge is left over
                let count = if idx + 1 == n_clusters {
                    (n_electrons - (n_clusters - 1) as f64 * size).max(0.0)
                } else {
                    size
                };
                ElectronCluster {
                    key: ClusterKey::new(hit.track_id, hit.hit_id, idx as i32),
                    energy: energy * count / n_electrons,
                    num_electrons: count as u64,
                    x: mid.x,
                    y: mid.y,
                    z: mid.z,
                    t: drift_distance * self.recip_drift_velocity,
                }
            })
            .collect();

        if sigma_trans > 0.0 {
            for cluster in clusters.iter_mut() {
                let dx: f64 = rng.sample(StandardNormal);
                let dy: f64 = rng.sample(StandardNormal);
                cluster.x = mid.x + sigma_trans * dx;
                cluster.y = mid.y + sigma_trans * dy;
            }
        }

        if sigma_long > 0.0 {
            for cluster in clusters.iter_mut() {
                let dz: f64 = rng.sample(StandardNormal);
                let offset = sigma_long * dz;
                cluster.t = (drift_distance + offset) * self.recip_drift_velocity;
                cluster.z = mid.z + offset;
            }
        }

        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::Position4;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_params(long: f64, trans: f64, size: f64, min_clusters: i32) -> DetSimParams {
        DetSimParams {
            drift_velocity: 1.0,
            pixel_plane_offset: 10.0,
            mev_to_electrons: 100.0,
            longitudinal_diffusion: long,
            transverse_diffusion: trans,
            electron_cluster_size: size,
            min_number_of_el_cluster: min_clusters,
            ..Default::default()
        }
    }

    fn make_hit() -> EnergyDeposit {
        EnergyDeposit {
            track_id: 3,
            hit_id: 11,
            pdg_code: 13,
            energy: 1.0,
            start: Position4::new(1.0, 2.0, -1.0, 0.0),
            end: Position4::new(3.0, 4.0, 1.0, 0.0),
        }
    }

    #[test]
    fn test_undiffused_clusters() {
        let model = DiffusionModel::new(&make_params(0.0, 0.0, 50.0, 1)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let clusters = model.calculate(1.0, &make_hit(), &mut rng);

        assert_eq!(clusters.len(), 2);
        for (idx, cluster) in clusters.iter().enumerate() {
            assert_eq!(cluster.key, ClusterKey::new(3, 11, idx as i32));
            assert_eq!(cluster.num_electrons, 50);
            assert_eq!(cluster.energy, 0.5);
            assert_eq!((cluster.x, cluster.y, cluster.z), (2.0, 3.0, 0.0));
            assert_eq!(cluster.t, 10.0);
        }

        // No randomness consumed: the generator is still at its seeded state
        let mut fresh = StdRng::seed_from_u64(1);
        assert_eq!(rng.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn test_minimum_cluster_count() {
        let model = DiffusionModel::new(&make_params(0.0, 0.0, 50.0, 4)).unwrap();
        assert_eq!(model.cluster_split(100.0), (4, 25.0));
        // Never below one electron per cluster
        assert_eq!(model.cluster_split(2.0), (2, 1.0));
        // Remainder goes to the last cluster
        let model = DiffusionModel::new(&make_params(0.0, 0.0, 40.0, 1)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let counts: Vec<u64> = model
            .calculate(1.0, &make_hit(), &mut rng)
            .iter()
            .map(|c| c.num_electrons)
            .collect();
        assert_eq!(counts, vec![40, 40, 20]);
    }

    #[test]
    fn test_charge_conservation() {
        let model = DiffusionModel::new(&make_params(5.0, 5.0, 7.0, 3)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for energy in [0.013, 0.5, 1.0, 3.37, 12.0] {
            let clusters = model.calculate(energy, &make_hit(), &mut rng);
            let n_electrons = energy * 100.0;
            let total_electrons: u64 = clusters.iter().map(|c| c.num_electrons).sum();
            let total_energy: f64 = clusters.iter().map(|c| c.energy).sum();
            assert!((total_energy - energy).abs() < 1e-9);
            // Truncation loses less than one electron per cluster
            assert!(total_electrons as f64 <= n_electrons + 1e-9);
            assert!(n_electrons - (total_electrons as f64) < clusters.len() as f64);
        }
    }

    #[test]
    fn test_zero_energy() {
        let model = DiffusionModel::new(&make_params(5.0, 5.0, 7.0, 3)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(model.calculate(0.0, &make_hit(), &mut rng).is_empty());
        assert!(model.calculate(-1.0, &make_hit(), &mut rng).is_empty());
        assert!(model.calculate(f64::NAN, &make_hit(), &mut rng).is_empty());
    }

    #[test]
    fn test_seed_determinism() {
        let model = DiffusionModel::new(&make_params(100.0, 100.0, 10.0, 1)).unwrap();
        let first = model.calculate(1.0, &make_hit(), &mut StdRng::seed_from_u64(99));
        let second = model.calculate(1.0, &make_hit(), &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
        let other = model.calculate(1.0, &make_hit(), &mut StdRng::seed_from_u64(100));
        assert_ne!(first, other);
    }

    #[test]
    fn test_spread_only_where_diffusing() {
        // Transverse only: times are exact, positions spread
        let model = DiffusionModel::new(&make_params(0.0, 1000.0, 10.0, 1)).unwrap();
        let clusters = model.calculate(1.0, &make_hit(), &mut StdRng::seed_from_u64(5));
        assert!(clusters.iter().all(|c| c.t == 10.0 && c.z == 0.0));
        assert!(clusters.iter().any(|c| c.x != 2.0));

        // Longitudinal only: positions are exact, times spread
        let model = DiffusionModel::new(&make_params(1000.0, 0.0, 10.0, 1)).unwrap();
        let clusters = model.calculate(1.0, &make_hit(), &mut StdRng::seed_from_u64(5));
        assert!(clusters.iter().all(|c| c.x == 2.0 && c.y == 3.0));
        assert!(clusters.iter().any(|c| c.t != 10.0));
        for c in clusters.iter() {
            // t and z move together
            assert!(((c.t - 10.0) - c.z).abs() < 1e-9);
        }
    }
}
