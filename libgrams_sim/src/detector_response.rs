use rand::Rng;

use super::absorption::AbsorptionModel;
use super::cluster::{ClusterKey, ClusterStore, ElectronCluster};
use super::config::DetSimParams;
use super::diffusion::DiffusionModel;
use super::error::DetSimError;
use super::hit::EnergyDeposit;
use super::recombination::RecombinationModel;

/// The detector response of the TPC: turns the energy deposits of an event into the
/// electron clusters which arrive at the anode.
///
/// Each of the three effects can be switched off in the configuration.
#[derive(Debug, Clone)]
pub struct DetectorResponse {
    recombination: Option<RecombinationModel>,
    absorption: Option<AbsorptionModel>,
    diffusion: Option<DiffusionModel>,
    anode_z: f64,
    recip_drift_velocity: f64,
    mev_to_electrons: f64,
}

impl DetectorResponse {
    pub fn new(params: &DetSimParams) -> Result<Self, DetSimError> {
        if !(params.drift_velocity > 0.0) {
            return Err(DetSimError::InvalidParameter(
                "DriftVel",
                params.drift_velocity,
            ));
        }
        if !(params.mev_to_electrons > 0.0) {
            return Err(DetSimError::InvalidParameter(
                "MeVToElectrons",
                params.mev_to_electrons,
            ));
        }

        let recombination = match params.recombination {
            true => Some(RecombinationModel::new(params)?),
            false => None,
        };
        let absorption = match params.absorption {
            true => Some(AbsorptionModel::new(params)?),
            false => None,
        };
        let diffusion = match params.diffusion {
            true => Some(DiffusionModel::new(params)?),
            false => None,
        };
        spdlog::info!(
            "Detector response - recombination: {} absorption: {} diffusion: {}",
            params.recombination,
            params.absorption,
            params.diffusion
        );

        Ok(Self {
            recombination,
            absorption,
            diffusion,
            anode_z: params.pixel_plane_offset,
            recip_drift_velocity: 1.0 / params.drift_velocity,
            mev_to_electrons: params.mev_to_electrons,
        })
    }

    /// Energy of a hit after recombination and absorption. Never NaN: an energy that
    /// cannot be computed becomes 0.
    pub fn corrected_energy(&self, hit: &EnergyDeposit) -> f64 {
        let mut energy = hit.energy;
        if let Some(model) = &self.recombination {
            energy = model.calculate(energy, &hit.start, &hit.end);
            if !energy.is_finite() {
                spdlog::debug!(
                    "Recombination gave a non-finite energy for track {} hit {}; energy set to 0",
                    hit.track_id,
                    hit.hit_id
                );
                energy = 0.0;
            }
        }
        if let Some(model) = &self.absorption {
            energy = model.calculate(energy, &hit.start, &hit.end);
        }
        if !energy.is_finite() {
            energy = 0.0;
        }
        energy
    }

    /// The clusters produced by a single hit
    pub fn process_hit<R: Rng + ?Sized>(
        &self,
        hit: &EnergyDeposit,
        rng: &mut R,
    ) -> Vec<ElectronCluster> {
        let energy = self.corrected_energy(hit);
        match &self.diffusion {
            Some(model) => model.calculate(energy, hit, rng),
            None => {
                let mid = hit.midpoint();
                let drift_distance = self.anode_z - mid.z;
                vec![ElectronCluster {
                    key: ClusterKey::new(hit.track_id, hit.hit_id, 0),
                    energy,
                    num_electrons: (energy * self.mev_to_electrons) as u64,
                    x: mid.x,
                    y: mid.y,
                    z: mid.z,
                    t: drift_distance * self.recip_drift_velocity,
                }]
            }
        }
    }

    /// Process the hits of an event, in order, into a fresh ClusterStore
    pub fn process_event<R: Rng + ?Sized>(
        &self,
        hits: &[EnergyDeposit],
        rng: &mut R,
    ) -> ClusterStore {
        let mut store = ClusterStore::new();
        for hit in hits {
            for cluster in self.process_hit(hit, rng) {
                if store.contains(&cluster.key) {
                    spdlog::warn!(
                        "Cluster {} appears twice in the event; keeping the later one",
                        cluster.key
                    );
                }
                store.insert(cluster);
            }
        }
        store
    }
}
