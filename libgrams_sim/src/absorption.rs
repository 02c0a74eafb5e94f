use super::config::DetSimParams;
use super::error::DetSimError;
use super::hit::Position4;

/// Corrects a deposited energy for electrons captured by impurities while drifting to the
/// anode. The surviving fraction decays exponentially with drift time.
#[derive(Debug, Clone)]
pub struct AbsorptionModel {
    anode_z: f64,
    recip_drift_velocity: f64,
    lifetime: f64,
}

impl AbsorptionModel {
    pub fn new(params: &DetSimParams) -> Result<Self, DetSimError> {
        if !(params.drift_velocity > 0.0) {
            return Err(DetSimError::InvalidParameter(
                "DriftVel",
                params.drift_velocity,
            ));
        }
        if !(params.electron_lifetime > 0.0) {
            return Err(DetSimError::InvalidParameter(
                "ElectronLifeTimeCorr",
                params.electron_lifetime,
            ));
        }
        spdlog::debug!("AbsorptionModel - lifetime={}", params.electron_lifetime);
        Ok(Self {
            anode_z: params.pixel_plane_offset,
            recip_drift_velocity: 1.0 / params.drift_velocity,
            lifetime: params.electron_lifetime,
        })
    }

    pub fn calculate(&self, energy: f64, start: &Position4, end: &Position4) -> f64 {
        let z_mean = 0.5 * (start.z + end.z);
        let drift_time = ((self.anode_z - z_mean) * self.recip_drift_velocity).abs();
        energy * (-drift_time / self.lifetime).exp()
    }
}
