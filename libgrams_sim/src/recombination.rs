use super::config::DetSimParams;
use super::constants::MIN_BOX_RECOMBINATION;
use super::error::DetSimError;
use super::hit::Position4;

/// The functional form used for electron-ion recombination.
///
/// Both models come from "A study of electron recombination using highly ionizing
/// particles in the ArgoNeuT Liquid Argon TPC", arXiv:1306.1712.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecombinationKind {
    /// Modified box model, with the ICARUS parametrization
    ModifiedBox { alpha: f64, beta: f64 },
    /// Birks' law
    Birks { a_b: f64, k_b: f64 },
}

/// Corrects a deposited energy for the charge lost to recombination, which depends on the
/// local ionization density dE/dx.
#[derive(Debug, Clone)]
pub struct RecombinationModel {
    kind: RecombinationKind,
    field: f64,
    rho: f64,
}

impl RecombinationModel {
    pub fn new(params: &DetSimParams) -> Result<Self, DetSimError> {
        let kind = match params.recom_model {
            0 => RecombinationKind::ModifiedBox {
                alpha: params.a,
                beta: params.b,
            },
            1 => RecombinationKind::Birks {
                a_b: params.birks_ab,
                k_b: params.birks_kb,
            },
            other => return Err(DetSimError::InvalidRecombinationModel(other)),
        };
        if !(params.field > 0.0) {
            return Err(DetSimError::InvalidParameter("field", params.field));
        }
        if !(params.rho > 0.0) {
            return Err(DetSimError::InvalidParameter("rho", params.rho));
        }
        spdlog::debug!(
            "RecombinationModel - {:?} field={} rho={}",
            kind,
            params.field,
            params.rho
        );
        Ok(Self {
            kind,
            field: params.field,
            rho: params.rho,
        })
    }

    /// Energy left after recombination for a step from `start` to `end`.
    ///
    /// A zero-length step has no defined dE/dx; the result is then NaN and it is up to the
    /// caller to decide what that energy becomes.
    pub fn calculate(&self, energy: f64, start: &Position4, end: &Position4) -> f64 {
        let dx = start.distance(end);
        let dedx = energy / dx;
        if !dedx.is_finite() {
            return f64::NAN;
        }

        let effect = match self.kind {
            RecombinationKind::ModifiedBox { alpha, beta } => {
                let effective_efield = (beta * dedx) / (self.field * self.rho);
                let box_effect = (alpha + effective_efield).ln() / effective_efield;
                if box_effect.is_nan() {
                    box_effect
                } else {
                    box_effect.max(MIN_BOX_RECOMBINATION)
                }
            }
            RecombinationKind::Birks { a_b, k_b } => {
                a_b / (1.0 + k_b * dedx / (self.field * self.rho))
            }
        };
        energy * effect
    }
}
