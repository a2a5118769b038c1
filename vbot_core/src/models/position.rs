// vbot_core/src/models/position.rs

use crate::messages::Measurement;
use nalgebra::RowVector3;
use serde::{Deserialize, Serialize};

/// Measurement variances for present and absent observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MeasurementNoise {
    pub present: f64,
    /// Used with the pseudo-measurement that stands in for a missing reading.
    pub absent: f64,
}

impl Default for MeasurementNoise {
    fn default() -> Self {
        Self {
            present: 1.0,
            absent: 10.0,
        }
    }
}

/// Direct observation of the position component of a channel state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionMeasurement;

impl PositionMeasurement {
    /// The measurement matrix `H = [1, 0, 0]`.
    pub fn jacobian(&self) -> RowVector3<f64> {
        RowVector3::new(1.0, 0.0, 0.0)
    }

    /// Resolves a measurement into the value fed to the update and its variance.
    ///
    /// An absent reading becomes a pseudo-measurement at `last_position`.
    pub fn resolve(
        &self,
        measurement: Measurement,
        last_position: f64,
        noise: &MeasurementNoise,
    ) -> (f64, f64) {
        match measurement {
            Measurement::Present(z) => (z, noise.present),
            Measurement::Absent => (last_position, noise.absent),
        }
    }
}
