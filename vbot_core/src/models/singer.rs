// vbot_core/src/models/singer.rs

use crate::error::EstimationError;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Parameters of the Singer (first-order Markov acceleration) model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SingerParams {
    /// Inverse of the manoeuvre time constant, 1/s.
    pub alpha_acc: f64,
    /// Acceleration variance scale.
    pub sigma_square: f64,
}

impl Default for SingerParams {
    fn default() -> Self {
        Self {
            alpha_acc: 0.1,
            sigma_square: 0.1,
        }
    }
}

/// Transition and process-noise matrices for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretization {
    pub dt: f64,
    /// `A(dt)`.
    pub transition: Matrix3<f64>,
    /// `Q(dt)`, symmetric.
    pub process_noise: Matrix3<f64>,
}

/// Continuous-time Singer model for a `[position, velocity, acceleration]` state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingerModel {
    params: SingerParams,
}

impl SingerModel {
    pub fn new(params: SingerParams) -> Result<Self, EstimationError> {
        if !(params.alpha_acc.is_finite() && params.alpha_acc > 0.0) {
            return Err(EstimationError::InvalidParameters(format!(
                "alpha_acc must be positive, got {}",
                params.alpha_acc
            )));
        }
        if !(params.sigma_square.is_finite() && params.sigma_square >= 0.0) {
            return Err(EstimationError::InvalidParameters(format!(
                "sigma_square must be non-negative, got {}",
                params.sigma_square
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &SingerParams {
        &self.params
    }

    /// Discretizes the model over `dt` seconds.
    ///
    /// # Errors
    /// `InvalidTimeStep` if `dt` is not finite and strictly positive.
    pub fn discretize(&self, dt: f64) -> Result<Discretization, EstimationError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(EstimationError::InvalidTimeStep(dt));
        }

        let a = self.params.alpha_acc;
        let adt = a * dt;
        let e = (-adt).exp();
        let e2 = (-2.0 * adt).exp();

        #[rustfmt::skip]
        let transition = Matrix3::new(
            1.0, dt,  (e + adt - 1.0) / (a * a),
            0.0, 1.0, (1.0 - e) / a,
            0.0, 0.0, e,
        );

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let q11 = (1.0 - e2 + 2.0 * adt + (2.0 / 3.0) * adt.powi(3)
            - 2.0 * adt.powi(2)
            - 4.0 * adt * e)
            / a4;
        let q12 = (e2 + 1.0 - 2.0 * e + 2.0 * adt * e - 2.0 * adt + adt.powi(2)) / a3;
        let q13 = (1.0 - e2 - 2.0 * adt * e) / a2;
        let q22 = (4.0 * e - 3.0 - e2 + 2.0 * adt) / a2;
        let q23 = (e2 + 1.0 - 2.0 * e) / a;
        let q33 = 1.0 - e2;

        #[rustfmt::skip]
        let process_noise = Matrix3::new(
            q11, q12, q13,
            q12, q22, q23,
            q13, q23, q33,
        ) * self.params.sigma_square;

        Ok(Discretization {
            dt,
            transition,
            process_noise,
        })
    }
}

impl Default for SingerModel {
    fn default() -> Self {
        Self {
            params: SingerParams::default(),
        }
    }
}
