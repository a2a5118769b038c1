// vbot_core/src/estimation/filters/kalman.rs

use crate::messages::Measurement;
use crate::models::{Discretization, MeasurementNoise, PositionMeasurement, SingerParams};
use crate::types::KinematicEstimate;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Innovation variances below this are treated as singular.
const SINGULAR_INNOVATION: f64 = 1e-12;

/// Tunables shared by every channel of a bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ChannelConfig {
    pub model: SingerParams,
    pub noise: MeasurementNoise,
    /// Diagonal of the covariance a channel is seeded with.
    pub initial_covariance: [f64; 3],
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            model: SingerParams::default(),
            noise: MeasurementNoise::default(),
            initial_covariance: [1.0, 100.0, 10.0],
        }
    }
}

/// The `[position, velocity, acceleration]` state of one channel and its covariance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub covariance: Matrix3<f64>,
}

impl FilterState {
    pub fn new(position: f64, velocity: f64, acceleration: f64, covariance: Matrix3<f64>) -> Self {
        Self {
            position,
            velocity,
            acceleration,
            covariance,
        }
    }

    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.position, self.velocity, self.acceleration)
    }

    fn from_parts(x: Vector3<f64>, covariance: Matrix3<f64>) -> Self {
        Self::new(x[0], x[1], x[2], covariance)
    }
}

/// PURE FUNCTION: Propagates a state through `A(dt)` and adds `Q(dt)`.
pub fn kf_predict(state: &FilterState, disc: &Discretization) -> FilterState {
    let a = &disc.transition;
    let x = a * state.vector();
    let p = a * state.covariance * a.transpose() + disc.process_noise;
    FilterState::from_parts(x, p)
}

/// PURE FUNCTION: Fuses the scalar position reading `z` with variance `r`.
pub fn kf_update(predicted: &FilterState, z: f64, r: f64) -> FilterState {
    let h = PositionMeasurement.jacobian();
    let p_pre = &predicted.covariance;
    let x_pre = predicted.vector();

    let s = (h * p_pre * h.transpose())[(0, 0)] + r;
    // Pseudo-inverse of the 1x1 innovation covariance.
    let s_pinv = if s.abs() > SINGULAR_INNOVATION {
        1.0 / s
    } else {
        0.0
    };
    let k_gain: Vector3<f64> = p_pre * h.transpose() * s_pinv;

    let innovation = z - (h * x_pre)[(0, 0)];
    let x = x_pre + k_gain * innovation;
    let p = (Matrix3::identity() - k_gain * h) * p_pre;
    // Tiny numerical errors can make P slightly non-symmetric. This forces it.
    let p = (p + p.transpose()) * 0.5;

    FilterState::from_parts(x, p)
}

/// One full predict/correct cycle.
///
/// An absent reading is replaced by a pseudo-measurement at the previous
/// filtered position with the inflated `noise.absent` variance, so the state
/// keeps coasting on its velocity while being pulled back gently.
pub fn predict_correct(
    state: &FilterState,
    measurement: Measurement,
    disc: &Discretization,
    noise: &MeasurementNoise,
) -> FilterState {
    let (z, r) = PositionMeasurement.resolve(measurement, state.position, noise);
    let predicted = kf_predict(state, disc);
    kf_update(&predicted, z, r)
}

/// A single Singer-model Kalman filter over one scalar quantity.
#[derive(Debug, Clone)]
pub struct ScalarKalmanChannel {
    initial_velocity: f64,
    initial_covariance: Matrix3<f64>,
    noise: MeasurementNoise,
    state: Option<FilterState>,
    ready: bool,
}

impl ScalarKalmanChannel {
    pub fn new(initial_velocity: f64, config: &ChannelConfig) -> Self {
        let [p0, p1, p2] = config.initial_covariance;
        Self {
            initial_velocity,
            initial_covariance: Matrix3::from_diagonal(&Vector3::new(p0, p1, p2)),
            noise: config.noise,
            state: None,
            ready: false,
        }
    }

    /// Feeds one tick's reading.
    ///
    /// The first present reading only seeds the state. Absent readings before
    /// that are ignored.
    pub fn add(&mut self, measurement: Measurement, disc: &Discretization) {
        match (self.state.as_ref(), measurement) {
            (None, Measurement::Present(z)) => {
                self.state = Some(FilterState::new(
                    z,
                    self.initial_velocity,
                    0.0,
                    self.initial_covariance,
                ));
            }
            (None, Measurement::Absent) => {}
            (Some(state), m) => {
                self.state = Some(predict_correct(state, m, disc, &self.noise));
                self.ready = true;
            }
        }
    }

    pub fn get_estimated_state(&self) -> Option<KinematicEstimate> {
        self.state.as_ref().map(|s| KinematicEstimate {
            position: s.position,
            velocity: s.velocity,
            acceleration: s.acceleration,
            ready: self.ready,
        })
    }

    pub fn filter_state(&self) -> Option<&FilterState> {
        self.state.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Drops the state; the next present reading seeds again.
    pub fn reset(&mut self) {
        self.state = None;
        self.ready = false;
    }
}
