// vbot_core/src/guidance/objective.rs

//! Objective functions of the focal-pair law and their partial derivatives.
//!
//! `y1` measures how far the predicted closest-approach separation of the two
//! foci is from the target shape, `y2` is the squared relative speed of the
//! first focus. Both are differentiated w.r.t. the LOS rates `(Vr_i, Vtheta_i)`
//! through the intermediates `V_i`, `A_i` and `tau`.

use crate::error::{GeometryFault, GuidanceError};
use crate::guidance::los::LineOfSight;
use crate::guidance::GuidanceConfig;
use crate::utils::{clamp_away_from_zero, saturate};

/// Objective values for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objectives {
    /// Saturated to `objective_bound`.
    pub y1: f64,
    pub y2: f64,
}

/// Partial derivatives of the objectives w.r.t. the LOS rates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectiveGradients {
    pub dy1_dvr1: f64,
    pub dy1_dvt1: f64,
    pub dy1_dvr2: f64,
    pub dy1_dvt2: f64,
    pub dy2_dvr1: f64,
    pub dy2_dvt1: f64,
}

/// Shared intermediates of the focal-pair objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairTerms {
    pub r1: f64,
    pub r2: f64,
    pub vr1: f64,
    pub vr2: f64,
    pub vt1: f64,
    pub vt2: f64,
    /// Relative speeds `V_i`.
    pub v1: f64,
    pub v2: f64,
    /// Miss-distance arms `A_i = r_i Vtheta_i / V_i`.
    pub a1: f64,
    pub a2: f64,
    /// `A1 + A2`, kept at least `tau_floor` away from zero.
    pub arm_sum: f64,
    pub arm_sum_clamped: bool,
    /// `r1 Vr1 / V1^2 - r2 Vr2 / V2^2`.
    pub time_gap: f64,
    /// Time-to-go mismatch `tau = (time_gap / arm_sum)^2`.
    pub tau: f64,
    /// `1 + tau (V1^2 + V2^2) + tau^2 V1^2 V2^2`.
    pub root: f64,
}

impl PairTerms {
    /// # Errors
    /// `DegenerateGeometry(StationaryLineOfSight)` if either relative speed is
    /// below `min_los_rate`.
    pub fn new(
        los1: &LineOfSight,
        los2: &LineOfSight,
        config: &GuidanceConfig,
    ) -> Result<Self, GuidanceError> {
        let (r1, r2) = (los1.range, los2.range);
        let (vr1, vr2) = (los1.radial_rate, los2.radial_rate);
        let (vt1, vt2) = (los1.transverse_rate, los2.transverse_rate);
        let v1 = los1.relative_speed();
        let v2 = los2.relative_speed();
        if !(v1 >= config.min_los_rate && v2 >= config.min_los_rate) {
            return Err(GuidanceError::DegenerateGeometry(
                GeometryFault::StationaryLineOfSight,
            ));
        }

        let a1 = r1 * vt1 / v1;
        let a2 = r2 * vt2 / v2;
        let (arm_sum, arm_sum_clamped) = clamp_away_from_zero(a1 + a2, config.tau_floor);
        let time_gap = r1 * vr1 / (v1 * v1) - r2 * vr2 / (v2 * v2);
        let tau = (time_gap / arm_sum).powi(2);
        let (v1s, v2s) = (v1 * v1, v2 * v2);
        let root = 1.0 + tau * (v1s + v2s) + tau * tau * v1s * v2s;

        Ok(Self {
            r1,
            r2,
            vr1,
            vr2,
            vt1,
            vt2,
            v1,
            v2,
            a1,
            a2,
            arm_sum,
            arm_sum_clamped,
            time_gap,
            tau,
            root,
        })
    }

    /// `y1` and `y2` for a desired semi-major axis `shape`.
    pub fn objectives(&self, shape: f64, config: &GuidanceConfig) -> Objectives {
        let (a1, a2, tau) = (self.a1, self.a2, self.tau);
        let (v1s, v2s) = (self.v1 * self.v1, self.v2 * self.v2);
        let y1 = a1 * a1 * (1.0 + tau * v1s) + a2 * a2 * (1.0 + tau * v2s)
            + 2.0 * a1 * a2 * self.root.sqrt()
            - 4.0 * shape * shape;
        Objectives {
            y1: saturate(y1, config.objective_bound),
            y2: self.vt1 * self.vt1 + self.vr1 * self.vr1,
        }
    }

    /// Chain rule through `V_i`, `A_i` and `tau`.
    pub fn gradients(&self) -> ObjectiveGradients {
        let Self {
            r1,
            r2,
            vr1,
            vr2,
            vt1,
            vt2,
            v1,
            v2,
            a1,
            a2,
            arm_sum: s,
            time_gap: c,
            tau,
            root,
            ..
        } = *self;
        let sqrt_root = root.sqrt();
        let (v1s, v2s) = (v1 * v1, v2 * v2);

        // --- dy1 w.r.t. the intermediates ---
        let dy1_da1 = 2.0 * a1 * (1.0 + tau * v1s) + 2.0 * a2 * sqrt_root;
        let dy1_da2 = 2.0 * a2 * (1.0 + tau * v2s) + 2.0 * a1 * sqrt_root;
        let dy1_dtau = a1 * a1 * v1s
            + a2 * a2 * v2s
            + a1 * a2 * (v1s + v2s + 2.0 * tau * v1s * v2s) / sqrt_root;
        let dy1_dv1 =
            2.0 * a1 * a1 * tau * v1 + a1 * a2 * (2.0 * tau * v1 + 2.0 * tau * tau * v1 * v2s) / sqrt_root;
        let dy1_dv2 =
            2.0 * a2 * a2 * tau * v2 + a1 * a2 * (2.0 * tau * v2 + 2.0 * tau * tau * v1s * v2) / sqrt_root;

        // --- intermediates w.r.t. the LOS rates ---
        let dv1_dvr1 = vr1 / v1;
        let dv1_dvt1 = vt1 / v1;
        let dv2_dvr2 = vr2 / v2;
        let dv2_dvt2 = vt2 / v2;
        let da1_dvr1 = -r1 * vr1 * vt1 / v1.powi(3);
        let da2_dvr2 = -r2 * vr2 * vt2 / v2.powi(3);
        let da1_dvt1 = r1 / v1 - r1 * vt1 * vt1 / v1.powi(3);
        let da2_dvt2 = r2 / v2 - r2 * vt2 * vt2 / v2.powi(3);

        // --- tau ---
        let s2 = s * s;
        let dtau_dv1 = -4.0 * r1 * vr1 * c / (s2 * v1.powi(3));
        let dtau_dv2 = 4.0 * r2 * vr2 * c / (s2 * v2.powi(3));
        // A1 and A2 enter tau only through their sum.
        let dtau_da = -2.0 * c * c / (s2 * s);
        let dtau_dvr1_direct = 2.0 * r1 * c / (s2 * v1s);
        let dtau_dvr2_direct = -2.0 * r2 * c / (s2 * v2s);

        let dtau_dvr1 = dtau_dv1 * dv1_dvr1 + dtau_da * da1_dvr1 + dtau_dvr1_direct;
        let dtau_dvr2 = dtau_dv2 * dv2_dvr2 + dtau_da * da2_dvr2 + dtau_dvr2_direct;
        let dtau_dvt1 = dtau_dv1 * dv1_dvt1 + dtau_da * da1_dvt1;
        let dtau_dvt2 = dtau_dv2 * dv2_dvt2 + dtau_da * da2_dvt2;

        ObjectiveGradients {
            dy1_dvr1: dy1_da1 * da1_dvr1 + dy1_dtau * dtau_dvr1 + dy1_dv1 * dv1_dvr1,
            dy1_dvt1: dy1_da1 * da1_dvt1 + dy1_dtau * dtau_dvt1 + dy1_dv1 * dv1_dvt1,
            dy1_dvr2: dy1_da2 * da2_dvr2 + dy1_dtau * dtau_dvr2 + dy1_dv2 * dv2_dvr2,
            dy1_dvt2: dy1_da2 * da2_dvt2 + dy1_dtau * dtau_dvt2 + dy1_dv2 * dv2_dvt2,
            dy2_dvr1: 2.0 * vr1,
            dy2_dvt1: 2.0 * vt1,
        }
    }
}
