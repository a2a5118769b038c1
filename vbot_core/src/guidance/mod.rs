// vbot_core/src/guidance/mod.rs

pub mod controller;
pub mod laws;
pub mod los;
pub mod objective;
pub mod vertical;

pub use controller::GuidanceController;
pub use vertical::{VerticalConfig, VerticalController, VerticalMode};

use crate::error::GuidanceError;
use crate::guidance::objective::Objectives;
use crate::types::{EgoKinematics, PlanarKinematics, Vec2};
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// --- GUIDANCE LAW TRAIT ---
// Maps the ego and the tracked targets to a lateral/longitudinal command.
pub trait GuidanceLaw: DynClone + Debug + Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Minimum number of targets `evaluate` needs.
    fn required_targets(&self) -> usize;

    /// Computes the unsaturated command in the ego velocity frame.
    ///
    /// # Arguments
    /// * `ego`: Known ego kinematics.
    /// * `targets`: Filtered target kinematics, primary target first.
    /// * `shape`: Desired shape parameter (semi-major axis or safety radius).
    /// * `config`: Gains, floors and bounds.
    fn evaluate(
        &self,
        ego: &EgoKinematics,
        targets: &[PlanarKinematics],
        shape: f64,
        config: &GuidanceConfig,
    ) -> Result<LawOutput, GuidanceError>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn GuidanceLaw>`.
dyn_clone::clone_trait_object!(GuidanceLaw);

/// Raw result of a guidance law, before saturation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LawOutput {
    pub lateral: f64,
    pub longitudinal: f64,
    pub objectives: Objectives,
    /// The solve denominator before the floor was applied.
    pub denominator: f64,
    pub denominator_clamped: bool,
}

/// Which law the controller runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LawConfig {
    #[default]
    FocalPair,
    CollisionCone,
}

impl LawConfig {
    pub fn build(&self) -> Box<dyn GuidanceLaw> {
        match self {
            LawConfig::FocalPair => Box::new(laws::FocalPairLaw),
            LawConfig::CollisionCone => Box::new(laws::CollisionConeLaw),
        }
    }
}

/// Gains, saturation bounds and numerical floors of the guidance controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GuidanceConfig {
    pub k1: f64,
    pub k2: f64,
    /// Bias the `y1` objective is driven to.
    pub w: f64,
    pub lateral_bound: f64,
    pub longitudinal_bound: f64,
    pub vertical_bound: f64,
    /// Saturation applied to `y1` before it enters the command.
    pub objective_bound: f64,
    /// Smallest magnitude allowed for `A1 + A2` inside `tau`.
    pub tau_floor: f64,
    /// Smallest magnitude allowed for the solve denominator.
    pub denominator_floor: f64,
    pub min_range: f64,
    pub min_los_rate: f64,
    pub law: LawConfig,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            k1: 0.5,
            k2: 0.1,
            w: -0.1,
            lateral_bound: 10.0,
            longitudinal_bound: 10.0,
            vertical_bound: 10.0,
            objective_bound: 1e5,
            tau_floor: 1e-6,
            denominator_floor: 1e-9,
            min_range: 1e-6,
            min_los_rate: 1e-9,
            law: LawConfig::FocalPair,
        }
    }
}

/// Saturated acceleration command for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccelerationCommand {
    /// Perpendicular to the ego velocity, positive to the left.
    pub lateral: f64,
    /// Along the ego velocity.
    pub longitudinal: f64,
    /// `(ax, ay)` in the world frame.
    pub world: Vec2,
    /// Camera vertical acceleration, when the altitude path is enabled.
    pub vertical: Option<f64>,
}

impl AccelerationCommand {
    /// Rotates a lateral/longitudinal pair into the world frame for an ego heading `alpha`.
    pub fn from_body(lateral: f64, longitudinal: f64, alpha: f64) -> Self {
        let lat_dir = alpha + std::f64::consts::FRAC_PI_2;
        let world = Vec2::new(
            lateral * lat_dir.cos() + longitudinal * alpha.cos(),
            lateral * lat_dir.sin() + longitudinal * alpha.sin(),
        );
        Self {
            lateral,
            longitudinal,
            world,
            vertical: None,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn body_to_world_rotation() {
        let cmd = AccelerationCommand::from_body(1.0, 2.0, std::f64::consts::FRAC_PI_2);
        // Heading +y: longitudinal along +y, lateral along -x.
        assert_abs_diff_eq!(cmd.world.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cmd.world.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn law_config_builds_named_law() {
        assert_eq!(LawConfig::FocalPair.build().name(), "focal_pair");
        let boxed = LawConfig::CollisionCone.build();
        let cloned = boxed.clone();
        assert_eq!(cloned.required_targets(), 1);
    }
}
