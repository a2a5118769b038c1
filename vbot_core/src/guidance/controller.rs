// vbot_core/src/guidance/controller.rs

use crate::error::GuidanceError;
use crate::estimation::VerticalEstimate;
use crate::guidance::vertical::{VerticalConfig, VerticalController};
use crate::guidance::{AccelerationCommand, GuidanceConfig, GuidanceLaw, LawOutput};
use crate::types::{EgoKinematics, PlanarKinematics};
use crate::utils::saturate;
use tracing::debug;

/// Turns filtered target kinematics into a saturated acceleration command.
#[derive(Debug, Clone)]
pub struct GuidanceController {
    config: GuidanceConfig,
    law: Box<dyn GuidanceLaw>,
    vertical: Option<VerticalController>,
    last_output: Option<LawOutput>,
}

impl GuidanceController {
    /// Creates a controller running the law named in `config`.
    pub fn new(config: GuidanceConfig, vertical: Option<VerticalConfig>) -> Self {
        let law = config.law.build();
        Self::with_law(config, law, vertical)
    }

    /// Creates a controller around a caller-supplied law.
    pub fn with_law(
        config: GuidanceConfig,
        law: Box<dyn GuidanceLaw>,
        vertical: Option<VerticalConfig>,
    ) -> Self {
        Self {
            config,
            law,
            vertical: vertical.map(VerticalController::new),
            last_output: None,
        }
    }

    /// Evaluates the planar law and maps the result into the world frame.
    ///
    /// The returned command has no vertical component; see [`Self::update_vertical`].
    ///
    /// # Arguments
    /// * `targets`: Filtered target kinematics, primary target first.
    /// * `ego`: Known ego kinematics; its heading defines the body frame.
    /// * `shape_param`: Desired shape (semi-major axis or safety radius).
    ///
    /// # Errors
    /// `MissingTargets` or `DegenerateGeometry` from the law; nothing is
    /// updated in that case.
    pub fn compute_acceleration(
        &mut self,
        targets: &[PlanarKinematics],
        ego: &EgoKinematics,
        shape_param: f64,
    ) -> Result<AccelerationCommand, GuidanceError> {
        let needed = self.law.required_targets();
        if targets.len() < needed {
            return Err(GuidanceError::MissingTargets {
                expected: needed,
                found: targets.len(),
            });
        }

        let out = self.law.evaluate(ego, targets, shape_param, &self.config)?;
        let lateral = saturate(out.lateral, self.config.lateral_bound);
        let longitudinal = saturate(out.longitudinal, self.config.longitudinal_bound);
        let command = AccelerationCommand::from_body(lateral, longitudinal, ego.heading());

        debug!(
            law = self.law.name(),
            y1 = out.objectives.y1,
            y2 = out.objectives.y2,
            a_lat = out.lateral,
            a_long = out.longitudinal,
            clamped = out.denominator_clamped,
            "guidance evaluated"
        );
        self.last_output = Some(out);
        Ok(command)
    }

    /// Runs the altitude path for one tick and returns the saturated `az`.
    ///
    /// Independent of the planar law, so it keeps regulating while the
    /// planar command is held. `None` without a vertical controller or estimate.
    pub fn update_vertical(
        &mut self,
        estimate: Option<&VerticalEstimate>,
        dt: f64,
    ) -> Option<f64> {
        let (ctl, est) = (self.vertical.as_mut()?, estimate?);
        let az = saturate(ctl.update(est, dt), self.config.vertical_bound);
        debug!(az, mode = ?ctl.mode(), "vertical evaluated");
        Some(az)
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    pub fn law_name(&self) -> &'static str {
        self.law.name()
    }

    pub fn required_targets(&self) -> usize {
        self.law.required_targets()
    }

    /// Raw law output of the last successful evaluation.
    pub fn last_output(&self) -> Option<&LawOutput> {
        self.last_output.as_ref()
    }

    pub fn vertical(&self) -> Option<&VerticalController> {
        self.vertical.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::LawConfig;
    use crate::types::{KinematicEstimate, Vec2};
    use approx::assert_abs_diff_eq;

    fn target(x: f64, y: f64, vx: f64, vy: f64) -> PlanarKinematics {
        PlanarKinematics::constant_velocity(Vec2::new(x, y), Vec2::new(vx, vy))
    }

    #[test]
    fn test_world_command_for_stationary_ego() {
        let mut ctl = GuidanceController::new(GuidanceConfig::default(), None);
        let ego = EgoKinematics::new(Vec2::zeros(), Vec2::zeros());
        let cmd = ctl
            .compute_acceleration(
                &[target(100.0, 0.0, 10.0, 0.0), target(100.0, 5.0, 10.0, 0.0)],
                &ego,
                2.0,
            )
            .unwrap();
        assert_abs_diff_eq!(cmd.lateral, 0.02275, epsilon = 1e-9);
        assert_abs_diff_eq!(cmd.longitudinal, 0.5, epsilon = 1e-9);
        // Heading 0: longitudinal along x, lateral along y.
        assert_abs_diff_eq!(cmd.world.x, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(cmd.world.y, 0.02275, epsilon = 1e-9);
        assert!(cmd.vertical.is_none());
    }

    #[test]
    fn test_command_is_saturated() {
        let mut ctl = GuidanceController::new(GuidanceConfig::default(), None);
        let ego = EgoKinematics::new(Vec2::zeros(), Vec2::zeros());
        let (s, c) = 89.0_f64.to_radians().sin_cos();
        let cmd = ctl
            .compute_acceleration(
                &[
                    target(100.0, 0.0, 10.0 * c, 10.0 * s),
                    target(100.0, 5.0, 10.0 * c, 10.0 * s),
                ],
                &ego,
                2.0,
            )
            .unwrap();
        assert_eq!(cmd.longitudinal, 10.0);
        assert!(ctl.last_output().unwrap().longitudinal > 10.0);
    }

    #[test]
    fn test_missing_targets() {
        let mut ctl = GuidanceController::new(GuidanceConfig::default(), None);
        let ego = EgoKinematics::default();
        assert_eq!(
            ctl.compute_acceleration(&[target(1.0, 1.0, 0.0, 1.0)], &ego, 2.0),
            Err(GuidanceError::MissingTargets {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_vertical_path_is_bounded() {
        let config = GuidanceConfig {
            law: LawConfig::CollisionCone,
            ..Default::default()
        };
        let mut ctl = GuidanceController::new(config, Some(VerticalConfig::default()));
        let ego = EgoKinematics::new(Vec2::zeros(), Vec2::new(5.0, 0.0));
        let big = KinematicEstimate {
            position: 1000.0,
            velocity: 0.0,
            acceleration: 0.0,
            ready: true,
        };
        let est = VerticalEstimate {
            size: big,
            offset: big,
            altitude: big,
        };
        let cmd = ctl
            .compute_acceleration(&[target(100.0, 20.0, -10.0, 0.0)], &ego, 10.0)
            .unwrap();
        assert!(cmd.vertical.is_none());
        assert_abs_diff_eq!(cmd.lateral, 0.5570303037940918, epsilon = 1e-9);

        let az = ctl.update_vertical(Some(&est), 0.1).unwrap();
        assert!(az.abs() <= 10.0);
        assert!(ctl.update_vertical(None, 0.1).is_none());
    }

    #[test]
    fn test_vertical_runs_when_planar_law_fails() {
        let mut ctl =
            GuidanceController::new(GuidanceConfig::default(), Some(VerticalConfig::default()));
        let ego = EgoKinematics::default();
        assert!(ctl.compute_acceleration(&[], &ego, 2.0).is_err());

        let level = KinematicEstimate {
            position: 50.0,
            velocity: 0.0,
            acceleration: 0.0,
            ready: true,
        };
        let est = VerticalEstimate {
            size: level,
            offset: level,
            altitude: level,
        };
        assert!(ctl.update_vertical(Some(&est), 0.1).is_some());
        assert!(ctl.vertical().unwrap().mode().is_some());
    }

    #[test]
    fn test_no_vertical_without_controller() {
        let mut ctl = GuidanceController::new(GuidanceConfig::default(), None);
        let est = VerticalEstimate {
            size: KinematicEstimate::default(),
            offset: KinematicEstimate::default(),
            altitude: KinematicEstimate::default(),
        };
        assert!(ctl.update_vertical(Some(&est), 0.1).is_none());
    }
}
