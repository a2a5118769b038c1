// vbot_core/src/guidance/laws/collision_cone.rs

use crate::error::{GeometryFault, GuidanceError};
use crate::guidance::los::LineOfSight;
use crate::guidance::objective::Objectives;
use crate::guidance::{GuidanceConfig, GuidanceLaw, LawOutput};
use crate::types::{EgoKinematics, PlanarKinematics};
use crate::utils::{clamp_away_from_zero, saturate, sign};

/// Single-target collision-cone law.
///
/// `y1 = r^2 Vtheta^2 / V^2 - R^2` is the predicted miss distance squared minus
/// the radius `R` (the shape parameter). The law drives `y1` towards the bias
/// `w` while damping the closing speed.
#[derive(Debug, Clone, Default)]
pub struct CollisionConeLaw;

impl GuidanceLaw for CollisionConeLaw {
    fn name(&self) -> &'static str {
        "collision_cone"
    }

    fn required_targets(&self) -> usize {
        1
    }

    fn evaluate(
        &self,
        ego: &EgoKinematics,
        targets: &[PlanarKinematics],
        radius: f64,
        config: &GuidanceConfig,
    ) -> Result<LawOutput, GuidanceError> {
        let target = targets.first().ok_or(GuidanceError::MissingTargets {
            expected: 1,
            found: 0,
        })?;
        let los = LineOfSight::between(ego, target, config.min_range)?;
        let (r, vr, vt) = (los.range, los.radial_rate, los.transverse_rate);
        let v_sq = vr * vr + vt * vt;
        if !(v_sq.sqrt() >= config.min_los_rate) {
            return Err(GuidanceError::DegenerateGeometry(
                GeometryFault::StationaryLineOfSight,
            ));
        }

        let y1 = saturate(r * r * vt * vt / v_sq - radius * radius, config.objective_bound);
        let k1 = config.k1 * sign(-vr);
        let k2 = config.k2;
        let w = config.w;

        let (s, c) = (ego.heading() - los.angle).sin_cos();
        let denominator = 2.0
            * vr
            * vt
            * r
            * r
            * (vr * vr * c * c - vt * vt * c * c + vr * vr * s * s + vt * vt * s * s
                + 2.0 * vr * vt * s * c);
        let (denom, denominator_clamped) =
            clamp_away_from_zero(denominator, config.denominator_floor);

        // Shared factor of the K1 terms.
        let bias = w - y1;
        let (vr2, vt2, vr3, vt3) = (vr * vr, vt * vt, vr.powi(3), vt.powi(3));

        let lateral = -(v_sq
            * (k1 * bias * (vr3 * c + vt3 * s + vr * vt2 * c + vr2 * vt * s)
                + 2.0 * k2 * r * (vr * vt2 * c + vr2 * vt * s)))
            / denom;
        let longitudinal = (v_sq
            * (k1 * bias * (vt3 * c - vr3 * s + vr2 * vt * c - vr * vt2 * s)
                + 2.0 * k2 * r * (vr2 * vt * c + vr * vt2 * s)))
            / denom;

        Ok(LawOutput {
            lateral,
            longitudinal,
            objectives: Objectives { y1, y2: v_sq },
            denominator,
            denominator_clamped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec2;
    use approx::assert_abs_diff_eq;

    fn run(target: (f64, f64, f64, f64), ego: (f64, f64, f64, f64)) -> LawOutput {
        let t = PlanarKinematics::constant_velocity(
            Vec2::new(target.0, target.1),
            Vec2::new(target.2, target.3),
        );
        let e = EgoKinematics::new(Vec2::new(ego.0, ego.1), Vec2::new(ego.2, ego.3));
        CollisionConeLaw
            .evaluate(&e, &[t], 10.0, &GuidanceConfig::default())
            .unwrap()
    }

    #[test]
    fn test_crossing_target() {
        let out = run((100.0, 20.0, -10.0, 0.0), (0.0, 0.0, 5.0, 0.0));
        assert_abs_diff_eq!(out.objectives.y1, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.denominator, -202_500_000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.lateral, 0.5570303037940918, epsilon = 1e-9);
        assert_abs_diff_eq!(out.longitudinal, -0.014708710135363732, epsilon = 1e-9);

        let mirrored = run((100.0, -20.0, -10.0, 0.0), (0.0, 0.0, 5.0, 0.0));
        assert_abs_diff_eq!(mirrored.lateral, -out.lateral, epsilon = 1e-9);
        assert_abs_diff_eq!(mirrored.longitudinal, out.longitudinal, epsilon = 1e-9);
    }

    #[test]
    fn test_stationary_ego_receding_target() {
        let ego = (0.0, 0.0, 0.0, 0.0);
        let left = run((100.0, 0.0, 10.0, 0.5), ego);
        let right = run((100.0, 0.0, 10.0, -0.5), ego);
        assert_abs_diff_eq!(left.lateral, 0.37712969611528824, epsilon = 1e-9);
        assert_abs_diff_eq!(right.lateral, -left.lateral, epsilon = 1e-12);

        // Lateral demand grows as the transverse rate vanishes.
        let slow = run((100.0, 0.0, 10.0, 0.1), ego);
        let slower = run((100.0, 0.0, 10.0, 1e-3), ego);
        assert!(slow.lateral > left.lateral);
        assert!(slower.lateral > slow.lateral);
        assert_abs_diff_eq!(slower.lateral, 249.7497564924951, epsilon = 1e-6);

        // Pure recession: zero denominator, clamped and saturated.
        let straight = run((100.0, 0.0, 10.0, 0.0), ego);
        assert!(straight.denominator_clamped);
        assert_eq!(straight.denominator, 0.0);
        assert!(straight.lateral.is_finite());
        let bound = GuidanceConfig::default().lateral_bound;
        assert_eq!(saturate(straight.lateral, bound), bound);
    }

    #[test]
    fn test_head_on_is_clamped_not_nan() {
        let out = run((60.0, 80.0, 0.0, 0.0), (0.0, 0.0, 3.0, 4.0));
        assert!(out.denominator_clamped);
        assert!(out.lateral.is_finite());
        assert_eq!(saturate(out.lateral, 10.0), 10.0);
        assert_abs_diff_eq!(out.longitudinal, 0.0, epsilon = 1e-9);
    }
}
