// vbot_core/src/guidance/laws/focal_pair.rs

use crate::error::GuidanceError;
use crate::guidance::los::LineOfSight;
use crate::guidance::objective::PairTerms;
use crate::guidance::{GuidanceConfig, GuidanceLaw, LawOutput};
use crate::types::{EgoKinematics, PlanarKinematics};
use crate::utils::{clamp_away_from_zero, sign};
use tracing::debug;

/// Two-target law that steers the ego so the foci of the tracked ellipse
/// keep a separation matching the desired shape parameter.
///
/// The commanded lateral and longitudinal accelerations solve the 2x2 system
/// `dy1/dt = -K1 (y1 - w)`, `dy2/dt = -K2 y2` for the ego acceleration, with the
/// target accelerations entering as known disturbances.
#[derive(Debug, Clone, Default)]
pub struct FocalPairLaw;

impl GuidanceLaw for FocalPairLaw {
    fn name(&self) -> &'static str {
        "focal_pair"
    }

    fn required_targets(&self) -> usize {
        2
    }

    fn evaluate(
        &self,
        ego: &EgoKinematics,
        targets: &[PlanarKinematics],
        shape: f64,
        config: &GuidanceConfig,
    ) -> Result<LawOutput, GuidanceError> {
        let [fp1, fp2] = match targets {
            [a, b, ..] => [a, b],
            _ => {
                return Err(GuidanceError::MissingTargets {
                    expected: 2,
                    found: targets.len(),
                })
            }
        };
        let los1 = LineOfSight::between(ego, fp1, config.min_range)?;
        let los2 = LineOfSight::between(ego, fp2, config.min_range)?;

        let terms = PairTerms::new(&los1, &los2, config)?;
        let objectives = terms.objectives(shape, config);
        let g = terms.gradients();
        let (y1, y2) = (objectives.y1, objectives.y2);

        let k1 = config.k1 * sign(-los1.radial_rate);
        let k2 = config.k2;
        let w = config.w;

        // --- Angles ---
        let (th1, th2) = (los1.angle, los2.angle);
        let alpha = ego.heading();
        let (acc1, del1) = (los1.target_accel, los1.target_accel_dir);
        let (acc2, del2) = (los2.target_accel, los2.target_accel_dir);

        let c_f1_t1 = (del1 - th1).cos();
        let s_f1_t1 = (del1 - th1).sin();
        let c_f2_t2 = (del2 - th2).cos();
        let s_f2_t2 = (del2 - th2).sin();
        let c_al_t1 = (alpha - th1).cos();
        let s_al_t1 = (alpha - th1).sin();
        let c_al_t2 = (alpha - th2).cos();
        let s_al_t2 = (alpha - th2).sin();
        let c_t1_t2 = (th1 - th2).cos();
        let s_t1_t2 = (th1 - th2).sin();
        let c_al_f1 = (alpha - del1).cos();
        let c_alf1_t12 = (alpha + del1 - th1 - th2).cos();
        let s_alf1_t12 = (alpha + del1 - th1 - th2).sin();
        let c_alf2_t12 = (alpha + del2 - th1 - th2).cos();
        let s_alf2_t12 = (alpha + del2 - th1 - th2).sin();
        let c_al_f1_t12 = (alpha - del1 + th1 - th2).cos();
        let s_al_f1_t12 = (alpha - del1 + th1 - th2).sin();
        let c_al_f2_t21 = (alpha - del2 - th1 + th2).cos();
        let s_al_f2_t21 = (alpha - del2 - th1 + th2).sin();

        // --- Cross products of the gradients ---
        let det1 = g.dy1_dvt1 * g.dy2_dvr1 - g.dy1_dvr1 * g.dy2_dvt1;
        let vt2_vr1 = g.dy1_dvt2 * g.dy2_dvr1;
        let vr2_vt1 = g.dy1_dvr2 * g.dy2_dvt1;
        let vr2_vr1 = g.dy1_dvr2 * g.dy2_dvr1;
        let vt2_vt1 = g.dy1_dvt2 * g.dy2_dvt1;

        let denominator =
            det1 + (vt2_vr1 - vr2_vt1) * c_t1_t2 - (vr2_vr1 + vt2_vt1) * s_t1_t2;
        let (denom, denominator_clamped) =
            clamp_away_from_zero(denominator, config.denominator_floor);

        // --- Lateral ---
        let y2_drive = k2 * y2 + acc1 * g.dy2_dvr1 * c_f1_t1 + acc1 * g.dy2_dvt1 * s_f1_t1;
        let y1_ego = g.dy1_dvr1 * c_al_t1
            + g.dy1_dvr2 * c_al_t2
            + g.dy1_dvt1 * s_al_t1
            + g.dy1_dvt2 * s_al_t2;
        let y2_ego = g.dy2_dvr1 * c_al_t1 + g.dy2_dvt1 * s_al_t1;
        let y1_drive = -k1 * w
            + k1 * y1
            + acc1 * g.dy1_dvr1 * c_f1_t1
            + acc2 * g.dy1_dvr2 * c_f2_t2
            + acc1 * g.dy1_dvt1 * s_f1_t1
            + acc2 * g.dy1_dvt2 * s_f2_t2;
        let lateral = -(y2_drive * y1_ego - y2_ego * y1_drive) / denom;

        // --- Longitudinal ---
        let gain_terms = 2.0 * acc1 * det1 * c_al_f1
            + 2.0 * (g.dy2_dvt1 * k1 * (w - y1) + g.dy1_dvt1 * k2 * y2) * c_al_t1
            + 2.0 * g.dy1_dvt2 * k2 * y2 * c_al_t2
            - 2.0 * g.dy2_dvr1 * k1 * w * s_al_t1
            + 2.0 * g.dy2_dvr1 * k1 * y1 * s_al_t1
            - 2.0 * g.dy1_dvr1 * k2 * y2 * s_al_t1
            - 2.0 * g.dy1_dvr2 * k2 * y2 * s_al_t2;
        let first_accel_terms = acc1
            * ((vt2_vr1 + vr2_vt1) * c_alf1_t12
                + (vt2_vr1 - vr2_vt1) * c_al_f1_t12
                + (vt2_vt1 - vr2_vr1) * s_alf1_t12
                - (vr2_vr1 + vt2_vt1) * s_al_f1_t12);
        let second_accel_terms = acc2
            * (-(vt2_vr1 + vr2_vt1) * c_alf2_t12
                + (vt2_vr1 - vr2_vt1) * c_al_f2_t21
                + (vr2_vr1 - vt2_vt1) * s_alf2_t12
                + (vr2_vr1 + vt2_vt1) * s_al_f2_t21);
        let longitudinal = 0.5 * (gain_terms + first_accel_terms + second_accel_terms) / denom;

        if denominator_clamped || terms.arm_sum_clamped {
            debug!(
                denominator,
                arm_sum = terms.arm_sum,
                "focal-pair law evaluated near a singular geometry"
            );
        }

        Ok(LawOutput {
            lateral,
            longitudinal,
            objectives,
            denominator,
            denominator_clamped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec2;
    use crate::utils::saturate;
    use approx::assert_abs_diff_eq;

    fn target(x: f64, y: f64, vx: f64, vy: f64) -> PlanarKinematics {
        PlanarKinematics::constant_velocity(Vec2::new(x, y), Vec2::new(vx, vy))
    }

    fn evaluate(fp1: PlanarKinematics, fp2: PlanarKinematics, ego: EgoKinematics) -> LawOutput {
        FocalPairLaw
            .evaluate(&ego, &[fp1, fp2], 2.0, &GuidanceConfig::default())
            .unwrap()
    }

    fn still_ego() -> EgoKinematics {
        EgoKinematics::new(Vec2::zeros(), Vec2::zeros())
    }

    #[test]
    fn test_reference_geometry() {
        let out = evaluate(
            target(100.0, 0.0, 10.0, 0.0),
            target(100.0, 5.0, 10.0, 0.0),
            still_ego(),
        );
        assert_abs_diff_eq!(out.objectives.y1, 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.objectives.y2, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.denominator, -4000.0, epsilon = 1e-6);
        assert!(!out.denominator_clamped);
        assert_abs_diff_eq!(out.lateral, 0.02275, epsilon = 1e-9);
        assert_abs_diff_eq!(out.longitudinal, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_lateral_is_mirror_antisymmetric() {
        for heading_deg in [0.0_f64, 45.0] {
            let (s, c) = heading_deg.to_radians().sin_cos();
            let up = evaluate(
                target(100.0, 0.0, 10.0 * c, 10.0 * s),
                target(100.0, 5.0, 10.0 * c, 10.0 * s),
                still_ego(),
            );
            let down = evaluate(
                target(100.0, 0.0, 10.0 * c, -10.0 * s),
                target(100.0, -5.0, 10.0 * c, -10.0 * s),
                still_ego(),
            );
            assert_abs_diff_eq!(up.lateral, -down.lateral, epsilon = 1e-9);
            assert_abs_diff_eq!(up.longitudinal, down.longitudinal, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_oblique_heading() {
        let (s, c) = 45.0_f64.to_radians().sin_cos();
        let out = evaluate(
            target(100.0, 0.0, 10.0 * c, 10.0 * s),
            target(100.0, 5.0, 10.0 * c, 10.0 * s),
            still_ego(),
        );
        assert_abs_diff_eq!(out.lateral, -1.3266295486883757, epsilon = 1e-6);
        assert_abs_diff_eq!(out.longitudinal, 2.0337363298749236, epsilon = 1e-6);
    }

    #[test]
    fn test_near_transverse_motion_saturates() {
        let (s, c) = 89.0_f64.to_radians().sin_cos();
        let out = evaluate(
            target(100.0, 0.0, 10.0 * c, 10.0 * s),
            target(100.0, 5.0, 10.0 * c, 10.0 * s),
            still_ego(),
        );
        assert_abs_diff_eq!(out.longitudinal, 58.858118678005056, epsilon = 1e-4);
        assert_eq!(saturate(out.longitudinal, 10.0), 10.0);
        assert_abs_diff_eq!(out.lateral, -0.527296119055366, epsilon = 1e-6);
    }

    #[test]
    fn test_collinear_foci_are_finite() {
        let out = evaluate(
            target(100.0, 0.0, 10.0, 0.0),
            target(90.0, 0.0, 10.0, 0.0),
            still_ego(),
        );
        assert_eq!(out.denominator, 0.0);
        assert!(out.denominator_clamped);
        assert!(out.lateral.is_finite() && out.longitudinal.is_finite());
        assert_eq!(saturate(out.lateral, 10.0), 10.0);
        assert_abs_diff_eq!(out.longitudinal, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_requires_two_targets() {
        let err = FocalPairLaw
            .evaluate(
                &still_ego(),
                &[target(1.0, 0.0, 1.0, 0.0)],
                2.0,
                &GuidanceConfig::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            GuidanceError::MissingTargets {
                expected: 2,
                found: 1
            }
        );
    }
}
