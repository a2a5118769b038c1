// vbot_core/src/guidance/los.rs

use crate::error::{GeometryFault, GuidanceError};
use crate::types::{EgoKinematics, PlanarKinematics};

/// Line-of-sight geometry between the ego and one tracked point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOfSight {
    /// Range `r`.
    pub range: f64,
    /// LOS angle `theta` w.r.t. the world x axis.
    pub angle: f64,
    /// Relative velocity along the LOS, `Vr`.
    pub radial_rate: f64,
    /// Relative velocity across the LOS, `Vtheta`.
    pub transverse_rate: f64,
    /// Magnitude of the target acceleration.
    pub target_accel: f64,
    /// Direction of the target acceleration, `delta`.
    pub target_accel_dir: f64,
}

impl LineOfSight {
    /// Computes the LOS from `ego` to `target`.
    ///
    /// # Errors
    /// `DegenerateGeometry(CoincidentPosition)` when the range is below `min_range`.
    pub fn between(
        ego: &EgoKinematics,
        target: &PlanarKinematics,
        min_range: f64,
    ) -> Result<Self, GuidanceError> {
        let rel = target.position - ego.position;
        let range = rel.norm();
        if !(range >= min_range) {
            return Err(GuidanceError::DegenerateGeometry(
                GeometryFault::CoincidentPosition { range },
            ));
        }
        let angle = rel.y.atan2(rel.x);

        let (t_speed, t_heading) = (target.speed(), target.heading());
        let (e_speed, e_heading) = (ego.speed(), ego.heading());
        let radial_rate = t_speed * (t_heading - angle).cos() - e_speed * (e_heading - angle).cos();
        let transverse_rate =
            t_speed * (t_heading - angle).sin() - e_speed * (e_heading - angle).sin();

        let acc = target.acceleration;
        Ok(Self {
            range,
            angle,
            radial_rate,
            transverse_rate,
            target_accel: acc.norm(),
            target_accel_dir: acc.y.atan2(acc.x),
        })
    }

    /// Relative speed `V = hypot(Vtheta, Vr)`.
    pub fn relative_speed(&self) -> f64 {
        self.transverse_rate.hypot(self.radial_rate)
    }
}
