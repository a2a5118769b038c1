// vbot_core/src/estimation/focal.rs

use crate::channels::layout::focal_pair_layout;
use crate::channels::{ChannelId, FocalPoint};
use crate::error::EstimationError;
use crate::estimation::{ChannelConfig, StateEstimator};
use crate::geometry::ellipse::Ellipse;
use crate::messages::Measurement;
use crate::types::{KinematicEstimate, PlanarKinematics, Point, Vec2};
use tracing::debug;

/// Filtered kinematics of the two foci, their midpoint and the major axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocalPairEstimate {
    pub first: PlanarKinematics,
    pub second: PlanarKinematics,
    pub mid: PlanarKinematics,
    pub major_axis: KinematicEstimate,
    /// `false` until every channel has run a full filter cycle.
    pub ready: bool,
}

impl FocalPairEstimate {
    pub fn targets(&self) -> [PlanarKinematics; 2] {
        [self.first, self.second]
    }
}

/// Tracks an enclosing ellipse through its foci.
///
/// Foci are associated with the previous estimate before filtering: the
/// fitter labels them by the sign of its eigenvector, which may flip between
/// ticks.
#[derive(Debug, Clone)]
pub struct FocalPointEstimator {
    bank: StateEstimator,
}

impl FocalPointEstimator {
    pub fn new(initial_velocity: Vec2, config: &ChannelConfig) -> Result<Self, EstimationError> {
        Ok(Self {
            bank: StateEstimator::new(focal_pair_layout(initial_velocity), config)?,
        })
    }

    /// Feeds one tick. `None` marks every channel absent.
    pub fn add_ellipse(&mut self, ellipse: Option<&Ellipse>, dt: f64) -> Result<(), EstimationError> {
        let measurements = match ellipse {
            Some(e) => {
                let (fp1, fp2) = self.associate(e.focal_point_1, e.focal_point_2);
                let mid = e.mid_focal_point();
                vec![
                    (ChannelId::FocalX(FocalPoint::First), Measurement::from_value(fp1.x)),
                    (ChannelId::FocalY(FocalPoint::First), Measurement::from_value(fp1.y)),
                    (ChannelId::FocalX(FocalPoint::Second), Measurement::from_value(fp2.x)),
                    (ChannelId::FocalY(FocalPoint::Second), Measurement::from_value(fp2.y)),
                    (ChannelId::FocalX(FocalPoint::Mid), Measurement::from_value(mid.x)),
                    (ChannelId::FocalY(FocalPoint::Mid), Measurement::from_value(mid.y)),
                    (ChannelId::MajorAxis, Measurement::from_value(e.major_axis_len)),
                ]
            }
            None => Vec::new(),
        };
        self.bank.add(&measurements, dt)
    }

    /// Current estimate, once every channel has been seeded.
    pub fn estimate(&self) -> Option<FocalPairEstimate> {
        Some(FocalPairEstimate {
            first: self.planar(FocalPoint::First)?,
            second: self.planar(FocalPoint::Second)?,
            mid: self.planar(FocalPoint::Mid)?,
            major_axis: self.bank.get(ChannelId::MajorAxis)?,
            ready: self.bank.is_ready() && self.bank.is_initialized(),
        })
    }

    pub fn bank(&self) -> &StateEstimator {
        &self.bank
    }

    pub fn reset(&mut self) {
        self.bank.reset();
    }

    fn planar(&self, which: FocalPoint) -> Option<PlanarKinematics> {
        let x = self.bank.get(ChannelId::FocalX(which))?;
        let y = self.bank.get(ChannelId::FocalY(which))?;
        Some(PlanarKinematics::new(
            Vec2::new(x.position, y.position),
            Vec2::new(x.velocity, y.velocity),
            Vec2::new(x.acceleration, y.acceleration),
        ))
    }

    /// Orders the fitted foci so that they match the filtered ones.
    fn associate(&self, a: Point, b: Point) -> (Point, Point) {
        let (Some(first), Some(second)) = (
            self.planar(FocalPoint::First),
            self.planar(FocalPoint::Second),
        ) else {
            return (a, b);
        };
        let kept = (a.coords - first.position).norm() + (b.coords - second.position).norm();
        let swapped = (b.coords - first.position).norm() + (a.coords - second.position).norm();
        if swapped < kept {
            debug!("fitted foci swapped to match the track");
            (b, a)
        } else {
            (a, b)
        }
    }
}
