// vbot_core/src/estimation/vertical.rs

use crate::channels::layout::vertical_layout;
use crate::channels::ChannelId;
use crate::error::EstimationError;
use crate::estimation::{ChannelConfig, StateEstimator};
use crate::messages::{Measurement, VerticalObservation};
use crate::types::KinematicEstimate;

/// Filtered bounding-area size, offset and camera altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalEstimate {
    pub size: KinematicEstimate,
    pub offset: KinematicEstimate,
    pub altitude: KinematicEstimate,
}

/// Estimator bank over the `[S, C, Z]` channels.
#[derive(Debug, Clone)]
pub struct VerticalEstimator {
    bank: StateEstimator,
}

impl VerticalEstimator {
    pub fn new(config: &ChannelConfig) -> Result<Self, EstimationError> {
        Ok(Self {
            bank: StateEstimator::new(vertical_layout(), config)?,
        })
    }

    pub fn add(
        &mut self,
        observation: Option<&VerticalObservation>,
        dt: f64,
    ) -> Result<(), EstimationError> {
        let measurements = observation.map_or_else(Vec::new, |o| {
            vec![
                (ChannelId::Size, Measurement::from_value(o.size)),
                (ChannelId::Offset, Measurement::from_value(o.offset)),
                (ChannelId::Altitude, Measurement::from_value(o.altitude)),
            ]
        });
        self.bank.add(&measurements, dt)
    }

    pub fn estimate(&self) -> Option<VerticalEstimate> {
        Some(VerticalEstimate {
            size: self.bank.get(ChannelId::Size)?,
            offset: self.bank.get(ChannelId::Offset)?,
            altitude: self.bank.get(ChannelId::Altitude)?,
        })
    }

    pub fn reset(&mut self) {
        self.bank.reset();
    }
}
