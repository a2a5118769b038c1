// vbot_core/src/estimation/mod.rs

pub mod filters;
pub mod focal;
pub mod vertical;

pub use filters::{ChannelConfig, FilterState, ScalarKalmanChannel};
pub use focal::{FocalPairEstimate, FocalPointEstimator};
pub use vertical::{VerticalEstimate, VerticalEstimator};

use crate::channels::ChannelId;
use crate::error::EstimationError;
use crate::messages::Measurement;
use crate::models::SingerModel;
use crate::types::KinematicEstimate;
use tracing::debug;

/// A bank of independent scalar Kalman channels driven by one clock.
///
/// The Singer discretization is computed once per tick and shared by every
/// channel, so all channels always advance by the same `dt`.
#[derive(Debug, Clone)]
pub struct StateEstimator {
    model: SingerModel,
    layout: Vec<ChannelId>,
    channels: Vec<ScalarKalmanChannel>,
}

impl StateEstimator {
    /// Creates a bank from `(channel, initial velocity)` pairs.
    ///
    /// # Errors
    /// `InvalidParameters` if the Singer parameters are out of range or the
    /// layout names a channel twice.
    pub fn new(layout: Vec<(ChannelId, f64)>, config: &ChannelConfig) -> Result<Self, EstimationError> {
        let model = SingerModel::new(config.model)?;
        for (i, (id, _)) in layout.iter().enumerate() {
            if layout[..i].iter().any(|(other, _)| other == id) {
                return Err(EstimationError::InvalidParameters(format!(
                    "channel {id} appears twice in the layout"
                )));
            }
        }
        let channels = layout
            .iter()
            .map(|&(_, v0)| ScalarKalmanChannel::new(v0, config))
            .collect();
        Ok(Self {
            model,
            layout: layout.into_iter().map(|(id, _)| id).collect(),
            channels,
        })
    }

    /// Advances every channel by `dt`.
    ///
    /// Channels that do not appear in `measurements` receive `Absent`.
    /// Entries for channels outside the layout are ignored.
    pub fn add(
        &mut self,
        measurements: &[(ChannelId, Measurement)],
        dt: f64,
    ) -> Result<(), EstimationError> {
        let disc = self.model.discretize(dt)?;
        for (id, channel) in self.layout.iter().zip(self.channels.iter_mut()) {
            let m = measurements
                .iter()
                .find(|(other, _)| other == id)
                .map_or(Measurement::Absent, |&(_, m)| m);
            channel.add(m, &disc);
        }
        debug!(
            dt,
            present = measurements.iter().filter(|(_, m)| m.is_present()).count(),
            channels = self.channels.len(),
            "estimator bank advanced"
        );
        Ok(())
    }

    pub fn get(&self, id: ChannelId) -> Option<KinematicEstimate> {
        self.channel(id)?.get_estimated_state()
    }

    pub fn channel(&self, id: ChannelId) -> Option<&ScalarKalmanChannel> {
        let idx = self.layout.iter().position(|&other| other == id)?;
        self.channels.get(idx)
    }

    /// `true` once at least one channel is running and every running channel
    /// has completed a predict/correct cycle.
    pub fn is_ready(&self) -> bool {
        let mut running = self.channels.iter().filter(|c| c.is_initialized()).peekable();
        running.peek().is_some() && running.all(|c| c.is_ready())
    }

    pub fn is_initialized(&self) -> bool {
        self.channels.iter().all(|c| c.is_initialized())
    }

    pub fn layout(&self) -> &[ChannelId] {
        &self.layout
    }

    pub fn reset(&mut self) {
        self.channels.iter_mut().for_each(ScalarKalmanChannel::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::layout::vertical_layout;
    use crate::channels::FocalPoint;

    fn bank() -> StateEstimator {
        StateEstimator::new(vertical_layout(), &ChannelConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_channels_receive_absent() {
        let mut est = bank();
        est.add(
            &[
                (ChannelId::Size, Measurement::Present(40.0)),
                (ChannelId::Altitude, Measurement::Present(20.0)),
            ],
            0.1,
        )
        .unwrap();
        assert!(est.get(ChannelId::Size).is_some());
        assert!(est.get(ChannelId::Offset).is_none());
        assert!(!est.is_ready());

        est.add(&[(ChannelId::Size, Measurement::Present(40.5))], 0.1)
            .unwrap();
        // Offset never seeded; the other two have now run a full cycle.
        assert!(est.is_ready());
        assert!(!est.is_initialized());
        assert!(est.get(ChannelId::Altitude).unwrap().ready);
    }

    #[test]
    fn test_unknown_channels_are_ignored() {
        let mut est = bank();
        est.add(
            &[(ChannelId::FocalX(FocalPoint::First), Measurement::Present(1.0))],
            0.1,
        )
        .unwrap();
        assert!(!est.is_ready());
        assert!(est.get(ChannelId::FocalX(FocalPoint::First)).is_none());
    }

    #[test]
    fn test_invalid_time_step_is_rejected() {
        let mut est = bank();
        assert_eq!(
            est.add(&[], -0.1),
            Err(EstimationError::InvalidTimeStep(-0.1))
        );
        assert_eq!(
            est.add(&[], f64::INFINITY),
            Err(EstimationError::InvalidTimeStep(f64::INFINITY))
        );
    }

    #[test]
    fn test_duplicate_layout_is_rejected() {
        let layout = vec![(ChannelId::Size, 0.0), (ChannelId::Size, 1.0)];
        assert!(StateEstimator::new(layout, &ChannelConfig::default()).is_err());
    }
}
