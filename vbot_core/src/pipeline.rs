// vbot_core/src/pipeline.rs

//! Per-tick orchestration: point set -> ellipse -> filtered foci -> command.

use crate::error::{EstimationError, FitError, GuidanceError, PipelineError};
use crate::estimation::{
    ChannelConfig, FocalPairEstimate, FocalPointEstimator, VerticalEstimate, VerticalEstimator,
};
use crate::geometry::ellipse::{Ellipse, EllipseFitter, FitterConfig};
use crate::guidance::{AccelerationCommand, GuidanceConfig, GuidanceController, VerticalConfig};
use crate::messages::TickObservation;
use crate::types::{EgoKinematics, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to emit when the guidance law cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldPolicy {
    #[default]
    HoldLast,
    Zero,
}

/// Where the shape parameter handed to the law comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeParam {
    /// The filtered semi-major axis.
    #[default]
    Tracked,
    Fixed { value: f64 },
}

/// Origin of the ellipse reported for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EllipseSource {
    Fresh,
    /// The fit did not converge; the previous ellipse is reported.
    Stale,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    pub fitter: FitterConfig,
    pub estimator: ChannelConfig,
    pub guidance: GuidanceConfig,
    /// Enables the altitude path when present.
    pub vertical: Option<VerticalConfig>,
    pub hold_policy: HoldPolicy,
    pub shape: ShapeParam,
    /// Seed velocity of the focal channels, world frame.
    pub initial_velocity: [f64; 2],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fitter: FitterConfig::default(),
            estimator: ChannelConfig::default(),
            guidance: GuidanceConfig::default(),
            vertical: None,
            hold_policy: HoldPolicy::HoldLast,
            shape: ShapeParam::Tracked,
            initial_velocity: [0.0, 0.0],
        }
    }
}

/// Everything produced during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub ellipse: Option<Ellipse>,
    pub ellipse_source: EllipseSource,
    pub estimate: Option<FocalPairEstimate>,
    pub vertical: Option<VerticalEstimate>,
    pub command: AccelerationCommand,
    /// The command is a fallback, not a fresh evaluation.
    pub held: bool,
    /// Why guidance fell back, if it did.
    pub fault: Option<GuidanceError>,
}

/// Runs the fitter, the estimator banks and the controller once per tick.
#[derive(Debug, Clone)]
pub struct TrackingPipeline {
    fitter: EllipseFitter,
    focal: FocalPointEstimator,
    vertical: Option<VerticalEstimator>,
    controller: GuidanceController,
    hold_policy: HoldPolicy,
    shape: ShapeParam,
    last_ellipse: Option<Ellipse>,
    /// Last freshly evaluated planar command.
    last_command: Option<AccelerationCommand>,
}

impl TrackingPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let [vx, vy] = config.initial_velocity;
        let focal = FocalPointEstimator::new(Vec2::new(vx, vy), &config.estimator)?;
        let vertical = match config.vertical {
            Some(_) => Some(VerticalEstimator::new(&config.estimator)?),
            None => None,
        };
        Ok(Self {
            fitter: EllipseFitter::new(config.fitter),
            focal,
            vertical,
            controller: GuidanceController::new(config.guidance, config.vertical),
            hold_policy: config.hold_policy,
            shape: config.shape,
            last_ellipse: None,
            last_command: None,
        })
    }

    /// Processes one tick.
    ///
    /// # Errors
    /// Only a non-finite or non-positive `dt` aborts the tick. Fit and
    /// guidance failures are absorbed and surface in the report.
    pub fn tick(
        &mut self,
        observation: &TickObservation,
        ego: &EgoKinematics,
        dt: f64,
    ) -> Result<TickReport, PipelineError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(EstimationError::InvalidTimeStep(dt).into());
        }

        // --- 1. Fit ---
        let (ellipse, ellipse_source) = self.fit(observation);
        let fresh = match ellipse_source {
            EllipseSource::Fresh => ellipse.as_ref(),
            EllipseSource::Stale | EllipseSource::None => None,
        };

        // --- 2. Estimate ---
        self.focal.add_ellipse(fresh, dt)?;
        if let Some(v) = self.vertical.as_mut() {
            v.add(observation.vertical.as_ref(), dt)?;
        }
        let estimate = self.focal.estimate();
        let vertical = self.vertical.as_ref().and_then(VerticalEstimator::estimate);

        // --- 3. Guide ---
        // The altitude path does not depend on the planar law.
        let az = self.controller.update_vertical(vertical.as_ref(), dt);
        let (planar, held, fault) = match estimate.filter(|e| e.ready) {
            None => (AccelerationCommand::zero(), false, None),
            Some(est) => {
                let targets = if self.controller.required_targets() == 1 {
                    vec![est.mid]
                } else {
                    est.targets().to_vec()
                };
                let shape = match self.shape {
                    ShapeParam::Tracked => est.major_axis.position,
                    ShapeParam::Fixed { value } => value,
                };
                match self.controller.compute_acceleration(&targets, ego, shape) {
                    Ok(cmd) => {
                        self.last_command = Some(cmd);
                        (cmd, false, None)
                    }
                    Err(e) => {
                        warn!(error = %e, policy = ?self.hold_policy, "guidance skipped, holding planar command");
                        (self.fallback_command(), true, Some(e))
                    }
                }
            }
        };
        let command = AccelerationCommand {
            vertical: az,
            ..planar
        };

        Ok(TickReport {
            ellipse,
            ellipse_source,
            estimate,
            vertical,
            command,
            held,
            fault,
        })
    }

    fn fit(&mut self, observation: &TickObservation) -> (Option<Ellipse>, EllipseSource) {
        let Some(points) = observation.points.as_ref() else {
            debug!("no points this tick");
            return (None, EllipseSource::None);
        };
        match self.fitter.enclose(points.as_slice()) {
            Ok(e) => {
                self.last_ellipse = Some(e);
                (Some(e), EllipseSource::Fresh)
            }
            Err(FitError::DegenerateInput(reason)) => {
                warn!(%reason, points = points.len(), "degenerate point set, no ellipse");
                (None, EllipseSource::None)
            }
            Err(FitError::Convergence { iterations }) => {
                warn!(iterations, "ellipse fit did not converge, reusing previous shape");
                match self.last_ellipse {
                    Some(prev) => (Some(prev), EllipseSource::Stale),
                    None => (None, EllipseSource::None),
                }
            }
        }
    }

    /// Planar fallback; the hold policy never covers `vertical`.
    fn fallback_command(&self) -> AccelerationCommand {
        match self.hold_policy {
            HoldPolicy::HoldLast => self.last_command.unwrap_or_default(),
            HoldPolicy::Zero => AccelerationCommand::zero(),
        }
    }

    pub fn controller(&self) -> &GuidanceController {
        &self.controller
    }

    pub fn last_ellipse(&self) -> Option<&Ellipse> {
        self.last_ellipse.as_ref()
    }
}
