// vbot_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::guidance::GuidanceLaw;
pub use crate::messages::{Measurement, TickObservation, VerticalObservation};
pub use crate::types::{EgoKinematics, KinematicEstimate, PlanarKinematics, Point, Vec2};

// --- Errors ---
pub use crate::error::{EstimationError, FitError, GuidanceError, PipelineError};

// --- Geometry ---
pub use crate::geometry::ellipse::{Ellipse, EllipseFitter, FitterConfig};
pub use crate::geometry::{BoundingBox, PointSet};

// --- Estimation ---
pub use crate::channels::{ChannelId, FocalPoint};
pub use crate::estimation::{
    ChannelConfig, FocalPairEstimate, FocalPointEstimator, StateEstimator, VerticalEstimate,
    VerticalEstimator,
};
pub use crate::models::{SingerModel, SingerParams};

// --- Guidance ---
pub use crate::guidance::laws::{CollisionConeLaw, FocalPairLaw};
pub use crate::guidance::{
    AccelerationCommand, GuidanceConfig, GuidanceController, LawConfig, VerticalConfig,
};

// --- Pipeline ---
pub use crate::pipeline::{
    EllipseSource, HoldPolicy, PipelineConfig, ShapeParam, TickReport, TrackingPipeline,
};
