// vbot_core/src/error.rs

use thiserror::Error;

/// Why a point set could not be enclosed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// Fewer than three points were supplied.
    TooFewPoints(usize),
    /// All points lie on a single line (or coincide).
    Collinear,
    /// At least one coordinate is NaN or infinite.
    NonFinite,
}

impl std::fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateReason::TooFewPoints(n) => {
                write!(f, "{} point(s) supplied, at least 3 are required", n)
            }
            DegenerateReason::Collinear => write!(f, "points are collinear"),
            DegenerateReason::NonFinite => write!(f, "point set contains non-finite coordinates"),
        }
    }
}

/// Errors produced by the minimum-enclosing-ellipse fitter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("degenerate input: {0}")]
    DegenerateInput(DegenerateReason),
    #[error("weight iteration did not converge within {iterations} iterations")]
    Convergence { iterations: usize },
}

/// Errors produced by the Kalman filter bank.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("tick duration must be finite and positive, got {0}")]
    InvalidTimeStep(f64),
    #[error("invalid filter parameters: {0}")]
    InvalidParameters(String),
}

/// The geometric situation that made the guidance law undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryFault {
    /// Ego and target are (nearly) co-located.
    CoincidentPosition { range: f64 },
    /// Both LOS rates of a tracked channel vanish, so the relative speed is zero.
    StationaryLineOfSight,
}

impl std::fmt::Display for GeometryFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryFault::CoincidentPosition { range } => {
                write!(f, "ego and target are co-located (range {:.3e})", range)
            }
            GeometryFault::StationaryLineOfSight => {
                write!(f, "closing and transverse rates are both zero")
            }
        }
    }
}

/// Errors produced by the guidance controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuidanceError {
    #[error("degenerate guidance geometry: {0}")]
    DegenerateGeometry(GeometryFault),
    #[error("guidance law needs {expected} target(s), got {found}")]
    MissingTargets { expected: usize, found: usize },
}

/// Errors that abort a whole pipeline tick.
///
/// Everything else (bad point sets, stale fits, degenerate geometry) is
/// recovered inside the pipeline and reported through the tick report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Estimation(#[from] EstimationError),
}
