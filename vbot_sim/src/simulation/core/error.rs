// vbot_sim/src/simulation/core/error.rs

use std::path::PathBuf;
use thiserror::Error;
use vbot_core::error::PipelineError;

/// Errors that stop an experiment.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario file not found: {0}")]
    MissingScenario(PathBuf),
    #[error("failed to load scenario: {0}")]
    Config(#[from] figment::Error),
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
    #[error("scenario discovery failed: {0}")]
    Discovery(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to serialize run summary: {0}")]
    Summary(#[from] toml::ser::Error),
}
