// vbot_sim/src/simulation/config/mod.rs

//! Loading of scenario files, layered with `VBOT_`-prefixed environment overrides.

pub mod structs;

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;
use walkdir::WalkDir;

use crate::simulation::core::error::SimError;
pub use structs::{CameraConfig, ScenarioConfig, Simulation, TargetConfig, TrackerConfig, World};

/// Environment prefix; nested keys are separated by a double underscore,
/// e.g. `VBOT_SIMULATION__SEED=7`.
pub const ENV_PREFIX: &str = "VBOT_";

/// Loads a scenario file and applies environment overrides on top of it.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    if !path.is_file() {
        return Err(SimError::MissingScenario(path.to_path_buf()));
    }
    info!("Loading scenario from: {}", path.display());
    let config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

/// Parses a scenario from an in-memory TOML document, without environment overrides.
pub fn scenario_from_str(toml: &str) -> Result<ScenarioConfig, SimError> {
    Ok(Figment::new().merge(Toml::string(toml)).extract()?)
}

/// Every `.toml` file below `dir`, sorted by path.
pub fn discover_scenarios(dir: &Path) -> Result<Vec<PathBuf>, SimError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| SimError::Discovery(e.to_string()))?;
        let is_toml = entry.path().extension().is_some_and(|ext| ext == "toml");
        if entry.file_type().is_file() && is_toml {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}
