// vbot_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::simulation::config::ScenarioConfig;

/// vbot: closed-loop tracking and pursuit experiments.
///
/// This struct defines the command-line arguments accepted by the
/// experiment runner.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/default.toml")]
    pub scenario: PathBuf,

    /// Run every `.toml` scenario found below this directory instead.
    #[arg(long)]
    pub scenario_dir: Option<PathBuf>,

    /// Override the scenario's PRNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the scenario duration, seconds.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info,vbot_core=warn")]
    pub log_level: String,

    /// Print each run summary as TOML on stdout.
    #[arg(long, default_value_t = false)]
    pub summary: bool,
}

impl Cli {
    /// Applies the command-line overrides to a loaded scenario.
    pub fn apply_overrides(&self, config: &mut ScenarioConfig) {
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if let Some(duration) = self.duration {
            config.simulation.duration_seconds = duration;
        }
    }
}
