// vbot_sim/src/main.rs

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use vbot_sim::cli::Cli;
use vbot_sim::simulation::config::{discover_scenarios, load_scenario};
use vbot_sim::simulation::core::error::SimError;
use vbot_sim::simulation::runner::Experiment;

fn main() -> ExitCode {
    let cli = Cli::parse();
    vbot_sim::init_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let scenarios = match &cli.scenario_dir {
        Some(dir) => discover_scenarios(dir)?,
        None => vec![cli.scenario.clone()],
    };
    info!("{} scenario(s) to run", scenarios.len());

    for path in &scenarios {
        let mut config = load_scenario(path)?;
        cli.apply_overrides(&mut config);

        let summary = Experiment::new(scenario_name(path), config)?.run()?;
        if cli.summary {
            println!("{}", summary.to_toml()?);
        }
    }
    Ok(())
}

fn scenario_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
