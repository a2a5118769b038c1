// vbot_sim/src/prelude.rs

// Re-export the entire vbot_core prelude so binaries and examples can reach
// the pure types directly.
pub use vbot_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::cli::Cli;
pub use crate::simulation::config::{load_scenario, scenario_from_str, ScenarioConfig};
pub use crate::simulation::core::error::SimError;
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::core::queue::TickQueue;
pub use crate::simulation::runner::{Experiment, RunSummary};
pub use crate::simulation::tracker::SyntheticTracker;
pub use crate::simulation::world::SimulationWorld;
