// vbot_sim/examples/01_full_pipeline.rs

//! An end-to-end run of the tracking and guidance pipeline.
//!
//! This example demonstrates how to:
//! 1. Load a scenario from a TOML file.
//! 2. Drive a `TrackingPipeline` tick by tick against the synthetic world.
//! 3. Print what the pipeline saw and commanded.
//!
//! To run this example:
//! `cargo run -p vbot_sim --example 01_full_pipeline`

use std::path::Path;

use vbot_sim::prelude::*;

fn main() -> Result<(), SimError> {
    vbot_sim::init_logging("info,vbot_core=warn");

    // --- 1. Load Scenario Configuration ---
    let config = load_scenario(Path::new("assets/scenarios/default.toml"))?;
    let dt = config.simulation.dt();

    // --- 2. Build the pieces by hand instead of using `Experiment` ---
    let mut rng = SimulationRng::from_seed_option(config.simulation.seed);
    let mut world = SimulationWorld::new(&config.world);
    let tracker = SyntheticTracker::new(config.tracker.clone())?;
    let mut pipeline = TrackingPipeline::new(config.pipeline.clone())?;

    // --- 3. Closed loop ---
    for tick in 0..config.simulation.tick_count() {
        let observation = tracker.observe(&world, &mut rng);
        let report = pipeline.tick(&observation, &world.ego, dt)?;

        if tick % 20 == 0 {
            if let Some(e) = report.ellipse {
                println!(
                    "t={:5.1}s  ellipse c=({:7.2},{:7.2}) a={:5.2} b={:5.2}  cmd=({:6.2},{:6.2}){}",
                    world.time,
                    e.center.x,
                    e.center.y,
                    e.major_axis_len,
                    e.minor_axis_len,
                    report.command.world.x,
                    report.command.world.y,
                    if report.held { " held" } else { "" },
                );
            }
        }
        world.step(&report.command, dt);
    }

    if let Some(range) = world.range_to_group() {
        println!("final range to group: {:.2} m", range);
    }
    Ok(())
}
