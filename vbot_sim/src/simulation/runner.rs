// vbot_sim/src/simulation/runner.rs

//! Closed-loop experiment: world -> tracker -> queue -> pipeline -> world.

use serde::Serialize;
use tracing::{debug, info, warn};
use vbot_core::messages::TickObservation;
use vbot_core::pipeline::{EllipseSource, TrackingPipeline};

use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::error::SimError;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::queue::TickQueue;
use crate::simulation::tracker::SyntheticTracker;
use crate::simulation::world::SimulationWorld;

/// Aggregate statistics of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub law: String,
    pub ticks: usize,
    pub fits: usize,
    pub stale_fits: usize,
    pub skipped_fits: usize,
    pub held_commands: usize,
    pub dropped_observations: usize,
    pub final_range: f64,
    pub min_range: f64,
    /// Largest world-frame command magnitude issued.
    pub max_command: f64,
    pub final_altitude: f64,
}

impl RunSummary {
    pub fn to_toml(&self) -> Result<String, SimError> {
        Ok(toml::to_string(self)?)
    }
}

pub struct Experiment {
    name: String,
    config: ScenarioConfig,
    rng: SimulationRng,
    world: SimulationWorld,
    tracker: SyntheticTracker,
    pipeline: TrackingPipeline,
    queue: TickQueue<TickObservation>,
}

impl Experiment {
    pub fn new(name: impl Into<String>, config: ScenarioConfig) -> Result<Self, SimError> {
        if !(config.simulation.rate.is_finite() && config.simulation.rate > 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "simulation.rate must be positive, got {}",
                config.simulation.rate
            )));
        }
        let tracker_rate = config.simulation.tracker_rate;
        if !(tracker_rate.is_finite() && tracker_rate > 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "simulation.tracker_rate must be positive, got {tracker_rate}"
            )));
        }
        if config.world.targets.is_empty() {
            return Err(SimError::InvalidScenario("world has no targets".into()));
        }
        Ok(Self {
            name: name.into(),
            rng: SimulationRng::from_seed_option(config.simulation.seed),
            world: SimulationWorld::new(&config.world),
            tracker: SyntheticTracker::new(config.tracker.clone())?,
            pipeline: TrackingPipeline::new(config.pipeline.clone())?,
            queue: TickQueue::new(config.simulation.queue_capacity),
            config,
        })
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    /// Runs every tick of the scenario.
    pub fn run(&mut self) -> Result<RunSummary, SimError> {
        let dt = self.config.simulation.dt();
        let ticks = self.config.simulation.tick_count();
        info!(
            scenario = %self.name,
            ticks,
            dt,
            law = self.pipeline.controller().law_name(),
            "starting experiment"
        );

        let initial_range = self.world.range_to_group().unwrap_or(f64::NAN);
        let mut summary = RunSummary {
            scenario: self.name.clone(),
            law: self.pipeline.controller().law_name().to_string(),
            ticks: 0,
            fits: 0,
            stale_fits: 0,
            skipped_fits: 0,
            held_commands: 0,
            dropped_observations: 0,
            final_range: initial_range,
            min_range: initial_range,
            max_command: 0.0,
            final_altitude: self.world.altitude,
        };

        // Tracker frames owed to the queue; fractional when the rates do not divide.
        let frames_per_tick = self.config.simulation.tracker_rate * dt;
        let mut frames_due = 0.0;

        for _ in 0..ticks {
            // Frames produced during this control period see the current world.
            frames_due += frames_per_tick;
            while frames_due >= 1.0 {
                let frame = self.tracker.observe(&self.world, &mut self.rng);
                self.queue.push(frame);
                frames_due -= 1.0;
            }
            // The core always consumes the newest frame; no frame means no detection.
            let observation = self.queue.pop_latest().unwrap_or_else(|| {
                debug!(t = self.world.time, "no tracker frame this tick");
                TickObservation::occluded()
            });

            let report = self.pipeline.tick(&observation, &self.world.ego, dt)?;
            match report.ellipse_source {
                EllipseSource::Fresh => summary.fits += 1,
                EllipseSource::Stale => summary.stale_fits += 1,
                EllipseSource::None => summary.skipped_fits += 1,
            }
            if report.held {
                summary.held_commands += 1;
            }
            summary.max_command = summary.max_command.max(report.command.world.norm());

            self.world.step(&report.command, dt);
            summary.ticks += 1;

            if let Some(range) = self.world.range_to_group() {
                summary.final_range = range;
                summary.min_range = summary.min_range.min(range);
            }
            debug!(
                t = self.world.time,
                x = self.world.ego.position.x,
                y = self.world.ego.position.y,
                ax = report.command.world.x,
                ay = report.command.world.y,
                "tick"
            );
        }

        summary.dropped_observations = self.queue.dropped();
        summary.final_altitude = self.world.altitude;
        if summary.dropped_observations > 0 {
            debug!(
                dropped = summary.dropped_observations,
                "tracker frames never reached the pipeline"
            );
        }
        if summary.held_commands > 0 {
            warn!(
                held = summary.held_commands,
                "guidance fell back to the hold policy"
            );
        }
        info!(
            scenario = %self.name,
            fits = summary.fits,
            final_range = summary.final_range,
            "experiment finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::scenario_from_str;

    fn seeded(seed: u64) -> ScenarioConfig {
        let mut config = ScenarioConfig::default();
        config.simulation.seed = Some(seed);
        config.simulation.duration_seconds = 10.0;
        config
    }

    fn with_tracker(seed: u64, tracker_rate: f64, queue_capacity: usize) -> ScenarioConfig {
        let mut config = seeded(seed);
        config.simulation.tracker_rate = tracker_rate;
        config.simulation.queue_capacity = queue_capacity;
        config
    }

    #[test]
    fn test_default_scenario_runs_to_completion() {
        let summary = Experiment::new("default", seeded(3)).unwrap().run().unwrap();
        assert_eq!(summary.ticks, 100);
        assert_eq!(
            summary.fits + summary.stale_fits + summary.skipped_fits,
            summary.ticks
        );
        assert!(summary.fits > 80);
        // Tracker and control share a rate: every frame is consumed.
        assert_eq!(summary.dropped_observations, 0);
        assert!(summary.final_range.is_finite());
        // Saturation bounds the command in each body axis.
        assert!(summary.max_command <= 10.0 * 2.0_f64.sqrt() + 1e-9);
        assert!(summary.to_toml().unwrap().contains("scenario = \"default\""));
    }

    #[test]
    fn test_same_seed_same_summary() {
        let a = Experiment::new("a", seeded(11)).unwrap().run().unwrap();
        let b = Experiment::new("a", seeded(11)).unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_collision_cone_with_altitude_path() {
        let config = scenario_from_str(
            r#"
            [simulation]
            seed = 5
            duration_seconds = 5.0

            [pipeline.guidance]
            law = { kind = "collision_cone" }

            [pipeline.shape]
            kind = "fixed"
            value = 5.0

            [pipeline.vertical]
            "#,
        )
        .unwrap();
        let summary = Experiment::new("cone", config).unwrap().run().unwrap();
        assert_eq!(summary.law, "collision_cone");
        assert_eq!(summary.ticks, 50);
        assert!(summary.final_altitude >= 1.0);
    }

    #[test]
    fn test_fast_tracker_overflows_queue() {
        // Four frames per control tick into a queue of two.
        let summary = Experiment::new("fast", with_tracker(7, 40.0, 2))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.ticks, 100);
        assert!(summary.dropped_observations > 0);
        // Two evicted on push, one skipped behind the newest, every tick.
        assert_eq!(summary.dropped_observations, 3 * summary.ticks);
        assert!(summary.fits > 80);
    }

    #[test]
    fn test_slow_tracker_leaves_ticks_without_frames() {
        let summary = Experiment::new("slow", with_tracker(7, 5.0, 4))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.ticks, 100);
        assert_eq!(summary.dropped_observations, 0);
        // Every other tick has no frame and no ellipse.
        assert!(summary.skipped_fits >= 50);
    }

    #[test]
    fn test_rejects_non_positive_tracker_rate() {
        assert!(matches!(
            Experiment::new("bad", with_tracker(1, 0.0, 4)),
            Err(SimError::InvalidScenario(_))
        ));
    }

    #[test]
    fn test_rejects_empty_world() {
        let mut config = ScenarioConfig::default();
        config.world.targets.clear();
        assert!(matches!(
            Experiment::new("empty", config),
            Err(SimError::InvalidScenario(_))
        ));
    }
}
