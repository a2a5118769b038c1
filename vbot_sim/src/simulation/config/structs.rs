// vbot_sim/src/simulation/config/structs.rs

use serde::{Deserialize, Serialize};
use vbot_core::pipeline::PipelineConfig;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub world: World,

    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
    /// Control rate in Hz; one pipeline tick per period.
    pub rate: f64,
    /// Tracker frame rate in Hz. Above `rate`, several frames queue up per tick.
    pub tracker_rate: f64,
    /// Capacity of the tracker -> controller queue.
    pub queue_capacity: usize,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 30.0,
            rate: 10.0,
            tracker_rate: 10.0,
            queue_capacity: 4,
        }
    }
}

impl Simulation {
    pub fn dt(&self) -> f64 {
        1.0 / self.rate
    }

    pub fn tick_count(&self) -> usize {
        (self.duration_seconds * self.rate).round().max(0.0) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct World {
    pub ego_position: [f64; 2],
    pub ego_velocity: [f64; 2],
    /// Ego speed is clamped to this after every integration step.
    pub max_speed: f64,
    /// Initial camera altitude above the ground plane, metres.
    pub camera_altitude: f64,
    pub min_altitude: f64,
    pub targets: Vec<TargetConfig>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            ego_position: [-60.0, -20.0],
            ego_velocity: [6.0, 0.0],
            max_speed: 20.0,
            camera_altitude: 50.0,
            min_altitude: 1.0,
            targets: vec![
                TargetConfig {
                    position: [0.0, 0.0],
                    velocity: [2.0, 0.5],
                    half_extent: [1.0, 1.0],
                },
                TargetConfig {
                    position: [8.0, 3.0],
                    velocity: [2.0, 0.5],
                    half_extent: [1.0, 1.0],
                },
            ],
        }
    }
}

/// A constant-velocity box on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    #[serde(default = "default_half_extent")]
    pub half_extent: [f64; 2],
}

fn default_half_extent() -> [f64; 2] {
    [1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrackerConfig {
    /// Standard deviation of the noise added to every box corner, metres.
    pub corner_noise_stddev: f64,
    /// Per-target, per-tick probability of losing the box.
    pub occlusion_probability: f64,
    pub camera: CameraConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            corner_noise_stddev: 0.05,
            occlusion_probability: 0.02,
            camera: CameraConfig::default(),
        }
    }
}

/// Downward-looking pinhole camera carried by the ego.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CameraConfig {
    /// `[width, height]` in pixels.
    pub frame_size: [f64; 2],
    pub focal_length: f64,
    pub pixel_size: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_size: [640.0, 512.0],
            focal_length: 0.0036,
            pixel_size: 1.12e-5,
        }
    }
}

impl CameraConfig {
    /// Pixels per metre on the ground at `altitude`.
    pub fn pixels_per_meter(&self, altitude: f64) -> f64 {
        self.focal_length / (altitude * self.pixel_size)
    }
}
