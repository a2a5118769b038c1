// vbot_core/src/guidance/vertical.rs

use crate::estimation::VerticalEstimate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// PID gains of one vertical correction path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Configuration of the altitude path that keeps the tracked group framed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct VerticalConfig {
    pub size: PidGains,
    pub offset: PidGains,
    pub altitude: PidGains,
    /// Desired bounding-box diagonal, pixels.
    pub size_setpoint: f64,
    pub altitude_setpoint: f64,
    /// Altitude errors within this band are ignored.
    pub altitude_deadband: f64,
    /// Image height, pixels.
    pub frame_height: f64,
    /// Offset set-point is `frame_height * (offset_base + Z) / offset_scale`.
    pub offset_base: f64,
    pub offset_scale: f64,
    /// Camera focal length, metres.
    pub focal_length: f64,
    /// Physical size of one pixel on the sensor, metres.
    pub pixel_size: f64,
    /// Below this `S` or `C` the perspective term is dropped.
    pub min_extent: f64,
}

impl Default for VerticalConfig {
    fn default() -> Self {
        Self {
            size: PidGains::new(0.06, 0.5, 0.012),
            offset: PidGains::new(0.06, 3.0, 0.03),
            altitude: PidGains::new(0.1, 0.5, 0.05),
            size_setpoint: 100.0,
            altitude_setpoint: 50.0,
            altitude_deadband: 5.0,
            frame_height: 512.0,
            offset_base: 250.0,
            offset_scale: 2000.0,
            focal_length: 0.0036,
            pixel_size: 1.12e-5,
            min_extent: 1e-6,
        }
    }
}

/// The correction path currently driving the altitude command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalMode {
    Size,
    Offset,
    Altitude,
}

impl VerticalMode {
    const ALL: [VerticalMode; 3] = [VerticalMode::Size, VerticalMode::Offset, VerticalMode::Altitude];

    fn index(self) -> usize {
        match self {
            VerticalMode::Size => 0,
            VerticalMode::Offset => 1,
            VerticalMode::Altitude => 2,
        }
    }
}

/// Per-path corrections of one tick, before selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalCorrections {
    pub size: f64,
    pub offset: f64,
    pub altitude: f64,
}

impl VerticalCorrections {
    fn as_array(&self) -> [f64; 3] {
        [self.size, self.offset, self.altitude]
    }
}

/// S/C/Z altitude regulator with integral reset on mode switches.
#[derive(Debug, Clone)]
pub struct VerticalController {
    config: VerticalConfig,
    integrals: [f64; 3],
    mode: Option<VerticalMode>,
}

impl VerticalController {
    pub fn new(config: VerticalConfig) -> Self {
        Self {
            config,
            integrals: [0.0; 3],
            mode: None,
        }
    }

    /// Computes the unsaturated vertical acceleration for this tick.
    ///
    /// The path with the largest correction magnitude wins. When the winner
    /// changes, the integrals of the two other paths are cleared.
    pub fn update(&mut self, estimate: &VerticalEstimate, dt: f64) -> f64 {
        let cfg = &self.config;
        let (s, s_dot) = (estimate.size.position, estimate.size.velocity);
        let (c, c_dot) = (estimate.offset.position, estimate.offset.velocity);
        let (z, z_dot) = (estimate.altitude.position, estimate.altitude.velocity);

        // --- Errors ---
        let offset_setpoint = cfg.frame_height * (cfg.offset_base + z) / cfg.offset_scale;
        let e_s = cfg.size_setpoint - s;
        let e_c = (offset_setpoint - c).min(0.0);
        let e_z = if (cfg.altitude_setpoint - z).abs() > cfg.altitude_deadband {
            cfg.altitude_setpoint - z
        } else {
            0.0
        };

        for (acc, e) in self.integrals.iter_mut().zip([e_s, e_c, e_z]) {
            *acc += e * dt;
        }
        let [i_s, i_c, i_z] = self.integrals;

        // Metres per pixel at the current altitude.
        let pixel_to_meter = z * cfg.pixel_size / cfg.focal_length;
        let perspective = |extent: f64, rate: f64| {
            if extent.abs() < cfg.min_extent {
                0.0
            } else {
                let f = cfg.focal_length * pixel_to_meter / extent;
                2.0 * f * rate * rate / extent
            }
        };

        let g = &cfg.size;
        let az_s = -g.kp * e_s - g.ki * i_s + g.kd * s_dot + perspective(s, s_dot);
        let g = &cfg.offset;
        let az_c = if e_c == 0.0 {
            0.0
        } else {
            -g.kp * e_c - g.ki * i_c + g.kd * c_dot + perspective(c, c_dot)
        };
        let g = &cfg.altitude;
        let az_z = if e_z == 0.0 {
            0.0
        } else {
            g.kp * e_z + g.ki * i_z - g.kd * z_dot
        };

        let corrections = VerticalCorrections {
            size: az_s,
            offset: az_c,
            altitude: az_z,
        };
        let active = select_mode(&corrections);

        if self.mode.is_some_and(|prev| prev != active) {
            for other in VerticalMode::ALL.into_iter().filter(|m| *m != active) {
                self.integrals[other.index()] = 0.0;
            }
            debug!(?active, "vertical mode switched, other integrals reset");
        }
        self.mode = Some(active);

        corrections.as_array()[active.index()]
    }

    pub fn mode(&self) -> Option<VerticalMode> {
        self.mode
    }

    /// Integral accumulators in `[S, C, Z]` order.
    pub fn integrals(&self) -> [f64; 3] {
        self.integrals
    }

    pub fn reset(&mut self) {
        self.integrals = [0.0; 3];
        self.mode = None;
    }
}

/// Largest magnitude wins; ties go to the earlier path in `[S, C, Z]` order.
fn select_mode(c: &VerticalCorrections) -> VerticalMode {
    let values = c.as_array();
    let mut best = VerticalMode::Size;
    for mode in VerticalMode::ALL {
        if values[mode.index()].abs() > values[best.index()].abs() {
            best = mode;
        }
    }
    best
}
