// vbot_core/src/types.rs

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
pub type Point = Point2<f64>;
pub type Vec2 = Vector2<f64>;

/// Position, velocity and acceleration of a point moving in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanarKinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl PlanarKinematics {
    pub fn new(position: Vec2, velocity: Vec2, acceleration: Vec2) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// A point moving at constant velocity.
    pub fn constant_velocity(position: Vec2, velocity: Vec2) -> Self {
        Self::new(position, velocity, Vec2::zeros())
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Heading of the velocity vector w.r.t. the world x axis.
    pub fn heading(&self) -> f64 {
        self.velocity.y.atan2(self.velocity.x)
    }
}

/// Known kinematics of the pursuer. Read-only to the core.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EgoKinematics {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl EgoKinematics {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Heading angle (alpha) of the ego velocity. Zero for a stationary ego.
    pub fn heading(&self) -> f64 {
        self.velocity.y.atan2(self.velocity.x)
    }
}

/// The filtered (or seeded) kinematics of one scalar channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicEstimate {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    /// `false` while the values are still the seed from the first measurement.
    pub ready: bool,
}
