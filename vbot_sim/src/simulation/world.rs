// vbot_sim/src/simulation/world.rs

//! Ground truth: constant-velocity target boxes and an ego that integrates commands.

use vbot_core::geometry::BoundingBox;
use vbot_core::guidance::AccelerationCommand;
use vbot_core::types::{EgoKinematics, Point, Vec2};

use crate::simulation::config::{TargetConfig, World};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBox {
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extent: [f64; 2],
}

impl TargetBox {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::centered(Point::from(self.position), self.half_extent)
    }
}

impl From<&TargetConfig> for TargetBox {
    fn from(c: &TargetConfig) -> Self {
        Self {
            position: Vec2::from(c.position),
            velocity: Vec2::from(c.velocity),
            half_extent: c.half_extent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationWorld {
    pub ego: EgoKinematics,
    pub altitude: f64,
    pub climb_rate: f64,
    pub targets: Vec<TargetBox>,
    pub time: f64,
    max_speed: f64,
    min_altitude: f64,
}

impl SimulationWorld {
    pub fn new(config: &World) -> Self {
        Self {
            ego: EgoKinematics::new(
                Vec2::from(config.ego_position),
                Vec2::from(config.ego_velocity),
            ),
            altitude: config.camera_altitude,
            climb_rate: 0.0,
            targets: config.targets.iter().map(TargetBox::from).collect(),
            time: 0.0,
            max_speed: config.max_speed,
            min_altitude: config.min_altitude,
        }
    }

    /// Advances every body by `dt` (explicit Euler) under `command`.
    pub fn step(&mut self, command: &AccelerationCommand, dt: f64) {
        for t in &mut self.targets {
            t.position += t.velocity * dt;
        }

        let mut velocity = self.ego.velocity + command.world * dt;
        let speed = velocity.norm();
        if speed > self.max_speed {
            velocity *= self.max_speed / speed;
        }
        self.ego.position += velocity * dt;
        self.ego.velocity = velocity;

        if let Some(az) = command.vertical {
            self.climb_rate += az * dt;
            self.altitude += self.climb_rate * dt;
            if self.altitude < self.min_altitude {
                self.altitude = self.min_altitude;
                self.climb_rate = 0.0;
            }
        }
        self.time += dt;
    }

    /// Centroid of all targets, if any.
    pub fn group_center(&self) -> Option<Vec2> {
        if self.targets.is_empty() {
            return None;
        }
        let sum = self
            .targets
            .iter()
            .fold(Vec2::zeros(), |acc, t| acc + t.position);
        Some(sum / self.targets.len() as f64)
    }

    /// Distance from the ego to the group centroid.
    pub fn range_to_group(&self) -> Option<f64> {
        self.group_center()
            .map(|c| (c - self.ego.position).norm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_targets_move_at_constant_velocity() {
        let mut world = SimulationWorld::new(&World::default());
        let before = world.targets[0].position;
        for _ in 0..10 {
            world.step(&AccelerationCommand::zero(), 0.1);
        }
        let moved = world.targets[0].position - before;
        assert_abs_diff_eq!(moved.x, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moved.y, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(world.time, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ego_speed_is_capped() {
        let config = World {
            ego_velocity: [19.0, 0.0],
            max_speed: 20.0,
            ..Default::default()
        };
        let mut world = SimulationWorld::new(&config);
        let push = AccelerationCommand::from_body(0.0, 10.0, 0.0);
        world.step(&push, 1.0);
        assert_abs_diff_eq!(world.ego.speed(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_altitude_floor() {
        let mut world = SimulationWorld::new(&World {
            camera_altitude: 2.0,
            ..Default::default()
        });
        let mut dive = AccelerationCommand::zero();
        dive.vertical = Some(-10.0);
        world.step(&dive, 1.0);
        assert_eq!(world.altitude, 1.0);
        assert_eq!(world.climb_rate, 0.0);
    }
}
