// vbot_sim/src/simulation/tracker.rs

//! Stand-in for the multi-object tracker: noisy box corners in the world frame
//! plus the image-space bounds of everything visible.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;
use vbot_core::geometry::{BoundingBox, PointSet};
use vbot_core::messages::{TickObservation, VerticalObservation};
use vbot_core::types::Point;

use crate::simulation::config::TrackerConfig;
use crate::simulation::core::error::SimError;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::world::SimulationWorld;

#[derive(Debug, Clone)]
pub struct SyntheticTracker {
    config: TrackerConfig,
    corner_noise: Normal<f64>,
}

impl SyntheticTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, SimError> {
        let p = config.occlusion_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::InvalidScenario(format!(
                "occlusion_probability must be in [0, 1], got {}",
                p
            )));
        }
        let corner_noise = Normal::new(0.0, config.corner_noise_stddev).map_err(|e| {
            SimError::InvalidScenario(format!("corner_noise_stddev: {}", e))
        })?;
        Ok(Self {
            config,
            corner_noise,
        })
    }

    /// Samples this tick's detections.
    pub fn observe(&self, world: &SimulationWorld, rng: &mut SimulationRng) -> TickObservation {
        let mut points = Vec::with_capacity(4 * world.targets.len());
        let mut visible = Vec::with_capacity(world.targets.len());
        for target in &world.targets {
            if rng.0.gen_bool(self.config.occlusion_probability) {
                continue;
            }
            let bounds = target.bounds();
            for corner in bounds.corners() {
                points.push(Point::new(
                    corner.x + self.corner_noise.sample(&mut rng.0),
                    corner.y + self.corner_noise.sample(&mut rng.0),
                ));
            }
            visible.push(bounds);
        }

        if points.is_empty() {
            debug!(time = world.time, "all targets occluded");
            return TickObservation::occluded();
        }

        let observation = TickObservation::planar(PointSet::new(points));
        match self.project(world, &visible) {
            Some(image) => observation.with_vertical(image),
            None => observation,
        }
    }

    /// Projects the visible boxes through a downward camera centred on the ego.
    fn project(
        &self,
        world: &SimulationWorld,
        visible: &[BoundingBox],
    ) -> Option<VerticalObservation> {
        let camera = &self.config.camera;
        let scale = camera.pixels_per_meter(world.altitude);
        if !scale.is_finite() {
            return None;
        }
        let [w, h] = camera.frame_size;
        let to_pixel = |p: Point| {
            Point::new(
                (p.x - world.ego.position.x) * scale + w / 2.0,
                (p.y - world.ego.position.y) * scale + h / 2.0,
            )
        };
        let corners: Vec<Point> = visible
            .iter()
            .flat_map(|b| b.corners())
            .map(to_pixel)
            .collect();
        let bounds = PointSet::new(corners).bounds()?;
        Some(VerticalObservation::from_bounds(
            &bounds,
            camera.frame_size,
            world.altitude,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::World;
    use approx::assert_abs_diff_eq;

    fn noiseless(occlusion_probability: f64) -> SyntheticTracker {
        SyntheticTracker::new(TrackerConfig {
            corner_noise_stddev: 0.0,
            occlusion_probability,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_emits_four_corners_per_target() {
        let world = SimulationWorld::new(&World::default());
        let mut rng = SimulationRng::from_seed_option(Some(1));
        let obs = noiseless(0.0).observe(&world, &mut rng);
        let points = obs.points.unwrap();
        assert_eq!(points.len(), 8);
        assert_eq!(points.as_slice()[0], Point::new(-1.0, -1.0));
        assert!(obs.vertical.is_some());
    }

    #[test]
    fn test_full_occlusion() {
        let world = SimulationWorld::new(&World::default());
        let mut rng = SimulationRng::from_seed_option(Some(1));
        let obs = noiseless(1.0).observe(&world, &mut rng);
        assert!(obs.points.is_none());
        assert!(obs.vertical.is_none());
    }

    #[test]
    fn test_image_size_follows_altitude() {
        let mut world = SimulationWorld::new(&World::default());
        world.targets.truncate(1);
        world.ego.position = world.targets[0].position;
        let mut rng = SimulationRng::from_seed_option(Some(1));
        let tracker = noiseless(0.0);

        let low = tracker.observe(&world, &mut rng).vertical.unwrap();
        world.altitude *= 2.0;
        let high = tracker.observe(&world, &mut rng).vertical.unwrap();
        assert_abs_diff_eq!(high.size, low.size / 2.0, epsilon = 1e-9);
        // Box centred under the camera.
        assert_abs_diff_eq!(low.offset, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_probability() {
        assert!(SyntheticTracker::new(TrackerConfig {
            occlusion_probability: 1.5,
            ..Default::default()
        })
        .is_err());
    }
}
