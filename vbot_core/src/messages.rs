// vbot_core/src/messages.rs

use crate::geometry::{BoundingBox, PointSet};

// =========================================================================
// == Per-channel Measurements ==
// =========================================================================

/// One scalar observation for a single filter channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Present(f64),
    /// Nothing was observed this tick (occlusion or failed fit).
    Absent,
}

impl Measurement {
    /// Maps a non-finite reading to `Absent`.
    pub fn from_value(value: f64) -> Self {
        if value.is_finite() {
            Measurement::Present(value)
        } else {
            Measurement::Absent
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Measurement::Present(_))
    }
}

impl From<Option<f64>> for Measurement {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Measurement::Absent, Measurement::from_value)
    }
}

// =========================================================================
// == Tick Inputs ==
// =========================================================================

/// Image-space description of the tracked group, used by the altitude path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalObservation {
    /// Diagonal of the bounding box, pixels.
    pub size: f64,
    /// Largest per-axis offset of the box centre from the frame centre, pixels.
    pub offset: f64,
    /// Camera altitude.
    pub altitude: f64,
}

impl VerticalObservation {
    /// Builds the observation from the bounding box of all tracked points.
    ///
    /// # Arguments
    /// * `bounds`: Box around every tracked point, image coordinates.
    /// * `frame_size`: `[width, height]` of the image.
    /// * `altitude`: Current camera altitude.
    pub fn from_bounds(bounds: &BoundingBox, frame_size: [f64; 2], altitude: f64) -> Self {
        let size = bounds.width().hypot(bounds.height());
        let off_x = (frame_size[0] - bounds.min[0] - bounds.max[0]).abs() / 2.0;
        let off_y = (frame_size[1] - bounds.min[1] - bounds.max[1]).abs() / 2.0;
        Self {
            size,
            offset: off_x.max(off_y),
            altitude,
        }
    }
}

/// Everything the tracker delivers for one tick.
#[derive(Debug, Clone, Default)]
pub struct TickObservation {
    /// `None` when every target is occluded.
    pub points: Option<PointSet>,
    pub vertical: Option<VerticalObservation>,
}

impl TickObservation {
    pub fn planar(points: PointSet) -> Self {
        Self {
            points: Some(points),
            vertical: None,
        }
    }

    pub fn occluded() -> Self {
        Self::default()
    }

    pub fn with_vertical(mut self, vertical: VerticalObservation) -> Self {
        self.vertical = Some(vertical);
        self
    }
}
