// vbot_core/src/geometry/mod.rs

//! Planar geometry primitives consumed by the ellipse fitter.

pub mod ellipse;

use crate::types::Point;
use serde::{Deserialize, Serialize};

/// An axis-aligned box, e.g. the footprint of one tracked target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// A box of the given half extents centred on `center`.
    pub fn centered(center: Point, half_extent: [f64; 2]) -> Self {
        Self {
            min: [center.x - half_extent[0], center.y - half_extent[1]],
            max: [center.x + half_extent[0], center.y + half_extent[1]],
        }
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// The four corners, counter-clockwise starting at `min`.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min[0], self.min[1]),
            Point::new(self.max[0], self.min[1]),
            Point::new(self.max[0], self.max[1]),
            Point::new(self.min[0], self.max[1]),
        ]
    }
}

/// An ordered collection of 2D observations. No uniqueness constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet(pub Vec<Point>);

impl PointSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Builds the set the tracker hands to the fitter: the four enclosing
    /// corners of every target box, in target order.
    pub fn from_boxes(boxes: &[BoundingBox]) -> Self {
        Self(boxes.iter().flat_map(|b| b.corners()).collect())
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self(pairs.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.0
    }

    /// Axis-aligned bounds of all points, or `None` for an empty set.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let first = self.0.first()?;
        let mut min = [first.x, first.y];
        let mut max = min;
        for p in &self.0[1..] {
            min[0] = min[0].min(p.x);
            min[1] = min[1].min(p.y);
            max[0] = max[0].max(p.x);
            max[1] = max[1].max(p.y);
        }
        Some(BoundingBox { min, max })
    }
}

impl From<Vec<Point>> for PointSet {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_boxes_emits_four_corners_per_box() {
        let boxes = [
            BoundingBox::new([0.0, 0.0], [2.0, 1.0]),
            BoundingBox::centered(Point::new(10.0, 10.0), [1.0, 0.5]),
        ];
        let set = PointSet::from_boxes(&boxes);
        assert_eq!(set.len(), 8);
        assert_eq!(set.as_slice()[2], Point::new(2.0, 1.0));
        assert_eq!(set.as_slice()[4], Point::new(9.0, 9.5));
    }

    #[test]
    fn bounds_cover_all_points() {
        let set = PointSet::from_pairs(&[(3.0, -1.0), (-2.0, 4.0), (0.5, 0.5)]);
        let b = set.bounds().unwrap();
        assert_eq!(b.min, [-2.0, -1.0]);
        assert_eq!(b.max, [3.0, 4.0]);
        assert_eq!(b.width(), 5.0);
        assert_eq!(b.height(), 5.0);
        assert!(PointSet::default().bounds().is_none());
    }
}
