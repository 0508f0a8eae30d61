//! Circle node geometry.

use super::{NodeGeometry, check_extent};
use crate::error::{SceneError, SceneResult};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A circle, anchored at its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CircleRecord")]
pub struct Circle {
    /// Radius of the circle.
    pub radius: f64,
}

#[derive(Deserialize)]
struct CircleRecord {
    radius: f64,
}

impl TryFrom<CircleRecord> for Circle {
    type Error = SceneError;

    fn try_from(record: CircleRecord) -> SceneResult<Self> {
        Self::new(record.radius)
    }
}

impl Circle {
    /// Default radius for freshly drafted circles.
    pub const DEFAULT_RADIUS: f64 = 20.0;

    /// Create a circle, validating the radius.
    pub fn new(radius: f64) -> SceneResult<Self> {
        let circle = Self { radius };
        circle.validate()?;
        Ok(circle)
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            radius: Self::DEFAULT_RADIUS,
        }
    }
}

impl NodeGeometry for Circle {
    fn validate(&self) -> SceneResult<()> {
        check_extent("circle radius", self.radius)
    }

    fn center_from_position(&self, position: Point) -> Point {
        position
    }

    fn position_from_center(&self, center: Point) -> Point {
        center
    }

    fn bounds_at(&self, position: Point) -> Rect {
        Rect::new(
            position.x - self.radius,
            position.y - self.radius,
            position.x + self.radius,
            position.y + self.radius,
        )
    }

    fn label_anchor(&self, position: Point, gap: f64) -> Point {
        Point::new(position.x - self.radius, position.y + self.radius + gap)
    }

    fn boundary_margin(&self) -> f64 {
        self.radius
    }

    fn effective_radius(&self) -> Option<f64> {
        Some(self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_center_is_position() {
        let circle = Circle::new(20.0).unwrap();
        let p = Point::new(200.0, 40.0);
        assert_eq!(circle.center_from_position(p), p);
        assert_eq!(circle.position_from_center(p), p);
    }

    #[test]
    fn test_circle_bounds() {
        let circle = Circle::new(10.0).unwrap();
        let bounds = circle.bounds_at(Point::new(50.0, 60.0));
        assert_eq!(bounds, Rect::new(40.0, 50.0, 60.0, 70.0));
    }

    #[test]
    fn test_circle_label_anchor() {
        let circle = Circle::new(20.0).unwrap();
        let anchor = circle.label_anchor(Point::new(100.0, 100.0), 20.0);
        assert_eq!(anchor, Point::new(80.0, 140.0));
    }

    #[test]
    fn test_circle_rejects_bad_radius() {
        assert!(Circle::new(0.0).is_err());
        assert!(Circle::new(-1.0).is_err());
        assert!(Circle::new(f64::NAN).is_err());
    }
}
