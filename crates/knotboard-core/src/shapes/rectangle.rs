//! Rectangle node geometry.

use super::{NodeGeometry, check_extent};
use crate::error::{SceneError, SceneResult};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Hit-target margin kept between a dragged rectangle and the canvas origin.
const RECT_BOUNDARY_MARGIN: f64 = 5.0;

/// A rectangle with optional rounded corners, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RectangleRecord")]
pub struct Rectangle {
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Horizontal corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius_x: f64,
    /// Vertical corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius_y: f64,
}

#[derive(Deserialize)]
struct RectangleRecord {
    width: f64,
    height: f64,
    #[serde(default)]
    corner_radius_x: f64,
    #[serde(default)]
    corner_radius_y: f64,
}

impl TryFrom<RectangleRecord> for Rectangle {
    type Error = SceneError;

    fn try_from(r: RectangleRecord) -> SceneResult<Self> {
        Self::rounded(r.width, r.height, r.corner_radius_x, r.corner_radius_y)
    }
}

impl Rectangle {
    pub const DEFAULT_WIDTH: f64 = 40.0;
    pub const DEFAULT_HEIGHT: f64 = 30.0;

    /// Create a sharp-cornered rectangle, validating its size.
    pub fn new(width: f64, height: f64) -> SceneResult<Self> {
        Self::rounded(width, height, 0.0, 0.0)
    }

    /// Create a rectangle with corner radii.
    pub fn rounded(width: f64, height: f64, rx: f64, ry: f64) -> SceneResult<Self> {
        let rect = Self {
            width,
            height,
            corner_radius_x: rx,
            corner_radius_y: ry,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            corner_radius_x: 0.0,
            corner_radius_y: 0.0,
        }
    }
}

impl NodeGeometry for Rectangle {
    fn validate(&self) -> SceneResult<()> {
        check_extent("rectangle width", self.width)?;
        check_extent("rectangle height", self.height)?;
        for (name, r) in [("rx", self.corner_radius_x), ("ry", self.corner_radius_y)] {
            if !r.is_finite() || r < 0.0 {
                return Err(SceneError::geometry(format!(
                    "rectangle corner radius {name} must be >= 0, got {r}"
                )));
            }
        }
        Ok(())
    }

    fn center_from_position(&self, position: Point) -> Point {
        Point::new(
            position.x + self.width / 2.0,
            position.y + self.height / 2.0,
        )
    }

    fn position_from_center(&self, center: Point) -> Point {
        Point::new(center.x - self.width / 2.0, center.y - self.height / 2.0)
    }

    fn bounds_at(&self, position: Point) -> Rect {
        Rect::from_origin_size(position, self.size())
    }

    fn label_anchor(&self, position: Point, gap: f64) -> Point {
        Point::new(position.x, position.y + self.height + gap)
    }

    fn boundary_margin(&self) -> f64 {
        RECT_BOUNDARY_MARGIN
    }

    fn effective_radius(&self) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_center() {
        let rect = Rectangle::new(40.0, 30.0).unwrap();
        let center = rect.center_from_position(Point::new(0.0, 0.0));
        assert!((center.x - 20.0).abs() < f64::EPSILON);
        assert!((center.y - 15.0).abs() < f64::EPSILON);
        assert_eq!(rect.position_from_center(center), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_rectangle_bounds() {
        let rect = Rectangle::new(100.0, 50.0).unwrap();
        let bounds = rect.bounds_at(Point::new(10.0, 20.0));
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rectangle_label_anchor() {
        let rect = Rectangle::new(40.0, 30.0).unwrap();
        assert_eq!(
            rect.label_anchor(Point::new(10.0, 10.0), 20.0),
            Point::new(10.0, 60.0)
        );
    }

    #[test]
    fn test_rectangle_validation() {
        assert!(Rectangle::new(0.0, 10.0).is_err());
        assert!(Rectangle::new(10.0, -2.0).is_err());
        assert!(Rectangle::rounded(10.0, 10.0, -1.0, 0.0).is_err());
        assert!(Rectangle::rounded(10.0, 10.0, 4.0, 4.0).is_ok());
    }
}
