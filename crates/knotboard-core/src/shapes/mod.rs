//! Node shape definitions.

mod circle;
mod polygon;
mod rectangle;

pub use circle::Circle;
pub use polygon::{
    Polygon, PolygonFlavor, bounding_box, circumcenter_from_vertices, format_points,
    parse_points, regular_polygon_vertices,
};
pub use rectangle::Rectangle;

use crate::error::{SceneError, SceneResult};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reject non-finite or non-positive extents.
pub(crate) fn check_extent(name: &str, value: f64) -> SceneResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::geometry(format!("{name} must be > 0, got {value}")))
    }
}

/// Geometry shared by every node shape.
///
/// `position` is the node's canonical anchor: the center for circles and
/// polygons, the top-left corner for rectangles.
pub trait NodeGeometry {
    /// Check the shape's parameters.
    fn validate(&self) -> SceneResult<()>;

    /// Center of the shape when anchored at `position`.
    fn center_from_position(&self, position: Point) -> Point;

    /// Anchor position that puts the shape's center at `center`.
    fn position_from_center(&self, center: Point) -> Point;

    /// Rendered bounding box when anchored at `position`.
    fn bounds_at(&self, position: Point) -> Rect;

    /// Label baseline origin, `gap` units below the shape.
    fn label_anchor(&self, position: Point, gap: f64) -> Point;

    /// Minimum distance a dragged anchor must keep from the canvas origin.
    fn boundary_margin(&self) -> f64;

    /// Radius used for connector insets, if the shape is round-ish.
    fn effective_radius(&self) -> Option<f64>;
}

/// Shape kind tag, as written in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    #[serde(rename = "rect")]
    Rectangle,
    Triangle,
    Polygon,
}

impl ShapeKind {
    /// Document tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rect",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Polygon => "polygon",
        }
    }

    /// Parse a document tag.
    pub fn parse(tag: &str) -> SceneResult<Self> {
        match tag {
            "circle" => Ok(ShapeKind::Circle),
            "rect" | "rectangle" => Ok(ShapeKind::Rectangle),
            "triangle" => Ok(ShapeKind::Triangle),
            "polygon" => Ok(ShapeKind::Polygon),
            other => Err(SceneError::Document(format!("unknown shape type '{other}'"))),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeShape {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(Polygon),
}

impl NodeShape {
    /// Kind tag of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            NodeShape::Circle(_) => ShapeKind::Circle,
            NodeShape::Rectangle(_) => ShapeKind::Rectangle,
            NodeShape::Polygon(p) if p.is_triangle() => ShapeKind::Triangle,
            NodeShape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Default geometry for a kind tag.
    pub fn default_for(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Circle => NodeShape::Circle(Circle::default()),
            ShapeKind::Rectangle => NodeShape::Rectangle(Rectangle::default()),
            ShapeKind::Triangle => NodeShape::Polygon(Polygon {
                sides: 3,
                radius: Polygon::DEFAULT_RADIUS,
                flavor: PolygonFlavor::Triangle,
            }),
            ShapeKind::Polygon => NodeShape::Polygon(Polygon::default()),
        }
    }

    fn geometry(&self) -> &dyn NodeGeometry {
        match self {
            NodeShape::Circle(s) => s,
            NodeShape::Rectangle(s) => s,
            NodeShape::Polygon(s) => s,
        }
    }

    /// Rendered polygon vertices, for polygon shapes only.
    pub fn polygon_points(&self, center: Point) -> Option<Vec<Point>> {
        match self {
            NodeShape::Polygon(p) => p.vertices(center).ok(),
            _ => None,
        }
    }
}

impl NodeGeometry for NodeShape {
    fn validate(&self) -> SceneResult<()> {
        self.geometry().validate()
    }

    fn center_from_position(&self, position: Point) -> Point {
        self.geometry().center_from_position(position)
    }

    fn position_from_center(&self, center: Point) -> Point {
        self.geometry().position_from_center(center)
    }

    fn bounds_at(&self, position: Point) -> Rect {
        self.geometry().bounds_at(position)
    }

    fn label_anchor(&self, position: Point, gap: f64) -> Point {
        self.geometry().label_anchor(position, gap)
    }

    fn boundary_margin(&self) -> f64 {
        self.geometry().boundary_margin()
    }

    fn effective_radius(&self) -> Option<f64> {
        self.geometry().effective_radius()
    }
}

impl From<Circle> for NodeShape {
    fn from(c: Circle) -> Self {
        NodeShape::Circle(c)
    }
}

impl From<Rectangle> for NodeShape {
    fn from(r: Rectangle) -> Self {
        NodeShape::Rectangle(r)
    }
}

impl From<Polygon> for NodeShape {
    fn from(p: Polygon) -> Self {
        NodeShape::Polygon(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        for kind in [
            ShapeKind::Circle,
            ShapeKind::Rectangle,
            ShapeKind::Triangle,
            ShapeKind::Polygon,
        ] {
            assert_eq!(ShapeKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(ShapeKind::parse("hexagon").is_err());
    }

    #[test]
    fn test_shape_kind_from_geometry() {
        assert_eq!(NodeShape::default_for(ShapeKind::Triangle).kind(), ShapeKind::Triangle);
        assert_eq!(
            NodeShape::from(Polygon::new(3, 10.0).unwrap()).kind(),
            ShapeKind::Polygon
        );
        assert_eq!(NodeShape::from(Circle::default()).kind(), ShapeKind::Circle);
    }

    #[test]
    fn test_center_roundtrip_every_kind() {
        let shapes = [
            NodeShape::from(Circle::new(12.0).unwrap()),
            NodeShape::from(Rectangle::new(40.0, 30.0).unwrap()),
            NodeShape::from(Polygon::new(6, 25.0).unwrap()),
        ];
        let p = Point::new(120.0, 75.0);
        for shape in shapes {
            let center = shape.center_from_position(p);
            assert_eq!(shape.position_from_center(center), p);
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        for kind in [
            ShapeKind::Circle,
            ShapeKind::Rectangle,
            ShapeKind::Triangle,
            ShapeKind::Polygon,
        ] {
            assert!(NodeShape::default_for(kind).validate().is_ok());
        }
    }

    #[test]
    fn test_polygon_points_only_for_polygons() {
        assert!(NodeShape::from(Circle::default()).polygon_points(Point::ZERO).is_none());
        let points = NodeShape::from(Polygon::default())
            .polygon_points(Point::new(50.0, 50.0))
            .unwrap();
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn test_deserialized_shapes_are_validated() {
        let shape: NodeShape =
            serde_json::from_str(r#"{"kind": "rectangle", "width": 40, "height": 30}"#).unwrap();
        assert_eq!(shape, NodeShape::from(Rectangle::new(40.0, 30.0).unwrap()));

        for bad in [
            r#"{"kind": "polygon", "sides": 0, "radius": 20}"#,
            r#"{"kind": "circle", "radius": 0}"#,
            r#"{"kind": "rectangle", "width": 40, "height": -1}"#,
            r#"{"kind": "rectangle", "width": 40, "height": 30, "corner_radius_x": -2}"#,
        ] {
            assert!(serde_json::from_str::<NodeShape>(bad).is_err(), "{bad}");
        }
    }
}
