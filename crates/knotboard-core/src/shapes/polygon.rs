//! Regular polygon geometry (triangles included).

use super::{NodeGeometry, check_extent};
use crate::error::{SceneError, SceneResult};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// How a polygon was authored; triangles keep their own document tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolygonFlavor {
    Triangle,
    #[default]
    Regular,
}

/// A regular polygon, anchored at its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonRecord")]
pub struct Polygon {
    /// Number of sides (3..=[`Polygon::MAX_SIDES`]).
    pub sides: u32,
    /// Circumradius.
    pub radius: f64,
    /// Authoring flavor.
    #[serde(default)]
    pub flavor: PolygonFlavor,
}

#[derive(Deserialize)]
struct PolygonRecord {
    sides: u32,
    radius: f64,
    #[serde(default)]
    flavor: PolygonFlavor,
}

impl TryFrom<PolygonRecord> for Polygon {
    type Error = SceneError;

    fn try_from(record: PolygonRecord) -> SceneResult<Self> {
        let polygon = Self {
            sides: record.sides,
            radius: record.radius,
            flavor: record.flavor,
        };
        polygon.validate()?;
        Ok(polygon)
    }
}

impl Polygon {
    pub const DEFAULT_SIDES: u32 = 5;
    /// Upper bound on sides; past this a polygon is indistinguishable from a circle.
    pub const MAX_SIDES: u32 = 360;
    pub const DEFAULT_RADIUS: f64 = 20.0;

    /// Create a regular polygon, validating sides and radius.
    pub fn new(sides: u32, radius: f64) -> SceneResult<Self> {
        let polygon = Self {
            sides,
            radius,
            flavor: PolygonFlavor::Regular,
        };
        polygon.validate()?;
        Ok(polygon)
    }

    /// Create a triangle (three-sided polygon tagged as a triangle).
    pub fn triangle(radius: f64) -> SceneResult<Self> {
        let mut polygon = Self::new(3, radius)?;
        polygon.flavor = PolygonFlavor::Triangle;
        Ok(polygon)
    }

    /// Whether this polygon carries the triangle tag.
    pub fn is_triangle(&self) -> bool {
        self.flavor == PolygonFlavor::Triangle
    }

    /// Rendered vertices around `center`.
    pub fn vertices(&self, center: Point) -> SceneResult<Vec<Point>> {
        regular_polygon_vertices(center.x, center.y, self.radius, self.sides)
    }
}

impl Default for Polygon {
    fn default() -> Self {
        Self {
            sides: Self::DEFAULT_SIDES,
            radius: Self::DEFAULT_RADIUS,
            flavor: PolygonFlavor::Regular,
        }
    }
}

impl NodeGeometry for Polygon {
    fn validate(&self) -> SceneResult<()> {
        if !(3..=Self::MAX_SIDES).contains(&self.sides) {
            return Err(SceneError::geometry(format!(
                "polygon needs 3 to {} sides, got {}",
                Self::MAX_SIDES,
                self.sides
            )));
        }
        check_extent("polygon radius", self.radius)
    }

    fn center_from_position(&self, position: Point) -> Point {
        position
    }

    fn position_from_center(&self, center: Point) -> Point {
        center
    }

    fn bounds_at(&self, position: Point) -> Rect {
        match self.vertices(position) {
            Ok(points) => bounding_box(&points),
            // Unreachable for validated polygons; fall back to the circumcircle.
            Err(_) => Rect::new(
                position.x - self.radius,
                position.y - self.radius,
                position.x + self.radius,
                position.y + self.radius,
            ),
        }
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

/// Round half toward positive infinity, matching how the vertex strings were
/// historically produced.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Generate the vertices of a regular polygon.
///
/// Odd-sided polygons are rotated by -π/2 so one vertex points straight up;
/// even-sided polygons start at angle 0. Coordinates are rounded to integers.
pub fn regular_polygon_vertices(
    center_x: f64,
    center_y: f64,
    radius: f64,
    sides: u32,
) -> SceneResult<Vec<Point>> {
    if !(3..=Polygon::MAX_SIDES).contains(&sides) {
        return Err(SceneError::geometry(format!(
            "polygon needs 3 to {} sides, got {sides}",
            Polygon::MAX_SIDES
        )));
    }
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(SceneError::geometry(format!(
            "polygon radius must be > 0, got {radius}"
        )));
    }

    let step = TAU / sides as f64;
    let offset = if sides % 2 == 1 { -FRAC_PI_2 } else { 0.0 };

    Ok((0..sides)
        .map(|i| {
            let angle = offset + i as f64 * step;
            Point::new(
                round_half_up(center_x + radius * angle.cos()),
                round_half_up(center_y + radius * angle.sin()),
            )
        })
        .collect())
}

/// Format vertices as an SVG `points` attribute (`"x,y x,y ..."`).
pub fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an SVG `points` attribute.
pub fn parse_points(s: &str) -> SceneResult<Vec<Point>> {
    s.split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| SceneError::Document(format!("malformed point '{pair}'")))?;
            let x: f64 = x
                .trim()
                .parse()
                .map_err(|_| SceneError::Document(format!("malformed x in '{pair}'")))?;
            let y: f64 = y
                .trim()
                .parse()
                .map_err(|_| SceneError::Document(format!("malformed y in '{pair}'")))?;
            Ok(Point::new(x, y))
        })
        .collect()
}

/// Axis-aligned bounding box of a point set.
pub fn bounding_box(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| {
            acc.union_pt(*p)
        })
}

/// Recover a polygon's center from its vertices and circumradius.
///
/// Two vertices determine two candidate centers; the one that keeps every
/// vertex closest to `radius` wins.
pub fn circumcenter_from_vertices(radius: f64, vertices: &[Point]) -> SceneResult<Point> {
    if !(radius > 0.0) {
        return Err(SceneError::geometry("radius must be greater than zero"));
    }
    let [p1, p2, ..] = vertices else {
        return Err(SceneError::geometry(
            "at least two points are needed to determine a circle center",
        ));
    };

    let chord = p1.distance(*p2);
    if chord > 2.0 * radius || chord == 0.0 {
        return Err(SceneError::geometry(
            "points are too far apart (or coincident) for the given radius",
        ));
    }

    let mid = p1.midpoint(*p2);
    let offset = (radius * radius - (chord / 2.0).powi(2)).sqrt();
    let dx = (p2.y - p1.y) / chord;
    let dy = (p1.x - p2.x) / chord;

    let first = Point::new(mid.x + offset * dx, mid.y + offset * dy);
    let second = Point::new(mid.x - offset * dx, mid.y - offset * dy);

    let worst_fit = |center: Point| {
        vertices
            .iter()
            .map(|p| (p.distance(center) - radius).abs())
            .fold(0.0_f64, f64::max)
    };

    if worst_fit(second) < worst_fit(first) {
        Ok(second)
    } else {
        Ok(first)
    }
}
