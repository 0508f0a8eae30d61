//! Arrowhead placement for links.
//!
//! The inset is the distance from the target's center, back along the link,
//! at which the marker is drawn so that the arrow tip rests on the target's
//! outline instead of inside it.

use crate::error::SceneResult;
use crate::scene::{Link, Node, Scene};
use crate::shapes::{NodeGeometry, NodeShape, Rectangle};
use kurbo::{Line, Point};

/// Default distance kept between the arrow tip and the target outline.
pub const DEFAULT_MARKER_GAP: f64 = 5.0;

/// Inset used when no rectangle edge yields an intersection.
pub const FALLBACK_INSET: f64 = 31.0;

/// Centers closer than this on one axis count as aligned.
const ALIGN_EPSILON: f64 = 0.5;

/// Parameters of the inset calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerParams {
    pub gap: f64,
    pub fallback: f64,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            gap: DEFAULT_MARKER_GAP,
            fallback: FALLBACK_INSET,
        }
    }
}

/// Inset for a link pointing at `target` from `source_center`.
pub fn marker_inset(source_center: Point, target: &Node, params: MarkerParams) -> f64 {
    match target.shape() {
        NodeShape::Rectangle(rect) => {
            rectangle_inset(source_center, target.position(), rect, params)
        }
        shape => match shape.effective_radius() {
            Some(r) => r + params.gap,
            None => params.fallback,
        },
    }
}

/// Inset for a rectangle target anchored (top-left) at `origin`.
///
/// Aligned centers short-circuit to half the height or width. Otherwise the
/// center-to-center line is intersected with the edges in the order top,
/// bottom, left, right; an edge is only eligible when the source lies on its
/// outer side (y grows downward).
pub fn rectangle_inset(
    source_center: Point,
    origin: Point,
    rect: &Rectangle,
    params: MarkerParams,
) -> f64 {
    let target_center = rect.center_from_position(origin);
    let dx = target_center.x - source_center.x;
    let dy = target_center.y - source_center.y;

    if dx.abs() < ALIGN_EPSILON {
        return rect.height / 2.0 + params.gap;
    }
    if dy.abs() < ALIGN_EPSILON {
        return rect.width / 2.0 + params.gap;
    }

    let slope = dy / dx;
    let intercept = source_center.y - slope * source_center.x;
    let x_at = |y: f64| (y - intercept) / slope;
    let y_at = |x: f64| slope * x + intercept;

    let (left, right) = (origin.x, origin.x + rect.width);
    let (top, bottom) = (origin.y, origin.y + rect.height);
    let within = |v: f64, lo: f64, hi: f64| v >= lo && v <= hi;

    let candidates = [
        (dy > 0.0, Point::new(x_at(top), top)),
        (dy < 0.0, Point::new(x_at(bottom), bottom)),
        (dx > 0.0, Point::new(left, y_at(left))),
        (dx < 0.0, Point::new(right, y_at(right))),
    ];

    candidates
        .into_iter()
        .enumerate()
        .find(|(i, (eligible, hit))| {
            *eligible
                && if *i < 2 {
                    within(hit.x, left, right)
                } else {
                    within(hit.y, top, bottom)
                }
        })
        .map(|(_, (_, hit))| hit.distance(target_center) + params.gap)
        .unwrap_or(params.fallback)
}

/// Inset for a link of `scene`, or an error when an endpoint is missing.
pub fn link_inset(scene: &Scene, link: &Link, params: MarkerParams) -> SceneResult<f64> {
    let source = scene.node(&link.source)?;
    let target = scene.node(&link.target)?;
    Ok(marker_inset(source.center(), target, params))
}

/// Center-to-center segment of a link.
pub fn link_path(scene: &Scene, link: &Link) -> SceneResult<Line> {
    let source = scene.node(&link.source)?;
    let target = scene.node(&link.target)?;
    Ok(Line::new(source.center(), target.center()))
}
