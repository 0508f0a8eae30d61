//! Diagram nodes.

use crate::error::SceneResult;
use crate::shapes::{NodeGeometry, NodeShape, ShapeKind};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Default node stroke color.
pub const DEFAULT_NODE_STROKE: &str = "#000000";
/// Default node fill color.
pub const DEFAULT_NODE_FILL: &str = "#F0E0E0";

/// Paint applied to a node outline and interior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub stroke: String,
    pub fill: String,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_NODE_STROKE.to_string(),
            fill: DEFAULT_NODE_FILL.to_string(),
        }
    }
}

/// Business metadata carried through load/save untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    pub status: i64,
    #[serde(default)]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
}

impl Default for NodeMeta {
    fn default() -> Self {
        Self {
            status: 1,
            node_type: String::new(),
            pic: None,
        }
    }
}

/// One diagram shape placed on the canvas.
///
/// `position` is the kind-specific anchor (top-left for rectangles, center
/// otherwise). `center` is derived from it and is only ever written through
/// [`Node::set_position`], [`Node::set_center`] and [`Node::set_shape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    shape: NodeShape,
    position: Point,
    center: Point,
    /// Layout override set while dragging; the node does not move under
    /// the simulation while this is set.
    pub pinned: Option<Point>,
    /// Baseline that the next drag computes its delta from.
    pub temp_position: Point,
    /// Simulation velocity.
    pub velocity: Vec2,
    pub style: NodeStyle,
    pub label: String,
    pub meta: NodeMeta,
}

impl Node {
    /// Create a node anchored at `position`, validating its geometry.
    pub fn new(id: impl Into<NodeId>, shape: impl Into<NodeShape>, position: Point) -> SceneResult<Self> {
        let shape = shape.into();
        shape.validate()?;
        let center = shape.center_from_position(position);
        Ok(Self {
            id: id.into(),
            shape,
            position,
            center,
            pinned: None,
            temp_position: position,
            velocity: Vec2::ZERO,
            style: NodeStyle::default(),
            label: String::new(),
            meta: NodeMeta::default(),
        })
    }

    /// Create a node whose center sits at `center`.
    pub fn centered(id: impl Into<NodeId>, shape: impl Into<NodeShape>, center: Point) -> SceneResult<Self> {
        let shape = shape.into();
        let position = shape.position_from_center(center);
        Self::new(id, shape, position)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn shape(&self) -> &NodeShape {
        &self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Move the anchor and recompute the center.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.center = self.shape.center_from_position(position);
    }

    /// Move the node so its center lands on `center`.
    pub fn set_center(&mut self, center: Point) {
        self.set_position(self.shape.position_from_center(center));
    }

    /// Swap geometry in place, keeping the anchor.
    pub fn set_shape(&mut self, shape: NodeShape) -> SceneResult<()> {
        shape.validate()?;
        self.shape = shape;
        self.center = self.shape.center_from_position(self.position);
        Ok(())
    }

    /// Position the renderer should draw at: the pin when set, otherwise the
    /// layout position.
    pub fn resolved_position(&self) -> Point {
        self.pinned.unwrap_or(self.position)
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds_at(self.position)
    }

    pub fn label_anchor(&self, gap: f64) -> Point {
        self.shape.label_anchor(self.position, gap)
    }

    /// Rendered vertices for polygon nodes.
    pub fn polygon_points(&self) -> Option<Vec<Point>> {
        self.shape.polygon_points(self.center)
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }
}
