//! Example shapes that have been configured but not yet dropped on the canvas.

use super::{Node, NodeId, NodeMeta, NodeStyle};
use crate::error::SceneResult;
use crate::shapes::{NodeShape, ShapeKind};
use kurbo::Point;

/// Prefix of ids handed to freshly created nodes.
pub const TEMP_ID_PREFIX: &str = "tempNodeId_";

/// A node waiting to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftNode {
    pub shape: NodeShape,
    pub style: NodeStyle,
    pub label: String,
    pub meta: NodeMeta,
}

impl DraftNode {
    pub fn new(shape: impl Into<NodeShape>) -> Self {
        Self {
            shape: shape.into(),
            style: NodeStyle::default(),
            label: String::new(),
            meta: NodeMeta::default(),
        }
    }

    /// Draft with the stock parameters for `kind`.
    pub fn of_kind(kind: ShapeKind) -> Self {
        Self::new(NodeShape::default_for(kind))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Turn the draft into a node anchored at `drop_point`.
    ///
    /// The drop point becomes the center for round shapes and the top-left
    /// corner for rectangles.
    pub fn into_node(self, id: NodeId, drop_point: Point) -> SceneResult<Node> {
        let mut node = Node::new(id, self.shape, drop_point)?;
        node.style = self.style;
        node.label = self.label;
        node.meta = self.meta;
        Ok(node)
    }
}
