//! Render frames: everything an external renderer needs for one redraw.

use crate::config::LabelConfig;
use crate::connector::{MarkerParams, link_inset, link_path};
use crate::drag::DragGuides;
use crate::scene::{LinkId, NodeId, Scene};
use crate::shapes::ShapeKind;
use kurbo::{Line, Point, Rect};
use serde::Serialize;

/// Drawable state of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFrame {
    pub id: NodeId,
    pub kind: ShapeKind,
    /// Pin if pinned, otherwise the layout position.
    pub position: Point,
    pub center: Point,
    pub bounds: Rect,
    pub label_anchor: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    pub selected: bool,
    pub pinned: bool,
}

/// Drawable state of one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFrame {
    pub id: LinkId,
    /// Center-to-center segment.
    pub path: Line,
    /// Marker distance back from the target center.
    pub inset: f64,
    pub selected: bool,
}

/// Snapshot of the scene for one redraw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marquee: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guides: Option<DragGuides>,
}

impl Frame {
    /// Node entry by id.
    pub fn node(&self, id: &NodeId) -> Option<&NodeFrame> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Link entry by id.
    pub fn link(&self, id: &LinkId) -> Option<&LinkFrame> {
        self.links.iter().find(|l| &l.id == id)
    }
}

/// Builds a [`Frame`] from a scene plus gesture overlays.
pub struct FrameBuilder<'a> {
    scene: &'a Scene,
    labels: LabelConfig,
    marker: MarkerParams,
    marquee: Option<Rect>,
    guides: Option<DragGuides>,
}

impl<'a> FrameBuilder<'a> {
    /// Start a frame for `scene` with default label gaps and marker params.
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            labels: LabelConfig::default(),
            marker: MarkerParams::default(),
            marquee: None,
            guides: None,
        }
    }

    /// Set the label gaps used for label anchors.
    pub fn with_labels(mut self, labels: LabelConfig) -> Self {
        self.labels = labels;
        self
    }

    /// Set the marker params used for link insets.
    pub fn with_marker(mut self, marker: MarkerParams) -> Self {
        self.marker = marker;
        self
    }

    /// Set the marquee rectangle (canvas coordinates).
    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }

    /// Set the drag guide crosshair.
    pub fn with_guides(mut self, guides: Option<DragGuides>) -> Self {
        self.guides = guides;
        self
    }

    /// Collect every node and link. Links with a missing endpoint are skipped.
    pub fn build(self) -> Frame {
        let scene = self.scene;
        let nodes = scene
            .nodes()
            .map(|node| NodeFrame {
                id: node.id.clone(),
                kind: node.kind(),
                position: node.resolved_position(),
                center: node.center(),
                bounds: node.bounds(),
                label_anchor: node.label_anchor(self.labels.gap_for(node.kind())),
                points: node.polygon_points(),
                selected: scene.is_selected(&node.id),
                pinned: node.is_pinned(),
            })
            .collect();

        let links = scene
            .links()
            .iter()
            .filter_map(|link| {
                let built = link_path(scene, link)
                    .and_then(|path| Ok((path, link_inset(scene, link, self.marker)?)));
                match built {
                    Ok((path, inset)) => Some(LinkFrame {
                        id: link.id.clone(),
                        path,
                        inset,
                        selected: scene.is_link_selected(&link.id),
                    }),
                    Err(e) => {
                        log::warn!("Skipping link {} in frame: {e}", link.id);
                        None
                    }
                }
            })
            .collect();

        Frame {
            nodes,
            links,
            marquee: self.marquee,
            guides: self.guides,
        }
    }
}
