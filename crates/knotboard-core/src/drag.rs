//! Pointer gesture state machine: node dragging and marquee delegation.
//!
//! A drag moves one anchor node under the pointer and carries the rest of
//! the selection along by the same delta. Every moved node is snapped by its
//! center and pinned where it lands.

use crate::error::SceneResult;
use crate::marquee::MarqueeSelector;
use crate::scene::{NodeId, Scene};
use crate::shapes::NodeGeometry;
use crate::snap::Grid;
use kurbo::{Line, Point, Size, Vec2};
use serde::Serialize;

/// Crosshair through the dragged node's center, spanning the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DragGuides {
    pub horizontal: Line,
    pub vertical: Line,
}

impl DragGuides {
    /// Guides crossing at `center`.
    pub fn through(center: Point, canvas: Size) -> Self {
        Self {
            horizontal: Line::new((0.0, center.y), (canvas.width, center.y)),
            vertical: Line::new((center.x, 0.0), (center.x, canvas.height)),
        }
    }
}

/// Current gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    PrimaryDrag {
        anchor: NodeId,
        /// Node anchor minus pointer at press time.
        grab_offset: Vec2,
        guides: Option<DragGuides>,
    },
    MarqueeSelect,
}

/// Result of one drag move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragStep {
    /// Nodes repositioned this step, anchor first.
    pub moved: Vec<NodeId>,
    /// Selected nodes held back by the origin guard.
    pub blocked: Vec<NodeId>,
}

/// Geometry limits applied while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBounds {
    pub canvas: Size,
    /// Pointer clamp distance from the canvas edges.
    pub margin: f64,
    pub grid: Grid,
}

impl Default for DragBounds {
    fn default() -> Self {
        Self {
            canvas: Size::new(10000.0, 10000.0),
            margin: 30.0,
            grid: Grid::default(),
        }
    }
}

impl DragBounds {
    /// Keep a dragged anchor clickable near the canvas edges.
    ///
    /// Below the margin clamps to the margin; past the extent clamps to
    /// extent minus margin.
    pub fn clamp(&self, p: Point) -> Point {
        let axis = |v: f64, extent: f64| {
            if v < self.margin {
                self.margin
            } else if v > extent {
                extent - self.margin
            } else {
                v
            }
        };
        Point::new(axis(p.x, self.canvas.width), axis(p.y, self.canvas.height))
    }
}

/// Turns pointer input into scene mutations.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: GestureState,
    marquee: MarqueeSelector,
    bounds: DragBounds,
}

impl DragController {
    /// Create an idle controller.
    pub fn new(bounds: DragBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Current gesture.
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Canvas size, clamp margin and snap grid.
    pub fn bounds(&self) -> &DragBounds {
        &self.bounds
    }

    /// The rubber-band selector.
    pub fn marquee(&self) -> &MarqueeSelector {
        &self.marquee
    }

    /// Whether no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Guides of the active drag, if any.
    pub fn guides(&self) -> Option<DragGuides> {
        match &self.state {
            GestureState::PrimaryDrag { guides, .. } => *guides,
            _ => None,
        }
    }

    /// Press on a node: fix up the selection and start dragging it.
    ///
    /// An unselected node replaces the selection unless `multi_select` is
    /// held; either way it ends up selected. Every selected node's drag
    /// baseline is reset to where the layout has put it.
    pub fn press_node(
        &mut self,
        scene: &mut Scene,
        id: &NodeId,
        pointer: Point,
        multi_select: bool,
    ) -> SceneResult<()> {
        let node = scene.node(id)?;
        let grab_offset = node.position() - pointer;
        if !scene.is_selected(id) && !multi_select {
            scene.clear_selection();
        }
        scene.select([id], true);
        for selected in scene.selected_ids() {
            if let Ok(node) = scene.node_mut(&selected) {
                node.temp_position = node.position();
            }
        }
        self.marquee.cancel();
        self.state = GestureState::PrimaryDrag {
            anchor: id.clone(),
            grab_offset,
            guides: None,
        };
        log::debug!("Drag started on {id}");
        Ok(())
    }

    /// Press on empty canvas: start a marquee.
    pub fn press_canvas(&mut self, scene: &mut Scene, pointer: Point) {
        self.marquee.begin(scene, pointer);
        self.state = GestureState::MarqueeSelect;
    }

    /// Pointer moved. Returns the drag step when nodes were repositioned.
    pub fn pointer_move(&mut self, scene: &mut Scene, pointer: Point) -> Option<DragStep> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::MarqueeSelect => {
                self.marquee.update(pointer);
                None
            }
            GestureState::PrimaryDrag {
                anchor,
                grab_offset,
                ..
            } => {
                let anchor = anchor.clone();
                let target = pointer + *grab_offset;
                let (step, guides) = self.drag_selection(scene, &anchor, target)?;
                if let GestureState::PrimaryDrag { guides: g, .. } = &mut self.state {
                    *g = Some(guides);
                }
                Some(step)
            }
        }
    }

    fn drag_selection(
        &self,
        scene: &mut Scene,
        anchor: &NodeId,
        target: Point,
    ) -> Option<(DragStep, DragGuides)> {
        let clamped = self.bounds.clamp(target);
        let grid = self.bounds.grid;

        let Ok(node) = scene.node_mut(anchor) else {
            log::warn!("Dragged node {anchor} disappeared");
            return None;
        };
        let delta = clamped - node.temp_position;
        let center = node.shape().center_from_position(clamped);
        let guides = DragGuides::through(center, self.bounds.canvas);
        let snapped = node.shape().position_from_center(grid.snap(center).point);
        node.pinned = Some(snapped);
        node.set_position(snapped);

        let mut step = DragStep {
            moved: vec![anchor.clone()],
            blocked: Vec::new(),
        };

        for id in scene.selected_ids() {
            if &id == anchor {
                continue;
            }
            let Ok(node) = scene.node_mut(&id) else {
                continue;
            };
            let candidate = node.temp_position + delta;
            let margin = node.shape().boundary_margin();
            if candidate.x - margin <= 0.0 || candidate.y - margin <= 0.0 {
                log::warn!("Node {id} held at the canvas edge during drag");
                step.blocked.push(id);
                continue;
            }
            let center = node.shape().center_from_position(candidate);
            let snapped = node.shape().position_from_center(grid.snap(center).point);
            node.pinned = Some(snapped);
            node.set_position(snapped);
            step.moved.push(id);
        }
        Some((step, guides))
    }

    /// Release: finish the active gesture and return to idle.
    ///
    /// A drag records every selected node's position as its next baseline;
    /// pins are left in place. A marquee commits its selection.
    pub fn release(&mut self, scene: &mut Scene) {
        match std::mem::take(&mut self.state) {
            GestureState::Idle => {}
            GestureState::MarqueeSelect => {
                self.marquee.finish(scene);
            }
            GestureState::PrimaryDrag { anchor, .. } => {
                for id in scene.selected_ids() {
                    if let Ok(node) = scene.node_mut(&id) {
                        node.temp_position = node.position();
                    }
                }
                log::debug!("Drag on {anchor} finished");
            }
        }
    }

    /// Pointer left the canvas: a marquee is abandoned, a drag carries on.
    pub fn leave(&mut self) {
        if self.state == GestureState::MarqueeSelect {
            self.marquee.cancel();
            self.state = GestureState::Idle;
        }
    }
}
