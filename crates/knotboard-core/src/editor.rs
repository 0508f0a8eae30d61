//! The editor facade: one scene plus the gesture, viewport and layout state
//! that act on it.

use crate::config::{ConfigError, EditorConfig};
use crate::drag::{DragBounds, DragController};
use crate::error::SceneResult;
use crate::frame::{Frame, FrameBuilder};
use crate::input::{PointerButton, PointerEvent, PointerTarget};
use crate::layout::{ForceLayout, ForceSimulation, LayoutEngine, StepStatus};
use crate::scene::{DraftNode, Link, LinkId, Node, NodeId, Scene};
use crate::shapes::{NodeShape, ShapeKind};
use crate::viewport::Viewport;
use kurbo::{Point, Size};

type FrameListener = Box<dyn FnMut(&Frame)>;

/// Owns a scene and routes pointer input and layout ticks through it.
///
/// Pointer events arrive in viewport coordinates and are converted to canvas
/// coordinates before they reach the drag controller. Topology changes made
/// through the editor rebuild the layout; position changes only reheat it.
pub struct Editor<L: ForceLayout = ForceSimulation> {
    scene: Scene,
    drag: DragController,
    viewport: Viewport,
    layout: LayoutEngine<L>,
    config: EditorConfig,
    on_frame: Option<FrameListener>,
}

impl Editor<ForceSimulation> {
    /// Create an editor over an empty scene.
    pub fn new(config: EditorConfig, viewport_size: Size) -> Result<Self, ConfigError> {
        let simulation = ForceSimulation::new(config.layout);
        Self::with_layout(config, viewport_size, simulation)
    }
}

impl<L: ForceLayout> Editor<L> {
    /// Create an editor driving a custom layout.
    pub fn with_layout(config: EditorConfig, viewport_size: Size, layout: L) -> Result<Self, ConfigError> {
        config.validate()?;
        let drag = DragController::new(DragBounds {
            canvas: config.canvas.size(),
            margin: config.canvas.drag_margin,
            grid: config.grid.into(),
        });
        Ok(Self {
            scene: Scene::new(),
            drag,
            viewport: Viewport::new(viewport_size, config.canvas.size()),
            layout: LayoutEngine::new(layout, config.layout.tick_divider),
            config,
            on_frame: None,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access. Call [`Editor::rebuild_layout`] after changing
    /// the node or link set this way.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Replace the scene and rebuild the layout on it.
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.drag = DragController::new(*self.drag.bounds());
        self.rebuild_layout();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layout(&self) -> &LayoutEngine<L> {
        &self.layout
    }

    // Input

    /// Dispatch one pointer event.
    ///
    /// Errors only come from presses on ids the scene does not hold; the
    /// editor state is unchanged in that case.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> SceneResult<()> {
        match event {
            PointerEvent::Down {
                position,
                button,
                target,
                modifiers,
            } => match button {
                PointerButton::Secondary => self.viewport.begin_pan(position),
                PointerButton::Middle => {}
                PointerButton::Primary => {
                    let point = self.viewport.screen_to_canvas(position);
                    let multi = modifiers.multi_select();
                    match target {
                        PointerTarget::Node(id) => {
                            self.drag.press_node(&mut self.scene, &id, point, multi)?;
                        }
                        PointerTarget::Link(id) => self.scene.select_link(&id, multi)?,
                        PointerTarget::Canvas if !multi => {
                            self.scene.clear_link_selection();
                            self.drag.press_canvas(&mut self.scene, point);
                        }
                        PointerTarget::Canvas => {}
                    }
                }
            },
            PointerEvent::Move { position } => {
                if self.viewport.update_pan(position) {
                    return Ok(());
                }
                let point = self.viewport.screen_to_canvas(position);
                if let Some(step) = self.drag.pointer_move(&mut self.scene, point) {
                    if !step.moved.is_empty() {
                        self.layout.restart();
                    }
                }
            }
            PointerEvent::Up { button, .. } => match button {
                PointerButton::Secondary => self.viewport.end_pan(),
                PointerButton::Middle => {}
                PointerButton::Primary => self.drag.release(&mut self.scene),
            },
            PointerEvent::Leave => {
                self.viewport.end_pan();
                self.drag.leave();
            }
        }
        Ok(())
    }

    // Layout

    /// Register the frame listener, called on every reported layout step.
    pub fn on_frame(&mut self, listener: impl FnMut(&Frame) + 'static) {
        self.on_frame = Some(Box::new(listener));
    }

    pub fn on_settled(&mut self, listener: impl FnMut() + 'static) {
        self.layout.on_settled(listener);
    }

    /// Advance the layout one step, emitting a frame when the step is due.
    pub fn tick(&mut self) -> StepStatus {
        let status = self.layout.tick(&mut self.scene);
        if self.layout.reported() && self.on_frame.is_some() {
            let frame = self.frame();
            if let Some(listener) = self.on_frame.as_mut() {
                listener(&frame);
            }
        }
        status
    }

    /// Tick until the layout settles or `max_steps` have run.
    pub fn run_until_settled(&mut self, max_steps: usize) -> usize {
        let mut taken = 0;
        while taken < max_steps {
            match self.tick() {
                StepStatus::Idle => break,
                StepStatus::Settled => return taken + 1,
                StepStatus::Running { .. } => taken += 1,
            }
        }
        taken
    }

    pub fn rebuild_layout(&mut self) {
        self.layout.rebuild(&self.scene);
    }

    pub fn restart_layout(&mut self) {
        self.layout.restart();
    }

    pub fn stop_layout(&mut self) {
        self.layout.stop();
    }

    /// Unpin `ids` and let the layout move them again.
    pub fn release<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) {
        self.scene.release(ids);
        self.layout.restart();
    }

    pub fn release_all(&mut self) {
        self.scene.release_all();
        self.layout.restart();
    }

    // Scene edits

    /// Draft of a new shape using the configured defaults.
    pub fn draft(&self, kind: ShapeKind) -> DraftNode {
        self.config.defaults.draft(kind)
    }

    /// Drop a draft at a viewport position.
    ///
    /// Returns the new node id, or `None` when the drop landed outside the
    /// canvas.
    pub fn commit_draft(&mut self, draft: DraftNode, screen: Point) -> SceneResult<Option<NodeId>> {
        let drop_point = self.viewport.screen_to_canvas(screen);
        let id = self.scene.commit_draft(draft, drop_point)?;
        if let Some(id) = &id {
            log::debug!("Committed draft as {id}");
            self.rebuild_layout();
        }
        Ok(id)
    }

    pub fn add_node(&mut self, node: Node) -> SceneResult<()> {
        self.scene.add_node(node)?;
        self.rebuild_layout();
        Ok(())
    }

    /// Remove a node together with its links.
    pub fn remove_node(&mut self, id: &NodeId) -> SceneResult<Vec<Link>> {
        let (_, links) = self.scene.remove_node_cascade(id)?;
        self.rebuild_layout();
        Ok(links)
    }

    pub fn add_link(&mut self, link: Link) -> SceneResult<()> {
        self.scene.add_link(link)?;
        self.rebuild_layout();
        Ok(())
    }

    pub fn remove_link(&mut self, id: &LinkId) -> SceneResult<Link> {
        let link = self.scene.remove_link(id)?;
        self.rebuild_layout();
        Ok(link)
    }

    /// Apply edited geometry to a node, replacing it when the kind changes.
    pub fn apply_shape_params(&mut self, id: &NodeId, shape: NodeShape) -> SceneResult<()> {
        if self.scene.apply_shape_params(id, shape)? {
            self.rebuild_layout();
        } else {
            self.layout.restart();
        }
        Ok(())
    }

    // Output

    /// Current render frame.
    pub fn frame(&self) -> Frame {
        FrameBuilder::new(&self.scene)
            .with_labels(self.config.labels)
            .with_marker(self.config.connector.into())
            .with_marquee(self.drag.marquee().rect())
            .with_guides(self.drag.guides())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::GestureState;
    use crate::input::Modifiers;
    use crate::shapes::{Circle, Rectangle};
    use kurbo::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn editor() -> Editor {
        let mut editor = Editor::new(EditorConfig::default(), Size::new(800.0, 600.0)).unwrap();
        let mut scene = Scene::new();
        scene
            .add_node(Node::new("a", Circle::new(20.0).unwrap(), Point::new(213.0, 187.0)).unwrap())
            .unwrap();
        scene
            .add_node(Node::new("b", Circle::new(20.0).unwrap(), Point::new(413.0, 187.0)).unwrap())
            .unwrap();
        scene
            .add_node(Node::new("r", Rectangle::new(40.0, 30.0).unwrap(), Point::new(313.0, 413.0)).unwrap())
            .unwrap();
        scene.add_link(Link::new("ab", "a", "b")).unwrap();
        editor.set_scene(scene);
        editor
    }

    fn down(p: (f64, f64), target: PointerTarget, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(p.0, p.1),
            button: PointerButton::Primary,
            target,
            modifiers,
        }
    }

    fn moved(p: (f64, f64)) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(p.0, p.1),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EditorConfig::default();
        config.layout.tick_divider = 0;
        assert!(Editor::new(config, Size::new(800.0, 600.0)).is_err());
    }

    #[test]
    fn test_multi_drag_then_release() {
        let mut editor = editor();
        editor.run_until_settled(1000);
        assert!(!editor.layout().is_active());
        let a0 = editor.scene().node(&id("a")).unwrap().position();
        let b0 = editor.scene().node(&id("b")).unwrap().position();

        editor
            .handle_pointer(down((a0.x, a0.y), PointerTarget::Node(id("a")), Modifiers::default()))
            .unwrap();
        editor
            .handle_pointer(down((b0.x, b0.y), PointerTarget::Node(id("b")), Modifiers::multi()))
            .unwrap();
        assert_eq!(editor.scene().selected_ids(), vec![id("a"), id("b")]);

        editor.handle_pointer(moved((b0.x + 37.0, b0.y + 41.0))).unwrap();
        assert!(editor.layout().is_active());
        assert!(editor.frame().guides.is_some());
        editor.handle_pointer(PointerEvent::release(Point::ZERO)).unwrap();
        assert!(editor.drag().is_idle());
        assert!(editor.frame().guides.is_none());

        let a = editor.scene().node(&id("a")).unwrap();
        let b = editor.scene().node(&id("b")).unwrap();
        assert!(a.is_pinned() && b.is_pinned());
        assert_eq!(a.temp_position, a.position());
        // Both nodes moved by the same pre-snap delta; snapping shifts each by at most the threshold.
        let da = a.position() - a0;
        let db = b.position() - b0;
        assert!((da - db).hypot() <= 2.0 * 5.0 * std::f64::consts::SQRT_2);
    }

    #[test]
    fn test_pinned_nodes_hold_under_layout() {
        let mut editor = editor();
        editor
            .handle_pointer(down((213.0, 187.0), PointerTarget::Node(id("a")), Modifiers::default()))
            .unwrap();
        editor.handle_pointer(moved((250.0, 250.0))).unwrap();
        editor.handle_pointer(PointerEvent::release(Point::ZERO)).unwrap();
        let pinned = editor.scene().node(&id("a")).unwrap().position();
        editor.run_until_settled(1000);
        assert_eq!(editor.scene().node(&id("a")).unwrap().position(), pinned);

        editor.release([&id("a")]);
        assert!(editor.layout().is_active());
        assert!(!editor.scene().node(&id("a")).unwrap().is_pinned());
    }

    #[test]
    fn test_canvas_click_clears_selections() {
        let mut editor = editor();
        editor
            .handle_pointer(down((0.0, 0.0), PointerTarget::Link(LinkId::from("ab")), Modifiers::default()))
            .unwrap();
        editor.scene_mut().select_all();
        assert!(editor.scene().is_link_selected(&LinkId::from("ab")));

        // With the modifier held, a canvas press is ignored.
        editor
            .handle_pointer(down((5.0, 5.0), PointerTarget::Canvas, Modifiers::multi()))
            .unwrap();
        assert_eq!(editor.scene().selection_len(), 3);

        editor
            .handle_pointer(down((5.0, 5.0), PointerTarget::Canvas, Modifiers::default()))
            .unwrap();
        assert_eq!(editor.scene().selection_len(), 0);
        assert!(editor.scene().selected_link_ids().is_empty());
        assert_eq!(editor.drag().state(), &GestureState::MarqueeSelect);
    }

    #[test]
    fn test_marquee_in_panned_viewport() {
        let mut editor = editor();
        editor.viewport_mut().pan_by(Vec2::new(-100.0, -100.0));
        editor
            .handle_pointer(down((0.0, 0.0), PointerTarget::Canvas, Modifiers::default()))
            .unwrap();
        editor.handle_pointer(moved((400.0, 200.0))).unwrap();
        assert_eq!(editor.frame().marquee, Some(kurbo::Rect::new(100.0, 100.0, 500.0, 300.0)));
        editor.handle_pointer(PointerEvent::release(Point::ZERO)).unwrap();
        assert_eq!(editor.scene().selected_ids(), vec![id("a"), id("b")]);
        assert!(editor.frame().marquee.is_none());
    }

    #[test]
    fn test_secondary_button_pans() {
        let mut editor = editor();
        editor
            .handle_pointer(PointerEvent::Down {
                position: Point::new(400.0, 300.0),
                button: PointerButton::Secondary,
                target: PointerTarget::Node(id("a")),
                modifiers: Modifiers::default(),
            })
            .unwrap();
        editor.handle_pointer(moved((350.0, 280.0))).unwrap();
        assert_eq!(editor.viewport().translation, Vec2::new(-50.0, -20.0));
        assert_eq!(editor.scene().selection_len(), 0);

        editor.handle_pointer(PointerEvent::Leave).unwrap();
        editor.handle_pointer(moved((0.0, 0.0))).unwrap();
        assert_eq!(editor.viewport().translation, Vec2::new(-50.0, -20.0));
    }

    #[test]
    fn test_unknown_target_is_error() {
        let mut editor = editor();
        let result = editor.handle_pointer(down((0.0, 0.0), PointerTarget::Node(id("zz")), Modifiers::default()));
        assert!(result.is_err());
        assert!(editor.drag().is_idle());
    }

    #[test]
    fn test_frames_are_throttled() {
        let mut editor = editor();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = frames.clone();
        editor.on_frame(move |frame| sink.borrow_mut().push(frame.nodes.len()));
        for _ in 0..12 {
            editor.tick();
        }
        assert_eq!(*frames.borrow(), vec![3, 3]);
    }

    #[test]
    fn test_commit_draft() {
        let mut editor = editor();
        let draft = editor.draft(ShapeKind::Polygon);
        let created = editor.commit_draft(draft, Point::new(600.0, 500.0)).unwrap();
        assert_eq!(created, Some(id("tempNodeId_3")));
        assert_eq!(editor.layout().layout().body_count(), 4);
        let node = editor.scene().node(&id("tempNodeId_3")).unwrap();
        assert_eq!(node.center(), Point::new(600.0, 500.0));

        editor.viewport_mut().pan_by(Vec2::new(-50.0, 0.0));
        let outside = editor.draft(ShapeKind::Circle);
        assert_eq!(editor.commit_draft(outside, Point::new(10.0, -1.0)).unwrap(), None);
        assert_eq!(editor.scene().node_count(), 4);
    }

    #[test]
    fn test_shape_change_rebuilds() {
        let mut editor = editor();
        editor.tick();
        editor.tick();
        assert_eq!(editor.layout().steps(), 2);
        let center = editor.scene().node(&id("r")).unwrap().center();
        editor
            .apply_shape_params(&id("r"), NodeShape::Circle(Circle::new(15.0).unwrap()))
            .unwrap();
        let node = editor.scene().node(&id("r")).unwrap();
        assert_eq!(node.kind(), ShapeKind::Circle);
        assert_eq!(node.center(), center);
        assert_eq!(editor.layout().steps(), 0);
    }

    #[test]
    fn test_remove_node_cascades_links() {
        let mut editor = editor();
        let removed = editor.remove_node(&id("a")).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(editor.scene().link_count(), 0);
        assert_eq!(editor.layout().layout().link_pairs().len(), 0);
    }
}
