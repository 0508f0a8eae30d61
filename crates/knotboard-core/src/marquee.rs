//! Rubber-band selection.

use crate::scene::{NodeId, Scene};
use kurbo::{Point, Rect};

/// Marquee gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MarqueeState {
    #[default]
    Idle,
    Selecting {
        start: Point,
        /// `None` until the pointer moves.
        end: Option<Point>,
    },
}

/// Selects every node fully inside a dragged rectangle.
#[derive(Debug, Clone, Default)]
pub struct MarqueeSelector {
    state: MarqueeState,
}

impl MarqueeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MarqueeState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, MarqueeState::Selecting { .. })
    }

    /// Start a marquee at `start`, clearing the current node selection.
    pub fn begin(&mut self, scene: &mut Scene, start: Point) {
        scene.clear_selection();
        self.state = MarqueeState::Selecting { start, end: None };
        log::debug!("Marquee started at {start:?}");
    }

    /// Track the pointer. Dragging toward the top-left nudges the end point
    /// one unit further so the release does not land on the start.
    pub fn update(&mut self, pointer: Point) {
        if let MarqueeState::Selecting { start, end } = &mut self.state {
            let mut p = pointer;
            if start.x > p.x {
                p.x -= 1.0;
                p.y -= 1.0;
            }
            *end = Some(p);
        }
    }

    /// Current rectangle, if a marquee is active.
    pub fn rect(&self) -> Option<Rect> {
        match self.state {
            MarqueeState::Idle => None,
            MarqueeState::Selecting { start, end } => {
                Some(Rect::from_points(start, end.unwrap_or(start)))
            }
        }
    }

    /// Commit: add every fully contained node to the selection.
    ///
    /// Returns the newly matched ids; empty when no marquee was active.
    pub fn finish(&mut self, scene: &mut Scene) -> Vec<NodeId> {
        let Some(area) = self.rect() else {
            return Vec::new();
        };
        self.state = MarqueeState::Idle;
        let hits = scene.nodes_within(area);
        scene.select(hits.iter(), true);
        log::debug!("Marquee {area:?} selected {} node(s)", hits.len());
        hits
    }

    /// Abandon the marquee without touching the selection.
    pub fn cancel(&mut self) {
        if self.is_selecting() {
            log::debug!("Marquee cancelled");
        }
        self.state = MarqueeState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use crate::shapes::{Circle, Rectangle};

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene
            .add_node(Node::new("r", Rectangle::new(40.0, 30.0).unwrap(), Point::new(100.0, 100.0)).unwrap())
            .unwrap();
        scene
            .add_node(Node::new("c", Circle::new(20.0).unwrap(), Point::new(300.0, 300.0)).unwrap())
            .unwrap();
        scene
    }

    #[test]
    fn test_selects_fully_contained() {
        let mut scene = scene();
        let mut marquee = MarqueeSelector::new();
        marquee.begin(&mut scene, Point::new(90.0, 90.0));
        marquee.update(Point::new(150.0, 140.0));
        let hits = marquee.finish(&mut scene);
        assert_eq!(hits, vec![NodeId::from("r")]);
        assert!(scene.is_selected(&NodeId::from("r")));
        assert!(!marquee.is_selecting());
    }

    #[test]
    fn test_partial_overlap_not_selected() {
        let mut scene = scene();
        let mut marquee = MarqueeSelector::new();
        marquee.begin(&mut scene, Point::new(0.0, 0.0));
        marquee.update(Point::new(300.0, 300.0));
        assert_eq!(marquee.finish(&mut scene), vec![NodeId::from("r")]);
    }

    #[test]
    fn test_reverse_drag_nudges_end() {
        let mut scene = scene();
        let mut marquee = MarqueeSelector::new();
        marquee.begin(&mut scene, Point::new(400.0, 400.0));
        marquee.update(Point::new(250.0, 250.0));
        assert_eq!(marquee.rect(), Some(Rect::new(249.0, 249.0, 400.0, 400.0)));
        assert_eq!(marquee.finish(&mut scene), vec![NodeId::from("c")]);
    }

    #[test]
    fn test_begin_clears_selection() {
        let mut scene = scene();
        scene.select_all();
        let mut marquee = MarqueeSelector::new();
        marquee.begin(&mut scene, Point::new(0.0, 0.0));
        assert_eq!(scene.selection_len(), 0);
    }

    #[test]
    fn test_click_without_move_is_degenerate() {
        let mut scene = scene();
        let mut marquee = MarqueeSelector::new();
        marquee.begin(&mut scene, Point::new(5.0, 5.0));
        assert_eq!(marquee.rect(), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert!(marquee.finish(&mut scene).is_empty());
    }

    #[test]
    fn test_cancel_leaves_selection() {
        let mut scene = scene();
        let mut marquee = MarqueeSelector::new();
        marquee.begin(&mut scene, Point::new(0.0, 0.0));
        marquee.update(Point::new(1000.0, 1000.0));
        marquee.cancel();
        assert!(marquee.finish(&mut scene).is_empty());
        assert_eq!(scene.selection_len(), 0);
    }
}
