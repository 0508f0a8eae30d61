//! Velocity-Verlet style relaxation over the scene's nodes and links.

use super::forces::{Body, Collide, Force, Jiggle, LinkForce, ManyBody};
use super::{ForceLayout, StepStatus};
use crate::config::LayoutConfig;
use crate::scene::{NodeId, Scene};
use std::collections::HashMap;

/// Cooling force simulation.
///
/// Holds only topology (node ids in scene order, link index pairs) and the
/// cooling state; positions and velocities live on the scene's nodes and are
/// read and written back on every step.
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    config: LayoutConfig,
    ids: Vec<NodeId>,
    charge: ManyBody,
    collide: Collide,
    link: LinkForce,
    jiggle: Jiggle,
    alpha: f64,
    active: bool,
}

impl Default for ForceSimulation {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl ForceSimulation {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            charge: ManyBody {
                strength: config.charge_strength,
            },
            collide: Collide {
                radius: config.collide_radius,
                strength: config.collide_strength,
            },
            link: LinkForce::new(config.link_strength, config.link_distance, Vec::new(), 0),
            config,
            ids: Vec::new(),
            jiggle: Jiggle::default(),
            alpha: 1.0,
            active: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Number of bodies in the current topology.
    pub fn body_count(&self) -> usize {
        self.ids.len()
    }

    /// Link index pairs of the current topology.
    pub fn link_pairs(&self) -> &[(usize, usize)] {
        self.link.links()
    }

    fn gather(&self, scene: &Scene) -> Option<Vec<Body>> {
        self.ids
            .iter()
            .map(|id| {
                scene.node(id).ok().map(|node| Body {
                    position: node.position(),
                    velocity: node.velocity,
                    pinned: node.pinned,
                })
            })
            .collect()
    }
}

impl ForceLayout for ForceSimulation {
    fn rebuild(&mut self, scene: &Scene) {
        self.ids = scene.node_ids().to_vec();
        let index: HashMap<&NodeId, usize> =
            self.ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let pairs: Vec<(usize, usize)> = scene
            .links()
            .iter()
            .filter_map(|l| Some((*index.get(&l.source)?, *index.get(&l.target)?)))
            .collect();
        self.link = LinkForce::new(
            self.config.link_strength,
            self.config.link_distance,
            pairs,
            self.ids.len(),
        );
        self.jiggle = Jiggle::default();
        self.alpha = 1.0;
        self.active = !self.ids.is_empty();
        log::info!(
            "Layout rebuilt: {} node(s), {} link(s)",
            self.ids.len(),
            self.link.links().len()
        );
    }

    fn restart(&mut self) {
        if self.ids.is_empty() {
            return;
        }
        self.alpha = self.alpha.max(self.config.restart_alpha);
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn step(&mut self, scene: &mut Scene) -> StepStatus {
        if !self.active {
            return StepStatus::Idle;
        }
        let Some(mut bodies) = self.gather(scene) else {
            log::warn!("Layout topology is stale, rebuilding from the scene");
            self.rebuild(scene);
            return self.step(scene);
        };

        self.alpha += (0.0 - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;

        self.charge.apply(&mut bodies, alpha, &mut self.jiggle);
        self.collide.apply(&mut bodies, alpha, &mut self.jiggle);
        self.link.apply(&mut bodies, alpha, &mut self.jiggle);

        let keep = 1.0 - self.config.velocity_decay;
        for (id, body) in self.ids.iter().zip(bodies.iter_mut()) {
            match body.pinned {
                Some(pin) => {
                    body.position = pin;
                    body.velocity = kurbo::Vec2::ZERO;
                }
                None => {
                    body.velocity *= keep;
                    body.position += body.velocity;
                }
            }
            if let Ok(node) = scene.node_mut(id) {
                node.velocity = body.velocity;
                node.set_position(body.position);
            }
        }
        log::trace!("Layout step, alpha {alpha:.5}");

        if self.alpha < self.config.alpha_min {
            self.active = false;
            log::info!("Layout settled");
            StepStatus::Settled
        } else {
            StepStatus::Running { alpha }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Link, Node};
    use crate::shapes::{Circle, NodeGeometry, Rectangle};
    use kurbo::Point;

    fn chain() -> Scene {
        let mut scene = Scene::new();
        scene
            .add_node(Node::new("a", Circle::default(), Point::new(100.0, 100.0)).unwrap())
            .unwrap();
        scene
            .add_node(Node::new("b", Circle::default(), Point::new(400.0, 100.0)).unwrap())
            .unwrap();
        scene
            .add_node(Node::new("c", Rectangle::default(), Point::new(400.0, 400.0)).unwrap())
            .unwrap();
        scene.add_link(Link::new("ab", "a", "b")).unwrap();
        scene.add_link(Link::new("bc", "b", "c")).unwrap();
        scene
    }

    fn run(sim: &mut ForceSimulation, scene: &mut Scene) -> usize {
        let mut steps = 0;
        while sim.step(scene) != StepStatus::Settled {
            steps += 1;
            assert!(steps < 1000, "simulation never settled");
        }
        steps + 1
    }

    #[test]
    fn test_empty_rebuild_is_inactive() {
        let mut sim = ForceSimulation::default();
        let mut scene = Scene::new();
        sim.rebuild(&scene);
        assert!(!sim.is_active());
        assert_eq!(sim.step(&mut scene), StepStatus::Idle);
        sim.restart();
        assert!(!sim.is_active());
    }

    #[test]
    fn test_settles_after_about_300_steps() {
        let mut scene = chain();
        let mut sim = ForceSimulation::default();
        sim.rebuild(&scene);
        let steps = run(&mut sim, &mut scene);
        assert!((295..=305).contains(&steps), "{steps}");
        assert!(!sim.is_active());
    }

    #[test]
    fn test_links_pull_nodes_together() {
        let mut scene = chain();
        let before = scene
            .node(&NodeId::from("a"))
            .unwrap()
            .position()
            .distance(scene.node(&NodeId::from("b")).unwrap().position());
        let mut sim = ForceSimulation::default();
        sim.rebuild(&scene);
        run(&mut sim, &mut scene);
        let after = scene
            .node(&NodeId::from("a"))
            .unwrap()
            .position()
            .distance(scene.node(&NodeId::from("b")).unwrap().position());
        assert!(after < before, "{after} >= {before}");
    }

    #[test]
    fn test_pinned_node_never_moves() {
        let mut scene = chain();
        let pin = Point::new(100.0, 100.0);
        scene.node_mut(&NodeId::from("a")).unwrap().pinned = Some(pin);
        let mut sim = ForceSimulation::default();
        sim.rebuild(&scene);
        for _ in 0..50 {
            sim.step(&mut scene);
            let a = scene.node(&NodeId::from("a")).unwrap();
            assert_eq!(a.position(), pin);
            assert_eq!(a.velocity, kurbo::Vec2::ZERO);
        }
    }

    #[test]
    fn test_centers_follow_positions() {
        let mut scene = chain();
        let mut sim = ForceSimulation::default();
        sim.rebuild(&scene);
        for _ in 0..20 {
            sim.step(&mut scene);
        }
        for node in scene.nodes() {
            assert_eq!(node.center(), node.shape().center_from_position(node.position()));
        }
    }

    #[test]
    fn test_restart_reheats() {
        let mut scene = chain();
        let mut sim = ForceSimulation::default();
        sim.rebuild(&scene);
        run(&mut sim, &mut scene);
        sim.restart();
        assert!(sim.is_active());
        assert!((sim.alpha() - 0.3).abs() < 1e-12);
        assert!(matches!(sim.step(&mut scene), StepStatus::Running { .. }));
    }

    #[test]
    fn test_stale_topology_rebuilds() {
        let mut scene = chain();
        let mut sim = ForceSimulation::default();
        sim.rebuild(&scene);
        scene.remove_node_cascade(&NodeId::from("c")).unwrap();
        assert!(matches!(sim.step(&mut scene), StepStatus::Running { .. }));
        assert_eq!(sim.body_count(), 2);
        assert_eq!(sim.link_pairs(), &[(0, 1)]);
    }
}
