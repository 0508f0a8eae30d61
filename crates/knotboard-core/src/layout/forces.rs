//! The three forces of the diagram layout.
//!
//! Forces only accumulate into body velocities; the simulation integrates
//! positions afterwards.

use kurbo::{Point, Vec2};

/// Simulation view of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Point,
    pub velocity: Vec2,
    pub pinned: Option<Point>,
}

impl Body {
    /// Position after the pending velocity is applied.
    fn predicted(&self) -> Point {
        self.position + self.velocity
    }
}

/// Deterministic source of the tiny offsets used to separate coincident bodies.
#[derive(Debug, Clone)]
pub struct Jiggle {
    state: u64,
}

impl Default for Jiggle {
    fn default() -> Self {
        Self { state: 1 }
    }
}

impl Jiggle {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    /// Next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64 {
        self.state = (Self::A * self.state + Self::C) % Self::M;
        self.state as f64 / Self::M as f64
    }

    /// Next offset in `(-5e-7, 5e-7)`.
    pub fn next(&mut self) -> f64 {
        (self.next_unit() - 0.5) * 1e-6
    }

    /// `value`, or a jiggle when it is exactly zero.
    fn or_jiggle(&mut self, value: f64) -> f64 {
        if value == 0.0 { self.next() } else { value }
    }
}

/// A force acting on the bodies of one topology.
pub trait Force {
    /// Add this force's contribution to the body velocities.
    fn apply(&mut self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle);
}

/// Pairwise attraction (positive strength) or repulsion (negative).
#[derive(Debug, Clone, Copy)]
pub struct ManyBody {
    pub strength: f64,
}

impl Force for ManyBody {
    fn apply(&mut self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle) {
        if self.strength == 0.0 {
            return;
        }
        let snapshot: Vec<Point> = bodies.iter().map(|b| b.position).collect();
        for (i, body) in bodies.iter_mut().enumerate() {
            for (j, other) in snapshot.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut dx = other.x - snapshot[i].x;
                let mut dy = other.y - snapshot[i].y;
                let mut l = dx * dx + dy * dy;
                if dx == 0.0 {
                    dx = jiggle.next();
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = jiggle.next();
                    l += dy * dy;
                }
                if l < 1.0 {
                    l = l.sqrt();
                }
                let w = self.strength * alpha / l;
                body.velocity += Vec2::new(dx * w, dy * w);
            }
        }
    }
}

/// Keeps bodies at least `2 * radius` apart, softly.
#[derive(Debug, Clone, Copy)]
pub struct Collide {
    pub radius: f64,
    pub strength: f64,
}

impl Force for Collide {
    fn apply(&mut self, bodies: &mut [Body], _alpha: f64, jiggle: &mut Jiggle) {
        let reach = 2.0 * self.radius;
        for i in 0..bodies.len() {
            let pi = bodies[i].predicted();
            for j in (i + 1)..bodies.len() {
                let pj = bodies[j].predicted();
                let mut x = pi.x - pj.x;
                let mut y = pi.y - pj.y;
                let mut l = x * x + y * y;
                if l >= reach * reach {
                    continue;
                }
                if x == 0.0 {
                    x = jiggle.next();
                    l += x * x;
                }
                if y == 0.0 {
                    y = jiggle.next();
                    l += y * y;
                }
                let d = l.sqrt();
                let k = (reach - d) / d * self.strength;
                let push = Vec2::new(x * k, y * k) * 0.5;
                bodies[i].velocity += push;
                bodies[j].velocity -= push;
            }
        }
    }
}

/// Spring pulling linked bodies toward `distance` apart.
#[derive(Debug, Clone)]
pub struct LinkForce {
    pub strength: f64,
    pub distance: f64,
    /// `(source, target)` body indices.
    links: Vec<(usize, usize)>,
    /// Share of each correction taken by the target.
    bias: Vec<f64>,
}

impl LinkForce {
    pub fn new(strength: f64, distance: f64, links: Vec<(usize, usize)>, body_count: usize) -> Self {
        let mut degree = vec![0usize; body_count];
        for &(s, t) in &links {
            degree[s] += 1;
            degree[t] += 1;
        }
        let bias = links
            .iter()
            .map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
            .collect();
        Self {
            strength,
            distance,
            links,
            bias,
        }
    }

    pub fn links(&self) -> &[(usize, usize)] {
        &self.links
    }
}

impl Force for LinkForce {
    fn apply(&mut self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle) {
        for (&(s, t), &bias) in self.links.iter().zip(&self.bias) {
            let delta = bodies[t].predicted() - bodies[s].predicted();
            let x = jiggle.or_jiggle(delta.x);
            let y = jiggle.or_jiggle(delta.y);
            let l = x.hypot(y);
            let k = (l - self.distance) / l * alpha * self.strength;
            let correction = Vec2::new(x * k, y * k);
            bodies[t].velocity -= correction * bias;
            bodies[s].velocity += correction * (1.0 - bias);
        }
    }
}
