//! Force-directed layout.
//!
//! [`ForceLayout`] is the seam between the editor and a concrete simulation;
//! [`LayoutEngine`] adds the listener plumbing (throttled tick, settle) on
//! top of any implementation.

mod forces;
mod simulation;

pub use forces::{Body, Collide, Force, Jiggle, LinkForce, ManyBody};
pub use simulation::ForceSimulation;

use crate::scene::Scene;

/// Outcome of a single simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepStatus {
    /// Nothing to do: stopped, settled or empty.
    Idle,
    /// Positions moved; the simulation keeps cooling.
    Running { alpha: f64 },
    /// This step cooled the simulation below its stop threshold.
    Settled,
}

/// A relaxation that moves scene nodes step by step.
///
/// Implementations never own the scene; they read node state at each step
/// and write positions back. Nodes with a pin are held at the pin.
pub trait ForceLayout {
    /// Drop previous state and start over on the scene's current topology.
    fn rebuild(&mut self, scene: &Scene);

    /// Reheat without touching topology.
    fn restart(&mut self);

    /// Halt until the next rebuild or restart.
    fn stop(&mut self);

    /// Advance one step.
    fn step(&mut self, scene: &mut Scene) -> StepStatus;

    fn is_active(&self) -> bool;

    /// Current temperature.
    fn alpha(&self) -> f64;
}

type TickListener = Box<dyn FnMut(&Scene)>;
type SettledListener = Box<dyn FnMut()>;

/// Drives a [`ForceLayout`] and notifies listeners.
///
/// The tick listener only hears about every `tick_divider`-th step; the
/// skipped steps still move nodes. The settle listener fires once per
/// cooling run, or when [`LayoutEngine::stop`] interrupts one.
pub struct LayoutEngine<L: ForceLayout = ForceSimulation> {
    layout: L,
    tick_divider: u32,
    steps: u64,
    reported: bool,
    on_tick: Option<TickListener>,
    on_settled: Option<SettledListener>,
}

impl Default for LayoutEngine<ForceSimulation> {
    fn default() -> Self {
        Self::new(ForceSimulation::default(), 5)
    }
}

impl<L: ForceLayout> LayoutEngine<L> {
    /// Wrap `layout`; a zero divider is treated as one.
    pub fn new(layout: L, tick_divider: u32) -> Self {
        Self {
            layout,
            tick_divider: tick_divider.max(1),
            steps: 0,
            reported: false,
            on_tick: None,
            on_settled: None,
        }
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Register the throttled tick listener, replacing any previous one.
    pub fn on_tick(&mut self, listener: impl FnMut(&Scene) + 'static) {
        self.on_tick = Some(Box::new(listener));
    }

    /// Register the settle listener, replacing any previous one.
    pub fn on_settled(&mut self, listener: impl FnMut() + 'static) {
        self.on_settled = Some(Box::new(listener));
    }

    pub fn rebuild(&mut self, scene: &Scene) {
        self.steps = 0;
        self.layout.rebuild(scene);
    }

    pub fn restart(&mut self) {
        self.layout.restart();
    }

    /// Stop the layout; a running layout reports itself settled.
    pub fn stop(&mut self) {
        if self.layout.is_active() {
            self.layout.stop();
            self.notify_settled();
        }
    }

    pub fn is_active(&self) -> bool {
        self.layout.is_active()
    }

    /// Steps taken since the last rebuild.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether the last [`LayoutEngine::tick`] was a reported step.
    pub fn reported(&self) -> bool {
        self.reported
    }

    /// Advance one step and fire whichever listeners are due.
    pub fn tick(&mut self, scene: &mut Scene) -> StepStatus {
        let status = self.layout.step(scene);
        self.reported = false;
        if status == StepStatus::Idle {
            return status;
        }
        self.steps += 1;
        if self.steps % u64::from(self.tick_divider) == 0 {
            self.reported = true;
            if let Some(listener) = self.on_tick.as_mut() {
                listener(&*scene);
            }
        }
        if status == StepStatus::Settled {
            self.notify_settled();
        }
        status
    }

    /// Step until the layout settles or `max_steps` have run.
    ///
    /// Returns the number of steps taken.
    pub fn run_until_settled(&mut self, scene: &mut Scene, max_steps: usize) -> usize {
        let mut taken = 0;
        while taken < max_steps {
            match self.tick(scene) {
                StepStatus::Idle => break,
                StepStatus::Settled => {
                    taken += 1;
                    break;
                }
                StepStatus::Running { .. } => taken += 1,
            }
        }
        taken
    }

    fn notify_settled(&mut self) {
        if let Some(listener) = self.on_settled.as_mut() {
            listener();
        }
    }
}
