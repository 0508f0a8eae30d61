//! Pointer events consumed by the editor.
//!
//! Hit testing happens outside the core: every press already carries the
//! resolved target (a node, a link or the empty canvas).

use crate::scene::{LinkId, NodeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Modifiers with only the multi-select key held.
    pub fn multi() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Whether the multi-select modifier (Ctrl, or Cmd on macOS) is held.
    pub fn multi_select(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What a press landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    Node(NodeId),
    Link(LinkId),
    Canvas,
}

/// Pointer event in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: PointerButton,
        target: PointerTarget,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: PointerButton,
    },
    /// The pointer left the canvas element.
    Leave,
}

impl PointerEvent {
    /// Primary-button press on `target` without modifiers.
    pub fn press(position: Point, target: PointerTarget) -> Self {
        PointerEvent::Down {
            position,
            button: PointerButton::Primary,
            target,
            modifiers: Modifiers::default(),
        }
    }

    /// Primary-button release.
    pub fn release(position: Point) -> Self {
        PointerEvent::Up {
            position,
            button: PointerButton::Primary,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => Some(*position),
            PointerEvent::Leave => None,
        }
    }
}
