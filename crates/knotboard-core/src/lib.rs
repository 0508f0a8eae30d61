//! Knotboard Core Library
//!
//! Scene model, pointer gestures, connector geometry and force layout for the
//! knotboard node-and-link diagram editor. Rendering and document transport
//! live outside this crate.

pub mod config;
pub mod connector;
pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod frame;
pub mod input;
pub mod layout;
pub mod marquee;
pub mod scene;
pub mod shapes;
pub mod snap;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use connector::{MarkerParams, link_inset, marker_inset, rectangle_inset};
pub use document::{Document, LoadReport};
pub use drag::{DragController, DragGuides, DragStep, GestureState};
pub use editor::Editor;
pub use error::{SceneError, SceneResult};
pub use frame::{Frame, FrameBuilder};
pub use input::{Modifiers, PointerButton, PointerEvent, PointerTarget};
pub use layout::{ForceLayout, ForceSimulation, LayoutEngine, StepStatus};
pub use marquee::{MarqueeSelector, MarqueeState};
pub use scene::{DraftNode, Link, LinkId, Node, NodeId, Scene};
pub use shapes::{NodeGeometry, NodeShape, ShapeKind, regular_polygon_vertices};
pub use snap::{Grid, SnapResult, snap, snap_to_grid};
pub use viewport::Viewport;
