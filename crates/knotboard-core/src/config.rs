//! Editor configuration.
//!
//! Every section deserializes with defaults, so a config file only needs the
//! keys it overrides:
//!
//! ```
//! # use knotboard_core::config::EditorConfig;
//! let config = EditorConfig::from_json_str(r#"{ "grid": { "spacing": 50 } }"#).unwrap();
//! assert_eq!(config.grid.spacing, 50.0);
//! assert_eq!(config.grid.threshold, 5.0);
//! ```

use crate::connector::{DEFAULT_MARKER_GAP, FALLBACK_INSET, MarkerParams};
use crate::scene::{DEFAULT_NODE_FILL, DEFAULT_NODE_STROKE, DraftNode, NodeStyle};
use crate::shapes::{Circle, NodeShape, Polygon, PolygonFlavor, Rectangle, ShapeKind};
use crate::snap::{DEFAULT_GRID_SPACING, DEFAULT_SNAP_THRESHOLD, Grid};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas: CanvasConfig,
    pub grid: GridConfig,
    pub connector: ConnectorConfig,
    pub layout: LayoutConfig,
    pub labels: LabelConfig,
    pub defaults: ShapeDefaults,
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.grid.spacing > 0.0) {
            return invalid(format!("grid.spacing must be > 0, got {}", self.grid.spacing));
        }
        if !(self.grid.threshold >= 0.0) {
            return invalid(format!(
                "grid.threshold must be >= 0, got {}",
                self.grid.threshold
            ));
        }
        if self.layout.tick_divider == 0 {
            return invalid("layout.tick_divider must be >= 1".to_string());
        }
        if !(self.layout.alpha_decay > 0.0 && self.layout.alpha_decay < 1.0) {
            return invalid(format!(
                "layout.alpha_decay must be in (0, 1), got {}",
                self.layout.alpha_decay
            ));
        }
        if !(0.0..=1.0).contains(&self.layout.velocity_decay) {
            return invalid(format!(
                "layout.velocity_decay must be in [0, 1], got {}",
                self.layout.velocity_decay
            ));
        }
        let margin = self.canvas.drag_margin;
        if !(margin >= 0.0) || self.canvas.width <= 2.0 * margin || self.canvas.height <= 2.0 * margin
        {
            return invalid(format!(
                "canvas {}x{} is too small for drag margin {margin}",
                self.canvas.width, self.canvas.height
            ));
        }
        Ok(())
    }
}

/// Size of the drawable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    /// Dragged pointers are kept this far inside the canvas edges.
    pub drag_margin: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 10000.0,
            height: 10000.0,
            drag_margin: 30.0,
        }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub spacing: f64,
    pub threshold: f64,
    pub enabled: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_GRID_SPACING,
            threshold: DEFAULT_SNAP_THRESHOLD,
            enabled: true,
        }
    }
}

impl From<GridConfig> for Grid {
    fn from(c: GridConfig) -> Self {
        Grid {
            spacing: c.spacing,
            threshold: c.threshold,
            enabled: c.enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub gap: f64,
    pub fallback_inset: f64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_MARKER_GAP,
            fallback_inset: FALLBACK_INSET,
        }
    }
}

impl From<ConnectorConfig> for MarkerParams {
    fn from(c: ConnectorConfig) -> Self {
        MarkerParams {
            gap: c.gap,
            fallback: c.fallback_inset,
        }
    }
}

/// Force simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Many-body strength; negative repels. Zero disables the force.
    pub charge_strength: f64,
    pub collide_radius: f64,
    pub collide_strength: f64,
    pub link_strength: f64,
    pub link_distance: f64,
    /// Report every Nth step to tick listeners.
    pub tick_divider: u32,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
    /// Alpha floor applied by a restart.
    pub restart_alpha: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            charge_strength: 0.0,
            collide_radius: 20.0,
            collide_strength: 0.01,
            link_strength: 0.01,
            link_distance: 30.0,
            tick_divider: 5,
            alpha_min,
            // Reaches alpha_min after ~300 steps.
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            restart_alpha: 0.3,
        }
    }
}

/// Gap between a shape and its label, per kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub circle_gap: f64,
    pub rectangle_gap: f64,
    pub polygon_gap: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            circle_gap: 20.0,
            rectangle_gap: 20.0,
            polygon_gap: 10.0,
        }
    }
}

impl LabelConfig {
    pub fn gap_for(&self, kind: ShapeKind) -> f64 {
        match kind {
            ShapeKind::Circle => self.circle_gap,
            ShapeKind::Rectangle => self.rectangle_gap,
            ShapeKind::Triangle | ShapeKind::Polygon => self.polygon_gap,
        }
    }
}

/// Parameters of freshly created example shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeDefaults {
    pub circle_radius: f64,
    pub rect_width: f64,
    pub rect_height: f64,
    pub triangle_radius: f64,
    pub polygon_sides: u32,
    pub polygon_radius: f64,
    pub fill: String,
    pub stroke: String,
}

impl Default for ShapeDefaults {
    fn default() -> Self {
        Self {
            circle_radius: Circle::DEFAULT_RADIUS,
            rect_width: Rectangle::DEFAULT_WIDTH,
            rect_height: Rectangle::DEFAULT_HEIGHT,
            triangle_radius: Polygon::DEFAULT_RADIUS,
            polygon_sides: Polygon::DEFAULT_SIDES,
            polygon_radius: Polygon::DEFAULT_RADIUS,
            fill: DEFAULT_NODE_FILL.to_string(),
            stroke: DEFAULT_NODE_STROKE.to_string(),
        }
    }
}

impl ShapeDefaults {
    /// Geometry for a new shape of `kind`. Not validated.
    pub fn shape(&self, kind: ShapeKind) -> NodeShape {
        match kind {
            ShapeKind::Circle => NodeShape::Circle(Circle {
                radius: self.circle_radius,
            }),
            ShapeKind::Rectangle => NodeShape::Rectangle(Rectangle {
                width: self.rect_width,
                height: self.rect_height,
                corner_radius_x: 0.0,
                corner_radius_y: 0.0,
            }),
            ShapeKind::Triangle => NodeShape::Polygon(Polygon {
                sides: 3,
                radius: self.triangle_radius,
                flavor: PolygonFlavor::Triangle,
            }),
            ShapeKind::Polygon => NodeShape::Polygon(Polygon {
                sides: self.polygon_sides,
                radius: self.polygon_radius,
                flavor: PolygonFlavor::Regular,
            }),
        }
    }

    /// Draft of a new shape with the configured paint.
    pub fn draft(&self, kind: ShapeKind) -> DraftNode {
        DraftNode::new(self.shape(kind)).with_style(NodeStyle {
            stroke: self.stroke.clone(),
            fill: self.fill.clone(),
        })
    }
}
