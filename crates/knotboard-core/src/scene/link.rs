//! Directed links between nodes.

use super::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque link identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for links drawn interactively.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LinkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Dash preset of a link stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "lowercase")]
pub enum LinkStroke {
    Solid { dash: f64, gap: f64 },
    Dashed { dash: f64, gap: f64 },
    Dotted { dash1: f64, dash2: f64, gap: f64 },
    Custom { pattern: String },
}

impl Default for LinkStroke {
    fn default() -> Self {
        Self::solid()
    }
}

impl LinkStroke {
    pub fn solid() -> Self {
        Self::Solid {
            dash: 10.0,
            gap: 0.0,
        }
    }

    pub fn dashed() -> Self {
        Self::Dashed { dash: 2.0, gap: 2.0 }
    }

    pub fn dotted() -> Self {
        Self::Dotted {
            dash1: 6.0,
            dash2: 6.0,
            gap: 2.0,
        }
    }

    pub fn custom() -> Self {
        Self::Custom {
            pattern: "8 8 8 8 2".to_string(),
        }
    }

    /// Document `type` tag of the preset.
    pub fn tag(&self) -> &'static str {
        match self {
            LinkStroke::Solid { .. } => "solid",
            LinkStroke::Dashed { .. } => "dashed",
            LinkStroke::Dotted { .. } => "dotted",
            LinkStroke::Custom { .. } => "customizeLine",
        }
    }

    /// SVG `stroke-dasharray` value.
    pub fn dasharray(&self) -> String {
        match self {
            LinkStroke::Solid { dash, gap } | LinkStroke::Dashed { dash, gap } => {
                format!("{dash} {gap}")
            }
            LinkStroke::Dotted { dash1, dash2, gap } => format!("{dash1} {dash2} {gap}"),
            LinkStroke::Custom { pattern } => pattern.clone(),
        }
    }

    /// Rebuild a preset from a document `type` tag and dash-array string.
    ///
    /// Unknown tags keep the raw pattern as a custom stroke; missing or
    /// malformed numbers fall back to the preset defaults.
    pub fn from_parts(tag: Option<&str>, dasharray: Option<&str>) -> Self {
        let numbers: Vec<f64> = dasharray
            .map(|s| {
                s.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|t| !t.is_empty())
                    .filter_map(|t| t.parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        match tag {
            None | Some("solid") => match numbers.as_slice() {
                [dash, gap] => LinkStroke::Solid { dash: *dash, gap: *gap },
                _ => LinkStroke::solid(),
            },
            Some("dashed") => match numbers.as_slice() {
                [dash, gap] => LinkStroke::Dashed { dash: *dash, gap: *gap },
                _ => LinkStroke::dashed(),
            },
            Some("dotted") => match numbers.as_slice() {
                [dash1, dash2, gap] => LinkStroke::Dotted {
                    dash1: *dash1,
                    dash2: *dash2,
                    gap: *gap,
                },
                _ => LinkStroke::dotted(),
            },
            Some(_) => match dasharray {
                Some(pattern) if !pattern.trim().is_empty() => LinkStroke::Custom {
                    pattern: pattern.trim().to_string(),
                },
                _ => LinkStroke::custom(),
            },
        }
    }
}

/// Default link color.
pub const DEFAULT_LINK_STROKE: &str = "#000000";

/// Paint of a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub color: String,
    pub fill: String,
    pub width: f64,
    pub stroke: LinkStroke,
    /// Inline CSS carried through from documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_LINK_STROKE.to_string(),
            fill: "transparent".to_string(),
            width: 1.0,
            stroke: LinkStroke::default(),
            css: None,
        }
    }
}

/// A directed connector from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub style: LinkStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Link {
    pub fn new(id: impl Into<LinkId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            style: LinkStyle::default(),
            label: None,
        }
    }

    /// Link with a generated id.
    pub fn between(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::new(LinkId::generate(), source, target)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether either end is `node`.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}
