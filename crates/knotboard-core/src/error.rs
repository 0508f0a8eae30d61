//! Error types shared by the scene, geometry and document layers.

use crate::scene::{LinkId, NodeId};
use thiserror::Error;

/// Errors raised by scene mutations, geometry helpers and document conversion.
///
/// None of these are fatal: the interaction loop keeps running and the caller
/// decides whether to surface them.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Link not found: {0}")]
    LinkNotFound(LinkId),
    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),
    #[error("Link already exists: {0}")]
    DuplicateLink(LinkId),
    #[error("Link {link} references missing node {node}")]
    DanglingLink { link: LinkId, node: NodeId },
    #[error("Node {node} is still referenced by {} link(s)", links.len())]
    NodeReferenced { node: NodeId, links: Vec<LinkId> },
    #[error("Document error: {0}")]
    Document(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SceneError {
    /// Shorthand for building an [`SceneError::InvalidGeometry`].
    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        SceneError::InvalidGeometry(msg.into())
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
