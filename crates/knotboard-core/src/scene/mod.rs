//! Scene model: the nodes, links and selection of one diagram.

mod draft;
mod link;
mod node;

pub use draft::{DraftNode, TEMP_ID_PREFIX};
pub use link::{DEFAULT_LINK_STROKE, Link, LinkId, LinkStroke, LinkStyle};
pub use node::{DEFAULT_NODE_FILL, DEFAULT_NODE_STROKE, Node, NodeId, NodeMeta, NodeStyle};

use crate::error::{SceneError, SceneResult};
use crate::shapes::NodeShape;
use kurbo::{Point, Rect};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Links that share the same `(source, target)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelLinks {
    pub count: usize,
    /// Labels of the grouped links, joined with `、`.
    pub labels: String,
}

/// The aggregate that owns every node and link of a diagram.
///
/// Nodes are keyed by id and iterated in insertion order; links keep their
/// insertion order. Every link endpoint resolves to a resident node except
/// when a caller bypasses [`Scene::remove_node`] policy, which this type
/// never does itself.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    /// Insertion order of nodes.
    order: Vec<NodeId>,
    links: Vec<Link>,
    selection: BTreeSet<NodeId>,
    link_selection: BTreeSet<LinkId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node with `id` exists.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node.
    pub fn node(&self, id: &NodeId) -> SceneResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.clone()))
    }

    /// Look up a node for mutation.
    ///
    /// Callers that move the node must go through [`Node::set_position`] so
    /// the center stays in sync.
    pub fn node_mut(&mut self, id: &NodeId) -> SceneResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.clone()))
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Mutable access to every node, in no particular order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Links in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Link by id.
    pub fn link(&self, id: &LinkId) -> SceneResult<&Link> {
        self.links
            .iter()
            .find(|l| &l.id == id)
            .ok_or_else(|| SceneError::LinkNotFound(id.clone()))
    }

    /// Links with `node` at either end.
    pub fn links_of<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.touches(node))
    }

    /// Insert a node. Ids are unique.
    pub fn add_node(&mut self, node: Node) -> SceneResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(SceneError::DuplicateNode(node.id));
        }
        log::debug!("Adding node {} ({})", node.id, node.kind());
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Remove a node that no link references.
    ///
    /// Fails with [`SceneError::NodeReferenced`] otherwise; use
    /// [`Scene::remove_node_cascade`] to drop the links too.
    pub fn remove_node(&mut self, id: &NodeId) -> SceneResult<Node> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::NodeNotFound(id.clone()));
        }
        let links: Vec<LinkId> = self.links_of(id).map(|l| l.id.clone()).collect();
        if !links.is_empty() {
            log::warn!("Refusing to remove node {id}: {} link(s) still attached", links.len());
            return Err(SceneError::NodeReferenced {
                node: id.clone(),
                links,
            });
        }
        self.detach_node(id)
    }

    /// Remove a node together with every link touching it.
    pub fn remove_node_cascade(&mut self, id: &NodeId) -> SceneResult<(Node, Vec<Link>)> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::NodeNotFound(id.clone()));
        }
        let (removed, kept): (Vec<Link>, Vec<Link>) =
            std::mem::take(&mut self.links).into_iter().partition(|l| l.touches(id));
        self.links = kept;
        for link in &removed {
            self.link_selection.remove(&link.id);
        }
        let node = self.detach_node(id)?;
        log::debug!("Removed node {id} and {} link(s)", removed.len());
        Ok((node, removed))
    }

    fn detach_node(&mut self, id: &NodeId) -> SceneResult<Node> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.clone()))?;
        self.order.retain(|other| other != id);
        self.selection.remove(id);
        log::debug!("Removed node {id}");
        Ok(node)
    }

    /// Insert a link whose endpoints are both resident.
    pub fn add_link(&mut self, link: Link) -> SceneResult<()> {
        if self.links.iter().any(|l| l.id == link.id) {
            return Err(SceneError::DuplicateLink(link.id));
        }
        for end in [&link.source, &link.target] {
            if !self.nodes.contains_key(end) {
                log::warn!("Link {} rejected: missing endpoint {end}", link.id);
                return Err(SceneError::DanglingLink {
                    link: link.id.clone(),
                    node: end.clone(),
                });
            }
        }
        log::debug!("Adding link {} ({} -> {})", link.id, link.source, link.target);
        self.links.push(link);
        Ok(())
    }

    /// Remove a link, dropping it from the link selection.
    pub fn remove_link(&mut self, id: &LinkId) -> SceneResult<Link> {
        let index = self
            .links
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| SceneError::LinkNotFound(id.clone()))?;
        self.link_selection.remove(id);
        log::debug!("Removed link {id}");
        Ok(self.links.remove(index))
    }

    /// Links whose endpoints are missing, as `(link, missing node)` pairs.
    pub fn dangling_links(&self) -> Vec<(LinkId, NodeId)> {
        self.links
            .iter()
            .flat_map(|l| {
                [&l.source, &l.target]
                    .into_iter()
                    .filter(|end| !self.nodes.contains_key(*end))
                    .map(|end| (l.id.clone(), end.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Move a node's anchor; the center is recomputed for its kind.
    ///
    /// The drag baseline follows the new position, and so does the pin if the
    /// node is pinned.
    pub fn update_node_position(&mut self, id: &NodeId, position: Point) -> SceneResult<()> {
        let node = self.node_mut(id)?;
        node.set_position(position);
        node.temp_position = position;
        if node.pinned.is_some() {
            node.pinned = Some(position);
        }
        Ok(())
    }

    /// Replace a node with a freshly built one of a different shape.
    ///
    /// Id, style, label, metadata and selection survive; the new node sits at
    /// the old node's center with no pin and a reset velocity.
    pub fn replace_node_shape(&mut self, id: &NodeId, shape: NodeShape) -> SceneResult<()> {
        let old = self.node(id)?;
        let mut fresh = Node::centered(id.clone(), shape, old.center())?;
        fresh.style = old.style.clone();
        fresh.label = old.label.clone();
        fresh.meta = old.meta.clone();
        log::debug!("Replacing node {id}: {} -> {}", old.kind(), fresh.kind());
        self.nodes.insert(id.clone(), fresh);
        Ok(())
    }

    /// Apply edited shape parameters.
    ///
    /// Same kind tag: geometry is edited in place. Different tag: the node is
    /// replaced. Returns `true` when the layout topology must be rebuilt.
    pub fn apply_shape_params(&mut self, id: &NodeId, shape: NodeShape) -> SceneResult<bool> {
        let node = self.node_mut(id)?;
        if node.kind() == shape.kind() {
            node.set_shape(shape)?;
            Ok(false)
        } else {
            self.replace_node_shape(id, shape)?;
            Ok(true)
        }
    }

    /// Next free `tempNodeId_<n>` id, starting from the node count.
    pub fn next_temp_id(&self) -> NodeId {
        let mut n = self.nodes.len();
        loop {
            let id = NodeId::new(format!("{TEMP_ID_PREFIX}{n}"));
            if !self.nodes.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Commit a draft at `drop_point`.
    ///
    /// Returns `Ok(None)` when the drop point lies outside the canvas
    /// (negative x or y), leaving the scene untouched.
    pub fn commit_draft(&mut self, draft: DraftNode, drop_point: Point) -> SceneResult<Option<NodeId>> {
        if drop_point.x < 0.0 || drop_point.y < 0.0 {
            log::debug!("Draft dropped outside the canvas at {drop_point:?}");
            return Ok(None);
        }
        let id = self.next_temp_id();
        let node = draft.into_node(id.clone(), drop_point)?;
        self.add_node(node)?;
        Ok(Some(id))
    }

    // Selection

    /// Select `ids`, replacing the current selection unless `additive`.
    ///
    /// Ids that are not resident are ignored.
    pub fn select<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>, additive: bool) {
        if !additive {
            self.selection.clear();
        }
        for id in ids {
            if self.nodes.contains_key(id) {
                self.selection.insert(id.clone());
            }
        }
    }

    /// Deselect every node.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every node.
    pub fn select_all(&mut self) {
        self.selection = self.nodes.keys().cloned().collect();
    }

    /// Flip membership of one node; returns whether it is now selected.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        if self.selection.remove(id) {
            false
        } else if self.nodes.contains_key(id) {
            self.selection.insert(id.clone());
            true
        } else {
            false
        }
    }

    /// Whether node `id` is selected.
    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selection.contains(id)
    }

    /// Selected node ids, sorted.
    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.selection.iter().cloned().collect()
    }

    /// Number of selected nodes.
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Select a link, replacing the link selection unless `additive`.
    pub fn select_link(&mut self, id: &LinkId, additive: bool) -> SceneResult<()> {
        self.link(id)?;
        if !additive {
            self.link_selection.clear();
        }
        self.link_selection.insert(id.clone());
        Ok(())
    }

    /// Deselect every link.
    pub fn clear_link_selection(&mut self) {
        self.link_selection.clear();
    }

    /// Whether link `id` is selected.
    pub fn is_link_selected(&self, id: &LinkId) -> bool {
        self.link_selection.contains(id)
    }

    /// Selected link ids, sorted.
    pub fn selected_link_ids(&self) -> Vec<LinkId> {
        self.link_selection.iter().cloned().collect()
    }

    /// Ids of nodes whose bounds lie fully inside `area`.
    pub fn nodes_within(&self, area: Rect) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| {
                let b = n.bounds();
                b.x0 >= area.x0 && b.y0 >= area.y0 && b.x1 <= area.x1 && b.y1 <= area.y1
            })
            .map(|n| n.id.clone())
            .collect()
    }

    // Pins

    /// Clear the pins of `ids`; unknown ids are ignored.
    pub fn release<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) {
        for id in ids {
            if let Some(node) = self.nodes.get_mut(id) {
                node.pinned = None;
            }
        }
    }

    /// Clear every pin.
    pub fn release_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.pinned = None;
        }
    }

    /// Group links by `(source, target)`.
    pub fn parallel_links(&self) -> BTreeMap<(NodeId, NodeId), ParallelLinks> {
        let mut groups: BTreeMap<(NodeId, NodeId), ParallelLinks> = BTreeMap::new();
        for link in &self.links {
            let label = link.label.as_deref().unwrap_or_default();
            groups
                .entry((link.source.clone(), link.target.clone()))
                .and_modify(|g| {
                    g.count += 1;
                    g.labels.push('、');
                    g.labels.push_str(label);
                })
                .or_insert_with(|| ParallelLinks {
                    count: 1,
                    labels: label.to_string(),
                });
        }
        groups
    }

    /// Union of all node bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes().map(Node::bounds).reduce(|a, b| a.union(b))
    }
}
