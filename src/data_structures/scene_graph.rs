//! Scene graph and hierarchical scene organization.
//!
//! The graph is an arena: nodes live in one `Vec` and refer to each other
//! through [`NodeId`] handles. Every graph has an unnamed root. A node has at
//! most one parent, children are kept in insertion order, and world
//! transforms are composed on demand from the root down.
//!
//! Names are looked up through an index that is filled as nodes are inserted
//! or renamed. Nodes are never removed, so the index never goes stale.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use cgmath::{Matrix4, Vector3};
use log::warn;
use thiserror::Error;

use crate::data_structures::{
    instance::Instance,
    model::{Attachment, Colour, Fog},
};

/// Stable handle to a node of a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("no node named `{0}` in the scene graph")]
    NodeNotFound(String),
    #[error("node name `{name}` is ambiguous: {count} nodes carry it")]
    AmbiguousName { name: String, count: usize },
    #[error("node {0:?} already has a parent")]
    AlreadyParented(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the root node cannot become a child")]
    IsRoot,
    #[error("unknown node handle {0:?}")]
    UnknownNode(NodeId),
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: Option<String>,
    pub local: Instance,
    pub attachment: Option<Attachment>,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// An empty transform node, like a three.js `Group`.
    pub fn group() -> Self {
        Self {
            name: None,
            local: Instance::new(),
            attachment: None,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_attachment(attachment: impl Into<Attachment>) -> Self {
        Self {
            attachment: Some(attachment.into()),
            ..Self::group()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.local.position = position;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::group()
    }
}

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

fn next_graph_id() -> u64 {
    NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug)]
pub struct SceneGraph {
    id: u64,
    nodes: Vec<SceneNode>,
    names: HashMap<String, Vec<NodeId>>,
    pub background: Colour,
    pub fog: Option<Fog>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            id: next_graph_id(),
            nodes: vec![SceneNode::group()],
            names: HashMap::new(),
            background: Colour::BLACK,
            fog: None,
        }
    }

    /// Process-wide unique identity of this graph. Clones get a fresh one.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // the root is always there
        false
    }

    /// Inserts a detached node. Attach it with [`add_child`](Self::add_child).
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        node.children.clear();
        if let Some(name) = &node.name {
            self.index_name(name.clone(), id);
        }
        self.nodes.push(node);
        id
    }

    /// Inserts `node` and attaches it under `parent`.
    pub fn add(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId, SceneError> {
        self.check(parent)?;
        let id = self.add_node(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check(parent)?;
        self.check(child)?;
        if child == self.root() {
            return Err(SceneError::IsRoot);
        }
        if self.nodes[child.0].parent.is_some() {
            return Err(SceneError::AlreadyParented(child));
        }
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(SceneError::Cycle { parent, child });
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id))
    }

    /// Mutable access to a node. Renaming through this reference bypasses the
    /// name index; use [`set_name`](Self::set_name) instead.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    pub fn local(&self, id: NodeId) -> Result<&Instance, SceneError> {
        self.node(id).map(|n| &n.local)
    }

    pub fn local_mut(&mut self, id: NodeId) -> Result<&mut Instance, SceneError> {
        self.node_mut(id).map(|n| &mut n.local)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        self.node(id).map(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        self.node(id).map(|n| n.children.as_slice())
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        let name = name.into();
        let old = self.node_mut(id)?.name.replace(name.clone());
        if let Some(old) = old {
            if let Some(ids) = self.names.get_mut(&old) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.names.remove(&old);
                }
            }
        }
        self.index_name(name, id);
        Ok(())
    }

    /// The unique node called `name` anywhere in the graph.
    pub fn find(&self, name: &str) -> Result<NodeId, SceneError> {
        self.find_by_name(self.root(), name)
    }

    /// The unique node called `name` in the subtree rooted at `root` (inclusive).
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Result<NodeId, SceneError> {
        self.check(root)?;
        let matches: Vec<NodeId> = self
            .names
            .get(name)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|&id| id == root || self.ancestors(id).any(|a| a == root))
                    .collect()
            })
            .unwrap_or_default();
        match matches.as_slice() {
            [] => Err(SceneError::NodeNotFound(name.to_string())),
            [id] => Ok(*id),
            _ => Err(SceneError::AmbiguousName {
                name: name.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Walks from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.nodes.get(id.0).and_then(|n| n.parent);
        std::iter::successors(start, move |current| self.nodes[current.0].parent)
    }

    /// Depth-first, pre-order walk of the subtree rooted at `root` (inclusive).
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.nodes.get(root.0).is_none() {
            warn!("descendants of unknown node {:?} requested", root);
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Whether `id` and all its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        match self.nodes.get(id.0) {
            Some(node) if node.visible => self.ancestors(id).all(|a| self.nodes[a.0].visible),
            _ => false,
        }
    }

    /**
     * Composes the local transforms from the root down to `id`.
     *
     * The root's own local transform is included, so moving the root moves
     * the whole scene.
     */
    pub fn world_matrix(&self, id: NodeId) -> Result<Matrix4<f32>, SceneError> {
        let node = self.node(id)?;
        let mut ancestors = self.ancestors(id);
        let Some(parent) = ancestors.next() else {
            return Ok(node.local.to_matrix());
        };
        let world = ancestors.fold(&self.nodes[parent.0].local * &node.local, |acc, ancestor| {
            self.nodes[ancestor.0].local.to_matrix() * acc
        });
        Ok(world)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vector3<f32>, SceneError> {
        self.world_matrix(id).map(|m| m.w.truncate())
    }

    /// Every node with its world matrix, computed in one pre-order pass from the root.
    pub fn world_matrices(&self) -> Vec<(NodeId, Matrix4<f32>)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), Matrix4::from_scale(1.0))];
        while let Some((id, parent)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent * node.local.to_matrix();
            out.push((id, world));
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
        out
    }

    fn check(&self, id: NodeId) -> Result<(), SceneError> {
        self.node(id).map(|_| ())
    }

    fn index_name(&mut self, name: String, id: NodeId) {
        let ids = self.names.entry(name.clone()).or_default();
        if !ids.is_empty() {
            warn!(
                "node name `{}` is now used by {} nodes; lookups covering both will be ambiguous",
                name,
                ids.len() + 1
            );
        }
        ids.push(id);
    }
}

impl Clone for SceneGraph {
    fn clone(&self) -> Self {
        Self {
            id: next_graph_id(),
            nodes: self.nodes.clone(),
            names: self.names.clone(),
            background: self.background,
            fog: self.fog,
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_unnamed_and_parentless() {
        let graph = SceneGraph::new();
        let root = graph.root();
        assert_eq!(graph.parent(root), Ok(None));
        assert!(graph.node(root).unwrap().name.is_none());
    }

    #[test]
    fn renaming_updates_the_index() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let id = graph.add(root, SceneNode::group().named("a")).unwrap();
        graph.set_name(id, "b").unwrap();
        assert_eq!(graph.find("b"), Ok(id));
        assert_eq!(graph.find("a"), Err(SceneError::NodeNotFound("a".into())));
    }

    #[test]
    fn clones_get_their_own_identity() {
        let graph = SceneGraph::new();
        let copy = graph.clone();
        assert_ne!(graph.id(), copy.id());
        assert_ne!(graph.id(), SceneGraph::new().id());
    }

    #[test]
    fn child_world_matrix_is_parent_times_local() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let mut parent = SceneNode::group().at(Vector3::new(1.0, 0.0, 0.0));
        parent.local.scale = Vector3::new(2.0, 2.0, 2.0);
        let parent = graph.add(root, parent).unwrap();
        let child = graph
            .add(parent, SceneNode::group().at(Vector3::new(0.0, 3.0, 0.0)))
            .unwrap();
        // the root is the identity here, so only one product is involved
        let expected = graph.local(parent).unwrap() * graph.local(child).unwrap();
        assert_eq!(graph.world_matrix(child), Ok(expected));
        assert_eq!(graph.world_position(child).unwrap(), Vector3::new(1.0, 6.0, 0.0));
    }
}
