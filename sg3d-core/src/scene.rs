//! Scene graph of transform nodes.
//!
//! Nodes are stored in an arena owned by [`SceneGraph`] and addressed by
//! [`NodeId`] handles. Ownership flows from parent to child through the
//! `children` list; the `parent` link is a plain handle used for detaching
//! and never keeps a node alive on its own.
//!
//! World matrices are recomputed by [`SceneGraph::propagate`], a depth-first
//! pre-order pass. They are only meaningful right after such a pass; any edit
//! made through the graph in between leaves them stale (see
//! [`SceneGraph::is_propagated`]). Every mutating method takes `&mut self`, so
//! the tree cannot change shape while a traversal is running.

use log::{debug, trace};
use nalgebra::Matrix4;
use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, SceneError};
use crate::transform::Transform;

new_key_type! {
    /// Handle to a node stored in a [`SceneGraph`].
    pub struct NodeId;
}

/// Where a node currently sits in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// The designated entry point for propagation
    Root,
    Attached(NodeId),
    /// Parentless and not the root; unreachable from a root pass
    Unattached,
}

/// A node in the scene tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: Option<String>,
    transform: Option<Transform>,
    local_matrix: Matrix4<f32>,
    world_matrix: Matrix4<f32>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(transform: Option<Transform>) -> Self {
        Self {
            name: None,
            transform,
            local_matrix: Matrix4::identity(),
            world_matrix: Matrix4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `None` for pure grouping nodes.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Local matrix as of the last propagation pass.
    pub fn local_matrix(&self) -> &Matrix4<f32> {
        &self.local_matrix
    }

    /// World matrix as of the last propagation pass.
    pub fn world_matrix(&self) -> &Matrix4<f32> {
        &self.world_matrix
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in draw order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed transform hierarchy with one designated root.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    revision: u64,
    propagated_revision: Option<u64>,
}

impl SceneGraph {
    /// Create a graph holding only the root, a grouping node without a transform.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let mut root_node = SceneNode::new(None);
        root_node.name = Some("root".to_string());
        let root = nodes.insert(root_node);

        Self {
            nodes,
            root,
            revision: 0,
            propagated_revision: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Create an unattached node.
    pub fn add_node(&mut self, transform: Option<Transform>) -> NodeId {
        let id = self.nodes.insert(SceneNode::new(transform));
        self.touch();
        trace!("Added node {:?}", id);
        id
    }

    /// Create a node and attach it under `parent`.
    pub fn spawn(&mut self, parent: NodeId, transform: Option<Transform>) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.add_node(transform);
        self.attach(id, Some(parent))?;
        Ok(id)
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    /// Move `node` under `parent`, or detach it when `parent` is `None`.
    ///
    /// The node is first removed from its current parent's children, then
    /// appended to the new parent's. Attaching to the current parent again is
    /// a no-op and keeps the child order as it was.
    ///
    /// # Errors
    ///
    /// Fails without touching the tree when either handle is unknown, when
    /// `node` is the root, or when `parent` is `node` or one of its
    /// descendants.
    pub fn attach(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<()> {
        let current = self.node(node)?.parent;

        match parent {
            Some(parent) => {
                self.node(parent)?;
                if node == self.root {
                    return Err(SceneError::RootAttachment);
                }
                if current == Some(parent) {
                    return Ok(());
                }
                if node == parent || self.is_ancestor(node, parent) {
                    return Err(SceneError::CycleDetected { node, parent });
                }
            }
            None if current.is_none() => return Ok(()),
            None => {}
        }

        if let Some(old) = current {
            if let Some(old_parent) = self.nodes.get_mut(old) {
                old_parent.children.retain(|&child| child != node);
            }
        }
        if let Some(parent) = parent {
            self.nodes[parent].children.push(node);
        }
        self.nodes[node].parent = parent;
        self.touch();

        debug!("Attached {:?}: {:?} -> {:?}", node, current, parent);
        Ok(())
    }

    /// Remove `node` from its parent, leaving it unattached.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        self.attach(node, None)
    }

    /// Delete `node` together with its whole subtree.
    ///
    /// Returns the removed handles in depth-first order. Handles held
    /// elsewhere become unknown afterwards.
    pub fn remove(&mut self, node: NodeId) -> Result<Vec<NodeId>> {
        if node == self.root {
            return Err(SceneError::RootRemoval);
        }
        self.detach(node)?;

        let removed: Vec<NodeId> = self.depth_first(node).collect();
        for &id in &removed {
            self.nodes.remove(id);
        }
        self.touch();

        debug!("Removed {:?} ({} nodes)", node, removed.len());
        Ok(removed)
    }

    /// Whether `ancestor` appears on the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn state(&self, node: NodeId) -> Result<NodeState> {
        let parent = self.node(node)?.parent;
        Ok(match parent {
            Some(parent) => NodeState::Attached(parent),
            None if node == self.root => NodeState::Root,
            None => NodeState::Unattached,
        })
    }

    /// Mutable access to a node's transform for in-place edits.
    ///
    /// Counts as an edit: world matrices are stale until the next pass.
    pub fn transform_mut(&mut self, node: NodeId) -> Result<&mut Transform> {
        let has_transform = self.node(node)?.transform.is_some();
        if !has_transform {
            return Err(SceneError::MissingTransform(node));
        }
        self.touch();
        self.nodes[node]
            .transform
            .as_mut()
            .ok_or(SceneError::MissingTransform(node))
    }

    /// Replace the transform; `None` turns the node into a grouping node.
    pub fn set_transform(&mut self, node: NodeId, transform: Option<Transform>) -> Result<()> {
        self.node_mut(node)?.transform = transform;
        self.touch();
        Ok(())
    }

    pub fn local_matrix(&self, node: NodeId) -> Result<&Matrix4<f32>> {
        Ok(&self.node(node)?.local_matrix)
    }

    pub fn world_matrix(&self, node: NodeId) -> Result<&Matrix4<f32>> {
        Ok(&self.node(node)?.world_matrix)
    }

    /// Recompute local and world matrices for the subtree rooted at `node`.
    ///
    /// Each node's local matrix is rebuilt from its transform (identity for
    /// grouping nodes) and its world matrix becomes `parent_world * local`,
    /// or just `local` when no parent matrix is given. Parents are always
    /// computed before their children; siblings are visited in child order.
    pub fn propagate(&mut self, node: NodeId, parent_world: Option<&Matrix4<f32>>) -> Result<()> {
        self.node(node)?;
        self.propagate_subtree(node, parent_world.copied());
        Ok(())
    }

    /// Per-frame pass: propagate from the root with no parent matrix.
    pub fn update_world_matrices(&mut self) {
        self.propagate_subtree(self.root, None);
    }

    fn propagate_subtree(&mut self, node: NodeId, parent_world: Option<Matrix4<f32>>) {
        let from_root = node == self.root && parent_world.is_none();
        let mut stack: Vec<(NodeId, Option<Matrix4<f32>>)> = vec![(node, parent_world)];
        let mut visited = 0usize;

        while let Some((id, parent_world)) = stack.pop() {
            visited += 1;
            debug_assert!(visited <= self.nodes.len(), "scene graph contains a cycle");

            let Some(current) = self.nodes.get_mut(id) else {
                continue;
            };

            match &current.transform {
                Some(transform) => transform.write_local_matrix(&mut current.local_matrix),
                None => current.local_matrix = Matrix4::identity(),
            }

            current.world_matrix = match parent_world {
                Some(parent_world) => parent_world * current.local_matrix,
                None => current.local_matrix,
            };

            let world = current.world_matrix;
            for &child in current.children.iter().rev() {
                stack.push((child, Some(world)));
            }
        }

        // Matrices only count as current after a plain pass from the root
        if from_root {
            self.propagated_revision = Some(self.revision);
        }
        trace!("Propagated {} nodes from {:?}", visited, node);
    }

    /// Whether world matrices reflect every edit made through the graph.
    pub fn is_propagated(&self) -> bool {
        self.propagated_revision == Some(self.revision)
    }

    /// Iterate the subtree rooted at `start` in depth-first pre-order.
    pub fn depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        let stack = if self.nodes.contains_key(start) {
            vec![start]
        } else {
            Vec::new()
        };
        DepthFirst { graph: self, stack }
    }

    /// Iterate every node reachable from the root, in draw order.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        self.depth_first(self.root)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over node handles, see [`SceneGraph::depth_first`].
pub struct DepthFirst<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.graph.nodes.get(id) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(id)
    }
}
