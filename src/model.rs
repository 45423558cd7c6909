use crate::error::{InputError, TreeError};
use generational_arena::{Arena, Index};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Internal(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    data_size: u64,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leaf byte count, or the sum over all descendant leaves.
    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Internal(children) => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub fn is_empty(&self) -> bool {
        self.is_leaf() && self.data_size == 0
    }
}

/// Synthetic description of a sized hierarchy.
///
/// Nodes with children take their size from the children; `size` only
/// matters for leaves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn leaf(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            children: Vec::new(),
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            children,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, InputError> {
        let text =
            fs::read_to_string(path).map_err(|source| InputError::from_io(path.into(), source))?;
        serde_json::from_str(&text).map_err(|source| InputError::Malformed {
            path: path.into(),
            source,
        })
    }
}

/// Arena-backed tree of sized items. Every internal node caches the sum of
/// its children's sizes.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Arena<Node>,
    root: NodeId,
    separator: String,
}

impl Tree {
    pub(crate) fn with_root(name: String, kind: NodeKind, data_size: u64) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Node {
            name,
            data_size,
            parent: None,
            kind,
        }));

        Self {
            arena,
            root,
            separator: "/".to_string(),
        }
    }

    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut tree = Self::with_root(spec.name.clone(), NodeKind::Leaf, spec.size);
        let mut pending: Vec<(NodeId, &NodeSpec)> = spec
            .children
            .iter()
            .rev()
            .map(|child| (tree.root, child))
            .collect();

        while let Some((parent, child)) = pending.pop() {
            let id = tree.attach(parent, child.name.clone(), child.size);
            pending.extend(child.children.iter().rev().map(|grandchild| (id, grandchild)));
        }
        tree.settle_sizes();
        tree
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Appends a new leaf under `parent`, turning `parent` into an internal
    /// node if needed. Sizes are not refreshed until [`Tree::settle_sizes`].
    pub(crate) fn attach(&mut self, parent: NodeId, name: String, data_size: u64) -> NodeId {
        let id = NodeId(self.arena.insert(Node {
            name,
            data_size,
            parent: Some(parent),
            kind: NodeKind::Leaf,
        }));

        if let Some(parent_node) = self.arena.get_mut(parent.0) {
            match &mut parent_node.kind {
                NodeKind::Internal(children) => children.push(id),
                NodeKind::Leaf => parent_node.kind = NodeKind::Internal(vec![id]),
            }
        }

        id
    }

    /// Recomputes every cached size bottom-up and turns childless containers
    /// into empty leaves.
    pub(crate) fn settle_sizes(&mut self) {
        // Pre-order puts every node before its descendants, so walking it
        // backwards settles children before their parent.
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id));
        }

        for id in order.into_iter().rev() {
            let Some(NodeKind::Internal(children)) = self.node(id).map(Node::kind) else {
                continue;
            };
            let total = children
                .iter()
                .fold(0_u64, |sum, child| sum.saturating_add(self.data_size(*child)));
            let childless = children.is_empty();

            if let Some(node) = self.arena.get_mut(id.0) {
                if childless {
                    node.kind = NodeKind::Leaf;
                }
                node.data_size = total;
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    pub fn data_size(&self, id: NodeId) -> u64 {
        self.node(id).map_or(0, Node::data_size)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[][..], Node::children)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_leaf)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Names from the root down to `id`, joined with the tree's separator.
    pub fn label(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.node(id)) {
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        names.join(&self.separator)
    }

    /// Leaves under `id` in depth-first, left-to-right order.
    pub fn leaves(&self, id: NodeId) -> Leaves<'_> {
        let stack = if self.node(id).is_some() {
            vec![id]
        } else {
            Vec::new()
        };
        Leaves { tree: self, stack }
    }

    pub fn grow_leaf(&mut self, id: NodeId) -> Result<u64, TreeError> {
        let size = self.leaf_size(id)?;
        self.set_leaf_size(id, size.saturating_add(one_percent(size)))
    }

    /// Shrinks by 1 %, never below one byte. Empty leaves stay empty.
    pub fn shrink_leaf(&mut self, id: NodeId) -> Result<u64, TreeError> {
        let size = self.leaf_size(id)?;
        if size == 0 {
            return Ok(0);
        }
        self.set_leaf_size(id, size.saturating_sub(one_percent(size)).max(1))
    }

    pub fn remove_leaf(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.leaf_size(id)?;
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }

        let Some(node) = self.arena.remove(id.0) else {
            return Err(TreeError::UnknownNode);
        };
        let Some(parent) = node.parent else {
            return Ok(());
        };

        if let Some(parent_node) = self.arena.get_mut(parent.0) {
            if let NodeKind::Internal(children) = &mut parent_node.kind {
                children.retain(|child| *child != id);
                if children.is_empty() {
                    parent_node.kind = NodeKind::Leaf;
                    parent_node.data_size = 0;
                }
            }
        }

        self.refresh_ancestors(parent);
        Ok(())
    }

    fn leaf_size(&self, id: NodeId) -> Result<u64, TreeError> {
        let node = self.node(id).ok_or(TreeError::UnknownNode)?;
        if !node.is_leaf() {
            return Err(TreeError::NotALeaf(self.label(id)));
        }
        Ok(node.data_size)
    }

    fn set_leaf_size(&mut self, id: NodeId, size: u64) -> Result<u64, TreeError> {
        let node = self.arena.get_mut(id.0).ok_or(TreeError::UnknownNode)?;
        node.data_size = size;
        if let Some(parent) = node.parent {
            self.refresh_ancestors(parent);
        }
        Ok(size)
    }

    /// Re-sums `id` and every node above it.
    fn refresh_ancestors(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let total = self
                .children(id)
                .iter()
                .fold(0_u64, |sum, child| sum.saturating_add(self.data_size(*child)));

            let Some(node) = self.arena.get_mut(id.0) else {
                return;
            };
            if !node.is_leaf() {
                node.data_size = total;
            }
            current = node.parent;
        }
    }
}

fn one_percent(size: u64) -> u64 {
    size / 100 + u64::from(size % 100 != 0)
}

/// Lazy depth-first leaf walk; clone it to restart from the same point.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            match &node.kind {
                NodeKind::Leaf => return Some(id),
                NodeKind::Internal(children) => self.stack.extend(children.iter().rev()),
            }
        }
        None
    }
}
