//! Store — arena of materialized tree [`Node`]s keyed by [`NodeId`].
//!
//! The store is the single source of truth for the tree; the UI reads from it,
//! never from backend responses directly. Parent links are ids, so a node can
//! be looked up in O(1) and its path rebuilt in O(depth).

use crate::types::{Context, Ident, NodeId, Scalar};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Child slot of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    /// Never fetched (or discarded after an interrupted search).
    Unloaded,
    /// Fetched; possibly a scoped-search subset of `all_children`.
    Loaded(Vec<NodeId>),
    /// Terminal level, nothing below.
    Leaf,
}

/// What the tree shows for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Collapsed,
    Loading,
    Expanded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Display text of `value`.
    pub name: String,
    pub value: Scalar,
    pub level: Ident,
    /// 0 for roots.
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Ancestor filters plus this node's own `(level, value)`.
    pub context: Context,
    pub count: u64,
    pub children: Children,
    /// Unfiltered child set, recorded once by the first unfiltered load.
    pub all_children: Option<Vec<NodeId>>,
    pub expanded: bool,
    pub loading: bool,
    pub search_active: bool,
    pub search_term: String,
    /// Token of the newest request issued for this node.
    pub(crate) request_seq: u64,
    /// Token of the unfiltered child load still in flight, if any.
    pub(crate) unfiltered_seq: Option<u64>,
}

impl Node {
    /// Build a node for `value` at `level` below `parent` (`None` for a root).
    pub fn new(level: Ident, value: Scalar, count: u64, parent: Option<&Node>, leaf: bool) -> Self {
        let name = value.to_string();
        let (id, context, depth, parent_id) = match parent {
            Some(p) => (
                NodeId::child(level.as_str(), &p.id, &name),
                p.context.with(level.clone(), value.clone()),
                p.depth + 1,
                Some(p.id.clone()),
            ),
            None => (
                NodeId::root(level.as_str(), &name),
                Context::new().with(level.clone(), value.clone()),
                0,
                None,
            ),
        };
        Self {
            id,
            name,
            value,
            level,
            depth,
            parent: parent_id,
            context,
            count,
            children: if leaf { Children::Leaf } else { Children::Unloaded },
            all_children: None,
            expanded: false,
            loading: false,
            search_active: false,
            search_term: String::new(),
            request_seq: 0,
            unfiltered_seq: None,
        }
    }

    pub fn state(&self) -> NodeState {
        if self.loading {
            NodeState::Loading
        } else if self.expanded {
            NodeState::Expanded
        } else {
            NodeState::Collapsed
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.children, Children::Leaf)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.children, Children::Loaded(_))
    }

    /// Currently visible child ids; empty when unloaded or a leaf.
    pub fn child_ids(&self) -> &[NodeId] {
        match &self.children {
            Children::Loaded(ids) => ids,
            _ => &[],
        }
    }

    /// The child slot to fall back to when a filter is dropped.
    pub(crate) fn unfiltered_children(&self) -> Children {
        match (&self.children, &self.all_children) {
            (Children::Leaf, _) => Children::Leaf,
            (_, Some(all)) => Children::Loaded(all.clone()),
            (_, None) => Children::Unloaded,
        }
    }
}

// ---------------------------------------------------------------------------
// NodeStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct NodeStore {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Drop every node and start over from a new root forest.
    pub fn reset_roots(&mut self, roots: Vec<Node>) {
        self.nodes.clear();
        self.roots = self.insert_children(roots);
    }

    /// Insert freshly fetched nodes, returning their ids in order.
    ///
    /// A node already in the arena is kept as is, so re-fetching (e.g. a
    /// filtered child set) never resets the state of a materialized subtree.
    pub fn insert_children(&mut self, nodes: Vec<Node>) -> Vec<NodeId> {
        nodes
            .into_iter()
            .map(|node| {
                let id = node.id.clone();
                self.nodes.entry(id.clone()).or_insert(node);
                id
            })
            .collect()
    }

    /// Ancestors of `id` followed by the node itself, root first.
    pub fn path(&self, id: &NodeId) -> Vec<&Node> {
        let mut path = Vec::new();
        let mut cursor = self.nodes.get(id);
        while let Some(node) = cursor {
            path.push(node);
            cursor = node.parent.as_ref().and_then(|p| self.nodes.get(p));
        }
        path.reverse();
        path
    }

    /// Rows of the tree view: roots, then the visible children of every
    /// expanded node, depth first.
    pub fn visible(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.walk(&self.roots, &mut out, &|node| {
            if node.expanded {
                node.child_ids()
            } else {
                &[]
            }
        });
        out
    }

    /// Every node reachable through loaded child sets, depth first, ignoring
    /// expansion and preferring the unfiltered set.
    pub fn materialized(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk(&self.roots, &mut out, &|node| match &node.all_children {
            Some(all) => all.as_slice(),
            None => node.child_ids(),
        });
        out
    }

    fn walk<'a>(
        &'a self,
        ids: &'a [NodeId],
        out: &mut Vec<&'a Node>,
        children: &dyn Fn(&'a Node) -> &'a [NodeId],
    ) {
        for id in ids {
            if let Some(node) = self.nodes.get(id) {
                out.push(node);
                self.walk(children(node), out, children);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
