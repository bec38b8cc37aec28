//! Canonical filter tree.
//!
//! The tree is an arena: nodes live in a map keyed by [`NodeId`], each node
//! stores its parent's id and each logic node stores the ordered ids of its
//! children. Ancestor and cycle checks are walks over parent ids.
//!
//! Invariants, holding after every completed mutation:
//! - the root is always a logic node; an empty filter is a root with no children
//! - only logic nodes have children
//! - every node except the root has exactly one parent, and no node is its
//!   own ancestor
//! - ids are never reused within one tree instance
//!
//! Trees are only mutated through [`FilterEditor`]. Read access is public.

mod editor;
mod error;
mod observer;
mod payload;

pub use editor::FilterEditor;
pub use error::StructuralError;
pub use observer::{TreeEvent, TreeObserver};
pub use payload::DragPayload;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operator::{BooleanOperator, ComparisonOperator};
use crate::types::{FieldPath, Literal};

/// Stable identifier of a node within one tree instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Returns the raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A comparison between a field and a literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: FieldPath,
    pub operator: ComparisonOperator,
    pub value: Literal,
}

impl Condition {
    pub fn new(
        field: impl Into<FieldPath>,
        operator: ComparisonOperator,
        value: impl Into<Literal>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Logic {
        operator: BooleanOperator,
        children: Vec<NodeId>,
    },
    Condition(Condition),
}

/// A node of the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    id: NodeId,
    parent: Option<NodeId>,
    enabled: bool,
    kind: NodeKind,
}

impl FilterNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The parent id, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's own enabled flag. Ancestors' flags are not consulted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_logic(&self) -> bool {
        matches!(self.kind, NodeKind::Logic { .. })
    }

    /// The boolean operator of a logic node.
    pub fn logic_operator(&self) -> Option<BooleanOperator> {
        match self.kind {
            NodeKind::Logic { operator, .. } => Some(operator),
            NodeKind::Condition(_) => None,
        }
    }

    /// The condition of a leaf node.
    pub fn as_condition(&self) -> Option<&Condition> {
        match &self.kind {
            NodeKind::Condition(condition) => Some(condition),
            NodeKind::Logic { .. } => None,
        }
    }

    /// Child ids in order; empty for conditions.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Logic { children, .. } => children,
            NodeKind::Condition(_) => &[],
        }
    }
}

/// An owned, id-free filter expression.
///
/// Used as the exchange form between the compiler, the serializer and the
/// arena.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Logic {
        operator: BooleanOperator,
        children: Vec<FilterExpr>,
    },
    Condition(Condition),
}

impl FilterExpr {
    pub fn logic(operator: BooleanOperator, children: Vec<FilterExpr>) -> Self {
        FilterExpr::Logic { operator, children }
    }

    pub fn and(children: Vec<FilterExpr>) -> Self {
        Self::logic(BooleanOperator::And, children)
    }

    pub fn or(children: Vec<FilterExpr>) -> Self {
        Self::logic(BooleanOperator::Or, children)
    }

    pub fn condition(
        field: impl Into<FieldPath>,
        operator: ComparisonOperator,
        value: impl Into<Literal>,
    ) -> Self {
        FilterExpr::Condition(Condition::new(field, operator, value))
    }
}

/// The canonical filter tree.
///
/// Cloning a tree produces an independent copy with the same ids.
#[derive(Debug, Clone)]
pub struct FilterTree {
    nodes: HashMap<NodeId, FilterNode>,
    root: NodeId,
    next_id: u64,
}

impl Default for FilterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterTree {
    /// Creates an empty filter: an `AND` root with no children.
    pub fn new() -> Self {
        Self::with_root_operator(BooleanOperator::And)
    }

    /// Creates an empty filter whose root uses `operator`.
    pub fn with_root_operator(operator: BooleanOperator) -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            root: NodeId(0),
            next_id: 0,
        };
        tree.root = tree.alloc(
            None,
            NodeKind::Logic {
                operator,
                children: Vec::new(),
            },
        );
        tree
    }

    /// Builds a tree from an expression. A condition is wrapped in an `AND` root.
    pub fn from_expr(expr: FilterExpr) -> Self {
        match expr {
            FilterExpr::Logic { operator, children } => {
                let mut tree = Self::with_root_operator(operator);
                let root = tree.root;
                for child in children {
                    let id = tree.graft(Some(root), child);
                    tree.push_child(root, id);
                }
                tree
            }
            condition @ FilterExpr::Condition(_) => {
                Self::from_expr(FilterExpr::and(vec![condition]))
            }
        }
    }

    /// The root id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root node.
    pub fn root_node(&self) -> &FilterNode {
        // The root is inserted on construction and never removed.
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: NodeId) -> Option<&FilterNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Child ids of `id`; empty for conditions and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(&id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// Returns true if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Depth of `id` below the root (the root is 0).
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes.get(&parent).and_then(|n| n.parent);
        }
        depth
    }

    /// All node ids in pre-order, starting at the root.
    pub fn depth_first(&self) -> Vec<NodeId> {
        self.subtree_ids(self.root)
    }

    /// Ids of `id` and all its descendants, in pre-order.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(&current) {
                continue;
            }
            out.push(current);
            if out.len() > self.nodes.len() {
                break;
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root_node().children().is_empty()
    }

    /// The whole tree as an expression, disabled nodes included.
    pub fn to_expr(&self) -> FilterExpr {
        self.expr_at(self.root, false)
            .unwrap_or_else(|| FilterExpr::and(Vec::new()))
    }

    /// The expression downstream consumers see: disabled nodes and their
    /// subtrees are dropped. Returns `None` when the root itself is disabled.
    pub fn enabled_expr(&self) -> Option<FilterExpr> {
        self.expr_at(self.root, true)
    }

    /// The subtree at `id` with disabled descendants dropped. The flag of
    /// `id` itself is ignored.
    pub fn enabled_subtree(&self, id: NodeId) -> Option<FilterExpr> {
        let node = self.nodes.get(&id)?;
        Some(match &node.kind {
            NodeKind::Condition(condition) => FilterExpr::Condition(condition.clone()),
            NodeKind::Logic { operator, children } => FilterExpr::Logic {
                operator: *operator,
                children: children
                    .iter()
                    .filter_map(|child| self.expr_at(*child, true))
                    .collect(),
            },
        })
    }

    fn expr_at(&self, id: NodeId, skip_disabled: bool) -> Option<FilterExpr> {
        let node = self.nodes.get(&id)?;
        if skip_disabled && !node.enabled {
            return None;
        }
        Some(match &node.kind {
            NodeKind::Condition(condition) => FilterExpr::Condition(condition.clone()),
            NodeKind::Logic { operator, children } => FilterExpr::Logic {
                operator: *operator,
                children: children
                    .iter()
                    .filter_map(|child| self.expr_at(*child, skip_disabled))
                    .collect(),
            },
        })
    }

    /// Compares shape, operators, conditions and enabled flags, ignoring ids.
    pub fn structurally_eq(&self, other: &FilterTree) -> bool {
        self.node_eq(self.root, other, other.root)
    }

    fn node_eq(&self, id: NodeId, other: &FilterTree, other_id: NodeId) -> bool {
        let (Some(a), Some(b)) = (self.nodes.get(&id), other.nodes.get(&other_id)) else {
            return false;
        };
        if a.enabled != b.enabled {
            return false;
        }
        match (&a.kind, &b.kind) {
            (NodeKind::Condition(x), NodeKind::Condition(y)) => x == y,
            (
                NodeKind::Logic {
                    operator: op_a,
                    children: children_a,
                },
                NodeKind::Logic {
                    operator: op_b,
                    children: children_b,
                },
            ) => {
                op_a == op_b
                    && children_a.len() == children_b.len()
                    && children_a
                        .iter()
                        .zip(children_b)
                        .all(|(x, y)| self.node_eq(*x, other, *y))
            }
            _ => false,
        }
    }

    // ==================== Arena primitives ====================

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut FilterNode> {
        self.nodes.get_mut(&id)
    }

    /// Allocates a detached, enabled node under `parent` with a fresh id.
    pub(crate) fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            FilterNode {
                id,
                parent,
                enabled: true,
                kind,
            },
        );
        id
    }

    /// Allocates `expr` as a subtree whose top node points at `parent`.
    ///
    /// The top node is not added to the parent's child list; see [`Self::attach`].
    pub(crate) fn graft(&mut self, parent: Option<NodeId>, expr: FilterExpr) -> NodeId {
        match expr {
            FilterExpr::Condition(condition) => {
                self.alloc(parent, NodeKind::Condition(condition))
            }
            FilterExpr::Logic { operator, children } => {
                let id = self.alloc(
                    parent,
                    NodeKind::Logic {
                        operator,
                        children: Vec::new(),
                    },
                );
                for child in children {
                    let child_id = self.graft(Some(id), child);
                    self.push_child(id, child_id);
                }
                id
            }
        }
    }

    fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(NodeKind::Logic { children, .. }) =
            self.nodes.get_mut(&parent).map(|n| &mut n.kind)
        {
            children.push(child);
        }
    }

    /// Inserts `id` into `parent`'s children at `position` (clamped).
    pub(crate) fn attach(&mut self, id: NodeId, parent: NodeId, position: usize) {
        if let Some(NodeKind::Logic { children, .. }) =
            self.nodes.get_mut(&parent).map(|n| &mut n.kind)
        {
            let position = position.min(children.len());
            children.insert(position, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
    }

    /// Removes `id` from its parent's child list, returning the old index.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<usize> {
        let parent = self.nodes.get(&id)?.parent?;
        let index = match self.nodes.get_mut(&parent).map(|n| &mut n.kind) {
            Some(NodeKind::Logic { children, .. }) => {
                let index = children.iter().position(|child| *child == id)?;
                children.remove(index);
                index
            }
            _ => return None,
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Some(index)
    }

    /// Deletes `id` and its descendants from the arena. The node must be
    /// detached first.
    pub(crate) fn drop_subtree(&mut self, id: NodeId) {
        for node in self.subtree_ids(id) {
            self.nodes.remove(&node);
        }
    }

    /// Checks every structural invariant. Used by tests.
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.nodes.get(&self.root) else {
            return false;
        };
        if root.parent.is_some() || !root.is_logic() {
            return false;
        }

        let reachable = self.depth_first();
        if reachable.len() != self.nodes.len() {
            return false;
        }

        reachable.iter().all(|id| {
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            node.id == *id
                && node.children().iter().all(|child| {
                    self.nodes.get(child).and_then(|c| c.parent) == Some(*id)
                })
        })
    }
}

#[cfg(test)]
mod tests;
