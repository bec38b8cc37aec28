//! Interactive editing of a filter tree.

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::mapping;
use crate::operator::{BooleanOperator, ComparisonOperator};
use crate::types::{FieldPath, Literal};

use super::{
    Condition, DragPayload, FilterNode, FilterTree, NodeId, NodeKind, StructuralError, TreeEvent,
    TreeObserver,
};

/// An editing session over one filter tree.
///
/// Every mutating method is all-or-nothing: it validates first, mutates
/// second, and notifies observers once after the tree is consistent again.
/// A rejected call returns an error and leaves the tree untouched.
///
/// # Example
///
/// ```
/// use vql_filter::operator::{BooleanOperator, ComparisonOperator};
/// use vql_filter::tree::FilterEditor;
///
/// let mut editor = FilterEditor::new();
/// let root = editor.tree().root();
/// let or = editor.add_logic(root, BooleanOperator::Or).unwrap();
/// editor.add_condition(or, "ref", ComparisonOperator::Equal, "A").unwrap();
/// editor.add_condition(or, "ref", ComparisonOperator::Equal, "G").unwrap();
/// assert_eq!(editor.tree().len(), 4);
/// ```
pub struct FilterEditor {
    tree: FilterTree,
    observers: Vec<Box<dyn TreeObserver>>,
    session: Uuid,
}

impl Default for FilterEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEditor")
            .field("session", &self.session)
            .field("nodes", &self.tree.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl FilterEditor {
    /// Starts a session on an empty tree.
    pub fn new() -> Self {
        Self::with_tree(FilterTree::new())
    }

    /// Starts a session that owns `tree`.
    pub fn with_tree(tree: FilterTree) -> Self {
        Self {
            tree,
            observers: Vec::new(),
            session: Uuid::new_v4(),
        }
    }

    pub fn tree(&self) -> &FilterTree {
        &self.tree
    }

    /// Ends the session and hands back the tree.
    pub fn into_tree(self) -> FilterTree {
        self.tree
    }

    /// The random id of this session, stamped on drag payloads.
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Registers an observer for all subsequent mutations.
    pub fn subscribe(&mut self, observer: impl TreeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: TreeEvent) {
        debug!(?event, nodes = self.tree.len(), "Filter tree changed");
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }

    fn rejected(&self, operation: &str, error: StructuralError) -> StructuralError {
        debug!(operation, %error, "Rejected filter tree edit");
        error
    }

    /// Resolves a stable id to its node.
    pub fn lookup(&self, id: NodeId) -> Result<&FilterNode, StructuralError> {
        self.tree
            .get(id)
            .ok_or(StructuralError::UnknownNode { id })
    }

    /// Checks that `id` names a logic node.
    fn require_logic(&self, id: NodeId) -> Result<(), StructuralError> {
        if self.lookup(id)?.is_logic() {
            Ok(())
        } else {
            Err(StructuralError::NotALogicNode { id })
        }
    }

    fn insert(&mut self, parent: NodeId, position: usize, kind: NodeKind) -> NodeId {
        let id = self.tree.alloc(Some(parent), kind);
        self.tree.attach(id, parent, position);
        let position = self
            .tree
            .children(parent)
            .iter()
            .position(|child| *child == id)
            .unwrap_or(position);
        self.emit(TreeEvent::Added {
            id,
            parent,
            position,
        });
        id
    }

    /// Appends an empty logic node under `parent`.
    pub fn add_logic(
        &mut self,
        parent: NodeId,
        operator: BooleanOperator,
    ) -> Result<NodeId, StructuralError> {
        if let Err(error) = self.require_logic(parent) {
            return Err(self.rejected("add_logic", error));
        }
        Ok(self.insert(
            parent,
            usize::MAX,
            NodeKind::Logic {
                operator,
                children: Vec::new(),
            },
        ))
    }

    /// Appends a condition under `parent`.
    pub fn add_condition(
        &mut self,
        parent: NodeId,
        field: impl Into<FieldPath>,
        operator: ComparisonOperator,
        value: impl Into<Literal>,
    ) -> Result<NodeId, StructuralError> {
        if let Err(error) = self.require_logic(parent) {
            return Err(self.rejected("add_condition", error));
        }
        let condition = Condition::new(field, operator, value);
        Ok(self.insert(parent, usize::MAX, NodeKind::Condition(condition)))
    }

    /// Detaches and drops `id` with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), StructuralError> {
        if let Err(error) = self.lookup(id) {
            return Err(self.rejected("remove", error));
        }
        if id == self.tree.root() {
            return Err(self.rejected("remove", StructuralError::RootRemoval));
        }
        self.tree.detach(id);
        self.tree.drop_subtree(id);
        self.emit(TreeEvent::Removed { ids: vec![id] });
        Ok(())
    }

    /// Reparents `id` under `new_parent` at `position`.
    ///
    /// `position` is an index into the new parent's children as they are
    /// once `id` has been taken out, clamped to the end.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        position: usize,
    ) -> Result<(), StructuralError> {
        if let Err(error) = self.validate_move(id, new_parent) {
            return Err(self.rejected("move", error));
        }
        let from = self.tree.get(id).and_then(FilterNode::parent).unwrap_or(new_parent);
        self.tree.detach(id);
        self.tree.attach(id, new_parent, position);
        let position = self
            .tree
            .children(new_parent)
            .iter()
            .position(|child| *child == id)
            .unwrap_or(position);
        self.emit(TreeEvent::Moved {
            id,
            from,
            to: new_parent,
            position,
        });
        Ok(())
    }

    fn validate_move(&self, id: NodeId, new_parent: NodeId) -> Result<(), StructuralError> {
        self.lookup(id)?;
        self.lookup(new_parent)?;
        if id == self.tree.root() {
            return Err(StructuralError::RootMove);
        }
        if new_parent == id || self.tree.is_ancestor(id, new_parent) {
            return Err(StructuralError::WouldCreateCycle {
                node: id,
                target: new_parent,
            });
        }
        self.require_logic(new_parent)
    }

    /// Sets the enabled flag of `id` only. Descendants keep their own flags.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<(), StructuralError> {
        if let Err(error) = self.lookup(id) {
            return Err(self.rejected("set_enabled", error));
        }
        if let Some(node) = self.tree.node_mut(id) {
            node.enabled = enabled;
        }
        self.emit(TreeEvent::EnabledChanged {
            id,
            enabled,
            recursive: false,
        });
        Ok(())
    }

    /// Sets the enabled flag of `id` and every descendant.
    pub fn set_enabled_recursive(
        &mut self,
        id: NodeId,
        enabled: bool,
    ) -> Result<(), StructuralError> {
        if let Err(error) = self.lookup(id) {
            return Err(self.rejected("set_enabled_recursive", error));
        }
        for node in self.tree.subtree_ids(id) {
            if let Some(node) = self.tree.node_mut(node) {
                node.enabled = enabled;
            }
        }
        self.emit(TreeEvent::EnabledChanged {
            id,
            enabled,
            recursive: true,
        });
        Ok(())
    }

    /// Changes the boolean operator of a logic node.
    pub fn set_logic_operator(
        &mut self,
        id: NodeId,
        operator: BooleanOperator,
    ) -> Result<(), StructuralError> {
        if let Err(error) = self.require_logic(id) {
            return Err(self.rejected("set_logic_operator", error));
        }
        if let Some(NodeKind::Logic {
            operator: current, ..
        }) = self.tree.node_mut(id).map(|node| &mut node.kind)
        {
            *current = operator;
        }
        self.emit(TreeEvent::Updated { id });
        Ok(())
    }

    /// Replaces any of the field, operator and value of a condition.
    pub fn update_condition(
        &mut self,
        id: NodeId,
        field: Option<FieldPath>,
        operator: Option<ComparisonOperator>,
        value: Option<Literal>,
    ) -> Result<(), StructuralError> {
        match self.lookup(id).map(FilterNode::is_logic) {
            Err(error) => return Err(self.rejected("update_condition", error)),
            Ok(true) => {
                return Err(self.rejected("update_condition", StructuralError::NotACondition { id }))
            }
            Ok(false) => {}
        }
        if let Some(NodeKind::Condition(condition)) =
            self.tree.node_mut(id).map(|node| &mut node.kind)
        {
            if let Some(field) = field {
                condition.field = field;
            }
            if let Some(operator) = operator {
                condition.operator = operator;
            }
            if let Some(value) = value {
                condition.value = value;
            }
        }
        self.emit(TreeEvent::Updated { id });
        Ok(())
    }

    /// Removes every child of the root.
    pub fn clear(&mut self) {
        let root = self.tree.root();
        for child in self.tree.children(root).to_vec() {
            self.tree.detach(child);
            self.tree.drop_subtree(child);
        }
        self.emit(TreeEvent::Cleared);
    }

    /// Swaps in a new tree, returning the previous one.
    ///
    /// Ids held for the previous tree are meaningless afterwards. The
    /// session id is renewed, so drag payloads taken before the swap drop
    /// as copies.
    pub fn replace(&mut self, tree: FilterTree) -> FilterTree {
        let previous = std::mem::replace(&mut self.tree, tree);
        self.session = Uuid::new_v4();
        self.emit(TreeEvent::Replaced);
        previous
    }

    /// Removes every condition on `field` and returns how many were removed.
    ///
    /// Logic nodes left empty are kept. No event is emitted when nothing matched.
    pub fn remove_field(&mut self, field: &FieldPath) -> usize {
        let matching: Vec<NodeId> = self
            .tree
            .depth_first()
            .into_iter()
            .filter(|id| {
                self.tree
                    .get(*id)
                    .and_then(FilterNode::as_condition)
                    .is_some_and(|condition| &condition.field == field)
            })
            .collect();

        for id in &matching {
            self.tree.detach(*id);
            self.tree.drop_subtree(*id);
        }

        let count = matching.len();
        if count > 0 {
            self.emit(TreeEvent::FieldRemoved {
                field: field.clone(),
                count,
            });
        }
        count
    }

    /// Grafts a canonical mapping as a new subtree under `parent`.
    ///
    /// The mapping is fully decoded before the tree is touched.
    pub fn insert_mapping(
        &mut self,
        parent: NodeId,
        position: usize,
        value: &Value,
    ) -> crate::Result<NodeId> {
        if let Err(error) = self.require_logic(parent) {
            return Err(self.rejected("insert_mapping", error).into());
        }
        let expr = mapping::expr_from_mapping(value)?;
        let id = self.tree.graft(Some(parent), expr);
        self.tree.attach(id, parent, position);
        let position = self
            .tree
            .children(parent)
            .iter()
            .position(|child| *child == id)
            .unwrap_or(position);
        self.emit(TreeEvent::Added {
            id,
            parent,
            position,
        });
        Ok(id)
    }

    /// Builds the payload describing a drag of `id`.
    pub fn drag_payload(&self, id: NodeId) -> Result<DragPayload, StructuralError> {
        let mapping = mapping::subtree_mapping(&self.tree, id)?;
        Ok(DragPayload {
            session: self.session,
            source: id,
            mapping,
        })
    }

    /// Drops a payload under `parent` at `position`.
    ///
    /// A payload from this session whose source node still exists moves that
    /// node. Any other payload, including one dragged from the root, inserts
    /// a copy of its mapping. Returns the id of the node now at the drop site.
    pub fn drop_payload(
        &mut self,
        payload: &DragPayload,
        parent: NodeId,
        position: usize,
    ) -> crate::Result<NodeId> {
        if payload.session == self.session
            && payload.source != self.tree.root()
            && self.tree.contains(payload.source)
        {
            self.move_node(payload.source, parent, position)?;
            return Ok(payload.source);
        }
        self.insert_mapping(parent, position, &payload.mapping)
    }
}
