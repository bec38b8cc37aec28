//! Errors raised by the interactive tree editor.

use thiserror::Error;

use super::NodeId;

/// An invalid mutation request.
///
/// The tree is left exactly as it was before the rejected call.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StructuralError {
    /// The id does not name a node of this tree.
    #[error("no node with id {id}")]
    UnknownNode { id: NodeId },

    /// The node is a condition where a logic node is required.
    #[error("node {id} is a condition and cannot have children")]
    NotALogicNode { id: NodeId },

    /// The node is a logic node where a condition is required.
    #[error("node {id} is a logic node, not a condition")]
    NotACondition { id: NodeId },

    /// The root can only be cleared, never removed.
    #[error("the root node cannot be removed")]
    RootRemoval,

    /// The root has no parent to move out of.
    #[error("the root node cannot be moved")]
    RootMove,

    /// The target is the node itself or one of its descendants.
    #[error("cannot move node {node} under {target}: it would become its own ancestor")]
    WouldCreateCycle { node: NodeId, target: NodeId },
}
