//! Change notifications emitted by the editor.

use crate::types::FieldPath;

use super::NodeId;

/// A completed mutation.
///
/// Exactly one event is emitted per successful mutating call, after every
/// tree invariant holds again. Rejected calls emit nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// A node (and its subtree) was inserted under `parent`.
    Added {
        id: NodeId,
        parent: NodeId,
        position: usize,
    },
    /// Subtrees were detached and dropped.
    Removed { ids: Vec<NodeId> },
    /// A node changed parent or position.
    Moved {
        id: NodeId,
        from: NodeId,
        to: NodeId,
        position: usize,
    },
    /// One or more nodes had their enabled flag set.
    EnabledChanged {
        id: NodeId,
        enabled: bool,
        recursive: bool,
    },
    /// A node's operator, field or value changed.
    Updated { id: NodeId },
    /// Every condition on `field` was removed.
    FieldRemoved { field: FieldPath, count: usize },
    /// The root lost all its children.
    Cleared,
    /// The whole tree was swapped for another one.
    Replaced,
}

/// Receives editor events.
///
/// Implemented for every `FnMut(&TreeEvent)` closure.
pub trait TreeObserver {
    fn notify(&mut self, event: &TreeEvent);
}

impl<F> TreeObserver for F
where
    F: FnMut(&TreeEvent),
{
    fn notify(&mut self, event: &TreeEvent) {
        self(event)
    }
}
