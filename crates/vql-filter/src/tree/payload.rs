//! Drag-and-drop payloads.
//!
//! A payload never points into a live arena. It carries the canonical
//! mapping of the dragged subtree plus the id it was taken from, and the
//! receiving editor resolves that id against its own tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::NodeId;

/// The message exchanged when a node is dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPayload {
    /// Session of the editor the node was dragged from.
    pub session: Uuid,
    /// Id of the dragged node in that editor's tree.
    pub source: NodeId,
    /// Canonical mapping of the dragged subtree.
    pub mapping: Value,
}

impl DragPayload {
    /// Encodes the payload as JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes a payload from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
