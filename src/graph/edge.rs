//! Derived parent→child edges.
//!
//! Edges are never stored. A pair (parent, child) exists exactly when the
//! child's parent list contains the parent, so the edge set is recomputed from
//! the member snapshot whenever it is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{Member, NodeId};

/// A parent→child link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub parent: NodeId,
    pub child: NodeId,
}

impl EdgeKey {
    /// Create a new edge key.
    #[inline]
    pub fn new(parent: NodeId, child: NodeId) -> Self {
        Self { parent, child }
    }
}

/// Renders the editor's edge id, `edge-{parent}-{child}`.
impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge-{}-{}", self.parent, self.child)
    }
}

/// Every edge in the snapshot, ordered by child position then parent-list order.
pub fn edges(nodes: &[Member]) -> Vec<EdgeKey> {
    nodes
        .iter()
        .flat_map(|child| {
            child
                .parent_ids
                .iter()
                .map(move |parent| EdgeKey::new(parent.clone(), child.id.clone()))
        })
        .collect()
}
