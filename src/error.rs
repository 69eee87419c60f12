//! Error types for the lineage engine.
//!
//! Two tiers:
//! - [`Rejection`]: an expected, user-recoverable outcome of validating a
//!   proposed edit. Returned as a value inside [`MoveValidation`](crate::graph::MoveValidation).
//! - [`Error`]: a failure of a derivation (generations, layout, edits). Cycles and
//!   dangling parents here mean the snapshot was corrupted upstream.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type for lineage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a proposed structural edit was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, serde::Serialize, serde::Deserialize)]
pub enum Rejection {
    /// A node cannot be attached under itself.
    #[error("a node cannot be its own parent")]
    SelfReference,

    /// One of the referenced ids is not in the snapshot.
    #[error("node not found")]
    NotFound,

    /// The parent is already in the node's parent list.
    #[error("node is already linked to that parent")]
    AlreadyLinked,

    /// The proposed parent is a descendant of the node.
    #[error("link would create a cycle")]
    WouldCreateCycle,

    /// Unlink named a parent the node is not attached to.
    #[error("node is not linked to that parent")]
    NotLinked,
}

/// Errors raised while deriving from or editing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An edit was refused by the validator.
    #[error("edit rejected: {0}")]
    Rejected(#[from] Rejection),

    /// The parent graph contains a cycle through this node.
    #[error("data integrity violation: cycle through node '{0}'")]
    DataIntegrityCycle(NodeId),

    /// A node lists a parent id that does not exist.
    #[error("node '{child}' references missing parent '{parent}'")]
    DanglingParent { child: NodeId, parent: NodeId },

    /// Two nodes share the same id.
    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    /// A node lists the same parent twice.
    #[error("node '{child}' lists parent '{parent}' more than once")]
    DuplicateParent { child: NodeId, parent: NodeId },

    /// The node targeted by an edit is not in the snapshot.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The layered layout was handed a ranking it cannot draw.
    #[error("layout failed: {0}")]
    Layout(String),

    /// Conversion to or from the JS representation failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// True for errors that mean the snapshot broke an invariant upstream.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Error::DataIntegrityCycle(_)
                | Error::DanglingParent { .. }
                | Error::DuplicateNode(_)
                | Error::DuplicateParent { .. }
        )
    }
}
