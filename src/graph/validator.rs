//! Validation of proposed structural edits.
//!
//! Validation never mutates. The same check gates drag-and-drop reconnection
//! and bulk import; the caller applies the edge and re-derives afterwards.

use serde::{Deserialize, Serialize};

use super::index::LineageIndex;
use super::node::{Member, NodeId};
use crate::error::Rejection;

/// Outcome of validating an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
}

impl MoveValidation {
    /// The edit may be applied.
    pub const fn accepted() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// The edit was refused.
    pub const fn rejected(reason: Rejection) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Convert into a `Result` for `?` chains.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

impl From<Result<(), Rejection>> for MoveValidation {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Self::accepted(),
            Err(reason) => Self::rejected(reason),
        }
    }
}

/// Decide whether `moving_id` may gain `new_parent_id` as a parent.
///
/// Checks run in order and stop at the first failure: self reference,
/// existence, already linked, cycle introduction.
pub fn validate_move(nodes: &[Member], moving_id: &str, new_parent_id: &str) -> MoveValidation {
    let index = LineageIndex::new(nodes);
    let outcome: MoveValidation = check_move(&index, moving_id, new_parent_id).into();

    if let Some(reason) = outcome.reason {
        tracing::debug!(moving = moving_id, parent = new_parent_id, ?reason, "move rejected");
    }
    outcome
}

pub(crate) fn check_move(
    index: &LineageIndex<'_>,
    moving_id: &str,
    new_parent_id: &str,
) -> Result<(), Rejection> {
    if moving_id == new_parent_id {
        return Err(Rejection::SelfReference);
    }

    let (Some(moving), Some(_)) = (index.get(moving_id), index.get(new_parent_id)) else {
        return Err(Rejection::NotFound);
    };

    if moving.has_parent(new_parent_id) {
        return Err(Rejection::AlreadyLinked);
    }

    if index.is_descendant(moving_id, new_parent_id) {
        return Err(Rejection::WouldCreateCycle);
    }

    Ok(())
}

/// Decide whether `node_id` may drop `parent_id` (or every parent when `None`).
///
/// Dropping every parent of a root is accepted and changes nothing.
pub fn validate_unlink(nodes: &[Member], node_id: &str, parent_id: Option<&str>) -> MoveValidation {
    let index = LineageIndex::new(nodes);
    check_unlink(&index, node_id, parent_id).into()
}

pub(crate) fn check_unlink(
    index: &LineageIndex<'_>,
    node_id: &str,
    parent_id: Option<&str>,
) -> Result<(), Rejection> {
    let node = index.get(node_id).ok_or(Rejection::NotFound)?;
    match parent_id {
        Some(parent) if !node.has_parent(parent) => Err(Rejection::NotLinked),
        _ => Ok(()),
    }
}

/// Gate a parent list for a member that is about to be created or imported.
///
/// `node_id` is the id the member will carry. When it is already in the
/// snapshot (re-import), no proposed parent may be one of its descendants.
pub fn validate_parent_ids(
    nodes: &[Member],
    node_id: &str,
    parent_ids: &[NodeId],
) -> MoveValidation {
    let index = LineageIndex::new(nodes);
    check_parent_ids(&index, node_id, parent_ids).into()
}

fn check_parent_ids(
    index: &LineageIndex<'_>,
    node_id: &str,
    parent_ids: &[NodeId],
) -> Result<(), Rejection> {
    let existing = index.slot(node_id).is_some();
    for (i, parent) in parent_ids.iter().enumerate() {
        if parent.as_str() == node_id {
            return Err(Rejection::SelfReference);
        }
        if index.get(parent.as_str()).is_none() {
            return Err(Rejection::NotFound);
        }
        if parent_ids[..i].contains(parent) {
            return Err(Rejection::AlreadyLinked);
        }
        if existing && index.is_descendant(node_id, parent.as_str()) {
            return Err(Rejection::WouldCreateCycle);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A → B, A → C, B → C
    fn abc() -> Vec<Member> {
        vec![
            Member::new("A"),
            Member::new("B").with_parents(["A"]),
            Member::new("C").with_parents(["A", "B"]),
        ]
    }

    #[test]
    fn test_self_attach_rejected() {
        let nodes = abc();
        for node in &nodes {
            let id = node.id.as_str();
            assert_eq!(
                validate_move(&nodes, id, id),
                MoveValidation::rejected(Rejection::SelfReference)
            );
        }
    }

    #[test]
    fn test_self_reference_checked_before_existence() {
        let nodes = abc();
        assert_eq!(
            validate_move(&nodes, "ghost", "ghost").reason,
            Some(Rejection::SelfReference)
        );
    }

    #[test]
    fn test_missing_nodes_rejected() {
        let nodes = abc();
        assert_eq!(validate_move(&nodes, "A", "ghost").reason, Some(Rejection::NotFound));
        assert_eq!(validate_move(&nodes, "ghost", "A").reason, Some(Rejection::NotFound));
    }

    #[test]
    fn test_already_linked_rejected() {
        let nodes = abc();
        assert_eq!(validate_move(&nodes, "C", "B").reason, Some(Rejection::AlreadyLinked));
    }

    #[test]
    fn test_cycle_rejected() {
        let nodes = abc();
        // A is an ancestor of C through B
        assert_eq!(
            validate_move(&nodes, "A", "C").reason,
            Some(Rejection::WouldCreateCycle)
        );
        assert_eq!(
            validate_move(&nodes, "B", "C").reason,
            Some(Rejection::WouldCreateCycle)
        );
    }

    #[test]
    fn test_non_descendant_accepted() {
        let mut nodes = abc();
        nodes.push(Member::new("D"));
        nodes.push(Member::new("E").with_parents(["D"]));

        assert!(validate_move(&nodes, "C", "E").valid);
        assert!(validate_move(&nodes, "D", "C").valid);
        assert_eq!(validate_move(&nodes, "E", "A"), MoveValidation::accepted());
    }

    #[test]
    fn test_attach_under_unlinked_ancestor_accepted() {
        let nodes = vec![
            Member::new("A"),
            Member::new("B").with_parents(["A"]),
            Member::new("C").with_parents(["B"]),
        ];
        // A is an ancestor of C but not a direct parent: no cycle
        assert!(validate_move(&nodes, "C", "A").valid);
    }

    #[test]
    fn test_unlink_validation() {
        let nodes = abc();
        assert!(validate_unlink(&nodes, "C", Some("B")).valid);
        assert!(validate_unlink(&nodes, "C", None).valid);
        assert_eq!(
            validate_unlink(&nodes, "B", Some("C")).reason,
            Some(Rejection::NotLinked)
        );
        // unlinking every parent of a root is a no-op, not a refusal
        assert!(validate_unlink(&nodes, "A", None).valid);
        assert_eq!(validate_unlink(&nodes, "Z", None).reason, Some(Rejection::NotFound));
    }

    #[test]
    fn test_parent_ids_gate() {
        let nodes = abc();
        let ok = [NodeId::from("A"), NodeId::from("C")];
        assert!(validate_parent_ids(&nodes, "new", &ok).valid);

        let dup = [NodeId::from("A"), NodeId::from("A")];
        assert_eq!(
            validate_parent_ids(&nodes, "new", &dup).reason,
            Some(Rejection::AlreadyLinked)
        );

        let missing = [NodeId::from("nope")];
        assert_eq!(
            validate_parent_ids(&nodes, "new", &missing).reason,
            Some(Rejection::NotFound)
        );

        let own = [NodeId::from("new")];
        assert_eq!(
            validate_parent_ids(&nodes, "new", &own).reason,
            Some(Rejection::SelfReference)
        );

        // re-importing A under C would close a loop
        let back = [NodeId::from("C")];
        assert_eq!(
            validate_parent_ids(&nodes, "A", &back).reason,
            Some(Rejection::WouldCreateCycle)
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(MoveValidation::accepted().into_result(), Ok(()));
        assert_eq!(
            MoveValidation::rejected(Rejection::NotFound).into_result(),
            Err(Rejection::NotFound)
        );
    }
}
