//! Edit planning.
//!
//! The engine owns no state, so an "edit" here is a pure function from one
//! snapshot to the next: validate, apply the parent-list change to a copy, and
//! re-derive every generation. The caller persists whatever differs.

use super::generation::annotate;
use super::index::LineageIndex;
use super::node::{Member, NodeId};
use super::validator::{check_move, check_unlink};
use crate::error::{Error, Result};

/// Add `parent_id` to `child_id`'s parents, keeping the existing ones.
pub fn attach(nodes: &[Member], child_id: &str, parent_id: &str) -> Result<Vec<Member>> {
    check_move(&LineageIndex::new(nodes), child_id, parent_id)?;

    let next = rewrite(nodes, child_id, |member| {
        member.parent_ids.push(NodeId::from(parent_id));
    });
    tracing::debug!(child = child_id, parent = parent_id, "attach planned");
    annotate(&next)
}

/// Replace `child_id`'s parents with the single `parent_id`.
pub fn move_under(nodes: &[Member], child_id: &str, parent_id: &str) -> Result<Vec<Member>> {
    check_move(&LineageIndex::new(nodes), child_id, parent_id)?;

    let next = rewrite(nodes, child_id, |member| {
        member.parent_ids = vec![NodeId::from(parent_id)];
    });
    tracing::debug!(child = child_id, parent = parent_id, "move planned");
    annotate(&next)
}

/// Drop one parent, or every parent when `parent_id` is `None`.
///
/// A member left without parents becomes a root at the root generation, and
/// its descendants shift up accordingly. Unlinking a root from everything
/// returns the snapshot re-annotated but otherwise unchanged, so repeating
/// the call is harmless.
pub fn unlink(nodes: &[Member], child_id: &str, parent_id: Option<&str>) -> Result<Vec<Member>> {
    check_unlink(&LineageIndex::new(nodes), child_id, parent_id)?;

    let next = rewrite(nodes, child_id, |member| match parent_id {
        Some(parent) => member.parent_ids.retain(|p| p.as_str() != parent),
        None => member.parent_ids.clear(),
    });
    tracing::debug!(child = child_id, parent = ?parent_id, "unlink planned");
    annotate(&next)
}

/// Remove a member, splicing its children onto its own parents.
///
/// Each child's reference to the removed member is replaced, in place, by the
/// removed member's parents; ids the child already lists are not repeated.
/// Children of a removed root simply lose that parent.
pub fn remove(nodes: &[Member], id: &str) -> Result<Vec<Member>> {
    let removed = nodes
        .iter()
        .find(|n| n.id.as_str() == id)
        .ok_or_else(|| Error::NodeNotFound(NodeId::from(id)))?;

    let next: Vec<Member> = nodes
        .iter()
        .filter(|n| n.id.as_str() != id)
        .map(|n| {
            let mut member = n.clone();
            if member.has_parent(id) {
                member.parent_ids = splice_parents(&n.parent_ids, id, &removed.parent_ids);
            }
            member
        })
        .collect();

    tracing::debug!(removed = id, remaining = next.len(), "removal planned");
    annotate(&next)
}

fn splice_parents(current: &[NodeId], removed: &str, inherited: &[NodeId]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::with_capacity(current.len() + inherited.len());
    for parent in current {
        if parent.as_str() == removed {
            for grand in inherited {
                if !current.contains(grand) && !out.contains(grand) {
                    out.push(grand.clone());
                }
            }
        } else if !out.contains(parent) {
            out.push(parent.clone());
        }
    }
    out
}

fn rewrite(nodes: &[Member], id: &str, edit: impl FnOnce(&mut Member)) -> Vec<Member> {
    let mut next = nodes.to_vec();
    if let Some(member) = next.iter_mut().find(|n| n.id.as_str() == id) {
        edit(member);
    }
    next
}
