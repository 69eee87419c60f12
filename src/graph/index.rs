//! LineageIndex - flat, slot-addressed view over a member snapshot.
//!
//! Members can be reached through several parents, so the engine never builds
//! nested owned trees. Instead every call indexes the supplied slice once:
//! - id → slot lookup
//! - per-slot resolved parent slots (parent-list order)
//! - per-slot child slots (snapshot order)
//!
//! All traversals carry a visited set, so a corrupted (cyclic) snapshot can be
//! queried without looping.

use std::collections::{HashMap, VecDeque};

use super::node::Member;
use crate::error::{Error, Result};

/// Indexed, read-only view of a member snapshot.
pub struct LineageIndex<'a> {
    /// The snapshot, in caller order. Slot `i` is `nodes[i]`.
    nodes: &'a [Member],

    /// Map from id to slot (first occurrence wins on duplicates).
    slots: HashMap<&'a str, usize>,

    /// Resolved parent slots per member, in parent-list order.
    parents: Vec<Vec<usize>>,

    /// Child slots per member, in snapshot order.
    children: Vec<Vec<usize>>,
}

impl<'a> LineageIndex<'a> {
    /// Index a snapshot leniently.
    ///
    /// Dangling parent ids are skipped, repeated parent ids count once and a
    /// repeated member id resolves to its first occurrence. Queries use this
    /// so they stay total on data that has not been validated yet.
    pub fn new(nodes: &'a [Member]) -> Self {
        let mut slots = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            slots.entry(node.id.as_str()).or_insert(slot);
        }

        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

        for (slot, node) in nodes.iter().enumerate() {
            for parent_id in &node.parent_ids {
                let Some(&parent_slot) = slots.get(parent_id.as_str()) else {
                    continue;
                };
                if parents[slot].contains(&parent_slot) {
                    continue;
                }
                parents[slot].push(parent_slot);
                children[parent_slot].push(slot);
            }
        }

        Self {
            nodes,
            slots,
            parents,
            children,
        }
    }

    /// Index a snapshot, rejecting structural damage.
    ///
    /// Fails on duplicate member ids, repeated parents and parent ids that do
    /// not resolve. Cycles are not checked here; the generation resolver
    /// reports those.
    pub fn strict(nodes: &'a [Member]) -> Result<Self> {
        let index = Self::new(nodes);

        for (slot, node) in nodes.iter().enumerate() {
            if index.slots.get(node.id.as_str()) != Some(&slot) {
                return Err(Error::DuplicateNode(node.id.clone()));
            }
        }

        for node in nodes {
            for (i, parent_id) in node.parent_ids.iter().enumerate() {
                if !index.slots.contains_key(parent_id.as_str()) {
                    tracing::warn!(
                        child = %node.id,
                        parent = %parent_id,
                        "dangling parent reference"
                    );
                    return Err(Error::DanglingParent {
                        child: node.id.clone(),
                        parent: parent_id.clone(),
                    });
                }
                if node.parent_ids[..i].contains(parent_id) {
                    return Err(Error::DuplicateParent {
                        child: node.id.clone(),
                        parent: parent_id.clone(),
                    });
                }
            }
        }

        Ok(index)
    }

    // =========================================================================
    // Slot Access
    // =========================================================================

    /// Number of members in the snapshot.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The underlying snapshot.
    pub fn nodes(&self) -> &'a [Member] {
        self.nodes
    }

    /// Slot of the member with this id.
    pub fn slot(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Member with this id.
    pub fn get(&self, id: &str) -> Option<&'a Member> {
        self.slot(id).map(|slot| &self.nodes[slot])
    }

    /// Member at a slot.
    pub fn member(&self, slot: usize) -> &'a Member {
        &self.nodes[slot]
    }

    /// Resolved parent slots of a member.
    pub fn parent_slots(&self, slot: usize) -> &[usize] {
        &self.parents[slot]
    }

    /// Child slots of a member, in snapshot order.
    pub fn child_slots(&self, slot: usize) -> &[usize] {
        &self.children[slot]
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Members with an empty parent list.
    pub fn roots(&self) -> Vec<&'a Member> {
        self.nodes.iter().filter(|n| n.is_root()).collect()
    }

    /// Members listing `id` as a parent, by ascending sibling order.
    ///
    /// Equal sibling orders keep snapshot order.
    pub fn children(&self, id: &str) -> Vec<&'a Member> {
        let Some(slot) = self.slot(id) else {
            return Vec::new();
        };
        let mut kids: Vec<&'a Member> = self.children[slot]
            .iter()
            .map(|&c| &self.nodes[c])
            .collect();
        kids.sort_by_key(|m| m.sibling_order);
        kids
    }

    /// Members named in `node`'s parent list, in that list's order.
    pub fn parents(&self, node: &Member) -> Vec<&'a Member> {
        let mut found: Vec<&'a Member> = Vec::with_capacity(node.parent_ids.len());
        for parent_id in &node.parent_ids {
            if let Some(parent) = self.get(parent_id.as_str()) {
                if !found.iter().any(|p| p.id == parent.id) {
                    found.push(parent);
                }
            }
        }
        found
    }

    /// Breadth-first walk up the parent lists, in discovery order.
    pub fn ancestors(&self, id: &str) -> Vec<&'a Member> {
        self.slot(id)
            .map(|slot| self.walk(slot, &self.parents))
            .unwrap_or_default()
            .into_iter()
            .map(|s| &self.nodes[s])
            .collect()
    }

    /// Breadth-first walk down through children, in discovery order.
    pub fn descendants(&self, id: &str) -> Vec<&'a Member> {
        self.descendant_slots(id)
            .into_iter()
            .map(|s| &self.nodes[s])
            .collect()
    }

    /// Slots of every descendant of `id`. Empty for unknown ids.
    pub fn descendant_slots(&self, id: &str) -> Vec<usize> {
        self.slot(id)
            .map(|slot| self.walk(slot, &self.children))
            .unwrap_or_default()
    }

    /// True when `candidate` is reachable downward from `id`.
    pub fn is_descendant(&self, id: &str, candidate: &str) -> bool {
        let Some(target) = self.slot(candidate) else {
            return false;
        };
        self.descendant_slots(id).contains(&target)
    }

    /// BFS over an adjacency list. The start slot is never reported, even if a
    /// cycle leads back to it.
    fn walk(&self, start: usize, adjacency: &[Vec<usize>]) -> Vec<usize> {
        let mut visited = vec![false; self.nodes.len()];
        visited[start] = true;

        let mut found = Vec::new();
        let mut queue = VecDeque::from([start]);

        while let Some(slot) = queue.pop_front() {
            for &next in &adjacency[slot] {
                if !visited[next] {
                    visited[next] = true;
                    found.push(next);
                    queue.push_back(next);
                }
            }
        }

        found
    }
}
