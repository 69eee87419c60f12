//! Generation (depth) resolution.
//!
//! A root sits at [`ROOT_GENERATION`]. Every other member sits one below its
//! deepest parent, so `generation(child) > generation(parent)` holds for every
//! parent at once. The same rule is used at creation time and after edits.
//!
//! Members are visited in topological order (parents first) using petgraph's
//! toposort, whose DFS in-progress marking turns a residual cycle into an
//! error instead of a loop.

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::index::LineageIndex;
use super::node::{Member, NodeId};
use crate::error::{Error, Result};

/// Generation assigned to members without parents.
///
/// Generation 0 stays free as the "unassigned" sentinel.
pub const ROOT_GENERATION: u32 = 1;

/// Old and new generation of one member after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationChange {
    pub id: NodeId,
    pub previous: u32,
    pub current: u32,
}

impl GenerationChange {
    /// True when the stored value is stale.
    pub fn is_changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Generation of every member, keyed by id.
pub fn resolve_generations(nodes: &[Member]) -> Result<BTreeMap<NodeId, u32>> {
    let index = LineageIndex::strict(nodes)?;
    let generations = resolve_slots(&index)?;

    Ok(nodes
        .iter()
        .zip(generations)
        .map(|(node, generation)| (node.id.clone(), generation))
        .collect())
}

/// Generation per slot of an already-indexed snapshot.
pub(crate) fn resolve_slots(index: &LineageIndex<'_>) -> Result<Vec<u32>> {
    let count = index.len();
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(count, count);
    let handles: Vec<NodeIndex> = (0..count).map(|slot| graph.add_node(slot)).collect();

    for child in 0..count {
        for &parent in index.parent_slots(child) {
            graph.add_edge(handles[parent], handles[child], ());
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| {
        let member = index.member(graph[cycle.node_id()]);
        tracing::warn!(node = %member.id, "cycle detected while resolving generations");
        Error::DataIntegrityCycle(member.id.clone())
    })?;

    let mut generations = vec![ROOT_GENERATION; count];
    for handle in order {
        let slot = graph[handle];
        generations[slot] = index
            .parent_slots(slot)
            .iter()
            .map(|&parent| generations[parent] + 1)
            .max()
            .unwrap_or(ROOT_GENERATION);
    }

    tracing::debug!(members = count, "generations resolved");
    Ok(generations)
}

/// Generation a new member would get under `parent_ids`.
pub fn generation_for_new(nodes: &[Member], parent_ids: &[NodeId]) -> Result<u32> {
    let index = LineageIndex::strict(nodes)?;
    let generations = resolve_slots(&index)?;

    let mut deepest: Option<u32> = None;
    for parent in parent_ids {
        let slot = index
            .slot(parent.as_str())
            .ok_or_else(|| Error::NodeNotFound(parent.clone()))?;
        deepest = deepest.max(Some(generations[slot]));
    }

    Ok(deepest.map_or(ROOT_GENERATION, |g| g + 1))
}

/// Recomputed generations for `edited_id` and its whole subtree.
///
/// Entries are in breadth-first order starting with the edited member. Every
/// descendant is listed, stale or not; filter with
/// [`GenerationChange::is_changed`] to find the rows to persist.
pub fn affected_generations(nodes: &[Member], edited_id: &str) -> Result<Vec<GenerationChange>> {
    let index = LineageIndex::strict(nodes)?;
    let start = index
        .slot(edited_id)
        .ok_or_else(|| Error::NodeNotFound(NodeId::from(edited_id)))?;
    let generations = resolve_slots(&index)?;

    let subtree = std::iter::once(start).chain(index.descendant_slots(edited_id));
    Ok(subtree
        .map(|slot| {
            let member = index.member(slot);
            GenerationChange {
                id: member.id.clone(),
                previous: member.generation,
                current: generations[slot],
            }
        })
        .collect())
}

/// Copy of the snapshot with every generation re-derived.
pub fn annotate(nodes: &[Member]) -> Result<Vec<Member>> {
    let index = LineageIndex::strict(nodes)?;
    let generations = resolve_slots(&index)?;

    Ok(nodes
        .iter()
        .zip(generations)
        .map(|(node, generation)| Member {
            generation,
            ..node.clone()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepest_parent_rule() {
        // C hangs off both A and B; B is under A
        let nodes = vec![
            Member::new("A"),
            Member::new("B").with_parents(["A"]),
            Member::new("C").with_parents(["A", "B"]),
        ];
        let generations = resolve_generations(&nodes).unwrap();

        assert_eq!(generations["A"], ROOT_GENERATION);
        assert_eq!(generations["B"], ROOT_GENERATION + 1);
        assert_eq!(generations["C"], ROOT_GENERATION + 2);
    }

    #[test]
    fn test_arbitrary_input_order() {
        // children listed before their parents
        let nodes = vec![
            Member::new("d").with_parents(["c"]),
            Member::new("c").with_parents(["b"]),
            Member::new("b").with_parents(["a"]),
            Member::new("a"),
        ];
        let generations = resolve_generations(&nodes).unwrap();
        assert_eq!(generations["a"], 1);
        assert_eq!(generations["d"], 4);
    }

    #[test]
    fn test_monotone_on_every_edge() {
        let nodes = vec![
            Member::new("r1"),
            Member::new("r2"),
            Member::new("x").with_parents(["r1"]),
            Member::new("y").with_parents(["x", "r2"]),
            Member::new("z").with_parents(["r2", "y", "r1"]),
            Member::new("w").with_parents(["z", "x"]),
        ];
        let annotated = annotate(&nodes).unwrap();
        let generations = resolve_generations(&nodes).unwrap();

        for child in &annotated {
            for parent in &child.parent_ids {
                assert!(
                    child.generation > generations[parent],
                    "{} (gen {}) must be deeper than {} (gen {})",
                    child.id,
                    child.generation,
                    parent,
                    generations[parent]
                );
            }
        }
    }

    #[test]
    fn test_cycle_reported() {
        let nodes = vec![
            Member::new("a").with_parents(["c"]),
            Member::new("b").with_parents(["a"]),
            Member::new("c").with_parents(["b"]),
        ];
        let err = resolve_generations(&nodes).unwrap_err();
        assert!(matches!(err, Error::DataIntegrityCycle(_)), "got {err:?}");
    }

    #[test]
    fn test_self_loop_reported() {
        let nodes = vec![Member::new("a").with_parents(["a"])];
        assert_eq!(
            resolve_generations(&nodes).unwrap_err(),
            Error::DataIntegrityCycle("a".into())
        );
    }

    #[test]
    fn test_dangling_parent_fails_loudly() {
        let nodes = vec![Member::new("a").with_parents(["gone"])];
        assert!(matches!(
            annotate(&nodes).unwrap_err(),
            Error::DanglingParent { .. }
        ));
    }

    #[test]
    fn test_generation_for_new_uses_deepest_parent() {
        let nodes = vec![
            Member::new("A"),
            Member::new("B").with_parents(["A"]),
        ];
        // first listed parent is the shallow one; the deep one still wins
        let parents = [NodeId::from("A"), NodeId::from("B")];
        assert_eq!(generation_for_new(&nodes, &parents).unwrap(), 3);
        assert_eq!(generation_for_new(&nodes, &[]).unwrap(), ROOT_GENERATION);
        assert_eq!(
            generation_for_new(&nodes, &[NodeId::from("Q")]).unwrap_err(),
            Error::NodeNotFound("Q".into())
        );
    }

    #[test]
    fn test_affected_generations_cover_subtree() {
        // stored generations reflect a time when b hung under a deeper chain
        let mut nodes = vec![
            Member::new("a"),
            Member::new("b"),
            Member::new("c").with_parents(["b"]),
            Member::new("d").with_parents(["c"]),
        ];
        nodes[1].generation = 3;
        nodes[2].generation = 4;
        nodes[3].generation = 5;

        let changes = affected_generations(&nodes, "b").unwrap();
        let ids: Vec<&str> = changes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);

        let current: Vec<u32> = changes.iter().map(|c| c.current).collect();
        assert_eq!(current, vec![1, 2, 3]);
        assert!(changes.iter().all(GenerationChange::is_changed));
    }

    #[test]
    fn test_affected_generations_unknown_node() {
        let nodes = vec![Member::new("a")];
        assert_eq!(
            affected_generations(&nodes, "zz").unwrap_err(),
            Error::NodeNotFound("zz".into())
        );
    }
}
