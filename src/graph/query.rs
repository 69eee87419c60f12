//! Graph queries over a full member snapshot.
//!
//! Thin free-function entry points over [`LineageIndex`]. Each call indexes the
//! snapshot afresh; none of them fail or loop on unvalidated input.

use std::collections::BTreeMap;

use super::index::LineageIndex;
use super::node::Member;

/// Members with no parents.
pub fn roots(nodes: &[Member]) -> Vec<&Member> {
    LineageIndex::new(nodes).roots()
}

/// Children of `id`, by ascending sibling order (stable on ties).
pub fn children<'a>(nodes: &'a [Member], id: &str) -> Vec<&'a Member> {
    LineageIndex::new(nodes).children(id)
}

/// Parents of `node`, in its parent-list order. Missing ids are skipped.
pub fn parents<'a>(nodes: &'a [Member], node: &Member) -> Vec<&'a Member> {
    LineageIndex::new(nodes).parents(node)
}

/// Every ancestor of `id`, breadth-first, each reported once.
pub fn ancestors<'a>(nodes: &'a [Member], id: &str) -> Vec<&'a Member> {
    LineageIndex::new(nodes).ancestors(id)
}

/// Every descendant of `id`, breadth-first, each reported once.
pub fn descendants<'a>(nodes: &'a [Member], id: &str) -> Vec<&'a Member> {
    LineageIndex::new(nodes).descendants(id)
}

/// Number of members per stored generation, ascending.
pub fn count_by_generation(nodes: &[Member]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for node in nodes {
        *counts.entry(node.generation).or_insert(0) += 1;
    }
    counts
}
