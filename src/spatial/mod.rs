//! Spatial indexing for drop-target hit testing.
//!
//! Laid-out member boxes go into an R-tree so pointer queries during a drag
//! stay O(log n) on large lineages.

mod rtree;

pub use rtree::{DropTargetIndex, NodeRect};
