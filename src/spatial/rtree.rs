//! R-tree over laid-out member boxes using the rstar crate.
//!
//! Provides O(log n) queries for:
//! - Box under a point (drop target)
//! - Nearest box
//! - Rectangle selection

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::graph::NodeId;
use crate::layout::Layout;

/// A member's box in canvas coordinates, tagged with its layout slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRect {
    /// Position of the member in [`Layout::nodes`].
    pub slot: usize,
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl NodeRect {
    pub fn new(slot: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            slot,
            min: [x, y],
            max: [x + width, y + height],
        }
    }
}

impl RTreeObject for NodeRect {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for NodeRect {
    /// Squared distance to the nearest point of the box; zero inside.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = (self.min[0] - point[0]).max(0.0).max(point[0] - self.max[0]);
        let dy = (self.min[1] - point[1]).max(0.0).max(point[1] - self.max[1]);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

/// Hit-testing index over one layout.
///
/// Rebuild it whenever a new [`Layout`] is produced; it holds no reference to
/// the layout itself.
#[derive(Debug, Default)]
pub struct DropTargetIndex {
    tree: RTree<NodeRect>,
    ids: Vec<NodeId>,
}

impl DropTargetIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load every positioned member of a layout.
    pub fn from_layout(layout: &Layout) -> Self {
        let rects: Vec<NodeRect> = layout
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, n)| NodeRect::new(slot, n.x, n.y, n.width, n.height))
            .collect();

        Self {
            tree: RTree::bulk_load(rects),
            ids: layout.nodes.iter().map(|n| n.id.clone()).collect(),
        }
    }

    /// Member whose box contains the point.
    ///
    /// Overlapping boxes resolve to the earliest slot.
    pub fn node_at(&self, x: f32, y: f32) -> Option<&NodeId> {
        self.tree
            .locate_all_at_point(&[x, y])
            .map(|rect| rect.slot)
            .min()
            .map(|slot| &self.ids[slot])
    }

    /// Member a dragged node would be dropped onto at this point.
    ///
    /// The dragged node's own box never counts as a target.
    pub fn drop_target(&self, x: f32, y: f32, dragged: &str) -> Option<&NodeId> {
        self.tree
            .locate_all_at_point(&[x, y])
            .map(|rect| rect.slot)
            .filter(|&slot| self.ids[slot].as_str() != dragged)
            .min()
            .map(|slot| &self.ids[slot])
    }

    /// Member whose box is closest to the point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<&NodeId> {
        self.tree
            .nearest_neighbor(&[x, y])
            .map(|rect| &self.ids[rect.slot])
    }

    /// Closest member no farther than `max_distance` from the point.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<&NodeId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|rect| rect.distance_2(&[x, y]) <= max_distance_sq)
            .map(|rect| &self.ids[rect.slot])
    }

    /// Members whose boxes lie entirely inside the rectangle, in layout order.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|rect| rect.slot)
            .collect();
        slots.sort_unstable();
        slots.into_iter().map(|slot| &self.ids[slot]).collect()
    }

    /// Get the number of boxes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
