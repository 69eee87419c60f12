//! Layout engine: members in, positioned boxes and edge routes out.
//!
//! Ranks come straight from generations (`rank = generation - ROOT_GENERATION`),
//! so every member of one generation lands on the same row (or column) and
//! rows grow strictly with generation. The within-rank ordering is delegated
//! to a [`LayeredLayout`].

use serde::{Deserialize, Serialize};

use super::layered::{Arrangement, LayeredLayout, RankedGraph, SugiyamaConfig, SugiyamaLayout};
use crate::error::Result;
use crate::graph::{edges, resolve_slots, EdgeKey, LineageIndex, Member, NodeId, ROOT_GENERATION};

/// Direction ranks advance in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDirection {
    /// Generations stack downward.
    #[default]
    TopBottom,
    /// Generations stack rightward.
    LeftRight,
}

/// Configuration for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub direction: RankDirection,
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between neighbouring boxes within a rank.
    pub node_separation: f32,
    /// Gap between consecutive ranks.
    pub rank_separation: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Maximum crossing-reduction sweeps.
    pub crossing_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: RankDirection::TopBottom,
            node_width: 200.0,
            node_height: 100.0,
            node_separation: 60.0,
            rank_separation: 120.0,
            margin_x: 40.0,
            margin_y: 40.0,
            crossing_passes: 24,
        }
    }
}

impl LayoutConfig {
    /// Box extent along the rank axis and across it.
    fn extents(&self) -> (f32, f32) {
        match self.direction {
            RankDirection::TopBottom => (self.node_width, self.node_height),
            RankDirection::LeftRight => (self.node_height, self.node_width),
        }
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A member placed on the canvas. `x`/`y` are the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rank: usize,
    /// The member with its generation re-derived.
    pub data: Member,
}

impl PositionedNode {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// One parent→child connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    /// `edge-{parent}-{child}`.
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    /// Route from the parent's exit side through any bends to the child's
    /// entry side.
    pub points: Vec<Point>,
}

/// Row (or column) occupied by one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationBand {
    pub generation: u32,
    /// Leading edge of the band along the rank axis.
    pub offset: f32,
    /// Extent of the band along the rank axis.
    pub extent: f32,
    pub count: usize,
}

/// Complete layout of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<LayoutEdge>,
    pub bands: Vec<GenerationBand>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    /// Positioned node by id.
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }
}

/// Lays out member snapshots.
#[derive(Debug, Clone)]
pub struct LayoutEngine<L: LayeredLayout = SugiyamaLayout> {
    config: LayoutConfig,
    layered: L,
}

impl LayoutEngine<SugiyamaLayout> {
    /// Create an engine using barycenter ordering.
    pub fn new(config: LayoutConfig) -> Self {
        let layered = SugiyamaLayout::new(SugiyamaConfig {
            node_separation: config.node_separation,
            crossing_passes: config.crossing_passes,
            ..Default::default()
        });
        Self { config, layered }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl Default for LayoutEngine<SugiyamaLayout> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<L: LayeredLayout> LayoutEngine<L> {
    /// Create an engine with a custom within-rank algorithm.
    pub fn with_layered(config: LayoutConfig, layered: L) -> Self {
        Self { config, layered }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out a snapshot.
    ///
    /// Generations are re-derived first; a cycle or dangling parent fails the
    /// whole call rather than producing a partial drawing.
    pub fn layout(&self, nodes: &[Member]) -> Result<Layout> {
        let index = LineageIndex::strict(nodes)?;
        let generations = resolve_slots(&index)?;

        let (along, _) = self.config.extents();
        let ranks: Vec<usize> = generations
            .iter()
            .map(|&g| (g - ROOT_GENERATION) as usize)
            .collect();

        let (keys, slots): (Vec<EdgeKey>, Vec<(usize, usize)>) = edges(nodes)
            .into_iter()
            .filter_map(|key| {
                let parent = index.slot(key.parent.as_str())?;
                let child = index.slot(key.child.as_str())?;
                Some((key, (parent, child)))
            })
            .unzip();

        let graph = RankedGraph {
            ranks: ranks.clone(),
            widths: vec![along; nodes.len()],
            hints: nodes.iter().map(|n| n.sibling_order).collect(),
            edges: slots,
        };
        let arrangement = self.layered.arrange(&graph)?;

        let layout = self.assemble(nodes, &generations, &ranks, &keys, &graph, &arrangement);
        tracing::debug!(
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            ranks = layout.bands.len(),
            "layout complete"
        );
        Ok(layout)
    }

    /// Leading edge of a rank along the rank axis.
    fn rank_offset(&self, rank: usize) -> f32 {
        let (_, across) = self.config.extents();
        let margin = match self.config.direction {
            RankDirection::TopBottom => self.config.margin_y,
            RankDirection::LeftRight => self.config.margin_x,
        };
        margin + rank as f32 * (across + self.config.rank_separation)
    }

    /// Map (position along a rank, rank-axis coordinate) to canvas coordinates.
    fn to_canvas(&self, along: f32, depth: f32) -> Point {
        match self.config.direction {
            RankDirection::TopBottom => Point {
                x: self.config.margin_x + along,
                y: depth,
            },
            RankDirection::LeftRight => Point {
                x: depth,
                y: self.config.margin_y + along,
            },
        }
    }

    fn assemble(
        &self,
        nodes: &[Member],
        generations: &[u32],
        ranks: &[usize],
        keys: &[EdgeKey],
        graph: &RankedGraph,
        arrangement: &Arrangement,
    ) -> Layout {
        let (_, across) = self.config.extents();
        let (width, height) = (self.config.node_width, self.config.node_height);

        let positioned: Vec<PositionedNode> = nodes
            .iter()
            .enumerate()
            .map(|(slot, member)| {
                let depth = self.rank_offset(ranks[slot]) + across / 2.0;
                let center = self.to_canvas(arrangement.positions[slot], depth);
                PositionedNode {
                    id: member.id.clone(),
                    x: center.x - width / 2.0,
                    y: center.y - height / 2.0,
                    width,
                    height,
                    rank: ranks[slot],
                    data: Member {
                        generation: generations[slot],
                        ..member.clone()
                    },
                }
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .zip(keys)
            .zip(&arrangement.bends)
            .map(|((&(parent, child), key), bends)| {
                let source = &positioned[parent];
                let target = &positioned[child];

                let mut points = Vec::with_capacity(bends.len() + 2);
                points.push(self.exit_point(source));
                for (i, &along) in bends.iter().enumerate() {
                    let rank = ranks[parent] + 1 + i;
                    let depth = self.rank_offset(rank) + across / 2.0;
                    points.push(self.to_canvas(along, depth));
                }
                points.push(self.entry_point(target));

                LayoutEdge {
                    id: key.to_string(),
                    source: source.id.clone(),
                    target: target.id.clone(),
                    points,
                }
            })
            .collect();

        let bands = self.bands(&positioned);

        let right = positioned
            .iter()
            .map(|n| n.x + n.width)
            .fold(0.0f32, f32::max);
        let bottom = positioned
            .iter()
            .map(|n| n.y + n.height)
            .fold(0.0f32, f32::max);

        Layout {
            nodes: positioned,
            edges,
            bands,
            width: right + self.config.margin_x,
            height: bottom + self.config.margin_y,
        }
    }

    fn exit_point(&self, node: &PositionedNode) -> Point {
        let c = node.center();
        match self.config.direction {
            RankDirection::TopBottom => Point { x: c.x, y: node.y + node.height },
            RankDirection::LeftRight => Point { x: node.x + node.width, y: c.y },
        }
    }

    fn entry_point(&self, node: &PositionedNode) -> Point {
        let c = node.center();
        match self.config.direction {
            RankDirection::TopBottom => Point { x: c.x, y: node.y },
            RankDirection::LeftRight => Point { x: node.x, y: c.y },
        }
    }

    fn bands(&self, nodes: &[PositionedNode]) -> Vec<GenerationBand> {
        let (_, across) = self.config.extents();
        let mut counts: Vec<usize> = Vec::new();
        for node in nodes {
            if counts.len() <= node.rank {
                counts.resize(node.rank + 1, 0);
            }
            counts[node.rank] += 1;
        }

        counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(rank, &count)| GenerationBand {
                generation: rank as u32 + ROOT_GENERATION,
                offset: self.rank_offset(rank),
                extent: across,
                count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn family() -> Vec<Member> {
        vec![
            Member::new("a"),
            Member::new("b").with_parents(["a"]),
            Member::new("c").with_parents(["a", "b"]),
            Member::new("d").with_parents(["c"]),
        ]
    }

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.direction, RankDirection::TopBottom);
        assert_eq!(config.node_width, 200.0);
        assert_eq!(config.node_height, 100.0);
        assert_eq!(config.node_separation, 60.0);
        assert_eq!(config.rank_separation, 120.0);
        assert_eq!(config.crossing_passes, 24);
    }

    #[test]
    fn test_empty_snapshot() {
        let layout = LayoutEngine::with_defaults().layout(&[]).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert!(layout.bands.is_empty());
    }

    #[test]
    fn test_rows_follow_generations() {
        let layout = LayoutEngine::with_defaults().layout(&family()).unwrap();

        let y = |id: &str| layout.node(id).unwrap().y;
        assert_eq!(y("a"), 40.0);
        assert_eq!(y("b"), 40.0 + 220.0);
        assert_eq!(y("c"), 40.0 + 440.0);
        assert_eq!(y("d"), 40.0 + 660.0);
        assert_eq!(layout.node("c").unwrap().data.generation, 3);

        let a = layout.node("a").unwrap();
        let center = a.center();
        assert!(a.contains(center.x, center.y));
        assert!(!a.contains(center.x, a.y - 1.0));
    }

    #[test]
    fn test_multi_parent_edges_and_bends() {
        let layout = LayoutEngine::with_defaults().layout(&family()).unwrap();
        let ids: Vec<&str> = layout.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge-a-b", "edge-a-c", "edge-b-c", "edge-c-d"]);

        // a → c skips generation 2 and bends once
        let skip = &layout.edges[1];
        assert_eq!(skip.points.len(), 3);
        let a = layout.node("a").unwrap();
        let c = layout.node("c").unwrap();
        assert_eq!(skip.points[0].y, a.y + a.height);
        assert_eq!(skip.points[2].y, c.y);
    }

    #[test]
    fn test_same_generation_does_not_overlap() {
        let nodes = vec![
            Member::new("r"),
            Member::new("x").with_parents(["r"]),
            Member::new("y").with_parents(["r"]),
            Member::new("z").with_parents(["r"]),
        ];
        let layout = LayoutEngine::with_defaults().layout(&nodes).unwrap();
        let mut row: Vec<&PositionedNode> = layout.nodes.iter().filter(|n| n.rank == 1).collect();
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
        for pair in row.windows(2) {
            assert!(pair[1].x - (pair[0].x + pair[0].width) >= 60.0 - 1e-3);
        }
    }

    #[test]
    fn test_left_right_swaps_axes() {
        let config = LayoutConfig {
            direction: RankDirection::LeftRight,
            ..Default::default()
        };
        let layout = LayoutEngine::new(config).layout(&family()).unwrap();
        let a = layout.node("a").unwrap();
        let b = layout.node("b").unwrap();
        assert_eq!(a.x, 40.0);
        assert_eq!(b.x, 40.0 + 200.0 + 120.0);
        assert_eq!(layout.edges[0].points[0].x, a.x + a.width);
    }

    #[test]
    fn test_bands() {
        let layout = LayoutEngine::with_defaults().layout(&family()).unwrap();
        let generations: Vec<u32> = layout.bands.iter().map(|b| b.generation).collect();
        assert_eq!(generations, vec![1, 2, 3, 4]);
        assert!(layout.bands.iter().all(|b| b.count == 1));
        assert_eq!(layout.bands[1].offset, 260.0);
    }

    #[test]
    fn test_cycle_fails_loudly() {
        let nodes = vec![
            Member::new("a").with_parents(["b"]),
            Member::new("b").with_parents(["a"]),
        ];
        let err = LayoutEngine::with_defaults().layout(&nodes).unwrap_err();
        assert!(matches!(err, Error::DataIntegrityCycle(_)));
    }

    #[test]
    fn test_sibling_order_respected_for_roots() {
        let nodes = vec![
            Member::new("late").with_sibling_order(2),
            Member::new("early").with_sibling_order(1),
        ];
        let layout = LayoutEngine::with_defaults().layout(&nodes).unwrap();
        assert!(layout.node("early").unwrap().x < layout.node("late").unwrap().x);
    }

    #[test]
    fn test_children_follow_sibling_order() {
        // listed out of order under one shared parent
        let nodes = vec![
            Member::new("p"),
            Member::new("third").with_parents(["p"]).with_sibling_order(3),
            Member::new("first").with_parents(["p"]).with_sibling_order(1),
            Member::new("second").with_parents(["p"]).with_sibling_order(2),
        ];
        let layout = LayoutEngine::with_defaults().layout(&nodes).unwrap();

        let x = |id: &str| layout.node(id).unwrap().x;
        assert!(x("first") < x("second"), "first must render left of second");
        assert!(x("second") < x("third"), "second must render left of third");
    }
}
