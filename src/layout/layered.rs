//! Sugiyama-style layered layout on pre-ranked vertices.
//!
//! The caller fixes every vertex's rank. This module only decides the order
//! of vertices within each rank and their position along the rank axis.
//!
//! # Algorithm Overview
//!
//! 1. **Dummy insertion:** An edge spanning several ranks is split into a
//!    chain through one zero-width dummy vertex per intermediate rank, so every
//!    edge joins adjacent ranks. Multi-parent members produce one chain per
//!    inbound edge.
//! 2. **Crossing reduction:** Alternating down/up barycenter sweeps reorder
//!    each rank by the mean position of its neighbours in the adjacent rank.
//!    The ordering with the fewest crossings seen is kept.
//! 3. **Coordinate assignment:** Vertices are pulled toward the mean position
//!    of their neighbours, then pushed apart so consecutive vertices keep at
//!    least half their widths plus the node separation between centers.
//!
//! Every step is index-based with stable sorts, so equal input always gives
//! bit-identical output.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Input to a layered layout.
#[derive(Debug, Clone, Default)]
pub struct RankedGraph {
    /// Rank of each vertex (0 = first rank).
    pub ranks: Vec<usize>,
    /// Extent of each vertex along the rank axis.
    pub widths: Vec<f32>,
    /// Preferred relative order inside a rank; ties fall back to vertex index.
    pub hints: Vec<i32>,
    /// Directed edges (upper, lower). `ranks[upper] < ranks[lower]` is required.
    pub edges: Vec<(usize, usize)>,
}

impl RankedGraph {
    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Check if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Result of a layered layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arrangement {
    /// Center of each input vertex along the rank axis. The leftmost extent
    /// of any vertex is at 0.
    pub positions: Vec<f32>,
    /// Input vertices per rank, in final left-to-right order.
    pub orders: Vec<Vec<usize>>,
    /// Per input edge, the rank-axis position at each intermediate rank.
    pub bends: Vec<Vec<f32>>,
}

/// A layered layout algorithm.
///
/// Implementations receive fixed ranks and return positions along the rank
/// axis. Any approach that respects the ranks and is deterministic fits.
pub trait LayeredLayout {
    /// Order and position the vertices of every rank.
    fn arrange(&self, graph: &RankedGraph) -> Result<Arrangement>;
}

/// Configuration for [`SugiyamaLayout`].
#[derive(Debug, Clone)]
pub struct SugiyamaConfig {
    /// Gap between the extents of neighbouring vertices in one rank.
    pub node_separation: f32,
    /// Maximum barycenter sweep pairs (down then up).
    pub crossing_passes: usize,
    /// Neighbour-averaging rounds during coordinate assignment.
    pub alignment_passes: usize,
}

impl Default for SugiyamaConfig {
    fn default() -> Self {
        Self {
            node_separation: 60.0,
            crossing_passes: 24,
            alignment_passes: 4,
        }
    }
}

/// Barycenter-ordered layered layout.
#[derive(Debug, Clone, Default)]
pub struct SugiyamaLayout {
    config: SugiyamaConfig,
}

/// Vertex set after dummy insertion. Real vertices keep their input index;
/// dummies follow.
struct Augmented {
    ranks: Vec<usize>,
    widths: Vec<f32>,
    hints: Vec<i32>,
    upper: Vec<Vec<usize>>,
    lower: Vec<Vec<usize>>,
    /// Dummy chain per input edge.
    chains: Vec<Vec<usize>>,
}

impl SugiyamaLayout {
    /// Create a new layered layout with the given configuration.
    pub fn new(config: SugiyamaConfig) -> Self {
        Self { config }
    }

    /// Create a layered layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SugiyamaConfig::default())
    }

    fn validate(graph: &RankedGraph) -> Result<()> {
        let count = graph.len();
        if graph.widths.len() != count || graph.hints.len() != count {
            return Err(Error::Layout(format!(
                "vertex attribute lengths differ: {} ranks, {} widths, {} hints",
                count,
                graph.widths.len(),
                graph.hints.len()
            )));
        }
        for &(upper, lower) in &graph.edges {
            if upper >= count || lower >= count {
                return Err(Error::Layout(format!(
                    "edge {upper}→{lower} references a vertex outside 0..{count}"
                )));
            }
            if graph.ranks[upper] >= graph.ranks[lower] {
                return Err(Error::Layout(format!(
                    "edge {upper}→{lower} goes from rank {} to rank {}; graph is not layered",
                    graph.ranks[upper], graph.ranks[lower]
                )));
            }
        }
        Ok(())
    }

    fn augment(graph: &RankedGraph) -> Augmented {
        let count = graph.len();
        let mut aug = Augmented {
            ranks: graph.ranks.clone(),
            widths: graph.widths.clone(),
            hints: graph.hints.clone(),
            upper: vec![Vec::new(); count],
            lower: vec![Vec::new(); count],
            chains: Vec::with_capacity(graph.edges.len()),
        };

        for &(from, to) in &graph.edges {
            let mut chain = Vec::new();
            let mut prev = from;

            for rank in graph.ranks[from] + 1..graph.ranks[to] {
                let dummy = aug.ranks.len();
                aug.ranks.push(rank);
                aug.widths.push(0.0);
                aug.hints.push(graph.hints[to]);
                aug.upper.push(vec![prev]);
                aug.lower.push(Vec::new());
                aug.lower[prev].push(dummy);
                chain.push(dummy);
                prev = dummy;
            }

            aug.lower[prev].push(to);
            aug.upper[to].push(prev);
            aug.chains.push(chain);
        }

        aug
    }

    /// Order every rank by (hint, vertex index).
    fn initial_layers(aug: &Augmented, rank_count: usize) -> Vec<Vec<usize>> {
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
        for (vertex, &rank) in aug.ranks.iter().enumerate() {
            layers[rank].push(vertex);
        }
        for layer in &mut layers {
            layer.sort_by_key(|&v| (aug.hints[v], v));
        }
        layers
    }

    fn positions_of(layers: &[Vec<usize>], vertex_count: usize) -> Vec<usize> {
        let mut pos = vec![0usize; vertex_count];
        for layer in layers {
            for (i, &v) in layer.iter().enumerate() {
                pos[v] = i;
            }
        }
        pos
    }

    /// Stable reorder of one layer by neighbour barycenter.
    fn sort_by_barycenter(layer: &mut [usize], neighbours: &[Vec<usize>], pos: &mut [usize]) {
        let keys: Vec<f32> = layer
            .iter()
            .map(|&v| {
                let adjacent = &neighbours[v];
                if adjacent.is_empty() {
                    pos[v] as f32
                } else {
                    adjacent.iter().map(|&n| pos[n] as f32).sum::<f32>() / adjacent.len() as f32
                }
            })
            .collect();

        let mut order: Vec<usize> = (0..layer.len()).collect();
        order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));

        let reordered: Vec<usize> = order.iter().map(|&i| layer[i]).collect();
        layer.copy_from_slice(&reordered);
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i;
        }
    }

    fn count_crossings(layers: &[Vec<usize>], lower: &[Vec<usize>], pos: &[usize]) -> usize {
        let mut total = 0usize;
        for layer in layers {
            let mut segments: Vec<(usize, usize)> = Vec::new();
            for &v in layer {
                for &w in &lower[v] {
                    segments.push((pos[v], pos[w]));
                }
            }
            for i in 0..segments.len() {
                for j in (i + 1)..segments.len() {
                    let (a0, a1) = segments[i];
                    let (b0, b1) = segments[j];
                    if (a0 < b0 && a1 > b1) || (a0 > b0 && a1 < b1) {
                        total += 1;
                    }
                }
            }
        }
        total
    }

    fn reduce_crossings(&self, aug: &Augmented, mut layers: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        let vertex_count = aug.ranks.len();
        let mut pos = Self::positions_of(&layers, vertex_count);
        let mut best = Self::count_crossings(&layers, &aug.lower, &pos);
        let mut best_layers = layers.clone();

        for _pass in 0..self.config.crossing_passes {
            if best == 0 {
                break;
            }

            for rank in 1..layers.len() {
                Self::sort_by_barycenter(&mut layers[rank], &aug.upper, &mut pos);
            }
            for rank in (0..layers.len().saturating_sub(1)).rev() {
                Self::sort_by_barycenter(&mut layers[rank], &aug.lower, &mut pos);
            }

            let crossings = Self::count_crossings(&layers, &aug.lower, &pos);
            if crossings >= best {
                break;
            }
            best = crossings;
            best_layers = layers.clone();
        }

        tracing::trace!(crossings = best, "crossing reduction finished");
        best_layers
    }

    fn separation(&self, widths: &[f32], a: usize, b: usize) -> f32 {
        (widths[a] + widths[b]) / 2.0 + self.config.node_separation
    }

    /// Place one layer as close to `desired` as the separations allow.
    ///
    /// Left and right sweeps each honour every pairwise separation, so their
    /// midpoint does too.
    fn place_layer(&self, layer: &[usize], widths: &[f32], desired: &[f32], x: &mut [f32]) {
        let n = layer.len();
        if n == 0 {
            return;
        }

        let mut left = vec![0.0f32; n];
        let mut right = vec![0.0f32; n];

        left[0] = desired[0];
        for i in 1..n {
            let sep = self.separation(widths, layer[i - 1], layer[i]);
            left[i] = desired[i].max(left[i - 1] + sep);
        }

        right[n - 1] = desired[n - 1];
        for i in (0..n - 1).rev() {
            let sep = self.separation(widths, layer[i], layer[i + 1]);
            right[i] = desired[i].min(right[i + 1] - sep);
        }

        for i in 0..n {
            x[layer[i]] = (left[i] + right[i]) / 2.0;
        }
    }

    fn desired_from(layer: &[usize], neighbours: &[Vec<usize>], x: &[f32]) -> Vec<f32> {
        layer
            .iter()
            .map(|&v| {
                let adjacent = &neighbours[v];
                if adjacent.is_empty() {
                    x[v]
                } else {
                    adjacent.iter().map(|&n| x[n]).sum::<f32>() / adjacent.len() as f32
                }
            })
            .collect()
    }

    fn assign_coordinates(&self, aug: &Augmented, layers: &[Vec<usize>]) -> Vec<f32> {
        let mut x = vec![0.0f32; aug.ranks.len()];

        for layer in layers {
            let mut cursor = 0.0f32;
            for (i, &v) in layer.iter().enumerate() {
                if i > 0 {
                    cursor += self.separation(&aug.widths, layer[i - 1], v);
                }
                x[v] = cursor;
            }
        }

        for _ in 0..self.config.alignment_passes {
            for layer in layers.iter().skip(1) {
                let desired = Self::desired_from(layer, &aug.upper, &x);
                self.place_layer(layer, &aug.widths, &desired, &mut x);
            }
            for layer in layers.iter().rev().skip(1) {
                let desired = Self::desired_from(layer, &aug.lower, &x);
                self.place_layer(layer, &aug.widths, &desired, &mut x);
            }
        }

        let min_extent = x
            .iter()
            .zip(&aug.widths)
            .map(|(&center, &width)| center - width / 2.0)
            .fold(f32::INFINITY, f32::min);
        if min_extent.is_finite() {
            for value in &mut x {
                *value -= min_extent;
            }
        }

        x
    }
}

impl LayeredLayout for SugiyamaLayout {
    fn arrange(&self, graph: &RankedGraph) -> Result<Arrangement> {
        Self::validate(graph)?;
        if graph.is_empty() {
            return Ok(Arrangement::default());
        }

        let aug = Self::augment(graph);
        let rank_count = aug.ranks.iter().copied().max().map_or(0, |r| r + 1);

        let layers = Self::initial_layers(&aug, rank_count);
        let layers = self.reduce_crossings(&aug, layers);
        let x = self.assign_coordinates(&aug, &layers);

        let real = graph.len();
        Ok(Arrangement {
            positions: x[..real].to_vec(),
            orders: layers
                .iter()
                .map(|layer| layer.iter().copied().filter(|&v| v < real).collect())
                .collect(),
            bends: aug
                .chains
                .iter()
                .map(|chain| chain.iter().map(|&d| x[d]).collect())
                .collect(),
        })
    }
}
