//! Layout for lineage visualization.
//!
//! Generations fix the rank of every member; a layered algorithm orders the
//! members inside each rank to keep parent→child connectors from crossing,
//! then spreads them so boxes never overlap. Output positions are plain
//! canvas coordinates for the rendering layer.

mod engine;
pub mod layered;

pub use engine::{
    GenerationBand, Layout, LayoutConfig, LayoutEdge, LayoutEngine, Point, PositionedNode,
    RankDirection,
};
pub use layered::{LayeredLayout, SugiyamaConfig, SugiyamaLayout};
