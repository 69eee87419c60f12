//! Lineage Graph - WASM Module
//!
//! Core engine for a multi-parent lineage tree: structural validation,
//! generation numbering, layered layout and per-generation colors. It is
//! compiled to WebAssembly and exposes a JavaScript-friendly API via
//! wasm-bindgen.
//!
//! The engine holds no member data between calls. Every operation takes the
//! full member snapshot and derives its answer from scratch; the caller owns
//! persistence.
//!
//! # Architecture
//!
//! - `graph`: member model, slot index, queries, edit validation, generations
//! - `layout`: generation-ranked layered layout
//! - `color`: golden-angle generation palette
//! - `spatial`: R-tree over laid-out boxes for drop-target hit testing

use js_sys::Float32Array;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod color;
pub mod error;
pub mod graph;
pub mod layout;
pub mod spatial;

use color::{GenerationPalette, PaletteConfig};
use error::{Error, Result};
use graph::{edit, query, Member, NodeId};
use layout::{LayoutConfig, LayoutEngine};
use spatial::DropTargetIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Result type of the exported methods; errors surface in JS as thrown `Error`s.
type JsResult<T> = std::result::Result<T, JsError>;

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| Error::Serialization(e.to_string()))
}

fn from_js_or_default<T: DeserializeOwned + Default>(value: JsValue) -> Result<T> {
    if value.is_undefined() || value.is_null() {
        Ok(T::default())
    } else {
        from_js(value)
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Error::Serialization(e.to_string()))
}

fn ids(members: Vec<&Member>) -> Vec<String> {
    members.into_iter().map(|m| m.id.to_string()).collect()
}

/// Main entry point for the lineage engine.
///
/// Owns only configuration, the color cache and the hit-test index of the
/// most recent layout.
#[wasm_bindgen]
pub struct LineageGraphWasm {
    engine: LayoutEngine,
    palette: GenerationPalette,
    targets: DropTargetIndex,
    /// [x0, y0, x1, y1, ...] top-left corners of the last layout.
    positions: Vec<f32>,
}

impl Default for LineageGraphWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl LineageGraphWasm {
    /// Create an engine with default layout and palette settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: LayoutEngine::with_defaults(),
            palette: GenerationPalette::with_defaults(),
            targets: DropTargetIndex::new(),
            positions: Vec::new(),
        }
    }

    /// Create an engine from partial layout and palette configs.
    ///
    /// Missing fields and `undefined` configs fall back to the defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        layout_config: JsValue,
        palette_config: JsValue,
    ) -> JsResult<LineageGraphWasm> {
        let layout: LayoutConfig = from_js_or_default(layout_config)?;
        let palette: PaletteConfig = from_js_or_default(palette_config)?;
        Ok(Self {
            engine: LayoutEngine::new(layout),
            palette: GenerationPalette::new(palette),
            targets: DropTargetIndex::new(),
            positions: Vec::new(),
        })
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check whether `movingId` may gain `newParentId` as a parent.
    ///
    /// Returns `{ valid, reason? }`; a refusal is a value, not a thrown error.
    #[wasm_bindgen(js_name = validateMove)]
    pub fn validate_move(
        &self,
        nodes: JsValue,
        moving_id: &str,
        new_parent_id: &str,
    ) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&graph::validate_move(&nodes, moving_id, new_parent_id))?)
    }

    /// Check whether `nodeId` can drop `parentId` (or all parents when omitted).
    #[wasm_bindgen(js_name = validateUnlink)]
    pub fn validate_unlink(
        &self,
        nodes: JsValue,
        node_id: &str,
        parent_id: Option<String>,
    ) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&graph::validate_unlink(&nodes, node_id, parent_id.as_deref()))?)
    }

    /// Check a full parent list for a new or edited member.
    #[wasm_bindgen(js_name = validateParentIds)]
    pub fn validate_parent_ids(
        &self,
        nodes: JsValue,
        node_id: &str,
        parent_ids: Vec<String>,
    ) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        let parent_ids: Vec<NodeId> = parent_ids.into_iter().map(NodeId::from).collect();
        Ok(to_js(&graph::validate_parent_ids(&nodes, node_id, &parent_ids))?)
    }

    // =========================================================================
    // Generations
    // =========================================================================

    /// Map of member id to generation.
    #[wasm_bindgen(js_name = resolveGenerations)]
    pub fn resolve_generations(&self, nodes: JsValue) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&graph::resolve_generations(&nodes)?)?)
    }

    /// Generation a new member would receive under the given parents.
    #[wasm_bindgen(js_name = generationForNew)]
    pub fn generation_for_new(&self, nodes: JsValue, parent_ids: Vec<String>) -> JsResult<u32> {
        let nodes: Vec<Member> = from_js(nodes)?;
        let parent_ids: Vec<NodeId> = parent_ids.into_iter().map(NodeId::from).collect();
        Ok(graph::generation_for_new(&nodes, &parent_ids)?)
    }

    /// `[{ id, previous, current }]` for an edited member and its subtree.
    #[wasm_bindgen(js_name = affectedGenerations)]
    pub fn affected_generations(&self, nodes: JsValue, edited_id: &str) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&graph::affected_generations(&nodes, edited_id)?)?)
    }

    /// Member count per generation.
    #[wasm_bindgen(js_name = countByGeneration)]
    pub fn count_by_generation(&self, nodes: JsValue) -> JsResult<JsValue> {
        let nodes: Vec<Member> = graph::annotate(&from_js::<Vec<Member>>(nodes)?)?;
        Ok(to_js(&query::count_by_generation(&nodes))?)
    }

    // =========================================================================
    // Edits (each returns the next snapshot with generations re-derived)
    // =========================================================================

    /// Add `parentId` to `childId`'s parents, keeping the existing ones.
    ///
    /// Throws if the link is refused or the snapshot is corrupted.
    #[wasm_bindgen(js_name = attach)]
    pub fn attach(&self, nodes: JsValue, child_id: &str, parent_id: &str) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&edit::attach(&nodes, child_id, parent_id)?)?)
    }

    /// Replace `childId`'s parents with the single `parentId`.
    #[wasm_bindgen(js_name = moveUnder)]
    pub fn move_under(&self, nodes: JsValue, child_id: &str, parent_id: &str) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&edit::move_under(&nodes, child_id, parent_id)?)?)
    }

    /// Drop `parentId` from `childId`, or every parent when omitted.
    ///
    /// Unlinking a root from everything returns the snapshot unchanged.
    #[wasm_bindgen(js_name = unlink)]
    pub fn unlink(
        &self,
        nodes: JsValue,
        child_id: &str,
        parent_id: Option<String>,
    ) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&edit::unlink(&nodes, child_id, parent_id.as_deref())?)?)
    }

    /// Remove a member; its children inherit its parents.
    #[wasm_bindgen(js_name = remove)]
    pub fn remove(&self, nodes: JsValue, id: &str) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(to_js(&edit::remove(&nodes, id)?)?)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Ids of members without parents.
    #[wasm_bindgen(js_name = roots)]
    pub fn roots(&self, nodes: JsValue) -> JsResult<Vec<String>> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(ids(query::roots(&nodes)))
    }

    /// Ids of the children of `id`, by sibling order.
    #[wasm_bindgen(js_name = children)]
    pub fn children(&self, nodes: JsValue, id: &str) -> JsResult<Vec<String>> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(ids(query::children(&nodes, id)))
    }

    /// Ids of the parents of `id`, in parent-list order.
    #[wasm_bindgen(js_name = parents)]
    pub fn parents(&self, nodes: JsValue, id: &str) -> JsResult<Vec<String>> {
        let nodes: Vec<Member> = from_js(nodes)?;
        let node = nodes
            .iter()
            .find(|n| n.id.as_str() == id)
            .ok_or_else(|| Error::NodeNotFound(NodeId::from(id)))?;
        Ok(ids(query::parents(&nodes, node)))
    }

    /// Ids of every ancestor of `id`, breadth-first.
    #[wasm_bindgen(js_name = ancestors)]
    pub fn ancestors(&self, nodes: JsValue, id: &str) -> JsResult<Vec<String>> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(ids(query::ancestors(&nodes, id)))
    }

    /// Ids of every descendant of `id`, breadth-first.
    #[wasm_bindgen(js_name = descendants)]
    pub fn descendants(&self, nodes: JsValue, id: &str) -> JsResult<Vec<String>> {
        let nodes: Vec<Member> = from_js(nodes)?;
        Ok(ids(query::descendants(&nodes, id)))
    }

    // =========================================================================
    // Layout & Hit Testing
    // =========================================================================

    /// Lay out a snapshot: `{ nodes, edges, bands, width, height }`.
    ///
    /// Also rebuilds the drop-target index and the flat position buffer.
    #[wasm_bindgen(js_name = layout)]
    pub fn layout(&mut self, nodes: JsValue) -> JsResult<JsValue> {
        let nodes: Vec<Member> = from_js(nodes)?;
        let layout = self.engine.layout(&nodes)?;

        self.targets = DropTargetIndex::from_layout(&layout);
        self.positions = layout.nodes.iter().flat_map(|n| [n.x, n.y]).collect();

        Ok(to_js(&layout)?)
    }

    /// Top-left corners of the last layout as [x0, y0, x1, y1, ...],
    /// in snapshot order.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        Float32Array::from(self.positions.as_slice())
    }

    /// Member under the point in the last layout.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32) -> Option<String> {
        self.targets.node_at(x, y).map(ToString::to_string)
    }

    /// Member the dragged node would land on at this point.
    #[wasm_bindgen(js_name = dropTarget)]
    pub fn drop_target(&self, x: f32, y: f32, dragged_id: &str) -> Option<String> {
        self.targets.drop_target(x, y, dragged_id).map(ToString::to_string)
    }

    /// Closest member within `maxDistance` of the point.
    #[wasm_bindgen(js_name = findNearestNodeWithin)]
    pub fn find_nearest_node_within(&self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        self.targets
            .nearest_within(x, y, max_distance)
            .map(ToString::to_string)
    }

    /// Members fully inside the rectangle.
    #[wasm_bindgen(js_name = findNodesInRect)]
    pub fn find_nodes_in_rect(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Vec<String> {
        self.targets
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    // =========================================================================
    // Colors
    // =========================================================================

    /// `#rrggbb` for a generation.
    #[wasm_bindgen(js_name = colorFor)]
    pub fn color_for(&self, generation: u32) -> String {
        self.palette.color_for(generation).to_hex()
    }

    /// Clear the memoized colors.
    #[wasm_bindgen(js_name = resetColors)]
    pub fn reset_colors(&self) {
        self.palette.reset();
    }
}
