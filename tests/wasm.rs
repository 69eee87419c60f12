//! Browser-side tests of the JS facade.
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use lineage_graph_wasm::LineageGraphWasm;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawMember<'a> {
    id: &'a str,
    parent_ids: Vec<&'a str>,
}

fn snapshot() -> JsValue {
    let members = vec![
        RawMember { id: "a", parent_ids: vec![] },
        RawMember { id: "b", parent_ids: vec!["a"] },
        RawMember { id: "c", parent_ids: vec!["a", "b"] },
    ];
    serde_wasm_bindgen::to_value(&members).unwrap()
}

#[wasm_bindgen_test]
fn validate_move_returns_structured_rejection() {
    let engine = LineageGraphWasm::new();
    let result = engine.validate_move(snapshot(), "a", "c").unwrap();

    let valid = js_sys::Reflect::get(&result, &"valid".into()).unwrap();
    let reason = js_sys::Reflect::get(&result, &"reason".into()).unwrap();
    assert_eq!(valid.as_bool(), Some(false));
    assert_eq!(reason.as_string().as_deref(), Some("WouldCreateCycle"));
}

#[wasm_bindgen_test]
fn generation_for_new_uses_deepest_parent() {
    let engine = LineageGraphWasm::new();
    let generation = engine
        .generation_for_new(snapshot(), vec!["a".to_string(), "c".to_string()])
        .unwrap();
    assert_eq!(generation, 4);
}

#[wasm_bindgen_test]
fn layout_fills_positions_and_drop_targets() {
    let mut engine = LineageGraphWasm::new();
    engine.layout(snapshot()).unwrap();

    let positions = engine.get_positions().to_vec();
    assert_eq!(positions.len(), 6);
    // rows: a, b, c top-left y
    assert!(positions[1] < positions[3] && positions[3] < positions[5]);

    let (x, y) = (positions[2] + 100.0, positions[3] + 50.0);
    assert_eq!(engine.node_at(x, y).as_deref(), Some("b"));
    assert_eq!(engine.drop_target(x, y, "b"), None);
}

#[wasm_bindgen_test]
fn cyclic_snapshot_throws() {
    let members = vec![
        RawMember { id: "a", parent_ids: vec!["b"] },
        RawMember { id: "b", parent_ids: vec!["a"] },
    ];
    let mut engine = LineageGraphWasm::new();
    assert!(engine.layout(serde_wasm_bindgen::to_value(&members).unwrap()).is_err());
}

#[wasm_bindgen_test]
fn colors_are_stable() {
    let engine = LineageGraphWasm::new();
    assert_eq!(engine.color_for(0), "#6b7280");
    let first = engine.color_for(3);
    engine.reset_colors();
    assert_eq!(engine.color_for(3), first);
}
