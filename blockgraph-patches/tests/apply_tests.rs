use blockgraph_content::validate_document;
use blockgraph_patches::{Patch, PatchError, PatchOp, apply_patch, apply_patch_strict};
use blockgraph_schema::{BlockDeclaration, Schema, SlotDeclaration};
use blockgraph_types::{ContentNode, Document, SlotValue};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn initial() -> Document {
    Document::new("root")
        .with_node(
            ContentNode::new("root", "card")
                .with_config(json!({ "title": "Root" }))
                .with_children("children", &["a", "b"]),
        )
        .with_node(ContentNode::new("a", "text").with_config(json!({ "content": "A" })))
        .with_node(ContentNode::new("b", "text").with_config(json!({ "content": "B" })))
}

fn text(id: &str, content: &str) -> ContentNode {
    ContentNode::new(id, "text").with_config(json!({ "content": content }))
}

fn add(id: &str, node: ContentNode) -> PatchOp {
    PatchOp::AddNode {
        id: id.into(),
        node,
    }
}

fn reorder(id: &str, slot: &str, order: &[&str]) -> PatchOp {
    PatchOp::ReorderSlot {
        id: id.into(),
        slot_name: slot.into(),
        order: order.iter().map(|s| s.to_string()).collect(),
    }
}

// ── addNode ──────────────────────────────────────────────────────

#[test]
fn add_node_inserts_without_attaching() {
    let before = initial();
    let result = apply_patch(&before, &add("c", text("c", "C")).into());
    assert_eq!(result.len(), 4);
    assert_eq!(result.node("c"), Some(&text("c", "C")));
    assert_eq!(result.node("root"), before.node("root"));
}

#[test]
fn add_node_overwrites_existing() {
    let result = apply_patch(&initial(), &add("a", text("a", "A updated")).into());
    assert_eq!(result.node("a").unwrap().config["content"], "A updated");
    assert_eq!(result.len(), 3);
}

// ── removeNode ───────────────────────────────────────────────────

#[test]
fn remove_node_scrubs_list_slots() {
    let result = apply_patch(&initial(), &PatchOp::RemoveNode { id: "a".into() }.into());
    assert!(!result.contains("a"));
    assert_eq!(result.node("root").unwrap().slot_ids("children"), vec!["b"]);
}

#[test]
fn remove_node_drops_single_slot_key() {
    let document = Document::new("r")
        .with_node(ContentNode::new("r", "block").with_child("header", "h"))
        .with_node(ContentNode::new("h", "text"));
    let result = apply_patch(&document, &PatchOp::RemoveNode { id: "h".into() }.into());
    assert!(!result.contains("h"));
    assert!(result.node("r").unwrap().slot("header").is_none());
}

#[test]
fn remove_node_keeps_unaffected_nodes_shared() {
    let document = initial().with_node(ContentNode::new("other", "card").with_children("children", &["b"]));
    let result = apply_patch(&document, &PatchOp::RemoveNode { id: "a".into() }.into());
    assert!(Arc::ptr_eq(&document.nodes["other"], &result.nodes["other"]));
    assert!(Arc::ptr_eq(&document.nodes["b"], &result.nodes["b"]));
    assert!(!Arc::ptr_eq(&document.nodes["root"], &result.nodes["root"]));
}

#[test]
fn remove_missing_node_changes_nothing() {
    let before = initial();
    let result = apply_patch(&before, &PatchOp::RemoveNode { id: "ghost".into() }.into());
    assert_eq!(result, before);
}

// ── updateConfig ─────────────────────────────────────────────────

#[test]
fn update_config_replaces_whole_config() {
    let op = PatchOp::UpdateConfig {
        id: "root".into(),
        config: json!({ "subtitle": "New" }).as_object().unwrap().clone(),
    };
    let result = apply_patch(&initial(), &op.into());
    let root = result.node("root").unwrap();
    assert_eq!(root.config.get("title"), None);
    assert_eq!(root.config["subtitle"], "New");
    assert_eq!(root.slot_ids("children"), vec!["a", "b"]);
}

#[test]
fn update_config_on_missing_node_is_noop() {
    let before = initial();
    let op = PatchOp::UpdateConfig {
        id: "missing".into(),
        config: Default::default(),
    };
    assert_eq!(apply_patch(&before, &op.into()), before);
}

// ── reorderSlot ──────────────────────────────────────────────────

#[test]
fn reorder_sets_slot_verbatim() {
    let result = apply_patch(&initial(), &reorder("root", "children", &["b", "a", "b", "ghost"]).into());
    assert_eq!(
        result.node("root").unwrap().slot_ids("children"),
        vec!["b", "a", "b", "ghost"]
    );
}

#[test]
fn reorder_writes_list_even_for_new_slot() {
    let result = apply_patch(&initial(), &reorder("a", "extra", &["b"]).into());
    assert_eq!(
        result.node("a").unwrap().slot("extra"),
        Some(&SlotValue::Ids(vec!["b".into()]))
    );
}

#[test]
fn reorder_on_missing_node_is_noop() {
    let before = initial();
    assert_eq!(apply_patch(&before, &reorder("missing", "children", &[]).into()), before);
}

// ── Batches & strictness ─────────────────────────────────────────

#[test]
fn batch_applies_in_order() {
    let patch = Patch::Batch(vec![
        add("c", text("c", "C")),
        reorder("root", "children", &["a", "b", "c"]),
    ]);
    let result = apply_patch(&initial(), &patch);
    assert_eq!(result.node("root").unwrap().slot_ids("children"), vec!["a", "b", "c"]);
    assert!(result.contains("c"));
}

#[test]
fn later_ops_see_earlier_results() {
    let patch = Patch::Batch(vec![
        add("c", text("c", "C")),
        PatchOp::UpdateConfig {
            id: "c".into(),
            config: json!({ "content": "changed" }).as_object().unwrap().clone(),
        },
    ]);
    let result = apply_patch(&initial(), &patch);
    assert_eq!(result.node("c").unwrap().config["content"], "changed");
}

#[test]
fn empty_batch_is_identity() {
    let before = initial();
    assert_eq!(apply_patch(&before, &Patch::Batch(Vec::new())), before);
}

#[test]
fn strict_reports_missing_node() {
    let err = apply_patch_strict(&initial(), &reorder("missing", "children", &[]).into()).unwrap_err();
    assert_eq!(err, PatchError::NodeNotFound("missing".into()));
}

#[test]
fn strict_matches_lenient_on_valid_patch() {
    let patch = Patch::Batch(vec![
        add("c", text("c", "C")),
        reorder("root", "children", &["c"]),
        PatchOp::RemoveNode { id: "a".into() },
    ]);
    let before = initial();
    assert_eq!(apply_patch_strict(&before, &patch).unwrap(), apply_patch(&before, &patch));
}

// ── Wire format ──────────────────────────────────────────────────

#[test]
fn deserializes_single_and_batch_patches() {
    let single: Patch = serde_json::from_value(json!({
        "type": "reorderSlot", "id": "root", "slotName": "children", "order": ["b", "a"]
    }))
    .unwrap();
    assert_eq!(single, Patch::Single(reorder("root", "children", &["b", "a"])));

    let batch: Patch = serde_json::from_value(json!([
        { "type": "addNode", "id": "c", "node": { "id": "c", "block": "text", "config": { "content": "C" } } },
        { "type": "removeNode", "id": "a" },
        { "type": "updateConfig", "id": "b", "config": {} }
    ]))
    .unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.ops()[0], add("c", text("c", "C")));
    assert_eq!(batch.ops()[1].kind(), "removeNode");
    assert_eq!(batch.ops()[2].target(), "b");
}

#[test]
fn serializes_with_type_tag() {
    let value = serde_json::to_value(reorder("root", "children", &["a"])).unwrap();
    assert_eq!(
        value,
        json!({ "type": "reorderSlot", "id": "root", "slotName": "children", "order": ["a"] })
    );
}

// ── Properties ───────────────────────────────────────────────────

fn schema() -> Schema {
    Schema::builder()
        .block(BlockDeclaration::new("text"))
        .block(BlockDeclaration::new("card").slot(SlotDeclaration::multiple("children")))
        .build()
}

fn arb_op() -> impl Strategy<Value = PatchOp> {
    let id = prop::sample::select(vec!["root", "a", "b", "c", "d"]);
    prop_oneof![
        id.clone().prop_map(|id| add(id, text(id, "new"))),
        id.clone().prop_map(|id| PatchOp::RemoveNode { id: id.into() }),
        id.clone().prop_map(|id| PatchOp::UpdateConfig {
            id: id.into(),
            config: Default::default(),
        }),
        (id.clone(), prop::collection::vec(id, 0..4)).prop_map(|(id, order)| reorder(id, "children", &order)),
    ]
}

proptest! {
    #[test]
    fn patching_never_mutates_input(ops in prop::collection::vec(arb_op(), 0..12)) {
        let before = initial();
        let snapshot = before.to_value().unwrap();
        let _ = apply_patch(&before, &Patch::Batch(ops));
        prop_assert_eq!(before.to_value().unwrap(), snapshot);
    }

    #[test]
    fn removal_leaves_no_references(ops in prop::collection::vec(arb_op(), 0..12)) {
        let result = apply_patch(&initial(), &Patch::Batch(ops));
        let result = apply_patch(&result, &PatchOp::RemoveNode { id: "a".into() }.into());
        prop_assert!(!result.contains("a"));
        prop_assert!(result.nodes.values().all(|node| !node.references("a")));
    }

    #[test]
    fn add_and_reorder_of_existing_ids_stays_valid(count in 0usize..6) {
        let ids: Vec<String> = (0..count).map(|i| format!("n{i}")).collect();
        let mut ops: Vec<PatchOp> = ids
            .iter()
            .map(|id| add(id, ContentNode::new(id.clone(), "text")))
            .collect();
        let order: Vec<&str> = ids.iter().map(String::as_str).collect();
        ops.push(reorder("root", "children", &order));

        let start = Document::new("root").with_node(ContentNode::new("root", "card"));
        let result = apply_patch(&start, &Patch::Batch(ops));
        let validation = validate_document(&schema(), &result);
        prop_assert!(validation.is_valid(), "{:?}", validation.errors);
    }
}
