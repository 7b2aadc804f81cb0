use blockgraph_content::{validate_content, validate_document};
use blockgraph_schema::{BlockDeclaration, Schema, SlotDeclaration};
use blockgraph_types::{ContentNode, Document};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn schema() -> Schema {
    Schema::builder()
        .block(BlockDeclaration::new("text").config_schema(json!({
            "type": "object",
            "properties": { "content": { "type": "string" } },
            "required": ["content"]
        })))
        .block(
            BlockDeclaration::new("card")
                .config_schema(json!({
                    "type": "object",
                    "properties": { "title": { "type": "string" } }
                }))
                .slot(SlotDeclaration::multiple("children"))
                .slot(SlotDeclaration::single("footer")),
        )
        .build()
}

fn card_document() -> Value {
    json!({
        "entryId": "card1",
        "nodes": {
            "card1": { "id": "card1", "block": "card", "config": { "title": "Card" }, "children": ["t1", "t2"] },
            "t1": { "id": "t1", "block": "text", "config": { "content": "A" } },
            "t2": { "id": "t2", "block": "text", "config": { "content": "B" } }
        }
    })
}

fn messages(content: &Value) -> Vec<String> {
    validate_content(&schema(), content)
        .errors
        .into_iter()
        .map(|e| e.message)
        .collect()
}

// ── Valid documents ──────────────────────────────────────────────

#[test]
fn accepts_single_node_document() {
    let content = json!({
        "entryId": "root",
        "nodes": { "root": { "id": "root", "block": "text", "config": { "content": "Hello" } } }
    });
    let result = validate_content(&schema(), &content);
    assert!(result.is_valid());
    assert!(result.errors.is_empty());
}

#[test]
fn accepts_slot_references() {
    assert!(validate_content(&schema(), &card_document()).is_valid());
}

#[test]
fn missing_config_is_treated_as_empty_object() {
    let content = json!({
        "entryId": "c",
        "nodes": { "c": { "id": "c", "block": "card" } }
    });
    assert!(validate_content(&schema(), &content).is_valid());
}

#[test]
fn null_slot_value_is_allowed() {
    let content = json!({
        "entryId": "c",
        "nodes": { "c": { "id": "c", "block": "card", "config": {}, "footer": null } }
    });
    assert!(validate_content(&schema(), &content).is_valid());
}

// ── Envelope ─────────────────────────────────────────────────────

#[test]
fn rejects_non_object_content() {
    for content in [Value::Null, json!(1), json!([])] {
        let result = validate_content(&schema(), &content);
        assert!(!result.is_valid());
        assert!(result.errors[0].message.contains("object"));
    }
}

#[test]
fn rejects_missing_or_empty_entry_id() {
    let result = validate_content(&schema(), &json!({ "nodes": {} }));
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "entryId"));

    let result = validate_content(&schema(), &json!({ "entryId": "", "nodes": {} }));
    assert!(!result.is_valid());
}

#[test]
fn rejects_missing_nodes_without_node_checks() {
    let result = validate_content(&schema(), &json!({ "entryId": "root", "nodes": [] }));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "nodes");
}

#[test]
fn rejects_entry_id_not_in_nodes() {
    let content = json!({
        "entryId": "missing",
        "nodes": { "root": { "id": "root", "block": "text", "config": { "content": "Hi" } } }
    });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "entryId");
    assert!(result.errors[0].message.contains("not in nodes"));
}

// ── Per node ─────────────────────────────────────────────────────

#[test]
fn rejects_unknown_block_type() {
    let content = json!({
        "entryId": "root",
        "nodes": { "root": { "id": "root", "block": "unknown", "config": {} } }
    });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors[0].path, "nodes.root.block");
    assert_eq!(result.errors[0].message, "Unknown block type: unknown");
}

#[test]
fn rejects_config_that_fails_its_schema() {
    let content = json!({
        "entryId": "root",
        "nodes": { "root": { "id": "root", "block": "text", "config": {} } }
    });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "nodes.root.config");
    assert!(result.errors[0].message.contains("content"));
}

#[test]
fn rejects_non_object_config() {
    let content = json!({
        "entryId": "root",
        "nodes": { "root": { "id": "root", "block": "text", "config": "nope" } }
    });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors[0].path, "nodes.root.config");
}

#[test]
fn rejects_id_that_does_not_match_key() {
    let content = json!({
        "entryId": "root",
        "nodes": { "root": { "id": "other", "block": "text", "config": { "content": "Hi" } } }
    });
    assert_eq!(
        messages(&content),
        vec!["Node id \"other\" must match map key \"root\"".to_string()]
    );
}

#[test]
fn rejects_non_object_node() {
    let content = json!({ "entryId": "root", "nodes": { "root": "text" } });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors[0].path, "nodes.root");
}

#[test]
fn rejects_undeclared_slot() {
    let content = json!({
        "entryId": "root",
        "nodes": { "root": { "id": "root", "block": "text", "config": { "content": "Hi" }, "children": [] } }
    });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors[0].path, "nodes.root");
    assert_eq!(
        result.errors[0].message,
        "Unknown slot \"children\" for block type \"text\""
    );
}

#[test]
fn rejects_bare_id_in_multiple_slot() {
    let content = json!({
        "entryId": "c",
        "nodes": {
            "c": { "id": "c", "block": "card", "config": {}, "children": "t" },
            "t": { "id": "t", "block": "text", "config": { "content": "x" } }
        }
    });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "nodes.c.children");
}

#[test]
fn rejects_non_string_ids_in_multiple_slot() {
    let content = json!({
        "entryId": "c",
        "nodes": { "c": { "id": "c", "block": "card", "config": {}, "children": [1] } }
    });
    let result = validate_content(&schema(), &content);
    assert!(result.errors[0].message.contains("only string ids"));
}

#[test]
fn rejects_list_in_single_slot() {
    let content = json!({
        "entryId": "c",
        "nodes": {
            "c": { "id": "c", "block": "card", "config": {}, "footer": ["t"] },
            "t": { "id": "t", "block": "text", "config": { "content": "x" } }
        }
    });
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "nodes.c.footer");
}

#[test]
fn reports_only_first_problem_per_node() {
    let content = json!({
        "entryId": "root",
        "nodes": { "root": { "id": "other", "block": "unknown", "config": 3 } }
    });
    assert_eq!(validate_content(&schema(), &content).errors.len(), 1);
}

#[test]
fn accumulates_problems_across_nodes() {
    let content = json!({
        "entryId": "a",
        "nodes": {
            "a": { "id": "a", "block": "unknown" },
            "b": { "id": "x", "block": "text", "config": { "content": "y" } }
        }
    });
    assert_eq!(validate_content(&schema(), &content).errors.len(), 2);
}

// ── Referential integrity ────────────────────────────────────────

#[test]
fn rejects_dangling_reference_in_list() {
    let mut content = card_document();
    content["nodes"]["card1"]["children"] = json!(["t1", "ghost"]);
    let result = validate_content(&schema(), &content);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "nodes.card1.children");
    assert_eq!(
        result.errors[0].message,
        "Referenced id \"ghost\" is not in nodes (dangling reference)"
    );
}

#[test]
fn rejects_dangling_reference_in_single_slot() {
    let mut content = card_document();
    content["nodes"]["card1"]["footer"] = json!("ghost");
    let result = validate_content(&schema(), &content);
    assert!(result.errors.iter().any(|e| e.path == "nodes.card1.footer"));
}

#[test]
fn dangling_references_follow_node_checks() {
    let content = json!({
        "entryId": "missing",
        "nodes": { "c": { "id": "c", "block": "card", "config": {}, "children": ["ghost"] } }
    });
    let paths: Vec<String> = validate_content(&schema(), &content)
        .errors
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert_eq!(paths, vec!["entryId", "nodes.c.children"]);
}

// ── Typed documents ──────────────────────────────────────────────

#[test]
fn validates_typed_document() {
    let document = Document::new("c")
        .with_node(ContentNode::new("c", "card").with_children("children", &["t"]))
        .with_node(ContentNode::new("t", "text").with_config(json!({ "content": "x" })));
    assert!(validate_document(&schema(), &document).is_valid());

    let broken = document.with_node(ContentNode::new("t", "text"));
    let result = validate_document(&schema(), &broken);
    assert_eq!(result.errors[0].path, "nodes.t.config");
}
