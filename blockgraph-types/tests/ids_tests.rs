use blockgraph_types::{IdGenerator, RandomIds, SequentialIds, generate_node_id};
use proptest::prelude::*;
use std::collections::HashSet;

// ── generate_node_id ─────────────────────────────────────────────

#[test]
fn generated_ids_are_unique() {
    let ids: HashSet<String> = (0..1000).map(|_| generate_node_id()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn generated_id_is_simple_uuid() {
    let id = generate_node_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(uuid::Uuid::parse_str(&id).is_ok());
}

#[test]
fn random_ids_generator_is_unique() {
    let mut ids = RandomIds;
    assert_ne!(ids.next_id(), ids.next_id());
}

// ── SequentialIds ────────────────────────────────────────────────

#[test]
fn sequential_ids_count_from_one() {
    let mut ids = SequentialIds::new("n");
    assert_eq!(ids.next_id(), "n1");
    assert_eq!(ids.next_id(), "n2");
    assert_eq!(ids.next_id(), "n3");
}

// ── Closures ─────────────────────────────────────────────────────

#[test]
fn closure_is_an_id_generator() {
    let mut counter = 0;
    let mut ids = || {
        counter += 1;
        format!("gen-{counter}")
    };
    assert_eq!(IdGenerator::next_id(&mut ids), "gen-1");
    assert_eq!(IdGenerator::next_id(&mut ids), "gen-2");
}

proptest! {
    #[test]
    fn sequential_ids_never_repeat(prefix in "[a-z]{0,4}", count in 1usize..200) {
        let mut ids = SequentialIds::new(prefix);
        let seen: HashSet<String> = (0..count).map(|_| ids.next_id()).collect();
        prop_assert_eq!(seen.len(), count);
    }
}
