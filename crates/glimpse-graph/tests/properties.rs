//! Property-based tests for graph serialization using proptest.
//!
//! Random graphs of `Node` objects linked through an ordered `links`
//! collection and an optional `next` reference, cycles and self-loops
//! included.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use glimpse_graph::{FixtureGraph, GraphSerializer, PropertyResult};
use glimpse_schema::{
    ClassDescriptor, PropertyDescriptor, SchemaRegistry, Transform, TransformRegistry,
};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn schema() -> Arc<SchemaRegistry> {
    let transforms = TransformRegistry::builtin();
    let identity = transforms.get("identity").cloned().unwrap_or_else(Transform::identity);

    let node = ClassDescriptor::new("Node")
        .with_property(
            PropertyDescriptor::builder("links", "NSArray")
                .transform(identity.clone())
                .build()
                .unwrap(),
        )
        .with_property(
            PropertyDescriptor::builder("next", "Node")
                .transform(identity)
                .build()
                .unwrap(),
        );

    Arc::new(SchemaRegistry::builder().class(node).build().unwrap())
}

/// `(links, next)` per object, as indexes into the object list.
type Shape = Vec<(Vec<usize>, Option<usize>)>;

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (1usize..=12).prop_flat_map(|count| {
        prop::collection::vec(
            (
                prop::collection::vec(0..count, 0..=3),
                prop::option::of(0..count),
            ),
            count,
        )
    })
}

fn build(shape: &Shape) -> FixtureGraph {
    let mut objects = Map::new();
    for (index, (links, next)) in shape.iter().enumerate() {
        let links: Vec<String> = links.iter().map(|l| format!("n{l}")).collect();
        let mut attributes = json!({ "links": { "$refs": links } });
        if let Some(next) = next {
            attributes["next"] = json!({ "$ref": format!("n{next}") });
        }
        objects.insert(format!("n{index}"), json!({ "class": ["Node"], "attributes": attributes }));
    }

    FixtureGraph::from_json(&json!({ "root": "n0", "objects": objects }).to_string()).unwrap()
}

fn reachable(shape: &Shape) -> usize {
    let mut seen = HashSet::from([0]);
    let mut queue = VecDeque::from([0]);
    while let Some(index) = queue.pop_front() {
        let (links, next) = &shape[index];
        for target in links.iter().chain(next.iter()) {
            if seen.insert(*target) {
                queue.push_back(*target);
            }
        }
    }
    seen.len()
}

fn referenced_ids(result: &PropertyResult) -> Vec<String> {
    match result.single() {
        Some(Value::String(id)) => vec![id.clone()],
        Some(Value::Array(ids)) => ids.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: exactly the reachable objects are serialized, once each
    #[test]
    fn prop_covers_reachable_objects(shape in shape_strategy()) {
        let graph = build(&shape);
        let snapshot = GraphSerializer::new(schema()).serialize(&graph.root()).unwrap();

        prop_assert_eq!(snapshot.len(), reachable(&shape));
        prop_assert_eq!(snapshot.root_object.to_string(), "$1");
        prop_assert!(snapshot.root().is_some());
    }

    /// Property: every identifier a node refers to names a serialized node
    #[test]
    fn prop_references_resolve(shape in shape_strategy()) {
        let graph = build(&shape);
        let snapshot = GraphSerializer::new(schema()).serialize(&graph.root()).unwrap();

        let ids: HashSet<String> = snapshot.objects.keys().map(|id| id.to_string()).collect();
        for (id, node) in &snapshot.objects {
            prop_assert_eq!(*id, node.id);
            for result in node.properties.values() {
                for target in referenced_ids(result) {
                    prop_assert!(ids.contains(&target), "dangling reference {}", target);
                }
            }
        }
    }

    /// Property: the same live graph serializes to the same document twice
    #[test]
    fn prop_repeatable(shape in shape_strategy()) {
        let graph = build(&shape);
        let serializer = GraphSerializer::new(schema());

        let first = serializer.serialize_json(&graph.root()).unwrap();
        let second = serializer.serialize_json(&graph.root()).unwrap();
        prop_assert_eq!(first, second);
    }
}
