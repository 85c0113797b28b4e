//! Construction invariants for `build_graph` over generated record sets.

use std::collections::HashSet;

use proptest::prelude::*;

use boardnet_core::{EdgeRecord, NodeId, NodeKind, NodeRecord, RelationshipType, build_graph};

fn nodes(count: usize) -> Vec<NodeRecord> {
    (0..count)
        .map(|i| {
            let kind = if i % 3 == 0 {
                NodeKind::Organization
            } else {
                NodeKind::Member
            };
            NodeRecord::new(format!("n{i}"), kind)
        })
        .collect()
}

/// A node count plus edges between distinct nodes, possibly repeated.
fn network() -> impl Strategy<Value = (usize, Vec<EdgeRecord>)> {
    (2usize..9).prop_flat_map(|count| {
        let edge = (0..count, 1..count, 0..RelationshipType::ALL.len(), 0.0f64..=1.0, 0.0f64..=1.0)
            .prop_map(move |(a, offset, t, strength, confidence)| {
                let b = (a + offset) % count;
                EdgeRecord::new(
                    format!("n{a}"),
                    format!("n{b}"),
                    RelationshipType::ALL[t],
                    strength,
                    confidence,
                )
            });
        (Just(count), prop::collection::vec(edge, 0..24))
    })
}

fn flipped(record: &EdgeRecord) -> EdgeRecord {
    EdgeRecord {
        source_id: record.target_id.clone(),
        target_id: record.source_id.clone(),
        ..record.clone()
    }
}

proptest! {
    #[test]
    fn content_hash_ignores_submission_order((count, edges) in network()) {
        let forward = build_graph(&nodes(count), &edges).expect("build");

        let mut reversed_nodes = nodes(count);
        reversed_nodes.reverse();
        let reversed_edges: Vec<EdgeRecord> = edges.iter().rev().map(flipped).collect();
        let backward = build_graph(&reversed_nodes, &reversed_edges).expect("build");

        prop_assert_eq!(forward.content_hash(), backward.content_hash());
        prop_assert_eq!(forward.edge_count(), backward.edge_count());
    }

    #[test]
    fn edges_are_unique_per_pair_and_type((count, edges) in network()) {
        let graph = build_graph(&nodes(count), &edges).expect("build");

        let mut seen: HashSet<(NodeId, NodeId, RelationshipType)> = HashSet::new();
        for edge in graph.all_edges() {
            prop_assert_ne!(&edge.source, &edge.target);
            let (lo, hi) = if edge.source <= edge.target {
                (edge.source.clone(), edge.target.clone())
            } else {
                (edge.target.clone(), edge.source.clone())
            };
            prop_assert!(seen.insert((lo, hi, edge.relationship_type)));
        }
        prop_assert!(graph.edge_count() <= edges.len());
    }

    #[test]
    fn merged_edges_keep_the_strongest_evidence((count, edges) in network()) {
        let graph = build_graph(&nodes(count), &edges).expect("build");

        for edge in graph.all_edges() {
            let submitted = edges.iter().filter(|r| {
                r.relationship_type == edge.relationship_type.as_str()
                    && ((r.source_id == edge.source.as_str() && r.target_id == edge.target.as_str())
                        || (r.source_id == edge.target.as_str() && r.target_id == edge.source.as_str()))
            });
            let max_strength = submitted.clone().map(|r| r.strength).fold(0.0, f64::max);
            let max_confidence = submitted
                .filter_map(|r| r.confidence)
                .fold(0.0, f64::max);
            prop_assert!((edge.strength - max_strength).abs() < 1e-12);
            prop_assert!((edge.confidence - max_confidence).abs() < 1e-12);
        }
    }
}
