//! Graph fixtures for unit tests.

use boardnet_core::{BoardGraph, EdgeRecord, NodeKind, NodeRecord, RelationshipType, build_graph};

/// Members only; edges as `(source, target, type, strength)` at full confidence.
pub fn graph(ids: &[&str], edges: &[(&str, &str, &str, f64)]) -> BoardGraph {
    let nodes: Vec<(&str, NodeKind)> = ids.iter().map(|id| (*id, NodeKind::Member)).collect();
    let edges: Vec<(&str, &str, &str, f64, f64)> = edges
        .iter()
        .map(|&(a, b, t, s)| (a, b, t, s, 1.0))
        .collect();
    typed_graph(&nodes, &edges)
}

/// Explicit kinds; edges as `(source, target, type, strength, confidence)`.
pub fn typed_graph(nodes: &[(&str, NodeKind)], edges: &[(&str, &str, &str, f64, f64)]) -> BoardGraph {
    let node_records: Vec<NodeRecord> = nodes
        .iter()
        .map(|&(id, kind)| NodeRecord::new(id, kind))
        .collect();
    let edge_records: Vec<EdgeRecord> = edges
        .iter()
        .map(|&(a, b, t, s, c)| {
            let rel: RelationshipType = t.parse().expect("relationship type");
            EdgeRecord::new(a, b, rel, s, c)
        })
        .collect();
    build_graph(&node_records, &edge_records).expect("fixture graph")
}
