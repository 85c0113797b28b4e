//! Summary statistics for a [`BoardGraph`].

use std::collections::BTreeMap;

use petgraph::algo::connected_components;
use serde::Serialize;

use crate::graph::BoardGraph;
use crate::model::{NodeKind, RelationshipType};

/// Structural summary of one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub member_count: usize,
    pub organization_count: usize,
    /// Distinct connected node pairs over all possible pairs.
    pub density: f64,
    /// Connected components, counting isolated nodes as their own component.
    pub component_count: usize,
    /// Nodes with no incident edge.
    pub isolated_count: usize,
    pub edges_by_type: BTreeMap<RelationshipType, usize>,
    pub content_hash: String,
}

impl GraphStats {
    /// Compute statistics for `graph`.
    #[must_use]
    pub fn from_graph(graph: &BoardGraph) -> Self {
        let g = graph.petgraph();
        let n = g.node_count();

        let member_count = g
            .node_weights()
            .filter(|node| node.kind == NodeKind::Member)
            .count();

        let mut edges_by_type = BTreeMap::new();
        let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(g.edge_count());
        for idx in g.edge_indices() {
            if let (Some(edge), Some((a, b))) = (g.edge_weight(idx), g.edge_endpoints(idx)) {
                *edges_by_type.entry(edge.relationship_type).or_insert(0) += 1;
                pairs.push((a.index().min(b.index()), a.index().max(b.index())));
            }
        }
        pairs.sort_unstable();
        pairs.dedup();

        let density = if n < 2 {
            0.0
        } else {
            let max_pairs = (n * (n - 1) / 2) as f64;
            pairs.len() as f64 / max_pairs
        };

        let isolated_count = g
            .node_indices()
            .filter(|&idx| g.neighbors(idx).next().is_none())
            .count();

        Self {
            node_count: n,
            edge_count: g.edge_count(),
            member_count,
            organization_count: n - member_count,
            density,
            component_count: connected_components(g),
            isolated_count,
            edges_by_type,
            content_hash: graph.content_hash().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::model::{EdgeRecord, NodeRecord};

    #[test]
    fn stats_for_two_triangles_and_an_isolate() {
        let nodes: Vec<NodeRecord> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|id| NodeRecord::new(*id, NodeKind::Member))
            .collect();
        let tri = |x: &str, y: &str| {
            EdgeRecord::new(x, y, RelationshipType::Advisory, 0.5, 1.0)
        };
        let edges = vec![
            tri("a", "b"),
            tri("b", "c"),
            tri("c", "a"),
            tri("d", "e"),
            tri("e", "f"),
            tri("f", "d"),
            EdgeRecord::new("a", "b", RelationshipType::Family, 0.5, 1.0),
        ];
        let graph = build_graph(&nodes, &edges).expect("build graph");
        let stats = graph.stats();

        assert_eq!(stats.node_count, 7);
        assert_eq!(stats.edge_count, 7);
        assert_eq!(stats.component_count, 3);
        assert_eq!(stats.isolated_count, 1);
        assert_eq!(stats.edges_by_type[&RelationshipType::Advisory], 6);
        // 6 distinct pairs over 21 possible.
        assert!((stats.density - 6.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn single_node_density_is_zero() {
        let graph =
            build_graph(&[NodeRecord::new("solo", NodeKind::Organization)], &[]).expect("graph");
        let stats = graph.stats();
        assert!(stats.density.abs() < f64::EPSILON);
        assert_eq!(stats.organization_count, 1);
        assert_eq!(stats.component_count, 1);
    }
}
