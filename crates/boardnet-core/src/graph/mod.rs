//! Relationship graph for one analysis run.
//!
//! # Overview
//!
//! [`build_graph`] turns data-layer records into a [`BoardGraph`]: an
//! undirected petgraph multigraph whose node weights are [`Node`]s and whose
//! edge weights are [`Edge`]s. Parallel edges between the same pair are
//! allowed when their relationship types differ.
//!
//! ## Pipeline
//!
//! ```text
//! NodeRecord / EdgeRecord (data layer)
//!        ↓  build::build_graph()
//! BoardGraph (immutable)
//!        ├─ layout (positions)
//!        ├─ metrics (centrality)
//!        ├─ conflict rules
//!        └─ clustering
//! ```
//!
//! ## Immutability
//!
//! Nothing on [`BoardGraph`] hands out `&mut`. Once built, the graph is
//! frozen for the duration of the run and can be shared freely between the
//! layout, analytics, and conflict passes.
//!
//! ## Cache Invalidation
//!
//! [`BoardGraph::content_hash`] is a BLAKE3 hash of the canonical node and
//! edge set. Callers can key cached results on it.

pub mod build;
pub mod stats;

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

use crate::model::{Edge, EdgeId, Node, NodeId};

pub use build::build_graph;
pub use stats::GraphStats;

/// An immutable, validated relationship graph.
///
/// Invariants established by [`build_graph`]:
///
/// - node ids are unique;
/// - every edge endpoint is a node in the graph;
/// - no edge is a self-loop;
/// - at most one edge exists per unordered pair and relationship type;
/// - `Edge::id` equals the edge's petgraph index.
#[derive(Debug, Clone)]
pub struct BoardGraph {
    graph: UnGraph<Node, Edge>,
    node_map: HashMap<NodeId, NodeIndex>,
    content_hash: String,
}

impl BoardGraph {
    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of (merged) edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether `id` is a node in this graph.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index_of(id).and_then(|idx| self.graph.node_weight(idx))
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.graph.edge_weight(EdgeIndex::new(id.0))
    }

    /// Distinct neighbors of `id`, sorted by node id.
    ///
    /// Returns an empty list for unknown ids.
    #[must_use]
    pub fn neighbors(&self, id: &NodeId) -> Vec<&NodeId> {
        let mut out: Vec<&NodeId> = self
            .edges_of(id)
            .into_iter()
            .filter_map(|edge| edge.other(id))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// All edges incident to `id`, ordered by edge id.
    #[must_use]
    pub fn edges_of(&self, id: &NodeId) -> Vec<&Edge> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        let mut out: Vec<&Edge> = self.graph.edges(idx).map(|e| e.weight()).collect();
        out.sort_by_key(|e| e.id);
        out
    }

    /// All nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// All edges ordered by edge id.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Look up the petgraph `NodeIndex` for a node id.
    #[must_use]
    pub fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Return the node stored at `idx`.
    #[must_use]
    pub fn node_at(&self, idx: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(idx)
    }

    /// Read-only view of the underlying petgraph graph, for algorithms that
    /// want dense `NodeIndex` addressing.
    #[must_use]
    pub const fn petgraph(&self) -> &UnGraph<Node, Edge> {
        &self.graph
    }

    /// BLAKE3 content hash of the canonical node and edge set.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Summary statistics for the graph.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats::from_graph(self)
    }
}
