//! Closeness centrality over strength-weighted shortest paths.
//!
//! `closeness(v) = 1 / Σ dist(v, u)` over every node `u` reachable from `v`.
//! A node that reaches nothing scores 0. Scores are comparable within a
//! component; across components they only rank how tightly each node sits
//! among the nodes it can reach.

use super::adjacency::{WeightedAdjacency, shortest_paths};

/// Raw closeness per node index.
#[must_use]
pub fn closeness(adj: &WeightedAdjacency) -> Vec<f64> {
    (0..adj.len())
        .map(|s| {
            let sp = shortest_paths(adj, s);
            let total: f64 = sp.order.iter().map(|&v| sp.dist[v]).sum();
            if total > 0.0 { 1.0 / total } else { 0.0 }
        })
        .collect()
}
