//! Betweenness centrality via Brandes' algorithm on weighted paths.
//!
//! # Algorithm
//!
//! For each source `s`, Dijkstra records shortest-path counts (`sigma`) and
//! predecessor lists. Dependencies are then accumulated in reverse settle
//! order:
//!
//! ```text
//! delta(v) = Σ (sigma(v) / sigma(w)) * (1 + delta(w))   for w with v ∈ preds(w)
//! ```
//!
//! Every undirected pair is visited from both ends, so raw sums are halved.
//!
//! # Complexity
//!
//! O(V·E + V²·log V), one Dijkstra per node.

use super::adjacency::{WeightedAdjacency, shortest_paths};

/// Raw (unnormalized) betweenness per node index.
#[must_use]
pub fn betweenness(adj: &WeightedAdjacency) -> Vec<f64> {
    let n = adj.len();
    let mut cb = vec![0.0; n];

    for s in 0..n {
        let sp = shortest_paths(adj, s);
        let mut delta = vec![0.0; n];

        for &w in sp.order.iter().rev() {
            for &v in &sp.preds[w] {
                delta[v] += (sp.sigma[v] / sp.sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    for score in &mut cb {
        *score /= 2.0;
    }
    cb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::graph;

    #[test]
    fn star_center_carries_every_path() {
        let g = graph(
            &["hub", "a", "b", "c"],
            &[
                ("hub", "a", "advisory", 1.0),
                ("hub", "b", "advisory", 1.0),
                ("hub", "c", "advisory", 1.0),
            ],
        );
        let cb = betweenness(&WeightedAdjacency::from_graph(&g));
        // Pairs (a,b), (a,c), (b,c) all route through the hub.
        assert!((cb[0] - 3.0).abs() < 1e-9);
        for leaf in &cb[1..] {
            assert!(leaf.abs() < 1e-12);
        }
    }

    #[test]
    fn diamond_splits_credit_between_routes() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[
                ("a", "b", "advisory", 1.0),
                ("a", "c", "advisory", 1.0),
                ("b", "d", "advisory", 1.0),
                ("c", "d", "advisory", 1.0),
            ],
        );
        let cb = betweenness(&WeightedAdjacency::from_graph(&g));
        assert!((cb[1] - 0.5).abs() < 1e-9);
        assert!((cb[2] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn weak_direct_link_is_bypassed() {
        // a-b weak, so a→b goes through c.
        let g = graph(
            &["a", "b", "c"],
            &[
                ("a", "b", "advisory", 0.1),
                ("a", "c", "advisory", 1.0),
                ("c", "b", "advisory", 1.0),
            ],
        );
        let cb = betweenness(&WeightedAdjacency::from_graph(&g));
        assert!((cb[2] - 1.0).abs() < 1e-9);
        assert!(cb[0].abs() < 1e-12);
    }
}
