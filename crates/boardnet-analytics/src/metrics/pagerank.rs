//! Weighted PageRank on the undirected relationship graph.
//!
//! # Algorithm
//!
//! Each undirected edge is followed in both directions, with transition
//! probability proportional to its strength:
//!
//! ```text
//! PR(v) = (1 - d) / N + d · D / N + d · Σ PR(u) · w(u, v) / W(u)
//! ```
//!
//! where `W(u)` is the total strength at `u` and `D` is the rank mass held
//! by nodes with `W = 0` (spread uniformly). Scores always sum to 1.

use tracing::{instrument, warn};

use super::IterativeScores;
use super::adjacency::WeightedAdjacency;
use super::eigenvector::l2_distance;

#[instrument(skip_all, fields(nodes = adj.len()))]
#[must_use]
pub fn pagerank(
    adj: &WeightedAdjacency,
    damping: f64,
    max_iterations: usize,
    tolerance: f64,
) -> IterativeScores {
    let n = adj.len();
    if n == 0 {
        return IterativeScores {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let nf = n as f64;
    let out_weight: Vec<f64> = (0..n)
        .map(|v| adj.links(v).iter().map(|l| l.total).sum())
        .collect();

    let mut rank = vec![1.0 / nf; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;

        let dangling: f64 = (0..n)
            .filter(|&v| out_weight[v] <= 0.0)
            .map(|v| rank[v])
            .sum();
        let base = (1.0 - damping) / nf + damping * dangling / nf;

        let mut next = vec![base; n];
        for v in 0..n {
            if out_weight[v] <= 0.0 {
                continue;
            }
            let share = damping * rank[v] / out_weight[v];
            for link in adj.links(v) {
                next[link.to] += share * link.total;
            }
        }

        let diff = l2_distance(&next, &rank);
        rank = next;
        if diff < tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(iterations, "pagerank did not converge");
    }

    IterativeScores {
        scores: rank,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::graph;

    #[test]
    fn ranks_sum_to_one() {
        let g = graph(
            &["a", "b", "c", "solo"],
            &[("a", "b", "financial", 0.9), ("b", "c", "advisory", 0.2)],
        );
        let result = pagerank(&WeightedAdjacency::from_graph(&g), 0.85, 100, 1e-10);
        assert!(result.converged);
        let sum: f64 = result.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hub_outranks_leaves() {
        let g = graph(
            &["hub", "a", "b", "c"],
            &[
                ("hub", "a", "shared_board", 0.5),
                ("hub", "b", "shared_board", 0.5),
                ("hub", "c", "shared_board", 0.5),
            ],
        );
        let result = pagerank(&WeightedAdjacency::from_graph(&g), 0.85, 100, 1e-10);
        assert!(result.scores[0] > result.scores[1]);
        assert!((result.scores[1] - result.scores[3]).abs() < 1e-9);
    }

    #[test]
    fn edgeless_graph_is_uniform() {
        let g = graph(&["a", "b", "c"], &[]);
        let result = pagerank(&WeightedAdjacency::from_graph(&g), 0.85, 100, 1e-10);
        for score in &result.scores {
            assert!((score - 1.0 / 3.0).abs() < 1e-12);
        }
    }
}
