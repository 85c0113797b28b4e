//! Eigenvector centrality via power iteration.
//!
//! # Algorithm
//!
//! Power iteration on the shifted weighted adjacency `A + I`:
//!
//! 1. Initialize scores uniformly with unit L2 norm.
//! 2. `x'(v) = x(v) + Σ w(v, u) · x(u)`.
//! 3. Normalize `x'` to unit L2 norm.
//! 4. Stop when `‖x' - x‖₂ < tolerance` or at the iteration cap.
//!
//! The identity shift keeps bipartite graphs (member/organization seat
//! networks are bipartite) from oscillating between two eigenvectors and
//! leaves the ranking unchanged.

use tracing::{instrument, warn};

use super::IterativeScores;
use super::adjacency::WeightedAdjacency;

#[instrument(skip_all, fields(nodes = adj.len()))]
#[must_use]
pub fn eigenvector(adj: &WeightedAdjacency, max_iterations: usize, tolerance: f64) -> IterativeScores {
    let n = adj.len();
    if n == 0 || adj.total_weight() <= 0.0 {
        return IterativeScores {
            scores: vec![0.0; n],
            iterations: 0,
            converged: true,
        };
    }

    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let mut next: Vec<f64> = (0..n)
            .map(|v| {
                x[v] + adj
                    .links(v)
                    .iter()
                    .map(|l| l.total * x[l.to])
                    .sum::<f64>()
            })
            .collect();

        let norm = l2(&next);
        if norm <= 0.0 {
            break;
        }
        for value in &mut next {
            *value /= norm;
        }

        let diff = l2_distance(&next, &x);
        x = next;
        if diff < tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(iterations, "eigenvector centrality did not converge");
    }

    IterativeScores {
        scores: x,
        iterations,
        converged,
    }
}

pub(crate) fn l2(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

pub(crate) fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
