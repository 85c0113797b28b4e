//! Weighted degree: sum of incident edge strengths.

use super::adjacency::WeightedAdjacency;

/// Raw weighted degree per node index.
#[must_use]
pub fn weighted_degree(adj: &WeightedAdjacency) -> Vec<f64> {
    (0..adj.len())
        .map(|v| adj.links(v).iter().map(|l| l.total).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::graph;

    #[test]
    fn sums_every_incident_edge() {
        let g = graph(
            &["a", "b", "c"],
            &[
                ("a", "b", "shared_board", 0.5),
                ("a", "b", "family", 0.25),
                ("a", "c", "advisory", 1.0),
            ],
        );
        let deg = weighted_degree(&WeightedAdjacency::from_graph(&g));
        assert!((deg[0] - 1.75).abs() < 1e-12);
        assert!((deg[1] - 0.75).abs() < 1e-12);
        assert!((deg[2] - 1.0).abs() < 1e-12);
    }
}
