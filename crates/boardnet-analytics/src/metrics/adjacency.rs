//! Dense weighted adjacency and single-source shortest paths.
//!
//! Parallel edges (same pair, different relationship types) are collapsed
//! into one [`Link`] per neighbor:
//!
//! - `total` is the sum of strengths and drives degree, eigenvector, and
//!   PageRank weights;
//! - `strongest` is the maximum strength and drives path length
//!   (`1 / strongest`), since the strongest relationship is the shortest
//!   way across.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use boardnet_core::{BoardGraph, NodeId};
use petgraph::visit::EdgeRef;

/// Collapsed connection from one node to a neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub to: usize,
    pub total: f64,
    pub strongest: f64,
}

/// Node-indexed weighted adjacency lists, neighbors sorted by index.
#[derive(Debug, Clone)]
pub struct WeightedAdjacency {
    ids: Vec<NodeId>,
    links: Vec<Vec<Link>>,
}

impl WeightedAdjacency {
    #[must_use]
    pub fn from_graph(graph: &BoardGraph) -> Self {
        let g = graph.petgraph();
        let n = g.node_count();
        let ids = g.node_weights().map(|node| node.id.clone()).collect();

        let mut acc: Vec<BTreeMap<usize, (f64, f64)>> = vec![BTreeMap::new(); n];
        for e in g.edge_references() {
            let (a, b) = (e.source().index(), e.target().index());
            let s = e.weight().strength;
            for (from, to) in [(a, b), (b, a)] {
                let slot = acc[from].entry(to).or_insert((0.0, 0.0));
                slot.0 += s;
                slot.1 = slot.1.max(s);
            }
        }

        let links = acc
            .into_iter()
            .map(|m| {
                m.into_iter()
                    .map(|(to, (total, strongest))| Link {
                        to,
                        total,
                        strongest,
                    })
                    .collect()
            })
            .collect();

        Self { ids, links }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn id(&self, idx: usize) -> &NodeId {
        &self.ids[idx]
    }

    #[must_use]
    pub fn links(&self, idx: usize) -> &[Link] {
        &self.links[idx]
    }

    /// Sum of all link weights, counting each undirected edge once.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.links.iter().flatten().map(|l| l.total).sum::<f64>() / 2.0
    }
}

// ---------------------------------------------------------------------------
// Dijkstra with shortest-path counting
// ---------------------------------------------------------------------------

/// Relative tolerance for treating two path lengths as equal.
const TIE_TOLERANCE: f64 = 1e-12;

fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Output of one single-source run.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    /// Distance from the source; `f64::INFINITY` when unreachable.
    pub dist: Vec<f64>,
    /// Number of distinct shortest paths from the source.
    pub sigma: Vec<f64>,
    /// Immediate predecessors on shortest paths.
    pub preds: Vec<Vec<usize>>,
    /// Settled nodes in non-decreasing distance order.
    pub order: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    node: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed so `BinaryHeap` pops the cheapest candidate first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Dijkstra from `source` with edge length `1 / strongest`.
///
/// Links with zero strength are infinitely long and never traversed.
#[must_use]
pub fn shortest_paths(adj: &WeightedAdjacency, source: usize) -> ShortestPaths {
    let n = adj.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut sigma = vec![0.0; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut settled = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    sigma[source] = 1.0;
    heap.push(Candidate {
        cost: 0.0,
        node: source,
    });

    while let Some(Candidate { cost, node: v }) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;
        order.push(v);

        for link in adj.links(v) {
            if link.strongest <= 0.0 {
                continue;
            }
            let w = link.to;
            if settled[w] {
                continue;
            }
            let candidate = cost + 1.0 / link.strongest;
            if dist[w].is_infinite() || (candidate < dist[w] && !same_length(candidate, dist[w])) {
                dist[w] = candidate;
                sigma[w] = sigma[v];
                preds[w].clear();
                preds[w].push(v);
                heap.push(Candidate {
                    cost: candidate,
                    node: w,
                });
            } else if same_length(candidate, dist[w]) {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    ShortestPaths {
        dist,
        sigma,
        preds,
        order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::graph;

    #[test]
    fn parallel_edges_collapse_into_one_link() {
        let g = graph(
            &["a", "b"],
            &[("a", "b", "shared_board", 0.25), ("a", "b", "financial", 0.5)],
        );
        let adj = WeightedAdjacency::from_graph(&g);
        let links = adj.links(0);
        assert_eq!(links.len(), 1);
        assert!((links[0].total - 0.75).abs() < 1e-12);
        assert!((links[0].strongest - 0.5).abs() < 1e-12);
        assert!((adj.total_weight() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn dijkstra_prefers_strong_links() {
        // a-b direct but weak (length 10); a-c-b strong (length 1 + 1).
        let g = graph(
            &["a", "b", "c"],
            &[
                ("a", "b", "advisory", 0.1),
                ("a", "c", "advisory", 1.0),
                ("c", "b", "advisory", 1.0),
            ],
        );
        let adj = WeightedAdjacency::from_graph(&g);
        let sp = shortest_paths(&adj, 0);
        assert!((sp.dist[1] - 2.0).abs() < 1e-12);
        assert_eq!(sp.preds[1], vec![2]);
        assert_eq!(sp.order, vec![0, 2, 1]);
    }

    #[test]
    fn counts_equal_length_paths() {
        // Diamond: a-b-d, a-c-d, all unit strength.
        let g = graph(
            &["a", "b", "c", "d"],
            &[
                ("a", "b", "advisory", 1.0),
                ("a", "c", "advisory", 1.0),
                ("b", "d", "advisory", 1.0),
                ("c", "d", "advisory", 1.0),
            ],
        );
        let adj = WeightedAdjacency::from_graph(&g);
        let sp = shortest_paths(&adj, 0);
        assert!((sp.sigma[3] - 2.0).abs() < 1e-12);
        assert_eq!(sp.preds[3].len(), 2);
    }

    #[test]
    fn zero_strength_links_are_impassable() {
        let g = graph(&["a", "b"], &[("a", "b", "advisory", 0.0)]);
        let adj = WeightedAdjacency::from_graph(&g);
        let sp = shortest_paths(&adj, 0);
        assert!(sp.dist[1].is_infinite());
        assert_eq!(sp.order, vec![0]);
    }
}
