//! Per-node centrality metrics.
//!
//! Five measures are computed over the same [`WeightedAdjacency`] view of a
//! [`BoardGraph`]:
//!
//! - **Degree**: total incident strength.
//! - **Betweenness**: Brandes' algorithm on `1 / strength` path lengths.
//! - **Closeness**: inverse sum of shortest-path lengths to reachable nodes.
//! - **Eigenvector**: power iteration, unit L2 norm.
//! - **PageRank**: strength-weighted random walk with uniform teleport.
//!
//! Every score is then min-max normalized per graph into `[0, 1]`. A graph
//! without any positive-strength edge carries no structural signal and
//! scores 0 everywhere.

pub mod adjacency;
pub mod betweenness;
pub mod closeness;
pub mod degree;
pub mod eigenvector;
pub mod pagerank;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use boardnet_core::{BoardGraph, CentralityConfig, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use adjacency::WeightedAdjacency;

/// Output of an iterative (power-method) metric.
#[derive(Debug, Clone, PartialEq)]
pub struct IterativeScores {
    pub scores: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Normalized centrality scores for one node, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityResult {
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub eigenvector: f64,
    pub pagerank: f64,
}

impl CentralityResult {
    #[must_use]
    pub const fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Degree => self.degree,
            Metric::Betweenness => self.betweenness,
            Metric::Closeness => self.closeness,
            Metric::Eigenvector => self.eigenvector,
            Metric::Pagerank => self.pagerank,
        }
    }
}

/// Selects one of the five centrality measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Degree,
    Betweenness,
    Closeness,
    Eigenvector,
    Pagerank,
}

impl Metric {
    pub const ALL: [Self; 5] = [
        Self::Degree,
        Self::Betweenness,
        Self::Closeness,
        Self::Eigenvector,
        Self::Pagerank,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Betweenness => "betweenness",
            Self::Closeness => "closeness",
            Self::Eigenvector => "eigenvector",
            Self::Pagerank => "pagerank",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}

/// Centrality scores for every node of one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub scores: BTreeMap<NodeId, CentralityResult>,
    pub eigenvector_iterations: usize,
    pub eigenvector_converged: bool,
    pub pagerank_iterations: usize,
    pub pagerank_converged: bool,
}

impl AnalyticsResult {
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&CentralityResult> {
        self.scores.get(id)
    }

    /// Nodes ordered by `metric`, highest first; ties by node id.
    #[must_use]
    pub fn ranking(&self, metric: Metric) -> Vec<(&NodeId, f64)> {
        let mut ranked: Vec<(&NodeId, f64)> = self
            .scores
            .iter()
            .map(|(id, r)| (id, r.get(metric)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// The `k` highest-ranked nodes by `metric`.
    #[must_use]
    pub fn top(&self, metric: Metric, k: usize) -> Vec<(&NodeId, f64)> {
        let mut ranked = self.ranking(metric);
        ranked.truncate(k);
        ranked
    }
}

/// Compute all five centrality measures for `graph`.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
#[must_use]
pub fn compute_centrality(graph: &BoardGraph, config: &CentralityConfig) -> AnalyticsResult {
    let adj = WeightedAdjacency::from_graph(graph);
    let n = adj.len();

    if adj.total_weight() <= 0.0 {
        debug!("no weighted edges; all centrality scores are zero");
        let scores = (0..n)
            .map(|v| (adj.id(v).clone(), CentralityResult::default()))
            .collect();
        return AnalyticsResult {
            scores,
            eigenvector_iterations: 0,
            eigenvector_converged: true,
            pagerank_iterations: 0,
            pagerank_converged: true,
        };
    }

    let degree = min_max(&degree::weighted_degree(&adj));
    let betweenness = min_max(&betweenness::betweenness(&adj));
    let closeness = min_max(&closeness::closeness(&adj));
    let eigen = eigenvector::eigenvector(&adj, config.max_iterations, config.tolerance);
    let rank = pagerank::pagerank(
        &adj,
        config.pagerank_damping,
        config.max_iterations,
        config.tolerance,
    );
    let eigenvector = min_max(&eigen.scores);
    let pagerank = min_max(&rank.scores);

    let scores = (0..n)
        .map(|v| {
            (
                adj.id(v).clone(),
                CentralityResult {
                    degree: degree[v],
                    betweenness: betweenness[v],
                    closeness: closeness[v],
                    eigenvector: eigenvector[v],
                    pagerank: pagerank[v],
                },
            )
        })
        .collect();

    debug!(
        eigenvector_iterations = eigen.iterations,
        pagerank_iterations = rank.iterations,
        "centrality computed"
    );

    AnalyticsResult {
        scores,
        eigenvector_iterations: eigen.iterations,
        eigenvector_converged: eigen.converged,
        pagerank_iterations: rank.iterations,
        pagerank_converged: rank.converged,
    }
}

/// Relative width under which a score range counts as flat.
const FLAT_RANGE: f64 = 1e-12;

/// Rescale `raw` into `[0, 1]`.
///
/// A flat vector maps to all 1.0 when its common value is positive (every
/// node is equally central) and to all 0.0 otherwise.
#[must_use]
pub fn min_max(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !range.is_finite() || range <= FLAT_RANGE * max.abs().max(1.0) {
        let fill = if max > 0.0 { 1.0 } else { 0.0 };
        return vec![fill; raw.len()];
    }

    raw.iter()
        .map(|x| ((x - min) / range).clamp(0.0, 1.0))
        .collect()
}
