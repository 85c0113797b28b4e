//! Visual grouping of nodes.
//!
//! Three strategies, selected by [`ClusteringStrategy`]:
//!
//! - **Attribute**: nodes sharing a value for one attribute key. Nodes
//!   without the attribute get singleton clusters.
//! - **Structural**: connected components over edges with
//!   `strength >= min_strength`. Isolated nodes are singletons.
//! - **Hybrid**: structural components, each split by attribute value.
//!
//! Cluster ids are assigned in order of each cluster's smallest member id,
//! so the same graph and strategy always produce the same assignment.
//! Centroids are the arithmetic mean of member layout positions.

use std::collections::BTreeMap;
use std::fmt;

use boardnet_core::{BoardGraph, ClusteringConfig, ClusteringStrategy, Node, NodeId, Position};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Dense cluster index, stable for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    /// Member ids, ascending.
    pub members: Vec<NodeId>,
    pub centroid: Position,
    /// Shared attribute value, for attribute and hybrid strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub assignments: BTreeMap<NodeId, ClusterId>,
    pub clusters: Vec<Cluster>,
}

impl ClusterAssignment {
    #[must_use]
    pub fn cluster_of(&self, id: &NodeId) -> Option<&Cluster> {
        let cid = self.assignments.get(id)?;
        self.clusters.get(cid.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters with exactly one member.
    pub fn singletons(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().filter(|c| c.members.len() == 1)
    }
}

// ---------------------------------------------------------------------------
// Union-find
// ---------------------------------------------------------------------------

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]);
        }
        self.parent[i]
    }

    fn union(&mut self, i: usize, j: usize) {
        let (ri, rj) = (self.find(i), self.find(j));
        if ri == rj {
            return;
        }
        match self.rank[ri].cmp(&self.rank[rj]) {
            std::cmp::Ordering::Less => self.parent[ri] = rj,
            std::cmp::Ordering::Greater => self.parent[rj] = ri,
            std::cmp::Ordering::Equal => {
                self.parent[rj] = ri;
                self.rank[ri] += 1;
            }
        }
    }
}

fn components(graph: &BoardGraph, min_strength: f64) -> Vec<usize> {
    let g = graph.petgraph();
    let mut uf = UnionFind::new(g.node_count());
    for e in g.edge_references() {
        if e.weight().strength >= min_strength {
            uf.union(e.source().index(), e.target().index());
        }
    }
    (0..g.node_count()).map(|i| uf.find(i)).collect()
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Grouping key: component (or the node itself for singletons) plus the
/// attribute value where the strategy uses one.
type GroupKey = (Option<usize>, Option<String>);

/// Assign every node of `graph` to a cluster.
///
/// `positions` supplies layout coordinates for centroids; members without a
/// position are left out of their cluster's mean.
#[instrument(skip_all, fields(nodes = graph.node_count()))]
#[must_use]
pub fn assign_clusters(
    graph: &BoardGraph,
    positions: &BTreeMap<NodeId, Position>,
    config: &ClusteringConfig,
) -> ClusterAssignment {
    let g = graph.petgraph();
    let n = g.node_count();

    let nodes: Vec<&Node> = g.node_weights().collect();
    let attribute = |idx: usize, key: &str| -> Option<String> {
        nodes[idx].attributes.get(key).map(ToString::to_string)
    };

    let keys: Vec<GroupKey> = match &config.strategy {
        ClusteringStrategy::Attribute { key } => (0..n)
            .map(|i| match attribute(i, key) {
                Some(value) => (None, Some(value)),
                None => (Some(i), None),
            })
            .collect(),
        ClusteringStrategy::Structural { min_strength } => components(graph, *min_strength)
            .into_iter()
            .map(|root| (Some(root), None))
            .collect(),
        ClusteringStrategy::Hybrid { key, min_strength } => components(graph, *min_strength)
            .into_iter()
            .enumerate()
            .map(|(i, root)| (Some(root), attribute(i, key)))
            .collect(),
    };

    let mut groups: BTreeMap<GroupKey, Vec<NodeId>> = BTreeMap::new();
    for (node, key) in nodes.iter().zip(keys) {
        groups.entry(key).or_default().push(node.id.clone());
    }

    let mut grouped: Vec<(Option<String>, Vec<NodeId>)> = groups
        .into_iter()
        .map(|((_, label), mut members)| {
            members.sort();
            (label, members)
        })
        .collect();
    grouped.sort_by(|a, b| a.1.first().cmp(&b.1.first()));

    let mut assignments = BTreeMap::new();
    let clusters: Vec<Cluster> = grouped
        .into_iter()
        .enumerate()
        .map(|(i, (label, members))| {
            let id = ClusterId(i);
            for member in &members {
                assignments.insert(member.clone(), id);
            }
            let centroid = Position::centroid(members.iter().filter_map(|m| positions.get(m)));
            Cluster {
                id,
                members,
                centroid,
                label,
            }
        })
        .collect();

    debug!(clusters = clusters.len(), "clusters assigned");
    ClusterAssignment {
        assignments,
        clusters,
    }
}
