//! Indirect paths: chains of governance, financial, or competitive ties.
//!
//! # Algorithm
//!
//! Depth-first enumeration of simple paths of 2..=`max_path_degree` edges
//! over qualifying `shared_board`, `financial`, and `competitive` edges.
//! A direct tie between the endpoints does not hide a path: each keeps its
//! own evidence.
//!
//! Each path is scored by its bottleneck (weakest edge), discounted by a
//! quarter per hop beyond two:
//!
//! ```text
//! score = min(strength) · (1 − 0.25 · (len − 2))
//! ```
//!
//! Only the best path per `(endpoint pair, category)` is reported: highest
//! score, then fewest edges, then lexicographic node ids.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use boardnet_core::{ConflictConfig, Edge, EdgeId, NodeId, RelationshipType};

use super::{ConflictCategory, ConflictFinding, ConflictRule, RuleContext, Severity, banded};

/// Score lost per hop beyond the shortest indirect path.
const HOP_DISCOUNT: f64 = 0.25;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndirectPath;

impl IndirectPath {
    /// Path score from its weakest strength and edge count.
    #[must_use]
    pub fn score(bottleneck: f64, edges: usize) -> f64 {
        let extra = edges.saturating_sub(ConflictConfig::MIN_PATH_DEGREE) as f64;
        bottleneck * HOP_DISCOUNT.mul_add(-extra, 1.0)
    }

    #[must_use]
    pub fn severity(score: f64) -> Severity {
        banded(score, 0.8, 0.6, 0.4)
    }
}

const fn traversable(t: RelationshipType) -> bool {
    matches!(
        t,
        RelationshipType::SharedBoard | RelationshipType::Financial | RelationshipType::Competitive
    )
}

fn category_of(edges: &[&Edge]) -> ConflictCategory {
    let has = |t| edges.iter().any(|e| e.relationship_type == t);
    if has(RelationshipType::Financial) {
        ConflictCategory::Financial
    } else if has(RelationshipType::Competitive) {
        ConflictCategory::Competitive
    } else {
        ConflictCategory::Governance
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    score: f64,
}

impl Candidate {
    fn beats(&self, other: &Self) -> bool {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.edges.len().cmp(&self.edges.len()))
            .then_with(|| other.nodes.cmp(&self.nodes))
            .then_with(|| other.edges.cmp(&self.edges))
            == Ordering::Greater
    }
}

type Adjacency<'a> = BTreeMap<&'a NodeId, Vec<(&'a NodeId, &'a Edge)>>;
type BestPaths<'a> = BTreeMap<(&'a NodeId, &'a NodeId, ConflictCategory), Candidate>;

struct Search<'a> {
    adj: Adjacency<'a>,
    max_edges: usize,
    best: BestPaths<'a>,
}

impl<'a> Search<'a> {
    fn new(ctx: &RuleContext<'a>) -> Self {
        let mut adj: Adjacency<'a> = BTreeMap::new();
        for e in ctx
            .qualifying_edges()
            .filter(|e| traversable(e.relationship_type))
        {
            adj.entry(&e.source).or_default().push((&e.target, e));
            adj.entry(&e.target).or_default().push((&e.source, e));
        }
        let max_edges = ctx.config.max_path_degree.clamp(
            ConflictConfig::MIN_PATH_DEGREE,
            ConflictConfig::MAX_PATH_DEGREE,
        );
        Self {
            adj,
            max_edges,
            best: BTreeMap::new(),
        }
    }

    fn run(mut self) -> BestPaths<'a> {
        let starts: Vec<&'a NodeId> = self.adj.keys().copied().collect();
        for start in starts {
            let mut nodes = vec![start];
            let mut edges = Vec::with_capacity(self.max_edges);
            self.extend(&mut nodes, &mut edges);
        }
        self.best
    }

    fn extend(&mut self, nodes: &mut Vec<&'a NodeId>, edges: &mut Vec<&'a Edge>) {
        let Some(&last) = nodes.last() else {
            return;
        };
        let steps = self.adj.get(last).cloned().unwrap_or_default();
        for (next, edge) in steps {
            if nodes.contains(&next) {
                continue;
            }
            nodes.push(next);
            edges.push(edge);
            if edges.len() >= ConflictConfig::MIN_PATH_DEGREE {
                self.record(nodes, edges);
            }
            if edges.len() < self.max_edges {
                self.extend(nodes, edges);
            }
            nodes.pop();
            edges.pop();
        }
    }

    fn record(&mut self, nodes: &[&'a NodeId], edges: &[&'a Edge]) {
        let (first, last) = (nodes[0], nodes[nodes.len() - 1]);
        // Each path is found from both ends; keep one orientation.
        if first >= last {
            return;
        }

        let bottleneck = edges
            .iter()
            .map(|e| e.strength)
            .fold(f64::INFINITY, f64::min);
        let candidate = Candidate {
            nodes: nodes.iter().map(|id| (*id).clone()).collect(),
            edges: edges.iter().map(|e| e.id).collect(),
            score: IndirectPath::score(bottleneck, edges.len()),
        };

        let key = (first, last, category_of(edges));
        match self.best.get_mut(&key) {
            Some(current) => {
                if candidate.beats(current) {
                    *current = candidate;
                }
            }
            None => {
                self.best.insert(key, candidate);
            }
        }
    }
}

impl ConflictRule for IndirectPath {
    fn name(&self) -> &'static str {
        "indirect_path"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        Search::new(ctx)
            .run()
            .into_iter()
            .map(|((_, _, category), path)| {
                let related = ctx.orient(path.nodes);
                let mut evidence = path.edges;
                evidence.sort_unstable();
                ConflictFinding {
                    subject: related[0].clone(),
                    related,
                    category,
                    severity: Self::severity(path.score),
                    score: path.score,
                    rule: self.name().to_string(),
                    evidence,
                }
            })
            .collect()
    }
}
