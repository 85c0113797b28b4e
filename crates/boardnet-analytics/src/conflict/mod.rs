//! Conflict-of-interest detection.
//!
//! # Overview
//!
//! The detector runs a [`RuleSet`] of independent [`ConflictRule`]s over a
//! frozen [`BoardGraph`]. Each rule emits zero or more [`ConflictFinding`]s;
//! the report is their union, deduplicated by
//! `(subject, sorted related nodes, category)` and ordered most severe
//! first.
//!
//! Built-in rules:
//!
//! - [`DirectInterlock`]: `shared_board` edges between two members or two
//!   organizations.
//! - [`IndirectPath`]: chains of 2..=`max_path_degree` governance,
//!   financial, or competitive edges.
//! - [`FinancialOverlap`]: two parties with financial ties to the same
//!   organization.
//!
//! Only edges with `confidence > min_confidence` are visible to rules.
//! Conflicting relationship types on the same pair yield separate findings
//! so each keeps its own evidence.

mod financial;
mod indirect;
mod interlock;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use boardnet_core::{BoardGraph, ConflictConfig, Edge, EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::metrics::AnalyticsResult;

pub use financial::FinancialOverlap;
pub use indirect::IndirectPath;
pub use interlock::DirectInterlock;

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Finding severity, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictCategory {
    Governance,
    Financial,
    Competitive,
    Personal,
    Regulatory,
}

impl ConflictCategory {
    pub const ALL: [Self; 5] = [
        Self::Governance,
        Self::Financial,
        Self::Competitive,
        Self::Personal,
        Self::Regulatory,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Governance => "governance",
            Self::Financial => "financial",
            Self::Competitive => "competitive",
            Self::Personal => "personal",
            Self::Regulatory => "regulatory",
        }
    }
}

impl fmt::Display for ConflictCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected governance risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictFinding {
    /// The more central party.
    pub subject: NodeId,
    /// Path or group of involved nodes, starting with `subject`.
    pub related: Vec<NodeId>,
    pub category: ConflictCategory,
    pub severity: Severity,
    /// Rule-specific strength of the finding in `[0, 1]`.
    pub score: f64,
    /// Name of the rule that produced the finding.
    pub rule: String,
    /// Edges supporting the finding, ascending.
    pub evidence: Vec<EdgeId>,
}

impl ConflictFinding {
    fn dedup_key(&self) -> (NodeId, Vec<NodeId>, ConflictCategory) {
        let mut related = self.related.clone();
        related.sort();
        (self.subject.clone(), related, self.category)
    }

    /// The two ends of `related`, in id order.
    #[must_use]
    pub fn endpoints(&self) -> Option<(&NodeId, &NodeId)> {
        let first = self.related.first()?;
        let last = self.related.last()?;
        Some(if first <= last {
            (first, last)
        } else {
            (last, first)
        })
    }
}

/// Ordered, deduplicated findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub findings: Vec<ConflictFinding>,
}

impl ConflictReport {
    /// Deduplicate and order raw findings.
    #[must_use]
    pub fn from_findings(raw: Vec<ConflictFinding>) -> Self {
        let mut merged: BTreeMap<(NodeId, Vec<NodeId>, ConflictCategory), ConflictFinding> =
            BTreeMap::new();

        for finding in raw {
            let key = finding.dedup_key();
            match merged.get_mut(&key) {
                Some(existing) => {
                    let mut evidence = existing.evidence.clone();
                    evidence.extend(finding.evidence.iter().copied());
                    if outranks(&finding, existing) {
                        *existing = finding;
                    }
                    evidence.sort_unstable();
                    evidence.dedup();
                    existing.evidence = evidence;
                }
                None => {
                    merged.insert(key, finding);
                }
            }
        }

        let mut findings: Vec<ConflictFinding> = merged.into_values().collect();
        findings.sort_by(report_order);
        Self { findings }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConflictFinding> {
        self.findings.iter()
    }

    /// Finding counts per severity.
    #[must_use]
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            *counts.entry(finding.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Findings that involve `id` anywhere in their related set.
    pub fn involving<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a ConflictFinding> {
        self.findings.iter().filter(move |f| f.related.contains(id))
    }
}

fn outranks(candidate: &ConflictFinding, existing: &ConflictFinding) -> bool {
    candidate
        .severity
        .cmp(&existing.severity)
        .then_with(|| candidate.score.total_cmp(&existing.score))
        == Ordering::Greater
}

/// Most severe first, then shorter paths, then subject id.
fn report_order(a: &ConflictFinding, b: &ConflictFinding) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.related.len().cmp(&b.related.len()))
        .then_with(|| a.subject.cmp(&b.subject))
        .then_with(|| a.related.cmp(&b.related))
        .then_with(|| a.category.cmp(&b.category))
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Read-only inputs shared by every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub graph: &'a BoardGraph,
    pub analytics: Option<&'a AnalyticsResult>,
    pub config: &'a ConflictConfig,
}

/// PageRank values closer than this count as tied.
const SUBJECT_TIE: f64 = 1e-9;

impl<'a> RuleContext<'a> {
    #[must_use]
    pub const fn new(
        graph: &'a BoardGraph,
        analytics: Option<&'a AnalyticsResult>,
        config: &'a ConflictConfig,
    ) -> Self {
        Self {
            graph,
            analytics,
            config,
        }
    }

    /// Edges confident enough to act on, in id order.
    pub fn qualifying_edges(&self) -> impl Iterator<Item = &'a Edge> + 'a {
        let min = self.config.min_confidence;
        let graph = self.graph;
        graph.all_edges().filter(move |e| e.confidence > min)
    }

    /// Whether `a` should be reported as the subject over `b`: higher
    /// PageRank wins, ties go to the smaller id.
    #[must_use]
    pub fn prefers(&self, a: &NodeId, b: &NodeId) -> bool {
        if let Some(analytics) = self.analytics {
            let rank = |id: &NodeId| analytics.get(id).map_or(0.0, |r| r.pagerank);
            let (ra, rb) = (rank(a), rank(b));
            if (ra - rb).abs() > SUBJECT_TIE {
                return ra > rb;
            }
        }
        a <= b
    }

    /// Orient a node path so it starts at the preferred endpoint.
    #[must_use]
    pub fn orient(&self, mut path: Vec<NodeId>) -> Vec<NodeId> {
        let flip = match (path.first(), path.last()) {
            (Some(first), Some(last)) => !self.prefers(first, last),
            _ => false,
        };
        if flip {
            path.reverse();
        }
        path
    }
}

/// A pluggable detection rule. Rules must not depend on each other.
pub trait ConflictRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding>;
}

/// An ordered collection of rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn ConflictRule>>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}

impl RuleSet {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in rules enabled in `config`.
    #[must_use]
    pub fn from_config(config: &ConflictConfig) -> Self {
        let mut set = Self::empty();
        if config.direct_interlock {
            set.push(DirectInterlock);
        }
        if config.indirect_paths {
            set.push(IndirectPath);
        }
        if config.financial_overlap {
            set.push(FinancialOverlap);
        }
        set
    }

    pub fn push(&mut self, rule: impl ConflictRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl ConflictRule + 'static) -> Self {
        self.push(rule);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Run every rule and merge the results.
    #[instrument(skip_all, fields(rules = self.rules.len()))]
    #[must_use]
    pub fn detect(&self, ctx: &RuleContext<'_>) -> ConflictReport {
        let mut raw = Vec::new();
        for rule in &self.rules {
            let findings = rule.evaluate(ctx);
            debug!(rule = rule.name(), findings = findings.len(), "rule evaluated");
            raw.extend(findings);
        }
        ConflictReport::from_findings(raw)
    }
}

/// Run the built-in rules enabled in `config`.
#[must_use]
pub fn detect_conflicts(
    graph: &BoardGraph,
    analytics: Option<&AnalyticsResult>,
    config: &ConflictConfig,
) -> ConflictReport {
    let ctx = RuleContext::new(graph, analytics, config);
    RuleSet::from_config(config).detect(&ctx)
}

/// Map a path score in `[0, 1]` to a severity band.
pub(crate) fn banded(score: f64, critical: f64, high: f64, medium: f64) -> Severity {
    if score > critical {
        Severity::Critical
    } else if score > high {
        Severity::High
    } else if score > medium {
        Severity::Medium
    } else {
        Severity::Low
    }
}
