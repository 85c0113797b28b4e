//! Direct interlock: a `shared_board` tie between two peers.
//!
//! Two members who sit on a board together, or two organizations that share
//! a director, form an interlock. Member-to-organization `shared_board`
//! edges are seats, not interlocks, and are left to the path rule.

use boardnet_core::RelationshipType;

use super::{ConflictCategory, ConflictFinding, ConflictRule, RuleContext, Severity};

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectInterlock;

impl DirectInterlock {
    #[must_use]
    pub fn severity(strength: f64) -> Severity {
        if strength > 0.8 {
            Severity::Critical
        } else if strength > 0.5 {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

impl ConflictRule for DirectInterlock {
    fn name(&self) -> &'static str {
        "direct_interlock"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        ctx.qualifying_edges()
            .filter(|e| e.relationship_type == RelationshipType::SharedBoard)
            .filter(|e| {
                let kind = |id| ctx.graph.node(id).map(|n| n.kind);
                kind(&e.source) == kind(&e.target)
            })
            .map(|e| {
                let related = ctx.orient(vec![e.source.clone(), e.target.clone()]);
                ConflictFinding {
                    subject: related[0].clone(),
                    related,
                    category: ConflictCategory::Governance,
                    severity: Self::severity(e.strength),
                    score: e.strength,
                    rule: self.name().to_string(),
                    evidence: vec![e.id],
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use boardnet_core::{ConflictConfig, NodeId, NodeKind};

    use super::*;
    use crate::test_support::typed_graph;

    #[test]
    fn flags_member_pairs_with_strength_bands() {
        let g = typed_graph(
            &[
                ("a", NodeKind::Member),
                ("b", NodeKind::Member),
                ("c", NodeKind::Member),
                ("d", NodeKind::Member),
            ],
            &[
                ("a", "b", "shared_board", 0.95, 0.9),
                ("b", "c", "shared_board", 0.6, 0.9),
                ("c", "d", "shared_board", 0.5, 0.9),
            ],
        );
        let config = ConflictConfig::default();
        let findings = DirectInterlock.evaluate(&RuleContext::new(&g, None, &config));
        let severities: Vec<Severity> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::High, Severity::Medium]
        );
        assert!(findings.iter().all(|f| f.category == ConflictCategory::Governance));
        assert_eq!(findings[0].related, vec![NodeId::new("a"), NodeId::new("b")]);
    }

    #[test]
    fn seats_and_other_types_are_ignored() {
        let g = typed_graph(
            &[
                ("m", NodeKind::Member),
                ("n", NodeKind::Member),
                ("org", NodeKind::Organization),
            ],
            &[
                ("m", "org", "shared_board", 0.9, 1.0),
                ("m", "n", "family", 0.9, 1.0),
            ],
        );
        let config = ConflictConfig::default();
        assert!(
            DirectInterlock
                .evaluate(&RuleContext::new(&g, None, &config))
                .is_empty()
        );
    }

    #[test]
    fn organization_pairs_are_interlocks() {
        let g = typed_graph(
            &[("x", NodeKind::Organization), ("y", NodeKind::Organization)],
            &[("y", "x", "shared_board", 0.3, 0.6)],
        );
        let config = ConflictConfig::default();
        let findings = DirectInterlock.evaluate(&RuleContext::new(&g, None, &config));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].subject.as_str(), "x");
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn edges_at_the_confidence_floor_are_ignored() {
        let g = typed_graph(
            &[("a", NodeKind::Member), ("b", NodeKind::Member)],
            &[("a", "b", "shared_board", 0.9, 0.5)],
        );
        let config = ConflictConfig::default();
        assert!(
            DirectInterlock
                .evaluate(&RuleContext::new(&g, None, &config))
                .is_empty()
        );
    }
}
