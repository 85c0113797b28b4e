//! Financial overlap: two parties tied financially to the same organization.

use boardnet_core::{NodeKind, RelationshipType};

use super::{ConflictCategory, ConflictFinding, ConflictRule, RuleContext, Severity};

#[derive(Debug, Clone, Copy, Default)]
pub struct FinancialOverlap;

impl FinancialOverlap {
    #[must_use]
    pub fn severity(bottleneck: f64) -> Severity {
        if bottleneck > 0.8 {
            Severity::High
        } else if bottleneck > 0.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl ConflictRule for FinancialOverlap {
    fn name(&self) -> &'static str {
        "financial_overlap"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let min_confidence = ctx.config.min_confidence;
        let mut findings = Vec::new();

        for hub in ctx
            .graph
            .all_nodes()
            .filter(|n| n.kind == NodeKind::Organization)
        {
            let ties: Vec<_> = ctx
                .graph
                .edges_of(&hub.id)
                .into_iter()
                .filter(|e| {
                    e.relationship_type == RelationshipType::Financial
                        && e.confidence > min_confidence
                })
                .filter_map(|e| e.other(&hub.id).map(|party| (party, e)))
                .collect();

            for (i, (x, xe)) in ties.iter().enumerate() {
                for (y, ye) in &ties[i + 1..] {
                    let bottleneck = xe.strength.min(ye.strength);
                    let related =
                        ctx.orient(vec![(*x).clone(), hub.id.clone(), (*y).clone()]);
                    let mut evidence = vec![xe.id, ye.id];
                    evidence.sort_unstable();
                    findings.push(ConflictFinding {
                        subject: related[0].clone(),
                        related,
                        category: ConflictCategory::Financial,
                        severity: Self::severity(bottleneck),
                        score: bottleneck,
                        rule: self.name().to_string(),
                        evidence,
                    });
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use boardnet_core::{ConflictConfig, NodeId};

    use super::*;
    use crate::test_support::typed_graph;

    #[test]
    fn pairs_sharing_a_lender_are_flagged() {
        let g = typed_graph(
            &[
                ("bank", NodeKind::Organization),
                ("acme", NodeKind::Organization),
                ("jane", NodeKind::Member),
                ("omar", NodeKind::Member),
            ],
            &[
                ("acme", "bank", "financial", 0.9, 0.9),
                ("jane", "bank", "financial", 0.6, 0.9),
                ("omar", "bank", "financial", 0.95, 0.2),
            ],
        );
        let config = ConflictConfig::default();
        let findings = FinancialOverlap.evaluate(&RuleContext::new(&g, None, &config));

        // omar's tie is below the confidence floor.
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(
            f.related,
            vec![NodeId::new("acme"), NodeId::new("bank"), NodeId::new("jane")]
        );
        assert_eq!(f.severity, Severity::Medium);
        assert_eq!(f.evidence.len(), 2);
    }

    #[test]
    fn member_hubs_do_not_count() {
        let g = typed_graph(
            &[
                ("hub", NodeKind::Member),
                ("a", NodeKind::Organization),
                ("b", NodeKind::Organization),
            ],
            &[
                ("a", "hub", "financial", 0.9, 1.0),
                ("b", "hub", "financial", 0.9, 1.0),
            ],
        );
        let config = ConflictConfig::default();
        assert!(
            FinancialOverlap
                .evaluate(&RuleContext::new(&g, None, &config))
                .is_empty()
        );
    }

    #[test]
    fn ties_at_the_confidence_floor_are_ignored() {
        let g = typed_graph(
            &[
                ("bank", NodeKind::Organization),
                ("a", NodeKind::Member),
                ("b", NodeKind::Member),
            ],
            &[
                ("a", "bank", "financial", 0.9, 0.5),
                ("b", "bank", "financial", 0.9, 0.9),
            ],
        );
        let config = ConflictConfig::default();
        assert!(
            FinancialOverlap
                .evaluate(&RuleContext::new(&g, None, &config))
                .is_empty()
        );
    }

    #[test]
    fn severity_bands() {
        assert_eq!(FinancialOverlap::severity(0.81), Severity::High);
        assert_eq!(FinancialOverlap::severity(0.8), Severity::Medium);
        assert_eq!(FinancialOverlap::severity(0.5), Severity::Low);
    }
}
