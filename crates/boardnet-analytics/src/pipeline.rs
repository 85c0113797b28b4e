//! End-to-end analysis of one network.
//!
//! ```text
//! validate config → build graph → cache lookup
//!   → layout (time-budgeted) → centrality → conflicts → clustering
//!   → cache store
//! ```
//!
//! Centrality and conflict detection do not depend on positions, so a
//! timed-out layout never blocks them: the partial layout is kept and
//! flagged with `timed_out`. Timed-out reports are not cached, since their
//! positions depend on wall-clock time rather than on the key.

use std::sync::Arc;

use boardnet_core::{
    AnalysisConfig, BoardGraph, EdgeRecord, GraphStats, NodeRecord, build_graph,
};
use boardnet_layout::{LayoutError, LayoutResult, solve};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheKey, ReportCache};
use crate::cluster::{ClusterAssignment, assign_clusters};
use crate::conflict::{ConflictReport, detect_conflicts};
use crate::error::AnalysisError;
use crate::metrics::{AnalyticsResult, compute_centrality};

/// Everything computed for one network.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub cache_key: CacheKey,
    pub stats: GraphStats,
    pub layout: LayoutResult,
    pub centrality: AnalyticsResult,
    pub conflicts: ConflictReport,
    pub clusters: ClusterAssignment,
}

/// Analyze raw records, consulting `cache` when one is supplied.
///
/// # Errors
///
/// Returns [`AnalysisError::Config`] for an invalid configuration and
/// [`AnalysisError::Graph`] when the records do not form a valid graph.
/// Nothing downstream runs after either failure.
#[instrument(skip_all, fields(nodes = nodes.len(), edges = edges.len()))]
pub fn analyze(
    nodes: &[NodeRecord],
    edges: &[EdgeRecord],
    config: &AnalysisConfig,
    cache: Option<&dyn ReportCache>,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;
    let graph = build_graph(nodes, edges)?;
    let key = CacheKey::new(graph.content_hash(), &config.fingerprint());

    if let Some(hit) = cache.and_then(|c| c.get(&key)) {
        debug!(%key, "analysis served from cache");
        return Ok((*hit).clone());
    }

    let report = analyze_graph(&graph, config, key)?;
    if report.layout.timed_out {
        debug!(key = %report.cache_key, "partial layout, not caching");
    } else if let Some(cache) = cache {
        cache.put(report.cache_key.clone(), Arc::new(report.clone()));
    }
    Ok(report)
}

/// Analyze an already-built graph. No caching.
///
/// # Errors
///
/// Returns [`AnalysisError::Config`] if the layout configuration is invalid.
pub fn analyze_graph(
    graph: &BoardGraph,
    config: &AnalysisConfig,
    cache_key: CacheKey,
) -> Result<AnalysisReport, AnalysisError> {
    let layout = layout_or_partial(graph, config)?;
    let centrality = compute_centrality(graph, &config.centrality);
    let conflicts = detect_conflicts(graph, Some(&centrality), &config.conflicts);
    let clusters = assign_clusters(graph, &layout.positions, &config.clustering);

    info!(
        nodes = graph.node_count(),
        findings = conflicts.len(),
        clusters = clusters.len(),
        timed_out = layout.timed_out,
        "analysis complete"
    );

    Ok(AnalysisReport {
        cache_key,
        stats: graph.stats(),
        layout,
        centrality,
        conflicts,
        clusters,
    })
}

/// Run the layout, downgrading a timeout to its flagged partial result.
///
/// # Errors
///
/// Returns [`AnalysisError::Config`] for an invalid layout configuration.
pub fn layout_or_partial(
    graph: &BoardGraph,
    config: &AnalysisConfig,
) -> Result<LayoutResult, AnalysisError> {
    match solve(graph, &config.layout) {
        Ok(layout) => Ok(layout),
        Err(LayoutError::Timeout(timeout)) => {
            warn!(
                completed = timeout.completed_iterations,
                "continuing with partial layout"
            );
            Ok(*timeout.partial)
        }
        Err(LayoutError::Config(err)) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use boardnet_core::{ErrorCode, LayoutConfig, NodeKind, RelationshipType};

    use super::*;
    use crate::cache::TtlCache;

    fn records() -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
        let nodes = vec![
            NodeRecord::new("A", NodeKind::Member),
            NodeRecord::new("B", NodeKind::Member),
            NodeRecord::new("C", NodeKind::Organization),
        ];
        let edges = vec![
            EdgeRecord::new("A", "C", RelationshipType::SharedBoard, 0.9, 0.8),
            EdgeRecord::new("B", "C", RelationshipType::SharedBoard, 0.9, 0.8),
        ];
        (nodes, edges)
    }

    fn quick() -> AnalysisConfig {
        AnalysisConfig {
            layout: LayoutConfig {
                iterations: 50,
                ..LayoutConfig::default()
            },
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn produces_every_section() {
        let (nodes, edges) = records();
        let report = analyze(&nodes, &edges, &quick(), None).expect("analysis");
        assert_eq!(report.layout.positions.len(), 3);
        assert_eq!(report.centrality.scores.len(), 3);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.clusters.assignments.len(), 3);
        assert_eq!(report.stats.node_count, 3);
        assert!(!report.layout.timed_out);
    }

    #[test]
    fn invalid_config_stops_before_building() {
        let (nodes, edges) = records();
        let mut config = quick();
        config.layout.dimensions = 4;
        let err = analyze(&nodes, &edges, &config, None).expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
    }

    #[test]
    fn graph_errors_propagate() {
        let err = analyze(&[], &[], &quick(), None).expect_err("empty");
        assert_eq!(err.code(), ErrorCode::EmptyGraph);
    }

    #[test]
    fn zero_time_budget_yields_flagged_partial_layout() {
        let (nodes, edges) = records();
        let mut config = quick();
        config.layout.time_budget_ms = Some(0);
        let report = analyze(&nodes, &edges, &config, None).expect("analysis");
        assert!(report.layout.timed_out);
        assert_eq!(report.layout.positions.len(), 3);
        // Analytics still ran in full.
        assert_eq!(report.conflicts.len(), 1);
    }

    #[test]
    fn timed_out_runs_are_not_cached() {
        let (nodes, edges) = records();
        let cache = TtlCache::new(Duration::from_secs(300));
        let mut config = quick();
        config.layout.time_budget_ms = Some(0);

        let report = analyze(&nodes, &edges, &config, Some(&cache)).expect("analysis");
        assert!(report.layout.timed_out);
        assert!(cache.is_empty());

        // A complete run is stored.
        config.layout.time_budget_ms = None;
        analyze(&nodes, &edges, &config, Some(&cache)).expect("analysis");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn second_run_is_served_from_cache() {
        let (nodes, edges) = records();
        let cache = TtlCache::new(Duration::from_secs(300));
        let first = analyze(&nodes, &edges, &quick(), Some(&cache)).expect("first");
        assert_eq!(cache.len(), 1);
        let second = analyze(&nodes, &edges, &quick(), Some(&cache)).expect("second");
        assert_eq!(first.cache_key, second.cache_key);
        assert_eq!(first.layout, second.layout);

        let mut changed = quick();
        changed.layout.seed = 7;
        let third = analyze(&nodes, &edges, &changed, Some(&cache)).expect("third");
        assert_ne!(first.cache_key, third.cache_key);
        assert_eq!(cache.len(), 2);
    }
}
