#![forbid(unsafe_code)]
//! boardnet-analytics library.
//!
//! Centrality, conflict-of-interest detection, and clustering over a
//! [`boardnet_core::BoardGraph`], plus the [`analyze`] pipeline that runs
//! them together with the layout solver.
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use boardnet_analytics::{TtlCache, analyze};
//! use boardnet_core::AnalysisConfig;
//!
//! let cache = TtlCache::new(Duration::from_secs(300));
//! let report = analyze(&nodes, &edges, &AnalysisConfig::default(), Some(&cache))?;
//! for finding in report.conflicts.iter() {
//!     println!("{} {:?}", finding.severity, finding.related);
//! }
//! ```
//!
//! # Conventions
//!
//! - **Errors**: [`AnalysisError`] wraps `GraphError` and `ConfigError`;
//!   layout timeouts are downgraded to flagged partial results.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod cache;
pub mod cluster;
pub mod conflict;
pub mod error;
pub mod metrics;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use cache::{CacheKey, ReportCache, TtlCache};
pub use cluster::{Cluster, ClusterAssignment, ClusterId, assign_clusters};
pub use conflict::{
    ConflictCategory, ConflictFinding, ConflictReport, ConflictRule, DirectInterlock,
    FinancialOverlap, IndirectPath, RuleContext, RuleSet, Severity, detect_conflicts,
};
pub use error::AnalysisError;
pub use metrics::{AnalyticsResult, CentralityResult, Metric, compute_centrality};
pub use pipeline::{AnalysisReport, analyze, analyze_graph, layout_or_partial};
