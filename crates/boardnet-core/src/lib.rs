#![forbid(unsafe_code)]
//! boardnet-core library.
//!
//! Data model, graph construction, configuration, and error taxonomy shared
//! by the layout solver, the analytics engine, and the CLI.
//!
//! # Conventions
//!
//! - **Errors**: Typed `thiserror` enums at the library boundary
//!   ([`GraphError`], [`ConfigError`]); `anyhow::Result` for file loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod graph;
pub mod model;

pub use config::{
    AnalysisConfig, CentralityConfig, ClusteringConfig, ClusteringStrategy, ConflictConfig,
    DampingSchedule, LayoutConfig, load_config,
};
pub use error::{ConfigError, ErrorCode, GraphError};
pub use graph::{BoardGraph, GraphStats, build_graph};
pub use model::{
    AttributeValue, Attributes, Edge, EdgeId, EdgeRecord, Node, NodeId, NodeKind, NodeRecord,
    Position, RelationshipType,
};
