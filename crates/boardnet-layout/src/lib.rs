#![forbid(unsafe_code)]
//! boardnet-layout library.
//!
//! Deterministic force-directed layout for board networks. See
//! [`solver`] for the algorithm.
//!
//! ```rust,ignore
//! use boardnet_core::{LayoutConfig, build_graph};
//! use boardnet_layout::ForceLayout;
//!
//! let graph = build_graph(&nodes, &edges)?;
//! let layout = ForceLayout::new(&graph, &LayoutConfig::default())?;
//!
//! // Drive it in slices from a background task...
//! let mut state = layout.initial_state();
//! for _ in 0..50 {
//!     layout.step(&mut state);
//! }
//! // ...or run it to completion.
//! let result = layout.run();
//! ```
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums ([`LayoutError`], [`ComputationTimeout`]).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod error;
pub mod solver;

pub use error::{ComputationTimeout, LayoutError};
pub use solver::{ForceLayout, LayoutResult, LayoutState, MIN_DISTANCE, StepStatus, solve};
