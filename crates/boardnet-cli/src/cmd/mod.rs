//! Subcommand implementations. Each module exposes an `Args` struct and a
//! `run_*` entry point.

pub mod analyze;
pub mod centrality;
pub mod clusters;
pub mod config;
pub mod conflicts;
pub mod layout;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::Result;
use boardnet_core::{AnalysisConfig, BoardGraph, LayoutConfig, build_graph};
use clap::Args;

use crate::input::{NetworkInput, read_config, read_network};

/// The network file every analysis command reads.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Network JSON file with `nodes` and `edges` arrays (`-` for stdin).
    #[arg(value_name = "NETWORK", default_value = "-")]
    pub network: PathBuf,
}

/// Flags that override `[layout]` settings from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutOverrides {
    /// Seed for initial positions.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Iteration budget.
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Output dimensionality (2 or 3).
    #[arg(long)]
    pub dimensions: Option<u8>,

    /// Wall-clock budget in milliseconds; a partial layout is returned when exceeded.
    #[arg(long, value_name = "MS")]
    pub time_budget_ms: Option<u64>,
}

impl LayoutOverrides {
    pub const fn apply(&self, layout: &mut LayoutConfig) {
        if let Some(seed) = self.seed {
            layout.seed = seed;
        }
        if let Some(iterations) = self.iterations {
            layout.iterations = iterations;
        }
        if let Some(dimensions) = self.dimensions {
            layout.dimensions = dimensions;
        }
        if let Some(ms) = self.time_budget_ms {
            layout.time_budget_ms = Some(ms);
        }
    }
}

/// Loaded records plus the effective, validated configuration.
pub struct Prepared {
    pub input: NetworkInput,
    pub config: AnalysisConfig,
}

impl Prepared {
    /// Load the network and config, apply `customize`, then validate.
    pub fn load(
        input: &InputArgs,
        config_path: Option<&Path>,
        customize: impl FnOnce(&mut AnalysisConfig),
    ) -> Result<Self> {
        let mut config = read_config(config_path)?;
        customize(&mut config);
        config.validate()?;
        let input = read_network(&input.network)?;
        Ok(Self { input, config })
    }

    pub fn graph(&self) -> Result<BoardGraph> {
        Ok(build_graph(&self.input.nodes, &self.input.edges)?)
    }
}
