//! `boardnet clusters`: visual grouping of nodes.

use std::io::{self, Write};
use std::path::Path;

use boardnet_analytics::{ClusterAssignment, assign_clusters, layout_or_partial};
use boardnet_core::{ClusteringStrategy, NodeId};
use clap::{Args, ValueEnum};

use super::{InputArgs, LayoutOverrides, Prepared};
use crate::output::{OutputMode, pretty_section, render_mode};

const DEFAULT_MIN_STRENGTH: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Attribute,
    Structural,
    Hybrid,
}

/// Arguments for `boardnet clusters`.
#[derive(Args, Debug, Clone)]
pub struct ClustersArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub layout: LayoutOverrides,

    /// Grouping strategy (overrides `[clustering]` in the config file).
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Attribute key for the attribute and hybrid strategies.
    #[arg(long)]
    pub key: Option<String>,

    /// Edge strength threshold for the structural and hybrid strategies.
    #[arg(long, value_name = "0..1")]
    pub min_strength: Option<f64>,
}

impl ClustersArgs {
    /// Merge the flags over the configured strategy. Flags that do not apply
    /// to the resulting strategy are ignored.
    fn merged_strategy(&self, current: &ClusteringStrategy) -> ClusteringStrategy {
        let (current_key, current_strength) = match current {
            ClusteringStrategy::Attribute { key } => (Some(key.as_str()), None),
            ClusteringStrategy::Structural { min_strength } => (None, Some(*min_strength)),
            ClusteringStrategy::Hybrid { key, min_strength } => {
                (Some(key.as_str()), Some(*min_strength))
            }
        };
        let key = self
            .key
            .clone()
            .or_else(|| current_key.map(str::to_string))
            .unwrap_or_default();
        let min_strength = self
            .min_strength
            .or(current_strength)
            .unwrap_or(DEFAULT_MIN_STRENGTH);

        let kind = self.strategy.unwrap_or(match current {
            ClusteringStrategy::Attribute { .. } => StrategyArg::Attribute,
            ClusteringStrategy::Structural { .. } => StrategyArg::Structural,
            ClusteringStrategy::Hybrid { .. } => StrategyArg::Hybrid,
        });
        match kind {
            StrategyArg::Attribute => ClusteringStrategy::Attribute { key },
            StrategyArg::Structural => ClusteringStrategy::Structural { min_strength },
            StrategyArg::Hybrid => ClusteringStrategy::Hybrid { key, min_strength },
        }
    }
}

/// Execute `boardnet clusters`.
pub fn run_clusters(
    args: &ClustersArgs,
    output: OutputMode,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let prepared = Prepared::load(&args.input, config_path, |c| {
        args.layout.apply(&mut c.layout);
        c.clustering.strategy = args.merged_strategy(&c.clustering.strategy);
    })?;
    let graph = prepared.graph()?;
    let layout = layout_or_partial(&graph, &prepared.config)?;
    let clusters = assign_clusters(&graph, &layout.positions, &prepared.config.clustering);

    render_mode(output, "clusters", &clusters, render_text, render_pretty)
}

fn members(ids: &[NodeId]) -> Vec<&str> {
    ids.iter().map(NodeId::as_str).collect()
}

fn render_text(clusters: &ClusterAssignment, w: &mut dyn Write) -> io::Result<()> {
    for c in &clusters.clusters {
        writeln!(w, "{} {}", c.id, members(&c.members).join(","))?;
    }
    Ok(())
}

fn render_pretty(clusters: &ClusterAssignment, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(
        w,
        &format!(
            "Clusters ({}, {} singletons)",
            clusters.len(),
            clusters.singletons().count()
        ),
    )?;
    for c in &clusters.clusters {
        let label = c.label.as_deref().unwrap_or("-");
        writeln!(
            w,
            "{:<5} {:<12} ({:>7.2}, {:>7.2})  {}",
            c.id.to_string(),
            label,
            c.centroid.x,
            c.centroid.y,
            members(&c.members).join(", ")
        )?;
    }
    Ok(())
}
