//! `boardnet stats`: structural summary of a network.

use std::io::{self, Write};
use std::path::Path;

use boardnet_core::GraphStats;
use clap::Args;
use serde::Serialize;

use super::{InputArgs, Prepared};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode, score};

/// Arguments for `boardnet stats`.
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Record counts before graph construction.
#[derive(Debug, Serialize)]
struct Submitted {
    nodes: usize,
    edges: usize,
}

/// Report payload for `boardnet stats`.
#[derive(Debug, Serialize)]
struct StatsReport {
    submitted: Submitted,
    #[serde(flatten)]
    graph: GraphStats,
}

impl StatsReport {
    /// Records dropped during construction (malformed or merged duplicates).
    const fn dropped(&self) -> (usize, usize) {
        (
            self.submitted.nodes.saturating_sub(self.graph.node_count),
            self.submitted.edges.saturating_sub(self.graph.edge_count),
        )
    }
}

/// Execute `boardnet stats`.
pub fn run_stats(
    args: &StatsArgs,
    output: OutputMode,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let prepared = Prepared::load(&args.input, config_path, |_| {})?;
    let graph = prepared.graph()?;
    let report = StatsReport {
        submitted: Submitted {
            nodes: prepared.input.nodes.len(),
            edges: prepared.input.edges.len(),
        },
        graph: graph.stats(),
    };

    render_mode(output, "stats", &report, render_text, render_pretty)
}

fn render_text(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let g = &report.graph;
    writeln!(w, "nodes {}", g.node_count)?;
    writeln!(w, "edges {}", g.edge_count)?;
    writeln!(w, "members {}", g.member_count)?;
    writeln!(w, "organizations {}", g.organization_count)?;
    writeln!(w, "density {}", score(g.density))?;
    writeln!(w, "components {}", g.component_count)?;
    writeln!(w, "isolated {}", g.isolated_count)?;
    for (kind, count) in &g.edges_by_type {
        writeln!(w, "edges.{kind} {count}")?;
    }
    writeln!(w, "hash {}", g.content_hash)?;
    Ok(())
}

fn render_pretty(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let g = &report.graph;
    let (dropped_nodes, dropped_edges) = report.dropped();

    pretty_section(w, "Network")?;
    pretty_kv(w, "Nodes", g.node_count.to_string())?;
    pretty_kv(w, "Members", g.member_count.to_string())?;
    pretty_kv(w, "Orgs", g.organization_count.to_string())?;
    pretty_kv(w, "Edges", g.edge_count.to_string())?;
    pretty_kv(w, "Density", score(g.density))?;
    pretty_kv(w, "Components", g.component_count.to_string())?;
    pretty_kv(w, "Isolated", g.isolated_count.to_string())?;
    if dropped_nodes + dropped_edges > 0 {
        pretty_kv(
            w,
            "Dropped",
            format!("{dropped_nodes} node records, {dropped_edges} edge records"),
        )?;
    }
    writeln!(w)?;

    pretty_section(w, "Edges by type")?;
    for (kind, count) in &g.edges_by_type {
        pretty_kv(w, kind.as_str(), count.to_string())?;
    }
    writeln!(w)?;
    pretty_kv(w, "Hash", &g.content_hash)?;
    Ok(())
}
