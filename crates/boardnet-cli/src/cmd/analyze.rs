//! `boardnet analyze`: layout, centrality, conflicts, and clusters in one pass.

use std::io::{self, Write};
use std::path::Path;

use boardnet_analytics::{AnalysisReport, ConflictFinding, Metric, analyze};
use boardnet_core::NodeId;
use clap::Args;

use super::{InputArgs, LayoutOverrides, Prepared};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode, score};

/// Arguments for `boardnet analyze`.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub layout: LayoutOverrides,

    /// Number of top-ranked nodes shown per metric in human output.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Execute `boardnet analyze`.
pub fn run_analyze(
    args: &AnalyzeArgs,
    output: OutputMode,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let prepared = Prepared::load(&args.input, config_path, |c| {
        args.layout.apply(&mut c.layout);
    })?;
    let report = analyze(
        &prepared.input.nodes,
        &prepared.input.edges,
        &prepared.config,
        None,
    )?;

    let top = args.top;
    render_mode(
        output,
        "analyze",
        &report,
        render_text,
        |r, w| render_pretty(r, top, w),
    )
}

pub(crate) fn finding_line(f: &ConflictFinding) -> String {
    let path: Vec<&str> = f.related.iter().map(NodeId::as_str).collect();
    format!(
        "{:<8} {:<11} {} {} {}",
        f.severity.as_str(),
        f.category.as_str(),
        score(f.score),
        f.rule,
        path.join(" -> ")
    )
}

fn render_text(report: &AnalysisReport, w: &mut dyn Write) -> io::Result<()> {
    let s = &report.stats;
    writeln!(
        w,
        "nodes={} edges={} components={} isolated={}",
        s.node_count, s.edge_count, s.component_count, s.isolated_count
    )?;
    writeln!(
        w,
        "layout iterations={} converged={} timed_out={}",
        report.layout.iterations_run, report.layout.converged, report.layout.timed_out
    )?;
    writeln!(w, "conflicts={}", report.conflicts.len())?;
    for f in report.conflicts.iter() {
        writeln!(w, "{}", finding_line(f))?;
    }
    writeln!(w, "clusters={}", report.clusters.len())?;
    for c in &report.clusters.clusters {
        let members: Vec<&str> = c.members.iter().map(NodeId::as_str).collect();
        writeln!(w, "{} {}", c.id, members.join(","))?;
    }
    Ok(())
}

fn render_pretty(report: &AnalysisReport, top: usize, w: &mut dyn Write) -> io::Result<()> {
    let s = &report.stats;
    pretty_section(w, "Network")?;
    pretty_kv(
        w,
        "Nodes",
        format!(
            "{} ({} members, {} organizations)",
            s.node_count, s.member_count, s.organization_count
        ),
    )?;
    pretty_kv(w, "Edges", s.edge_count.to_string())?;
    pretty_kv(w, "Density", score(s.density))?;
    pretty_kv(w, "Components", s.component_count.to_string())?;
    writeln!(w)?;

    pretty_section(w, "Layout")?;
    pretty_kv(w, "Iterations", report.layout.iterations_run.to_string())?;
    pretty_kv(w, "Converged", report.layout.converged.to_string())?;
    if report.layout.timed_out {
        pretty_kv(w, "Timed out", "yes (partial layout)")?;
    }
    writeln!(w)?;

    pretty_section(w, "Most central")?;
    for metric in [Metric::Betweenness, Metric::Pagerank] {
        let ranked: Vec<String> = report
            .centrality
            .top(metric, top)
            .into_iter()
            .map(|(id, value)| format!("{id} {}", score(value)))
            .collect();
        pretty_kv(w, metric.as_str(), ranked.join(", "))?;
    }
    writeln!(w)?;

    pretty_section(w, &format!("Conflicts ({})", report.conflicts.len()))?;
    if report.conflicts.is_empty() {
        writeln!(w, "none detected")?;
    }
    for f in report.conflicts.iter() {
        writeln!(w, "{}", finding_line(f))?;
    }
    writeln!(w)?;

    pretty_section(w, &format!("Clusters ({})", report.clusters.len()))?;
    for c in &report.clusters.clusters {
        let members: Vec<&str> = c.members.iter().map(NodeId::as_str).collect();
        let label = c.label.as_deref().unwrap_or("-");
        writeln!(w, "{:<5} {:<12} {}", c.id.to_string(), label, members.join(", "))?;
    }
    Ok(())
}
