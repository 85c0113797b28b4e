//! `boardnet centrality`: ranked centrality scores.

use std::io::{self, Write};
use std::path::Path;

use boardnet_analytics::{CentralityResult, Metric, compute_centrality};
use boardnet_core::NodeId;
use clap::Args;
use serde::Serialize;

use super::{InputArgs, Prepared};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode, score};

/// Arguments for `boardnet centrality`.
#[derive(Args, Debug, Clone)]
pub struct CentralityArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Metric to rank by: degree, betweenness, closeness, eigenvector, pagerank.
    #[arg(long, default_value = "pagerank")]
    pub metric: Metric,

    /// Show only the N highest-ranked nodes.
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RankedNode<'a> {
    rank: usize,
    id: &'a NodeId,
    score: f64,
    scores: &'a CentralityResult,
}

/// Report payload for `boardnet centrality`.
#[derive(Debug, Serialize)]
struct CentralityReport<'a> {
    metric: Metric,
    eigenvector_iterations: usize,
    eigenvector_converged: bool,
    pagerank_iterations: usize,
    pagerank_converged: bool,
    ranking: Vec<RankedNode<'a>>,
}

/// Execute `boardnet centrality`.
pub fn run_centrality(
    args: &CentralityArgs,
    output: OutputMode,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let prepared = Prepared::load(&args.input, config_path, |_| {})?;
    let graph = prepared.graph()?;
    let result = compute_centrality(&graph, &prepared.config.centrality);

    let limit = args.top.unwrap_or(usize::MAX);
    let ranking = result
        .top(args.metric, limit)
        .into_iter()
        .enumerate()
        .filter_map(|(i, (id, value))| {
            result.get(id).map(|scores| RankedNode {
                rank: i + 1,
                id,
                score: value,
                scores,
            })
        })
        .collect();

    let report = CentralityReport {
        metric: args.metric,
        eigenvector_iterations: result.eigenvector_iterations,
        eigenvector_converged: result.eigenvector_converged,
        pagerank_iterations: result.pagerank_iterations,
        pagerank_converged: result.pagerank_converged,
        ranking,
    };

    render_mode(output, "centrality", &report, render_text, render_pretty)
}

fn render_text(report: &CentralityReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    for node in &report.ranking {
        writeln!(w, "{} {} {}", node.rank, node.id, score(node.score))?;
    }
    Ok(())
}

fn render_pretty(report: &CentralityReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Centrality by {}", report.metric))?;
    pretty_kv(
        w,
        "Eigenvector",
        format!(
            "{} iterations{}",
            report.eigenvector_iterations,
            if report.eigenvector_converged { "" } else { " (not converged)" }
        ),
    )?;
    pretty_kv(
        w,
        "PageRank",
        format!(
            "{} iterations{}",
            report.pagerank_iterations,
            if report.pagerank_converged { "" } else { " (not converged)" }
        ),
    )?;
    writeln!(w)?;

    write!(w, "{:>4}  {:<20}", "#", "node")?;
    for metric in Metric::ALL {
        write!(w, " {:>11}", metric.as_str())?;
    }
    writeln!(w)?;
    for node in &report.ranking {
        write!(w, "{:>4}  {:<20}", node.rank, node.id.as_str())?;
        for metric in Metric::ALL {
            write!(w, " {:>11}", score(node.scores.get(metric)))?;
        }
        writeln!(w)?;
    }
    Ok(())
}
