//! `boardnet conflicts`: conflict-of-interest findings.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

use boardnet_analytics::{
    ConflictFinding, ConflictReport, RuleSet, Severity, compute_centrality, detect_conflicts,
};
use clap::{Args, ValueEnum};
use serde::Serialize;

use super::analyze::finding_line;
use super::{InputArgs, Prepared};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Severity floor accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Self::Low,
            SeverityArg::Medium => Self::Medium,
            SeverityArg::High => Self::High,
            SeverityArg::Critical => Self::Critical,
        }
    }
}

/// Arguments for `boardnet conflicts`.
#[derive(Args, Debug, Clone)]
pub struct ConflictsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Ignore edges at or below this confidence.
    #[arg(long, value_name = "0..1")]
    pub min_confidence: Option<f64>,

    /// Longest indirect path to follow, in edges (2-4).
    #[arg(long, value_name = "N")]
    pub max_degree: Option<usize>,

    /// Only report findings at or above this severity.
    #[arg(long, value_enum, default_value = "low")]
    pub min_severity: SeverityArg,
}

/// Report payload for `boardnet conflicts`.
#[derive(Debug, Serialize)]
struct ConflictsOutput<'a> {
    rules: Vec<&'static str>,
    counts: BTreeMap<Severity, usize>,
    findings: Vec<&'a ConflictFinding>,
}

/// Execute `boardnet conflicts`.
pub fn run_conflicts(
    args: &ConflictsArgs,
    output: OutputMode,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let prepared = Prepared::load(&args.input, config_path, |c| {
        if let Some(min_confidence) = args.min_confidence {
            c.conflicts.min_confidence = min_confidence;
        }
        if let Some(max_degree) = args.max_degree {
            c.conflicts.max_path_degree = max_degree;
        }
    })?;
    let graph = prepared.graph()?;
    let config = &prepared.config;

    let centrality = compute_centrality(&graph, &config.centrality);
    let report: ConflictReport = detect_conflicts(&graph, Some(&centrality), &config.conflicts);

    let floor = Severity::from(args.min_severity);
    let findings: Vec<&ConflictFinding> = report.iter().filter(|f| f.severity >= floor).collect();
    let mut counts = BTreeMap::new();
    for f in &findings {
        *counts.entry(f.severity).or_insert(0) += 1;
    }

    let payload = ConflictsOutput {
        rules: RuleSet::from_config(&config.conflicts).names().collect(),
        counts,
        findings,
    };
    render_mode(output, "conflicts", &payload, render_text, render_pretty)
}

fn render_text(payload: &ConflictsOutput<'_>, w: &mut dyn Write) -> io::Result<()> {
    for f in &payload.findings {
        writeln!(w, "{}", finding_line(f))?;
    }
    Ok(())
}

fn render_pretty(payload: &ConflictsOutput<'_>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Conflicts ({})", payload.findings.len()))?;
    pretty_kv(w, "Rules", payload.rules.join(", "))?;
    for (severity, count) in payload.counts.iter().rev() {
        pretty_kv(w, severity.as_str(), count.to_string())?;
    }
    writeln!(w)?;
    if payload.findings.is_empty() {
        writeln!(w, "none detected")?;
    }
    for f in &payload.findings {
        writeln!(w, "{}", finding_line(f))?;
        if !f.evidence.is_empty() {
            let edges: Vec<String> = f.evidence.iter().map(ToString::to_string).collect();
            writeln!(w, "         evidence: {}", edges.join(", "))?;
        }
    }
    Ok(())
}
