//! `boardnet layout`: force-directed node positions.

use std::io::{self, Write};
use std::path::Path;

use boardnet_analytics::layout_or_partial;
use boardnet_layout::LayoutResult;
use clap::Args;

use super::{InputArgs, LayoutOverrides, Prepared};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `boardnet layout`.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub layout: LayoutOverrides,
}

/// Execute `boardnet layout`.
pub fn run_layout(
    args: &LayoutArgs,
    output: OutputMode,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let prepared = Prepared::load(&args.input, config_path, |c| {
        args.layout.apply(&mut c.layout);
    })?;
    let graph = prepared.graph()?;
    let result = layout_or_partial(&graph, &prepared.config)?;

    render_mode(output, "layout", &result, render_text, render_pretty)
}

fn coordinates(result: &LayoutResult) -> impl Iterator<Item = (String, String)> + '_ {
    let three_d = result.dimensions == 3;
    result.positions.iter().map(move |(id, p)| {
        let coords = if three_d {
            format!("{:.4} {:.4} {:.4}", p.x, p.y, p.z)
        } else {
            format!("{:.4} {:.4}", p.x, p.y)
        };
        (id.to_string(), coords)
    })
}

fn render_text(result: &LayoutResult, w: &mut dyn Write) -> io::Result<()> {
    for (id, coords) in coordinates(result) {
        writeln!(w, "{id} {coords}")?;
    }
    if result.timed_out {
        writeln!(w, "# partial: stopped after {} iterations", result.iterations_run)?;
    }
    Ok(())
}

fn render_pretty(result: &LayoutResult, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Layout ({}D)", result.dimensions))?;
    pretty_kv(w, "Iterations", result.iterations_run.to_string())?;
    pretty_kv(w, "Converged", result.converged.to_string())?;
    pretty_kv(w, "Timed out", result.timed_out.to_string())?;
    writeln!(w)?;
    for (id, coords) in coordinates(result) {
        writeln!(w, "{id:<24} {coords}")?;
    }
    Ok(())
}
