#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "boardnet: board-network layout and governance analytics",
    long_about = None
)]
struct Cli {
    /// Output format (defaults to pretty on a TTY, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Analysis config file (TOML). Missing sections take defaults.
    #[arg(long, global = true, value_name = "FILE", env = "BOARDNET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Run the full analysis pipeline",
        long_about = "Lay out the network, score centrality, detect conflicts of interest, and assign clusters.",
        after_help = "EXAMPLES:\n    # Analyze a network file\n    boardnet analyze network.json\n\n    # Read from stdin with a reproducible seed\n    cat network.json | boardnet analyze --seed 7\n\n    # Emit machine-readable output\n    boardnet analyze network.json --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Compute node positions",
        long_about = "Run the force-directed layout and print node positions.",
        after_help = "EXAMPLES:\n    # 3D layout with a time budget\n    boardnet layout network.json --dimensions 3 --time-budget-ms 250\n\n    # Emit machine-readable output\n    boardnet layout network.json --json"
    )]
    Layout(cmd::layout::LayoutArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Rank nodes by centrality",
        long_about = "Compute degree, betweenness, closeness, eigenvector, and PageRank centrality.",
        after_help = "EXAMPLES:\n    # Top five brokers\n    boardnet centrality network.json --metric betweenness --top 5\n\n    # Emit machine-readable output\n    boardnet centrality network.json --json"
    )]
    Centrality(cmd::centrality::CentralityArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Detect conflicts of interest",
        long_about = "Report direct interlocks, indirect paths, and financial overlaps.",
        after_help = "EXAMPLES:\n    # High and critical findings only\n    boardnet conflicts network.json --min-severity high\n\n    # Stricter evidence, shorter paths\n    boardnet conflicts network.json --min-confidence 0.8 --max-degree 2\n\n    # Emit machine-readable output\n    boardnet conflicts network.json --json"
    )]
    Conflicts(cmd::conflicts::ConflictsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Group nodes into clusters",
        long_about = "Assign clusters by attribute, structure, or both.",
        after_help = "EXAMPLES:\n    # Group by industry\n    boardnet clusters network.json --strategy attribute --key industry\n\n    # Strong ties only\n    boardnet clusters network.json --strategy structural --min-strength 0.6"
    )]
    Clusters(cmd::clusters::ClustersArgs),

    #[command(
        next_help_heading = "Inspection",
        about = "Summarize a network",
        long_about = "Count nodes, edges, components, and edges per relationship type.",
        after_help = "EXAMPLES:\n    # Summary of a network file\n    boardnet stats network.json\n\n    # Emit machine-readable output\n    boardnet stats network.json --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Inspection",
        about = "Show the effective configuration",
        long_about = "Print the configuration an analysis would run with, after file values and flags.",
        after_help = "EXAMPLES:\n    # Built-in defaults as TOML\n    boardnet config --defaults\n\n    # Effective config from a file\n    boardnet --config boardnet.toml config"
    )]
    Config(cmd::config::ConfigArgs),
}

/// Initialize the tracing subscriber.
///
/// `BOARDNET_LOG` sets the filter (e.g. `boardnet=debug`); `DEBUG` raises the
/// default. `BOARDNET_LOG_FORMAT=json` switches to JSON lines. Logs go to
/// stderr so stdout carries only command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("BOARDNET_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "boardnet=debug,info"
        } else {
            "boardnet=info,warn"
        })
    });

    let format = env::var("BOARDNET_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, output, config),
        Commands::Layout(args) => cmd::layout::run_layout(args, output, config),
        Commands::Centrality(args) => cmd::centrality::run_centrality(args, output, config),
        Commands::Conflicts(args) => cmd::conflicts::run_conflicts(args, output, config),
        Commands::Clusters(args) => cmd::clusters::run_clusters(args, output, config),
        Commands::Stats(args) => cmd::stats::run_stats(args, output, config),
        Commands::Config(args) => cmd::config::run_config(args, output, config),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();

    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            let rendered = CliError::from(&err);
            if render_error(output, &rendered).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmd::conflicts::SeverityArg;

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["boardnet", "--json", "stats", "net.json"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["boardnet", "stats", "net.json", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from(["boardnet", "--format", "text", "--json", "stats"]);
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn network_defaults_to_stdin() {
        let cli = Cli::parse_from(["boardnet", "stats"]);
        match cli.command {
            Commands::Stats(args) => assert_eq!(args.input.network, PathBuf::from("-")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn layout_overrides_parse() {
        let cli = Cli::parse_from([
            "boardnet",
            "layout",
            "net.json",
            "--seed",
            "7",
            "--dimensions",
            "3",
            "--time-budget-ms",
            "250",
        ]);
        match cli.command {
            Commands::Layout(args) => {
                assert_eq!(args.layout.seed, Some(7));
                assert_eq!(args.layout.dimensions, Some(3));
                assert_eq!(args.layout.time_budget_ms, Some(250));
                assert_eq!(args.layout.iterations, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn centrality_metric_parses_case_insensitively() {
        let cli = Cli::parse_from([
            "boardnet",
            "centrality",
            "net.json",
            "--metric",
            "Betweenness",
            "--top",
            "3",
        ]);
        match cli.command {
            Commands::Centrality(args) => {
                assert_eq!(args.metric.as_str(), "betweenness");
                assert_eq!(args.top, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let result = Cli::try_parse_from(["boardnet", "centrality", "--metric", "fame"]);
        assert!(result.is_err());
    }

    #[test]
    fn conflicts_flags_parse() {
        let cli = Cli::parse_from([
            "boardnet",
            "conflicts",
            "net.json",
            "--min-confidence",
            "0.8",
            "--max-degree",
            "2",
            "--min-severity",
            "high",
        ]);
        match cli.command {
            Commands::Conflicts(args) => {
                assert!(args.min_confidence.is_some_and(|v| (v - 0.8).abs() < f64::EPSILON));
                assert_eq!(args.max_degree, Some(2));
                assert_eq!(args.min_severity, SeverityArg::High);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["boardnet", "config", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
