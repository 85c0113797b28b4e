//! `boardnet config`: print the effective analysis configuration.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use boardnet_core::AnalysisConfig;
use clap::Args;

use super::LayoutOverrides;
use crate::input::read_config;
use crate::output::{OutputMode, pretty_kv, pretty_rule, render_mode};

/// Arguments for `boardnet config`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub layout: LayoutOverrides,

    /// Print built-in defaults, ignoring `--config`.
    #[arg(long)]
    pub defaults: bool,
}

/// Resolve the configuration this invocation would analyze with.
fn effective(args: &ConfigArgs, config_path: Option<&Path>) -> Result<AnalysisConfig> {
    let mut config = if args.defaults {
        AnalysisConfig::default()
    } else {
        read_config(config_path)?
    };
    args.layout.apply(&mut config.layout);
    config.validate()?;
    Ok(config)
}

/// Execute `boardnet config`.
pub fn run_config(
    args: &ConfigArgs,
    output: OutputMode,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = effective(args, config_path)?;
    let toml = config.to_toml_string()?;
    let source = match config_path {
        Some(path) if !args.defaults => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    render_mode(
        output,
        "config",
        &config,
        |_, w| w.write_all(toml.as_bytes()),
        |c, w| render_pretty(c, &source, &toml, w),
    )
}

fn render_pretty(
    config: &AnalysisConfig,
    source: &str,
    toml: &str,
    w: &mut dyn Write,
) -> io::Result<()> {
    pretty_kv(w, "Source", source)?;
    pretty_kv(w, "Fingerprint", config.fingerprint())?;
    pretty_rule(w)?;
    w.write_all(toml.as_bytes())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn file_values_and_flags_combine() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(file, "[layout]\niterations = 42\nseed = 1").expect("write");
        let args = ConfigArgs {
            layout: LayoutOverrides {
                seed: Some(5),
                ..LayoutOverrides::default()
            },
            defaults: false,
        };
        let config = effective(&args, Some(file.path())).expect("config");
        assert_eq!(config.layout.iterations, 42);
        assert_eq!(config.layout.seed, 5);
    }

    #[test]
    fn defaults_flag_ignores_the_file() {
        let args = ConfigArgs {
            defaults: true,
            ..ConfigArgs::default()
        };
        let config = effective(&args, Some(Path::new("/nonexistent/boardnet.toml")))
            .expect("defaults");
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let args = ConfigArgs {
            layout: LayoutOverrides {
                dimensions: Some(5),
                ..LayoutOverrides::default()
            },
            defaults: true,
        };
        assert!(effective(&args, None).is_err());
    }
}
