// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `gwflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gwflow",
    version,
    about = "Plan template-bank and matched-filter jobs for a gravitational-wave search.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workflow config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Workflow.toml")]
    pub config: String,

    /// Path to the input manifest: segments, data locations, injections.
    #[arg(long, value_name = "PATH", default_value = "inputs.toml")]
    pub inputs: String,

    /// Output directory; overrides `[workflow] output-dir`.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Tag applied to every job, e.g. `--tag BNSINJ`. May be repeated.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Where to write the planned workflow (TOML).
    ///
    /// Default: `<output-dir>/workflow-plan.toml`.
    #[arg(long, value_name = "PATH")]
    pub plan: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GWFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate config and inputs, print them, but plan nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
