//! CLI argument definitions for the SAE numbering tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sae-numbering",
    version,
    about = "Assign SAE numbers to completed SAE reports in REDCap",
    long_about = "Assign SAE numbers to completed Serious Adverse Event reports.\n\n\
                  For every configured REDCap project, completed SAE reports without a\n\
                  valid SAE number get <study number>-NN, where NN grows with each new\n\
                  initial report of the participant and is shared by its follow-ups."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include SAE and study numbers in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Number completed SAE reports in the configured projects.
    Run(RunArgs),

    /// List the configured projects.
    Projects(ConfigArgs),
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Config file (default: $SAE_NUMBERING_CONFIG or ./sae-numbering.toml).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only process the given project (repeatable).
    #[arg(long = "project", value_name = "KEY")]
    pub projects: Vec<String>,

    /// Compute SAE numbers without importing them.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the planned SAE numbers of all projects to a CSV file.
    #[arg(long = "plan-csv", value_name = "PATH")]
    pub plan_csv: Option<PathBuf>,

    /// Abort a project without importing when any report cannot be numbered.
    ///
    /// By default reports with missing study numbers or report types are
    /// skipped and listed in the summary, and the remaining numbers are
    /// imported.
    #[arg(long = "strict")]
    pub strict: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
