//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "preflight",
    version,
    about = "Preflight checks for spreadsheet-sourced tables",
    long_about = "Check that input workbooks exist and hold the expected sheets, then\n\
                  import each table and validate it against the column rules in a\n\
                  project file. Failures are reported through a coded message table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run file and table checks for a project file.
    Check(CheckArgs),

    /// List the entries of an error-code table.
    Codes(CodesArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Project file (TOML) describing the tables to check.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Error-code table (CSV); overrides `codes` in the project file.
    #[arg(long = "codes", value_name = "PATH")]
    pub codes: Option<PathBuf>,

    /// Report failures as warnings and keep checking.
    #[arg(long = "warnings")]
    pub warnings: bool,

    /// Do not print messages as they are recorded.
    #[arg(long = "quiet-messages")]
    pub quiet_messages: bool,

    /// Mirror messages to the log at error level.
    #[arg(long = "log-messages")]
    pub log_messages: bool,

    /// Print the summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CodesArgs {
    /// Error-code table (CSV).
    #[arg(value_name = "CODES")]
    pub codes: PathBuf,

    /// Only list rows for this location.
    #[arg(long = "location", value_name = "LOCN")]
    pub location: Option<String>,
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
