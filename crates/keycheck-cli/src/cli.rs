//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "keycheck",
    version,
    about = "Key validation for hierarchical tabular submissions",
    long_about = "Validate a submission of hierarchical tabular files for referential\n\
                  integrity: primary key uniqueness, foreign key existence, optional\n\
                  foreign keys, and parent-to-child surjectivity."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a submission directory against a schema document.
    Validate(ValidateArgs),

    /// Print the declared file types, dependency order, and relations.
    Types(TypesArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Path to the schema document (JSON).
    #[arg(long = "schema", value_name = "FILE")]
    pub schema: PathBuf,

    /// Submission directory containing the data files.
    #[arg(value_name = "SUBMISSION_DIR")]
    pub submission: PathBuf,

    /// Where to write the JSON report (default: <SUBMISSION_DIR>/keycheck-report.json).
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Column delimiter of the submission files.
    #[arg(long = "delimiter", value_enum, default_value = "tab")]
    pub delimiter: DelimiterArg,

    /// Skip row-level consistency checks, trusting upstream shape guarantees.
    #[arg(long = "fast")]
    pub fast: bool,

    /// File types exempt from uniqueness checking (repeatable).
    #[arg(long = "skip-uniqueness", value_name = "TYPE")]
    pub skip_uniqueness: Vec<String>,

    /// Emit a progress log line every N rows.
    #[arg(long = "progress-interval", value_name = "N", default_value_t = 1_000_000)]
    pub progress_interval: u64,

    /// Validate and report without writing the JSON report file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct TypesArgs {
    /// Path to the schema document (JSON).
    #[arg(long = "schema", value_name = "FILE")]
    pub schema: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DelimiterArg {
    Tab,
    Comma,
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
