//! CLI argument definitions for the submission validator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use evc_model::{AllEmptyKeyPolicy, ValidationProfile};

#[derive(Parser)]
#[command(
    name = "evc",
    version,
    about = "Validate submission batches against dataset schemas",
    long_about = "Validate CSV submission batches against registered dataset schemas.\n\n\
                  Checks field types and constraints, reports duplicate composite keys\n\
                  within the batch and against previously accepted batches."
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

    /// Include submitted cell values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory with `datasets.csv` and `fields.csv` (default: embedded catalog).
    #[arg(
        long = "standards-dir",
        value_name = "DIR",
        env = "EVC_STANDARDS_DIR",
        global = true
    )]
    pub standards_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate one CSV batch for a dataset.
    Validate(ValidateArgs),

    /// List registered datasets and their unique keys.
    Datasets,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Dataset identifier (case-insensitive).
    #[arg(value_name = "DATASET")]
    pub dataset: String,

    /// CSV file holding the batch.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Relaxation profile used to resolve the schema.
    #[arg(long = "profile", value_enum)]
    pub profile: Option<ProfileArg>,

    /// Treatment of records whose key fields are all empty.
    #[arg(long = "all-empty-keys", value_enum)]
    pub all_empty_keys: Option<EmptyKeyArg>,

    /// Reject batches with more data rows than this.
    #[arg(long = "max-rows", value_name = "N")]
    pub max_rows: Option<usize>,

    /// Batch identifier (default: prefix of the content hash).
    #[arg(long = "batch-id", value_name = "ID")]
    pub batch_id: Option<String>,

    /// Directory of accepted batches used for cross-batch duplicate checks.
    #[arg(long = "store", value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Persist the batch into the store when it resolves valid.
    #[arg(long = "accept", requires = "store")]
    pub accept: bool,

    /// Print the report as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    Baseline,
    RelaxedNulls,
}

impl From<ProfileArg> for ValidationProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Baseline => Self::Baseline,
            ProfileArg::RelaxedNulls => Self::RelaxedNulls,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EmptyKeyArg {
    Group,
    Ignore,
}

impl From<EmptyKeyArg> for AllEmptyKeyPolicy {
    fn from(arg: EmptyKeyArg) -> Self {
        match arg {
            EmptyKeyArg::Group => Self::Group,
            EmptyKeyArg::Ignore => Self::Ignore,
        }
    }
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
