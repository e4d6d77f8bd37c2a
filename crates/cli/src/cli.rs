//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use contracts::ValidationPolicy;

/// taskpool - bounded-batch task dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "taskpool",
    author,
    version,
    about = "Bounded-batch task dispatcher",
    long_about = "Reads a stream of tasks, groups them into fixed-size batches and hands \n\
                  each batch to a processor. A task of kind \"quit\" flushes the last \n\
                  partial batch and ends the stream."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TASKPOOL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TASKPOOL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed tasks through a dispatcher
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults to a log processor
    #[arg(short, long, env = "TASKPOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-lines task file, `-` for stdin (default when --generate is absent)
    #[arg(short, long, conflicts_with = "generate")]
    pub input: Option<PathBuf>,

    /// Generate this many demo tasks instead of reading input
    #[arg(long)]
    pub generate: Option<u64>,

    /// Delay between generated tasks in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,

    /// Override batch capacity from configuration
    #[arg(long, env = "TASKPOOL_CAPACITY")]
    pub capacity: Option<usize>,

    /// Override invalid-task policy from configuration
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Submit the quit sentinel after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "TASKPOOL_TIMEOUT")]
    pub timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TASKPOOL_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "taskpool.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "taskpool.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Invalid-task policy
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PolicyArg {
    /// Stop the stream on the first invalid item
    Abort,
    /// Log and skip invalid items
    Skip,
}

impl From<PolicyArg> for ValidationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Abort => ValidationPolicy::Abort,
            PolicyArg::Skip => ValidationPolicy::Skip,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
