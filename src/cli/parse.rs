//! CLI parse: clap types for the `faces` binary.

use crate::logging::LoggingConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Replay requests through the faces request-processing lifecycle
#[derive(Debug, Parser)]
#[command(name = "faces", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root; `config/faces.toml` and relative fixture paths resolve against it
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Read configuration from this file only
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Logging flags. Nothing is logged unless `--verbose` is given.
#[derive(Debug, Args)]
pub struct LogArgs {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// trace, debug, info, warn, error or off
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// json or text
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// stdout, stderr or file
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl LogArgs {
    /// Flags given on the command line replace the configured values.
    pub fn apply(&self, config: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = file.clone();
        }
    }
}

/// How `replay` prints its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a request fixture through the lifecycle and print the response
    Replay {
        /// JSON request fixture
        fixture: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Check the effective configuration
    Validate,
}
