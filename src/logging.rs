//! Logging System
//!
//! Structured logging through `tracing`. Level, format and destination come from
//! [`LoggingConfig`]; the `FACES_LOG*` environment variables override it.

use crate::error::FacesError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error or off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or text
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr or file
    #[serde(default = "default_output")]
    pub output: String,

    /// Used when `output` is "file"
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// ANSI colors for text output on a terminal stream
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-target levels, e.g. `faces_core::writer = "trace"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("faces.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = FacesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(FacesError::Config(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogOutput {
    Stdout,
    Stderr,
    File,
}

impl FromStr for LogOutput {
    type Err = FacesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            other => Err(FacesError::Config(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
                other
            ))),
        }
    }
}

/// Environment value if set, else the configured one, else the default.
fn setting(var: &str, configured: Option<&str>, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| configured.unwrap_or(default).to_string())
}

/// Install the global subscriber.
///
/// Precedence: `FACES_LOG`, `FACES_LOG_FORMAT`, `FACES_LOG_OUTPUT` and `FACES_LOG_MODULES`,
/// then `config`, then defaults.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), FacesError> {
    let filter = build_env_filter(config)?;
    let format: LogFormat =
        setting("FACES_LOG_FORMAT", config.map(|c| c.format.as_str()), "text").parse()?;
    let output: LogOutput =
        setting("FACES_LOG_OUTPUT", config.map(|c| c.output.as_str()), "stderr").parse()?;
    let ansi = output != LogOutput::File && config.map(|c| c.color).unwrap_or(true);

    let writer = match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => {
            let path = config.map(|c| c.file.clone()).unwrap_or_else(default_log_file);
            BoxMakeWriter::new(Mutex::new(open_log_file(&path)?))
        }
    };

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let registry = Registry::default().with(filter);
    let result = match format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Text => registry.with(layer.with_ansi(ansi)).try_init(),
    };
    result.map_err(|e| FacesError::Config(format!("Failed to install subscriber: {}", e)))
}

fn open_log_file(path: &Path) -> Result<std::fs::File, FacesError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| FacesError::Config(format!("Failed to create log directory: {}", e)))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FacesError::Config(format!("Failed to open log file {:?}: {}", path, e)))
}

fn directive(target: &str, level: &str) -> Result<tracing_subscriber::filter::Directive, FacesError> {
    format!("{}={}", target.trim(), level.trim())
        .parse()
        .map_err(|e| FacesError::Config(format!("Invalid log directive: {}", e)))
}

/// Filter from `FACES_LOG` verbatim, or the configured level plus per-target overrides.
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, FacesError> {
    if let Ok(filter) = EnvFilter::try_from_env("FACES_LOG") {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(level);
    for (target, target_level) in config.iter().flat_map(|c| c.modules.iter()) {
        filter = filter.add_directive(directive(target, target_level)?);
    }
    if let Ok(overrides) = std::env::var("FACES_LOG_MODULES") {
        for (target, target_level) in overrides.split(',').filter_map(|pair| pair.split_once('=')) {
            filter = filter.add_directive(directive(target, target_level)?);
        }
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "text");
        assert_eq!(config.output, "stderr");
        assert!(config.color);
    }

    #[test]
    fn test_parse_format_and_output() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!("file".parse::<LogOutput>().unwrap(), LogOutput::File);
        assert!("both".parse::<LogOutput>().is_err());
    }

    #[test]
    fn test_module_directive() {
        assert!(directive("faces_core::writer", "trace").is_ok());
        assert!(directive("faces_core", "loud").is_err());
    }
}
