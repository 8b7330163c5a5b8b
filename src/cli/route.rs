//! CLI route: run context and the command table.

use crate::application::Application;
use crate::cli::output::{format_replay_json, format_replay_text};
use crate::cli::parse::{Commands, ReportFormat};
use crate::cli::replay::{replay, ReplayFixture};
use crate::config::{ConfigLoader, FacesConfig};
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Runtime context for CLI execution: workspace, resolved configuration and the
/// application built from it.
pub struct RunContext {
    workspace_root: PathBuf,
    application: Arc<Application>,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => ConfigLoader::load(&workspace_root).with_context(|| {
                format!("loading configuration for {}", workspace_root.display())
            })?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: FacesConfig) -> Self {
        Self {
            workspace_root,
            application: Application::shared(config),
        }
    }

    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    /// Execute a command, returning the text to print.
    pub fn execute(&self, command: &Commands) -> anyhow::Result<String> {
        match command {
            Commands::Replay { fixture, format } => self.handle_replay(fixture, *format),
            Commands::Validate => self.handle_validate(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn handle_replay(&self, fixture: &Path, format: ReportFormat) -> anyhow::Result<String> {
        let path = self.resolve(fixture);
        debug!(fixture = %path.display(), "Loading request fixture");
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        let fixture: ReplayFixture = serde_json::from_str(&raw)
            .with_context(|| format!("parsing fixture {}", path.display()))?;
        let output = replay(self.application.clone(), &fixture)?;
        match format {
            ReportFormat::Json => Ok(format_replay_json(&output)?),
            ReportFormat::Text => Ok(format_replay_text(&output)),
        }
    }

    fn handle_validate(&self) -> anyhow::Result<String> {
        match self.application.config().validate() {
            Ok(()) => Ok(format!(
                "Configuration valid (project stage: {})",
                self.application.project_stage()
            )),
            Err(errors) => {
                let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
                bail!("Configuration invalid:\n{}", lines.join("\n"))
            }
        }
    }
}
