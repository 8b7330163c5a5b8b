//! Config loading facade: merges defaults, files and environment into a [`FacesConfig`].

use super::sources;
use super::FacesConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`FacesConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace files,
    /// `FACES__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<FacesConfig, ConfigError> {
        let builder = sources::defaults()?;
        let builder = sources::with_files(builder, sources::user_config_path());
        let builder = sources::with_files(builder, sources::workspace_files(workspace_root));
        let builder = sources::with_environment(builder);

        let config: FacesConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            project_stage = %config.project_stage,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a single file, ignoring every other source.
    pub fn load_from_file(path: &Path) -> Result<FacesConfig, ConfigError> {
        sources::defaults()?
            .add_source(File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()
    }

    /// Location of the user-level configuration file, if resolvable.
    pub fn global_config_path() -> Option<PathBuf> {
        sources::user_config_path()
    }
}
