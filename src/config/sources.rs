//! Configuration layers, applied lowest precedence first: built-in defaults, the user
//! file, the workspace files, then `FACES__*` environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub type Builder = ConfigBuilder<DefaultState>;

/// Selects the per-environment workspace file, `config/{FACES_ENV}.toml`.
pub const ENV_SELECTOR: &str = "FACES_ENV";

pub fn defaults() -> Result<Builder, ConfigError> {
    Config::builder()
        .set_default("project_stage", "Production")?
        .set_default("default_locale", "en")
}

/// `$XDG_CONFIG_HOME/faces/config.toml`, else `~/.config/faces/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("faces").join("config.toml"))
}

/// `config/faces.toml` then the file for the active environment.
pub fn workspace_files(workspace_root: &Path) -> Vec<PathBuf> {
    let dir = workspace_root.join("config");
    let environment =
        std::env::var(ENV_SELECTOR).unwrap_or_else(|_| "development".to_string());
    vec![
        dir.join("faces.toml"),
        dir.join(format!("{}.toml", environment)),
    ]
}

/// Add every path that exists as an optional file source; missing ones are skipped.
pub fn with_files(builder: Builder, paths: impl IntoIterator<Item = PathBuf>) -> Builder {
    paths.into_iter().fold(builder, |builder, path| {
        if path.is_file() {
            debug!(config_path = %path.display(), "Adding configuration file");
            builder.add_source(File::from(path).required(false))
        } else {
            builder
        }
    })
}

/// `FACES__PROJECT_STAGE`, `FACES__ERROR_HANDLING__BUILTIN`, ...
pub fn with_environment(builder: Builder) -> Builder {
    builder.add_source(
        Environment::with_prefix("FACES")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
