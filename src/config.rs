//! Configuration System
//!
//! Layered configuration for the request-processing core: project stage, error handling
//! strategy, context (init) parameters, default locale and logging. Files and environment
//! variables are merged by [`ConfigLoader`].

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

mod facade;
mod sources;

pub use facade::ConfigLoader;

/// Context parameter selecting the project stage
pub const PROJECT_STAGE_PARAM: &str = "javax.faces.PROJECT_STAGE";
/// Context parameter forcing built-in error handling on or off
pub const ERROR_HANDLING_PARAM: &str = "org.apache.myfaces.ERROR_HANDLING";
/// Context parameter naming a custom error page
pub const ERROR_PAGE_PARAM: &str = "org.apache.myfaces.ERROR_PAGE";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacesConfig {
    #[serde(default)]
    pub project_stage: ProjectStage,

    #[serde(default)]
    pub error_handling: ErrorHandlingConfig,

    /// Locale assigned to freshly created view roots
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Context parameters, as a deployment descriptor would declare them
    #[serde(default)]
    pub init_params: HashMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for FacesConfig {
    fn default() -> Self {
        Self {
            project_stage: ProjectStage::default(),
            error_handling: ErrorHandlingConfig::default(),
            default_locale: default_locale(),
            init_params: HashMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Error handling settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    /// Custom error page location; when present the container's page is used instead
    #[serde(default)]
    pub error_page: Option<String>,

    /// Use the built-in error page. Unset means "only in Development".
    #[serde(default)]
    pub builtin: Option<bool>,
}

/// Project stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStage {
    Development,
    UnitTest,
    SystemTest,
    #[default]
    Production,
}

impl fmt::Display for ProjectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectStage::Development => "Development",
            ProjectStage::UnitTest => "UnitTest",
            ProjectStage::SystemTest => "SystemTest",
            ProjectStage::Production => "Production",
        };
        f.write_str(name)
    }
}

impl FromStr for ProjectStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Development" => Ok(ProjectStage::Development),
            "UnitTest" => Ok(ProjectStage::UnitTest),
            "SystemTest" => Ok(ProjectStage::SystemTest),
            "Production" => Ok(ProjectStage::Production),
            other => Err(format!("Unknown project stage: {}", other)),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    ErrorHandling(String),
    Locale(String),
    InitParam(String, String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ErrorHandling(msg) => write!(f, "Error handling: {}", msg),
            ValidationError::Locale(msg) => write!(f, "Locale: {}", msg),
            ValidationError::InitParam(name, msg) => write!(f, "Init param '{}': {}", name, msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FacesConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(page) = &self.error_handling.error_page {
            if page.trim().is_empty() {
                errors.push(ValidationError::ErrorHandling(
                    "error_page cannot be empty".to_string(),
                ));
            }
        }

        if self.default_locale.trim().is_empty() {
            errors.push(ValidationError::Locale(
                "default_locale cannot be empty".to_string(),
            ));
        }

        if let Some(stage) = self.init_params.get(PROJECT_STAGE_PARAM) {
            if let Err(e) = stage.parse::<ProjectStage>() {
                errors.push(ValidationError::InitParam(PROJECT_STAGE_PARAM.to_string(), e));
            }
        }

        if let Some(flag) = self.init_params.get(ERROR_HANDLING_PARAM) {
            if flag.trim().to_ascii_lowercase().parse::<bool>().is_err() {
                errors.push(ValidationError::InitParam(
                    ERROR_HANDLING_PARAM.to_string(),
                    format!("expected true or false, got '{}'", flag),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Project stage after applying the context parameter override.
    pub fn effective_project_stage(&self) -> ProjectStage {
        self.init_params
            .get(PROJECT_STAGE_PARAM)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.project_stage)
    }
}
