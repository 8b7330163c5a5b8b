//! Application: process-wide state shared by every request context.

use crate::config::{FacesConfig, ProjectStage};
use crate::scope::{AttributeMap, ReadOnlySource, SharedAttributes};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolved configuration plus the application scope
#[derive(Debug)]
pub struct Application {
    config: FacesConfig,
    project_stage: ProjectStage,
    attributes: SharedAttributes,
}

impl Application {
    pub fn new(config: FacesConfig) -> Self {
        let project_stage = config.effective_project_stage();
        Self {
            config,
            project_stage,
            attributes: SharedAttributes::application(),
        }
    }

    pub fn shared(config: FacesConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    pub fn config(&self) -> &FacesConfig {
        &self.config
    }

    pub fn project_stage(&self) -> ProjectStage {
        self.project_stage
    }

    pub fn default_locale(&self) -> &str {
        &self.config.default_locale
    }

    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.config.init_params.get(name).map(|s| s.as_str())
    }

    pub fn init_parameters(&self) -> &HashMap<String, String> {
        &self.config.init_params
    }

    /// Map view of the init parameters. Read-only.
    pub fn init_parameter_map(&self) -> AttributeMap<ReadOnlySource<String>> {
        AttributeMap::new(ReadOnlySource::init_parameters(&self.config.init_params))
    }

    /// Map view of the application scope. Every call returns a handle to the same store.
    pub fn application_map(&self) -> AttributeMap<SharedAttributes> {
        AttributeMap::new(self.attributes.clone())
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(FacesConfig::default())
    }
}
