//! Shared helpers for integration tests

use faces_core::config::{FacesConfig, ProjectStage};
use faces_core::writer::SharedBuffer;
use faces_core::{Application, ExternalContext, FacesContext, RequestData};
use std::sync::Arc;

pub fn application(stage: ProjectStage) -> Arc<Application> {
    let config = FacesConfig {
        project_stage: stage,
        ..FacesConfig::default()
    };
    Application::shared(config)
}

/// Request context over `data`, plus a handle to the response body.
pub fn request_context(app: Arc<Application>, data: RequestData) -> (FacesContext, SharedBuffer) {
    let body = SharedBuffer::new();
    let external = ExternalContext::for_request(app, data, body.clone());
    (FacesContext::new(external), body)
}

pub fn ajax_request(path: &str) -> RequestData {
    RequestData::new("POST", path).with_header("Faces-Request", "partial/ajax")
}
