//! Partial (ajax) request detection and execute/render target parsing.

use super::external::ExternalContext;
use crate::error::ContextError;

/// Request header announcing a partial request
pub const FACES_REQUEST_HEADER: &str = "Faces-Request";
/// `Faces-Request` value for an ajax request
pub const PARTIAL_AJAX: &str = "partial/ajax";
/// `Faces-Request` value for a partial, non-ajax request
pub const PARTIAL_PROCESS: &str = "partial/process";
/// Parameter listing the client ids to execute
pub const PARTIAL_EXECUTE_PARAM: &str = "javax.faces.partial.execute";
/// Parameter listing the client ids to render
pub const PARTIAL_RENDER_PARAM: &str = "javax.faces.partial.render";
/// Reserved target value: every component
pub const ALL_PARTIAL_PHASE_CLIENT_IDS: &str = "@all";
/// Reserved target value: no component
pub const NO_PARTIAL_PHASE_CLIENT_IDS: &str = "@none";

/// Parsed execute or render target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialTargets {
    All,
    None,
    Ids(Vec<String>),
}

impl PartialTargets {
    /// Parse a parameter value. Ids are separated by commas and/or whitespace.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return PartialTargets::Ids(Vec::new());
        };
        let trimmed = value.trim();
        if trimmed == ALL_PARTIAL_PHASE_CLIENT_IDS {
            return PartialTargets::All;
        }
        if trimmed == NO_PARTIAL_PHASE_CLIENT_IDS {
            return PartialTargets::None;
        }
        let ids = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        PartialTargets::Ids(ids)
    }

    pub fn ids(&self) -> &[String] {
        match self {
            PartialTargets::Ids(ids) => ids,
            _ => &[],
        }
    }
}

/// Per-request view of the partial-request markers
#[derive(Debug, Clone)]
pub struct PartialViewContext {
    ajax: bool,
    partial: bool,
    execute: PartialTargets,
    render: PartialTargets,
    render_all_override: Option<bool>,
}

impl PartialViewContext {
    pub fn from_external(external: &ExternalContext) -> Result<Self, ContextError> {
        let header = external.request_header(FACES_REQUEST_HEADER)?;
        let ajax = header.as_deref() == Some(PARTIAL_AJAX);
        let partial = ajax || header.as_deref() == Some(PARTIAL_PROCESS);
        let execute = PartialTargets::parse(external.request_parameter(PARTIAL_EXECUTE_PARAM)?.as_deref());
        let render = PartialTargets::parse(external.request_parameter(PARTIAL_RENDER_PARAM)?.as_deref());
        Ok(Self {
            ajax,
            partial,
            execute,
            render,
            render_all_override: None,
        })
    }

    pub fn is_ajax_request(&self) -> bool {
        self.ajax
    }

    pub fn is_partial_request(&self) -> bool {
        self.partial
    }

    /// Force the request to be treated as partial (or not).
    pub fn set_partial_request(&mut self, partial: bool) {
        self.partial = partial;
    }

    pub fn is_execute_all(&self) -> bool {
        self.execute == PartialTargets::All
    }

    pub fn is_execute_none(&self) -> bool {
        self.execute == PartialTargets::None
    }

    pub fn is_render_all(&self) -> bool {
        self.render_all_override
            .unwrap_or(self.render == PartialTargets::All)
    }

    pub fn set_render_all(&mut self, render_all: bool) {
        self.render_all_override = Some(render_all);
    }

    pub fn is_render_none(&self) -> bool {
        self.render == PartialTargets::None
    }

    pub fn execute_ids(&self) -> &[String] {
        self.execute.ids()
    }

    pub fn render_ids(&self) -> &[String] {
        self.render.ids()
    }
}
