//! Exception handler: the unhandled/handled queues and the two dispatch strategies.

use super::error_page::{ErrorPageWriter, ReportedError};
use super::event::{AbortSignal, ExceptionQueuedEvent, QueuedException};
use crate::application::Application;
use crate::config::{ProjectStage, ERROR_HANDLING_PARAM, ERROR_PAGE_PARAM};
use crate::context::FacesContext;
use crate::error::FacesError;
use std::collections::VecDeque;
use tracing::{debug, error, warn};

/// Queue-and-dispatch contract used by the lifecycle and by error-page rendering.
pub trait ExceptionHandler: Send {
    /// Append an event to the tail of the unhandled queue.
    fn process_event(&mut self, event: ExceptionQueuedEvent);

    /// Drain the unhandled queue in FIFO order.
    fn handle(&mut self, ctx: &mut FacesContext) -> Result<(), FacesError>;

    /// The single event that was reported, if any.
    fn handled_exception_event(&self) -> Option<&ExceptionQueuedEvent>;

    /// Every consumed event, in consumption order.
    fn handled_exception_events(&self) -> &[ExceptionQueuedEvent];

    fn unhandled_exception_events(&self) -> &VecDeque<ExceptionQueuedEvent>;
}

/// Which strategy `handle` uses, resolved once per handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorHandlingSettings {
    pub error_page_present: bool,
    pub use_builtin: bool,
}

impl ErrorHandlingSettings {
    /// Context parameters win over the configuration file. Built-in handling defaults to
    /// on only in the Development stage.
    pub fn resolve(application: &Application) -> Self {
        let config = &application.config().error_handling;
        let error_page_present = application
            .init_parameter(ERROR_PAGE_PARAM)
            .map(|page| !page.trim().is_empty())
            .unwrap_or_else(|| config.error_page.is_some());
        let use_builtin = application
            .init_parameter(ERROR_HANDLING_PARAM)
            .and_then(parse_flag)
            .or(config.builtin)
            .unwrap_or(application.project_stage() == ProjectStage::Development);
        Self {
            error_page_present,
            use_builtin,
        }
    }

    /// Collect every reportable failure and render it, instead of failing the request.
    pub fn collects_errors(&self) -> bool {
        self.use_builtin && !self.error_page_present
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Message logged for a swallowed abort signal.
fn describe_abort(event: &ExceptionQueuedEvent, signal: &AbortSignal) -> String {
    let mut message = format!("Processing aborted during {}", event.phase());
    if let Some(sub_phase) = event.sub_phase() {
        message.push_str(&format!(" ({})", sub_phase));
    }
    if let Some(component) = event.component() {
        message.push_str(&format!(" in component {}", component));
    }
    message.push_str(&format!(": {}", signal));
    message
}

/// Default handler installed on every request context
#[derive(Debug, Default)]
pub struct QueuedExceptionHandler {
    unhandled: VecDeque<ExceptionQueuedEvent>,
    handled: Vec<ExceptionQueuedEvent>,
    thrown: Option<usize>,
    settings: Option<ErrorHandlingSettings>,
}

impl QueuedExceptionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings if they have been resolved yet.
    pub fn settings(&self) -> Option<ErrorHandlingSettings> {
        self.settings
    }

    fn ensure_settings(&mut self, application: &Application) -> ErrorHandlingSettings {
        *self.settings.get_or_insert_with(|| {
            let settings = ErrorHandlingSettings::resolve(application);
            debug!(
                error_page_present = settings.error_page_present,
                use_builtin = settings.use_builtin,
                "Resolved error handling settings"
            );
            settings
        })
    }

    /// Move every queued event to the handled list, returning the reports to surface.
    fn drain(&mut self, collect_all: bool) -> Vec<ReportedError> {
        let mut reports = Vec::new();
        let mut thrown = None;
        while let Some(event) = self.unhandled.pop_front() {
            match event.exception() {
                QueuedException::Abort(signal) => {
                    error!(
                        phase = %event.phase(),
                        sub_phase = ?event.sub_phase(),
                        component = event.component().unwrap_or(""),
                        "{}",
                        describe_abort(&event, signal)
                    );
                }
                QueuedException::Failure(_) => {
                    if thrown.is_none() {
                        thrown = Some(self.handled.len());
                    }
                    if collect_all || reports.is_empty() {
                        reports.extend(ReportedError::from_event(&event));
                    }
                }
            }
            self.handled.push(event);
        }
        if thrown.is_some() {
            self.thrown = thrown;
        }
        reports
    }
}

impl ExceptionHandler for QueuedExceptionHandler {
    fn process_event(&mut self, event: ExceptionQueuedEvent) {
        if let Some(application) = event.application().cloned() {
            self.ensure_settings(&application);
        }
        self.unhandled.push_back(event);
    }

    fn handle(&mut self, ctx: &mut FacesContext) -> Result<(), FacesError> {
        let application = ctx.application()?.clone();
        let settings = self.ensure_settings(&application);
        let collect_all = settings.collects_errors();
        let reports = self.drain(collect_all);
        let Some(first) = reports.first() else {
            return Ok(());
        };

        if collect_all {
            if let Err(e) = ErrorPageWriter::render(ctx, &reports) {
                error!(error = %e, "Failed to render error page");
            }
            return Ok(());
        }

        let status = first.status;
        match ctx
            .external_context_mut()
            .and_then(|external| external.response_mut())
        {
            Ok(response) => response.set_status(status),
            Err(e) => warn!(error = %e, "Cannot set error status on response"),
        }
        Err(FacesError::Unhandled {
            phase: first.phase,
            status,
            message: first.message.clone(),
        })
    }

    fn handled_exception_event(&self) -> Option<&ExceptionQueuedEvent> {
        self.thrown.and_then(|index| self.handled.get(index))
    }

    fn handled_exception_events(&self) -> &[ExceptionQueuedEvent] {
        &self.handled
    }

    fn unhandled_exception_events(&self) -> &VecDeque<ExceptionQueuedEvent> {
        &self.unhandled
    }
}
