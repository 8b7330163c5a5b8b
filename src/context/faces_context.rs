//! Per-request context and its create/use/release lifecycle.

use super::external::ExternalContext;
use super::messages::{FacesMessage, MessageList, Severity};
use super::partial::PartialViewContext;
use super::view::ViewRoot;
use crate::application::Application;
use crate::error::{ContextError, FacesError};
use crate::exception::{ExceptionHandler, ExceptionQueuedEvent, PhaseId, QueuedExceptionHandler};
use crate::writer::{
    partial::PARTIAL_CONTENT_TYPE, MarkupWriter, PartialResponseWriter, ResponseWriter,
    SharedBuffer,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Operations the startup/shutdown variant supports.
const STARTUP_OPERATIONS: &[&str] = &["application", "external_context", "view_root", "set_view_root"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextKind {
    Request,
    Startup,
}

/// Where response output goes. A stream and a writer are mutually exclusive.
enum ResponseOutput {
    Unset,
    Stream(SharedBuffer),
    Writer(Box<dyn ResponseWriter>),
    Partial(PartialResponseWriter),
}

impl ResponseOutput {
    fn name(&self) -> &'static str {
        match self {
            ResponseOutput::Unset => "nothing",
            ResponseOutput::Stream(_) => "response stream",
            ResponseOutput::Writer(_) | ResponseOutput::Partial(_) => "response writer",
        }
    }
}

struct ContextState {
    application: Arc<Application>,
    external: ExternalContext,
    view_root: Option<ViewRoot>,
    output: ResponseOutput,
    messages: MessageList,
    partial: Option<PartialViewContext>,
    exception_handler: Option<Box<dyn ExceptionHandler>>,
    current_phase: PhaseId,
    render_response: bool,
    response_complete: bool,
    validation_failed: bool,
}

/// Per-request mutable state.
///
/// Every accessor fails with [`ContextError::Released`] once [`FacesContext::release`] has
/// run, and `release` itself fails the second time. The context is passed explicitly to
/// whatever needs it; there is no ambient "current instance".
pub struct FacesContext {
    kind: ContextKind,
    state: Option<ContextState>,
}

impl fmt::Debug for FacesContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacesContext")
            .field("kind", &self.kind)
            .field("released", &self.state.is_none())
            .finish()
    }
}

impl FacesContext {
    /// Context for a real request, with the default exception handler installed.
    pub fn new(external: ExternalContext) -> Self {
        let application = external.application().clone();
        debug!(startup = external.is_startup(), "FacesContext created");
        Self {
            kind: ContextKind::Request,
            state: Some(ContextState {
                application,
                external,
                view_root: None,
                output: ResponseOutput::Unset,
                messages: MessageList::new(),
                partial: None,
                exception_handler: Some(Box::new(QueuedExceptionHandler::new())),
                current_phase: PhaseId::AnyPhase,
                render_response: false,
                response_complete: false,
                validation_failed: false,
            }),
        }
    }

    /// Restricted context used while the application starts up or shuts down.
    pub fn startup(application: Arc<Application>) -> Self {
        let view_root = ViewRoot::new("", application.default_locale());
        let external = ExternalContext::for_startup(application.clone());
        Self {
            kind: ContextKind::Startup,
            state: Some(ContextState {
                application,
                external,
                view_root: Some(view_root),
                output: ResponseOutput::Unset,
                messages: MessageList::new(),
                partial: None,
                exception_handler: None,
                current_phase: PhaseId::AnyPhase,
                render_response: false,
                response_complete: false,
                validation_failed: false,
            }),
        }
    }

    fn live(&self, operation: &'static str) -> Result<&ContextState, ContextError> {
        let state = self.state.as_ref().ok_or(ContextError::Released)?;
        self.check_kind(operation)?;
        Ok(state)
    }

    fn live_mut(&mut self, operation: &'static str) -> Result<&mut ContextState, ContextError> {
        self.check_kind(operation)?;
        self.state.as_mut().ok_or(ContextError::Released)
    }

    fn check_kind(&self, operation: &'static str) -> Result<(), ContextError> {
        if self.state.is_none() {
            return Err(ContextError::Released);
        }
        if self.kind == ContextKind::Startup && !STARTUP_OPERATIONS.contains(&operation) {
            return Err(ContextError::UnsupportedDuringStartup(operation));
        }
        Ok(())
    }

    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }

    pub fn is_startup(&self) -> bool {
        self.kind == ContextKind::Startup
    }

    /// Release all per-request state. Fails if already released.
    ///
    /// The external context is released first, then every reference is dropped.
    pub fn release(&mut self) -> Result<(), ContextError> {
        let state = self.state.take().ok_or(ContextError::Released)?;
        let ContextState {
            external,
            exception_handler,
            ..
        } = state;
        if let Some(handler) = &exception_handler {
            if !handler.unhandled_exception_events().is_empty() {
                warn!(
                    count = handler.unhandled_exception_events().len(),
                    "Releasing context with unhandled exception events"
                );
            }
        }
        external.release();
        debug!("FacesContext released");
        Ok(())
    }

    pub fn application(&self) -> Result<&Arc<Application>, ContextError> {
        Ok(&self.live("application")?.application)
    }

    pub fn external_context(&self) -> Result<&ExternalContext, ContextError> {
        Ok(&self.live("external_context")?.external)
    }

    pub fn external_context_mut(&mut self) -> Result<&mut ExternalContext, ContextError> {
        Ok(&mut self.live_mut("external_context")?.external)
    }

    pub fn view_root(&self) -> Result<Option<&ViewRoot>, ContextError> {
        Ok(self.live("view_root")?.view_root.as_ref())
    }

    pub fn set_view_root(&mut self, view_root: ViewRoot) -> Result<(), ContextError> {
        self.live_mut("set_view_root")?.view_root = Some(view_root);
        Ok(())
    }

    /// Queue a message; `client_id == None` queues a global message.
    pub fn add_message(
        &mut self,
        client_id: Option<&str>,
        message: FacesMessage,
    ) -> Result<(), ContextError> {
        self.live_mut("add_message")?.messages.add(client_id, message);
        Ok(())
    }

    pub fn messages(&self) -> Result<&[FacesMessage], ContextError> {
        Ok(self.live("messages")?.messages.all())
    }

    pub fn messages_for(&self, client_id: Option<&str>) -> Result<Vec<&FacesMessage>, ContextError> {
        Ok(self.live("messages_for")?.messages.for_client(client_id))
    }

    /// Distinct client ids with queued messages, in first-occurrence order.
    pub fn client_ids_with_messages(&self) -> Result<Vec<Option<String>>, ContextError> {
        Ok(self.live("client_ids_with_messages")?.messages.client_ids())
    }

    pub fn maximum_severity(&self) -> Result<Option<Severity>, ContextError> {
        Ok(self.live("maximum_severity")?.messages.maximum_severity())
    }

    pub fn current_phase_id(&self) -> Result<PhaseId, ContextError> {
        Ok(self.live("current_phase_id")?.current_phase)
    }

    pub fn set_current_phase_id(&mut self, phase: PhaseId) -> Result<(), ContextError> {
        self.live_mut("set_current_phase_id")?.current_phase = phase;
        Ok(())
    }

    /// Skip to the render phase after the current phase.
    pub fn render_response(&mut self) -> Result<(), ContextError> {
        self.live_mut("render_response")?.render_response = true;
        Ok(())
    }

    pub fn is_render_response(&self) -> Result<bool, ContextError> {
        Ok(self.live("is_render_response")?.render_response)
    }

    /// Stop the lifecycle after the current phase; the response is already complete.
    pub fn response_complete(&mut self) -> Result<(), ContextError> {
        self.live_mut("response_complete")?.response_complete = true;
        Ok(())
    }

    pub fn is_response_complete(&self) -> Result<bool, ContextError> {
        Ok(self.live("is_response_complete")?.response_complete)
    }

    pub fn validation_failed(&mut self) -> Result<(), ContextError> {
        self.live_mut("validation_failed")?.validation_failed = true;
        Ok(())
    }

    pub fn is_validation_failed(&self) -> Result<bool, ContextError> {
        Ok(self.live("is_validation_failed")?.validation_failed)
    }

    pub fn partial_view_context(&mut self) -> Result<&mut PartialViewContext, ContextError> {
        let state = self.live_mut("partial_view_context")?;
        if state.partial.is_none() {
            state.partial = Some(PartialViewContext::from_external(&state.external)?);
        }
        state.partial.as_mut().ok_or(ContextError::Released)
    }

    /// Raw response stream. Fails when a response writer is in use.
    pub fn response_stream(&mut self) -> Result<SharedBuffer, ContextError> {
        let state = self.live_mut("response_stream")?;
        match &state.output {
            ResponseOutput::Stream(stream) => Ok(stream.clone()),
            ResponseOutput::Unset => {
                let body = state.external.response()?.body();
                state.output = ResponseOutput::Stream(body.clone());
                Ok(body)
            }
            other => Err(ContextError::OutputConflict(other.name())),
        }
    }

    pub fn set_response_writer(&mut self, writer: Box<dyn ResponseWriter>) -> Result<(), ContextError> {
        let state = self.live_mut("set_response_writer")?;
        if let ResponseOutput::Stream(_) = state.output {
            return Err(ContextError::OutputConflict("response stream"));
        }
        state.output = ResponseOutput::Writer(writer);
        Ok(())
    }

    pub fn has_response_writer(&self) -> Result<bool, ContextError> {
        Ok(matches!(
            self.live("has_response_writer")?.output,
            ResponseOutput::Writer(_) | ResponseOutput::Partial(_)
        ))
    }

    pub fn response_writer(&mut self) -> Result<&mut dyn ResponseWriter, ContextError> {
        match &mut self.live_mut("response_writer")?.output {
            ResponseOutput::Writer(writer) => Ok(writer.as_mut()),
            ResponseOutput::Partial(writer) => Ok(writer),
            _ => Err(ContextError::NoResponseWriter),
        }
    }

    /// Partial-response writer, created on first use around the current response writer or,
    /// if none is set, around an XML writer on the response body.
    pub fn partial_response_writer(&mut self) -> Result<&mut PartialResponseWriter, ContextError> {
        let view_id = self
            .live("partial_response_writer")?
            .view_root
            .as_ref()
            .map(|root| root.container_client_id().to_string())
            .filter(|id| !id.is_empty());
        let state = self.live_mut("partial_response_writer")?;
        let current = std::mem::replace(&mut state.output, ResponseOutput::Unset);
        let partial = match current {
            ResponseOutput::Partial(writer) => writer,
            ResponseOutput::Writer(writer) => PartialResponseWriter::new(writer),
            ResponseOutput::Unset => {
                let response = state.external.response_mut()?;
                response.set_content_type(PARTIAL_CONTENT_TYPE);
                let inner = MarkupWriter::xml(Box::new(response.body()));
                PartialResponseWriter::new(Box::new(inner))
            }
            stream @ ResponseOutput::Stream(_) => {
                state.output = stream;
                return Err(ContextError::OutputConflict("response stream"));
            }
        };
        let partial = match view_id {
            Some(id) => partial.with_response_id(id),
            None => partial,
        };
        state.output = ResponseOutput::Partial(partial);
        match &mut state.output {
            ResponseOutput::Partial(writer) => Ok(writer),
            _ => Err(ContextError::NoResponseWriter),
        }
    }

    /// Drop whatever output is in use so a fresh stream or writer can be obtained.
    pub fn reset_response_output(&mut self) -> Result<(), ContextError> {
        self.live_mut("reset_response_output")?.output = ResponseOutput::Unset;
        Ok(())
    }

    pub fn exception_handler(&self) -> Result<&dyn ExceptionHandler, ContextError> {
        self.live("exception_handler")?
            .exception_handler
            .as_deref()
            .ok_or(ContextError::Released)
    }

    pub fn set_exception_handler(
        &mut self,
        handler: Box<dyn ExceptionHandler>,
    ) -> Result<(), ContextError> {
        self.live_mut("set_exception_handler")?.exception_handler = Some(handler);
        Ok(())
    }

    /// Hand an exception event to the installed handler's queue.
    pub fn queue_exception(&mut self, event: ExceptionQueuedEvent) -> Result<(), ContextError> {
        let state = self.live_mut("queue_exception")?;
        if let Some(handler) = state.exception_handler.as_mut() {
            handler.process_event(event);
        }
        Ok(())
    }

    /// Run the installed handler over everything queued so far.
    pub fn handle_exceptions(&mut self) -> Result<(), FacesError> {
        let mut handler = match self.live_mut("handle_exceptions")?.exception_handler.take() {
            Some(handler) => handler,
            None => return Ok(()),
        };
        let result = handler.handle(self);
        if let Some(state) = self.state.as_mut() {
            state.exception_handler = Some(handler);
        }
        result
    }
}

impl Drop for FacesContext {
    fn drop(&mut self) {
        if self.state.is_some() {
            warn!("FacesContext dropped without release; releasing now");
            let _ = self.release();
        }
    }
}
