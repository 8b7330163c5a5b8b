//! Lifecycle driver
//!
//! Runs the request phases against a [`FacesContext`], turns phase outcomes into queued
//! exception events, then hands the queue to the context's exception handler once.

use crate::context::FacesContext;
use crate::error::FacesError;
use crate::exception::{ExceptionQueuedEvent, PhaseId, PhaseOutcome, SubPhase};
use tracing::{debug, info_span};

/// Work performed inside a phase.
pub trait PhaseHandler {
    fn execute(&mut self, phase: PhaseId, ctx: &mut FacesContext) -> PhaseOutcome;
}

impl<F> PhaseHandler for F
where
    F: FnMut(PhaseId, &mut FacesContext) -> PhaseOutcome,
{
    fn execute(&mut self, phase: PhaseId, ctx: &mut FacesContext) -> PhaseOutcome {
        self(phase, ctx)
    }
}

/// Callbacks around phases. `phase_id` of [`PhaseId::AnyPhase`] listens to every phase.
pub trait PhaseListener: Send {
    fn phase_id(&self) -> PhaseId;

    fn before_phase(&mut self, _phase: PhaseId, _ctx: &mut FacesContext) -> PhaseOutcome {
        PhaseOutcome::Continue
    }

    fn after_phase(&mut self, _phase: PhaseId, _ctx: &mut FacesContext) -> PhaseOutcome {
        PhaseOutcome::Continue
    }
}

/// Response summary captured before the context is released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    pub status: u16,
    pub content_type: Option<String>,
    /// Exception events consumed by the handler
    pub handled_events: usize,
}

#[derive(Default)]
pub struct Lifecycle {
    listeners: Vec<Box<dyn PhaseListener>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_phase_listener(&mut self, listener: Box<dyn PhaseListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Run the execute phases, stopping early on render-response or response-complete.
    pub fn execute(
        &mut self,
        ctx: &mut FacesContext,
        handler: &mut dyn PhaseHandler,
    ) -> Result<(), FacesError> {
        for phase in PhaseId::EXECUTE {
            if ctx.is_render_response()? || ctx.is_response_complete()? {
                debug!(skipped = %phase, "Skipping remaining execute phases");
                break;
            }
            self.run_phase(phase, ctx, handler)?;
        }
        Ok(())
    }

    /// Run the render phase unless the response is complete, then dispatch queued exceptions.
    pub fn render(
        &mut self,
        ctx: &mut FacesContext,
        handler: &mut dyn PhaseHandler,
    ) -> Result<(), FacesError> {
        if !ctx.is_response_complete()? {
            self.run_phase(PhaseId::RenderResponse, ctx, handler)?;
        }
        ctx.handle_exceptions()
    }

    /// Process one request and release its context, whatever the outcome.
    pub fn service(
        &mut self,
        mut ctx: FacesContext,
        handler: &mut dyn PhaseHandler,
    ) -> Result<ServiceReport, FacesError> {
        let result = self.process(&mut ctx, handler);
        let released = ctx.release();
        let report = result?;
        released?;
        Ok(report)
    }

    fn process(
        &mut self,
        ctx: &mut FacesContext,
        handler: &mut dyn PhaseHandler,
    ) -> Result<ServiceReport, FacesError> {
        self.execute(ctx, handler)?;
        self.render(ctx, handler)?;
        report(ctx)
    }

    fn run_phase(
        &mut self,
        phase: PhaseId,
        ctx: &mut FacesContext,
        handler: &mut dyn PhaseHandler,
    ) -> Result<(), FacesError> {
        let span = info_span!("phase", phase = %phase);
        let _guard = span.enter();
        ctx.set_current_phase_id(phase)?;

        for listener in self
            .listeners
            .iter_mut()
            .filter(|l| applies(l.phase_id(), phase))
        {
            let outcome = listener.before_phase(phase, ctx);
            record(ctx, phase, Some(SubPhase::Before), outcome)?;
        }

        let outcome = handler.execute(phase, ctx);
        record(ctx, phase, None, outcome)?;

        for listener in self
            .listeners
            .iter_mut()
            .rev()
            .filter(|l| applies(l.phase_id(), phase))
        {
            let outcome = listener.after_phase(phase, ctx);
            record(ctx, phase, Some(SubPhase::After), outcome)?;
        }
        debug!("Phase finished");
        Ok(())
    }
}

fn applies(listener_phase: PhaseId, phase: PhaseId) -> bool {
    listener_phase == PhaseId::AnyPhase || listener_phase == phase
}

/// Queue a non-`Continue` outcome. A failure also skips straight to rendering.
fn record(
    ctx: &mut FacesContext,
    phase: PhaseId,
    sub_phase: Option<SubPhase>,
    outcome: PhaseOutcome,
) -> Result<(), FacesError> {
    let event = match outcome {
        PhaseOutcome::Continue => return Ok(()),
        PhaseOutcome::Abort { signal, component } => {
            with_component(ExceptionQueuedEvent::abort(signal, phase), component)
        }
        PhaseOutcome::Failure { error, component } => {
            ctx.render_response()?;
            with_component(ExceptionQueuedEvent::failure(error, phase), component)
        }
    };
    let event = match sub_phase {
        Some(sub_phase) => event.with_sub_phase(sub_phase),
        None => event,
    };
    let event = event.with_application(ctx.application()?.clone());
    ctx.queue_exception(event)?;
    Ok(())
}

fn with_component(event: ExceptionQueuedEvent, component: Option<String>) -> ExceptionQueuedEvent {
    match component {
        Some(client_id) => event.with_component(client_id),
        None => event,
    }
}

fn report(ctx: &FacesContext) -> Result<ServiceReport, FacesError> {
    let response = ctx.external_context()?.response()?;
    Ok(ServiceReport {
        status: response.status(),
        content_type: response.content_type().map(str::to_string),
        handled_events: ctx.exception_handler()?.handled_exception_events().len(),
    })
}
