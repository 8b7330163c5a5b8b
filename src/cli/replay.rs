//! Request replay: a JSON fixture describing a request and the scripted behavior of its
//! phases, run through the lifecycle.

use crate::application::Application;
use crate::context::{ExternalContext, FacesContext, FacesMessage, RequestData, Severity, ViewRoot};
use crate::error::FacesError;
use crate::exception::{PhaseError, PhaseId, PhaseOutcome, SubPhase};
use crate::lifecycle::{Lifecycle, PhaseHandler, PhaseListener};
use crate::writer::{MarkupWriter, ResponseWriter, SharedBuffer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A recorded request plus what each phase should do
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayFixture {
    #[serde(default)]
    pub request: RequestData,
    /// View restored during RESTORE_VIEW; defaults to the request path
    #[serde(default)]
    pub view_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<ScriptedMessage>,
    #[serde(default)]
    pub outcomes: Vec<ScriptedOutcome>,
    /// Fragments written as `<update>` blocks for ajax requests
    #[serde(default)]
    pub updates: Vec<ScriptedUpdate>,
    /// Raw markup written for full-page requests
    #[serde(default)]
    pub body: String,
}

/// Message queued during PROCESS_VALIDATIONS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedMessage {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    pub summary: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Abort,
    Failure,
    ViewNotFound,
}

/// Outcome forced on one phase, or on a listener around it when `sub_phase` is set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedOutcome {
    pub phase: PhaseId,
    pub kind: OutcomeKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub sub_phase: Option<SubPhase>,
    /// Wrapper messages, outermost first
    #[serde(default)]
    pub wrapped_in: Vec<String>,
}

impl ScriptedOutcome {
    fn to_outcome(&self) -> PhaseOutcome {
        let outcome = match self.kind {
            OutcomeKind::Abort => PhaseOutcome::abort(self.message.clone()),
            OutcomeKind::Failure | OutcomeKind::ViewNotFound => {
                let root = if self.kind == OutcomeKind::ViewNotFound {
                    PhaseError::view_not_found(self.message.clone())
                } else {
                    PhaseError::msg(self.message.clone())
                };
                let error = self
                    .wrapped_in
                    .iter()
                    .rev()
                    .fold(root, |cause, message| PhaseError::wrap(message.clone(), cause));
                PhaseOutcome::failure(error)
            }
        };
        match &self.component {
            Some(component) => outcome.in_component(component.clone()),
            None => outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedUpdate {
    pub id: String,
    pub content: String,
}

/// Result of a replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayOutput {
    pub status: u16,
    pub content_type: Option<String>,
    pub handled_events: usize,
    /// Phase and message of an exception the handler surfaced as a failure
    pub unhandled: Option<String>,
    pub body: String,
}

struct ScriptedPhases<'a> {
    fixture: &'a ReplayFixture,
}

impl ScriptedPhases<'_> {
    fn scripted(&self, phase: PhaseId, sub_phase: Option<SubPhase>) -> PhaseOutcome {
        self.fixture
            .outcomes
            .iter()
            .find(|o| o.phase == phase && o.sub_phase == sub_phase)
            .map(ScriptedOutcome::to_outcome)
            .unwrap_or(PhaseOutcome::Continue)
    }

    fn prepare(&self, phase: PhaseId, ctx: &mut FacesContext) -> anyhow::Result<()> {
        match phase {
            PhaseId::RestoreView => {
                let view_id = match &self.fixture.view_id {
                    Some(id) => id.clone(),
                    None => ctx.external_context()?.request_path()?.to_string(),
                };
                let locale = ctx.application()?.default_locale().to_string();
                ctx.set_view_root(ViewRoot::new(view_id, locale))?;
            }
            PhaseId::ProcessValidations => {
                for scripted in &self.fixture.messages {
                    let message = FacesMessage {
                        severity: scripted.severity,
                        summary: scripted.summary.clone(),
                        detail: scripted.detail.clone(),
                    };
                    ctx.add_message(scripted.client_id.as_deref(), message)?;
                }
                if ctx.maximum_severity()? >= Some(Severity::Error) {
                    ctx.validation_failed()?;
                    ctx.render_response()?;
                }
            }
            PhaseId::RenderResponse => self.render(ctx)?,
            _ => {}
        }
        Ok(())
    }

    fn render(&self, ctx: &mut FacesContext) -> anyhow::Result<()> {
        if ctx.partial_view_context()?.is_ajax_request() {
            let writer = ctx.partial_response_writer()?;
            writer.start_document()?;
            for update in &self.fixture.updates {
                writer.start_update(&update.id)?;
                writer.write(&update.content)?;
                writer.end_update()?;
            }
            writer.end_document()?;
            writer.flush()?;
        } else {
            let body = {
                let response = ctx.external_context_mut()?.response_mut()?;
                response.set_content_type("text/html");
                response.body()
            };
            ctx.set_response_writer(Box::new(MarkupWriter::html(Box::new(body))))?;
            let writer = ctx.response_writer()?;
            writer.write(&self.fixture.body)?;
            writer.flush()?;
        }
        Ok(())
    }
}

impl PhaseHandler for ScriptedPhases<'_> {
    fn execute(&mut self, phase: PhaseId, ctx: &mut FacesContext) -> PhaseOutcome {
        if let Err(e) = self.prepare(phase, ctx) {
            return PhaseOutcome::failure(e);
        }
        self.scripted(phase, None)
    }
}

/// Listener replaying the before/after outcomes of the fixture
struct ScriptedListener {
    outcomes: Vec<ScriptedOutcome>,
}

impl ScriptedListener {
    fn take(&mut self, phase: PhaseId, sub_phase: SubPhase) -> PhaseOutcome {
        match self
            .outcomes
            .iter()
            .position(|o| o.phase == phase && o.sub_phase == Some(sub_phase))
        {
            Some(index) => self.outcomes.remove(index).to_outcome(),
            None => PhaseOutcome::Continue,
        }
    }
}

impl PhaseListener for ScriptedListener {
    fn phase_id(&self) -> PhaseId {
        PhaseId::AnyPhase
    }

    fn before_phase(&mut self, phase: PhaseId, _ctx: &mut FacesContext) -> PhaseOutcome {
        self.take(phase, SubPhase::Before)
    }

    fn after_phase(&mut self, phase: PhaseId, _ctx: &mut FacesContext) -> PhaseOutcome {
        self.take(phase, SubPhase::After)
    }
}

/// Run `fixture` through a fresh lifecycle.
pub fn replay(application: Arc<Application>, fixture: &ReplayFixture) -> Result<ReplayOutput, FacesError> {
    let body = SharedBuffer::new();
    let external = ExternalContext::for_request(application, fixture.request.clone(), body.clone())
        .with_release_hook(|| debug!("Replay request released"));
    let ctx = FacesContext::new(external);

    let mut lifecycle = Lifecycle::new();
    let listener_outcomes: Vec<ScriptedOutcome> = fixture
        .outcomes
        .iter()
        .filter(|o| o.sub_phase.is_some())
        .cloned()
        .collect();
    if !listener_outcomes.is_empty() {
        lifecycle.add_phase_listener(Box::new(ScriptedListener {
            outcomes: listener_outcomes,
        }));
    }

    let mut phases = ScriptedPhases { fixture };
    info!(
        method = %fixture.request.method,
        path = %fixture.request.path,
        "Replaying request"
    );
    match lifecycle.service(ctx, &mut phases) {
        Ok(report) => Ok(ReplayOutput {
            status: report.status,
            content_type: report.content_type,
            handled_events: report.handled_events,
            unhandled: None,
            body: body.contents(),
        }),
        Err(FacesError::Unhandled {
            phase,
            status,
            message,
        }) => Ok(ReplayOutput {
            status,
            content_type: None,
            handled_events: 0,
            unhandled: Some(format!("{}: {}", phase, message)),
            body: body.contents(),
        }),
        Err(e) => Err(e),
    }
}
