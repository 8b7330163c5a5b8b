//! Phase identifiers, phase outcomes and the queued exception event.

use crate::application::Application;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseId {
    AnyPhase,
    RestoreView,
    ApplyRequestValues,
    ProcessValidations,
    UpdateModelValues,
    InvokeApplication,
    RenderResponse,
}

impl PhaseId {
    /// Phases run by `Lifecycle::execute`, in order.
    pub const EXECUTE: [PhaseId; 5] = [
        PhaseId::RestoreView,
        PhaseId::ApplyRequestValues,
        PhaseId::ProcessValidations,
        PhaseId::UpdateModelValues,
        PhaseId::InvokeApplication,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PhaseId::AnyPhase => "ANY",
            PhaseId::RestoreView => "RESTORE_VIEW",
            PhaseId::ApplyRequestValues => "APPLY_REQUEST_VALUES",
            PhaseId::ProcessValidations => "PROCESS_VALIDATIONS",
            PhaseId::UpdateModelValues => "UPDATE_MODEL_VALUES",
            PhaseId::InvokeApplication => "INVOKE_APPLICATION",
            PhaseId::RenderResponse => "RENDER_RESPONSE",
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a listener failed before or after its phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubPhase {
    Before,
    After,
}

impl fmt::Display for SubPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubPhase::Before => f.write_str("BEFORE"),
            SubPhase::After => f.write_str("AFTER"),
        }
    }
}

/// Control-flow marker: stop the current listener chain. Logged, never reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AbortSignal {
    pub message: String,
}

impl AbortSignal {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A reportable failure raised while running a phase
#[derive(Debug, Error)]
pub enum PhaseError {
    /// Wrapper whose cause chain is walked to find the root cause.
    #[error("{message}")]
    Wrapped {
        message: String,
        #[source]
        cause: Option<Box<PhaseError>>,
    },

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error(transparent)]
    Application(#[from] anyhow::Error),
}

impl PhaseError {
    pub fn wrap(message: impl Into<String>, cause: PhaseError) -> Self {
        PhaseError::Wrapped {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Wrapper without a cause; it is its own root cause.
    pub fn wrapper(message: impl Into<String>) -> Self {
        PhaseError::Wrapped {
            message: message.into(),
            cause: None,
        }
    }

    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        PhaseError::Application(anyhow::Error::msg(message))
    }

    pub fn view_not_found(view_id: impl Into<String>) -> Self {
        PhaseError::ViewNotFound(view_id.into())
    }

    /// Directly wrapped cause, if this is a wrapper with one.
    pub fn cause(&self) -> Option<&PhaseError> {
        match self {
            PhaseError::Wrapped { cause, .. } => cause.as_deref(),
            _ => None,
        }
    }

    /// Short classification used as the error name in reports.
    pub fn error_name(&self) -> &'static str {
        match self {
            PhaseError::Wrapped { .. } => "FacesException",
            PhaseError::ViewNotFound(_) => "ViewNotFoundException",
            PhaseError::Application(_) => "ApplicationException",
        }
    }
}

/// What a phase step produced
#[derive(Debug)]
pub enum PhaseOutcome {
    Continue,
    Abort {
        signal: AbortSignal,
        component: Option<String>,
    },
    Failure {
        error: PhaseError,
        component: Option<String>,
    },
}

impl PhaseOutcome {
    pub fn abort(message: impl Into<String>) -> Self {
        PhaseOutcome::Abort {
            signal: AbortSignal::new(message),
            component: None,
        }
    }

    pub fn failure(error: impl Into<PhaseError>) -> Self {
        PhaseOutcome::Failure {
            error: error.into(),
            component: None,
        }
    }

    /// Attribute the outcome to the component with `client_id`.
    pub fn in_component(self, client_id: impl Into<String>) -> Self {
        match self {
            PhaseOutcome::Continue => PhaseOutcome::Continue,
            PhaseOutcome::Abort { signal, .. } => PhaseOutcome::Abort {
                signal,
                component: Some(client_id.into()),
            },
            PhaseOutcome::Failure { error, .. } => PhaseOutcome::Failure {
                error,
                component: Some(client_id.into()),
            },
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, PhaseOutcome::Continue)
    }
}

impl From<Result<(), PhaseError>> for PhaseOutcome {
    fn from(result: Result<(), PhaseError>) -> Self {
        match result {
            Ok(()) => PhaseOutcome::Continue,
            Err(error) => PhaseOutcome::failure(error),
        }
    }
}

/// Payload of a queued event
#[derive(Debug)]
pub enum QueuedException {
    Abort(AbortSignal),
    Failure(PhaseError),
}

impl QueuedException {
    pub fn is_abort(&self) -> bool {
        matches!(self, QueuedException::Abort(_))
    }
}

impl fmt::Display for QueuedException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueuedException::Abort(signal) => write!(f, "abort: {}", signal),
            QueuedException::Failure(error) => write!(f, "{}", error),
        }
    }
}

/// An exception captured during a phase, waiting for the handler
#[derive(Debug)]
pub struct ExceptionQueuedEvent {
    exception: QueuedException,
    phase: PhaseId,
    component: Option<String>,
    sub_phase: Option<SubPhase>,
    application: Option<Arc<Application>>,
}

impl ExceptionQueuedEvent {
    pub fn new(exception: QueuedException, phase: PhaseId) -> Self {
        Self {
            exception,
            phase,
            component: None,
            sub_phase: None,
            application: None,
        }
    }

    pub fn abort(signal: AbortSignal, phase: PhaseId) -> Self {
        Self::new(QueuedException::Abort(signal), phase)
    }

    pub fn failure(error: PhaseError, phase: PhaseId) -> Self {
        Self::new(QueuedException::Failure(error), phase)
    }

    pub fn with_component(mut self, client_id: impl Into<String>) -> Self {
        self.component = Some(client_id.into());
        self
    }

    pub fn with_sub_phase(mut self, sub_phase: SubPhase) -> Self {
        self.sub_phase = Some(sub_phase);
        self
    }

    /// Application the event was raised in; preferred over the handling context's.
    pub fn with_application(mut self, application: Arc<Application>) -> Self {
        self.application = Some(application);
        self
    }

    pub fn exception(&self) -> &QueuedException {
        &self.exception
    }

    pub fn phase(&self) -> PhaseId {
        self.phase
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn sub_phase(&self) -> Option<SubPhase> {
        self.sub_phase
    }

    pub fn application(&self) -> Option<&Arc<Application>> {
        self.application.as_ref()
    }
}
