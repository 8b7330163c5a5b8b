//! Error types for the faces request-processing core.

use crate::exception::PhaseId;
use crate::scope::ScopeKind;
use thiserror::Error;

/// Request-context lifecycle violations
///
/// These are programming errors: they are raised synchronously and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("FacesContext already released")]
    Released,

    #[error("{0} is not supported during startup or shutdown")]
    UnsupportedDuringStartup(&'static str),

    #[error("Response output conflict: {0} is already in use")]
    OutputConflict(&'static str),

    #[error("No response writer has been set")]
    NoResponseWriter,
}

/// Scoped attribute map errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("{scope} map is read-only: {operation} is not supported")]
    ReadOnly {
        scope: ScopeKind,
        operation: &'static str,
    },

    #[error("remove() called without a preceding next()")]
    IllegalIteratorState,
}

/// Markup writer errors
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Write failed: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Attribute '{0}' written outside a start tag")]
    AttributeOutsideStartTag(String),

    #[error("Writer already closed")]
    Closed,
}

/// Top-level error for the crate
#[derive(Debug, Error)]
pub enum FacesError {
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    #[error("Scope error: {0}")]
    Scope(#[from] ScopeError),

    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unhandled exception during {phase} (status {status}): {message}")]
    Unhandled {
        phase: PhaseId,
        status: u16,
        message: String,
    },
}

impl From<config::ConfigError> for FacesError {
    fn from(err: config::ConfigError) -> Self {
        FacesError::Config(err.to_string())
    }
}
