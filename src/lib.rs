//! Faces Core: Request Processing for Component Web UIs
//!
//! The per-request core of a server-side component framework: scoped attribute maps,
//! the request context lifecycle, the exception queue and dispatcher, and the
//! partial-response writer used for ajax requests.

pub mod application;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod exception;
pub mod lifecycle;
pub mod logging;
pub mod scope;
pub mod writer;

pub use application::Application;
pub use context::{ExternalContext, FacesContext, RequestData};
pub use error::{ContextError, FacesError, ScopeError, WriterError};
pub use lifecycle::Lifecycle;
