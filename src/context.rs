//! Request Context
//!
//! Per-request state (messages, flags, view root, response output, exception handler) and
//! the container-facing [`ExternalContext`] it wraps.

pub mod external;
pub mod faces_context;
pub mod messages;
pub mod partial;
pub mod view;

pub use external::{ExternalContext, ReleaseHook, RequestData, Response};
pub use faces_context::FacesContext;
pub use messages::{FacesMessage, MessageList, Severity};
pub use partial::{PartialTargets, PartialViewContext};
pub use view::ViewRoot;
