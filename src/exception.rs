//! Exception Queue & Dispatcher
//!
//! Phase execution reports failures as [`PhaseOutcome`] values. The lifecycle turns
//! everything other than `Continue` into an [`ExceptionQueuedEvent`] on the context's
//! [`ExceptionHandler`], which drains the queue once processing is over and decides
//! whether anything is surfaced to the user.

pub mod error_page;
pub mod event;
pub mod handler;
pub mod root_cause;

pub use error_page::{ErrorPageWriter, ReportedError};
pub use event::{
    AbortSignal, ExceptionQueuedEvent, PhaseError, PhaseId, PhaseOutcome, QueuedException,
    SubPhase,
};
pub use handler::{ErrorHandlingSettings, ExceptionHandler, QueuedExceptionHandler};
pub use root_cause::{cause_chain, root_cause};
