//! Root-cause resolution through wrapper errors.

use super::event::PhaseError;

/// Innermost non-wrapper error reached by following wrapper causes.
///
/// A wrapper without a cause is its own root cause, as is any non-wrapper error.
pub fn root_cause(error: &PhaseError) -> &PhaseError {
    let mut current = error;
    while let Some(cause) = current.cause() {
        current = cause;
    }
    current
}

/// Messages from the outermost error inwards, including any chain carried by an
/// application error.
pub fn cause_chain(error: &PhaseError) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = Some(error);
    while let Some(err) = current {
        match err {
            PhaseError::Application(inner) => {
                chain.extend(inner.chain().map(|e| e.to_string()));
            }
            other => chain.push(other.to_string()),
        }
        current = err.cause();
    }
    chain
}
