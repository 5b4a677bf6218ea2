// ABOUTME: Signals a state raises towards the controller.
// ABOUTME: Closed set: Finish, DockerError, UnknownError, UnresolvableError.

use std::fmt;

/// Outcome of one phase of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The phase completed; the controller moves on.
    Finish,
    /// Docker misbehaved; recovery runs and the phase resumes.
    DockerError,
    /// Something failed that is not recoverable in place.
    UnknownError,
    /// A precondition can never be satisfied in this environment.
    UnresolvableError,
}

impl EventType {
    /// Events that abandon the rest of the workflow.
    pub fn is_terminal_error(self) -> bool {
        matches!(self, EventType::UnknownError | EventType::UnresolvableError)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Finish => "Finish",
            EventType::DockerError => "DockerError",
            EventType::UnknownError => "UnknownError",
            EventType::UnresolvableError => "UnresolvableError",
        };
        f.write_str(name)
    }
}
