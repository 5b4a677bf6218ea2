// ABOUTME: Decisions the controller takes after each event, and the final outcome of a run.
// ABOUTME: Both are plain values so the transition logic is testable without a process exit.

use crate::types::EventType;

/// What the controller does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Subscribe to and start the state at this index.
    Start(usize),
    /// The last state finished.
    Complete,
    /// Run recovery, then let the interrupted state carry on.
    Recover,
    /// Abandon the sequence and clean up.
    Abort(EventType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Completed,
    /// A state raised a terminal error event; cleanup has run.
    Failed {
        state: &'static str,
        event: EventType,
    },
    /// A state stopped without raising an event.
    Halted {
        state: &'static str,
        reason: String,
    },
    ConfigurationMissing {
        workflow: String,
    },
}

impl WorkflowOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkflowOutcome::Completed => 0,
            WorkflowOutcome::Failed { .. }
            | WorkflowOutcome::Halted { .. }
            | WorkflowOutcome::ConfigurationMissing { .. } => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}
