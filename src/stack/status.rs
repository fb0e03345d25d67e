// ABOUTME: Remote stack status classification.
// ABOUTME: Maps raw orchestration statuses onto the reconciler's state machine inputs.

use std::fmt;

/// Classified state of a named remote stack.
///
/// Raw statuses outside the recognized sets are carried verbatim in
/// `Other`; the reconciler refuses to guess an action for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackState {
    /// No stack with this name exists.
    Absent,
    /// A completed create or update; in-place update is safe.
    Healthy,
    /// A terminal rollback state; the platform rejects in-place update,
    /// so the stack must be deleted before recreation.
    Poisoned,
    /// Unrecognized or transient status, carried verbatim.
    Other(String),
}

const HEALTHY_STATUSES: &[&str] = &[
    "CREATE_COMPLETE",
    "UPDATE_COMPLETE",
    "UPDATE_ROLLBACK_COMPLETE",
];

const POISONED_STATUSES: &[&str] = &[
    "ROLLBACK_COMPLETE",
    "ROLLBACK_FAILED",
    "CREATE_FAILED",
    "DELETE_FAILED",
];

impl StackState {
    /// Classify a raw status string as reported by the orchestration service.
    pub fn classify(raw: &str) -> StackState {
        if raw == "DELETE_COMPLETE" {
            return StackState::Absent;
        }
        if HEALTHY_STATUSES.contains(&raw) {
            return StackState::Healthy;
        }
        if POISONED_STATUSES.contains(&raw) {
            return StackState::Poisoned;
        }
        StackState::Other(raw.to_string())
    }
}

impl fmt::Display for StackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackState::Absent => write!(f, "absent"),
            StackState::Healthy => write!(f, "healthy"),
            StackState::Poisoned => write!(f, "poisoned"),
            StackState::Other(raw) => write!(f, "other ({raw})"),
        }
    }
}
