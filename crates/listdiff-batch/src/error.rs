//! Error types for the batch crate.

use crate::state::{UpdateEvent, UpdateState};

/// Errors that can occur while reconciling or driving an apply cycle.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// The state machine received an event it cannot handle in its current state.
    #[error("invalid transition: {event:?} while {state:?}")]
    InvalidTransition {
        state: UpdateState,
        event: UpdateEvent,
    },

    /// A cycle was started while another one is still executing.
    #[error("an update cycle is already executing")]
    AlreadyExecuting,

    /// Two operations in one set touch the same slot.
    #[error("conflicting operations: {0}")]
    Conflict(String),

    /// An operation references a group or item outside the snapshot.
    #[error("{what} {index} out of range for snapshot of {len}")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias for batch results.
pub type Result<T> = std::result::Result<T, UpdateError>;
