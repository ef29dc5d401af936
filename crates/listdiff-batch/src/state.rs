//! Apply-cycle state machine.
//!
//! ```text
//! Idle --Requested--> Queued --Ready--> ExecutingTransition
//!   ^                                          |
//!   |                                       Applied
//!   |                                          v
//!   +------------Finished------------ ExecutedTransition
//! ```
//!
//! `Requested` is accepted in every state. Outside `Idle` it leaves the
//! state unchanged: the request joins the queued cycle, or the next one if
//! a cycle is executing.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpdateError};

/// Where the updater is in its apply cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateState {
    /// Nothing pending.
    #[default]
    Idle,
    /// Mutations are pending and waiting for the renderer.
    Queued,
    /// Operations are being computed and applied.
    ExecutingTransition,
    /// Operations were applied; completions are running.
    ExecutedTransition,
}

/// An event that drives [`UpdateState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateEvent {
    /// A mutation or snapshot change was requested.
    Requested,
    /// The renderer is ready to apply the queued cycle.
    Ready,
    /// The renderer finished applying the operations.
    Applied,
    /// Completion callbacks have run.
    Finished,
}

impl UpdateState {
    /// The state reached by handling `event`.
    pub fn on(self, event: UpdateEvent) -> Result<UpdateState> {
        use UpdateEvent::*;
        use UpdateState::*;

        match (self, event) {
            (state, Requested) => Ok(state.requested()),
            (Queued, Ready) => Ok(ExecutingTransition),
            (ExecutingTransition, Applied) => Ok(ExecutedTransition),
            (ExecutedTransition, Finished) => Ok(Idle),
            (state, event) => Err(UpdateError::InvalidTransition { state, event }),
        }
    }

    /// The state reached by a request. Never fails.
    pub fn requested(self) -> UpdateState {
        match self {
            Self::Idle => Self::Queued,
            state => state,
        }
    }

    /// Returns `true` while a cycle is being applied or completed.
    pub fn is_executing(self) -> bool {
        matches!(self, Self::ExecutingTransition | Self::ExecutedTransition)
    }
}
