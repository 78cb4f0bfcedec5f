//! Failures of the step protocol.
//!
//! Every variant is a programmer-facing fault: there is no recovery path.
//! Effects, early returns and loop breaks are ordinary actions, never
//! errors.

use core::fmt;
use smol_str::SmolStr;
use thiserror::Error;

/// Result type for machine steps.
pub type StepResult = core::result::Result<crate::machine::Step, StepError>;

/// Errors raised while stepping or driving a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// Step called with a state the machine does not own.
    #[error("{machine} stepped with a state it does not own: {state}")]
    BadState {
        machine: &'static str,
        state: String,
    },

    /// The message shape does not match the current state.
    #[error("{machine} received a malformed message: {detail}")]
    BadMessage {
        machine: &'static str,
        detail: String,
    },

    /// An action surfaced at the top level and the observer declined it.
    #[error("action `{0}` reached the top level with no observer able to answer it")]
    Unhandled(SmolStr),

    /// A machine whose prior step returned `result` was stepped again.
    #[error("machine stepped after it delivered its final result")]
    Finished,

    /// The driver's configured step budget ran out before a final result.
    #[error("step budget of {0} exhausted before a final result")]
    StepLimit(u64),
}

impl StepError {
    /// A [`BadState`](StepError::BadState) for `machine`, capturing the
    /// offending state for the report.
    pub fn bad_state(machine: &'static str, state: &dyn fmt::Debug) -> StepError {
        StepError::BadState {
            machine,
            state: format!("{state:?}"),
        }
    }

    /// A [`BadMessage`](StepError::BadMessage) for `machine`.
    pub fn bad_message(machine: &'static str, detail: impl Into<String>) -> StepError {
        StepError::BadMessage {
            machine,
            detail: detail.into(),
        }
    }
}
