//! Resume states.
//!
//! Every machine exposes an opaque [`State`] to its caller: only the
//! owning machine decodes the variants it produces. Combinator states
//! carry their children's states by containment, so a paused composition
//! is one self-contained value that can be cloned or discarded freely.

use crate::handler::{HandlerState, HandlerStates};
use crate::value::Value;
use smol_str::SmolStr;

/// The resume point of a paused machine.
///
/// `Start` and `End` are reserved: every machine begins in `Start`, and a
/// machine whose step returned `result` leaves `End` behind, which must
/// not be stepped again. The remaining variants each belong to one
/// combinator; stepping a machine with a variant it does not own is a
/// [`BadState`](crate::StepError::BadState) error.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    /// Reserved initial state of every machine.
    Start,
    /// Reserved terminal state.
    End,
    /// `Sequence` running its first machine.
    First(Box<State>),
    /// `Sequence` running its second machine.
    Second(Box<State>),
    /// `ForLoop` running its body.
    Body(Box<State>),
    /// `IfThenElse` committed to its then branch.
    Then(Box<State>),
    /// `IfThenElse` committed to its else branch.
    Else(Box<State>),
    /// `Smuggle` holding a carried value while its inner machine runs.
    Carrying { carried: Value, inner: Box<State> },
    /// `Relay` waiting for the reply to the effect it raised.
    Awaiting,
    /// `Bound` about to step its inner machine.
    Inner {
        inner: Box<State>,
        handlers: HandlerStates,
    },
    /// `Bound` parked at the handler position for `name`, either mid
    /// dispatch or awaiting an external reply to a re-raised action.
    AtHandler {
        name: SmolStr,
        inner: Box<State>,
        handlers: HandlerStates,
    },
    /// `Call` about to step its inner machine.
    CallInner {
        inner: Box<State>,
        handler: HandlerState,
    },
    /// `Call` parked at its handler for the action named `name`.
    CallHandler {
        name: SmolStr,
        inner: Box<State>,
        handler: HandlerState,
    },
    /// A machine-specific resume point: the tagged-pair convention used
    /// by hand-written machines.
    Custom(SmolStr, Value),
}

impl State {
    /// A machine-specific resume point.
    pub fn custom(tag: impl Into<SmolStr>, args: impl Into<Value>) -> State {
        State::Custom(tag.into(), args.into())
    }

    /// True for the terminal state.
    pub fn is_end(&self) -> bool {
        matches!(self, State::End)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_states_compare_structurally() {
        let a = State::custom("ready", Value::pair("foo", 0i64));
        let b = State::custom("ready", Value::pair("foo", 0i64));
        assert_eq!(a, b);
        assert_ne!(a, State::custom("ready", Value::pair("foo", 1i64)));
    }
}
