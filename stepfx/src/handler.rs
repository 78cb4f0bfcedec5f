//! Effect handlers.
//!
//! A handler is not a raw step machine: it is a separate object with one
//! operation, [`Handler::handle`], which receives the effect name, its
//! own private state and the current message, and replies with one of the
//! three [`HandlerReply`] cases. Handlers are stateful across effect
//! calls: the enclosing scope keeps each handler's state alive for the
//! life of the scope.

use crate::action::Action;
use crate::error::StepError;
use crate::machine::{boxed, BoxMachine, StepMachine};
use crate::state::State;
use crate::value::Value;
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Private state of one installed handler.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerState {
    /// Fresh, or returned to rest after a completed round.
    Start,
    /// A pass-through waiting for the outside world's reply.
    Awaiting,
    /// The resume state of a handler's backing machine.
    Machine(Box<State>),
}

/// The states of every handler installed in a scope, keyed by the name
/// each handler is installed under.
pub type HandlerStates = BTreeMap<SmolStr, HandlerState>;

/// What a handler asks its enclosing scope to do.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerReply {
    /// The effect is serviced: resume the inner machine with `reply`.
    Resume { state: HandlerState, reply: Value },
    /// Emit `action` outward, possibly renamed, and stay parked at this
    /// handler for the outside world's answer.
    Forward {
        action: Action,
        args: Value,
        state: HandlerState,
    },
    /// Terminate the entire scope with this value.
    Finish(Value),
}

/// An installed effect handler.
///
/// The variants cover the handler algebra: service an effect with a
/// sub-program, chain further work onto a result, forward across a scope
/// boundary, or short-circuit the scope.
pub enum Handler {
    /// Runs the backing machine on the effect payload. When the machine
    /// delivers its result, the inner machine is resumed with that value;
    /// anything else the machine raises is forwarded outward. The
    /// machine's resume state is retained, so a recurrent machine can
    /// serve any number of effect calls.
    Impl(BoxMachine),
    /// Runs the backing machine like [`Impl`](Handler::Impl), but never
    /// resumes the inner machine: every action, the machine's `result`
    /// included, is forwarded outward. Used to chain further processing
    /// onto an inner machine's final value.
    AndThen(BoxMachine),
    /// The neutral forwarder. First call re-raises the effect, under its
    /// own name or the configured rename; the reply then resumes the
    /// inner machine unchanged, and the handler is back at rest.
    PassThrough(Option<SmolStr>),
    /// Terminates the scope with the payload. Only sensible installed
    /// under the `result` name.
    Result,
}

impl Handler {
    /// A handler backed by `machine`; see [`Handler::Impl`].
    pub fn impl_by(machine: impl StepMachine + 'static) -> Handler {
        Handler::Impl(boxed(machine))
    }

    /// A handler chaining `machine` onto the intercepted action; see
    /// [`Handler::AndThen`].
    pub fn and_then(machine: impl StepMachine + 'static) -> Handler {
        Handler::AndThen(boxed(machine))
    }

    /// A pass-through that keeps the effect's own name.
    pub fn pass_through() -> Handler {
        Handler::PassThrough(None)
    }

    /// A pass-through that re-raises under `name` instead.
    pub fn renamed(name: impl Into<SmolStr>) -> Handler {
        Handler::PassThrough(Some(name.into()))
    }

    /// Service one effect call.
    ///
    /// `name` is the name this handler was reached under, so one handler
    /// value can serve several effect names distinctly.
    pub fn handle(
        &self,
        name: &str,
        state: HandlerState,
        msg: Value,
    ) -> Result<HandlerReply, StepError> {
        match self {
            Handler::Impl(machine) => {
                let step = machine.step(Self::machine_state(state)?, msg)?;
                let state = HandlerState::Machine(Box::new(step.resume));
                match step.action {
                    Action::Result => Ok(HandlerReply::Resume {
                        state,
                        reply: step.args,
                    }),
                    action => Ok(HandlerReply::Forward {
                        action,
                        args: step.args,
                        state,
                    }),
                }
            }
            Handler::AndThen(machine) => {
                let step = machine.step(Self::machine_state(state)?, msg)?;
                Ok(HandlerReply::Forward {
                    action: step.action,
                    args: step.args,
                    state: HandlerState::Machine(Box::new(step.resume)),
                })
            }
            Handler::PassThrough(rename) => match state {
                HandlerState::Start => {
                    let outward = match rename {
                        Some(rename) => Action::effect(rename.clone()),
                        None => Action::named(name),
                    };
                    Ok(HandlerReply::Forward {
                        action: outward,
                        args: msg,
                        state: HandlerState::Awaiting,
                    })
                }
                HandlerState::Awaiting => Ok(HandlerReply::Resume {
                    state: HandlerState::Start,
                    reply: msg,
                }),
                other => Err(StepError::bad_state("pass_through handler", &other)),
            },
            Handler::Result => Ok(HandlerReply::Finish(msg)),
        }
    }

    fn machine_state(state: HandlerState) -> Result<State, StepError> {
        match state {
            HandlerState::Start => Ok(State::Start),
            HandlerState::Machine(state) => Ok(*state),
            other => Err(StepError::bad_state("handler machine", &other)),
        }
    }
}
