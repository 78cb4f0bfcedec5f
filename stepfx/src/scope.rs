//! Effect-handler scopes.
//!
//! [`Bound`] installs a set of named handlers over an inner machine;
//! [`Call`] is its static little sibling, pairing one inner machine with
//! one handler for every action it emits. Both thread three things
//! through every suspension: the inner machine's opaque resume state,
//! each handler's private state, and the position of the suspension
//! (inner side or handler side) in their own state variants.

use crate::action::Action;
use crate::error::{StepError, StepResult};
use crate::handler::{Handler, HandlerReply, HandlerState, HandlerStates};
use crate::machine::{boxed, BoxMachine, Step, StepMachine};
use crate::state::State;
use crate::value::Value;
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// A region of composition in which a fixed set of effect names are
/// intercepted by named handlers.
///
/// An inner action whose name has a handler installed is dispatched to
/// that handler; every other name re-raises outward unchanged, parking
/// the scope so that the outside world's reply resumes the inner machine.
/// Installing a handler under `result` intercepts the inner machine's
/// final value itself, which is how scopes chain onto one another.
///
/// `continue` is never offered to handlers, even when one is installed
/// under that name: it belongs to the driver.
pub struct Bound {
    inner: BoxMachine,
    handlers: BTreeMap<SmolStr, Handler>,
}

impl Bound {
    pub fn new(inner: impl StepMachine + 'static) -> Self {
        Bound {
            inner: boxed(inner),
            handlers: BTreeMap::new(),
        }
    }

    /// Install `handler` under `name`, replacing any previous handler for
    /// that name.
    pub fn handle(mut self, name: impl Into<SmolStr>, handler: Handler) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    fn initial_states(&self) -> HandlerStates {
        self.handlers
            .keys()
            .map(|name| (name.clone(), HandlerState::Start))
            .collect()
    }

    fn step_inner(&self, inner: State, handlers: HandlerStates, msg: Value) -> StepResult {
        let step = self.inner.step(inner, msg)?;
        let inner = Box::new(step.resume);
        match step.action {
            Action::Continue => Ok(Step::next(step.args, State::Inner { inner, handlers })),
            action => {
                let name = SmolStr::new(action.name());
                if self.handlers.contains_key(&name) {
                    // Dispatch happens on the next step; the hop is hidden
                    // behind a `continue` so no observer ever sees it.
                    Ok(Step::next(
                        step.args,
                        State::AtHandler {
                            name,
                            inner,
                            handlers,
                        },
                    ))
                } else {
                    // Re-raise unchanged, `result` included. Parking at
                    // the handler position means any further message flows
                    // straight back to the inner machine, as if a
                    // pass-through were installed; a recurrent inner
                    // machine therefore stays drivable past its results.
                    Ok(Step::new(
                        action,
                        step.args,
                        State::AtHandler {
                            name,
                            inner,
                            handlers,
                        },
                    ))
                }
            }
        }
    }

    fn step_handler(
        &self,
        name: SmolStr,
        inner: Box<State>,
        mut handlers: HandlerStates,
        msg: Value,
    ) -> StepResult {
        let Some(handler) = self.handlers.get(&name) else {
            // No handler installed: the message is the outside world's
            // reply to a re-raised effect.
            return Ok(Step::next(msg, State::Inner { inner, handlers }));
        };
        let state = handlers.remove(&name).unwrap_or(HandlerState::Start);
        match handler.handle(&name, state, msg)? {
            HandlerReply::Resume { state, reply } => {
                handlers.insert(name, state);
                Ok(Step::next(reply, State::Inner { inner, handlers }))
            }
            HandlerReply::Forward {
                action,
                args,
                state,
            } => {
                handlers.insert(name.clone(), state);
                Ok(Step::new(
                    action,
                    args,
                    State::AtHandler {
                        name,
                        inner,
                        handlers,
                    },
                ))
            }
            HandlerReply::Finish(value) => Ok(Step::done(value)),
        }
    }
}

impl StepMachine for Bound {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => self.step_inner(State::Start, self.initial_states(), msg),
            State::Inner { inner, handlers } => self.step_inner(*inner, handlers, msg),
            State::AtHandler {
                name,
                inner,
                handlers,
            } => self.step_handler(name, inner, handlers, msg),
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("bound", &other)),
        }
    }
}

/// Statically pairs one inner machine with one handler.
///
/// Every non-`continue` action the inner machine emits, its `result`
/// included, is dispatched to the handler, which replies with the same
/// tri-state a [`Bound`] handler uses. The compact form of a scope when
/// only one interception point is needed.
pub struct Call {
    inner: BoxMachine,
    handler: Handler,
}

impl Call {
    pub fn new(inner: impl StepMachine + 'static, handler: Handler) -> Self {
        Call {
            inner: boxed(inner),
            handler,
        }
    }

    fn step_inner(&self, inner: State, handler: HandlerState, msg: Value) -> StepResult {
        let step = self.inner.step(inner, msg)?;
        let inner = Box::new(step.resume);
        match step.action {
            Action::Continue => Ok(Step::next(step.args, State::CallInner { inner, handler })),
            action => Ok(Step::next(
                step.args,
                State::CallHandler {
                    name: SmolStr::new(action.name()),
                    inner,
                    handler,
                },
            )),
        }
    }

    fn step_handler(
        &self,
        name: SmolStr,
        inner: Box<State>,
        state: HandlerState,
        msg: Value,
    ) -> StepResult {
        match self.handler.handle(&name, state, msg)? {
            HandlerReply::Resume { state, reply } => Ok(Step::next(
                reply,
                State::CallInner {
                    inner,
                    handler: state,
                },
            )),
            HandlerReply::Forward {
                action,
                args,
                state,
            } => Ok(Step::new(
                action,
                args,
                State::CallHandler {
                    name,
                    inner,
                    handler: state,
                },
            )),
            HandlerReply::Finish(value) => Ok(Step::done(value)),
        }
    }
}

impl StepMachine for Call {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => self.step_inner(State::Start, HandlerState::Start, msg),
            State::CallInner { inner, handler } => self.step_inner(*inner, handler, msg),
            State::CallHandler {
                name,
                inner,
                handler,
            } => self.step_handler(name, inner, handler, msg),
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("call", &other)),
        }
    }
}
