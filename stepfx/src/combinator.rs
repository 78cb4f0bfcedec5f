//! Machine combinators.
//!
//! Each combinator is itself a step machine: it wraps the states of its
//! children in its own variants, re-encodes where to re-enter, and
//! re-emits the children's actions according to its control discipline.
//! Only one child is ever live in a given state, which keeps effect
//! re-raising trivial.

use crate::action::Action;
use crate::error::{StepError, StepResult};
use crate::machine::{boxed, BoxMachine, Step, StepMachine};
use crate::state::State;
use crate::value::Value;

/// Runs `first` to completion, then feeds its result to `second` as the
/// opening message.
///
/// Effects from either side surface transparently. A `return` raised
/// while `first` runs short-circuits the whole sequence with that value;
/// `second`'s actions are re-emitted verbatim, so a `return` from it is
/// left for the next sequence out.
pub struct Sequence {
    first: BoxMachine,
    second: BoxMachine,
}

impl Sequence {
    pub fn new(first: impl StepMachine + 'static, second: impl StepMachine + 'static) -> Self {
        Sequence {
            first: boxed(first),
            second: boxed(second),
        }
    }

    /// Right-fold a list of machines into nested sequences.
    ///
    /// Returns `None` for an empty list.
    pub fn chain(machines: Vec<BoxMachine>) -> Option<BoxMachine> {
        let mut rest = machines.into_iter().rev();
        let last = rest.next()?;
        Some(rest.fold(last, |second, first| {
            boxed(Sequence { first, second })
        }))
    }
}

impl StepMachine for Sequence {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => Ok(Step::next(msg, State::First(Box::new(State::Start)))),
            State::First(inner) => {
                let step = self.first.step(*inner, msg)?;
                match step.action {
                    Action::Result => {
                        Ok(Step::next(step.args, State::Second(Box::new(State::Start))))
                    }
                    Action::Return => Ok(Step::done(step.args)),
                    action => Ok(Step::new(
                        action,
                        step.args,
                        State::First(Box::new(step.resume)),
                    )),
                }
            }
            State::Second(inner) => {
                let step = self.second.step(*inner, msg)?;
                Ok(Step::new(
                    step.action,
                    step.args,
                    State::Second(Box::new(step.resume)),
                ))
            }
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("sequence", &other)),
        }
    }
}

/// Repeats a body machine until it breaks.
///
/// The body signals `next_loop` to restart from `Start` with its payload
/// as the next iteration's seed, or `break` to finish the loop with its
/// payload. There is no induction variable: the seed is whatever the
/// previous iteration handed over, and termination is entirely the
/// body's responsibility.
pub struct ForLoop {
    body: BoxMachine,
}

impl ForLoop {
    pub fn new(body: impl StepMachine + 'static) -> Self {
        ForLoop { body: boxed(body) }
    }
}

impl StepMachine for ForLoop {
    fn step(&self, state: State, msg: Value) -> StepResult {
        let body_state = match state {
            State::Start => State::Start,
            State::Body(inner) => *inner,
            State::End => return Err(StepError::Finished),
            other => return Err(StepError::bad_state("for_loop", &other)),
        };
        let step = self.body.step(body_state, msg)?;
        match step.action {
            Action::NextLoop => Ok(Step::next(step.args, State::Body(Box::new(State::Start)))),
            Action::Break => Ok(Step::done(step.args)),
            action => Ok(Step::new(
                action,
                step.args,
                State::Body(Box::new(step.resume)),
            )),
        }
    }
}

/// Branches on a condition carried alongside the onward message.
///
/// The opening message must be a `(smuggled, cond)` pair; the taken
/// branch then runs on `smuggled` and the untaken branch is never
/// stepped.
pub struct IfThenElse {
    then: BoxMachine,
    els: BoxMachine,
}

impl IfThenElse {
    pub fn new(then: impl StepMachine + 'static, els: impl StepMachine + 'static) -> Self {
        IfThenElse {
            then: boxed(then),
            els: boxed(els),
        }
    }
}

impl StepMachine for IfThenElse {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let (smuggled, cond) = msg.into_pair().ok_or_else(|| {
                    StepError::bad_message("if_then_else", "expected a (value, condition) pair")
                })?;
                let cond = cond.truthy().ok_or_else(|| {
                    StepError::bad_message("if_then_else", "condition has no truth value")
                })?;
                let branch = if cond {
                    State::Then(Box::new(State::Start))
                } else {
                    State::Else(Box::new(State::Start))
                };
                Ok(Step::next(smuggled, branch))
            }
            State::Then(inner) => {
                let step = self.then.step(*inner, msg)?;
                Ok(Step::new(
                    step.action,
                    step.args,
                    State::Then(Box::new(step.resume)),
                ))
            }
            State::Else(inner) => {
                let step = self.els.step(*inner, msg)?;
                Ok(Step::new(
                    step.action,
                    step.args,
                    State::Else(Box::new(step.resume)),
                ))
            }
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("if_then_else", &other)),
        }
    }
}

/// Carries a value past an inner machine.
///
/// The opening message must be a `(carried, rest)` pair: the inner
/// machine runs on `rest` while `carried` rides in this machine's state,
/// and the inner result is delivered re-paired as `(carried, result)`.
/// Effects surface unchanged, with the carried value held safely under
/// the suspension.
pub struct Smuggle {
    inner: BoxMachine,
}

impl Smuggle {
    pub fn new(inner: impl StepMachine + 'static) -> Self {
        Smuggle {
            inner: boxed(inner),
        }
    }
}

impl StepMachine for Smuggle {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let (carried, rest) = msg.into_pair().ok_or_else(|| {
                    StepError::bad_message("smuggle", "expected a (carried, rest) pair")
                })?;
                Ok(Step::next(
                    rest,
                    State::Carrying {
                        carried,
                        inner: Box::new(State::Start),
                    },
                ))
            }
            State::Carrying { carried, inner } => {
                let step = self.inner.step(*inner, msg)?;
                match step.action {
                    Action::Result => Ok(Step::done(Value::pair(carried, step.args))),
                    action => Ok(Step::new(
                        action,
                        step.args,
                        State::Carrying {
                            carried,
                            inner: Box::new(step.resume),
                        },
                    )),
                }
            }
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("smuggle", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{Relay, SingleState, Transformer};

    fn add(n: i64) -> Transformer<impl Fn(Value) -> Result<Value, StepError>> {
        Transformer::new(move |msg| {
            let m = msg
                .as_int()
                .ok_or_else(|| StepError::bad_message("add", "expected an integer"))?;
            Ok(Value::Int(m + n))
        })
    }

    /// Step until the next observable action, mirroring what the driver
    /// does for hidden transitions.
    fn settle(machine: &dyn StepMachine, state: State, msg: Value) -> Step {
        let mut step = machine.step(state, msg).unwrap();
        while step.action == Action::Continue {
            step = machine.step(step.resume, step.args).unwrap();
        }
        step
    }

    #[test]
    fn sequence_threads_results() {
        let seq = Sequence::new(add(1), add(10));
        let step = settle(&seq, State::Start, Value::Int(0));
        assert_eq!(step.action, Action::Result);
        assert_eq!(step.args, Value::Int(11));
    }

    #[test]
    fn sequence_return_short_circuits() {
        let seq = Sequence::new(
            SingleState::new(|msg| Ok((Action::Return, msg))),
            add(1000),
        );
        let step = settle(&seq, State::Start, Value::Int(5));
        assert_eq!(step.action, Action::Result);
        assert_eq!(step.args, Value::Int(5));
    }

    #[test]
    fn sequence_surfaces_effects_from_either_side() {
        let seq = Sequence::new(Relay::new("ask"), add(1));
        let step = settle(&seq, State::Start, Value::Int(3));
        assert_eq!(step.action, Action::effect("ask"));
        assert_eq!(step.args, Value::Int(3));
        let step = settle(&seq, step.resume, Value::Int(7));
        assert_eq!(step.action, Action::Result);
        assert_eq!(step.args, Value::Int(8));
    }

    #[test]
    fn chain_folds_right() {
        let chained =
            Sequence::chain(vec![boxed(add(1)), boxed(add(2)), boxed(add(4))]).unwrap();
        let step = settle(&chained, State::Start, Value::Int(0));
        assert_eq!(step.args, Value::Int(7));
        assert!(Sequence::chain(Vec::new()).is_none());
    }

    #[test]
    fn for_loop_runs_to_break() {
        let body = SingleState::new(|msg| {
            let n = msg
                .as_int()
                .ok_or_else(|| StepError::bad_message("count", "expected an integer"))?;
            if n < 3 {
                Ok((Action::NextLoop, Value::Int(n + 1)))
            } else {
                Ok((Action::Break, Value::Int(n)))
            }
        });
        let lp = ForLoop::new(body);
        let step = settle(&lp, State::Start, Value::Int(0));
        assert_eq!(step.action, Action::Result);
        assert_eq!(step.args, Value::Int(3));
    }

    #[test]
    fn if_then_else_takes_one_branch_only() {
        let cond = IfThenElse::new(add(1), add(-1));
        let step = settle(&cond, State::Start, Value::pair(10i64, true));
        assert_eq!(step.args, Value::Int(11));

        let cond = IfThenElse::new(add(1), add(-1));
        let step = settle(&cond, State::Start, Value::pair(10i64, false));
        assert_eq!(step.args, Value::Int(9));
    }

    #[test]
    fn if_then_else_rejects_bare_conditions() {
        let cond = IfThenElse::new(add(1), add(-1));
        assert!(matches!(
            cond.step(State::Start, Value::Int(1)),
            Err(StepError::BadMessage { .. })
        ));
    }

    #[test]
    fn smuggle_preserves_the_carried_value_across_effects() {
        let sm = Smuggle::new(Relay::new("ask"));
        let carried = Value::from("keep me");
        let step = settle(&sm, State::Start, Value::pair(carried.clone(), 1i64));
        assert_eq!(step.action, Action::effect("ask"));
        let step = settle(&sm, step.resume, Value::Int(2));
        assert_eq!(step.action, Action::Result);
        assert_eq!(step.args, Value::pair(carried, 2i64));
    }
}
