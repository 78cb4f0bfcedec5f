//! Adapters that lift plain functions into the step protocol.

use crate::action::Action;
use crate::error::{StepError, StepResult};
use crate::machine::{Step, StepMachine};
use crate::state::State;
use crate::value::Value;
use smol_str::SmolStr;

/// Lifts a pure function over values into a one-shot machine.
///
/// From `Start` it consumes one message and delivers `f(msg)` as its
/// result.
pub struct Transformer<F> {
    f: F,
}

impl<F> Transformer<F>
where
    F: Fn(Value) -> Result<Value, StepError>,
{
    pub fn new(f: F) -> Self {
        Transformer { f }
    }
}

impl<F> StepMachine for Transformer<F>
where
    F: Fn(Value) -> Result<Value, StepError>,
{
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => Ok(Step::done((self.f)(msg)?)),
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("transformer", &other)),
        }
    }
}

/// Like [`Transformer`], but the function chooses the action as well as
/// the payload; the usual way to raise an effect in a single step.
pub struct SingleState<F> {
    f: F,
}

impl<F> SingleState<F>
where
    F: Fn(Value) -> Result<(Action, Value), StepError>,
{
    pub fn new(f: F) -> Self {
        SingleState { f }
    }
}

impl<F> StepMachine for SingleState<F>
where
    F: Fn(Value) -> Result<(Action, Value), StepError>,
{
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let (action, args) = (self.f)(msg)?;
                Ok(Step::new(action, args, State::End))
            }
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("single_state", &other)),
        }
    }
}

/// The identity machine over one effect.
///
/// From `Start` it raises its configured effect with the incoming message
/// as payload; the reply becomes its result. It resumes to `Start`, so
/// one `Relay` can serve any number of rounds.
pub struct Relay {
    effect: SmolStr,
}

impl Relay {
    pub fn new(effect: impl Into<SmolStr>) -> Self {
        Relay {
            effect: effect.into(),
        }
    }
}

impl StepMachine for Relay {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => Ok(Step::raise(self.effect.clone(), msg, State::Awaiting)),
            State::Awaiting => Ok(Step::new(Action::Result, msg, State::Start)),
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("relay", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transformer_is_one_shot() {
        let double = Transformer::new(|msg| {
            let n = msg
                .as_int()
                .ok_or_else(|| StepError::bad_message("double", "expected an integer"))?;
            Ok(Value::Int(n * 2))
        });
        let step = double.step(State::Start, Value::Int(21)).unwrap();
        assert_eq!(step.action, Action::Result);
        assert_eq!(step.args, Value::Int(42));
        assert_eq!(step.resume, State::End);
        assert_eq!(
            double.step(State::End, Value::Unit),
            Err(StepError::Finished)
        );
    }

    #[test]
    fn relay_round_trips() {
        let relay = Relay::new("ask");
        let step = relay.step(State::Start, Value::from("q")).unwrap();
        assert_eq!(step.action, Action::effect("ask"));
        assert_eq!(step.args, Value::from("q"));
        let step = relay.step(step.resume, Value::from("a")).unwrap();
        assert_eq!(step.action, Action::Result);
        assert_eq!(step.args, Value::from("a"));
        // reusable: the relay parks back at Start
        assert_eq!(step.resume, State::Start);
    }

    #[test]
    fn single_state_raises() {
        let raiser = SingleState::new(|msg| Ok((Action::Break, msg)));
        let step = raiser.step(State::Start, Value::Int(7)).unwrap();
        assert_eq!(step.action, Action::Break);
        assert_eq!(step.args, Value::Int(7));
    }
}
