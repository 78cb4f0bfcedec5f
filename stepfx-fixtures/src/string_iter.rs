//! String iterator machines.
//!
//! An iterator over a string is the value `(string, offset)`. The
//! machines here service iterator effects: [`IterNext`] and [`IterClone`]
//! are stateless one-round services that resume to `Start` so an
//! `Impl` handler can call on them any number of times, while
//! [`StrIter`] is a stateful session machine that keeps the iterator in
//! its own state and answers `"next"`/`"clone"` commands.

use smol_str::SmolStr;
use stepfx::{Action, State, Step, StepError, StepMachine, StepResult, Value};

fn iter_value(machine: &'static str, msg: Value) -> Result<(SmolStr, i64), StepError> {
    let bad = || StepError::bad_message(machine, "expected a (string, offset) iterator value");
    let (s, offset) = msg.into_pair().ok_or_else(bad)?;
    match (s, offset) {
        (Value::Str(s), Value::Int(offset)) => Ok((s, offset)),
        _ => Err(bad()),
    }
}

fn char_count(s: &str) -> i64 {
    s.chars().count() as i64
}

fn char_at(s: &str, offset: i64) -> Option<Value> {
    let offset = usize::try_from(offset).ok()?;
    s.chars()
        .nth(offset)
        .map(|c| Value::from(String::from(c)))
}

/// Advances an iterator value.
///
/// Replies with `((string, offset + 1), has_next)`: the advanced iterator
/// and whether it now points at a character.
pub struct IterNext;

impl StepMachine for IterNext {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let (s, offset) = iter_value("iter_next", msg)?;
                let offset = offset + 1;
                let has_next = offset < char_count(&s);
                let iter = Value::pair(Value::Str(s), offset);
                Ok(Step::new(
                    Action::Result,
                    Value::pair(iter, has_next),
                    State::Start,
                ))
            }
            other => Err(StepError::bad_state("iter_next", &other)),
        }
    }
}

/// Reads the character an iterator points at, without advancing.
///
/// Replies with `((string, offset), char)`.
pub struct IterClone;

impl StepMachine for IterClone {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let (s, offset) = iter_value("iter_clone", msg)?;
                let c = char_at(&s, offset).ok_or_else(|| {
                    StepError::bad_message("iter_clone", "iterator points past the end")
                })?;
                let iter = Value::pair(Value::Str(s), offset);
                Ok(Step::new(
                    Action::Result,
                    Value::pair(iter, c),
                    State::Start,
                ))
            }
            other => Err(StepError::bad_state("iter_clone", &other)),
        }
    }
}

/// A string iterator session.
///
/// The opening message is the string; the machine then answers `"next"`
/// and `"clone"` commands for the life of the session, holding the
/// iterator in its own state.
pub struct StrIter;

impl StepMachine for StrIter {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let s = match msg {
                    Value::Str(s) => s,
                    other => {
                        return Err(StepError::bad_message(
                            "str_iter",
                            format!("expected a string to iterate, got {other}"),
                        ))
                    }
                };
                let ready = State::custom("ready", Value::pair(Value::Str(s), -1i64));
                Ok(Step::new(Action::Result, Value::Unit, ready))
            }
            State::Custom(tag, args) if tag == "ready" => {
                let (s, offset) = iter_value("str_iter", args)?;
                match msg.as_str() {
                    Some("next") => {
                        let offset = offset + 1;
                        let has_next = offset < char_count(&s);
                        let ready = State::custom("ready", Value::pair(Value::Str(s), offset));
                        Ok(Step::new(Action::Result, has_next, ready))
                    }
                    Some("clone") => {
                        let c = char_at(&s, offset).ok_or_else(|| {
                            StepError::bad_message("str_iter", "iterator points past the end")
                        })?;
                        let ready = State::custom("ready", Value::pair(Value::Str(s), offset));
                        Ok(Step::new(Action::Result, c, ready))
                    }
                    _ => Err(StepError::bad_message(
                        "str_iter",
                        format!("unknown command {msg}"),
                    )),
                }
            }
            other => Err(StepError::bad_state("str_iter", &other)),
        }
    }
}
