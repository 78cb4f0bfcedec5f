//! A two-item iterator service and a client for it.
//!
//! [`EmitTwice`] serves `"next"`/`"clone"` commands over a pair of items
//! it fetches, once, through a `get_items` effect. [`ResultSecond`] is a
//! client that walks such an iterator through an `iter` effect and
//! delivers the second item. Together they exercise a scope whose
//! handler machine is itself a scope with handlers.

use stepfx::{Action, State, Step, StepError, StepMachine, StepResult, Value};

/// Streams a fetched pair: `"next"` answers whether an item is
/// available, `"clone"` answers the current item.
pub struct EmitTwice;

impl StepMachine for EmitTwice {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => Ok(Step::raise(
                "get_items",
                Value::Unit,
                State::custom("await_items", msg),
            )),
            State::Custom(tag, first_command) if tag == "await_items" => {
                // The items arrived; replay the command that was pending
                // when the fetch started.
                let at = State::custom("at", Value::pair(-1i64, msg));
                Ok(Step::next(first_command, at))
            }
            State::Custom(tag, args) if tag == "at" => {
                let (at, items) = args
                    .into_pair()
                    .and_then(|(at, items)| Some((at.as_int()?, items)))
                    .ok_or_else(|| {
                        StepError::bad_state("emit_twice", &"`at` without its position and items")
                    })?;
                match msg.as_str() {
                    Some("next") => {
                        let at = at + 1;
                        Ok(Step::new(
                            Action::Result,
                            at < 2,
                            State::custom("at", Value::pair(at, items)),
                        ))
                    }
                    Some("clone") => {
                        let item = usize::try_from(at)
                            .ok()
                            .and_then(|i| items.as_tuple().and_then(|items| items.get(i)))
                            .cloned()
                            .ok_or_else(|| {
                                StepError::bad_message("emit_twice", "no item at the position")
                            })?;
                        Ok(Step::new(
                            Action::Result,
                            item,
                            State::custom("at", Value::pair(at, items)),
                        ))
                    }
                    _ => Err(StepError::bad_message(
                        "emit_twice",
                        format!("unknown command {msg}"),
                    )),
                }
            }
            other => Err(StepError::bad_state("emit_twice", &other)),
        }
    }
}

/// Walks an iterator two steps through the `iter` effect and delivers
/// the second item.
pub struct ResultSecond;

impl StepMachine for ResultSecond {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => Ok(Step::raise(
                "iter",
                "next",
                State::custom("await_first", Value::Unit),
            )),
            State::Custom(tag, _) if tag == "await_first" => Ok(Step::raise(
                "iter",
                "next",
                State::custom("await_second", Value::Unit),
            )),
            State::Custom(tag, _) if tag == "await_second" => Ok(Step::raise(
                "iter",
                "clone",
                State::custom("await_item", Value::Unit),
            )),
            State::Custom(tag, _) if tag == "await_item" => Ok(Step::done(msg)),
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("result_second", &other)),
        }
    }
}
