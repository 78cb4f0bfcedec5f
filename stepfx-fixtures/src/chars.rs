//! A character-iterator tower.
//!
//! [`CharIter`] answers `"next"` commands with `("some", char)` or
//! `("none")`, fetching its characters through a generic `iter` effect.
//! [`char_iter_from_string`] stacks it over a [`StrIter`] session through
//! two nested scopes, renaming `iter` to `str_iter` at the boundary, so
//! the whole tower runs on a single string with no external services.

use stepfx::{Action, Bound, Handler, State, Step, StepError, StepMachine, StepResult, Value};

use crate::string_iter::StrIter;

/// Streams characters as `("some", char)` / `("none")` values.
///
/// Each `"next"` command asks the underlying iterator to advance via the
/// `iter` effect and, when a character is available, fetches it with a
/// second `iter` clone request.
pub struct CharIter;

impl StepMachine for CharIter {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                if msg.as_str() != Some("next") {
                    return Err(StepError::bad_message(
                        "char_iter",
                        format!("unknown command {msg}"),
                    ));
                }
                Ok(Step::raise(
                    "iter",
                    "next",
                    State::custom("await_next", Value::Unit),
                ))
            }
            State::Custom(tag, _) if tag == "await_next" => {
                let has_next = msg.truthy().ok_or_else(|| {
                    StepError::bad_message("char_iter", "has_next has no truth value")
                })?;
                if has_next {
                    Ok(Step::raise(
                        "iter",
                        "clone",
                        State::custom("await_clone", Value::Unit),
                    ))
                } else {
                    Ok(Step::new(
                        Action::Result,
                        Value::tuple([Value::from("none")]),
                        State::End,
                    ))
                }
            }
            State::Custom(tag, _) if tag == "await_clone" => Ok(Step::new(
                Action::Result,
                Value::pair("some", msg),
                State::Start,
            )),
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("char_iter", &other)),
        }
    }
}

/// The session proxy at the top of the tower.
///
/// Opens the underlying string iterator with a `str_iter` effect, then
/// relays every subsequent command to the character iterator through the
/// `char_iter` effect, delivering each answer as its own result.
struct CharSession;

impl StepMachine for CharSession {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => Ok(Step::raise(
                "str_iter",
                msg,
                State::custom("await_init", Value::Unit),
            )),
            State::Custom(tag, _) if tag == "await_init" => Ok(Step::new(
                Action::Result,
                Value::Unit,
                State::custom("proxy", Value::Unit),
            )),
            State::Custom(tag, _) if tag == "proxy" => Ok(Step::raise(
                "char_iter",
                msg,
                State::custom("await_char", Value::Unit),
            )),
            State::Custom(tag, _) if tag == "await_char" => Ok(Step::new(
                Action::Result,
                msg,
                State::custom("proxy", Value::Unit),
            )),
            other => Err(StepError::bad_state("char_session", &other)),
        }
    }
}

/// A character iterator over a string.
///
/// The opening message is the string and every later `"next"` command
/// yields a `("some", char)` / `("none")` result. The inner scope
/// services `char_iter` with a [`CharIter`] whose `iter` effect is
/// renamed to `str_iter`; the outer scope services `str_iter` with a
/// [`StrIter`] session.
pub fn char_iter_from_string() -> Bound {
    let inner = Bound::new(CharSession).handle(
        "char_iter",
        Handler::impl_by(Bound::new(CharIter).handle("iter", Handler::renamed("str_iter"))),
    );
    Bound::new(inner).handle("str_iter", Handler::impl_by(StrIter))
}
