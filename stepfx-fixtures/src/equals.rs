//! String/iterator equality scanner.
//!
//! Compares a string against a character iterator that is reached only
//! through effects, so the same scanner runs against an external observer
//! (the transcripts of the conformance suite) or against `Impl` handlers
//! backed by the machines in [`string_iter`](crate::string_iter).

use smol_str::SmolStr;
use stepfx::{
    Action, Bound, ForLoop, Handler, Sequence, State, Step, StepError, StepMachine, StepResult,
    Transformer, Value,
};

/// One iteration of the comparison.
///
/// The loop seed is `(string, offset, iter)`. Each iteration asks the
/// iterator for its next character via two effects and either re-seeds
/// the loop at the following offset, or breaks with the verdict.
pub struct EqualsBody {
    next_effect: SmolStr,
    clone_effect: SmolStr,
}

impl EqualsBody {
    pub fn new(next_effect: impl Into<SmolStr>, clone_effect: impl Into<SmolStr>) -> Self {
        EqualsBody {
            next_effect: next_effect.into(),
            clone_effect: clone_effect.into(),
        }
    }

    fn seed(msg: Value) -> Result<(Value, i64, Value), StepError> {
        let bad = || StepError::bad_message("equals_body", "expected a (string, offset, iter) seed");
        let mut items = msg.into_tuple().ok_or_else(bad)?.into_iter();
        match (items.next(), items.next(), items.next(), items.next()) {
            (Some(s), Some(Value::Int(offset)), Some(iter), None) => Ok((s, offset, iter)),
            _ => Err(bad()),
        }
    }

    fn reply(msg: Value) -> Result<(Value, Value), StepError> {
        msg.into_pair().ok_or_else(|| {
            StepError::bad_message("equals_body", "expected an (iter, answer) reply")
        })
    }

    fn string_len(s: &Value) -> Result<i64, StepError> {
        s.as_str()
            .map(|s| s.chars().count() as i64)
            .ok_or_else(|| StepError::bad_message("equals_body", "seed string is not a string"))
    }

    fn char_of(s: &Value, offset: i64) -> Result<Value, StepError> {
        let s = s
            .as_str()
            .ok_or_else(|| StepError::bad_message("equals_body", "seed string is not a string"))?;
        usize::try_from(offset)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::from(String::from(c)))
            .ok_or_else(|| StepError::bad_message("equals_body", "offset points past the string"))
    }
}

impl StepMachine for EqualsBody {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let (s, offset, iter) = Self::seed(msg)?;
                Ok(Step::raise(
                    self.next_effect.clone(),
                    iter,
                    State::custom("await_next", Value::pair(s, offset)),
                ))
            }
            State::Custom(tag, args) if tag == "await_next" => {
                let (s, offset) = args.into_pair().ok_or_else(|| {
                    StepError::bad_state("equals_body", &"await_next without its (string, offset)")
                })?;
                let offset = offset
                    .as_int()
                    .ok_or_else(|| StepError::bad_message("equals_body", "offset is not an integer"))?;
                let (iter, has_next) = Self::reply(msg)?;
                let iter_has_next = has_next.truthy().ok_or_else(|| {
                    StepError::bad_message("equals_body", "has_next has no truth value")
                })?;
                let str_has_next = offset < Self::string_len(&s)?;
                if !iter_has_next && !str_has_next {
                    Ok(Step::new(Action::Break, true, State::End))
                } else if !iter_has_next || !str_has_next {
                    Ok(Step::new(Action::Break, false, State::End))
                } else {
                    Ok(Step::raise(
                        self.clone_effect.clone(),
                        iter,
                        State::custom("await_clone", Value::pair(s, offset)),
                    ))
                }
            }
            State::Custom(tag, args) if tag == "await_clone" => {
                let (s, offset) = args.into_pair().ok_or_else(|| {
                    StepError::bad_state("equals_body", &"await_clone without its (string, offset)")
                })?;
                let offset = offset
                    .as_int()
                    .ok_or_else(|| StepError::bad_message("equals_body", "offset is not an integer"))?;
                let (iter, char) = Self::reply(msg)?;
                if char == Self::char_of(&s, offset)? {
                    let seed = Value::tuple([s, Value::Int(offset + 1), iter]);
                    Ok(Step::new(Action::NextLoop, seed, State::End))
                } else {
                    Ok(Step::new(Action::Break, false, State::End))
                }
            }
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("equals_body", &other)),
        }
    }
}

/// The scanner: consumes `(string, iter)` and raises the two configured
/// iterator effects until the comparison is decided.
pub fn str_iter_equals(
    next_effect: impl Into<SmolStr>,
    clone_effect: impl Into<SmolStr>,
) -> Bound {
    let preamble = Transformer::new(|msg| {
        let (s, iter) = msg.into_pair().ok_or_else(|| {
            StepError::bad_message("equals_preamble", "expected a (string, iter) pair")
        })?;
        Ok(Value::tuple([s, Value::Int(0), iter]))
    });
    Bound::new(preamble).handle(
        "result",
        Handler::and_then(ForLoop::new(EqualsBody::new(next_effect, clone_effect))),
    )
}

/// The inverse composition: the scanner's iterator effects are serviced
/// locally by the machines in [`string_iter`](crate::string_iter), so a
/// single string drives the whole comparison with no external effects.
pub fn str_iter_equals_inverse() -> Bound {
    let seed = Transformer::new(|msg| {
        let iter = Value::pair(msg.clone(), -1i64);
        Ok(Value::pair(msg, iter))
    });
    Bound::new(Sequence::new(seed, str_iter_equals("iter_next", "iter_clone")))
        .handle("iter_next", Handler::impl_by(crate::string_iter::IterNext))
        .handle("iter_clone", Handler::impl_by(crate::string_iter::IterClone))
}
