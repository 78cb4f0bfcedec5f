//! Loop-protocol fixtures.

use stepfx::{Action, State, Step, StepError, StepMachine, StepResult, Value};

/// A loop body that counts up to its limit.
///
/// On seed `n` it requests another iteration with `n + 1` while `n` is
/// below the limit, and breaks with `n` once the limit is reached.
pub struct CountUp {
    limit: i64,
}

impl CountUp {
    pub fn new(limit: i64) -> Self {
        CountUp { limit }
    }
}

impl StepMachine for CountUp {
    fn step(&self, state: State, msg: Value) -> StepResult {
        match state {
            State::Start => {
                let n = msg
                    .as_int()
                    .ok_or_else(|| StepError::bad_message("count_up", "seed is not an integer"))?;
                if n < self.limit {
                    Ok(Step::new(Action::NextLoop, n + 1, State::End))
                } else {
                    Ok(Step::new(Action::Break, n, State::End))
                }
            }
            State::End => Err(StepError::Finished),
            other => Err(StepError::bad_state("count_up", &other)),
        }
    }
}
