//! Transcript-driven assertions.
//!
//! A transcript is a finite ordered list of exchanges: an input message,
//! the action expected to surface, and its expected payload. Hidden
//! `continue` transitions are chased between exchanges, so a transcript
//! describes exactly what an external observer would see.

use stepfx::{Action, State, StepMachine, Value};
use stepfx_machine::run_to_action;

/// One expected exchange.
pub type Exchange = (Value, Action, Value);

/// Shorthand for building an [`Exchange`].
pub fn exchange(
    input: impl Into<Value>,
    action: impl Into<Action>,
    args: impl Into<Value>,
) -> Exchange {
    (input.into(), action.into(), args.into())
}

/// Drive `machine` from `Start` through `transcript`, panicking on the
/// first divergence.
pub fn assert_transcript(machine: &dyn StepMachine, transcript: &[Exchange]) {
    let mut state = State::Start;
    for (i, (input, action, args)) in transcript.iter().enumerate() {
        let step = run_to_action(machine, state, input.clone())
            .unwrap_or_else(|e| panic!("exchange {i}: step failed: {e}"));
        assert_eq!(
            &step.action, action,
            "exchange {i}: expected action `{action}`, machine surfaced `{}` with {}",
            step.action, step.args
        );
        assert_eq!(
            &step.args, args,
            "exchange {i}: action `{action}` surfaced with the wrong payload"
        );
        state = step.resume;
    }
}
