#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod observer;
pub use observer::{Observer, Unattended};

use stepfx::{Action, State, Step, StepError, StepMachine, Value};
use tracing::{debug, trace};

/// Feed `msg` into `machine` and step until the next observable action.
///
/// `continue` transitions are chased invisibly; the returned step never
/// carries one.
pub fn run_to_action(
    machine: &dyn StepMachine,
    state: State,
    msg: Value,
) -> Result<Step, StepError> {
    let mut step = machine.step(state, msg)?;
    while step.action == Action::Continue {
        trace!(msg = %step.args, "hidden transition");
        step = machine.step(step.resume, step.args)?;
    }
    Ok(step)
}

/// Runs a machine to its final value against an [`Observer`].
///
/// A driver owns no state between runs: each [`drive`](Driver::drive)
/// starts the machine from `Start`. The optional step budget bounds the
/// total number of machine steps, hidden transitions included, and fails
/// the run with [`StepError::StepLimit`] when exhausted.
pub struct Driver<M> {
    machine: M,
    step_limit: Option<u64>,
}

impl<M: StepMachine> Driver<M> {
    pub fn new(machine: M) -> Self {
        Driver {
            machine,
            step_limit: None,
        }
    }

    /// Bound the total number of machine steps per run.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// The driven machine.
    pub fn machine(&self) -> &M {
        &self.machine
    }

    /// Run the machine from `Start` with `initial` as its first message.
    ///
    /// Every observable action is presented to `observer`; its answer
    /// becomes the machine's next message. The machine's `result` payload
    /// is the run's value.
    pub fn drive(&self, initial: Value, observer: &mut dyn Observer) -> Result<Value, StepError> {
        let mut state = State::Start;
        let mut msg = initial;
        let mut taken: u64 = 0;
        loop {
            let mut step = self.checked_step(&mut taken, state, msg)?;
            while step.action == Action::Continue {
                trace!(msg = %step.args, "hidden transition");
                step = self.checked_step(&mut taken, step.resume, step.args)?;
            }
            match step.action {
                Action::Result => {
                    debug!(value = %step.args, "machine finished");
                    return Ok(step.args);
                }
                action => {
                    debug!(action = %action, args = %step.args, "surfaced action");
                    msg = observer.observe(&action, &step.args)?;
                    state = step.resume;
                }
            }
        }
    }

    fn checked_step(&self, taken: &mut u64, state: State, msg: Value) -> Result<Step, StepError> {
        if let Some(limit) = self.step_limit {
            if *taken >= limit {
                return Err(StepError::StepLimit(limit));
            }
        }
        *taken += 1;
        self.machine.step(state, msg)
    }
}

/// Run `machine` to its final value with default driver settings.
pub fn drive(
    machine: impl StepMachine,
    initial: Value,
    observer: &mut dyn Observer,
) -> Result<Value, StepError> {
    Driver::new(machine).drive(initial, observer)
}
