//! The step contract every machine implements.

use crate::action::Action;
use crate::error::StepResult;
use crate::state::State;
use crate::value::Value;

/// The outcome of one machine step: an action, its payload, and the
/// state to resume from on the next step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub action: Action,
    pub args: Value,
    pub resume: State,
}

impl Step {
    pub fn new(action: Action, args: impl Into<Value>, resume: State) -> Step {
        Step {
            action,
            args: args.into(),
            resume,
        }
    }

    /// A final `result` step. The machine is finished.
    pub fn done(args: impl Into<Value>) -> Step {
        Step::new(Action::Result, args, State::End)
    }

    /// A hidden `continue` self-transition: the driver feeds `args` back
    /// as the next message without surfacing anything.
    pub fn next(args: impl Into<Value>, resume: State) -> Step {
        Step::new(Action::Continue, args, resume)
    }

    /// An effect request named `name`.
    pub fn raise(name: impl Into<smol_str::SmolStr>, args: impl Into<Value>, resume: State) -> Step {
        Step::new(Action::effect(name), args, resume)
    }
}

/// A resumable step machine.
///
/// `step` is a pure function of the prior state and the incoming message.
/// Machines hold only their composition (child machines, configured
/// names); everything that evolves between steps travels in the returned
/// [`State`]. A state produced by one machine must only ever be fed back
/// to that machine.
pub trait StepMachine {
    fn step(&self, state: State, msg: Value) -> StepResult;
}

/// An owned machine in a composition tree.
pub type BoxMachine = Box<dyn StepMachine>;

impl StepMachine for BoxMachine {
    fn step(&self, state: State, msg: Value) -> StepResult {
        (**self).step(state, msg)
    }
}

impl<M: StepMachine + ?Sized> StepMachine for &M {
    fn step(&self, state: State, msg: Value) -> StepResult {
        (**self).step(state, msg)
    }
}

/// Box a machine for storage in a composition tree.
pub fn boxed(machine: impl StepMachine + 'static) -> BoxMachine {
    Box::new(machine)
}
