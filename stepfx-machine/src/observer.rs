//! The driver's connection to the outside world.

use smol_str::SmolStr;
use stepfx::{Action, StepError, Value};

/// Answers the actions a driven machine surfaces.
///
/// The driver presents every observable action, effects and loop-control
/// escapes alike, and feeds the returned value back to the machine as its
/// next message. Returning an error declines the action and aborts the
/// run.
pub trait Observer {
    fn observe(&mut self, action: &Action, args: &Value) -> Result<Value, StepError>;
}

impl<F> Observer for F
where
    F: FnMut(&Action, &Value) -> Result<Value, StepError>,
{
    fn observe(&mut self, action: &Action, args: &Value) -> Result<Value, StepError> {
        self(action, args)
    }
}

/// Declines every action.
///
/// For machines expected to run to their result on internal transitions
/// alone: any surfaced action is reported as unhandled.
#[derive(Debug, Default)]
pub struct Unattended;

impl Observer for Unattended {
    fn observe(&mut self, action: &Action, _args: &Value) -> Result<Value, StepError> {
        Err(StepError::Unhandled(SmolStr::new(action.name())))
    }
}
