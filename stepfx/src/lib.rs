#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod action;
pub mod combinator;
pub mod error;
pub mod handler;
pub mod machine;
pub mod primitive;
pub mod scope;
pub mod state;
pub mod value;

pub use action::Action;
pub use combinator::{ForLoop, IfThenElse, Sequence, Smuggle};
pub use error::{StepError, StepResult};
pub use handler::{Handler, HandlerReply, HandlerState, HandlerStates};
pub use machine::{boxed, BoxMachine, Step, StepMachine};
pub use primitive::{Relay, SingleState, Transformer};
pub use scope::{Bound, Call};
pub use state::State;
pub use value::Value;
