#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod error;
pub mod instruction;
pub mod locals;

pub use error::BuildError;
pub use instruction::Instruction;
pub use locals::{Env, Exits, Locals, Pattern, Shape, Slot};

use stepfx::BoxMachine;

/// Build a whole program against an empty entry environment.
///
/// The compiled machine's opening message is the empty stack,
/// `Value::Tuple(vec![])`, and its result is the final stack.
pub fn compile(program: Instruction) -> Result<(Exits, BoxMachine), BuildError> {
    program.build(Locals::new())
}
