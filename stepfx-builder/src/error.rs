//! Composition-time failures.
//!
//! Everything here is detected while a program is being built, never
//! during execution: a program that composes cleanly runs without
//! bad-state or bad-message failures from the machines it compiled to.

use smol_str::SmolStr;
use thiserror::Error;

/// A stack-type violation found at composition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// `Copy`, `Move` or `Drop` named a local that is not bound.
    #[error("`{0}` is not in scope")]
    NotInScope(SmolStr),

    /// A tuple pattern does not fit the value it would destructure.
    #[error("pattern expects a tuple of {expected} elements but the top of the stack is {found}")]
    ArityMismatch { expected: usize, found: String },

    /// Two control-flow paths meet with disagreeing locals.
    #[error("locals disagree at a join: {0}")]
    IncompatibleLocals(String),

    /// A sequence needs at least one instruction.
    #[error("a sequence must contain at least one instruction")]
    EmptySequence,

    /// An instruction needs more stack values than are present.
    #[error("instruction needs {needed} stack values but only {available} are present")]
    StackUnderflow { needed: usize, available: usize },
}
