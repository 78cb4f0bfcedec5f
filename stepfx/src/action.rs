//! The action vocabulary of the step protocol.

use core::fmt;
use smol_str::SmolStr;

/// What a machine step announces to its caller.
///
/// The reserved actions have fixed semantics; every other name is an
/// *effect request* that surfaces outward until an enclosing scope has a
/// handler installed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// The machine has produced its final value.
    Result,
    /// Internal self-transition; the driver re-invokes without surfacing.
    Continue,
    /// Terminate the enclosing `ForLoop` with the payload.
    Break,
    /// Restart the enclosing `ForLoop` body with the payload as the next
    /// seed. Written `next_loop` on the wire, with `loop` as an alias.
    NextLoop,
    /// Skip the rest of the enclosing `Sequence` and make the payload its
    /// result.
    Return,
    /// A request for service by an enclosing scope.
    Effect(SmolStr),
}

impl Action {
    /// The action named `name`, decoding the reserved vocabulary.
    ///
    /// Reserved names always map to their reserved action; `Effect` never
    /// carries one of them.
    pub fn named(name: &str) -> Action {
        match name {
            "result" => Action::Result,
            "continue" => Action::Continue,
            "break" => Action::Break,
            "next_loop" | "loop" => Action::NextLoop,
            "return" => Action::Return,
            other => Action::Effect(SmolStr::new(other)),
        }
    }

    /// An effect request. Falls back to the reserved action if `name`
    /// collides with the reserved vocabulary.
    pub fn effect(name: impl Into<SmolStr>) -> Action {
        Action::named(&name.into())
    }

    /// The wire symbol for this action.
    pub fn name(&self) -> &str {
        match self {
            Action::Result => "result",
            Action::Continue => "continue",
            Action::Break => "break",
            Action::NextLoop => "next_loop",
            Action::Return => "return",
            Action::Effect(name) => name,
        }
    }

    /// True for everything except user-defined effects.
    pub fn is_reserved(&self) -> bool {
        !matches!(self, Action::Effect(_))
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Action::named(name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_decode() {
        assert_eq!(Action::named("result"), Action::Result);
        assert_eq!(Action::named("next_loop"), Action::NextLoop);
        assert_eq!(Action::named("loop"), Action::NextLoop);
        assert_eq!(Action::named("iter_next"), Action::effect("iter_next"));
    }

    #[test]
    fn effect_cannot_shadow_reserved() {
        assert_eq!(Action::effect("break"), Action::Break);
        assert!(Action::effect("iter").name() == "iter");
    }
}
